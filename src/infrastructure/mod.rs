//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Challenge: HTTP client that gets past the anti-bot interstitial
//! - Profile page / image: fetching and scraping the profile
//! - Adapters: Platform integrations (Telegram)

pub mod config;
pub mod challenge;
pub mod profile_page;
pub mod image;
pub mod adapters;
