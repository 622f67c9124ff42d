//! Telegram bot that answers a handle with that profile's picture.
//!
//! The crate is split the same way the bot is wired together:
//! - `domain`: entities and the traits at the seams
//! - `application`: errors, the lookup service and message dispatch
//! - `infrastructure`: config, HTTP transports, scraping and Telegram

pub mod domain;
pub mod application;
pub mod infrastructure;
