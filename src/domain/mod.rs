//! Domain layer - Core business objects with no external dependencies
//!
//! This layer contains:
//! - Entities: Core business objects (ProfileSummary, Message, User, Command)
//! - Traits: Abstractions for infrastructure (Bot, UpdateSource, fetchers)

pub mod entities;
pub mod traits;
