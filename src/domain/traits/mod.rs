//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod extract;
pub mod fetch;
pub mod update_source;

pub use bot::{Bot, BotInfo};
pub use extract::ProfileExtractor;
pub use fetch::{ImageFetcher, PageFetcher};
pub use update_source::UpdateSource;
