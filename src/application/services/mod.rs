//! Application services - Business logic orchestration

pub mod command_service;
pub mod profile_service;

pub use command_service::CommandService;
pub use profile_service::{ProfileService, ResolvedProfile};
