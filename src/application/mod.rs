//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: Profile lookup and command handling
//! - Errors: Domain-specific errors and their chat replies
//! - Messaging: Message parsing and dispatching

pub mod errors;
pub mod services;
pub mod messaging;
