//! Message handling - turning inbound messages into replies

pub mod dispatcher;
pub mod parser;
pub mod runner;

pub use dispatcher::{MessageDispatcher, Reply};
pub use parser::MessageParser;
pub use runner::BotRunner;
