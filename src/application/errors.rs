//! Application layer errors

use thiserror::Error;
use crate::domain::entities::ProfileSummary;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Update source closed")]
    SourceClosed,
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found: {0}")]
    NotFound(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// HTTP fetch errors, shared by the page and image fetchers
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Challenge failed: {0}")]
    Challenge(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Metadata extraction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("og:title {0:?} has no \" (@\" separator")]
    UnexpectedTitle(String),
}

/// Failure modes of a profile picture lookup.
///
/// Every variant maps to one fixed reply for the chat.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Error fetching profile: {0}")]
    Transport(#[source] FetchError),

    #[error("Profile not found: {0:?}")]
    NotFound(String),

    #[error("Unexpected profile page: {0}")]
    UnexpectedFormat(#[from] ExtractError),

    #[error("Error downloading image of {summary}: {source}")]
    ImageTransport {
        summary: ProfileSummary,
        #[source]
        source: FetchError,
    },
}

pub const REPLY_FETCH_ERROR: &str = "Error in fetching User's Profile Picture";
pub const REPLY_INVALID_USER: &str = "Invalid User ID, Enter Valid User ID";
pub const REPLY_UNEXPECTED_FORMAT: &str = "Unexpected profile page format, please retry later";
pub const REPLY_IMAGE_ERROR: &str = "Error in downloading Image, Please retry";

impl LookupError {
    /// Text sent back to the chat for this failure
    pub fn user_reply(&self) -> &'static str {
        match self {
            LookupError::Transport(_) => REPLY_FETCH_ERROR,
            LookupError::NotFound(_) => REPLY_INVALID_USER,
            LookupError::UnexpectedFormat(_) => REPLY_UNEXPECTED_FORMAT,
            LookupError::ImageTransport { .. } => REPLY_IMAGE_ERROR,
        }
    }

    /// Whether this is a fault worth a warning, as opposed to bad input
    pub fn is_system_fault(&self) -> bool {
        matches!(self, LookupError::Transport(_) | LookupError::ImageTransport { .. })
    }
}
