//! Sesami cloud protocol - command signing, request framing and response handling
//!
//! Everything in this crate is pure: it builds what goes on the wire and
//! interprets what comes back, but never opens a socket. Transports live in
//! `sesami-mcu` implementations.

mod request;
mod response;
pub mod status;
mod tag;

pub use request::{Method, Request, API_KEY_HEADER, CONTENT_TYPE_JSON, DEFAULT_BASE_URL};
pub use response::{unescape_quotes, Response, STATUS_OK};
pub use tag::{generate_tag, timestamp_message, SecretKey, Tag};

/// Command codes understood by the cloud `cmd` endpoint
pub mod commands {
    /// Toggle between locked and unlocked
    pub const TOGGLE: i32 = 88;

    /// Lock
    pub const LOCK: i32 = 82;

    /// Unlock
    pub const UNLOCK: i32 = 83;
}

/// Lock action sent in the `cmd` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Lock,
    Unlock,
    /// Any other protocol value, passed through as is
    Other(i32),
}

impl Command {
    pub fn code(&self) -> i32 {
        match self {
            Command::Toggle => commands::TOGGLE,
            Command::Lock => commands::LOCK,
            Command::Unlock => commands::UNLOCK,
            Command::Other(code) => *code,
        }
    }
}

impl From<i32> for Command {
    fn from(code: i32) -> Self {
        match code {
            commands::TOGGLE => Command::Toggle,
            commands::LOCK => Command::Lock,
            commands::UNLOCK => Command::Unlock,
            other => Command::Other(other),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Toggle => write!(f, "toggle"),
            Command::Lock => write!(f, "lock"),
            Command::Unlock => write!(f, "unlock"),
            Command::Other(code) => write!(f, "cmd {code}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid secret key: {reason}")]
    InvalidKey { reason: String },
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}
