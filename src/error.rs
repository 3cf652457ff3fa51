//! # Errors

use thiserror::Error;

/// Errors produced by the [Broadcaster](crate::Broadcaster)
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The channel is not registered, so nobody may listen on it
    #[error("channel `{channel}` is not registered")]
    ChannelNotRegistered {
        /// Requested channel id
        channel: String,
    },
}

impl Error {
    /// Returns a short stable label (snake_case) for use in logs
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::ChannelNotRegistered { .. } => "channel_not_registered",
        }
    }
}

/// Result with [Error] as the default error type
pub type Result<T, E = Error> = std::result::Result<T, E>;
