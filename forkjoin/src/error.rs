use std::time::Duration;

use thiserror::Error;

/// A value could not be turned into a call payload.
#[derive(Debug, Error)]
#[error("failed to encode payload: {0}")]
pub struct EncodeError(#[source] pub serde_json::Error);

/// A call payload was malformed or did not match the expected type.
#[derive(Debug, Error)]
#[error("failed to decode payload: {0}")]
pub struct DecodeError(#[source] pub serde_json::Error);

/// Failure of a single dispatched call.
///
/// Everything after dispatch lands here, including execution failures on the
/// worker, which only surface as a non-success status.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("worker responded with status {status}")]
    Status { status: u16 },

    #[error("call task aborted: {0}")]
    Aborted(String),
}

impl ChannelError {
    pub(crate) fn from_reqwest(err: reqwest::Error, deadline: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(deadline)
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Caller-visible errors of `ForkJoin::fork`.
#[derive(Debug, Error)]
pub enum ForkError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("cannot fork after join has started")]
    AlreadyJoined,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid deadline: {0} seconds")]
    InvalidDeadline(f64),
}
