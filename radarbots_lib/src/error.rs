//! Error types for the Radar Bot Directory client.

use serde_json::Value;
use thiserror::Error;

/// Base error type for directory operations.
///
/// Stats submissions and the fetch calls report a non-200 reply differently:
/// [`Error::StatsRejected`] keeps the server's JSON body, while [`Error::Status`]
/// carries a formatted `"[RadarBots] - {code}: {reason}"` message.
#[derive(Error, Debug)]
pub enum Error {
    /// A required argument was missing or out of range. Raised before any I/O.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The identity source had no bot id to report at call time.
    #[error("Bot identity is not available yet")]
    IdentityUnavailable,

    /// Autopost needs a tokio runtime to schedule its loop.
    #[error("Autopost requires a running tokio runtime")]
    NoRuntime,

    /// The directory answered a stats submission with a non-200 status.
    #[error("Stats rejected ({status}): {body}")]
    StatsRejected { status: u16, body: Value },

    /// The directory answered a fetch with a non-200 status.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Builds the fetch-side rejection for a status code.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown Status");
        Self::Status {
            status: status.as_u16(),
            message: format!("[RadarBots] - {}: {}", status.as_u16(), reason),
        }
    }

    /// HTTP status of a remote rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::StatsRejected { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// JSON body the directory sent back when it rejected a stats submission.
    pub fn rejection_body(&self) -> Option<&Value> {
        match self {
            Self::StatsRejected { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn status_message_has_code_and_reason() {
        let err = Error::from_status(StatusCode::NOT_FOUND);
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("Not Found"));
        assert_eq!(err.status(), Some(404));
        assert!(err.rejection_body().is_none());
    }

    #[test]
    fn stats_rejection_keeps_body() {
        let err = Error::StatsRejected {
            status: 403,
            body: serde_json::json!({"error": "bad token"}),
        };
        assert_eq!(err.status(), Some(403));
        assert_eq!(
            err.rejection_body(),
            Some(&serde_json::json!({"error": "bad token"}))
        );
    }

    #[test]
    fn invalid_argument_has_no_status() {
        let err = Error::InvalidArgument("guild count is required".into());
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("guild count"));
    }
}
