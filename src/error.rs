//! Error types for the Soundwave client.

use thiserror::Error;

/// Message shown to the user whenever a page fails to load or sync.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

/// Main error type for all Soundwave operations.
#[derive(Debug, Error)]
pub enum SoundwaveError {
    /// The request could not be sent or the response could not be received.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// JSON parsing failed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A backend record is missing a required field.
    #[error("Invalid track record: {0}")]
    InvalidRecord(String),

    /// The configured base URL cannot carry request paths.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// I/O operation failed (session storage).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Login was attempted with an empty username.
    #[error("Username must not be empty")]
    InvalidUsername,

    /// A protected page was opened without a session.
    #[error("Not logged in")]
    NotAuthenticated,

    /// The page was unmounted while the request was in flight.
    #[error("Request cancelled")]
    Cancelled,

    /// A like toggle referenced a track that is not in the list.
    #[error("Track not in list: {0}")]
    UnknownTrack(String),
}

impl SoundwaveError {
    /// Build a server error from a status and an optional response body.
    ///
    /// The backend reports failures as `{"detail": "..."}`; when the body has
    /// no such field the canonical reason phrase is used instead.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        SoundwaveError::Server {
            status: status.as_u16(),
            detail,
        }
    }

    /// The single user-visible message for this error.
    ///
    /// Structured information stays in the logs; the UI only gets a string.
    pub fn user_message(&self) -> &'static str {
        match self {
            SoundwaveError::NotAuthenticated => "Please log in to continue.",
            SoundwaveError::InvalidUsername => "Please enter a username.",
            SoundwaveError::Network(_) => "Could not reach the music service. Please try again later.",
            SoundwaveError::Cancelled => "The request was cancelled.",
            _ => GENERIC_FAILURE,
        }
    }

    /// Whether this error came from the page being disposed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SoundwaveError::Cancelled)
    }
}

/// Result type alias for Soundwave operations.
pub type Result<T> = std::result::Result<T, SoundwaveError>;
