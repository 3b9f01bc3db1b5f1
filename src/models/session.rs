//! Session model.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SoundwaveError};

/// The client's notion of who is logged in.
///
/// Only a display username is held; the backend issues no token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    username: String,
}

impl Session {
    /// Create a session for a username.
    ///
    /// Surrounding whitespace is dropped; an empty name is rejected.
    pub fn new<S: AsRef<str>>(username: S) -> Result<Self> {
        let username = username.as_ref().trim();
        if username.is_empty() {
            return Err(SoundwaveError::InvalidUsername);
        }
        Ok(Self {
            username: username.to_string(),
        })
    }

    /// The logged-in username.
    pub fn username(&self) -> &str {
        &self.username
    }
}
