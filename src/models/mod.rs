//! Data models for the Soundwave client.
//!
//! This module contains the view-models shown in track lists and the
//! session held by the auth layer.

pub mod session;
pub mod track;

// Re-exports for convenience
pub use session::Session;
pub use track::{Track, TrackDetails};
