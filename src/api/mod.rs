//! HTTP access to the Soundwave backend.
//!
//! - [`MusicApi`]: the live client, an implementation of
//!   [`TrackSource`](crate::source::TrackSource)
//! - [`Routes`]: the backend path table for a [`RouteStyle`](crate::config::RouteStyle)

pub mod client;
pub mod routes;

pub use client::MusicApi;
pub use routes::{Route, Routes};
