//! # Soundwave
//!
//! Client library for the Soundwave music discovery service: browse the
//! catalog and recommendations, search, and like or unlike tracks while
//! keeping the local lists in step with the backend.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use soundwave::{AuthContext, ClientConfig, DashboardPage, MusicApi, PageContext, SessionStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("http://localhost:8000");
//!     let api = Arc::new(MusicApi::new(config.clone())?);
//!
//!     let mut auth = AuthContext::restore(SessionStore::new(&config.session_path), config.login_mode)?;
//!     auth.login(api.as_ref(), "alice").await?;
//!
//!     let mut dashboard = DashboardPage::new(PageContext::new(api));
//!     dashboard.load(&auth).await;
//!     println!("{}", dashboard.render());
//!     Ok(())
//! }
//! ```
//!
//! ## Layout
//!
//! - [`api`] - HTTP client and backend routes
//! - [`source`] - the data-source capability pages are built on, plus an
//!   in-memory implementation
//! - [`library`] - page-owned track lists and like reconciliation
//! - [`pages`] - dashboard, search and liked-songs containers
//! - [`session`] - persisted session and the auth holder

pub mod api;
pub mod config;
pub mod converters;
pub mod error;
pub mod library;
pub mod models;
pub mod pages;
pub mod session;
pub mod source;
pub mod view;

pub use api::MusicApi;
pub use config::{ClientConfig, LoginMode, RecommendationSource, RouteStyle};
pub use error::{Result, SoundwaveError};
pub use library::{AckOutcome, LikeState, ListKind, TrackList, UpdateMode};
pub use models::{Session, Track, TrackDetails};
pub use pages::{
    DashboardPage, DashboardSection, LikedPage, LoadState, PageContext, PageOutcome, Screen,
    SearchPage,
};
pub use session::{AuthContext, SessionStore};
pub use source::{LoginReply, MemorySource, TrackSource};
