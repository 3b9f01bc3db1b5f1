//! Page containers.
//!
//! A page owns its track list(s) and the fetch lifecycle. It is mounted with
//! a [`PageContext`] (the injected data source plus a cancellation token)
//! and loaded with an explicit [`AuthContext`](crate::session::AuthContext).
//! Protected pages check the session before issuing any request and ask to
//! be redirected to the login screen when there is none.

mod dashboard;
mod liked;
mod search;

pub use dashboard::{DashboardPage, DashboardSection};
pub use liked::LikedPage;
pub use search::SearchPage;

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::error::{Result, SoundwaveError};
use crate::library::{AckOutcome, TrackList, UpdateMode};
use crate::models::Session;
use crate::source::TrackSource;

/// Message shown when a like/unlike request fails.
pub const LIKE_FAILED: &str = "Failed to update like status. Please try again.";

/// Navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
    Search,
    Liked,
}

/// Fetch lifecycle of a page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Holds the single user-visible message.
    Failed(String),
}

/// Result of loading a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Ready,
    /// Navigate elsewhere instead of rendering.
    Redirect(Screen),
    /// The page shows this message instead of content.
    Failed(String),
    /// The page was unmounted before the data arrived.
    Cancelled,
}

/// What every page is mounted with.
#[derive(Clone)]
pub struct PageContext {
    source: Arc<dyn TrackSource>,
    cancel: CancellationToken,
    mode: UpdateMode,
}

impl std::fmt::Debug for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("mode", &self.mode)
            .finish()
    }
}

impl PageContext {
    pub fn new(source: Arc<dyn TrackSource>) -> Self {
        Self {
            source,
            cancel: CancellationToken::new(),
            mode: UpdateMode::default(),
        }
    }

    /// Choose optimistic or confirmed like updates.
    pub fn with_mode(mut self, mode: UpdateMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn source(&self) -> &dyn TrackSource {
        self.source.as_ref()
    }

    pub fn mode(&self) -> UpdateMode {
        self.mode
    }

    /// Token that unmounts the page when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Dispose the page. Requests in flight resolve to `Cancelled`.
    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    pub fn is_unmounted(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run a request unless the page is unmounted first.
    pub async fn run<F, T>(&self, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SoundwaveError::Cancelled),
            result = request => result,
        }
    }
}

/// Record a load failure on a page and turn it into an outcome.
pub(crate) fn load_failed(state: &mut LoadState, what: &str, err: SoundwaveError) -> PageOutcome {
    if err.is_cancelled() {
        return PageOutcome::Cancelled;
    }
    if matches!(err, SoundwaveError::NotAuthenticated) {
        return PageOutcome::Redirect(Screen::Login);
    }
    error!("Failed to load {}: {}", what, err);
    let message = err.user_message().to_string();
    *state = LoadState::Failed(message.clone());
    PageOutcome::Failed(message)
}

/// Toggle one row: begin, send, reconcile.
///
/// Returns `Cancelled` without touching the list if the page is unmounted
/// before the answer arrives.
pub(crate) async fn toggle_row(
    ctx: &PageContext,
    list: &mut TrackList,
    session: &Session,
    track_id: &str,
) -> Result<AckOutcome> {
    if ctx.is_unmounted() {
        return Err(SoundwaveError::Cancelled);
    }
    let ticket = list.begin_toggle(track_id)?;
    let source = ctx.source();
    let result = ctx
        .run(async {
            if ticket.liked {
                source.like(&ticket.track_id, session).await
            } else {
                source.unlike(&ticket.track_id, session).await
            }
        })
        .await;

    if matches!(result, Err(SoundwaveError::Cancelled)) {
        return Err(SoundwaveError::Cancelled);
    }
    if let Err(e) = &result {
        error!("Failed to update like status for {}: {}", track_id, e);
    }
    Ok(list.complete(&ticket, &result))
}
