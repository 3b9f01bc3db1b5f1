//! "Your Liked Songs" page.

use tracing::info;

use super::{load_failed, toggle_row, LoadState, PageContext, PageOutcome, Screen, LIKE_FAILED};
use crate::error::{Result, SoundwaveError};
use crate::library::{AckOutcome, ListKind, TrackList};
use crate::models::Session;
use crate::session::AuthContext;
use crate::view;

/// Lists the user's liked tracks. Unliking a track drops it from the list.
#[derive(Debug)]
pub struct LikedPage {
    ctx: PageContext,
    session: Option<Session>,
    state: LoadState,
    notice: Option<String>,
    liked: TrackList,
}

impl LikedPage {
    pub fn new(ctx: PageContext) -> Self {
        let mode = ctx.mode();
        Self {
            ctx,
            session: None,
            state: LoadState::Idle,
            notice: None,
            liked: TrackList::new(ListKind::Liked, mode),
        }
    }

    pub async fn load(&mut self, auth: &AuthContext) -> PageOutcome {
        let session = match auth.require() {
            Ok(session) => session.clone(),
            Err(_) => return PageOutcome::Redirect(Screen::Login),
        };

        self.state = LoadState::Loading;
        let fetched = self.ctx.run(self.ctx.source().fetch_liked(&session)).await;
        let tracks = match fetched {
            Ok(tracks) => tracks,
            Err(e) => return load_failed(&mut self.state, "liked songs", e),
        };

        info!("Loaded {} liked songs for {}", tracks.len(), session.username());
        self.liked.replace(tracks);
        self.session = Some(session);
        self.state = LoadState::Ready;
        PageOutcome::Ready
    }

    pub async fn toggle_like(&mut self, track_id: &str) -> Result<AckOutcome> {
        let session = self.session.as_ref().ok_or(SoundwaveError::NotAuthenticated)?;
        let outcome = toggle_row(&self.ctx, &mut self.liked, session, track_id).await?;
        match outcome {
            AckOutcome::Reverted => self.notice = Some(LIKE_FAILED.to_string()),
            AckOutcome::Applied | AckOutcome::Removed => self.notice = None,
            _ => {}
        }
        Ok(outcome)
    }

    pub fn tracks(&self) -> &TrackList {
        &self.liked
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn unmount(&self) {
        self.ctx.unmount();
    }

    pub fn render(&self) -> String {
        match &self.state {
            LoadState::Failed(message) => format!("{}\n", message),
            LoadState::Idle | LoadState::Loading => "Loading your liked songs...\n".to_string(),
            LoadState::Ready => {
                let mut out = view::render_list(
                    "Your Liked Songs",
                    &self.liked,
                    "No liked songs yet. Start exploring music and like songs to add them to your collection.",
                );
                if let Some(notice) = &self.notice {
                    out.push_str(&format!("\n{}\n", notice));
                }
                out
            }
        }
    }
}
