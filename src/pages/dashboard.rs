//! Dashboard: the catalog sample and recommendations for the user.

use std::collections::HashSet;

use futures_util::future::try_join3;
use tracing::info;

use super::{load_failed, toggle_row, LoadState, PageContext, PageOutcome, Screen, LIKE_FAILED};
use crate::error::{Result, SoundwaveError};
use crate::library::{AckOutcome, ListKind, TrackList};
use crate::models::{Session, Track};
use crate::session::AuthContext;
use crate::view;

/// The two lists shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardSection {
    All,
    Recommended,
}

#[derive(Debug)]
pub struct DashboardPage {
    ctx: PageContext,
    session: Option<Session>,
    state: LoadState,
    notice: Option<String>,
    all: TrackList,
    recommended: TrackList,
}

fn mark_liked(mut tracks: Vec<Track>, liked: &HashSet<String>) -> Vec<Track> {
    for track in &mut tracks {
        track.liked = liked.contains(&track.id);
    }
    tracks
}

impl DashboardPage {
    pub fn new(ctx: PageContext) -> Self {
        let mode = ctx.mode();
        Self {
            ctx,
            session: None,
            state: LoadState::Idle,
            notice: None,
            all: TrackList::new(ListKind::Catalog, mode),
            recommended: TrackList::new(ListKind::Recommended, mode),
        }
    }

    /// Fetch the catalog, recommendations and liked set concurrently.
    ///
    /// Nothing is requested without a session.
    pub async fn load(&mut self, auth: &AuthContext) -> PageOutcome {
        let session = match auth.require() {
            Ok(session) => session.clone(),
            Err(_) => return PageOutcome::Redirect(Screen::Login),
        };

        self.state = LoadState::Loading;
        let source = self.ctx.source();
        let fetched = self
            .ctx
            .run(try_join3(
                source.fetch_all(),
                source.fetch_recommended(&session),
                source.fetch_liked(&session),
            ))
            .await;

        let (all, recommended, liked) = match fetched {
            Ok(data) => data,
            Err(e) => return load_failed(&mut self.state, "dashboard", e),
        };

        let liked: HashSet<String> = liked.into_iter().map(|t| t.id).collect();
        info!(
            "Dashboard loaded: {} songs, {} recommended, {} liked",
            all.len(),
            recommended.len(),
            liked.len()
        );

        self.all.replace(mark_liked(all, &liked));
        self.recommended.replace(mark_liked(recommended, &liked));
        self.session = Some(session);
        self.state = LoadState::Ready;
        PageOutcome::Ready
    }

    /// Toggle like on a row of one section.
    ///
    /// A confirmed change is mirrored into the other section when the same
    /// track appears there.
    pub async fn toggle_like(
        &mut self,
        section: DashboardSection,
        track_id: &str,
    ) -> Result<AckOutcome> {
        let session = self.session.as_ref().ok_or(SoundwaveError::NotAuthenticated)?;
        let (list, other) = match section {
            DashboardSection::All => (&mut self.all, &mut self.recommended),
            DashboardSection::Recommended => (&mut self.recommended, &mut self.all),
        };

        let outcome = toggle_row(&self.ctx, list, session, track_id).await?;
        match outcome {
            AckOutcome::Applied => {
                if let Some(row) = list.get(track_id) {
                    other.sync_liked(track_id, row.confirmed_liked());
                }
                self.notice = None;
            }
            AckOutcome::Reverted => self.notice = Some(LIKE_FAILED.to_string()),
            _ => {}
        }
        Ok(outcome)
    }

    pub fn section(&self, section: DashboardSection) -> &TrackList {
        match section {
            DashboardSection::All => &self.all,
            DashboardSection::Recommended => &self.recommended,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Message from the last failed like/unlike, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn unmount(&self) {
        self.ctx.unmount();
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    pub fn render(&self) -> String {
        let greeting = match &self.session {
            Some(session) => format!("Welcome, {}\n\n", session.username()),
            None => "Discover Music\n\n".to_string(),
        };
        match &self.state {
            LoadState::Failed(message) => format!("{}{}\n", greeting, message),
            LoadState::Idle | LoadState::Loading => {
                format!("{}Loading your music recommendations...\n", greeting)
            }
            LoadState::Ready => {
                let mut out = greeting;
                out.push_str(&view::render_list(
                    "Recommended for You",
                    &self.recommended,
                    "No recommendations yet. Like a few songs to get started.",
                ));
                out.push('\n');
                out.push_str(&view::render_list("All Songs", &self.all, view::EMPTY_MESSAGE));
                if let Some(notice) = &self.notice {
                    out.push_str(&format!("\n{}\n", notice));
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::config::LoginMode;
    use crate::library::LikeState;
    use crate::pages::testing::SlowSource;
    use crate::session::SessionStore;
    use crate::source::{MemorySource, SourceCall};

    fn catalog() -> Vec<Track> {
        vec![Track::new("1", "One", "A"), Track::new("2", "Two", "B")]
    }

    async fn logged_in(source: &MemorySource, dir: &tempfile::TempDir) -> AuthContext {
        let store = SessionStore::new(dir.path().join("session.json"));
        let mut auth = AuthContext::restore(store, LoginMode::Remote).unwrap();
        auth.login(source, "alice").await.unwrap();
        auth
    }

    #[tokio::test]
    async fn test_redirects_without_session_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MemorySource::new(catalog()));
        let auth = AuthContext::restore(
            SessionStore::new(dir.path().join("session.json")),
            LoginMode::Local,
        )
        .unwrap();

        let mut page = DashboardPage::new(PageContext::new(source.clone()));
        assert_eq!(page.load(&auth).await, PageOutcome::Redirect(Screen::Login));
        assert!(source.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_like_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MemorySource::new(catalog()));
        let auth = logged_in(&source, &dir).await;
        source.add_user("alice", ["2"]).await;

        let mut page = DashboardPage::new(PageContext::new(source.clone()));
        assert_eq!(page.load(&auth).await, PageOutcome::Ready);

        let all = page.section(DashboardSection::All);
        assert!(!all.get("1").unwrap().is_liked());
        assert!(all.get("2").unwrap().is_liked());

        let outcome = page.toggle_like(DashboardSection::All, "1").await.unwrap();
        assert_eq!(outcome, AckOutcome::Applied);
        assert!(source.calls().await.contains(&SourceCall::Like {
            track_id: "1".into(),
            username: "alice".into(),
        }));

        let all = page.section(DashboardSection::All);
        assert_eq!(all.get("1").unwrap().state(), LikeState::Liked);
        assert_eq!(all.get("2").unwrap().state(), LikeState::Liked);
        assert!(source.is_liked("alice", "1").await);
    }

    #[tokio::test]
    async fn test_failed_like_reverts_and_sets_notice() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MemorySource::new(catalog()));
        let auth = logged_in(&source, &dir).await;

        let mut page = DashboardPage::new(PageContext::new(source.clone()));
        page.load(&auth).await;
        source.set_offline(true).await;

        let outcome = page.toggle_like(DashboardSection::All, "1").await.unwrap();
        assert_eq!(outcome, AckOutcome::Reverted);
        assert!(!page.section(DashboardSection::All).get("1").unwrap().is_liked());
        assert_eq!(page.notice(), Some(LIKE_FAILED));
    }

    #[tokio::test]
    async fn test_like_mirrors_into_recommendations() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MemorySource::new(catalog()));
        let auth = logged_in(&source, &dir).await;
        source.add_user("alice", ["1"]).await;
        source.add_user("bob", ["1", "2"]).await;

        let mut page = DashboardPage::new(PageContext::new(source.clone()));
        page.load(&auth).await;
        assert!(page
            .section(DashboardSection::Recommended)
            .get("2")
            .is_some());

        page.toggle_like(DashboardSection::Recommended, "2").await.unwrap();
        assert!(page.section(DashboardSection::All).get("2").unwrap().is_liked());
    }

    #[tokio::test]
    async fn test_load_failure_shows_single_message() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(MemorySource::new(catalog()));
        let auth = logged_in(&source, &dir).await;
        source.set_offline(true).await;

        let mut page = DashboardPage::new(PageContext::new(source.clone()));
        let outcome = page.load(&auth).await;
        assert!(matches!(outcome, PageOutcome::Failed(_)));
        assert!(matches!(page.state(), LoadState::Failed(_)));
        assert!(page.render().contains("Please try again later."));
    }

    #[tokio::test]
    async fn test_unmount_cancels_load() {
        let dir = tempfile::tempdir().unwrap();
        let inner = MemorySource::new(catalog());
        let auth = logged_in(&inner, &dir).await;
        let source = Arc::new(SlowSource {
            inner,
            delay: Duration::from_millis(200),
        });

        let mut page = DashboardPage::new(PageContext::new(source));
        let token = page.context().cancel_token();
        let (outcome, _) = tokio::join!(page.load(&auth), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        assert_eq!(outcome, PageOutcome::Cancelled);
        assert!(page.section(DashboardSection::All).is_empty());
    }
}
