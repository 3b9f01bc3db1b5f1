//! Search page.

use std::collections::HashSet;

use futures_util::future::try_join;
use tracing::{debug, info};

use super::{load_failed, toggle_row, LoadState, PageContext, PageOutcome, Screen, LIKE_FAILED};
use crate::error::{Result, SoundwaveError};
use crate::library::{AckOutcome, ListKind, TrackList};
use crate::models::Session;
use crate::session::AuthContext;
use crate::view;

#[derive(Debug)]
pub struct SearchPage {
    ctx: PageContext,
    session: Option<Session>,
    state: LoadState,
    notice: Option<String>,
    query: Option<String>,
    results: TrackList,
}

impl SearchPage {
    pub fn new(ctx: PageContext) -> Self {
        let mode = ctx.mode();
        Self {
            ctx,
            session: None,
            state: LoadState::Idle,
            notice: None,
            query: None,
            results: TrackList::new(ListKind::Search, mode),
        }
    }

    /// Run a search.
    ///
    /// A blank query clears the results without a request. A query that
    /// matches nothing is a successful, empty search.
    pub async fn search(&mut self, auth: &AuthContext, query: &str) -> PageOutcome {
        let session = match auth.require() {
            Ok(session) => session.clone(),
            Err(_) => return PageOutcome::Redirect(Screen::Login),
        };

        let query = query.trim();
        if query.is_empty() {
            debug!("Blank search, clearing results");
            self.query = None;
            self.results.clear();
            self.state = LoadState::Idle;
            return PageOutcome::Ready;
        }

        self.state = LoadState::Loading;
        self.query = Some(query.to_string());
        let source = self.ctx.source();
        let fetched = self
            .ctx
            .run(try_join(source.search(query), source.fetch_liked(&session)))
            .await;

        let (mut found, liked) = match fetched {
            Ok(data) => data,
            Err(e) => return load_failed(&mut self.state, "search results", e),
        };

        let liked: HashSet<String> = liked.into_iter().map(|t| t.id).collect();
        for track in &mut found {
            track.liked = track.liked || liked.contains(&track.id);
        }
        info!("Search '{}' returned {} tracks", query, found.len());

        self.results.replace(found);
        self.session = Some(session);
        self.state = LoadState::Ready;
        PageOutcome::Ready
    }

    pub async fn toggle_like(&mut self, track_id: &str) -> Result<AckOutcome> {
        let session = self.session.as_ref().ok_or(SoundwaveError::NotAuthenticated)?;
        let outcome = toggle_row(&self.ctx, &mut self.results, session, track_id).await?;
        match outcome {
            AckOutcome::Reverted => self.notice = Some(LIKE_FAILED.to_string()),
            AckOutcome::Applied => self.notice = None,
            _ => {}
        }
        Ok(outcome)
    }

    /// Whether the last search succeeded with no matches.
    pub fn is_empty_result(&self) -> bool {
        self.state == LoadState::Ready && self.results.is_empty()
    }

    pub fn results(&self) -> &TrackList {
        &self.results
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
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
        match (&self.state, &self.query) {
            (LoadState::Failed(message), _) => format!("{}\n", message),
            (LoadState::Loading, _) => "Searching...\n".to_string(),
            (LoadState::Ready, Some(query)) => {
                let empty = format!("No songs found for \"{}\".", query);
                let mut out = view::render_list(
                    &format!("Results for \"{}\"", query),
                    &self.results,
                    &empty,
                );
                if let Some(notice) = &self.notice {
                    out.push_str(&format!("\n{}\n", notice));
                }
                out
            }
            _ => "Search for songs by title or artist.\n".to_string(),
        }
    }
}
