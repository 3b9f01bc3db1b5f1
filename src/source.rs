//! Track data sources.
//!
//! Pages never talk to HTTP directly. They are handed a [`TrackSource`],
//! which is either the live [`MusicApi`](crate::api::MusicApi) or the
//! in-memory [`MemorySource`] used offline and in tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Result, SoundwaveError};
use crate::models::{Session, Track};

/// Backend acknowledgement of a login.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoginReply {
    /// Welcome text from the backend, empty for local logins.
    #[serde(default)]
    pub message: String,
}

/// Capability every page needs from the backend.
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Fetch the whole catalog (or the backend's sample of it).
    async fn fetch_all(&self) -> Result<Vec<Track>>;

    /// Fetch tracks recommended for the session's user.
    async fn fetch_recommended(&self, session: &Session) -> Result<Vec<Track>>;

    /// Search by free text. Matching is owned by the source.
    async fn search(&self, query: &str) -> Result<Vec<Track>>;

    /// Fetch the session user's liked tracks; every result has `liked = true`.
    async fn fetch_liked(&self, session: &Session) -> Result<Vec<Track>>;

    /// Record that the session user likes a track.
    async fn like(&self, track_id: &str, session: &Session) -> Result<()>;

    /// Remove the like relationship.
    async fn unlike(&self, track_id: &str, session: &Session) -> Result<()>;

    /// Announce a username to the backend.
    async fn login(&self, username: &str) -> Result<LoginReply>;
}

/// A request observed by [`MemorySource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    FetchAll,
    FetchRecommended(String),
    Search(String),
    FetchLiked(String),
    Like { track_id: String, username: String },
    Unlike { track_id: String, username: String },
    Login(String),
}

#[derive(Debug, Default)]
struct MemoryState {
    users: HashSet<String>,
    likes: HashMap<String, HashSet<String>>,
    calls: Vec<SourceCall>,
    offline: bool,
}

/// In-memory catalog with per-user like sets.
///
/// Mirrors the backend's observable behaviour: likes on unknown users or
/// tracks are rejected with a 404, unlikes are idempotent, and
/// recommendations are tracks other users like that the caller does not.
///
/// Recommendations use a simplified ranking: a track scores one point per
/// other user who likes it, with no similarity weighting between users and
/// no `top_n` cut-off. Every candidate is returned.
#[derive(Debug, Default)]
pub struct MemorySource {
    catalog: Vec<Track>,
    state: Mutex<MemoryState>,
}

impl MemorySource {
    /// Create a source over a fixed catalog.
    ///
    /// Liked flags on the given tracks are ignored; likes live per user.
    pub fn new(catalog: Vec<Track>) -> Self {
        let catalog = catalog.into_iter().map(|t| t.with_liked(false)).collect();
        Self {
            catalog,
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Register a user that already likes some tracks.
    pub async fn add_user<I, S>(&self, username: &str, liked: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.lock().await;
        state.users.insert(username.to_string());
        state
            .likes
            .entry(username.to_string())
            .or_default()
            .extend(liked.into_iter().map(Into::into));
    }

    /// Make every subsequent request fail with a 503.
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Requests received so far, in order.
    pub async fn calls(&self) -> Vec<SourceCall> {
        self.state.lock().await.calls.clone()
    }

    /// Whether a user currently likes a track.
    pub async fn is_liked(&self, username: &str, track_id: &str) -> bool {
        self.state
            .lock()
            .await
            .likes
            .get(username)
            .is_some_and(|l| l.contains(track_id))
    }

    async fn record(&self, call: SourceCall) -> Result<tokio::sync::MutexGuard<'_, MemoryState>> {
        debug!("memory source: {:?}", call);
        let mut state = self.state.lock().await;
        state.calls.push(call);
        if state.offline {
            return Err(SoundwaveError::Server {
                status: 503,
                detail: "Service unavailable".to_string(),
            });
        }
        Ok(state)
    }

    fn tracks_with_ids(&self, ids: &HashSet<String>, liked: bool) -> Vec<Track> {
        self.catalog
            .iter()
            .filter(|t| ids.contains(&t.id))
            .map(|t| t.clone().with_liked(liked))
            .collect()
    }
}

#[async_trait]
impl TrackSource for MemorySource {
    async fn fetch_all(&self) -> Result<Vec<Track>> {
        self.record(SourceCall::FetchAll).await?;
        Ok(self.catalog.clone())
    }

    async fn fetch_recommended(&self, session: &Session) -> Result<Vec<Track>> {
        let user = session.username();
        let state = self
            .record(SourceCall::FetchRecommended(user.to_string()))
            .await?;

        let Some(own) = state.likes.get(user) else {
            return Ok(Vec::new());
        };

        // Plain like counts; the live backend weights users by similarity.
        let mut scores: HashMap<&str, usize> = HashMap::new();
        for (other, likes) in &state.likes {
            if other == user {
                continue;
            }
            for id in likes.difference(own) {
                *scores.entry(id.as_str()).or_default() += 1;
            }
        }

        let mut ranked: Vec<&Track> = self
            .catalog
            .iter()
            .filter(|t| scores.contains_key(t.id.as_str()))
            .collect();
        ranked.sort_by(|a, b| scores[b.id.as_str()].cmp(&scores[a.id.as_str()]));
        Ok(ranked.into_iter().cloned().collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<Track>> {
        self.record(SourceCall::Search(query.to_string())).await?;
        Ok(self
            .catalog
            .iter()
            .filter(|t| t.matches(query))
            .cloned()
            .collect())
    }

    async fn fetch_liked(&self, session: &Session) -> Result<Vec<Track>> {
        let user = session.username();
        let state = self.record(SourceCall::FetchLiked(user.to_string())).await?;
        Ok(state
            .likes
            .get(user)
            .map(|ids| self.tracks_with_ids(ids, true))
            .unwrap_or_default())
    }

    async fn like(&self, track_id: &str, session: &Session) -> Result<()> {
        let user = session.username();
        let mut state = self
            .record(SourceCall::Like {
                track_id: track_id.to_string(),
                username: user.to_string(),
            })
            .await?;

        let known_track = self.catalog.iter().any(|t| t.id == track_id);
        if !state.users.contains(user) || !known_track {
            return Err(SoundwaveError::Server {
                status: 404,
                detail: "User or Song not found".to_string(),
            });
        }
        state
            .likes
            .entry(user.to_string())
            .or_default()
            .insert(track_id.to_string());
        Ok(())
    }

    async fn unlike(&self, track_id: &str, session: &Session) -> Result<()> {
        let user = session.username();
        let mut state = self
            .record(SourceCall::Unlike {
                track_id: track_id.to_string(),
                username: user.to_string(),
            })
            .await?;

        if !state.users.contains(user) {
            return Err(SoundwaveError::Server {
                status: 404,
                detail: "User not found".to_string(),
            });
        }
        if let Some(likes) = state.likes.get_mut(user) {
            likes.remove(track_id);
        }
        Ok(())
    }

    async fn login(&self, username: &str) -> Result<LoginReply> {
        let mut state = self.record(SourceCall::Login(username.to_string())).await?;
        let message = if state.users.insert(username.to_string()) {
            format!("New user created: {}", username)
        } else {
            format!("Welcome back, {}!", username)
        };
        Ok(LoginReply { message })
    }
}

/// A small catalog for offline use and tests.
pub fn demo_catalog() -> Vec<Track> {
    vec![
        Track::new("s1", "Bohemian Rhapsody", "Queen").with_album("A Night at the Opera"),
        Track::new("s2", "Sweet Child O' Mine", "Guns N' Roses")
            .with_album("Appetite for Destruction"),
        Track::new("s3", "Back in Black", "AC/DC").with_album("Back in Black"),
        Track::new("s4", "Blinding Lights", "The Weeknd").with_album("After Hours"),
        Track::new("s5", "Bad Guy", "Billie Eilish")
            .with_album("When We All Fall Asleep, Where Do We Go?"),
        Track::new("s6", "Watermelon Sugar", "Harry Styles").with_album("Fine Line"),
        Track::new("s7", "Take Five", "Dave Brubeck").with_album("Time Out"),
        Track::new("s8", "So What", "Miles Davis").with_album("Kind of Blue"),
    ]
}
