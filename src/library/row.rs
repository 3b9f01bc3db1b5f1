//! A single row of a track list.

use crate::models::Track;

/// What a row's like control shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    Unliked,
    Liked,
    /// A like request is in flight.
    PendingLike,
    /// An unlike request is in flight.
    PendingUnlike,
}

/// A track plus its like-synchronisation bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRow {
    pub(crate) track: Track,
    /// Last value the backend acknowledged (or supplied on fetch).
    pub(crate) confirmed: bool,
    /// Sequence number of the request that set `confirmed`.
    pub(crate) confirmed_seq: u64,
    /// Target of the latest in-flight request.
    pub(crate) pending: Option<bool>,
    /// Latest sequence number issued for this row.
    pub(crate) issued: u64,
}

impl TrackRow {
    pub(crate) fn new(track: Track) -> Self {
        Self {
            confirmed: track.liked,
            confirmed_seq: 0,
            pending: None,
            issued: 0,
            track,
        }
    }

    /// The track as it should be rendered.
    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn id(&self) -> &str {
        &self.track.id
    }

    /// The liked flag as currently displayed.
    pub fn is_liked(&self) -> bool {
        self.track.liked
    }

    /// Whether the like control should be disabled.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Last value known to match the backend.
    pub fn confirmed_liked(&self) -> bool {
        self.confirmed
    }

    pub fn state(&self) -> LikeState {
        match self.pending {
            Some(true) => LikeState::PendingLike,
            Some(false) => LikeState::PendingUnlike,
            None if self.confirmed => LikeState::Liked,
            None => LikeState::Unliked,
        }
    }

    /// The value the user is currently asking for.
    pub(crate) fn intent(&self) -> bool {
        self.pending.unwrap_or(self.confirmed)
    }
}
