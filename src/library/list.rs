//! Track list with per-row like sequencing.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::row::TrackRow;
use crate::error::{Result, SoundwaveError};
use crate::models::Track;

/// Which page a list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Catalog,
    Recommended,
    Search,
    /// "My liked tracks": a confirmed unlike removes the row.
    Liked,
}

/// When the displayed flag changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Flip the flag as soon as the user clicks; revert on failure.
    #[default]
    Optimistic,
    /// Keep the flag until the backend acknowledges.
    Confirmed,
}

/// Handle for one in-flight like/unlike request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleTicket {
    pub track_id: String,
    /// `true` for like, `false` for unlike.
    pub liked: bool,
    pub seq: u64,
    generation: u64,
}

/// What [`TrackList::complete`] did with an acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// The row now shows the confirmed value.
    Applied,
    /// The row was removed (unlike on the liked list).
    Removed,
    /// The request failed; the row shows the last confirmed value again.
    Reverted,
    /// A newer request was issued for the row; display unchanged.
    Stale,
    /// The row no longer exists (list refreshed or row removed).
    Gone,
}

/// Ordered, id-unique list of tracks owned by one page.
#[derive(Debug, Clone)]
pub struct TrackList {
    kind: ListKind,
    mode: UpdateMode,
    rows: Vec<TrackRow>,
    generation: u64,
}

impl TrackList {
    /// Create an empty list.
    pub fn new(kind: ListKind, mode: UpdateMode) -> Self {
        Self {
            kind,
            mode,
            rows: Vec::new(),
            generation: 0,
        }
    }

    /// Create a list holding `tracks`.
    pub fn with_tracks(kind: ListKind, mode: UpdateMode, tracks: Vec<Track>) -> Self {
        let mut list = Self::new(kind, mode);
        list.replace(tracks);
        list
    }

    /// Rebuild the list from a fresh fetch.
    ///
    /// Duplicate ids keep their first occurrence. Tickets issued before the
    /// refresh are answered with [`AckOutcome::Gone`].
    pub fn replace(&mut self, tracks: Vec<Track>) {
        let kind = self.kind;
        let mut seen = HashSet::new();
        self.rows = tracks
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .map(|mut t| {
                if kind == ListKind::Liked {
                    t.liked = true;
                }
                TrackRow::new(t)
            })
            .collect();
        self.generation += 1;
    }

    /// Drop every row.
    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn mode(&self) -> UpdateMode {
        self.mode
    }

    pub fn rows(&self) -> &[TrackRow] {
        &self.rows
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.rows.iter().map(|r| &r.track)
    }

    pub fn get(&self, track_id: &str) -> Option<&TrackRow> {
        self.rows.iter().find(|r| r.track.id == track_id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ids of rows currently shown as liked.
    pub fn liked_ids(&self) -> HashSet<String> {
        self.rows
            .iter()
            .filter(|r| r.is_liked())
            .map(|r| r.track.id.clone())
            .collect()
    }

    fn position(&self, track_id: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.track.id == track_id)
    }

    /// Start a toggle on a row.
    ///
    /// The request target is the opposite of what the user currently asks
    /// for, so a second click while the first is in flight flips it back.
    pub fn begin_toggle(&mut self, track_id: &str) -> Result<ToggleTicket> {
        let mode = self.mode;
        let generation = self.generation;
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.track.id == track_id)
            .ok_or_else(|| SoundwaveError::UnknownTrack(track_id.to_string()))?;

        let target = !row.intent();
        row.issued += 1;
        row.pending = Some(target);
        if mode == UpdateMode::Optimistic {
            row.track.liked = target;
        }

        debug!(
            "Toggle {} -> {} (seq {})",
            track_id,
            if target { "like" } else { "unlike" },
            row.issued
        );

        Ok(ToggleTicket {
            track_id: track_id.to_string(),
            liked: target,
            seq: row.issued,
            generation,
        })
    }

    /// Record a like change confirmed elsewhere (another list on the page).
    ///
    /// Rows with a request in flight are left alone; their own answer wins.
    pub fn sync_liked(&mut self, track_id: &str, liked: bool) {
        if let Some(row) = self
            .rows
            .iter_mut()
            .find(|r| r.track.id == track_id && r.pending.is_none())
        {
            row.confirmed = liked;
            row.track.liked = liked;
        }
    }

    /// Apply the backend's answer to a ticket.
    ///
    /// Successful answers always advance the row's confirmed value when they
    /// are newer than the last one applied. While a request is in flight only
    /// the answer to the latest one changes what is displayed; once none is,
    /// a late success moves the display to the new confirmed value.
    pub fn complete<T>(&mut self, ticket: &ToggleTicket, result: &Result<T>) -> AckOutcome {
        if ticket.generation != self.generation {
            debug!("Ignoring ack for {} from a previous load", ticket.track_id);
            return AckOutcome::Gone;
        }
        let Some(index) = self.position(&ticket.track_id) else {
            return AckOutcome::Gone;
        };
        let kind = self.kind;

        let row = &mut self.rows[index];
        if result.is_ok() && ticket.seq > row.confirmed_seq {
            row.confirmed = ticket.liked;
            row.confirmed_seq = ticket.seq;
        }

        if ticket.seq != row.issued {
            warn!(
                "Discarding stale ack for {} (seq {}, latest {})",
                ticket.track_id, ticket.seq, row.issued
            );
            // The latest request already resolved, so show what the backend holds now.
            if row.pending.is_none() && row.track.liked != row.confirmed {
                row.track.liked = row.confirmed;
                if kind == ListKind::Liked && !row.confirmed {
                    self.rows.remove(index);
                    return AckOutcome::Removed;
                }
            }
            return AckOutcome::Stale;
        }

        row.pending = None;
        row.track.liked = row.confirmed;

        match result {
            Ok(_) if kind == ListKind::Liked && !ticket.liked => {
                self.rows.remove(index);
                AckOutcome::Removed
            }
            Ok(_) => AckOutcome::Applied,
            Err(e) => {
                warn!(
                    "Reverting {} to {} after failed request: {}",
                    ticket.track_id,
                    if row.confirmed { "liked" } else { "unliked" },
                    e
                );
                AckOutcome::Reverted
            }
        }
    }
}
