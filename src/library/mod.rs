//! Page-owned track lists and like-toggle reconciliation.
//!
//! A [`TrackList`] is the authoritative in-memory list of one page. Like
//! toggles go through [`TrackList::begin_toggle`] and
//! [`TrackList::complete`]; every row numbers its requests so only the
//! answer to the most recent one decides what the row shows.

pub mod list;
pub mod row;

pub use list::{AckOutcome, ListKind, ToggleTicket, TrackList, UpdateMode};
pub use row::{LikeState, TrackRow};
