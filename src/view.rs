//! Plain-text rendering of track lists.

use std::fmt::Write;

use crate::library::{LikeState, TrackList, TrackRow};

/// Default message for an empty list.
pub const EMPTY_MESSAGE: &str = "No songs found.";

const LIKED: &str = "♥";
const UNLIKED: &str = "♡";
const PENDING: &str = "…";

/// Render one row as `id. title - artist [album] ♥`.
pub fn render_row(row: &TrackRow) -> String {
    let track = row.track();
    let mut line = format!("{}. {} - {}", track.id, track.title, track.artist);
    if let Some(album) = &track.album {
        let _ = write!(line, " [{}]", album);
    }
    let marker = match row.state() {
        LikeState::PendingLike | LikeState::PendingUnlike => {
            if row.is_liked() {
                format!("{}{}", LIKED, PENDING)
            } else {
                format!("{}{}", UNLIKED, PENDING)
            }
        }
        _ if row.is_liked() => LIKED.to_string(),
        _ => UNLIKED.to_string(),
    };
    let _ = write!(line, " {}", marker);
    line
}

/// Render a titled list, or its empty-state message.
pub fn render_list(title: &str, list: &TrackList, empty_message: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "-".repeat(title.chars().count()));
    if list.is_empty() {
        let _ = writeln!(out, "{}", empty_message);
        return out;
    }
    for row in list.rows() {
        let _ = writeln!(out, "{}", render_row(row));
    }
    out
}
