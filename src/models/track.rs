//! Track-related models.
//!
//! A [`Track`] is the view-model rendered in every list. It is built from a
//! backend record by the converters and carries a client-derived liked flag.

use serde::{Deserialize, Serialize};

/// Catalog metadata that list rows do not need but the backend provides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackDetails {
    /// Link to the track on the catalog site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Duration in seconds.
    #[serde(default)]
    pub duration_secs: u32,

    /// URL of a short audio preview.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,

    /// Position of the track on its album.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,

    /// Catalog popularity rank.
    #[serde(default)]
    pub rank: u64,

    /// Whether the track has explicit lyrics.
    #[serde(default)]
    pub explicit: bool,

    /// Artist identifier in the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,

    /// Album identifier in the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,
}

/// A single song shown in a list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Track {
    /// Stable, unique identifier.
    pub id: String,

    /// Track title.
    pub title: String,

    /// Artist name.
    pub artist: String,

    /// Album name, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,

    /// Cover image URL. Empty when the backend has none.
    #[serde(default)]
    pub cover_image: String,

    /// Whether the current user likes this track.
    #[serde(default)]
    pub liked: bool,

    /// Additional catalog metadata.
    #[serde(default)]
    pub details: TrackDetails,
}

impl Track {
    /// Create a track with the fields every list needs.
    pub fn new<S1, S2, S3>(id: S1, title: S2, artist: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            ..Default::default()
        }
    }

    /// Set the album name.
    pub fn with_album<S: Into<String>>(mut self, album: S) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Set the cover image URL.
    pub fn with_cover<S: Into<String>>(mut self, cover: S) -> Self {
        self.cover_image = cover.into();
        self
    }

    /// Set the liked flag.
    pub fn with_liked(mut self, liked: bool) -> Self {
        self.liked = liked;
        self
    }

    /// Get duration formatted as MM:SS.
    pub fn duration_formatted(&self) -> String {
        let minutes = self.details.duration_secs / 60;
        let seconds = self.details.duration_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }

    /// Whether a free-text query matches the title or artist.
    ///
    /// Case-insensitive substring match. Used by the in-memory source only;
    /// the backend owns real search semantics.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }
        self.title.to_lowercase().contains(&query) || self.artist.to_lowercase().contains(&query)
    }
}
