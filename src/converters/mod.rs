//! JSON to model converters.
//!
//! This module turns raw backend track records into [`Track`] view-models.
//! Field names differ between backend revisions (`artist_name` vs `artist`,
//! `album_title` vs `album`, `album_cover` vs `coverImage`), so every lookup
//! accepts the whole set of known aliases.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{Result, SoundwaveError};
use crate::models::{Track, TrackDetails};

/// Get the first non-empty string among several keys.
fn get_str_any(json: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| json.get(*k).and_then(|v| v.as_str()))
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Get a string ID from JSON (handles string, integer and float IDs).
///
/// The backend serialises numeric ids as floats (`3135556.0`); whole floats
/// are normalised to their integer form. Floats beyond the `i64` range keep
/// their float rendering.
fn get_id(json: &Value, key: &str) -> Option<String> {
    let v = json.get(key)?;
    if let Some(s) = v.as_str() {
        return Some(s.to_string());
    }
    if let Some(n) = v.as_u64() {
        return Some(n.to_string());
    }
    if let Some(n) = v.as_i64() {
        return Some(n.to_string());
    }
    match v.as_f64() {
        Some(f) if f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&f) => {
            Some(format!("{}", f as i64))
        }
        Some(f) => Some(f.to_string()),
        None => None,
    }
}

/// Get a non-negative integer, accepting floats and numeric strings.
fn get_u64(json: &Value, key: &str) -> Option<u64> {
    let v = json.get(key)?;
    v.as_u64()
        .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Get a flag that may be encoded as a bool or as 0/1.
fn get_flag(json: &Value, keys: &[&str]) -> bool {
    keys.iter()
        .filter_map(|k| json.get(*k))
        .any(|v| v.as_bool().unwrap_or_else(|| v.as_f64().unwrap_or(0.0) != 0.0))
}

/// Parse the catalog metadata of a record.
fn parse_details(json: &Value) -> TrackDetails {
    TrackDetails {
        link: get_str_any(json, &["link"]),
        duration_secs: get_u64(json, "duration").unwrap_or(0) as u32,
        preview: get_str_any(json, &["preview"]),
        position: get_u64(json, "position").map(|p| p as u32),
        rank: get_u64(json, "rank").unwrap_or(0),
        explicit: get_flag(json, &["explicit_lyrics", "explicit"]),
        artist_id: get_id(json, "artist_id"),
        album_id: get_id(json, "album_id"),
    }
}

/// Parse a single backend track record.
///
/// `liked` comes from the caller: records do not carry the relationship
/// unless they set `isLiked`, which wins when present.
pub fn parse_track(json: &Value, liked: bool) -> Result<Track> {
    let id = get_id(json, "id")
        .ok_or_else(|| SoundwaveError::InvalidRecord(format!("missing id in {}", json)))?;

    let title = get_str_any(json, &["title"])
        .ok_or_else(|| SoundwaveError::InvalidRecord(format!("missing title for track {}", id)))?;

    let liked = json
        .get("isLiked")
        .and_then(|v| v.as_bool())
        .unwrap_or(liked);

    Ok(Track {
        artist: get_str_any(json, &["artist_name", "artist"]).unwrap_or_default(),
        album: get_str_any(json, &["album_title", "album"]),
        cover_image: get_str_any(json, &["album_cover", "coverImage", "cover_image"])
            .unwrap_or_default(),
        liked,
        details: parse_details(json),
        id,
        title,
    })
}

/// Parse an array of records.
///
/// Every entry whose id is in `liked_ids` gets `liked = true`. Duplicate ids
/// keep their first occurrence so a list never holds the same track twice.
pub fn parse_tracks(json: &Value, liked_ids: &HashSet<String>) -> Result<Vec<Track>> {
    let records = json
        .as_array()
        .ok_or_else(|| SoundwaveError::InvalidRecord("expected an array of tracks".to_string()))?;

    let mut seen = HashSet::new();
    let mut tracks = Vec::with_capacity(records.len());
    for record in records {
        let mut track = parse_track(record, false)?;
        if !seen.insert(track.id.clone()) {
            continue;
        }
        if liked_ids.contains(&track.id) {
            track.liked = true;
        }
        tracks.push(track);
    }
    Ok(tracks)
}

/// Parse a liked-tracks response; every entry is liked by definition.
pub fn parse_liked_tracks(json: &Value) -> Result<Vec<Track>> {
    let mut tracks = parse_tracks(json, &HashSet::new())?;
    for track in &mut tracks {
        track.liked = true;
    }
    Ok(tracks)
}
