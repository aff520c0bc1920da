//!
//! src/types.rs
//!
//! Catalog and playlist records shared by the scoring core
//! and the storage collaborators
//!

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single catalog entry. Ids are unique within one catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub year: i32,
    pub genre: String,
    pub cultural_region: String,
    #[serde(default)]
    pub historical_significance: String,

    // streaming links, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apple_music_url: Option<String>
}

/// A song submitted to a catalog before it has been assigned an id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub year: i32,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub cultural_region: String,
    #[serde(default)]
    pub historical_significance: String,
    #[serde(default)]
    pub spotify_url: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub apple_music_url: Option<String>
}

impl NewSong {
    pub fn with_id(self, id: i64) -> Song {
        Song {
            id,
            title: self.title,
            artist: self.artist,
            year: self.year,
            genre: self.genre,
            cultural_region: self.cultural_region,
            historical_significance: self.historical_significance,
            spotify_url: self.spotify_url,
            youtube_url: self.youtube_url,
            apple_music_url: self.apple_music_url
        }
    }
}

/// A (year, location) pair asked about by a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub year: i32,
    pub location: String
}

impl Query {
    pub fn new(year: i32, location: impl Into<String>) -> Self {
        Self { year, location: location.into() }
    }
}

/// A catalog song paired with its combined weight for one query
#[derive(Debug, Clone, Copy)]
pub struct ScoredSong<'a> {
    pub song: &'a Song,
    pub weight: f64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistResult {
    pub songs: Vec<Song>,
    pub query_year: i32,
    pub query_location: String,
    pub generated_at: DateTime<Utc>
}
