//!
//! src/playlist.rs
//!
//! Turns a catalog snapshot and a (year, location) query into a playlist.
//! Pure apart from reading the clock in `generate_playlist`.
//!

use chrono::{DateTime, Utc};

use crate::scoring::score_catalog;
use crate::selection::select_playlist;
use crate::types::{PlaylistResult, Query, Song};

pub const PLAYLIST_SIZE: usize = 10;

pub fn generate_playlist(catalog: &[Song], year: i32, location: &str) -> PlaylistResult {
    generate_playlist_at(catalog, year, location, Utc::now())
}

/// Same as `generate_playlist` with the generation time supplied
pub fn generate_playlist_at(
    catalog: &[Song],
    year: i32,
    location: &str,
    generated_at: DateTime<Utc>
) -> PlaylistResult {
    generate_playlist_with(catalog, &Query::new(year, location), PLAYLIST_SIZE, generated_at)
}

pub fn generate_playlist_with(
    catalog: &[Song],
    query: &Query,
    count: usize,
    generated_at: DateTime<Utc>
) -> PlaylistResult {
    let scored = score_catalog(catalog, query);
    let songs = select_playlist(&scored, count);

    tracing::info!(
        year = query.year,
        location = %query.location,
        catalog = catalog.len(),
        selected = songs.len(),
        "playlist.generated"
    );

    PlaylistResult {
        songs,
        query_year: query.year,
        query_location: query.location.clone(),
        generated_at
    }
}
