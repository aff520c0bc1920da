//!
//! src/scoring.rs
//!
//! Temporal and location weights for catalog songs against a query.
//! The combined weight of a song is the product of the two.
//!

use crate::types::{Query, ScoredSong, Song};

/// Constants for temporal decay. A song 40 years older than the query
/// year lands at roughly a tenth of the weight of a same-year song.
pub const DECAY_YEARS: f64 = 17.5;

/// Constants for location relevance tiers
pub const BASE_LOCATION_SCORE: f64 = 0.5;
pub const MATCH_LOCATION_SCORE: f64 = 1.0;
pub const ALIAS_LOCATION_SCORE: f64 = 0.8;
pub const GLOBAL_LOCATION_SCORE: f64 = 0.7;

const GLOBAL_REGION: &str = "global";

// location keyword -> region keywords treated as equivalent
const HISTORICAL_ALIASES: &[(&str, &[&str])] = &[
    ("new amsterdam", &["dutch", "holland", "netherlands", "new york"]),
    ("new york",      &["america", "american", "new amsterdam"]),
    ("boston",        &["america", "american", "england", "british"]),
    ("philadelphia",  &["america", "american"]),
    ("virginia",      &["america", "american", "england", "british"]),
    ("london",        &["england", "british", "global"]),
    ("paris",         &["france", "french", "global"]),
];

/// Table of historical place names and the cultural regions they stand in
/// for. Keys and region keywords are stored lowercase.
#[derive(Debug, Clone, Copy)]
pub struct LocationAliases {
    entries: &'static [(&'static str, &'static [&'static str])]
}

impl LocationAliases {
    pub const fn historical() -> Self {
        Self { entries: HISTORICAL_ALIASES }
    }

    pub fn entries(&self) -> &'static [(&'static str, &'static [&'static str])] {
        self.entries
    }

    /// True when some key found in `location` maps to a keyword found
    /// in `region`. Both arguments must already be lowercase.
    pub fn links(&self, location: &str, region: &str) -> bool {
        self.entries
            .iter()
            .filter(|(key, _)| location.contains(key))
            .any(|(_, regions)| regions.iter().any(|r| region.contains(r)))
    }
}

impl Default for LocationAliases {
    fn default() -> Self { Self::historical() }
}

/// Weight of a song released in `song_year` for a playlist set in
/// `query_year`. Songs from after the query year weigh exactly zero.
pub fn temporal_weight(song_year: i32, query_year: i32) -> f64 {
    if song_year > query_year {
        return 0.0;
    }
    let years_before = f64::from(query_year) - f64::from(song_year);
    (-years_before / DECAY_YEARS).exp()
}

/// Relevance of a song's cultural region to a free-text location,
/// always within [0.5, 1.0]
pub fn location_relevance(song: &Song, query_location: &str) -> f64 {
    location_relevance_with(song, query_location, &LocationAliases::historical())
}

pub fn location_relevance_with(
    song: &Song,
    query_location: &str,
    aliases: &LocationAliases
) -> f64 {
    let location = query_location.to_lowercase();
    let region = song.cultural_region.to_lowercase();

    let mut score = BASE_LOCATION_SCORE;

    // a blank location is contained in every region, so it never matches
    let overlapping = !location.trim().is_empty()
        && (region.contains(&location) || location.contains(&region));
    if overlapping {
        score = MATCH_LOCATION_SCORE;
    }

    if aliases.links(&location, &region) {
        score = score.max(ALIAS_LOCATION_SCORE);
    }

    if region.contains(GLOBAL_REGION) {
        score = score.max(GLOBAL_LOCATION_SCORE);
    }

    score
}

pub fn combined_weight(song: &Song, query: &Query) -> f64 {
    temporal_weight(song.year, query.year) * location_relevance(song, &query.location)
}

/// Scores every catalog entry against the query, preserving catalog order
pub fn score_catalog<'a>(catalog: &'a [Song], query: &Query) -> Vec<ScoredSong<'a>> {
    catalog
        .iter()
        .map(|song| {
            let weight = combined_weight(song, query);
            tracing::trace!(song_id = song.id, weight, "scoring.song");
            ScoredSong { song, weight }
        })
        .collect()
}
