//!
//! src/selection.rs
//!
//! Picks an ordered, varied subset of scored songs.
//!
//! Songs are ranked by descending weight (catalog order on ties). A first
//! pass admits songs while the per-artist and per-genre caps hold, a second
//! pass tops the playlist up from the same ranking with the caps lifted.
//!

use std::collections::{HashMap, HashSet};

use crate::types::{ScoredSong, Song};

pub const MAX_PER_ARTIST: usize = 2;
pub const MAX_PER_GENRE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiversityLimits {
    pub per_artist: usize,
    pub per_genre: usize
}

impl Default for DiversityLimits {
    fn default() -> Self {
        Self { per_artist: MAX_PER_ARTIST, per_genre: MAX_PER_GENRE }
    }
}

pub fn select_playlist(scored: &[ScoredSong<'_>], count: usize) -> Vec<Song> {
    select_playlist_with(scored, count, DiversityLimits::default())
}

pub fn select_playlist_with(
    scored: &[ScoredSong<'_>],
    count: usize,
    limits: DiversityLimits
) -> Vec<Song> {
    // NaN fails the comparison as well, so it is dropped with the zeros
    let mut ranked: Vec<&ScoredSong<'_>> = scored
        .iter()
        .filter(|s| s.weight > 0.0)
        .collect();

    // sort_by is stable, equal weights keep catalog order
    ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    let mut picked: Vec<&Song> = Vec::with_capacity(count.min(ranked.len()));
    let mut picked_ids: HashSet<i64> = HashSet::new();
    let mut per_artist: HashMap<&str, usize> = HashMap::new();
    let mut per_genre: HashMap<&str, usize> = HashMap::new();

    for candidate in &ranked {
        if picked.len() >= count {
            break;
        }
        let song = candidate.song;
        if picked_ids.contains(&song.id) {
            continue;
        }

        let artist_seen = per_artist.get(song.artist.as_str()).copied().unwrap_or(0);
        let genre_seen = per_genre.get(song.genre.as_str()).copied().unwrap_or(0);
        if artist_seen < limits.per_artist && genre_seen < limits.per_genre {
            *per_artist.entry(song.artist.as_str()).or_default() += 1;
            *per_genre.entry(song.genre.as_str()).or_default() += 1;
            picked_ids.insert(song.id);
            picked.push(song);
        }
    }

    let diverse = picked.len();

    for candidate in &ranked {
        if picked.len() >= count {
            break;
        }
        let song = candidate.song;
        if picked_ids.insert(song.id) {
            picked.push(song);
        }
    }

    tracing::debug!(
        candidates = ranked.len(),
        diverse,
        filled = picked.len() - diverse,
        "selection.done"
    );

    picked.into_iter().take(count).cloned().collect()
}
