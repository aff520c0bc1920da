//!
//! src/tabular.rs
//!
//! Row layout used when exchanging the catalog with spreadsheets,
//! plus tab-separated file helpers for it.
//!
//! Rows read from a sheet are messy: cells go missing, numbers arrive as
//! text. Reading never fails, it normalizes instead.
//!

use std::fs;
use std::path::Path;

use crate::errors::PlaylistError;
use crate::types::Song;

pub const HEADERS: [&str; 10] = [
    "ID",
    "Title",
    "Artist",
    "Year",
    "Genre",
    "Cultural Region",
    "Historical Significance",
    "Spotify URL",
    "YouTube URL",
    "Apple Music URL",
];

pub fn song_to_row(song: &Song) -> Vec<String> {
    vec![
        song.id.to_string(),
        song.title.clone(),
        song.artist.clone(),
        song.year.to_string(),
        song.genre.clone(),
        song.cultural_region.clone(),
        song.historical_significance.clone(),
        song.spotify_url.clone().unwrap_or_default(),
        song.youtube_url.clone().unwrap_or_default(),
        song.apple_music_url.clone().unwrap_or_default(),
    ]
}

pub fn songs_to_rows(songs: &[Song]) -> Vec<Vec<String>> {
    songs.iter().map(song_to_row).collect()
}

/// Rows with an empty first cell are skipped
pub fn songs_from_rows(rows: &[Vec<String>]) -> Vec<Song> {
    rows.iter()
        .filter(|row| row.first().is_some_and(|id| !id.trim().is_empty()))
        .map(|row| song_from_row(row))
        .collect()
}

pub fn song_from_row(row: &[String]) -> Song {
    let text = |i: usize| row.get(i).map(|c| c.trim().to_string()).unwrap_or_default();
    let link = |i: usize| Some(text(i)).filter(|c| !c.is_empty());

    Song {
        id: leading_int(&text(0)).unwrap_or(0),
        title: text(1),
        artist: text(2),
        year: leading_int(&text(3))
            .and_then(|y| i32::try_from(y).ok())
            .unwrap_or(0),
        genre: text(4),
        cultural_region: text(5),
        historical_significance: text(6),
        spotify_url: link(7),
        youtube_url: link(8),
        apple_music_url: link(9)
    }
}

/// Reads an optional sign and the digits that follow it, so "1776 (approx.)"
/// still yields 1776
fn leading_int(cell: &str) -> Option<i64> {
    let cell = cell.trim_start();
    let (sign, digits) = match cell.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, cell.strip_prefix('+').unwrap_or(cell))
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Gives rows that arrived without a usable id (0 or negative) fresh ids
/// after the largest existing one, in row order
pub fn assign_missing_ids(songs: &mut [Song]) {
    let mut next = songs.iter().map(|s| s.id).max().unwrap_or(0).max(0) + 1;
    for song in songs.iter_mut().filter(|s| s.id <= 0) {
        song.id = next;
        next += 1;
    }
}

fn clean_cell(cell: &str) -> String {
    cell.replace(['\t', '\r', '\n'], " ")
}

pub fn write_tsv(path: impl AsRef<Path>, songs: &[Song]) -> Result<(), PlaylistError> {
    let mut out = HEADERS.join("\t");
    out.push('\n');
    for row in songs_to_rows(songs) {
        let cells: Vec<String> = row.iter().map(|c| clean_cell(c)).collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    fs::write(path.as_ref(), out)?;
    Ok(())
}

/// A leading header line is skipped if present
pub fn read_tsv(path: impl AsRef<Path>) -> Result<Vec<Song>, PlaylistError> {
    let text = fs::read_to_string(path.as_ref())?;
    let mut rows: Vec<Vec<String>> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect();

    let has_header = rows
        .first()
        .and_then(|row| row.first())
        .is_some_and(|cell| cell.trim().eq_ignore_ascii_case(HEADERS[0]));
    if has_header {
        rows.remove(0);
    }

    let songs = songs_from_rows(&rows);
    tracing::debug!(path = %path.as_ref().display(), rows = rows.len(), songs = songs.len(), "tabular.read");
    Ok(songs)
}
