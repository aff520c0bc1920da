//!
//! src/lib.rs
//!
//! Recommends a short playlist for a historical year and a place.
//!
//! Scoring and selection (`scoring`, `selection`, `playlist`) are pure and
//! take the catalog as an argument. Everything that touches storage,
//! configuration or logging sits around them.
//!

pub mod config;
pub mod errors;
pub mod logging;

pub mod catalog;
pub mod persistent;
pub mod tabular;

pub mod playlist;
pub mod query;
pub mod scoring;
pub mod selection;
pub mod types;

pub use errors::PlaylistError;
pub use playlist::{generate_playlist, generate_playlist_at, PLAYLIST_SIZE};
pub use query::parse_query;
pub use types::{NewSong, PlaylistResult, Query, ScoredSong, Song};
