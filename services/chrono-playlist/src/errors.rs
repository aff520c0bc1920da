//!
//! src/errors.rs
//!
//! Defines enums and methods of error conversion
//! for errors the playlist service uses
//!
//! The scoring core never fails; these cover query parsing,
//! configuration and the catalog collaborators.
//!

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("config error: {0}")]
    Config(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("catalog error: {0}")]
    Catalog(String),
    #[error("db error: {0}")]
    Db(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error)
}

impl PlaylistError {
    /// True for errors caused by what the user typed rather than
    /// by storage or configuration
    pub fn is_user_facing(&self) -> bool {
        matches!(self, PlaylistError::Parse(_) | PlaylistError::Validation(_))
    }
}

impl From<serde_json::Error> for PlaylistError {
    fn from(e: serde_json::Error) -> Self { PlaylistError::Parse(e.to_string()) }
}

impl From<sqlx::Error> for PlaylistError {
    fn from(e: sqlx::Error) -> Self { PlaylistError::Db(e.to_string()) }
}

impl From<tokio::task::JoinError> for PlaylistError {
    fn from(e: tokio::task::JoinError) -> Self {
        PlaylistError::Catalog(format!("background task: {e}"))
    }
}
