//!
//! src/catalog.rs
//!
//! Defines the catalog interface the binary reads songs through,
//! and the JSON file implementation of it.
//! The SQLite implementation lives in src/persistent.rs
//!

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::config::{CatalogConfig, CatalogSourceKind};
use crate::errors::PlaylistError;
use crate::persistent::SqliteCatalog;
use crate::types::{NewSong, Song};

#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Snapshot of every song, in catalog order
    async fn load_songs(&self) -> Result<Vec<Song>, PlaylistError>;

    /// Stores a new song under the next free id and returns it
    async fn add_song(&self, song: NewSong) -> Result<Song, PlaylistError>;

    async fn remove_song(&self, id: i64) -> Result<(), PlaylistError>;

    /// Overwrites the whole catalog
    async fn replace_all(&self, songs: &[Song]) -> Result<(), PlaylistError>;

    fn describe(&self) -> String;
}

pub async fn open_catalog(cfg: &CatalogConfig) -> Result<Box<dyn CatalogSource>, PlaylistError> {
    let catalog: Box<dyn CatalogSource> = match cfg.source {
        CatalogSourceKind::Json => Box::new(
            JsonFileCatalog::new(&cfg.json_path).with_backups(cfg.backup_on_write)
        ),
        CatalogSourceKind::Sqlite => Box::new(SqliteCatalog::init(&cfg.db_url).await?)
    };
    tracing::debug!(source = cfg.source.as_str(), catalog = %catalog.describe(), "catalog.opened");
    Ok(catalog)
}

/// Rejects songs missing the fields a playlist cannot do without
pub fn validate_new_song(song: &NewSong) -> Result<(), PlaylistError> {
    if song.title.trim().is_empty() || song.artist.trim().is_empty() || song.year == 0 {
        return Err(PlaylistError::Validation(
            "missing required fields: title, artist, year".to_string()
        ));
    }
    Ok(())
}

pub fn next_id(songs: &[Song]) -> i64 {
    songs.iter().map(|s| s.id).max().map_or(1, |max| max + 1)
}

pub fn ensure_unique_ids(songs: &[Song]) -> Result<(), PlaylistError> {
    let mut seen = HashSet::with_capacity(songs.len());
    for song in songs {
        if !seen.insert(song.id) {
            return Err(PlaylistError::Validation(format!("duplicate song id {}", song.id)));
        }
    }
    Ok(())
}

///
/// Catalog kept as a pretty-printed JSON array on disk
///
pub struct JsonFileCatalog {
    path: PathBuf,
    backups: bool,
    // serializes read-modify-write cycles within this process
    write_lock: Mutex<()>
}

impl JsonFileCatalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            backups: false,
            write_lock: Mutex::new(())
        }
    }

    pub fn with_backups(mut self, backups: bool) -> Self {
        self.backups = backups;
        self
    }

    async fn read(&self) -> Result<Vec<Song>, PlaylistError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_songs_file(&path)).await?
    }

    async fn write(&self, songs: Vec<Song>) -> Result<(), PlaylistError> {
        let path = self.path.clone();
        let backups = self.backups;
        tokio::task::spawn_blocking(move || write_songs_file(&path, &songs, backups)).await?
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalog {
    async fn load_songs(&self) -> Result<Vec<Song>, PlaylistError> {
        let songs = self.read().await?;
        tracing::debug!(path = %self.path.display(), count = songs.len(), "catalog.loaded");
        Ok(songs)
    }

    async fn add_song(&self, song: NewSong) -> Result<Song, PlaylistError> {
        validate_new_song(&song)?;
        let _guard = self.write_lock.lock().await;

        let mut songs = self.read().await?;
        let stored = song.with_id(next_id(&songs));
        songs.push(stored.clone());
        self.write(songs).await?;

        tracing::info!(id = stored.id, title = %stored.title, "catalog.song_added");
        Ok(stored)
    }

    async fn remove_song(&self, id: i64) -> Result<(), PlaylistError> {
        let _guard = self.write_lock.lock().await;

        let mut songs = self.read().await?;
        let before = songs.len();
        songs.retain(|s| s.id != id);
        if songs.len() == before {
            return Err(PlaylistError::NotFound(format!("song {id}")));
        }
        self.write(songs).await?;

        tracing::info!(id, "catalog.song_removed");
        Ok(())
    }

    async fn replace_all(&self, songs: &[Song]) -> Result<(), PlaylistError> {
        ensure_unique_ids(songs)?;
        let _guard = self.write_lock.lock().await;
        self.write(songs.to_vec()).await?;

        tracing::info!(count = songs.len(), "catalog.replaced");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

/// A missing file reads as an empty catalog
fn read_songs_file(path: &Path) -> Result<Vec<Song>, PlaylistError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into())
    };
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&text).map_err(|e| PlaylistError::Catalog(
        format!("read {}: {e}", path.display())
    ))
}

fn write_songs_file(path: &Path, songs: &[Song], backup: bool) -> Result<(), PlaylistError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from(".")
    };
    fs::create_dir_all(&parent).map_err(|e| PlaylistError::Catalog(
        format!("create dir {}: {e}", parent.display())
    ))?;

    if backup && path.exists() {
        let backup_path = backup_path_for(path);
        fs::copy(path, &backup_path).map_err(|e| PlaylistError::Catalog(
            format!("backup to {}: {e}", backup_path.display())
        ))?;
        tracing::info!(backup = %backup_path.display(), "catalog.backup_created");
    }

    let mut temp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| PlaylistError::Catalog(
        format!("tempfile in {}: {e}", parent.display())
    ))?;
    serde_json::to_writer_pretty(temp.as_file_mut(), songs)?;

    temp.persist(path).map_err(|e| PlaylistError::Catalog(
        format!("persist {}: {e}", path.display())
    ))?;
    Ok(())
}

/// songs.json -> songs.backup.<unix millis>.json, next to the live file.
/// A numbered suffix is added when that name is already taken.
fn backup_path_for(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("catalog");
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    let mut candidate = path.with_file_name(format!("{stem}.backup.{millis}.json"));
    let mut n = 1u32;
    while candidate.exists() {
        candidate = path.with_file_name(format!("{stem}.backup.{millis}-{n}.json"));
        n += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_song(title: &str, year: i32) -> NewSong {
        NewSong {
            title: title.to_string(),
            artist: "Traditional".to_string(),
            year,
            genre: "Folk".to_string(),
            cultural_region: "England".to_string(),
            ..NewSong::default()
        }
    }

    #[test]
    fn next_id_follows_the_largest() {
        assert_eq!(next_id(&[]), 1);
        let songs = vec![new_song("a", 1700).with_id(4), new_song("b", 1700).with_id(9)];
        assert_eq!(next_id(&songs), 10);
    }

    #[test]
    fn validation_requires_title_artist_year() {
        assert!(validate_new_song(&new_song("Greensleeves", 1580)).is_ok());

        let mut missing = new_song("  ", 1580);
        assert!(matches!(validate_new_song(&missing), Err(PlaylistError::Validation(_))));
        missing.title = "Greensleeves".to_string();
        missing.artist = String::new();
        assert!(validate_new_song(&missing).is_err());
        assert!(validate_new_song(&new_song("Greensleeves", 0)).is_err());
    }

    #[test]
    fn backup_name_keeps_stem() {
        let p = backup_path_for(Path::new("/data/songs.json"));
        let name = p.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("songs.backup."));
        assert!(name.ends_with(".json"));
        assert_eq!(p.parent(), Some(Path::new("/data")));
    }

    #[test]
    fn backup_name_never_reuses_an_existing_file() -> Result<(), PlaylistError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("songs.json");

        let mut taken = HashSet::new();
        for _ in 0..5 {
            let backup = backup_path_for(&path);
            assert!(!backup.exists());
            fs::write(&backup, "[]")?;
            assert!(taken.insert(backup));
        }
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_empty_catalog() -> Result<(), PlaylistError> {
        let dir = tempfile::tempdir()?;
        let catalog = JsonFileCatalog::new(dir.path().join("songs.json"));
        assert!(catalog.load_songs().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn add_and_remove_round_through_disk() -> Result<(), PlaylistError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("songs.json");
        let catalog = JsonFileCatalog::new(&path);

        let first = catalog.add_song(new_song("Greensleeves", 1580)).await?;
        let second = catalog.add_song(new_song("Lilliburlero", 1687)).await?;
        assert_eq!((first.id, second.id), (1, 2));

        // a fresh handle sees the same file
        let reopened = JsonFileCatalog::new(&path);
        let songs = reopened.load_songs().await?;
        assert_eq!(songs, vec![first.clone(), second.clone()]);

        reopened.remove_song(1).await?;
        assert_eq!(reopened.load_songs().await?, vec![second]);

        let err = reopened.remove_song(42).await.unwrap_err();
        assert!(matches!(err, PlaylistError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_song_is_not_written() -> Result<(), PlaylistError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("songs.json");
        let catalog = JsonFileCatalog::new(&path);

        assert!(catalog.add_song(new_song("", 1700)).await.is_err());
        assert!(!path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn writes_back_up_previous_file() -> Result<(), PlaylistError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("songs.json");
        let catalog = JsonFileCatalog::new(&path).with_backups(true);

        catalog.add_song(new_song("Greensleeves", 1580)).await?;
        catalog.add_song(new_song("Lilliburlero", 1687)).await?;

        let backups: Vec<_> = fs::read_dir(dir.path())?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("songs.backup."))
            .collect();
        // the first write had nothing to back up
        assert!(!backups.is_empty());

        let old: Vec<Song> = serde_json::from_str(&fs::read_to_string(backups[0].path())?)?;
        assert_eq!(old.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn replace_all_rejects_duplicate_ids() -> Result<(), PlaylistError> {
        let dir = tempfile::tempdir()?;
        let catalog = JsonFileCatalog::new(dir.path().join("songs.json"));
        let songs = vec![new_song("a", 1700).with_id(3), new_song("b", 1701).with_id(3)];

        assert!(matches!(catalog.replace_all(&songs).await, Err(PlaylistError::Validation(_))));

        let songs = vec![new_song("a", 1700).with_id(3), new_song("b", 1701).with_id(7)];
        catalog.replace_all(&songs).await?;
        assert_eq!(catalog.load_songs().await?, songs);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_is_catalog_error() -> Result<(), PlaylistError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("songs.json");
        fs::write(&path, "{ not json")?;

        let err = JsonFileCatalog::new(&path).load_songs().await.unwrap_err();
        assert!(matches!(err, PlaylistError::Catalog(_)));
        Ok(())
    }
}
