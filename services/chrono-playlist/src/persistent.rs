//!
//! src/persistent.rs
//!
//! Defines module for persisting the song catalog to an sqlite database
//! (the JSON file catalog is defined in src/catalog.rs)
//!

use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sqlx::{sqlite::SqliteConnectOptions, sqlite::SqlitePoolOptions, sqlite::SqliteRow, Pool, Row, Sqlite};

use crate::catalog::{CatalogSource, ensure_unique_ids, validate_new_song};
use crate::errors::PlaylistError;
use crate::types::{NewSong, Song};

pub struct SqliteCatalog {
    pool: Pool<Sqlite>,
    url: String
}

impl SqliteCatalog {

    async fn ensure_schema(pool: &Pool<Sqlite>) -> Result<(), PlaylistError> {
        // ensure that schema exists
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS songs (
              id                       INTEGER PRIMARY KEY,
              title                    TEXT NOT NULL,
              artist                   TEXT NOT NULL,
              year                     INTEGER NOT NULL,
              genre                    TEXT NOT NULL DEFAULT '',
              cultural_region          TEXT NOT NULL DEFAULT '',
              historical_significance  TEXT NOT NULL DEFAULT '',
              spotify_url              TEXT,
              youtube_url              TEXT,
              apple_music_url          TEXT,
              created_at               INTEGER NOT NULL,
              updated_at               INTEGER NOT NULL
            );
            "
        ).execute(pool).await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_year ON songs(year);")
            .execute(pool).await?;

        Ok(())
    }

    pub async fn init(database_url: &str) -> Result<Self, PlaylistError> {
        let is_memory = database_url == "sqlite::memory:";

        let mut opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true);

        // WAL is file-only; don't set it for in-memory
        if !is_memory {
            opts = opts.journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                       .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        }

        // every in-memory connection is its own database, keep exactly one
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(if is_memory {1} else {8})
            .idle_timeout(if is_memory { None } else { Some(std::time::Duration::from_secs(600)) })
            .max_lifetime(if is_memory { None } else { Some(std::time::Duration::from_secs(1800)) })
            .connect_with(opts)
            .await?;

        Self::ensure_schema(&pool).await?;

        Ok(Self { pool, url: database_url.to_string() })
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }

    fn song_from_row(r: &SqliteRow) -> Result<Song, PlaylistError> {
        Ok(Song {
            id: r.try_get("id")?,
            title: r.try_get("title")?,
            artist: r.try_get("artist")?,
            year: r.try_get("year")?,
            genre: r.try_get("genre")?,
            cultural_region: r.try_get("cultural_region")?,
            historical_significance: r.try_get("historical_significance")?,
            spotify_url: r.try_get("spotify_url")?,
            youtube_url: r.try_get("youtube_url")?,
            apple_music_url: r.try_get("apple_music_url")?
        })
    }

    pub async fn count_songs(&self) -> Result<i64, PlaylistError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM songs;")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn get_song(&self, id: i64) -> Result<Option<Song>, PlaylistError> {
        let row = sqlx::query(
            r"
            SELECT id, title, artist, year, genre, cultural_region,
                   historical_significance, spotify_url, youtube_url, apple_music_url
              FROM songs WHERE id = ?1;
            "
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::song_from_row).transpose()
    }

    async fn insert_song<'e, E>(executor: E, song: &Song, now: i64) -> Result<(), PlaylistError>
    where
        E: sqlx::Executor<'e, Database = Sqlite>
    {
        sqlx::query(
            r"
            INSERT INTO songs (
                id, title, artist, year, genre, cultural_region,
                historical_significance, spotify_url, youtube_url, apple_music_url,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11);
            "
        )
        .bind(song.id)
        .bind(&song.title)
        .bind(&song.artist)
        .bind(song.year)
        .bind(&song.genre)
        .bind(&song.cultural_region)
        .bind(&song.historical_significance)
        .bind(song.spotify_url.as_deref())
        .bind(song.youtube_url.as_deref())
        .bind(song.apple_music_url.as_deref())
        .bind(now)
        .execute(executor)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for SqliteCatalog {
    async fn load_songs(&self) -> Result<Vec<Song>, PlaylistError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, artist, year, genre, cultural_region,
                   historical_significance, spotify_url, youtube_url, apple_music_url
              FROM songs ORDER BY id ASC;
            "
        )
        .fetch_all(&self.pool)
        .await?;

        let songs = rows.iter()
            .map(Self::song_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(url = %self.url, count = songs.len(), "catalog.loaded");
        Ok(songs)
    }

    async fn add_song(&self, song: NewSong) -> Result<Song, PlaylistError> {
        validate_new_song(&song)?;

        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) + 1 FROM songs;")
            .fetch_one(&mut *tx)
            .await?;

        let stored = song.with_id(id);
        Self::insert_song(&mut *tx, &stored, Self::now()).await?;
        tx.commit().await?;

        tracing::info!(id = stored.id, title = %stored.title, "catalog.song_added");
        Ok(stored)
    }

    async fn remove_song(&self, id: i64) -> Result<(), PlaylistError> {
        let removed = sqlx::query("DELETE FROM songs WHERE id = ?1;")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if removed == 0 {
            return Err(PlaylistError::NotFound(format!("song {id}")));
        }
        tracing::info!(id, "catalog.song_removed");
        Ok(())
    }

    async fn replace_all(&self, songs: &[Song]) -> Result<(), PlaylistError> {
        ensure_unique_ids(songs)?;

        let now = Self::now();
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM songs;").execute(&mut *tx).await?;
        for song in songs {
            Self::insert_song(&mut *tx, song, now).await?;
        }
        tx.commit().await?;

        tracing::info!(count = songs.len(), "catalog.replaced");
        Ok(())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
