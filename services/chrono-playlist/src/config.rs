//!
//! src/config.rs
//!
//! Reads service configuration from the environment (and a .env file
//! when present). Every value has a default; only malformed values fail.
//!

use std::path::PathBuf;

use crate::errors::PlaylistError;
use crate::playlist::PLAYLIST_SIZE;

/// Defaults for catalog storage
pub const CATALOG_JSON_PATH: &str = "./data/songs.json";
pub const CATALOG_DB_URL: &str = "sqlite:./data/catalog.db";
pub const CATALOG_BACKUP_ON_WRITE: bool = true;

/// Default logging filter
pub const LOG_FILTER: &str = "warn,chrono_playlist=info";

/// Looks up a variable by name, `None` when unset
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

impl<F> EnvSource for F
where
    F: Fn(&str) -> Option<String>
{
    fn var(&self, key: &str) -> Option<String> { self(key) }
}

struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> { std::env::var(key).ok() }
}

/// Wrapper over lookups to treat blank values as unset
fn env_value(env: &dyn EnvSource, key: &str) -> Option<String> {
    env.var(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_bool(env: &dyn EnvSource, key: &str, default: bool) -> Result<bool, PlaylistError> {
    match env_value(env, key) {
        None => Ok(default),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(PlaylistError::Config(format!("{key} must be a boolean, got {v:?}")))
        }
    }
}

///
/// Configuration for where the catalog lives
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSourceKind {
    Json,
    Sqlite
}

impl CatalogSourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CatalogSourceKind::Json => "json",
            CatalogSourceKind::Sqlite => "sqlite"
        }
    }
    pub fn parse(s: &str) -> Option<CatalogSourceKind> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(CatalogSourceKind::Json),
            "sqlite" => Some(CatalogSourceKind::Sqlite),
            _ => None
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub source: CatalogSourceKind,
    pub json_path: PathBuf,
    pub db_url: String,
    pub backup_on_write: bool
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSourceKind::Json,
            json_path: PathBuf::from(CATALOG_JSON_PATH),
            db_url: CATALOG_DB_URL.to_string(),
            backup_on_write: CATALOG_BACKUP_ON_WRITE
        }
    }
}

fn build_catalog(env: &dyn EnvSource) -> Result<CatalogConfig, PlaylistError> {
    let defaults = CatalogConfig::default();

    let source = match env_value(env, "CATALOG_SOURCE") {
        None => defaults.source,
        Some(s) => CatalogSourceKind::parse(&s).ok_or_else(|| PlaylistError::Config(
            format!("CATALOG_SOURCE must be json or sqlite, got {s:?}")
        ))?
    };

    let json_path = env_value(env, "CATALOG_JSON_PATH")
        .map(PathBuf::from)
        .unwrap_or(defaults.json_path);

    let db_url = env_value(env, "CATALOG_DB_URL").unwrap_or(defaults.db_url);
    if !db_url.starts_with("sqlite:") {
        return Err(PlaylistError::Config(
            format!("CATALOG_DB_URL must be a sqlite: url, got {db_url:?}")
        ));
    }

    let backup_on_write = env_bool(env, "CATALOG_BACKUP_ON_WRITE", defaults.backup_on_write)?;

    Ok( CatalogConfig { source, json_path, db_url, backup_on_write } )
}

///
/// Configuration for playlist generation
///
#[derive(Debug, Clone, Copy)]
pub struct PlaylistConfig {
    pub size: usize
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self { size: PLAYLIST_SIZE }
    }
}

fn build_playlist(env: &dyn EnvSource) -> Result<PlaylistConfig, PlaylistError> {
    let size = match env_value(env, "PLAYLIST_SIZE") {
        None => PLAYLIST_SIZE,
        Some(s) => match s.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => return Err(PlaylistError::Config(
                format!("PLAYLIST_SIZE must be a positive integer, got {s:?}")
            ))
        }
    };
    Ok( PlaylistConfig { size } )
}

///
/// Configuration for Logger
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter_directives: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub include_file_line: bool,
    pub include_target: bool
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter_directives: LOG_FILTER.to_string(),
            format: LogFormat::Pretty,
            with_ansi: true,
            include_file_line: false,
            include_target: true
        }
    }
}

fn build_logging(env: &dyn EnvSource) -> Result<LoggingConfig, PlaylistError> {
    let defaults = LoggingConfig::default();

    let format = match env_value(env, "LOG_FORMAT").map(|s| s.to_ascii_lowercase()) {
        None => defaults.format,
        Some(s) if s == "json" => LogFormat::Json,
        Some(s) if s == "pretty" => LogFormat::Pretty,
        Some(s) => return Err(PlaylistError::Config(
            format!("LOG_FORMAT must be json or pretty, got {s:?}")
        ))
    };

    Ok( LoggingConfig {
        filter_directives: env_value(env, "LOG_FILTER").unwrap_or(defaults.filter_directives),
        format,
        with_ansi: env_bool(env, "LOG_ANSI", defaults.with_ansi)?,
        include_file_line: env_bool(env, "LOG_FILE_LINE", defaults.include_file_line)?,
        include_target: env_bool(env, "LOG_TARGET", defaults.include_target)?
    })
}

///
/// AppConfig which holds every section the binary wires together
///
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub playlist: PlaylistConfig,
    pub logging: LoggingConfig
}

///
/// Return configuration built from the process environment at program start.
///
pub fn load_config() -> Result<AppConfig, PlaylistError> {
    dotenvy::dotenv().ok();
    load_config_from(&ProcessEnv)
}

pub fn load_config_from(env: &dyn EnvSource) -> Result<AppConfig, PlaylistError> {
    let catalog  = build_catalog(env)?;
    let playlist = build_playlist(env)?;
    let logging  = build_logging(env)?;

    Ok( AppConfig { catalog, playlist, logging } )
}
