//!
//! src/main.rs
//!
//! Command line entry point: loads configuration, starts the logger,
//! opens the configured catalog and runs one command against it
//!

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use chrono_playlist::catalog::{open_catalog, CatalogSource};
use chrono_playlist::config::{self, AppConfig};
use chrono_playlist::logging;
use chrono_playlist::playlist::generate_playlist_with;
use chrono_playlist::tabular;
use chrono_playlist::{parse_query, NewSong, PlaylistError, Query};

#[derive(Parser, Debug)]
#[command(name = "chrono-playlist", version, about = "Playlists for a year and a place")]
struct Cli {
    #[command(subcommand)]
    command: Command
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a playlist, e.g. `generate "1776, Boston"`
    Generate {
        /// Free text such as "1776, Boston" or "New Amsterdam 1664"
        query: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        location: Option<String>,
        /// Defaults to PLAYLIST_SIZE
        #[arg(long)]
        count: Option<usize>
    },
    /// Inspect or edit the catalog
    Songs {
        #[command(subcommand)]
        action: SongsCommand
    },
    /// Replace the catalog with songs from a tab-separated file
    ImportRows { file: PathBuf },
    /// Write the catalog to a tab-separated file
    ExportRows { file: PathBuf }
}

#[derive(Subcommand, Debug)]
enum SongsCommand {
    List,
    Add(AddSong),
    Remove { id: i64 }
}

#[derive(Args, Debug)]
struct AddSong {
    #[arg(long)]
    title: String,
    #[arg(long)]
    artist: String,
    #[arg(long)]
    year: i32,
    #[arg(long, default_value = "")]
    genre: String,
    #[arg(long = "region", default_value = "")]
    cultural_region: String,
    #[arg(long = "significance", default_value = "")]
    historical_significance: String,
    #[arg(long)]
    spotify_url: Option<String>,
    #[arg(long)]
    youtube_url: Option<String>,
    #[arg(long)]
    apple_music_url: Option<String>
}

impl From<AddSong> for NewSong {
    fn from(a: AddSong) -> Self {
        NewSong {
            title: a.title,
            artist: a.artist,
            year: a.year,
            genre: a.genre,
            cultural_region: a.cultural_region,
            historical_significance: a.historical_significance,
            spotify_url: a.spotify_url,
            youtube_url: a.youtube_url,
            apple_music_url: a.apple_music_url
        }
    }
}

fn resolve_query(
    text: Option<String>,
    year: Option<i32>,
    location: Option<String>
) -> Result<Query, PlaylistError> {
    match (text, year, location) {
        (Some(text), None, None) => parse_query(&text),
        (None, Some(year), Some(location)) if !location.trim().is_empty() =>
            Ok(Query::new(year, location.trim())),
        _ => Err(PlaylistError::Validation(
            "year and location are required: pass \"1776, Boston\" or --year and --location"
                .to_string()
        ))
    }
}

async fn run(
    command: Command,
    cfgs: &AppConfig,
    catalog: &dyn CatalogSource,
    out: &mut dyn Write
) -> Result<(), PlaylistError> {
    match command {
        Command::Generate { query, year, location, count } => {
            let query = resolve_query(query, year, location)?;
            let count = count.unwrap_or(cfgs.playlist.size);
            let songs = catalog.load_songs().await?;

            let result = generate_playlist_with(&songs, &query, count, Utc::now());
            serde_json::to_writer_pretty(&mut *out, &result)?;
        }
        Command::Songs { action: SongsCommand::List } => {
            let songs = catalog.load_songs().await?;
            serde_json::to_writer_pretty(&mut *out, &songs)?;
        }
        Command::Songs { action: SongsCommand::Add(add) } => {
            let stored = catalog.add_song(add.into()).await?;
            serde_json::to_writer_pretty(&mut *out, &stored)?;
        }
        Command::Songs { action: SongsCommand::Remove { id } } => {
            catalog.remove_song(id).await?;
            serde_json::to_writer_pretty(&mut *out, &serde_json::json!({ "removed": id }))?;
        }
        Command::ImportRows { file } => {
            let mut songs = tabular::read_tsv(&file)?;
            tabular::assign_missing_ids(&mut songs);
            catalog.replace_all(&songs).await?;
            serde_json::to_writer_pretty(&mut *out, &serde_json::json!({
                "imported": songs.len(),
                "into": catalog.describe()
            }))?;
        }
        Command::ExportRows { file } => {
            let songs = catalog.load_songs().await?;
            tabular::write_tsv(&file, &songs)?;
            serde_json::to_writer_pretty(&mut *out, &serde_json::json!({
                "exported": songs.len(),
                "to": file.display().to_string()
            }))?;
        }
    }
    writeln!(out)?;
    Ok(())
}

async fn execute(cli: Cli, cfgs: &AppConfig) -> Result<(), PlaylistError> {
    let catalog = open_catalog(&cfgs.catalog).await?;
    let mut stdout = std::io::stdout();
    run(cli.command, cfgs, catalog.as_ref(), &mut stdout).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfgs = match config::load_config() {
        Ok(cfgs) => cfgs,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _logger = match logging::init_logging(&cfgs.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!(
        service = "chrono-playlist",
        version = %env!("CARGO_PKG_VERSION"),
        "starting"
    );

    match execute(cli, &cfgs).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_user_facing() => {
            tracing::warn!(error = %e, "command.rejected");
            eprintln!("{e}");
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!(error = %e, "command.failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Unit Tests
/// Command parsing and commands run against a JSON catalog on disk
#[cfg(test)]
mod tests {
    use chrono_playlist::catalog::JsonFileCatalog;
    use chrono_playlist::config::load_config_from;
    use chrono_playlist::{PlaylistResult, Song};

    use super::*;

    fn test_config() -> AppConfig {
        load_config_from(&|_: &str| -> Option<String> { None }).unwrap()
    }

    fn add(title: &str, artist: &str, year: i32, region: &str) -> Command {
        let year = year.to_string();
        Cli::try_parse_from([
            "chrono-playlist", "songs", "add",
            "--title", title, "--artist", artist,
            "--year", year.as_str(),
            "--genre", "Folk", "--region", region,
        ])
        .unwrap()
        .command
    }

    async fn run_to_string(
        command: Command,
        catalog: &dyn CatalogSource
    ) -> Result<String, PlaylistError> {
        let mut out = Vec::new();
        run(command, &test_config(), catalog, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn parses_generate_forms() {
        let cli = Cli::try_parse_from(["chrono-playlist", "generate", "1776, Boston"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Generate { query: Some(ref q), year: None, location: None, count: None } if q == "1776, Boston"
        ));

        let cli = Cli::try_parse_from([
            "chrono-playlist", "generate", "--year", "1664", "--location", "New Amsterdam", "--count", "3"
        ]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Generate { query: None, year: Some(1664), location: Some(_), count: Some(3) }
        ));
    }

    #[test]
    fn resolve_query_needs_one_complete_form() {
        assert_eq!(
            resolve_query(Some("Paris 1789".into()), None, None).unwrap(),
            Query::new(1789, "Paris")
        );
        assert_eq!(
            resolve_query(None, Some(1789), Some(" Paris ".into())).unwrap(),
            Query::new(1789, "Paris")
        );

        for (text, year, location) in [
            (None, None, None),
            (None, Some(1789), None),
            (None, None, Some("Paris".to_string())),
            (None, Some(1789), Some("  ".to_string())),
            (Some("Paris 1789".to_string()), Some(1789), None),
        ] {
            let err = resolve_query(text, year, location).unwrap_err();
            assert!(err.is_user_facing());
        }

        assert!(matches!(resolve_query(Some("Paris".into()), None, None), Err(PlaylistError::Parse(_))));
    }

    #[tokio::test]
    async fn add_list_and_generate() -> Result<(), PlaylistError> {
        let dir = tempfile::tempdir()?;
        let catalog = JsonFileCatalog::new(dir.path().join("songs.json"));

        run_to_string(add("Wilhelmus", "Traditional", 1570, "Dutch"), &catalog).await?;
        run_to_string(add("Chester", "William Billings", 1770, "America"), &catalog).await?;

        let listed = run_to_string(
            Cli::try_parse_from(["chrono-playlist", "songs", "list"]).unwrap().command,
            &catalog
        ).await?;
        let songs: Vec<Song> = serde_json::from_str(&listed)?;
        assert_eq!(songs.len(), 2);

        let generated = run_to_string(
            Cli::try_parse_from(["chrono-playlist", "generate", "New Amsterdam, 1664"]).unwrap().command,
            &catalog
        ).await?;
        let result: PlaylistResult = serde_json::from_str(&generated)?;
        assert_eq!(result.query_year, 1664);
        assert_eq!(result.query_location, "New Amsterdam");
        assert_eq!(result.songs.iter().map(|s| s.title.as_str()).collect::<Vec<_>>(), vec!["Wilhelmus"]);
        Ok(())
    }

    #[tokio::test]
    async fn export_then_import_rows() -> Result<(), PlaylistError> {
        let dir = tempfile::tempdir()?;
        let source = JsonFileCatalog::new(dir.path().join("a.json"));
        let target = JsonFileCatalog::new(dir.path().join("b.json"));
        let tsv = dir.path().join("songs.tsv");

        run_to_string(add("Greensleeves", "Traditional", 1580, "England"), &source).await?;
        run_to_string(Command::ExportRows { file: tsv.clone() }, &source).await?;
        run_to_string(Command::ImportRows { file: tsv }, &target).await?;

        assert_eq!(source.load_songs().await?, target.load_songs().await?);
        Ok(())
    }

    #[tokio::test]
    async fn bad_query_is_user_facing() -> Result<(), PlaylistError> {
        let dir = tempfile::tempdir()?;
        let catalog = JsonFileCatalog::new(dir.path().join("songs.json"));

        let err = run_to_string(
            Command::Generate { query: Some("sometime in Boston".into()), year: None, location: None, count: None },
            &catalog
        ).await.unwrap_err();
        assert!(err.is_user_facing());
        Ok(())
    }
}
