mod app;
mod backend;
mod config;
mod input;
mod library;
mod lyrics;
mod player;
mod render;
mod storage;
mod sync;
mod tui;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use library::Library;
use library::song::Song;
use lyrics::loader::{DocumentSource, Loader};
use lyrics::model::LyricsDocument;
use render::ViewMode;
use storage::StorageHandle;

#[derive(Debug, Parser)]
#[command(name = "karaoke", version, about = "Time-synced karaoke lyrics player and song library")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// trace, debug, info, warn or error.
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the interactive TUI (default).
    Tui,
    /// Open a lyrics document straight in the player.
    Play {
        /// Processed lyrics JSON: file path or http(s) URL.
        #[arg(long)]
        lyrics: String,
        /// Tried when the primary document cannot be loaded.
        #[arg(long)]
        fallback: Option<String>,
        /// Audio file to play alongside.
        #[arg(long)]
        audio: Option<PathBuf>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Print what is highlighted at a given time (headless).
    Show {
        /// Processed lyrics JSON: file path or http(s) URL.
        doc: String,
        /// Playback time in seconds.
        #[arg(long)]
        at: f64,
        #[arg(long, value_enum)]
        mode: Option<ViewMode>,
        #[arg(long)]
        translations: bool,
    },
    /// Manage the song library.
    Library {
        #[command(subcommand)]
        cmd: LibraryCommand,
    },
    /// Fill empty syllable lists with estimated timings.
    Syllabify {
        input: PathBuf,
        /// Write here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum LibraryCommand {
    /// List all songs.
    List,
    /// Add a song by URL (title and artist come from the backend).
    Add { url: String },
    /// Edit metadata or replace the lyrics text.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        #[arg(long)]
        language: Option<String>,
        /// Plain-text lyrics file to store as the final lyrics.
        #[arg(long)]
        lyrics_file: Option<PathBuf>,
    },
    Remove { id: String },
    /// Ask the backend for lyrics sources.
    SearchLyrics { id: String },
    /// Accept the found lyrics when enough sources agree.
    Verify { id: String },
    /// Run alignment and translation on the backend.
    Process { id: String },
    /// Download the audio track.
    Download { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;
    let cfg_path = match cli.config.clone() {
        Some(p) => p,
        None => config::default_config_path().context("default config path")?,
    };

    let command = cli.command.unwrap_or(Command::Tui);
    // The TUI owns the terminal; log to a file instead.
    let log_file = matches!(command, Command::Tui | Command::Play { .. }).then(|| cfg.paths.log_file());
    init_logging(cli.log_level, log_file.as_deref())?;

    match command {
        Command::Tui => {
            let mut terminal = tui::TerminalGuard::enter(cfg.input.mouse).context("init terminal")?;
            let mut app = app::App::new(cfg, cfg_path, None)?;
            app.run(terminal.terminal_mut()).await?;
        }
        Command::Play {
            lyrics,
            fallback,
            audio,
            title,
        } => {
            let primary = DocumentSource::parse(&lyrics);
            let start = app::PlayRequest {
                song_id: None,
                title: title.unwrap_or_else(|| primary.label()),
                primary,
                fallback: fallback.as_deref().map(DocumentSource::parse),
                audio,
            };
            let mut terminal = tui::TerminalGuard::enter(cfg.input.mouse).context("init terminal")?;
            let mut app = app::App::new(cfg, cfg_path, Some(start))?;
            app.run(terminal.terminal_mut()).await?;
        }
        Command::Show {
            doc,
            at,
            mode,
            translations,
        } => {
            let loader = Loader::new()?;
            let document = loader.fetch(&DocumentSource::parse(&doc)).await?;
            print_activation(&document, at, mode.unwrap_or(cfg.ui.view_mode), translations);
        }
        Command::Library { cmd } => run_library(&cfg, cmd).await?,
        Command::Syllabify { input, output } => {
            let raw = std::fs::read_to_string(&input).with_context(|| format!("read {}", input.display()))?;
            let mut document = LyricsDocument::from_json(&raw).with_context(|| format!("parse {}", input.display()))?;
            let filled = lyrics::syllables::fill_missing(&mut document);
            let out = serde_json::to_string_pretty(&document).context("serialize document")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, out).with_context(|| format!("write {}", path.display()))?;
                    println!("Estimated syllables for {filled} word(s), wrote {}", path.display());
                }
                None => println!("{out}"),
            }
        }
    }

    Ok(())
}

fn init_logging(level: tracing::Level, log_file: Option<&Path>) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn print_activation(document: &LyricsDocument, at: f64, mode: ViewMode, translations: bool) {
    let activation = lyrics::resolve::resolve(at, document);
    let segment = lyrics::resolve::active_segment(at, &document.segments);
    match (segment, render::render_active(mode, &document.segments, &activation, translations)) {
        (Some(seg), Some(cells)) => {
            println!(
                "{:.2}s  segment {} ({:.2}-{:.2}, {:.0}%)",
                at,
                seg.id,
                seg.start,
                seg.end,
                activation.segment_progress * 100.0
            );
            println!("{}", render::to_plain_text(&cells));
        }
        _ => println!("{at:.2}s  no active segment"),
    }

    let active = lyrics::resolve::active_segments(at, &document.segments);
    if active.len() > 1 {
        println!("overlapping:");
        for seg in active {
            println!("  {} {:.2}-{:.2} {}", seg.id, seg.start, seg.end, seg.text);
        }
    }
}

async fn run_library(cfg: &config::Config, cmd: LibraryCommand) -> anyhow::Result<()> {
    let storage = StorageHandle::new(cfg.paths.database());
    let backend = || {
        backend::BackendClient::new(
            &cfg.backend.base_url,
            std::time::Duration::from_secs(cfg.backend.timeout_secs),
        )
    };
    let lib = Library::new(storage.clone());
    let recovered = lib.recover_interrupted()?;
    if recovered > 0 {
        println!("Reset {recovered} interrupted song(s) to error; retry them.");
    }

    let song = match cmd {
        LibraryCommand::List => {
            let songs = lib.list()?;
            if songs.is_empty() {
                println!("Library is empty.");
            }
            for song in &songs {
                print_song(song);
            }
            return Ok(());
        }
        LibraryCommand::Add { url } => library::workflow::add_from_url(&backend()?, &storage, &url).await?,
        LibraryCommand::Edit {
            id,
            title,
            artist,
            language,
            lyrics_file,
        } => {
            let mut song = lib.edit_metadata(&id, title.as_deref(), artist.as_deref(), language.as_deref())?;
            if let Some(path) = lyrics_file {
                let text = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
                song = lib.set_final_lyrics(&id, &text)?;
            }
            song
        }
        LibraryCommand::Remove { id } => {
            lib.remove(&id)?;
            println!("Removed {id}");
            return Ok(());
        }
        LibraryCommand::SearchLyrics { id } => library::workflow::search_lyrics(&backend()?, &storage, &id).await?,
        LibraryCommand::Verify { id } => lib.verify_lyrics(&id)?,
        LibraryCommand::Process { id } => library::workflow::process(&backend()?, &storage, &id).await?,
        LibraryCommand::Download { id } => library::workflow::download(&backend()?, &storage, &id).await?,
    };

    print_song(&song);
    Ok(())
}

fn print_song(song: &Song) {
    println!(
        "{}  {:<16} {:<9} {}",
        song.id,
        song.status.label(),
        song.lyrics_status.label(),
        song.display_name()
    );
    if let Some(err) = &song.error {
        println!("    error: {err}");
    }
}
