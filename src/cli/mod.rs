//! # CLI Module
//!
//! A thin terminal front-end over the gallery index.
//!
//! ## Usage
//! ```bash
//! # Index the image directory
//! gallery-index scan --dir ~/WhatsApp/Images
//!
//! # List albums, optionally filtered
//! gallery-index albums --query wa00
//!
//! # Timeline of the last week
//! gallery-index recent --window week
//!
//! # Delete an image and drop it from the index
//! gallery-index delete ~/WhatsApp/Images/IMG-20240101-WA0001.jpg
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use contact_gallery::config::GalleryConfig;
use contact_gallery::core::entry::Entry;
use contact_gallery::core::gallery::{DeleteOutcome, Gallery, IndexState, ScanOutcome};
use contact_gallery::core::grouping::{Album, TimeWindow};
use contact_gallery::core::store::SqliteBlobStore;
use contact_gallery::error::Result;
use contact_gallery::events::{Event, EventChannel, ScanEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Gallery Index - albums of chat-received photos
#[derive(Parser, Debug)]
#[command(name = "gallery-index")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Image directory to index
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Index database path
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Treat storage access as denied
    #[arg(long, global = true)]
    deny_storage: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rescan the image directory and replace the index
    Scan {
        /// Show every indexed file
        #[arg(short, long)]
        verbose: bool,
    },
    /// List albums, newest first
    Albums {
        /// Only albums whose name contains this text
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// List recent images
    Recent {
        /// How far back to look
        #[arg(short, long, default_value = "day")]
        window: Window,
    },
    /// Delete an image file and remove it from the index
    Delete {
        /// Path of the image
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Window {
    /// Last 24 hours
    Day,
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
}

impl From<Window> for TimeWindow {
    fn from(window: Window) -> Self {
        match window {
            Window::Day => TimeWindow::Day,
            Window::Week => TimeWindow::Week,
            Window::Month => TimeWindow::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GalleryConfig::load(path)?,
        None => GalleryConfig::default(),
    };
    if let Some(dir) = cli.dir.clone() {
        config.directory = dir;
    }
    if let Some(store) = cli.store.clone() {
        config.store_path = store;
    }
    config.validate()?;

    let backend = SqliteBlobStore::open(&config.store_path)?;

    match cli.command {
        Commands::Scan { verbose } => run_scan(config, backend, cli.deny_storage, cli.output, verbose),
        Commands::Albums { query } => {
            let gallery = open_gallery(config, backend, cli.deny_storage);
            print_albums(&gallery.search_albums(&query), cli.output);
            Ok(())
        }
        Commands::Recent { window } => {
            let gallery = open_gallery(config, backend, cli.deny_storage);
            let window = TimeWindow::from(window);
            print_entries(&window.label(), &gallery.entries_since(window), cli.output);
            Ok(())
        }
        Commands::Delete { path } => {
            let gallery = open_gallery(config, backend, cli.deny_storage);
            let outcome = gallery.delete(&path)?;
            match cli.output {
                OutputFormat::Json => print_json(&outcome),
                _ => {
                    let term = Term::stdout();
                    let status = match outcome {
                        DeleteOutcome::Removed { file_deleted: true } => style("Deleted").green().to_string(),
                        DeleteOutcome::Removed { file_deleted: false } => {
                            style("Removed from index; file could not be deleted").yellow().to_string()
                        }
                        DeleteOutcome::NotIndexed => style("Not indexed; left on disk").yellow().to_string(),
                        DeleteOutcome::Busy => style("A scan is running; try again").yellow().to_string(),
                        DeleteOutcome::Blocked => style("Storage access denied; nothing deleted").red().to_string(),
                    };
                    term.write_line(&format!("{} {}", status, path.display())).ok();
                }
            }
            Ok(())
        }
    }
}

fn open_gallery(config: GalleryConfig, backend: SqliteBlobStore, deny_storage: bool) -> Gallery {
    let gallery = Gallery::builder()
        .config(config)
        .backend(Arc::new(backend))
        .build();
    gallery.initialize(!deny_storage);
    gallery
}

fn run_scan(
    config: GalleryConfig,
    backend: SqliteBlobStore,
    deny_storage: bool,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();
    let (sender, receiver) = EventChannel::new();

    let gallery = Gallery::builder()
        .config(config)
        .backend(Arc::new(backend))
        .events(sender)
        .build();

    if gallery.initialize(!deny_storage) == IndexState::PermissionBlocked {
        term.write_line(&format!(
            "{} Storage access denied; scanning is disabled",
            style("!").yellow().bold()
        ))
        .ok();
        return Ok(());
    }

    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::default_spinner().template("{spinner:.green} {pos} images {msg}") {
            pb.set_style(spinner);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Scan(ScanEvent::ImageFound { path, group_key }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.inc(1);
                        if verbose {
                            pb.println(format!(
                                "  {} {}",
                                style(group_key).cyan(),
                                path.file_name().unwrap_or_default().to_string_lossy()
                            ));
                        }
                    }
                }
                Event::Scan(ScanEvent::Error { path, message }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.println(format!("  {} {} ({})", style("skipped").yellow(), path.display(), message));
                    }
                }
                Event::Scan(ScanEvent::Completed { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    let result = gallery.rescan();

    // Dropping the gallery drops the last sender and ends the event thread
    let directory = gallery.directory().to_path_buf();
    drop(gallery);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let outcome = result?;
    match output {
        OutputFormat::Json => print_json(&outcome),
        _ => {
            let line = match outcome {
                ScanOutcome::Completed { indexed, skipped } => format!(
                    "{} Indexed {} images from {} ({} skipped)",
                    style("✓").green().bold(),
                    style(indexed).cyan(),
                    directory.display(),
                    skipped
                ),
                ScanOutcome::NotFound => format!(
                    "{} {} does not exist; index left unchanged",
                    style("!").yellow().bold(),
                    directory.display()
                ),
                ScanOutcome::Busy => format!("{} A scan is already running", style("!").yellow().bold()),
                ScanOutcome::Blocked => format!("{} Scanning is disabled", style("!").yellow().bold()),
            };
            term.write_line(&line).ok();
        }
    }

    Ok(())
}

fn print_albums(albums: &[Album], output: OutputFormat) {
    match output {
        OutputFormat::Json => print_json(&albums),
        OutputFormat::Minimal => {
            for album in albums {
                println!("{}", album.key());
            }
        }
        OutputFormat::Pretty => {
            let term = Term::stdout();
            if albums.is_empty() {
                term.write_line(&format!("{}", style("No albums").dim())).ok();
                return;
            }
            for album in albums {
                let newest = album
                    .newest()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                term.write_line(&format!(
                    "  {} {} {}",
                    style(album.display_name()).bold(),
                    style(format!("({} images)", album.len())).dim(),
                    style(newest).dim()
                ))
                .ok();
            }
        }
    }
}

fn print_entries(title: &str, entries: &[Entry], output: OutputFormat) {
    match output {
        OutputFormat::Json => print_json(&entries),
        OutputFormat::Minimal => {
            for entry in entries {
                println!("{}", entry.path().display());
            }
        }
        OutputFormat::Pretty => {
            let term = Term::stdout();
            term.write_line(&format!("{}", style(title).bold().underlined())).ok();
            for entry in entries {
                term.write_line(&format!(
                    "  {} {} {}",
                    style(entry.timestamp().format("%Y-%m-%d %H:%M")).dim(),
                    style(entry.group_key()).cyan(),
                    entry.file_name()
                ))
                .ok();
            }
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}
