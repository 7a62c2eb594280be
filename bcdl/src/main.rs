//! bcdl - Bandcamp album extractor
//!
//! Renders an album page with a headless browser, extracts the album
//! metadata and the track file links, and reports the merged result.
//!
//! Exit codes: `0` success, `1` fatal pipeline error, `2` invalid input.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use bcdl::{AlbumUrl, Error, HeadlessBrowser, Pipeline, ReconciledAlbum, Result};
use bcdl_common::config::{load_toml_config, LoadedConfig};
use bcdl_common::human_time::format_optional_duration;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for bcdl
#[derive(Parser, Debug)]
#[command(name = "bcdl")]
#[command(about = "Extract album metadata and track file links from a Bandcamp album page")]
#[command(version)]
struct Args {
    /// Album link, e.g. https://vbeo.bandcamp.com/album/--17
    album_url: String,

    /// Browser executable (overrides the well-known install locations)
    #[arg(long, env = "BCDL_BROWSER")]
    browser: Option<PathBuf>,

    /// Virtual time budget for rendering the page, in milliseconds
    #[arg(long, env = "BCDL_BUDGET_MS")]
    budget_ms: Option<u64>,

    /// Configuration file (default: <config dir>/bcdl/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the reconciled album as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Loaded before logging so the configured level applies
    let config = load_toml_config(args.config.as_deref());
    let level = config
        .as_ref()
        .map(|loaded| loaded.config.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());

    if let Err(e) = init_tracing(&level) {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    let result = match config {
        Ok(config) => run(args, config).await,
        Err(e) => Err(Error::from(e)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Initialize tracing on stderr; `RUST_LOG` overrides the configured level
fn init_tracing(level: &str) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("bcdl={level},bcdl_common={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("Failed to initialize logging")
}

async fn run(args: Args, loaded: LoadedConfig) -> Result<()> {
    info!("Configuration: {}", loaded.source);
    let config = loaded.config;

    let url = AlbumUrl::parse(&args.album_url)?;
    info!("Download started. Album link: {}", url);

    let executable = args.browser.or(config.browser.executable);
    let budget = Duration::from_millis(
        args.budget_ms
            .unwrap_or(config.browser.virtual_time_budget_ms),
    );

    let renderer = HeadlessBrowser::locate(executable.as_deref())?;
    info!("Using browser: {}", renderer.executable().display());

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let pipeline = Pipeline::new(renderer, budget);
    let reconciled = pipeline.run(&url, &cancel).await?;

    report(&reconciled);
    if args.json {
        write_json(&reconciled)?;
    }

    info!("Download finished");
    Ok(())
}

/// Cancel the run on Ctrl+C or SIGTERM so the browser process is killed
async fn cancel_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, cancelling"),
        _ = terminate => info!("Received terminate signal, cancelling"),
    }
    cancel.cancel();
}

/// Log a summary of the album and its tracks
fn report(reconciled: &ReconciledAlbum) {
    let album = &reconciled.album;
    info!(
        "Album: {} by {} ({} tracks)",
        album.title.as_deref().unwrap_or("<untitled>"),
        album.artist_name.as_deref().unwrap_or("<unknown artist>"),
        album.num_tracks
    );
    if let Some(date) = album.date_published {
        info!("Published: {}", date.format("%Y-%m-%d"));
    }

    for track in reconciled.tracks() {
        let position = track
            .track
            .position
            .map(|p| format!("{:>2}", p))
            .unwrap_or_else(|| " -".to_string());
        let title = track.track.title.as_deref().unwrap_or("<untitled>");
        let duration = format_optional_duration(track.track.duration);
        match track.file_url {
            Some(_) => info!("{}. {} [{}]", position, title, duration),
            None => info!("{}. {} [{}] (no file link)", position, title, duration),
        }
    }
}

fn write_json(reconciled: &ReconciledAlbum) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, reconciled)
        .map_err(|e| Error::Report(e.to_string()))?;
    writeln!(out).map_err(|e| Error::Report(e.to_string()))?;
    Ok(())
}
