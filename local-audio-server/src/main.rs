//! local-audio-server - Local pronunciation audio server
//!
//! Builds the audio index from the configured corpora and serves lookups
//! to Yomichan-compatible clients.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use local_audio_common::config::{resolve_root_folder, AppConfig, DataPaths};
use local_audio_common::index::{attempt_init, build_index, AudioIndex};
use local_audio_common::sources::AudioSource;
use local_audio_common::SharedIndex;
use local_audio_server::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for local-audio-server
#[derive(Parser, Debug)]
#[command(name = "local-audio-server")]
#[command(about = "Local pronunciation audio server")]
#[command(version)]
struct Args {
    /// Config file (default: LOCAL_AUDIO_CONFIG, then the per-user config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root folder holding user_files/ (overrides LOCAL_AUDIO_ROOT_FOLDER)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Build the index if needed, then serve lookups (default)
    Serve,
    /// Rebuild the index from all sources
    Rebuild,
    /// Print index statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    let level = &config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "local_audio_server={level},local_audio_common={level},tower_http={level}"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting local-audio-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    info!("Root folder: {}", root_folder.display());
    let paths = DataPaths::new(root_folder.clone());
    let sources = config.audio_sources(&root_folder);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, paths, sources).await,
        Command::Rebuild => {
            let report = build_index(&paths, &sources)
                .await
                .context("Failed to build audio index")?;
            for (source, count) in &report.entries_per_source {
                println!("{:<20} {}", source, count);
            }
            println!("{:<20} {}", "backfill", report.backfilled);
            println!("{:<20} {}", "total", report.total());
            Ok(())
        }
        Command::Stats => {
            let index = AudioIndex::open(&paths, sources)
                .await
                .context("Failed to open audio index")?;
            let stats = index.statistics().await?;
            println!("Total entries:      {}", stats.total_entries);
            println!("Unique expressions: {}", stats.unique_expressions);
            for (source, count) in &stats.entries_per_source {
                println!("  {:<18} {}", source, count);
            }
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, paths: DataPaths, sources: Vec<AudioSource>) -> Result<()> {
    let index = attempt_init(&paths, sources)
        .await
        .context("Failed to initialize audio index")?;
    let stats = index.statistics().await?;
    info!(
        "Audio index ready: {} entries, {} expressions",
        stats.total_entries, stats.unique_expressions
    );

    let host = &config.server.host;
    let port = config.server.port;
    let base_url = format!("http://{}:{}", host, port);
    let state = AppState::new(SharedIndex::new(index), paths, base_url.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", host, port))?;
    info!("Listening on {}", base_url);
    info!("Health check: {}/health", base_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM so in-flight lookups can drain
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        "Ctrl+C"
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let received = tokio::select! {
        name = ctrl_c => name,
        name = terminate => name,
    };
    info!("Received {}, stopping audio server", received);
}
