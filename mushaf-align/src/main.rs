//! mushaf-align - Recitation timestamp alignment service
//!
//! `serve` (default) exposes the HTTP API; `align` performs a single run in the
//! foreground and prints its summary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mushaf_align::config::{resolve_alignment_config, resolve_media_base_url};
use mushaf_align::models::RunRequest;
use mushaf_align::AppState;
use mushaf_common::config::{RootFolderInitializer, RootFolderResolver};
use mushaf_common::events::EventBus;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const MODULE_NAME: &str = "mushaf-align";
const DEFAULT_BIND: &str = "127.0.0.1:5740";

#[derive(Debug, Parser)]
#[command(name = "mushaf-align", version, about = "Recitation word timestamp alignment")]
struct Cli {
    /// Root folder holding mushaf.db
    #[arg(long, global = true, env = "MUSHAF_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Listen address (overrides [server] bind)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Align one recitation surah and exit
    Align {
        #[arg(long)]
        recitation: Uuid,
        #[arg(long)]
        surah: i64,
        #[arg(long)]
        file: Uuid,
        /// Delete previously recorded timestamps first
        #[arg(long)]
        replace_existing: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolver = RootFolderResolver::new(MODULE_NAME).with_cli_override(cli.root_folder.clone());
    let toml_config = resolver.load_config();

    // RUST_LOG wins over [logging] level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&toml_config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting {} v{}", MODULE_NAME, env!("CARGO_PKG_VERSION"));

    let root_folder = resolver.resolve_with(&toml_config);
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = mushaf_common::db::init_database(&db_path).await?;

    let alignment = resolve_alignment_config(&toml_config)?;
    let media_base_url = resolve_media_base_url(&toml_config);
    info!(endpoint = %alignment.align_endpoint(), timeout = ?alignment.timeout, "Alignment service configured");

    let event_bus = EventBus::new(100);
    let orchestrator = Arc::new(mushaf_align::build_orchestrator(
        db_pool.clone(),
        event_bus.clone(),
        &alignment,
        media_base_url,
    )?);

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            let bind = bind
                .or(toml_config.server.bind.clone())
                .unwrap_or_else(|| DEFAULT_BIND.to_string());

            let state = AppState::new(db_pool, event_bus, orchestrator);
            let app = mushaf_align::build_router(state);

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!("Listening on http://{}", bind);
            info!("Health check: http://{}/health", bind);

            axum::serve(listener, app).await?;
        }
        Command::Align {
            recitation,
            surah,
            file,
            replace_existing,
        } => {
            let request = RunRequest {
                recitation_id: recitation,
                surah_id: surah,
                file_id: file,
                replace_existing,
            };
            let outcome = orchestrator.run(request).await;
            println!("{}", outcome.summary());
            if !outcome.is_success() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
