//! agenda server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) plus `AGENDA_*`
//! environment variables, opens the SQLite store, and serves the contacts
//! GraphQL API over HTTP.
//!
//! # Schema export
//!
//! ```
//! cargo run -p agenda-server -- --print-schema
//! ```

mod settings;

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
  sync::Arc,
};

use agenda_core::directory::Directory;
use agenda_ninjas::NinjasClient;
use agenda_store_sqlite::SqliteStore;
use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Agenda contacts GraphQL server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the GraphQL schema (SDL) and exit.
  #[arg(long)]
  print_schema: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.print_schema {
    println!("{}", agenda_graphql::sdl::<SqliteStore, NinjasClient>());
    return ExitCode::SUCCESS;
  }

  match run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::error!("{e:#}");
      ExitCode::FAILURE
    }
  }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
  let server_cfg = ServerConfig::load(cli.config)
    .context("failed to load configuration (is AGENDA_DATABASE_URL set?)")?;

  // Expand `~` in the database path.
  let store_path = expand_tilde(&server_cfg.database_url);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::info!("Connected to store at {}", store_path.display());

  let ninjas = NinjasClient::new(server_cfg.ninjas_config())
    .context("failed to build API Ninjas client")?;

  let directory_cfg = server_cfg.directory_config();
  if directory_cfg.api_key.is_none() {
    tracing::warn!("no api_key configured; addContact and updateContact will fail");
  }

  let directory = Directory::new(Arc::new(store), Arc::new(ninjas), directory_cfg);
  let app = agenda_graphql::router(agenda_graphql::build_schema(directory));
  let address = server_cfg.address();

  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Server ready at http://{address}{}", agenda_graphql::GRAPHQL_PATH);

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
