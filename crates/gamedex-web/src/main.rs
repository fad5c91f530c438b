//! Gamedex server binary.
//!
//! Reads `gamedex.toml` (or the path given with `--config`), opens the
//! configured store, and either serves the web pages and JSON API or runs a
//! one-off CSV import.
//!
//! ```text
//! server                                   # serve
//! server import --games vgsales.csv --consoles consoles.csv
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use gamedex_api::AppState;
use gamedex_core::{clock::SystemClock, console::Console, game::Game, store::Backend};
use gamedex_store_csv::CsvStore;
use gamedex_store_sqlite::SqliteStore;
use gamedex_web::{BackendKind, ServerConfig};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Gamedex catalog server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "gamedex.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the web pages and the JSON API (the default).
  Serve,
  /// Import games and/or consoles from CSV files, then exit.
  Import {
    #[arg(long)]
    games:    Option<PathBuf>,
    #[arg(long)]
    consoles: Option<PathBuf>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("GAMEDEX"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let command = cli.command.unwrap_or(Command::Serve);

  match server_cfg.backend {
    BackendKind::Sqlite => {
      let store = SqliteStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open SQLite store at {store_path:?}"))?;
      run(store, &server_cfg, command).await
    }
    BackendKind::Csv => {
      let store = CsvStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open CSV store at {store_path:?}"))?;
      tracing::info!(dir = ?store.dir(), "using flat-file store");
      run(store, &server_cfg, command).await
    }
  }
}

async fn run<S: Backend>(store: S, cfg: &ServerConfig, command: Command) -> anyhow::Result<()> {
  let state = Arc::new(AppState::new(
    Arc::new(store),
    Arc::new(SystemClock),
    cfg.import_batch_size,
  ));

  match command {
    Command::Serve => serve(state, cfg).await,
    Command::Import { games, consoles } => import(state, games, consoles).await,
  }
}

async fn serve<S: Backend>(state: Arc<AppState<S>>, cfg: &ServerConfig) -> anyhow::Result<()> {
  let app = gamedex_web::router(state);
  let address = format!("{}:{}", cfg.host, cfg.port);

  tracing::info!(backend = ?cfg.backend, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn import<S: Backend>(
  state: Arc<AppState<S>>,
  games: Option<PathBuf>,
  consoles: Option<PathBuf>,
) -> anyhow::Result<()> {
  if games.is_none() && consoles.is_none() {
    bail!("nothing to import: pass --games and/or --consoles");
  }

  let mut fatal = false;
  if let Some(path) = games {
    let summary = state.importer.import_path::<Game>(&path).await;
    fatal |= summary.is_fatal();
    println!("{}", serde_json::to_string_pretty(&summary).context("failed to render summary")?);
  }
  if let Some(path) = consoles {
    let summary = state.importer.import_path::<Console>(&path).await;
    fatal |= summary.is_fatal();
    println!("{}", serde_json::to_string_pretty(&summary).context("failed to render summary")?);
  }

  if fatal {
    bail!("one or more import sources could not be read");
  }
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
