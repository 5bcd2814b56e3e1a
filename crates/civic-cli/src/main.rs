//! `civic`, the operator tool for the civic report store.
//!
//! Reads `civic.toml` (or the path given with `--config`) plus `CIVIC_*`
//! environment variables, opens the SQLite store, and runs one command.
//!
//! # Usage
//!
//! ```text
//! civic init-db
//! civic agency register --name "Public Works" --email works@city.gov < password.txt
//! civic report submit --message "pothole" --lat 40.7128 --lon -74.006 --method gps --agency 1
//! civic report list --agency 1 --json
//! ```

mod cli;
mod commands;
mod credentials;
mod settings;

use std::io;

use anyhow::Context as _;
use clap::Parser;
use civic_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use commands::Output;
use settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr; stdout carries command output.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if let Command::HashPassword = cli.command {
    let password = credentials::read_password(&mut io::stdin().lock())?;
    println!("{}", credentials::hash_password(&password)?);
    return Ok(());
  }

  let settings = Settings::load(&cli.config)?;
  let store_path = settings.store_path();

  let store = SqliteStore::open_with_busy_timeout(&store_path, settings.busy_timeout())
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let mut stdout = io::stdout().lock();
  let output = Output { out: &mut stdout, json: cli.json };

  match cli.command {
    Command::InitDb => {
      tracing::info!(path = ?store_path, "store initialised");
      Ok(())
    }
    // Handled before the store is opened.
    Command::HashPassword => Ok(()),
    Command::Agency(command) => {
      commands::agency(&store, command, &mut io::stdin().lock(), output).await
    }
    Command::Report(command) => commands::report(&store, command, output).await,
  }
}
