//! casting-admin - Operator tasks for the casting database.
//!
//! ## Usage
//!
//! ```bash
//! # Apply pending migrations
//! casting-admin migrate
//!
//! # Drop all tables and re-create them (destroys all data)
//! casting-admin reset --yes
//! ```

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use casting_service::{admin, with_statement_timeout};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "casting-admin", about = "Casting database operator tasks")]
struct Cli {
    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations.
    Migrate,

    /// Drop all tables and re-apply migrations.
    Reset {
        /// Confirm that all data will be destroyed.
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = runtime.block_on(run(Cli::parse())) {
        eprintln!("Error: {err:?}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<()> {
    // Refuse before touching the database
    if let Command::Reset { yes: false } = cli.command {
        bail!("reset destroys all data; re-run with --yes to confirm");
    }

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&with_statement_timeout(&cli.database_url, 30))
        .await
        .context("failed to connect to database")?;

    match cli.command {
        Command::Migrate => admin::migrate(&pool).await?,
        Command::Reset { .. } => admin::reset(&pool).await?,
    }

    Ok(())
}
