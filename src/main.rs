//! Application entry point for the daily WeatherLink climate loader.
//!
//! This binary orchestrates the full startup sequence for one batch run:
//! - Parsing command line arguments
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Establishing a PostgreSQL connection pool
//! - Creating the database schema if it does not exist
//! - Running the fetch → aggregate → upsert pipeline via `loader`
//!
//! # Environment Variables
//! - `WEATHERLINK_API_KEY` (**required**) – WeatherLink v2 API key
//! - `WEATHERLINK_API_SECRET` (**required**) – WeatherLink v2 API secret
//! - `DATABASE_URL` (**required**) – PostgreSQL connection string
//! - `COUNTRY_PREFIX` (**required**) – external-id prefix of this country's stations
//! - `DB_POOL_MAX` (optional) – maximum number of DB connections (default: 5)
//! - `LOADER_LOG_LEVEL` (optional) – log verbosity (default: `info`)
//! - `LOADER_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! This module follows the Explicit Module Boundary Pattern (EMBP) by
//! delegating schema setup to `schema`, configuration parsing to `config`,
//! and the pipeline itself to `loader`.
use std::{env, io::IsTerminal};

use clap::Parser;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use anyhow::Result;

mod aggregate;
mod config;
mod fetch;
mod loader;
mod models;
mod schema;
mod stations;
mod store;

pub use config::Config;

// These are not used here but they are imported to be used by the sibling
// modules, that way refactoring is easier since aggregate/fetch/store do not
// have knowledge of models.rs, only of their parent module (main.rs)
pub use models::{
    ClimaticData, ClimaticMeasure, DailyReading, HistoricalData, MonthlyStationDocument,
    SensorReading, SensorStream, WeatherStation,
};

// ---

/// Load daily WeatherLink observations into the monthly climate collection.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Source file to load data from (accepted for compatibility with the
    /// scheduler invocation, unused by the current pipeline)
    #[arg(long)]
    source: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    let cli = Cli::parse();

    init_tracing();
    dotenv().ok();

    if let Some(source) = &cli.source {
        tracing::debug!("Ignoring --source {}: unused by the daily pipeline", source);
    }

    let cfg = config::load_from_env()?;
    cfg.log_config();

    tracing::info!("Attempting to connect to database");

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_pool_max)
        .connect(&cfg.db_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

    tracing::info!("Successfully connected to database");

    schema::create_schema(&pool).await?;

    loader::run(&cfg, &pool).await?;

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `LOADER_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `LOADER_LOG_LEVEL` env var
///
/// This should be called once at application startup before any logging
/// or tracing macros are invoked. It installs the subscriber globally
/// for the lifetime of the process.
fn init_tracing() {
    // ---
    let span_events = match env::var("LOADER_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to LOADER_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("LOADER_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("{level},sqlx::query=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
