// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Terrasense CLI - Earth-observation retrieval and farm analytics from the
//! command line.
//!
//! # Examples
//!
//! ```bash
//! # Soil-moisture series for a point
//! terrasense moisture --lat 23.81 --lon 90.41 --start 2025-07-01 --end 2025-07-31
//!
//! # Drought assessment
//! terrasense drought --lat 23.81 --lon 90.41 --start 2025-07-01 --end 2025-07-31
//!
//! # Irrigation requirement for 2 ha targeting 0.30 moisture
//! terrasense irrigation --lat 23.81 --lon 90.41 --start 2025-07-01 --end 2025-07-31 \
//!     --target 0.30 --area 2
//!
//! # Vegetation index via the extraction workflow (needs credentials)
//! terrasense vegetation --lat 23.81 --lon 90.41 --start 2025-07-01 --end 2025-09-30
//!
//! # JSON output
//! terrasense drought --lat 23.81 --lon 90.41 --start 2025-07-01 --end 2025-07-31 \
//!     --format json --pretty
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use terrasense_providers::EarthDataService;
use terrasense_store::Settings;

use output::OutputFormat;

// ============================================================================
// CLI Definition
// ============================================================================

/// Terrasense CLI - Earth-observation retrieval and farm analytics.
#[derive(Parser)]
#[command(name = "terrasense")]
#[command(about = "Earth-observation retrieval and farm analytics CLI")]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug logs).
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a soil-moisture series for a point.
    #[command(visible_alias = "m")]
    Moisture(commands::RangeArgs),

    /// Fetch a vegetation-index series via the extraction workflow.
    #[command(visible_alias = "v")]
    Vegetation(commands::RangeArgs),

    /// Assess drought conditions for a point.
    #[command(visible_alias = "d")]
    Drought(commands::RangeArgs),

    /// Compute the irrigation requirement for a field.
    Irrigation(commands::IrrigationArgs),

    /// Derive a grazing-rotation schedule for a paddock.
    Grazing(commands::GrazingArgs),

    /// Predict soil moisture over the next seven days.
    Forecast(commands::ForecastArgs),
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let settings = Settings::load_or_default(&Settings::default_path()).await;
    let service = EarthDataService::from_settings(&settings)?;
    let out = output::Output::new(cli.format, cli.pretty);

    match cli.command {
        Commands::Moisture(args) => commands::moisture(&service, &args, &out).await,
        Commands::Vegetation(args) => commands::vegetation(&service, &args, &out).await,
        Commands::Drought(args) => commands::drought(&service, &args, &out).await,
        Commands::Irrigation(args) => commands::irrigation(&service, &args, &out).await,
        Commands::Grazing(args) => commands::grazing(&service, &args, &out).await,
        Commands::Forecast(args) => commands::forecast(&service, &args, &out).await,
    }
}

/// Initializes tracing with an env-filter; `--verbose` lowers the default
/// level to debug for the terrasense crates.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "terrasense=debug,terrasense_fetch=debug,terrasense_providers=debug,terrasense_store=debug"
    } else {
        "terrasense=warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
