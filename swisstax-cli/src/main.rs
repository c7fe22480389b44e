use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use swisstax_core::{ScheduleRegistry, TaxEngine};
use swisstax_data::{ScheduleLoader, builtin_registry};
use tracing::{debug, info};

use swisstax_cli::logging::init_logging;
use swisstax_cli::profile::load_profile;
use swisstax_cli::report::{OutputFormat, render};

// --- CLI definition ---

/// Swiss personal income and wealth tax calculator.
///
/// Reads a taxpayer profile (TOML), computes federal, cantonal, communal,
/// confessional and wealth tax for one tax year and prints the result.
/// Uses the built-in tables unless all three table files are given.
#[derive(Debug, Parser)]
#[command(name = "swisstax", version)]
struct Cli {
    /// Taxpayer profile in TOML.
    #[arg(short, long)]
    profile: PathBuf,

    /// Tax year to calculate.
    #[arg(short, long, default_value = "2025")]
    year: i32,

    /// Bracket schedules CSV (requires --jurisdictions and --limits).
    #[arg(long, requires_all = ["jurisdictions", "limits"])]
    brackets: Option<PathBuf>,

    /// Canton configs CSV.
    #[arg(long, requires_all = ["brackets", "limits"])]
    jurisdictions: Option<PathBuf>,

    /// Yearly deduction limits CSV.
    #[arg(long, requires_all = ["brackets", "jurisdictions"])]
    limits: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Also append log output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// --- Tables ---

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open: {}", path.display()))
}

fn load_registry(cli: &Cli) -> Result<ScheduleRegistry> {
    match (&cli.brackets, &cli.jurisdictions, &cli.limits) {
        (None, None, None) => {
            debug!("using built-in tables");
            builtin_registry().context("Built-in tax tables failed to load")
        }
        (Some(brackets), Some(jurisdictions), Some(limits)) => {
            info!(brackets = %brackets.display(), "loading tax tables");
            let (registry, _) = ScheduleLoader::registry_from_readers(
                open(brackets)?,
                open(jurisdictions)?,
                open(limits)?,
            )
            .context("Failed to load tax tables")?;
            Ok(registry)
        }
        _ => bail!("--brackets, --jurisdictions and --limits must be given together"),
    }
}

// --- Entry point ---

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging("info", cli.log_file.as_deref())?;

    let profile = load_profile(&cli.profile)?;
    let registry = load_registry(&cli)?;

    let result = TaxEngine::new(&registry)
        .calculate(&profile, cli.year)
        .with_context(|| {
            format!(
                "Tax calculation failed for {} ({})",
                cli.profile.display(),
                cli.year
            )
        })?;

    println!("{}", render(&result, &profile.canton, cli.year, cli.format)?);

    Ok(())
}
