use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use swisstax_data::{
    BUILTIN_BRACKETS, BUILTIN_JURISDICTIONS, BUILTIN_LIMITS, LoadSummary, ScheduleLoader,
};
use tracing_subscriber::EnvFilter;

/// Check tax tables in CSV form and report what they contain.
///
/// Every row is parsed and every schedule, canton config and limit set is
/// validated exactly as the engine would on registration. Without any
/// file arguments the built-in tables are checked.
///
/// Bracket columns: tax_year, jurisdiction (CH or canton code), base
/// (income | wealth), filing_mode (single | married | both), threshold,
/// rate, label.
#[derive(Parser, Debug)]
#[command(name = "swisstax-validate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the bracket schedules CSV file
    #[arg(short, long)]
    brackets: Option<PathBuf>,

    /// Path to the canton configs CSV file
    #[arg(short, long)]
    jurisdictions: Option<PathBuf>,

    /// Path to the yearly deduction limits CSV file
    #[arg(short, long)]
    limits: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open: {}", path.display()))
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let (summary, registry) = match (&args.brackets, &args.jurisdictions, &args.limits) {
        (None, None, None) => {
            println!("Validating built-in tables");
            let (registry, summary) = ScheduleLoader::registry_from_readers(
                BUILTIN_BRACKETS.as_bytes(),
                BUILTIN_JURISDICTIONS.as_bytes(),
                BUILTIN_LIMITS.as_bytes(),
            )
            .context("Built-in tables are invalid")?;
            (summary, registry)
        }
        (Some(brackets), Some(jurisdictions), Some(limits)) => {
            println!("Validating {}", brackets.display());
            let (registry, summary) = ScheduleLoader::registry_from_readers(
                open(brackets)?,
                open(jurisdictions)?,
                open(limits)?,
            )
            .context("Tax tables are invalid")?;
            (summary, registry)
        }
        _ => bail!("--brackets, --jurisdictions and --limits must be given together"),
    };

    report(&summary);

    let years: Vec<String> = registry.years().iter().map(i32::to_string).collect();
    let jurisdictions: Vec<String> = registry
        .jurisdictions()
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("Tax years: {}", years.join(", "));
    println!("Jurisdictions: {}", jurisdictions.join(", "));

    Ok(())
}

fn report(summary: &LoadSummary) {
    println!(
        "Parsed {} bracket rows into {} schedules",
        summary.bracket_rows, summary.schedules
    );
    println!(
        "Registered {} canton configs and {} deduction limit sets",
        summary.jurisdiction_configs, summary.tax_years
    );
}
