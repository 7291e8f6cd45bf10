//! EmpTrend CLI: fetch BLS employment series and build the cleaned table.
//!
//! Commands:
//! - `fetch`: pull every catalog sector from the BLS API and save raw backups
//! - `transform`: clean the newest raw backups into a persisted table
//! - `run`: fetch then transform in one go
//! - `validate`: re-check a persisted CSV (exit 1 when issues are found)
//! - `check`: test the API connection with a single series
//! - `sectors`: list the configured sector catalog

use anyhow::{bail, Context, Result};
use chrono::Datelike;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use emptrend_core::config::PipelineConfig;
use emptrend_core::data::{
    BlsProvider, Extraction, Extractor, RawBackupStore, RequestBudget, SectorCatalog,
    StdoutProgress, YearRange,
};
use emptrend_core::domain::RawPoint;
use emptrend_core::io::read_table;
use emptrend_core::pipeline::{self, RunOutcome};
use emptrend_core::transform::validate;

/// Rows shown in the post-run sample.
const SAMPLE_ROWS: usize = 5;

#[derive(Parser)]
#[command(
    name = "emptrend",
    about = "EmpTrend CLI: BLS sector employment extraction and cleaning"
)]
struct Cli {
    /// Path to a TOML config file. Missing file means defaults.
    #[arg(long, global = true, default_value = "emptrend.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all configured sectors and save raw backups.
    Fetch {
        #[command(flatten)]
        fetch: FetchArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Clean the newest raw backups into a persisted table.
    Transform {
        /// Directory holding raw_*.json backups. Defaults to the data dir.
        #[arg(long)]
        raw_dir: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Fetch, then clean and persist.
    Run {
        #[command(flatten)]
        fetch: FetchArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Validate a persisted CSV table.
    Validate {
        /// Path to a cleaned_employment_*.csv file.
        path: PathBuf,
    },
    /// Test the API connection with one series.
    Check {
        /// Series to request.
        #[arg(long, default_value = "CES0000000001")]
        series: String,
    },
    /// List the sector catalog.
    Sectors,
}

#[derive(Args)]
struct FetchArgs {
    /// First year to request. Defaults to `years_back` before the end year.
    #[arg(long)]
    start_year: Option<i32>,

    /// Last year to request. Defaults to the current year.
    #[arg(long)]
    end_year: Option<i32>,

    /// Restrict to these sectors (repeatable).
    #[arg(long = "sector")]
    sectors: Vec<String>,

    /// Override the request budget.
    #[arg(long)]
    max_requests: Option<u32>,
}

#[derive(Args)]
struct OutputArgs {
    /// Output directory. Overrides `[output] data_dir`.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Also write a Parquet copy of the table.
    #[arg(long, default_value_t = false)]
    parquet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = PipelineConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    match cli.command {
        Commands::Fetch { fetch, output } => {
            apply_output(&mut config, &output);
            let extraction = run_fetch(&config, &fetch)?;
            if extraction.fetched_count() == 0 {
                bail!("no sector returned data");
            }
            Ok(())
        }
        Commands::Transform { raw_dir, output } => {
            apply_output(&mut config, &output);
            let raw_dir = raw_dir.unwrap_or_else(|| config.output.data_dir.clone());
            run_transform(&config, &raw_dir)
        }
        Commands::Run { fetch, output } => {
            apply_output(&mut config, &output);
            let extraction = run_fetch(&config, &fetch)?;
            let outcome = run_pipeline(&config, &extraction.raw_points())?;
            print_outcome(&outcome);
            Ok(())
        }
        Commands::Validate { path } => run_validate(&path),
        Commands::Check { series } => run_check(&config, &series),
        Commands::Sectors => {
            print_catalog(&config.catalog());
            Ok(())
        }
    }
}

fn apply_output(config: &mut PipelineConfig, output: &OutputArgs) {
    if let Some(dir) = &output.data_dir {
        config.output.data_dir = dir.clone();
    }
    if output.parquet {
        config.output.parquet = true;
    }
}

fn build_extractor(config: &PipelineConfig, max_requests: Option<u32>) -> Result<Extractor> {
    let provider = BlsProvider::new(&config.api.base_url, config.api.timeout())?;
    let budget = RequestBudget::new(max_requests.unwrap_or(config.api.max_requests));
    Ok(Extractor::new(Box::new(provider), budget).with_pacing(config.api.pacing()))
}

fn run_fetch(config: &PipelineConfig, args: &FetchArgs) -> Result<Extraction> {
    let current_year = chrono::Local::now().year();
    let mut years = config.year_range(current_year)?;
    if args.start_year.is_some() || args.end_year.is_some() {
        let end = args.end_year.unwrap_or(years.end);
        let start = args
            .start_year
            .unwrap_or(end - config.range.years_back);
        years = YearRange::new(start, end)?;
    }

    let mut catalog = config.catalog();
    if !args.sectors.is_empty() {
        catalog = catalog.select(&args.sectors)?;
    }

    let mut extractor = build_extractor(config, args.max_requests)?
        .with_backups(RawBackupStore::new(&config.output.data_dir));

    println!("{}", "=".repeat(50));
    println!("FETCHING EMPLOYMENT DATA ({}-{})", years.start, years.end);
    println!("{}\n", "=".repeat(50));

    let extraction = extractor.fetch_all(&catalog, years, &StdoutProgress);

    if !extraction.backups.is_empty() {
        println!("\nRaw backups:");
        for path in &extraction.backups {
            println!("  {}", path.display());
        }
    }

    Ok(extraction)
}

fn run_transform(config: &PipelineConfig, raw_dir: &Path) -> Result<()> {
    let store = RawBackupStore::new(raw_dir);
    let files = store.latest_files()?;
    info!(dir = %store.dir().display(), sectors = files.len(), "loading newest raw backups");
    for file in files.values() {
        info!(sector = %file.sector, taken_at = %file.taken_at, "using backup");
    }
    let raw = store.load_latest()?;

    let outcome = run_pipeline(config, &raw)?;
    print_outcome(&outcome);
    Ok(())
}

fn run_pipeline(
    config: &PipelineConfig,
    raw: &BTreeMap<String, Vec<RawPoint>>,
) -> Result<RunOutcome> {
    let opts = config.output_options();
    Ok(pipeline::run(raw, &opts)?)
}

fn print_outcome(outcome: &RunOutcome) {
    let table = &outcome.dataset.table;
    let report = &outcome.dataset.report;

    println!("\n=== Cleaned Employment Data ===");
    println!("Rows:       {}", table.len());
    println!("Sectors:    {}", table.sectors().join(", "));
    if let Some((start, end)) = table.date_range() {
        println!("Period:     {start} to {end}");
    }
    if !outcome.dataset.sectors_empty.is_empty() {
        println!("No data:    {}", outcome.dataset.sectors_empty.join(", "));
    }

    println!("\nSample:");
    println!(
        "  {:<28} {:<10} {:>12} {:>8}  {}",
        "sector", "date", "employment", "yoy_pct", "growth_status"
    );
    for r in table.head(SAMPLE_ROWS) {
        let yoy = r.yoy_percent.map(|p| format!("{p:.2}")).unwrap_or_default();
        let status = r.growth_status.map(|g| g.label()).unwrap_or("");
        println!(
            "  {:<28} {:<10} {:>12.1} {:>8}  {}",
            r.sector, r.date, r.employment_thousands, yoy, status
        );
    }
    println!();

    if report.is_valid {
        println!("Validation: passed");
    } else {
        println!("Validation: {} issue(s)", report.issues.len());
        for message in report.messages() {
            println!("  - {message}");
        }
    }

    println!("\nSaved:");
    println!("  {}", outcome.paths.csv.display());
    if let Some(parquet) = &outcome.paths.parquet {
        println!("  {}", parquet.display());
    }
    println!("  {}", outcome.paths.manifest.display());
}

fn run_validate(path: &Path) -> Result<()> {
    let table = read_table(path)?;
    let report = validate(&table.records);

    println!("File:    {}", path.display());
    println!("Rows:    {}", report.rows_checked);
    println!("Sectors: {}", table.sectors().len());

    if report.is_valid {
        println!("All validation checks passed");
        return Ok(());
    }

    println!("Found {} issue(s):", report.issues.len());
    for message in report.messages() {
        println!("  - {message}");
    }
    std::process::exit(1);
}

fn run_check(config: &PipelineConfig, series_id: &str) -> Result<()> {
    let current_year = chrono::Local::now().year();
    let years = YearRange::trailing(current_year, 2);
    let mut extractor = build_extractor(config, None)?;

    println!("Testing {} with {series_id} ({}-{})", extractor.provider_name(), years.start, years.end);
    let points = extractor.fetch_series(series_id, years)?;
    if points.is_empty() {
        bail!("API returned no data points for {series_id}");
    }

    println!("Connection working: {} data points", points.len());
    for point in points.iter().take(3) {
        let year = point.get("year").and_then(|v| v.as_str()).unwrap_or("?");
        let period = point.get("period").and_then(|v| v.as_str()).unwrap_or("?");
        let value = point.get("value").and_then(|v| v.as_str()).unwrap_or("?");
        println!("  {year}-{period}: {value} thousand employees");
    }
    Ok(())
}

fn print_catalog(catalog: &SectorCatalog) {
    println!("{:<28} {}", "Sector", "Series ID");
    println!("{}", "-".repeat(42));
    for (sector, series_id) in catalog.iter() {
        println!("{sector:<28} {series_id}");
    }
    println!("\n{} sectors", catalog.len());
}
