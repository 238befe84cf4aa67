//! `wellseries` command line
//!
//! ```text
//! wellseries clean raw.json -o processed.json
//! wellseries timeseries --well-id 1 --granularity hour --limit 24
//! wellseries stats
//! wellseries health
//! ```
//!
//! Every command prints JSON to stdout. Logging goes to stderr and is
//! controlled by `RUST_LOG`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde_json::json;

use wellseries_core::{time::parse_date, LimitPolicy, Normalizer, PipelineConfig, Regularizer};
use wellseries_store::{load_raw, write_canonical, QueryService, SnapshotStore, TimeseriesParams};

const DEFAULT_PROCESSED_PATH: &str = "data/processed.json";

/// Clean and query well sensor exports
#[derive(Debug, Parser)]
#[command(name = "wellseries", version, about)]
pub struct Cli {
    /// JSON pipeline config; flags override it
    #[arg(short, long, global = true, env = "WELLSERIES_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Normalize timestamps and regularize a raw export onto a one-minute grid
    Clean(CleanArgs),
    /// Bucketed means for one well
    Timeseries(TimeseriesArgs),
    /// Row counts and per-sensor min/max/mean
    Stats(DataArgs),
    /// Data availability and covered time range
    Health(DataArgs),
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Raw JSON export
    pub input: PathBuf,

    /// Where to write the canonical series
    #[arg(short, long, default_value = DEFAULT_PROCESSED_PATH)]
    pub output: PathBuf,

    /// Date that `day1` and undated times resolve to (YYYY-MM-DD)
    #[arg(long)]
    pub base_date: Option<String>,
}

#[derive(Debug, Args)]
pub struct DataArgs {
    /// Canonical series file
    #[arg(short, long, default_value = DEFAULT_PROCESSED_PATH, env = "WELLSERIES_DATA")]
    pub data: PathBuf,
}

#[derive(Debug, Args)]
pub struct TimeseriesArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Well to select [default: 1]
    #[arg(short, long)]
    pub well_id: Option<String>,

    /// Inclusive lower bound, date or date-time
    #[arg(long)]
    pub start: Option<String>,

    /// Inclusive upper bound, date or date-time
    #[arg(long)]
    pub end: Option<String>,

    /// Class to select
    #[arg(long)]
    pub class_id: Option<String>,

    /// minute, hour or day [default: minute]
    #[arg(short, long)]
    pub granularity: Option<String>,

    /// Maximum number of buckets
    #[arg(short, long)]
    pub limit: Option<String>,

    /// Which buckets a limit keeps: earliest or latest
    #[arg(long)]
    pub limit_policy: Option<String>,
}

impl TimeseriesArgs {
    fn params(&self) -> TimeseriesParams {
        TimeseriesParams {
            well_id: self.well_id.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            class_id: self.class_id.clone(),
            granularity: self.granularity.clone(),
            limit: self.limit.clone(),
        }
    }
}

/// Read the config file, or defaults when none is given
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    PipelineConfig::from_json(&text).with_context(|| format!("in config {}", path.display()))
}

/// Run one command, writing its JSON result to `out`
pub fn execute(cli: &Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref())?;

    let result = match &cli.command {
        Commands::Clean(args) => {
            if let Some(value) = &args.base_date {
                let date = parse_date(value).ok_or_else(|| anyhow!("invalid --base-date '{value}': expected YYYY-MM-DD"))?;
                config.normalizer = config.normalizer.with_base_date(date);
            }
            clean(args, &config)?
        }
        Commands::Timeseries(args) => {
            if let Some(value) = &args.limit_policy {
                config.query = config.query.with_limit_policy(value.parse::<LimitPolicy>()?);
            }
            let service = service(&args.data, &config);
            serde_json::to_value(service.timeseries(&args.params())?)?
        }
        Commands::Stats(args) => serde_json::to_value(service(args, &config).stats()?)?,
        Commands::Health(args) => serde_json::to_value(service(args, &config).health())?,
    };

    serde_json::to_writer_pretty(&mut *out, &result)?;
    writeln!(out)?;
    Ok(())
}

fn service(args: &DataArgs, config: &PipelineConfig) -> QueryService {
    QueryService::new(SnapshotStore::new(&args.data), config.query.clone())
}

fn clean(args: &CleanArgs, config: &PipelineConfig) -> anyhow::Result<serde_json::Value> {
    let raw = load_raw(&args.input)?;
    let batch = Normalizer::new(config.normalizer.clone()).normalize_batch(raw.rows);
    let series = Regularizer::new(config.regularizer.clone()).regularize_wells(&batch.records);

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    write_canonical(&args.output, &series.records)?;
    info!("cleaned {} into {}", args.input.display(), args.output.display());

    let rejected: serde_json::Map<String, serde_json::Value> = batch
        .report
        .rejected
        .iter()
        .map(|(reason, count)| (reason.to_string(), json!(count)))
        .collect();

    Ok(json!({
        "input": args.input,
        "output": args.output,
        "skipped_rows": raw.skipped,
        "normalize": {
            "accepted": batch.report.accepted,
            "rejected": rejected,
            "by_strategy": batch.report.by_strategy,
        },
        "regularize": series.report,
    }))
}
