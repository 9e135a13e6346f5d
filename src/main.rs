//! Claims Analytics CLI
//!
//! Runs the SOL, executive review and (optionally) loss development components
//! over CSV exports and prints a JSON report to stdout.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use claims_analytics::claims::{load_claims, parse_date};
use claims_analytics::engine::{ReviewAnalysis, SolAnalysis, TriangleAnalysis};
use claims_analytics::review::{ClaimAgeEstimator, PrefixCalendar};
use claims_analytics::triangle::{load_points, MetricType};
use claims_analytics::{AnalyticsEngine, EngineConfig, StateLimits};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "claims_analytics", version, about = "Claims risk and reserving analytics")]
struct Args {
    /// Claims export (CSV)
    #[arg(long)]
    claims: PathBuf,

    /// Limitation periods by state (CSV: state,years)
    #[arg(long)]
    limits: PathBuf,

    /// Metric points for the development triangle (CSV)
    #[arg(long)]
    points: Option<PathBuf>,

    /// Metric used for factor derivation
    #[arg(long, default_value = "loss_ratio")]
    metric: String,

    /// Evaluation date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    as_of: Option<String>,

    /// Engine configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Claim-number prefix calendar used when no transfer date exists (JSON)
    #[arg(long)]
    prefix_calendar: Option<PathBuf>,

    /// Evaluate SOL for every status, not just actionable claims
    #[arg(long)]
    all_statuses: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct Report {
    as_of: NaiveDate,
    claim_count: usize,
    claim_rows_excluded: usize,
    sol: SolAnalysis,
    review: ReviewAnalysis,
    triangle: Option<TriangleAnalysis>,
    execution_time_ms: u64,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let start = Instant::now();

    let as_of = match &args.as_of {
        Some(raw) => parse_date(raw).with_context(|| format!("invalid --as-of date '{}'", raw))?,
        None => Local::now().date_naive(),
    };

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let limits = StateLimits::load(&args.limits)
        .with_context(|| format!("loading limitation table {}", args.limits.display()))?;

    let estimator = match &args.prefix_calendar {
        Some(path) => ClaimAgeEstimator::with_calendar(
            PrefixCalendar::from_json_path(path)
                .with_context(|| format!("loading prefix calendar {}", path.display()))?,
        ),
        None => ClaimAgeEstimator::new(),
    };

    let claims = load_claims(&args.claims)
        .with_context(|| format!("loading claims {}", args.claims.display()))?;
    log::info!(
        "Loaded {} claims ({} rows excluded) in {:?}",
        claims.results.len(),
        claims.excluded_count(),
        start.elapsed()
    );

    let engine = AnalyticsEngine::with_estimator(config, limits, estimator)?;

    let sol = if args.all_statuses {
        engine.run_sol(&claims, as_of, |_| true)
    } else {
        engine.run_sol(&claims, as_of, |c| c.status.is_actionable())
    };
    let review = engine.run_reviews(&claims, as_of);

    let triangle = match &args.points {
        Some(path) => {
            let metric = MetricType::parse(&args.metric)
                .with_context(|| format!("unknown metric type '{}'", args.metric))?;
            let points = load_points(path)
                .with_context(|| format!("loading metric points {}", path.display()))?;
            Some(engine.run_triangle(&points, metric))
        }
        None => None,
    };

    let report = Report {
        as_of,
        claim_count: claims.results.len(),
        claim_rows_excluded: claims.excluded_count(),
        sol,
        review,
        triangle,
        execution_time_ms: start.elapsed().as_millis() as u64,
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);

    Ok(())
}
