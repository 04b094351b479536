use chrono::Local;
use clap::Args;
use ghr_impact::config::{AppConfig, PositionsBackend};
use ghr_impact::error::AppError;
use ghr_impact::telemetry;
use ghr_impact::workflows::positions::{
    placement_stats, Placement, PositionsReport, ReconciliationEngine, SourceKind,
};
use serde::Serialize;
use std::path::PathBuf;

use crate::infra::{describe_backend, position_store};

#[derive(Args, Debug, Default)]
pub(crate) struct PositionsArgs {
    /// Read positions from a directory of per-table CSV exports instead of the configured store
    #[arg(long)]
    pub(crate) csv_dir: Option<PathBuf>,
    /// Print the full report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct StatsArgs {
    /// Read orders from a directory of per-table CSV exports instead of the configured store
    #[arg(long)]
    pub(crate) csv_dir: Option<PathBuf>,
    /// Print the stats as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_positions_report(args: PositionsArgs) -> Result<(), AppError> {
    let backend = load_backend(args.csv_dir)?;
    let engine = ReconciliationEngine::standard(position_store(&backend));
    let report = engine.run();

    if args.json {
        println!("{}", to_json(&report)?);
    } else {
        render_positions_report(&report, &backend);
    }
    Ok(())
}

pub(crate) fn run_stats_report(args: StatsArgs) -> Result<(), AppError> {
    let backend = load_backend(args.csv_dir)?;
    let store = position_store(&backend);
    let stats = placement_stats(store.as_ref(), Local::now().naive_local())?;

    if args.json {
        println!("{}", to_json(&stats)?);
        return Ok(());
    }

    println!("Placement stats ({})", describe_backend(&backend));
    println!("  On assignment: {}", stats.on_assignment.len());
    for placement in &stats.on_assignment {
        println!("    {}", placement_line(placement));
    }
    println!("  Upcoming starts: {}", stats.upcoming.len());
    for placement in &stats.upcoming {
        println!("    {}", placement_line(placement));
    }
    Ok(())
}

fn load_backend(csv_dir: Option<PathBuf>) -> Result<PositionsBackend, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = csv_dir {
        config.stores.positions = PositionsBackend::Csv(dir);
    }
    telemetry::init(&config.telemetry)?;
    Ok(config.stores.positions)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, err)))
}

fn render_positions_report(report: &PositionsReport, backend: &PositionsBackend) {
    println!("Position reconciliation ({})", describe_backend(backend));
    for source in [SourceKind::B4, SourceKind::Vndly] {
        println!("  {} positions: {}", source, report.count_for(source));
    }

    let totals = report
        .positions
        .iter()
        .map(|position| position.counts())
        .fold([0usize; 4], |mut acc, counts| {
            acc[0] += counts.ghr_submissions;
            acc[1] += counts.external_submissions;
            acc[2] += counts.ghr_declines;
            acc[3] += counts.external_declines;
            acc
        });
    println!(
        "  Submissions: {} GHR, {} external, {} GHR declines, {} external declines",
        totals[0], totals[1], totals[2], totals[3]
    );
    if report.unmatched_submissions > 0 {
        println!("  Unmatched submissions: {}", report.unmatched_submissions);
    }

    if report.errors.is_empty() {
        return;
    }
    println!("  Errors:");
    for issue in &report.errors {
        println!("    [{}] {}", issue.source, issue.error);
    }
}

fn placement_line(placement: &Placement) -> String {
    let dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let window = match placement.end_date {
        Some(end) => format!("{} to {}", placement.start_date.date(), end.date()),
        None => format!("starts {}", placement.start_date.date()),
    };
    format!(
        "{} | {} | {} | {} | {}",
        dash(&placement.agency),
        dash(&placement.system),
        dash(&placement.facility),
        dash(&placement.specialty),
        window
    )
}
