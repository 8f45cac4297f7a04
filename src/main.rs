use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use meetnorm::output::{self, DEFAULT_OUTPUT};
use meetnorm::{ArchiveScanner, IngestConfig, ScanReport};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Archive root; each subfolder is a region
    #[arg(value_name = "DIR", default_value = "data/MeetingBank/Audio&Transcripts")]
    root: PathBuf,

    /// `stdout`, or a .csv/.tsv/.json/.jsonl path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: String,

    /// JSON file overriding ingestion thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Normalize documents on all cores
    #[cfg(feature = "parallel")]
    #[arg(long)]
    parallel: bool,

    #[arg(long)]
    benchmark: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    let config = match &args.config {
        Some(path) => IngestConfig::from_path(path)?,
        None => IngestConfig::default(),
    };
    let scanner = ArchiveScanner::new(args.root.clone(), config);

    #[cfg(feature = "parallel")]
    let report = if args.parallel {
        scanner.scan_parallel()?
    } else {
        scanner.scan()?
    };
    #[cfg(not(feature = "parallel"))]
    let report = scanner.scan()?;

    output::write(&args.output, &report.records)
        .with_context(|| format!("failed to write {}", args.output))?;
    info!(output = %args.output, records = report.loaded(), "processed transcripts saved");

    if args.benchmark {
        print_benchmark_results(&report, start_time.elapsed());
    }

    Ok(())
}

fn print_benchmark_results(report: &ScanReport, duration: std::time::Duration) {
    let duration_secs = duration.as_secs_f64();
    let total_files = report.loaded() + report.failed();
    let transcript_chars: usize = report
        .records
        .iter()
        .map(|r| r.transcript_text.chars().count())
        .sum();

    eprintln!("\n=== BENCHMARK RESULTS ===");
    eprintln!("Documents found: {}", total_files);
    eprintln!("Records loaded: {}", report.loaded());
    eprintln!("Documents skipped: {}", report.failed());
    eprintln!("Transcript chars: {}", transcript_chars);
    eprintln!("Processing time: {:.3}s", duration_secs);
    eprintln!(
        "Throughput: {:.0} documents/s",
        total_files as f64 / duration_secs
    );
    if total_files > 0 {
        eprintln!(
            "Parse success rate: {:.1}%",
            (report.loaded() as f64 / total_files as f64) * 100.0
        );
    }
}
