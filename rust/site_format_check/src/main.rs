use anyhow::{bail, Context, Result};
use clap::Parser;
use site_format_check::{run_batch, BatchConfig, DEFAULT_ASSIGNMENT};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about = "Check HTML+CSS homework submissions and write one JSON report per ZIP")]
struct Args {
    /// Directory holding the submitted .zip archives.
    submissions_dir: PathBuf,

    /// Directory the <archive-stem>.json reports are written to (created if missing).
    reports_dir: PathBuf,

    /// Assignment label written into every report.
    #[arg(long, default_value = DEFAULT_ASSIGNMENT)]
    assignment: String,

    /// Regex applied to each archive file name; its first capture group becomes the student id.
    #[arg(long)]
    id_pattern: Option<String>,

    /// Log more (-v for each report, -vv for tokenizer and archive details).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = BatchConfig::new(&args.submissions_dir, &args.reports_dir);
    config.assignment = args.assignment;
    if let Some(pattern) = args.id_pattern.as_deref() {
        config = config
            .with_id_pattern(pattern)
            .with_context(|| format!("--id-pattern {pattern:?}"))?;
    }

    let summary = run_batch(&config).context("check submissions")?;
    tracing::info!(
        written = summary.written.len(),
        passed = summary.passed,
        failed = summary.failed.len(),
        "batch finished"
    );

    if !summary.failed.is_empty() {
        bail!("{} report(s) could not be written", summary.failed.len());
    }
    Ok(())
}
