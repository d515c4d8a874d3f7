//! Split command - analyze a sheet and export one PDF per receipt.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use rsplit_core::{ExportSummary, ReviewStatus, SessionEvent};

use super::analyze::analyze;
use super::{load_config, local_company};

/// Arguments for the split command.
#[derive(Args)]
pub struct SplitArgs {
    /// Input PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output directory for the cropped receipts and the log
    #[arg(short, long, required = true)]
    output_dir: PathBuf,

    /// Local company name used while analyzing
    #[arg(long)]
    company: Option<String>,

    /// Re-derive customer names for receipts paid by this company before exporting
    #[arg(long)]
    relabel: Option<String>,
}

pub async fn run(args: SplitArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let company = local_company(args.company.as_deref(), &config);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Analyzing {}...", args.input.display()));
    let mut found = 0u64;
    let mut session = analyze(&args.input, config, &company, |_| {
        found += 1;
        spinner.set_message(format!("Analyzing... {} receipt(s)", found));
        spinner.tick();
    })
    .await?;
    spinner.finish_and_clear();

    if session.records().is_empty() {
        println!("{} No receipts found, nothing to export.", style("ℹ").blue());
        return Ok(());
    }

    if let Some(relabel_company) = args.relabel.as_deref() {
        let outcome = session.relabel(relabel_company);
        if outcome.company.is_empty() {
            warn!("Empty --relabel company ignored");
        } else {
            println!(
                "{} Relabeled {} receipt(s) paid by {}",
                style("✓").green(),
                outcome.updated,
                outcome.company
            );
        }
    }

    let flagged = session
        .records()
        .iter()
        .filter(|r| r.status == ReviewStatus::NeedsReview)
        .count();
    if flagged > 0 {
        println!(
            "{} {} receipt(s) need review; their files use placeholder names",
            style("!").yellow(),
            flagged
        );
    }

    let pb = ProgressBar::new(session.records().len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} receipts")?
            .progress_chars("=>-"),
    );

    session.start_export(&args.output_dir)?;

    let mut summary: Option<ExportSummary> = None;
    let mut failure = None;
    session
        .run_until_idle(|event| match event {
            SessionEvent::ExportProgress { done, outcome, .. } => {
                pb.set_position(*done as u64);
                if let Some(error) = &outcome.error {
                    pb.println(format!("{} {}: {}", style("✗").red(), outcome.file_name, error));
                }
            }
            SessionEvent::ExportComplete(s) => summary = Some(s.clone()),
            SessionEvent::ExportFailed(message) => failure = Some(message.clone()),
            _ => {}
        })
        .await;
    pb.finish_and_clear();

    if let Some(message) = failure {
        anyhow::bail!("Export failed: {}", message);
    }
    let summary = summary.ok_or_else(|| anyhow::anyhow!("Export ended without a summary"))?;
    info!("Split finished in {:?}", start.elapsed());

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &ExportSummary) {
    let failed = summary.total - summary.succeeded;

    println!();
    println!(
        "{} Exported {}/{} receipt(s)",
        style("✓").green(),
        summary.succeeded,
        summary.total
    );
    if failed > 0 {
        println!("   {} failed", style(failed).red());
    }
    println!("   Log: {}", summary.log_path.display());
}
