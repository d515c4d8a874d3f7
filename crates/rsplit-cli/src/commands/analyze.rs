//! Analyze command - list the receipts found in a sheet.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::debug;

use rsplit_core::{distinct_payers, ReceiptRecord, ReviewStatus, Session, SessionEvent, SplitterConfig};

use super::{load_config, local_company};

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Local company name; receipts it paid are named after the receiver
    #[arg(long)]
    company: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per receipt, printed as it is found
    Table,
    /// JSON array of records
    Json,
    /// CSV with a header row
    Csv,
}

pub async fn run(args: AnalyzeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let company = local_company(args.company.as_deref(), &config);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let stream_rows = args.format == OutputFormat::Table && args.output.is_none();
    let session = analyze(&args.input, config, &company, |record| {
        if stream_rows {
            println!("{}", format_row(record));
        }
    })
    .await?;
    let records = session.records();

    let output = match args.format {
        OutputFormat::Table => records.iter().map(format_row).collect::<Vec<_>>().join("\n"),
        OutputFormat::Json => serde_json::to_string_pretty(records)?,
        OutputFormat::Csv => format_csv(records)?,
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else if args.format != OutputFormat::Table {
        println!("{}", output);
    }

    print_summary(records);
    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Run one analysis pass to completion, calling `on_record` as each record arrives.
pub async fn analyze<F: FnMut(&ReceiptRecord)>(
    input: &Path,
    config: SplitterConfig,
    company: &str,
    mut on_record: F,
) -> anyhow::Result<Session> {
    let mut session = Session::new(config);
    session.load_file(input, company)?;

    let mut failure = None;
    session
        .run_until_idle(|event| match event {
            SessionEvent::Record(record) => on_record(record),
            SessionEvent::AnalysisFailed(message) => failure = Some(message.clone()),
            _ => {}
        })
        .await;

    if let Some(message) = failure {
        anyhow::bail!("Analysis of {} failed: {}", input.display(), message);
    }
    Ok(session)
}

/// One table row: sequence, page, customer, number, amount and status.
fn format_row(record: &ReceiptRecord) -> String {
    let status = match record.status {
        ReviewStatus::Normal => style(record.status.label()).green(),
        _ => style(record.status.label()).yellow(),
    };
    format!(
        "{:>3}  p{:<3} {}  {}  {:>12}  {}",
        record.seq,
        record.page_index + 1,
        record.customer_name,
        record.receipt_number,
        record.amount,
        status
    )
}

fn format_csv(records: &[ReceiptRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "seq",
        "page",
        "payer_name",
        "receiver_name",
        "customer_name",
        "receipt_number",
        "amount",
        "status",
    ])?;

    for record in records {
        wtr.write_record([
            record.seq.to_string().as_str(),
            (record.page_index + 1).to_string().as_str(),
            record.payer_name.as_str(),
            record.receiver_name.as_str(),
            record.customer_name.as_str(),
            record.receipt_number.as_str(),
            record.amount.as_str(),
            record.status.label(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn print_summary(records: &[ReceiptRecord]) {
    let flagged = records
        .iter()
        .filter(|r| r.status == ReviewStatus::NeedsReview)
        .count();

    eprintln!();
    eprintln!(
        "{} Found {} receipt(s), {} need review",
        style("ℹ").blue(),
        records.len(),
        flagged
    );

    let payers = distinct_payers(records);
    if !payers.is_empty() {
        eprintln!("{} Payers (candidates for --company):", style("ℹ").blue());
        for payer in payers {
            eprintln!("  - {}", payer);
        }
    }
}
