//! Export pass: one cropped PDF per record plus a CSV log.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ExportError;
use crate::models::config::ExportConfig;
use crate::models::receipt::ReceiptRecord;
use crate::pdf::RegionExporter;
use crate::receipt::text::clean_filename;

/// Header row of the export log.
pub const LOG_HEADER: [&str; 4] = ["原文件名", "拆分后文件名", "生成时间", "状态"];

/// Log status for a record that was written.
pub const STATUS_SUCCESS: &str = "成功";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportOutcome {
    /// Sequence number of the record.
    pub seq: u32,
    /// File name written (or attempted).
    pub file_name: String,
    /// Failure message, `None` on success.
    pub error: Option<String>,
}

impl ExportOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Status column of the log row.
    pub fn log_status(&self) -> String {
        match &self.error {
            None => STATUS_SUCCESS.to_string(),
            Some(message) => format!("失败: {}", message),
        }
    }
}

/// Result of a whole export pass.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    /// Records written successfully.
    pub succeeded: usize,
    /// Records attempted.
    pub total: usize,
    /// Path of the CSV log.
    pub log_path: PathBuf,
    /// Per-record outcomes in record order.
    pub outcomes: Vec<ExportOutcome>,
}

/// `{customer}_{number}_{amount}` with path separators made safe.
pub fn base_file_name(record: &ReceiptRecord) -> String {
    let safe = |s: &str| s.replace(['\\', '/'], "_");
    format!(
        "{}_{}_{}",
        clean_filename(&record.customer_name),
        safe(&record.receipt_number),
        safe(&record.amount)
    )
}

/// `dir/base.pdf`, or `dir/base_N.pdf` with the smallest free `N >= 1`.
pub fn unique_path(dir: &Path, base: &str) -> PathBuf {
    let candidate = dir.join(format!("{}.pdf", base));
    if !candidate.exists() {
        return candidate;
    }
    (1..)
        .map(|n| dir.join(format!("{}_{}.pdf", base, n)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Runs the export pass sequentially over a record list.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Write each record's region to `output_dir` and log the result.
    ///
    /// A failing record is logged and skipped; only problems with the output
    /// directory or the log file abort the pass. `on_progress` receives the
    /// number of records done, the total and the latest outcome.
    pub fn export<E, F>(
        &self,
        exporter: &E,
        source_name: &str,
        records: &[ReceiptRecord],
        output_dir: &Path,
        mut on_progress: F,
    ) -> Result<ExportSummary, ExportError>
    where
        E: RegionExporter + ?Sized,
        F: FnMut(usize, usize, &ExportOutcome),
    {
        fs::create_dir_all(output_dir)
            .map_err(|e| ExportError::OutputDir(format!("{}: {}", output_dir.display(), e)))?;

        let log_path = output_dir.join(format!(
            "{}{}.csv",
            self.config.log_prefix,
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        let mut file = File::create(&log_path).map_err(csv::Error::from)?;
        if self.config.log_bom {
            file.write_all(UTF8_BOM).map_err(csv::Error::from)?;
        }
        let mut log = csv::Writer::from_writer(file);
        log.write_record(LOG_HEADER)?;

        let total = records.len();
        let mut outcomes = Vec::with_capacity(total);
        for (done, record) in records.iter().enumerate() {
            let path = unique_path(output_dir, &base_file_name(record));
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let error = match exporter.export_region(record.page_index, &record.rect, &path) {
                Ok(()) => None,
                Err(e) => {
                    warn!("Failed to export record {}: {}", record.seq, e);
                    Some(e.to_string())
                }
            };
            let outcome = ExportOutcome {
                seq: record.seq,
                file_name,
                error,
            };

            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            log.write_record([
                source_name,
                outcome.file_name.as_str(),
                timestamp.as_str(),
                outcome.log_status().as_str(),
            ])?;

            on_progress(done + 1, total, &outcome);
            outcomes.push(outcome);
        }
        log.flush().map_err(csv::Error::from)?;

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        info!(
            "Exported {}/{} receipt(s), log at {}",
            succeeded,
            total,
            log_path.display()
        );

        Ok(ExportSummary {
            succeeded,
            total,
            log_path,
            outcomes,
        })
    }
}
