//! Core library for splitting multi-receipt bank PDFs.
//!
//! This crate provides:
//! - PDF layout extraction (positioned words, vector paths, ruled tables)
//! - Page segmentation into one region per receipt
//! - Receipt field resolution (payer, receiver, receipt number, amount)
//! - Export of cropped single-receipt PDFs with a CSV log
//! - A session that runs analysis and export in the background

pub mod error;
pub mod export;
pub mod models;
pub mod pdf;
pub mod receipt;
pub mod session;

pub use error::{CorrectionError, ExportError, PdfError, Result, SplitError};
pub use export::{ExportOutcome, ExportSummary, Exporter};
pub use models::config::SplitterConfig;
pub use models::geometry::{BBox, PageGeometry, PathShape, PositionedToken, Region, TableGrid};
pub use models::receipt::{ReceiptRecord, ReviewStatus};
pub use pdf::{LayoutProvider, PdfExtractor, RegionExporter};
pub use receipt::{distinct_payers, relabel, FormatValidator, PageSegmenter, ReceiptAnalyzer, RelabelOutcome};
pub use session::{Session, SessionEvent, DEFAULT_POLL_INTERVAL};
