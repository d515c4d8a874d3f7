//! Error types for the rsplit-core library.

use thiserror::Error;

/// Main error type for the rsplit library.
#[derive(Error, Debug)]
pub enum SplitError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// The document does not look like a supported receipt sheet.
    #[error("no receipt fingerprint found in the first {pages_checked} page(s)")]
    FormatMismatch { pages_checked: usize },

    /// Export pass error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// A user-supplied correction was rejected.
    #[error("correction rejected: {0}")]
    Correction(#[from] CorrectionError),

    /// Unexpected failure inside a background pass.
    #[error("analysis failed: {0}")]
    Analysis(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to decode a page content stream.
    #[error("failed to read page content: {0}")]
    Content(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page index requested (0-based).
    #[error("invalid page index: {0}")]
    InvalidPage(usize),

    /// Failed to write a cropped page.
    #[error("failed to save cropped page: {0}")]
    Save(String),
}

/// Errors raised by the export pass as a whole (not per record).
#[derive(Error, Debug)]
pub enum ExportError {
    /// Another export is still running for this session.
    #[error("an export is already in progress")]
    AlreadyRunning,

    /// Records are still being produced by an analysis pass.
    #[error("analysis is still running")]
    AnalysisInProgress,

    /// There is nothing to export.
    #[error("no document loaded")]
    NoDocument,

    /// The output directory could not be prepared.
    #[error("output directory unavailable: {0}")]
    OutputDir(String),

    /// Writing the CSV log failed.
    #[error("failed to write log: {0}")]
    Log(#[from] csv::Error),
}

/// Errors from the manual correction step.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CorrectionError {
    /// Amount is not a plain decimal with at most two fraction digits.
    #[error("invalid amount '{0}', expected a number such as 123.45")]
    InvalidAmount(String),

    /// No record carries the given sequence number.
    #[error("no record with sequence number {0}")]
    UnknownSequence(u32),
}

/// Result type for the rsplit library.
pub type Result<T> = std::result::Result<T, SplitError>;
