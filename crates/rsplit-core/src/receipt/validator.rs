//! Document format check run before any extraction.

use tracing::{debug, warn};

use crate::error::{Result, SplitError};
use crate::models::config::ValidationConfig;
use crate::pdf::LayoutProvider;
use crate::receipt::text::dense_text;

/// Phrases printed on every receipt of the supported bank.
pub const FINGERPRINTS: &[&str] = &["中国农业银行", "电子回单", "回单编号"];

/// Confirms a document belongs to the supported receipt family.
#[derive(Debug, Clone, Default)]
pub struct FormatValidator {
    config: ValidationConfig,
}

impl FormatValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Number of distinct fingerprint phrases in `text`.
    pub fn fingerprint_count(text: &str) -> usize {
        FINGERPRINTS.iter().filter(|f| text.contains(*f)).count()
    }

    /// Check the first pages for fingerprints, stopping at the first page that has enough.
    ///
    /// Returns the index of that page, or [`SplitError::FormatMismatch`] with the
    /// number of pages examined.
    pub fn validate<P: LayoutProvider + ?Sized>(&self, provider: &P) -> Result<usize> {
        let pages_checked = provider.page_count().min(self.config.page_check_limit);

        for index in 0..pages_checked {
            let page = provider.page(index)?;
            let found = Self::fingerprint_count(&dense_text(&page.tokens));
            debug!("Page {}: {} fingerprint phrase(s)", index + 1, found);
            if found >= self.config.min_fingerprint_matches {
                return Ok(index);
            }
        }

        warn!("No receipt fingerprint in the first {} page(s)", pages_checked);
        Err(SplitError::FormatMismatch { pages_checked })
    }
}
