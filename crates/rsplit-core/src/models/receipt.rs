//! Receipt record model.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::geometry::BBox;
use crate::error::CorrectionError;
use crate::receipt::text::clean_filename;

/// Placeholder for a payer name that could not be extracted.
pub const UNKNOWN_PAYER: &str = "未知付款方";

/// Placeholder for a receiver name that could not be extracted.
pub const UNKNOWN_RECEIVER: &str = "未知收款方";

/// Placeholder for a receipt number that could not be extracted.
pub const UNKNOWN_NUMBER: &str = "未知编号";

/// Amount used when no money value is found.
pub const DEFAULT_AMOUNT: &str = "0.00";

lazy_static! {
    static ref CORRECTED_AMOUNT: Regex = Regex::new(r"^\d+(\.\d{1,2})?$").unwrap();
}

/// Review state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// All required fields were extracted.
    Normal,
    /// A required field fell back to a placeholder.
    NeedsReview,
    /// Customer name re-derived by a relabeling pass.
    Updated,
    /// Fields overwritten by a manual correction.
    Corrected,
}

impl ReviewStatus {
    /// Label shown to users and written to logs.
    pub fn label(&self) -> &'static str {
        match self {
            ReviewStatus::Normal => "正常",
            ReviewStatus::NeedsReview => "需核对",
            ReviewStatus::Updated => "已更新",
            ReviewStatus::Corrected => "已修正",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One receipt cut out of the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    /// 1-based sequence number, contiguous across the document.
    pub seq: u32,

    /// Page index (0-based).
    pub page_index: usize,

    /// Region on the page holding this receipt.
    pub rect: BBox,

    /// Payer account name.
    pub payer_name: String,

    /// Receiver account name.
    pub receiver_name: String,

    /// Counterparty used to name the output file.
    pub customer_name: String,

    /// 20-digit receipt number or [`UNKNOWN_NUMBER`].
    pub receipt_number: String,

    /// Amount with two fraction digits.
    pub amount: String,

    /// Review state.
    pub status: ReviewStatus,
}

impl ReceiptRecord {
    /// Whether the receipt number is a real 20-digit identifier.
    pub fn has_receipt_number(&self) -> bool {
        self.receipt_number.len() == 20 && self.receipt_number.bytes().all(|b| b.is_ascii_digit())
    }

    /// Overwrite name, number and amount with user-supplied values.
    ///
    /// Sequence number, page and region are never touched.
    pub fn apply_correction(
        &mut self,
        name: &str,
        number: &str,
        amount: &str,
    ) -> Result<(), CorrectionError> {
        let amount = normalize_amount(amount)?;

        self.customer_name = clean_filename(name);
        self.receipt_number = number.chars().filter(|c| !c.is_whitespace()).collect();
        self.amount = amount;
        self.status = ReviewStatus::Corrected;
        Ok(())
    }
}

/// Validate a user-entered amount and render it with two fraction digits.
pub fn normalize_amount(raw: &str) -> Result<String, CorrectionError> {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();

    if !CORRECTED_AMOUNT.is_match(cleaned) {
        return Err(CorrectionError::InvalidAmount(raw.to_string()));
    }

    let mut value =
        Decimal::from_str(cleaned).map_err(|_| CorrectionError::InvalidAmount(raw.to_string()))?;
    value.rescale(2);
    Ok(value.to_string())
}
