//! Receipt number resolution.
//!
//! The number is a fixed-width 20-digit identifier, so every tier either
//! yields exactly 20 digits or nothing. Tiers run in order until one succeeds.

use tracing::debug;

use super::patterns::{
    find_labeled_receipt_number, find_receipt_number, NUMBER_STOP_KEYWORDS, RECEIPT_NUMBER_LABEL,
    RECEIPT_NUMBER_LEN,
};
use super::RegionView;
use crate::models::config::ExtractionConfig;
use crate::models::geometry::PositionedToken;
use crate::receipt::anchor::{row_tokens_after, value_start};

/// Which strategy produced a receipt number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberTier {
    /// Labeled table row, or labeled pattern in the region text.
    Table,
    /// Digit tokens to the right of the label.
    AnchorScan,
    /// Labeled pattern over the dense region text.
    FullText,
}

/// Resolve the receipt number of a region, reporting the tier that found it.
pub fn resolve_receipt_number(
    region: &RegionView<'_>,
    config: &ExtractionConfig,
) -> Option<(String, NumberTier)> {
    let found = from_tables(region)
        .map(|n| (n, NumberTier::Table))
        .or_else(|| {
            from_anchor_scan(&region.tokens, config.number_search_width, config.row_tolerance)
                .map(|n| (n, NumberTier::AnchorScan))
        })
        .or_else(|| {
            find_labeled_receipt_number(&region.dense_text())
                .map(|n| (n.to_string(), NumberTier::FullText))
        });

    match &found {
        Some((number, tier)) => debug!("Receipt number {} via {:?}", number, tier),
        None => debug!("No receipt number in region at y={:.1}", region.rect.y0),
    }
    found
}

/// Tier 1: a table row mentioning the label, then the labeled pattern over the region text.
fn from_tables(region: &RegionView<'_>) -> Option<String> {
    for table in region.page.tables_in(&region.rect) {
        for (index, row) in table.rows.iter().enumerate() {
            if !table.row_text(index).contains(RECEIPT_NUMBER_LABEL) {
                continue;
            }
            if let Some(number) = row.iter().flatten().find_map(|cell| find_receipt_number(cell.trim())) {
                return Some(number.to_string());
            }
        }
    }

    find_labeled_receipt_number(&region.spaced_text()).map(str::to_string)
}

/// Tier 2: concatenate all-digit tokens to the right of the label.
///
/// Only a concatenation of exactly 20 digits is accepted, which covers numbers
/// printed in spaced groups.
pub fn from_anchor_scan(tokens: &[PositionedToken], width: f64, tolerance: f64) -> Option<String> {
    let anchor = tokens
        .iter()
        .filter(|t| t.text.contains(RECEIPT_NUMBER_LABEL))
        .min_by(|a, b| a.bbox.y0.total_cmp(&b.bbox.y0).then(a.bbox.x0.total_cmp(&b.bbox.x0)))?;

    let start = value_start(tokens, anchor, tolerance);
    let mut digits = String::new();
    for token in row_tokens_after(tokens, anchor.bbox.y0, start, width, tolerance) {
        let text = token.text.trim();
        if NUMBER_STOP_KEYWORDS.iter().any(|kw| text.contains(kw)) {
            break;
        }
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            digits.push_str(text);
        }
    }

    (digits.len() == RECEIPT_NUMBER_LEN).then_some(digits)
}
