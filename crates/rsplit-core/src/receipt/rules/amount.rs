//! Amount resolution.

use tracing::debug;

use super::patterns::{find_money, AMOUNT_LABEL};
use super::RegionView;
use crate::models::config::ExtractionConfig;
use crate::models::receipt::DEFAULT_AMOUNT;
use crate::receipt::anchor::find_text_from_anchor;
use crate::receipt::text::collapse_whitespace;

/// Resolve the amount of a region as a `digits.dd` string.
///
/// Reads the value to the right of the amount-in-figures label first. When
/// that gives nothing (or a zero amount), the first money value anywhere in
/// the region is used. Falls back to [`DEFAULT_AMOUNT`].
pub fn resolve_amount(region: &RegionView<'_>, config: &ExtractionConfig) -> String {
    let labeled = find_text_from_anchor(
        &region.tokens,
        &[AMOUNT_LABEL],
        config.amount_search_width,
        config.row_tolerance,
    )
    .and_then(|text| find_money(&collapse_whitespace(&text)));

    if let Some(amount) = labeled.filter(|a| a != DEFAULT_AMOUNT) {
        return amount;
    }

    match find_money(&collapse_whitespace(&region.spaced_text())) {
        Some(amount) => {
            debug!("Amount {} taken from region text", amount);
            amount
        }
        None => DEFAULT_AMOUNT.to_string(),
    }
}
