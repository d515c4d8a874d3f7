//! Customer name selection and the relabeling pass.

use std::collections::BTreeSet;

use tracing::info;

use crate::models::receipt::{ReceiptRecord, ReviewStatus, UNKNOWN_PAYER};
use crate::receipt::text::clean_filename;

/// Pick the counterparty: the receiver when the local company is the payer, else the payer.
pub fn resolve_customer<'a>(payer: &'a str, receiver: &'a str, local_company: &str) -> &'a str {
    if !local_company.is_empty() && payer.contains(local_company) {
        receiver
    } else {
        payer
    }
}

/// Result of a relabeling pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelabelOutcome {
    /// Company the pass was run for.
    pub company: String,
    /// Records whose customer name was re-derived.
    pub updated: usize,
}

/// Re-derive customer names for records paid by `company`.
///
/// Only already-extracted payer and receiver names are used. Every record whose
/// payer equals `company` gets the receiver as customer and status
/// [`ReviewStatus::Updated`]. Running it again with the same company changes
/// nothing further. An empty company updates nothing.
pub fn relabel(records: &mut [ReceiptRecord], company: &str) -> RelabelOutcome {
    let company = company.trim();
    let mut updated = 0;

    if !company.is_empty() {
        for record in records
            .iter_mut()
            .filter(|r| r.payer_name == company && !r.receiver_name.is_empty())
        {
            record.customer_name = clean_filename(&record.receiver_name);
            record.status = ReviewStatus::Updated;
            updated += 1;
        }
    }

    info!("Relabeled {} record(s) for '{}'", updated, company);
    RelabelOutcome {
        company: company.to_string(),
        updated,
    }
}

/// Sorted distinct payer names, excluding the unknown-payer placeholder.
pub fn distinct_payers(records: &[ReceiptRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.payer_name.as_str())
        .filter(|name| !name.is_empty() && *name != UNKNOWN_PAYER)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
