//! Full analysis pass: validation, segmentation and per-region field extraction.

use tracing::{debug, info};

use super::anchor::extract_name_only;
use super::rules::patterns::{NAME_STOP_KEYWORDS, PAYER_ANCHORS, RECEIVER_ANCHORS};
use super::rules::{resolve_amount, resolve_customer, resolve_receipt_number, RegionView};
use super::segmenter::PageSegmenter;
use super::text::{clean_filename, collapse_whitespace, strip_whitespace};
use super::validator::FormatValidator;
use crate::error::Result;
use crate::models::config::{ExtractionConfig, SplitterConfig};
use crate::models::receipt::{
    ReceiptRecord, ReviewStatus, UNKNOWN_NUMBER, UNKNOWN_PAYER, UNKNOWN_RECEIVER,
};
use crate::pdf::LayoutProvider;

/// Turns a loaded document into an ordered list of receipt records.
#[derive(Debug, Clone, Default)]
pub struct ReceiptAnalyzer {
    validator: FormatValidator,
    segmenter: PageSegmenter,
    extraction: ExtractionConfig,
}

impl ReceiptAnalyzer {
    pub fn new(config: &SplitterConfig) -> Self {
        Self {
            validator: FormatValidator::new(config.validation.clone()),
            segmenter: PageSegmenter::new(config.segmentation.clone()),
            extraction: config.extraction.clone(),
        }
    }

    /// Analyze every page and return the records in document order.
    pub fn analyze<P: LayoutProvider + ?Sized>(
        &self,
        provider: &P,
        local_company: &str,
    ) -> Result<Vec<ReceiptRecord>> {
        self.analyze_with(provider, local_company, |_| {})
    }

    /// Like [`analyze`](Self::analyze), calling `on_record` as each record is completed.
    ///
    /// Fails before producing any record when the format check fails. Field
    /// extraction never fails: missing values become placeholders and the record
    /// is flagged for review.
    pub fn analyze_with<P, F>(
        &self,
        provider: &P,
        local_company: &str,
        mut on_record: F,
    ) -> Result<Vec<ReceiptRecord>>
    where
        P: LayoutProvider + ?Sized,
        F: FnMut(&ReceiptRecord),
    {
        self.validator.validate(provider)?;

        let local_company = local_company.trim();
        let mut records = Vec::new();
        for page_index in 0..provider.page_count() {
            let page = provider.page(page_index)?;
            for region in self.segmenter.segment(page_index, &page) {
                let view = RegionView::new(&page, region.rect);
                if view.is_empty() {
                    debug!("Skipping empty region at y={:.1} on page {}", region.rect.y0, page_index + 1);
                    continue;
                }

                let seq = records.len() as u32 + 1;
                let record = self.assemble(seq, page_index, &view, local_company);
                on_record(&record);
                records.push(record);
            }
        }

        info!("Analysis found {} receipt(s)", records.len());
        Ok(records)
    }

    /// Extract all fields of one region into a record.
    pub fn assemble(
        &self,
        seq: u32,
        page_index: usize,
        region: &RegionView<'_>,
        local_company: &str,
    ) -> ReceiptRecord {
        let cfg = &self.extraction;

        let payer_name = self.name(region, PAYER_ANCHORS, UNKNOWN_PAYER);
        let receiver_name = self.name(region, RECEIVER_ANCHORS, UNKNOWN_RECEIVER);
        let customer_name = clean_filename(resolve_customer(&payer_name, &receiver_name, local_company));

        let receipt_number = resolve_receipt_number(region, cfg)
            .map(|(number, _)| strip_whitespace(&number))
            .unwrap_or_else(|| UNKNOWN_NUMBER.to_string());
        let amount = strip_whitespace(&resolve_amount(region, cfg));

        let placeholder_customer = customer_name == UNKNOWN_PAYER || customer_name == UNKNOWN_RECEIVER;
        let mut record = ReceiptRecord {
            seq,
            page_index,
            rect: region.rect,
            payer_name,
            receiver_name,
            customer_name,
            receipt_number,
            amount,
            status: ReviewStatus::Normal,
        };
        if placeholder_customer || !record.has_receipt_number() {
            record.status = ReviewStatus::NeedsReview;
        }

        debug!(
            "Record {}: customer='{}' number={} amount={} ({})",
            seq, record.customer_name, record.receipt_number, record.amount, record.status
        );
        record
    }

    fn name(&self, region: &RegionView<'_>, anchors: &[&str], placeholder: &str) -> String {
        let cfg = &self.extraction;
        extract_name_only(
            &region.tokens,
            anchors,
            cfg.name_search_width,
            cfg.name_row_tolerance,
            NAME_STOP_KEYWORDS,
        )
        .map(|name| collapse_whitespace(&name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| placeholder.to_string())
    }
}
