//! Page segmentation into one region per receipt.
//!
//! Receipt sheets are printed either with dashed cut lines between receipts
//! or without them. Cut lines are tried first; when they give at most one
//! region the receipt-number labels are used to place boundaries instead.

use tracing::debug;

use crate::models::config::SegmentationConfig;
use crate::models::geometry::{BBox, PageGeometry, Region};
use crate::receipt::rules::patterns::RECEIPT_NUMBER_LABEL;

/// How the regions of a page were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStrategy {
    /// Dashed full-width separator rules.
    Separators,
    /// Receipt-number label positions.
    Labels,
    /// The whole page as a single receipt.
    WholePage,
    /// Nothing usable on the page.
    Empty,
}

/// Splits pages into receipt regions.
#[derive(Debug, Clone, Default)]
pub struct PageSegmenter {
    config: SegmentationConfig,
}

impl PageSegmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Regions of one page, top to bottom.
    pub fn segment(&self, page_index: usize, page: &PageGeometry) -> Vec<Region> {
        self.segment_with_strategy(page_index, page).0
    }

    /// Regions of one page together with the strategy that produced them.
    pub fn segment_with_strategy(
        &self,
        page_index: usize,
        page: &PageGeometry,
    ) -> (Vec<Region>, SegmentStrategy) {
        let mut rects = self.by_separators(page);
        let mut strategy = SegmentStrategy::Separators;

        if rects.len() <= 1 {
            if let Some(by_labels) = self.by_labels(page) {
                rects = by_labels;
                strategy = SegmentStrategy::Labels;
            }
        }

        if rects.is_empty() {
            if page.height > self.config.min_region_height {
                rects.push(page.bounds());
                strategy = SegmentStrategy::WholePage;
            } else {
                strategy = SegmentStrategy::Empty;
            }
        }

        rects.sort_by(|a, b| a.y0.total_cmp(&b.y0));
        debug!(
            "Page {}: {} region(s) via {:?}",
            page_index + 1,
            rects.len(),
            strategy
        );

        let regions = rects
            .into_iter()
            .map(|rect| Region { page_index, rect })
            .collect();
        (regions, strategy)
    }

    /// Regions between dashed separator rules, each shrunk by the inset.
    fn by_separators(&self, page: &PageGeometry) -> Vec<BBox> {
        let cfg = &self.config;
        let min_width = page.width * cfg.separator_min_width_ratio;

        let mut boundaries = vec![0.0, page.height];
        boundaries.extend(
            page.paths
                .iter()
                .filter(|p| p.dashed)
                .filter(|p| p.bbox.width() > min_width && p.bbox.height() < cfg.separator_max_height)
                .map(|p| p.bbox.y0),
        );

        sorted_unique(boundaries)
            .windows(2)
            .map(|pair| BBox::new(0.0, pair[0] + cfg.separator_inset, page.width, pair[1] - cfg.separator_inset))
            .filter(|rect| rect.y1 - rect.y0 > cfg.min_region_height)
            .collect()
    }

    /// Regions starting a fixed offset above each receipt-number label.
    ///
    /// Returns `None` when fewer than two distinct label positions exist.
    fn by_labels(&self, page: &PageGeometry) -> Option<Vec<BBox>> {
        let cfg = &self.config;
        let labels = sorted_unique(
            page.tokens
                .iter()
                .filter(|t| t.text.contains(RECEIPT_NUMBER_LABEL))
                .map(|t| t.bbox.y0)
                .collect(),
        );
        if labels.len() < 2 {
            return None;
        }

        let mut boundaries = vec![0.0, page.height];
        boundaries.extend(
            labels
                .iter()
                .map(|y| (y - cfg.label_offset).clamp(0.0, page.height)),
        );

        Some(
            sorted_unique(boundaries)
                .windows(2)
                .map(|pair| BBox::new(0.0, pair[0], page.width, pair[1]))
                .filter(|rect| rect.height() > cfg.min_region_height)
                .collect(),
        )
    }
}

fn sorted_unique(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| (*a - *b).abs() < 1e-6);
    values
}
