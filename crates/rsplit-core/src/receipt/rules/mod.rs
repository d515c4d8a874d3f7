//! Field resolvers for bank receipts.

pub mod amount;
pub mod names;
pub mod number;
pub mod patterns;

pub use amount::resolve_amount;
pub use names::{distinct_payers, relabel, resolve_customer, RelabelOutcome};
pub use number::{resolve_receipt_number, NumberTier};

use crate::models::geometry::{BBox, PageGeometry, PositionedToken};
use crate::receipt::text::{dense_text, layout_text};

/// One receipt region together with the page it was cut from.
///
/// The table pass needs the page's ruling geometry, everything else works on
/// the region's own tokens.
#[derive(Debug, Clone)]
pub struct RegionView<'a> {
    /// Page the region belongs to.
    pub page: &'a PageGeometry,
    /// Region rectangle in page coordinates.
    pub rect: BBox,
    /// Tokens whose centre lies inside the region.
    pub tokens: Vec<PositionedToken>,
}

impl<'a> RegionView<'a> {
    pub fn new(page: &'a PageGeometry, rect: BBox) -> Self {
        Self {
            page,
            rect,
            tokens: page.tokens_in(&rect),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Region text with spaces between tokens.
    pub fn spaced_text(&self) -> String {
        layout_text(&self.tokens)
    }

    /// Region text with tokens of a line run together.
    pub fn dense_text(&self) -> String {
        dense_text(&self.tokens)
    }
}
