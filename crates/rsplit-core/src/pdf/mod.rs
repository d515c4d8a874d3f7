//! PDF processing module.
//!
//! The rest of the crate only sees [`LayoutProvider`] and [`RegionExporter`];
//! [`PdfExtractor`] implements both, reading layout through pdfplumber and
//! writing cropped pages through lopdf.

mod dashes;
mod extractor;
#[cfg(test)]
pub(crate) mod testing;

pub use extractor::PdfExtractor;

use std::path::Path;

use crate::error::PdfError;
use crate::models::geometry::{BBox, PageGeometry};

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Supplies positioned words, dashed paths and ruled tables for each page.
pub trait LayoutProvider {
    /// Number of pages in the loaded document.
    fn page_count(&self) -> usize;

    /// Geometry of one page (0-based index).
    fn page(&self, index: usize) -> Result<PageGeometry>;
}

/// Writes one page region as a standalone document.
pub trait RegionExporter {
    /// Crop page `page_index` to `rect` and save it to `path`.
    fn export_region(&self, page_index: usize, rect: &BBox, path: &Path) -> Result<()>;
}

impl<T: LayoutProvider + ?Sized> LayoutProvider for &T {
    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn page(&self, index: usize) -> Result<PageGeometry> {
        (**self).page(index)
    }
}

/// In-memory provider, mainly for tests and pre-extracted layouts.
impl LayoutProvider for Vec<PageGeometry> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page(&self, index: usize) -> Result<PageGeometry> {
        self.get(index).cloned().ok_or(PdfError::InvalidPage(index))
    }
}
