//! Page layout extraction with pdfplumber and region export with lopdf.

use std::path::Path;

use lopdf::{Document, Object, ObjectId};
use pdfplumber::Pdf;
use pdfplumber_core::{PdfError as LayoutError, Table, TableSettings, WordOptions};
use pdfplumber_parse::{LopdfBackend, LopdfDocument, PdfBackend};
use tracing::{debug, info};

use super::dashes::dashed_paths;
use super::{LayoutProvider, RegionExporter, Result};
use crate::error::PdfError;
use crate::models::geometry::{BBox, PageGeometry, PositionedToken, TableGrid};

/// A4 portrait, used when a page carries no usable `/MediaBox`.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 595.0, 842.0];

/// One document opened three ways.
struct Loaded {
    /// Words and tables.
    layout: Pdf,
    /// Raw path events for dash detection.
    paths: LopdfDocument,
    /// Cropping and saving.
    document: Document,
    page_ids: Vec<ObjectId>,
}

/// pdfplumber-backed layout provider and lopdf-backed region exporter.
pub struct PdfExtractor {
    loaded: Option<Loaded>,
}

impl PdfExtractor {
    /// Create an extractor with no document loaded.
    pub fn new() -> Self {
        Self { loaded: None }
    }

    /// Read and load a PDF from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref()).map_err(|e| PdfError::Parse(e.to_string()))?;
        let mut extractor = Self::new();
        extractor.load(&data)?;
        Ok(extractor)
    }

    /// Load a PDF from memory, replacing any previously loaded document.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Receipts exported by banking portals are often "encrypted" with an empty password
        if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(PdfError::NoPages);
        }

        let layout = Pdf::open_with_password(data, b"", None).map_err(layout_error)?;
        let paths = LopdfBackend::open_with_password(data, b"")
            .map_err(|e| layout_error(e.into()))?;

        info!("Loaded PDF with {} pages", page_ids.len());
        self.loaded = Some(Loaded {
            layout,
            paths,
            document,
            page_ids,
        });
        Ok(())
    }

    /// Whether a document is currently loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Visible box of a page: `/CropBox` when present, otherwise `/MediaBox`.
    pub fn crop_box(&self, index: usize) -> Result<[f64; 4]> {
        let loaded = self.loaded()?;
        let page_id = loaded.page_id(index)?;
        Ok(inherited_rect(&loaded.document, page_id, b"CropBox")
            .unwrap_or_else(|| media_box(&loaded.document, page_id)))
    }

    fn loaded(&self) -> Result<&Loaded> {
        self.loaded
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Loaded {
    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids.get(index).copied().ok_or(PdfError::InvalidPage(index))
    }
}

impl LayoutProvider for PdfExtractor {
    fn page_count(&self) -> usize {
        self.loaded.as_ref().map_or(0, |l| l.page_ids.len())
    }

    fn page(&self, index: usize) -> Result<PageGeometry> {
        let loaded = self.loaded()?;
        loaded.page_id(index)?;

        let page = loaded.layout.page(index).map_err(layout_error)?;
        let mut geometry = PageGeometry::new(page.width(), page.height());

        geometry.tokens = page
            .extract_words(&WordOptions::default())
            .into_iter()
            .filter(|word| !word.text.trim().is_empty())
            .map(|word| PositionedToken::new(word.text, to_bbox(&word.bbox)))
            .collect();
        geometry.tables = page
            .find_tables(&TableSettings::default())
            .iter()
            .map(to_grid)
            .collect();
        geometry.paths = dashed_paths(&loaded.paths, index)?;

        debug!(
            "Page {}: {} words, {} tables, {} dashed paths",
            index + 1,
            geometry.tokens.len(),
            geometry.tables.len(),
            geometry.paths.len()
        );
        Ok(geometry)
    }
}

impl RegionExporter for PdfExtractor {
    fn export_region(&self, page_index: usize, rect: &BBox, path: &Path) -> Result<()> {
        let loaded = self.loaded()?;
        let page_id = loaded.page_id(page_index)?;
        let media = media_box(&loaded.document, page_id);
        let height = (media[3] - media[1]).abs();

        let mut doc = loaded.document.clone();

        // Region rectangles are top-left based; PDF boxes are bottom-left based.
        let crop = Object::Array(vec![
            Object::Real(rect.x0 as f32),
            Object::Real((height - rect.y1) as f32),
            Object::Real(rect.x1 as f32),
            Object::Real((height - rect.y0) as f32),
        ]);
        let page = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| PdfError::Save(e.to_string()))?;
        page.set("CropBox", crop);

        let others: Vec<u32> = (1..=loaded.page_ids.len() as u32)
            .filter(|number| *number as usize != page_index + 1)
            .collect();
        if !others.is_empty() {
            doc.delete_pages(&others);
        }
        doc.prune_objects();

        doc.save(path).map_err(|e| PdfError::Save(e.to_string()))?;
        debug!(
            "Exported page {} region ({:.1}, {:.1})-({:.1}, {:.1}) to {}",
            page_index + 1,
            rect.x0,
            rect.y0,
            rect.x1,
            rect.y1,
            path.display()
        );
        Ok(())
    }
}

fn layout_error(e: LayoutError) -> PdfError {
    match e {
        LayoutError::PasswordRequired | LayoutError::InvalidPassword => PdfError::Encrypted,
        LayoutError::InterpreterError(msg) | LayoutError::FontError(msg) => PdfError::Content(msg),
        other => PdfError::Parse(other.to_string()),
    }
}

fn to_bbox(b: &pdfplumber_core::BBox) -> BBox {
    BBox::new(b.x0, b.top, b.x1, b.bottom)
}

fn to_grid(table: &Table) -> TableGrid {
    TableGrid {
        bbox: to_bbox(&table.bbox),
        rows: table
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.text.clone()).collect())
            .collect(),
    }
}

fn media_box(doc: &Document, page_id: ObjectId) -> [f64; 4] {
    inherited_rect(doc, page_id, b"MediaBox").unwrap_or(DEFAULT_MEDIA_BOX)
}

/// Read a rectangle attribute from a page, walking `/Parent` links for inherited ones.
fn inherited_rect(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<[f64; 4]> {
    let mut current = page_id;
    // Page trees are shallow; the bound only guards against cycles.
    for _ in 0..32 {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(value) = dict.get(key) {
            let value = doc.dereference(value).map(|(_, o)| o).unwrap_or(value);
            let numbers: Vec<f64> = value
                .as_array()
                .ok()?
                .iter()
                .filter_map(|n| n.as_float().ok().map(f64::from))
                .collect();
            return (numbers.len() == 4).then(|| [numbers[0], numbers[1], numbers[2], numbers[3]]);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}
