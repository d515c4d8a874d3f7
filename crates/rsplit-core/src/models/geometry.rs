//! Page geometry: positioned tokens, vector paths and regions.
//!
//! All coordinates use a top-left origin: `y0` is the top edge and grows
//! downwards, matching the reading order used by segmentation.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    /// Create a box, normalizing swapped edges.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Centre point.
    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Check if a point lies inside the box (edges included).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Like [`contains_point`](Self::contains_point) but with the bottom edge excluded.
    ///
    /// Regions stacked on one page share their boundary rows; a point on the
    /// boundary belongs to the lower region only.
    pub fn owns_point(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y < self.y1
    }

    /// Check if the two boxes share a non-empty interior.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// Compute the union of two boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// A word with its bounding box, as produced by the layout provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedToken {
    /// Word text (never empty).
    pub text: String,
    /// Bounding box on the page.
    pub bbox: BBox,
}

impl PositionedToken {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// A painted vector path reduced to what segmentation needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathShape {
    /// Bounding box of the painted path.
    pub bbox: BBox,
    /// Stroked with a non-solid dash pattern.
    pub dashed: bool,
    /// Stroked (as opposed to only filled).
    pub stroked: bool,
}

/// A ruled table found on a page, reduced to its cell text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableGrid {
    /// Outer bounds of the table.
    pub bbox: BBox,
    /// Cell text row by row; `None` for cells with no text.
    pub rows: Vec<Vec<Option<String>>>,
}

impl TableGrid {
    /// Cells of one row joined by spaces, skipping empty cells.
    pub fn row_text(&self, row: usize) -> String {
        self.rows
            .get(row)
            .map(|cells| {
                cells
                    .iter()
                    .flatten()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }
}

/// Everything known about one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width.
    pub width: f64,
    /// Page height.
    pub height: f64,
    /// Word tokens in content-stream order.
    pub tokens: Vec<PositionedToken>,
    /// Dashed or otherwise notable painted paths in content-stream order.
    pub paths: Vec<PathShape>,
    /// Ruled tables detected on the page.
    #[serde(default)]
    pub tables: Vec<TableGrid>,
}

impl PageGeometry {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            tokens: Vec::new(),
            paths: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// The whole page as a rectangle.
    pub fn bounds(&self) -> BBox {
        BBox::new(0.0, 0.0, self.width, self.height)
    }

    /// Tokens whose centre lies inside `clip`, in page order.
    ///
    /// The bottom edge of `clip` is exclusive, so regions that share an edge
    /// never both claim a token.
    pub fn tokens_in(&self, clip: &BBox) -> Vec<PositionedToken> {
        self.tokens
            .iter()
            .filter(|t| {
                let (cx, cy) = t.bbox.center();
                clip.owns_point(cx, cy)
            })
            .cloned()
            .collect()
    }

    /// Tables whose centre lies inside `clip`.
    pub fn tables_in(&self, clip: &BBox) -> impl Iterator<Item = &TableGrid> {
        self.tables.iter().filter(move |t| {
            let (cx, cy) = t.bbox.center();
            clip.owns_point(cx, cy)
        })
    }
}

/// A rectangle on one page believed to hold exactly one receipt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Page index (0-based).
    pub page_index: usize,
    /// Rectangle on that page.
    pub rect: BBox,
}
