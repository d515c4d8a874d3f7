//! Dashed path collection on top of the pdfplumber content interpreter.
//!
//! pdfplumber's page model folds painted paths into lines and rects and
//! forgets the dash pattern on the way. Cut lines between receipts are only
//! recognisable by that pattern, so this handler listens to raw path events
//! and keeps the bounds of every non-solid stroke.

use pdfplumber_core::{ExtractOptions, PathSegment};
use pdfplumber_parse::{ContentHandler, LopdfBackend, LopdfDocument, PaintOp, PathEvent, PdfBackend};

use super::Result;
use crate::error::PdfError;
use crate::models::geometry::{BBox, PathShape};

/// Collects dashed paths of one page in top-left page coordinates.
pub(crate) struct DashedPathCollector {
    page_height: f64,
    shapes: Vec<PathShape>,
}

impl DashedPathCollector {
    pub(crate) fn new(page_height: f64) -> Self {
        Self {
            page_height,
            shapes: Vec::new(),
        }
    }

    pub(crate) fn into_shapes(self) -> Vec<PathShape> {
        self.shapes
    }
}

impl ContentHandler for DashedPathCollector {
    fn on_path_painted(&mut self, event: PathEvent) {
        // The interpreter only attaches a pattern to non-solid strokes.
        if event.dash_pattern.is_none() {
            return;
        }
        if let Some(bbox) = segment_bounds(&event.segments, self.page_height) {
            self.shapes.push(PathShape {
                bbox,
                dashed: true,
                stroked: matches!(event.paint_op, PaintOp::Stroke | PaintOp::FillAndStroke),
            });
        }
    }
}

/// Run the interpreter over page `index` and return its dashed paths.
pub(crate) fn dashed_paths(doc: &LopdfDocument, index: usize) -> Result<Vec<PathShape>> {
    let page = LopdfBackend::get_page(doc, index).map_err(|e| PdfError::Content(e.to_string()))?;
    let media = LopdfBackend::page_media_box(doc, &page).map_err(|e| PdfError::Content(e.to_string()))?;

    let mut collector = DashedPathCollector::new(media.height());
    LopdfBackend::interpret_page(doc, &page, &mut collector, &ExtractOptions::default())
        .map_err(|e| PdfError::Content(e.to_string()))?;
    Ok(collector.into_shapes())
}

/// Bounds of all segment end and control points, flipped to a top-left origin.
fn segment_bounds(segments: &[PathSegment], page_height: f64) -> Option<BBox> {
    let mut points = segments.iter().flat_map(|segment| match segment {
        PathSegment::MoveTo(p) | PathSegment::LineTo(p) => vec![(p.x, p.y)],
        PathSegment::CurveTo { cp1, cp2, end } => vec![(cp1.x, cp1.y), (cp2.x, cp2.y), (end.x, end.y)],
        PathSegment::ClosePath => Vec::new(),
    });

    let (x, y) = points.next()?;
    let mut bounds = BBox::new(x, page_height - y, x, page_height - y);
    for (x, y) in points {
        bounds = bounds.union(&BBox::new(x, page_height - y, x, page_height - y));
    }
    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfplumber_core::{DashPattern, Point};

    fn stroke(segments: Vec<PathSegment>, dashed: bool) -> PathEvent {
        PathEvent {
            segments,
            paint_op: PaintOp::Stroke,
            line_width: 1.0,
            stroking_color: None,
            non_stroking_color: None,
            ctm: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            dash_pattern: dashed.then(|| DashPattern::new(vec![3.0, 2.0], 0.0)),
            fill_rule: None,
        }
    }

    #[test]
    fn test_collector_keeps_only_dashed_strokes() {
        let rule = vec![
            PathSegment::MoveTo(Point::new(10.0, 400.0)),
            PathSegment::LineTo(Point::new(590.0, 400.0)),
        ];
        let mut collector = DashedPathCollector::new(800.0);
        collector.on_path_painted(stroke(rule.clone(), false));
        collector.on_path_painted(stroke(rule, true));

        let shapes = collector.into_shapes();
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].dashed && shapes[0].stroked);
        assert_eq!(shapes[0].bbox, BBox::new(10.0, 400.0, 590.0, 400.0));
    }

    #[test]
    fn test_segment_bounds_flips_and_covers_curves() {
        let segments = vec![
            PathSegment::MoveTo(Point::new(0.0, 700.0)),
            PathSegment::CurveTo {
                cp1: Point::new(50.0, 750.0),
                cp2: Point::new(100.0, 750.0),
                end: Point::new(150.0, 700.0),
            },
            PathSegment::ClosePath,
        ];
        assert_eq!(
            segment_bounds(&segments, 800.0),
            Some(BBox::new(0.0, 50.0, 150.0, 100.0))
        );
        assert_eq!(segment_bounds(&[PathSegment::ClosePath], 800.0), None);
    }
}
