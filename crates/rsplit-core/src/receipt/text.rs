//! Text normalization and line layout over positioned tokens.

use std::cmp::Ordering;

use crate::models::geometry::PositionedToken;
use crate::receipt::rules::patterns::{ILLEGAL_FILENAME_CHARS, WHITESPACE_RUN};

/// Tokens whose tops differ by at most this much share a text line.
pub const LINE_TOLERANCE: f64 = 3.0;

/// Collapse runs of whitespace (newlines and tabs included) to one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

/// Make a string usable as a file name component.
///
/// Strips `\ / * ? : " < > |`, collapses whitespace and trims. Applying it
/// twice gives the same result as applying it once.
pub fn clean_filename(text: &str) -> String {
    let stripped = ILLEGAL_FILENAME_CHARS.replace_all(text, "");
    collapse_whitespace(&stripped)
}

/// Remove every whitespace character.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn reading_order(a: &PositionedToken, b: &PositionedToken) -> Ordering {
    a.bbox
        .y0
        .total_cmp(&b.bbox.y0)
        .then(a.bbox.x0.total_cmp(&b.bbox.x0))
}

/// Group tokens into lines, top to bottom, each line sorted left to right.
pub fn group_lines(tokens: &[PositionedToken], tolerance: f64) -> Vec<Vec<&PositionedToken>> {
    let mut sorted: Vec<&PositionedToken> = tokens.iter().collect();
    sorted.sort_by(|a, b| reading_order(a, b));

    let mut lines: Vec<Vec<&PositionedToken>> = Vec::new();
    for token in sorted {
        match lines.last_mut() {
            Some(line) if (token.bbox.y0 - line[0].bbox.y0).abs() <= tolerance => line.push(token),
            _ => lines.push(vec![token]),
        }
    }
    for line in &mut lines {
        line.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
    }
    lines
}

/// Plain text with tokens separated by spaces and lines by newlines.
pub fn layout_text(tokens: &[PositionedToken]) -> String {
    render(tokens, " ")
}

/// Plain text with the tokens of each line concatenated directly.
///
/// Digit groups printed with spacing come back as one run here.
pub fn dense_text(tokens: &[PositionedToken]) -> String {
    render(tokens, "")
}

fn render(tokens: &[PositionedToken], separator: &str) -> String {
    group_lines(tokens, LINE_TOLERANCE)
        .iter()
        .map(|line| {
            line.iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(separator)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
