//! Spatial "value next to a label" search over a region's tokens.
//!
//! Two primitives share the same anchor scheme (a list of label phrases tried
//! in priority order, first token containing the phrase wins):
//! [`find_text_from_anchor`] returns everything in a box to the right of the
//! label, while [`extract_name_only`] walks the label's row and stops at the
//! next field label.

use tracing::trace;

use crate::models::geometry::{BBox, PositionedToken};
use crate::receipt::rules::patterns::{ACCOUNT_NAME_PREFIX, LEADING_PUNCT, TRAILING_PUNCT};

/// Characters that count as a word boundary around a stop keyword.
const BOUNDARY_CHARS: &[char] = &[
    ' ', '，', ',', '。', '.', '：', ':', '、', '（', '(', '）', ')',
];

/// Tokens dropped while accumulating a name.
const SEPARATOR_TOKENS: &[&str] = &["：", ":", " ", "，", ",", "。", "."];

/// First token (in provider order) whose text contains `phrase`.
pub fn first_containing<'a>(tokens: &'a [PositionedToken], phrase: &str) -> Option<&'a PositionedToken> {
    tokens.iter().find(|t| t.text.contains(phrase))
}

/// Whether `token` is on the same row as a token with top `row_top`.
fn same_row(token: &PositionedToken, row_top: f64, tolerance: f64) -> bool {
    (token.bbox.y0 - row_top).abs() < tolerance
}

/// Right edge of the nearest colon on the anchor's row, or the anchor's own right edge.
///
/// A colon counts when its left edge is at or after the anchor's left edge, so a
/// label token that already ends in a colon is its own separator.
pub fn value_start(tokens: &[PositionedToken], anchor: &PositionedToken, tolerance: f64) -> f64 {
    tokens
        .iter()
        .filter(|t| same_row(t, anchor.bbox.y0, tolerance))
        .filter(|t| t.text.contains('：') || t.text.contains(':'))
        .filter(|t| t.bbox.x0 >= anchor.bbox.x0)
        .min_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0))
        .map(|colon| colon.bbox.x1)
        .unwrap_or(anchor.bbox.x1)
}

/// Tokens on the anchor's row whose left edge lies in `[start, start + width)`, left to right.
pub fn row_tokens_after<'a>(
    tokens: &'a [PositionedToken],
    row_top: f64,
    start: f64,
    width: f64,
    tolerance: f64,
) -> Vec<&'a PositionedToken> {
    let mut row: Vec<&PositionedToken> = tokens
        .iter()
        .filter(|t| same_row(t, row_top, tolerance))
        .filter(|t| t.bbox.x0 >= start && t.bbox.x0 < start + width)
        .collect();
    row.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
    row
}

/// Text of all tokens in a box starting at the anchor's right edge.
///
/// The box extends `width` to the right and `tolerance` above and below the
/// anchor's row. An anchor whose box is empty falls through to the next one.
pub fn find_text_from_anchor(
    tokens: &[PositionedToken],
    anchors: &[&str],
    width: f64,
    tolerance: f64,
) -> Option<String> {
    for phrase in anchors {
        let Some(anchor) = first_containing(tokens, phrase) else {
            continue;
        };

        let search = BBox::new(
            anchor.bbox.x1,
            anchor.bbox.y0 - tolerance,
            anchor.bbox.x1 + width,
            anchor.bbox.y1 + tolerance,
        );
        let mut found: Vec<&PositionedToken> = tokens
            .iter()
            .filter(|t| !std::ptr::eq(*t, anchor) && t.bbox.intersects(&search))
            .collect();
        if found.is_empty() {
            trace!("Anchor '{}' has nothing to its right", phrase);
            continue;
        }

        found.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
        return Some(
            found
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        );
    }
    None
}

/// Byte position of the first occurrence of `keyword` in `text` when that
/// occurrence is delimited by a boundary character (or the string edge) on
/// at least one side.
pub fn complete_word_position(text: &str, keyword: &str) -> Option<usize> {
    let pos = text.find(keyword)?;
    let before = text[..pos].chars().next_back().unwrap_or(' ');
    let after = text[pos + keyword.len()..].chars().next().unwrap_or(' ');
    (BOUNDARY_CHARS.contains(&before) || BOUNDARY_CHARS.contains(&after)).then_some(pos)
}

/// Whether any stop keyword appears in `text` as a complete word.
fn hits_stop_keyword(text: &str, stop_keywords: &[&str]) -> bool {
    stop_keywords
        .iter()
        .any(|kw| complete_word_position(text, kw).is_some())
}

/// Cut `text` before the first stop keyword (in keyword order) found as a complete word.
fn truncate_at_stop_keyword(text: &str, stop_keywords: &[&str]) -> String {
    for kw in stop_keywords {
        if let Some(pos) = complete_word_position(text, kw) {
            return text[..pos].trim().to_string();
        }
    }
    text.to_string()
}

/// Extract a name value that sits after a label and ends at the next field label.
///
/// Walks the anchor's row left to right from the value start (after a colon if
/// the row has one), collecting tokens until one contains a stop keyword as a
/// complete word. The joined text is stripped of leading punctuation and a
/// `户名` prefix, truncated again at any stop keyword that only shows up after
/// joining, and stripped of trailing punctuation.
pub fn extract_name_only(
    tokens: &[PositionedToken],
    anchors: &[&str],
    width: f64,
    tolerance: f64,
    stop_keywords: &[&str],
) -> Option<String> {
    for phrase in anchors {
        let Some(anchor) = first_containing(tokens, phrase) else {
            continue;
        };

        let start = value_start(tokens, anchor, tolerance);
        let mut parts: Vec<&str> = Vec::new();
        for token in row_tokens_after(tokens, anchor.bbox.y0, start, width, tolerance) {
            let text = token.text.trim();
            if hits_stop_keyword(text, stop_keywords) {
                break;
            }
            if !text.is_empty() && !SEPARATOR_TOKENS.contains(&text) {
                parts.push(&token.text);
            }
        }
        if parts.is_empty() {
            continue;
        }

        let joined = parts.join(" ");
        let name = LEADING_PUNCT.replace(&joined, "");
        let name = ACCOUNT_NAME_PREFIX.replace(&name, "");
        let name = truncate_at_stop_keyword(&name, stop_keywords);
        let name = TRAILING_PUNCT.replace(&name, "");
        let name = name.trim();
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::rules::patterns::NAME_STOP_KEYWORDS;
    use pretty_assertions::assert_eq;

    fn tok(text: &str, x0: f64, x1: f64, y: f64) -> PositionedToken {
        PositionedToken::new(text, BBox::new(x0, y, x1, y + 10.0))
    }

    #[test]
    fn test_find_text_from_anchor_joins_left_to_right() {
        let tokens = vec![
            tok("元", 170.0, 180.0, 100.0),
            tok("金额（小写）", 50.0, 110.0, 100.0),
            tok("1,234.56", 115.0, 160.0, 101.0),
            tok("其他", 115.0, 140.0, 150.0),
        ];
        assert_eq!(
            find_text_from_anchor(&tokens, &["金额（小写）"], 150.0, 3.0),
            Some("1,234.56 元".to_string())
        );
        assert_eq!(find_text_from_anchor(&tokens, &["不存在"], 150.0, 3.0), None);
    }

    #[test]
    fn test_find_text_from_anchor_falls_through_empty_box() {
        let tokens = vec![
            tok("甲", 0.0, 10.0, 0.0),
            tok("乙", 0.0, 10.0, 50.0),
            tok("值", 20.0, 30.0, 50.0),
        ];
        assert_eq!(
            find_text_from_anchor(&tokens, &["甲", "乙"], 100.0, 3.0),
            Some("值".to_string())
        );
    }

    #[test]
    fn test_complete_word_position() {
        assert_eq!(complete_word_position("账号", "账号"), Some(0));
        assert_eq!(complete_word_position("公司账号", "账号"), Some(6));
        assert_eq!(complete_word_position("(账号)", "账号"), Some(1));
        assert_eq!(complete_word_position("某账号某", "账号"), None);
        assert_eq!(complete_word_position("无关", "账号"), None);
    }

    #[test]
    fn test_extract_name_stops_before_account() {
        let tokens = vec![
            tok("付款方户名", 10.0, 70.0, 100.0),
            tok(":", 72.0, 75.0, 100.0),
            tok("ACME公司", 80.0, 130.0, 100.0),
            tok("账号", 140.0, 160.0, 100.0),
            tok("123456", 165.0, 200.0, 100.0),
        ];
        assert_eq!(
            extract_name_only(&tokens, &["付款方户名", "付款方", "户名"], 200.0, 5.0, NAME_STOP_KEYWORDS),
            Some("ACME公司".to_string())
        );
    }

    #[test]
    fn test_extract_name_without_colon_and_prefix() {
        let tokens = vec![
            tok("收款方", 10.0, 40.0, 100.0),
            tok("户名", 42.0, 60.0, 101.0),
            tok("某某", 62.0, 80.0, 100.0),
            tok("有限公司，", 82.0, 120.0, 100.0),
        ];
        assert_eq!(
            extract_name_only(&tokens, &["收款方户名", "收款方"], 200.0, 5.0, NAME_STOP_KEYWORDS),
            Some("某某 有限公司".to_string())
        );
    }

    #[test]
    fn test_extract_name_keyword_boundaries() {
        let tokens = vec![
            tok("付款方户名：", 10.0, 80.0, 100.0),
            tok("甲公司 开户行", 85.0, 150.0, 100.0),
        ];
        // The keyword follows a space inside the token, so the walk stops before it.
        assert_eq!(
            extract_name_only(&tokens, &["付款方户名"], 200.0, 5.0, NAME_STOP_KEYWORDS),
            None
        );

        // Only visible as a complete word once the prefix is gone.
        let tokens = vec![
            tok("付款方户名：", 10.0, 80.0, 100.0),
            tok("户名摘要x", 85.0, 150.0, 100.0),
        ];
        assert_eq!(
            extract_name_only(&tokens, &["付款方户名"], 200.0, 5.0, NAME_STOP_KEYWORDS),
            None
        );

        let tokens = vec![
            tok("付款方户名：", 10.0, 80.0, 100.0),
            tok("甲公司", 85.0, 110.0, 100.0),
            tok("某账号某", 112.0, 150.0, 100.0),
        ];
        assert_eq!(
            extract_name_only(&tokens, &["付款方户名"], 200.0, 5.0, NAME_STOP_KEYWORDS),
            Some("甲公司 某账号某".to_string())
        );
    }

    #[test]
    fn test_extract_name_none_without_values() {
        let tokens = vec![tok("付款方户名", 10.0, 70.0, 100.0), tok("：", 72.0, 75.0, 100.0)];
        assert_eq!(
            extract_name_only(&tokens, &["付款方户名"], 200.0, 5.0, NAME_STOP_KEYWORDS),
            None
        );
    }
}
