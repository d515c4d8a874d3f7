//! End-to-end analysis over pre-extracted page layouts.

use std::cell::RefCell;

use pretty_assertions::assert_eq;
use rsplit_core::pdf::Result as PdfResult;
use rsplit_core::{
    relabel, BBox, LayoutProvider, PageGeometry, PageSegmenter, PathShape, PositionedToken,
    ReceiptAnalyzer, ReviewStatus, SplitError,
};

fn tok(text: &str, x0: f64, x1: f64, y: f64) -> PositionedToken {
    PositionedToken::new(text, BBox::new(x0, y, x1, y + 10.0))
}

fn cut_line(y: f64) -> PathShape {
    PathShape {
        bbox: BBox::new(10.0, y, 590.0, y + 0.5),
        dashed: true,
        stroked: true,
    }
}

fn receipt(top: f64, payer: &str, receiver: &str, number: &[&str], amount: Option<&str>) -> Vec<PositionedToken> {
    let mut tokens = vec![
        tok("中国农业银行", 200.0, 280.0, top),
        tok("电子回单", 290.0, 340.0, top),
        tok("回单编号", 10.0, 60.0, top + 20.0),
        tok("付款方户名", 10.0, 70.0, top + 40.0),
        tok(payer, 80.0, 150.0, top + 40.0),
        tok("收款方户名", 300.0, 360.0, top + 40.0),
        tok(receiver, 370.0, 440.0, top + 40.0),
    ];
    let mut x = 70.0;
    for part in number {
        tokens.push(tok(part, x, x + 25.0, top + 20.0));
        x += 30.0;
    }
    if let Some(amount) = amount {
        tokens.push(tok("金额（小写）", 10.0, 80.0, top + 60.0));
        tokens.push(tok(amount, 85.0, 140.0, top + 60.0));
    }
    tokens
}

/// Three receipts on one page separated by two cut lines.
fn sheet() -> PageGeometry {
    let mut page = PageGeometry::new(600.0, 900.0);
    page.paths = vec![cut_line(300.0), cut_line(600.0)];
    page.tokens = receipt(40.0, "ACME公司", "某客户", &["1234", "5678", "9012", "3456", "7890"], Some("1,234.56"));
    page.tokens.extend(receipt(340.0, "乙公司", "ACME公司", &["1111", "2222", "3333", "4444", "5555"], Some("20.00")));
    page.tokens.extend(receipt(640.0, "丙公司", "丁公司", &["1234", "5678"], None));
    page.tokens.push(tok("备注 合计 5.50 元", 10.0, 200.0, 760.0));
    page
}

/// Records how many pages were requested.
struct CountingProvider {
    pages: Vec<PageGeometry>,
    requested: RefCell<Vec<usize>>,
}

impl LayoutProvider for CountingProvider {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> PdfResult<PageGeometry> {
        self.requested.borrow_mut().push(index);
        self.pages.page(index)
    }
}

#[test]
fn test_sheet_with_three_receipts() {
    let records = ReceiptAnalyzer::default().analyze(&vec![sheet()], "").unwrap();
    assert_eq!(records.len(), 3);

    let seqs: Vec<u32> = records.iter().map(|r| r.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3]);

    assert_eq!(records[0].customer_name, "ACME公司");
    assert_eq!(records[0].receipt_number, "12345678901234567890");
    assert_eq!(records[0].amount, "1234.56");
    assert_eq!(records[0].status, ReviewStatus::Normal);

    assert_eq!(records[1].customer_name, "乙公司");
    assert_eq!(records[1].receipt_number, "11112222333344445555");
    assert_eq!(records[1].amount, "20.00");

    // Eight digits only and no amount label.
    assert_eq!(records[2].receipt_number, "未知编号");
    assert_eq!(records[2].amount, "5.50");
    assert_eq!(records[2].status, ReviewStatus::NeedsReview);
}

#[test]
fn test_regions_are_ordered_and_tall_enough() {
    let mut page = sheet();
    page.paths.push(cut_line(380.0));

    let regions = PageSegmenter::default().segment(0, &page);
    assert!(regions.iter().all(|r| r.rect.height() > 150.0));
    for pair in regions.windows(2) {
        assert!(pair[0].rect.y1 <= pair[1].rect.y0);
    }
    // The 80-unit sliver between 300 and 380 is dropped.
    assert_eq!(regions.len(), 3);
}

#[test]
fn test_local_company_and_relabel_agree() {
    let analyzed_with_company = ReceiptAnalyzer::default()
        .analyze(&vec![sheet()], "ACME公司")
        .unwrap();
    assert_eq!(analyzed_with_company[0].customer_name, "某客户");

    let mut records = ReceiptAnalyzer::default().analyze(&vec![sheet()], "").unwrap();
    let first = relabel(&mut records, "ACME公司");
    assert_eq!(first.updated, 1);
    let after_once = records.clone();

    relabel(&mut records, "ACME公司");
    assert_eq!(records, after_once);
    assert_eq!(records[0].customer_name, analyzed_with_company[0].customer_name);
    assert_eq!(records[0].status, ReviewStatus::Updated);
}

#[test]
fn test_format_check_stops_at_first_matching_page() {
    let mut blank = PageGeometry::new(600.0, 900.0);
    blank.tokens = vec![tok("电子回单", 10.0, 60.0, 10.0)];

    let provider = CountingProvider {
        pages: vec![blank.clone(), sheet(), blank.clone(), blank],
        requested: RefCell::new(Vec::new()),
    };
    let records = ReceiptAnalyzer::default().analyze(&provider, "").unwrap();

    // Validation reads pages 0 and 1, then extraction reads all four.
    assert_eq!(*provider.requested.borrow(), vec![0, 1, 0, 1, 2, 3]);
    assert_eq!(records.len(), 6);
}

#[test]
fn test_format_mismatch_reads_at_most_three_pages() {
    let foreign = PageGeometry::new(600.0, 900.0);
    let provider = CountingProvider {
        pages: vec![foreign.clone(), foreign.clone(), foreign.clone(), sheet()],
        requested: RefCell::new(Vec::new()),
    };

    match ReceiptAnalyzer::default().analyze(&provider, "") {
        Err(SplitError::FormatMismatch { pages_checked }) => assert_eq!(pages_checked, 3),
        other => panic!("expected format mismatch, got {:?}", other),
    }
    assert_eq!(*provider.requested.borrow(), vec![0, 1, 2]);
}
