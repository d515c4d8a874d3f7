//! In-memory PDF fixtures for unit tests.
//!
//! ASCII text is drawn with Helvetica (`/F1`). Anything else goes through a
//! Type0 font (`/F2`) whose two-byte codes are the UTF-16 code units of the
//! text. `/F2` carries a ToUnicode map covering every code the fixture shows.

use std::collections::BTreeSet;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

/// Page size of every fixture page.
pub(crate) const PAGE_WIDTH: i64 = 600;
pub(crate) const PAGE_HEIGHT: i64 = 800;

/// Build a document whose pages each draw the given content operations.
pub(crate) fn build_pdf(pages: Vec<Vec<Operation>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let to_unicode_id = doc.add_object(Stream::new(dictionary! {}, to_unicode_cmap(&wide_codes(&pages))));
    let latin_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let cid_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => "SimSun",
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
    });
    let cjk_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "SimSun",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![cid_id.into()],
        "ToUnicode" => to_unicode_id,
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => latin_id, "F2" => cjk_id },
    });

    let mut kids = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).expect("save pdf");
    data
}

/// Two-byte codes shown with `/F2` anywhere in `pages`.
fn wide_codes(pages: &[Vec<Operation>]) -> BTreeSet<u16> {
    let mut codes = BTreeSet::new();
    for operations in pages {
        let mut wide = false;
        for op in operations {
            match (op.operator.as_str(), op.operands.first()) {
                ("Tf", Some(Object::Name(name))) => wide = name.as_slice() == b"F2",
                ("Tj", Some(Object::String(bytes, _))) if wide => {
                    codes.extend(bytes.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]])));
                }
                _ => {}
            }
        }
    }
    codes
}

/// ToUnicode CMap mapping each code to the UTF-16 unit of the same value.
fn to_unicode_cmap(codes: &BTreeSet<u16>) -> Vec<u8> {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
         /CMapName /Fixture-UCS def\n/CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    let codes: Vec<u16> = codes.iter().copied().collect();
    for chunk in codes.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for code in chunk {
            cmap.push_str(&format!("<{code:04X}> <{code:04X}>\n"));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap.into_bytes()
}

/// Operations showing `text` at size 10 with its baseline at PDF user-space (x, y).
pub(crate) fn text_at(x: i64, y: i64, text: &str) -> Vec<Operation> {
    let (font, operand) = if text.is_ascii() {
        ("F1", Object::string_literal(text))
    } else {
        let bytes = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        ("F2", Object::String(bytes, StringFormat::Hexadecimal))
    };
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), 10.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![operand]),
        Operation::new("ET", vec![]),
    ]
}

/// Like [`text_at`] but placed by the top of the glyph box in top-left page coordinates.
pub(crate) fn text_top(x: i64, top: i64, text: &str) -> Vec<Operation> {
    text_at(x, PAGE_HEIGHT - top - 8, text)
}

/// Operations stroking a dashed horizontal rule at PDF height `y`.
pub(crate) fn dashed_rule(x0: i64, x1: i64, y: i64) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new("d", vec![Object::Array(vec![3.into(), 2.into()]), 0.into()]),
        Operation::new("m", vec![x0.into(), y.into()]),
        Operation::new("l", vec![x1.into(), y.into()]),
        Operation::new("S", vec![]),
        Operation::new("Q", vec![]),
    ]
}

/// One receipt block whose title row starts `top` points below the page top.
pub(crate) fn receipt_block(top: i64, payer: &str, receiver: &str, number: &str, amount: &str) -> Vec<Operation> {
    [
        text_top(200, top, "中国农业银行"),
        text_top(280, top, "电子回单"),
        text_top(10, top + 20, "回单编号"),
        text_top(60, top + 20, "："),
        text_top(85, top + 20, number),
        text_top(10, top + 40, "付款方户名"),
        text_top(80, top + 40, payer),
        text_top(300, top + 40, "收款方户名"),
        text_top(370, top + 40, receiver),
        text_top(10, top + 60, "金额（小写）"),
        text_top(85, top + 60, amount),
    ]
    .concat()
}

/// A single-page sheet with two receipts split by a dashed cut line.
pub(crate) fn two_receipt_sheet() -> Vec<u8> {
    let mut page = receipt_block(80, "ACME公司", "某客户", "12345678901234567890", "1,234.56");
    page.extend(dashed_rule(10, 590, 400));
    page.extend(receipt_block(480, "某供应商", "ACME公司", "98765432109876543210", "88.00"));
    build_pdf(vec![page])
}
