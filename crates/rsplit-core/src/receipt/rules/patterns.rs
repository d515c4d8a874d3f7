//! Regex patterns and fixed label sets for bank receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Label printed next to the receipt number.
pub const RECEIPT_NUMBER_LABEL: &str = "回单编号";

/// Label printed next to the amount in figures.
pub const AMOUNT_LABEL: &str = "金额（小写）";

/// Payer name anchors, in priority order.
pub const PAYER_ANCHORS: &[&str] = &["付款方户名", "付款方", "户名"];

/// Receiver name anchors, in priority order.
pub const RECEIVER_ANCHORS: &[&str] = &["收款方户名", "收款方", "户名"];

/// Labels that end a name value when they appear as a complete word.
pub const NAME_STOP_KEYWORDS: &[&str] = &[
    "账号", "账户", "开户行", "金额", "日期", "摘要", "用途", "备注", "回单编号",
];

/// Labels that end a receipt number scan (plain substring match).
pub const NUMBER_STOP_KEYWORDS: &[&str] = &["付款方", "收款方", "账号", "账户", "开户行", "金额", "日期"];

/// Length of a receipt number.
pub const RECEIPT_NUMBER_LEN: usize = 20;

lazy_static! {
    /// Maximal run of ASCII digits.
    pub static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();

    /// Receipt number label, optional separator, then a digit run.
    pub static ref LABELED_NUMBER: Regex = Regex::new(
        r"回单编号[：:\s]*([0-9]+)"
    ).unwrap();

    /// Money value: digits with optional thousands commas and two decimals.
    pub static ref MONEY: Regex = Regex::new(
        r"[0-9][0-9,]*\.[0-9]{2}"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    pub static ref ILLEGAL_FILENAME_CHARS: Regex = Regex::new(r#"[\\/*?:"<>|]"#).unwrap();

    // Name cleanup
    pub static ref LEADING_PUNCT: Regex = Regex::new(r"^[：:\s，,。.]+").unwrap();
    pub static ref ACCOUNT_NAME_PREFIX: Regex = Regex::new(r"^户名\s*").unwrap();
    pub static ref TRAILING_PUNCT: Regex = Regex::new(r"[，,。.\s]+$").unwrap();
}

/// First maximal digit run of exactly 20 digits.
pub fn find_receipt_number(text: &str) -> Option<&str> {
    DIGIT_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|run| run.len() == RECEIPT_NUMBER_LEN)
}

/// First labeled receipt number whose digit run is exactly 20 digits long.
pub fn find_labeled_receipt_number(text: &str) -> Option<&str> {
    LABELED_NUMBER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|run| run.len() == RECEIPT_NUMBER_LEN)
}

/// First money value in `text`, commas removed.
pub fn find_money(text: &str) -> Option<String> {
    MONEY.find(text).map(|m| m.as_str().replace(',', ""))
}
