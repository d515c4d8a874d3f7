//! Receipt segmentation and field extraction.

pub mod anchor;
mod assembler;
pub mod rules;
mod segmenter;
pub mod text;
mod validator;

pub use anchor::{extract_name_only, find_text_from_anchor};
pub use assembler::ReceiptAnalyzer;
pub use rules::{distinct_payers, relabel, RegionView, RelabelOutcome};
pub use segmenter::{PageSegmenter, SegmentStrategy};
pub use validator::{FormatValidator, FINGERPRINTS};
