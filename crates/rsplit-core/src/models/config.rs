//! Configuration structures for the splitting pipeline.
//!
//! Every layout constant here is empirically tuned for one bank's receipt
//! sheets. Wrong values degrade segmentation or truncate names; they are
//! exposed so they can be adjusted without a rebuild.

use serde::{Deserialize, Serialize};

/// Main configuration for the rsplit pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// Format validation configuration.
    pub validation: ValidationConfig,

    /// Page segmentation configuration.
    pub segmentation: SegmentationConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Export configuration.
    pub export: ExportConfig,
}

/// Format validation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum number of leading pages to inspect.
    pub page_check_limit: usize,

    /// Distinct fingerprint phrases one page must contain.
    pub min_fingerprint_matches: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            page_check_limit: 3,
            min_fingerprint_matches: 2,
        }
    }
}

/// Page segmentation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Minimum separator length as a fraction of page width.
    pub separator_min_width_ratio: f64,

    /// Maximum separator thickness.
    pub separator_max_height: f64,

    /// Inset applied to both edges of a separator-bounded region.
    pub separator_inset: f64,

    /// Regions at or below this height are discarded.
    pub min_region_height: f64,

    /// Distance above a receipt-number label where a receipt begins.
    pub label_offset: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            separator_min_width_ratio: 0.8,
            separator_max_height: 2.0,
            separator_inset: 2.0,
            min_region_height: 150.0,
            label_offset: 50.0,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Search width to the right of a payer/receiver anchor.
    pub name_search_width: f64,

    /// Search width to the right of the receipt-number anchor.
    pub number_search_width: f64,

    /// Search width to the right of the amount anchor.
    pub amount_search_width: f64,

    /// Vertical tolerance for box searches and number rows.
    pub row_tolerance: f64,

    /// Vertical tolerance for name rows.
    pub name_row_tolerance: f64,

    /// Local company name; when it appears in the payer name the receiver
    /// becomes the customer. Empty means the payer is always the customer.
    pub local_company: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            name_search_width: 200.0,
            number_search_width: 250.0,
            amount_search_width: 150.0,
            row_tolerance: 3.0,
            name_row_tolerance: 5.0,
            local_company: String::new(),
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Prefix of the CSV log file name.
    pub log_prefix: String,

    /// Write a UTF-8 byte order mark so spreadsheet tools detect the encoding.
    pub log_bom: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            log_prefix: "log_".to_string(),
            log_bom: true,
        }
    }
}

impl SplitterConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SplitterConfig::default();
        assert_eq!(config.validation.page_check_limit, 3);
        assert_eq!(config.segmentation.min_region_height, 150.0);
        assert_eq!(config.segmentation.label_offset, 50.0);
        assert_eq!(config.extraction.amount_search_width, 150.0);
        assert!(config.extraction.local_company.is_empty());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"extraction": {"local_company": "ACME公司"}}"#;
        let config: SplitterConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.extraction.local_company, "ACME公司");
        assert_eq!(config.extraction.name_search_width, 200.0);
        assert_eq!(config.segmentation, SegmentationConfig::default());
    }

    #[test]
    fn test_config_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = SplitterConfig::default();
        config.segmentation.label_offset = 42.0;
        config.save(&path).unwrap();

        let loaded = SplitterConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
