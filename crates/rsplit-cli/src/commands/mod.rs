//! CLI subcommands.

pub mod analyze;
pub mod config;
pub mod split;

use std::path::Path;

use rsplit_core::SplitterConfig;

/// Load the configuration named by `-c`, else the user's config file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<SplitterConfig> {
    if let Some(path) = config_path {
        return Ok(SplitterConfig::from_file(Path::new(path))?);
    }
    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(SplitterConfig::from_file(&default_path)?)
    } else {
        Ok(SplitterConfig::default())
    }
}

/// Company given on the command line, falling back to the configured one.
pub fn local_company(flag: Option<&str>, config: &SplitterConfig) -> String {
    flag.unwrap_or(&config.extraction.local_company).trim().to_string()
}
