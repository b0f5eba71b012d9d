//! Tool configuration loaded from a TOML file

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SHEET_URL: &str =
    "https://docs.google.com/spreadsheets/d/1jzEwuQY_1RAF296YmCAIxiu5ueznbBgx2nP5Rc_Yy2Y/edit?usp=sharing";
pub const DEFAULT_TEMPLATE_PATH: &str = "templates/walmart_price_template.xlsx";
pub const DEFAULT_PUBLISHED_STATUS: &str = "Published";
pub const DEFAULT_MAX_ROWS: usize = 1000;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Main tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Shareable link of the reference sheet (Anyone with the link -> Viewer)
    pub sheet_url: String,
    /// Path of the fixed-layout upload template
    pub template_path: PathBuf,
    /// Publish Status value that marks a SKU as published; anything else is
    /// treated as unpublished
    pub published_status: String,
    /// Cap on pasted input rows
    pub max_rows: usize,
    /// Timeout for the reference sheet fetch, in seconds
    pub fetch_timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            sheet_url: DEFAULT_SHEET_URL.to_string(),
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            published_status: DEFAULT_PUBLISHED_STATUS.to_string(),
            max_rows: DEFAULT_MAX_ROWS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

impl ToolConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ToolConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
