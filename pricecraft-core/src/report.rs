//! Validation report with per-row fail reasons and download gating

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A condition that unconditionally blocks download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FailReason {
    /// SKU is empty after trimming
    BlankSku,
    /// New Price is empty, non-numeric, or <= 0
    InvalidPrice,
    /// SKU occurs more than once among the pasted rows
    DuplicateSku,
    /// SKU is absent from the reference sheet
    SkuNotFound,
}

impl FailReason {
    pub const ALL: [FailReason; 4] = [
        FailReason::BlankSku,
        FailReason::InvalidPrice,
        FailReason::DuplicateSku,
        FailReason::SkuNotFound,
    ];

    pub fn describe(&self) -> &'static str {
        match self {
            FailReason::BlankSku => "blank SKU",
            FailReason::InvalidPrice => "New Price blank, not a number, or not positive",
            FailReason::DuplicateSku => "duplicate SKU in pasted rows",
            FailReason::SkuNotFound => "SKU not found on the reference sheet",
        }
    }
}

impl std::fmt::Display for FailReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// An input row enriched with reference data and validation flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedRow {
    /// Trimmed SKU from the pasted input
    pub sku: String,
    /// Raw New Price text as pasted
    pub new_price_raw: String,
    /// Cleaned numeric New Price, when it parses
    pub new_price: Option<f64>,
    /// Publish Status from the reference sheet; `None` when the SKU was not
    /// found or is blank
    pub publish_status: Option<String>,
    /// Current price from the reference sheet
    pub current_price: Option<f64>,
    pub fail_reasons: BTreeSet<FailReason>,
    /// Soft condition: found on the sheet but not in the published status
    pub unpublished: bool,
}

impl MergedRow {
    pub fn is_hard_fail(&self) -> bool {
        !self.fail_reasons.is_empty()
    }
}

/// Result of one validation pass over the pasted rows.
///
/// Hard fails are summarized as counts only; unpublished SKUs are the one
/// condition that gets an itemized list, since the user must read it to
/// decide whether to confirm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub rows: Vec<MergedRow>,
}

impl ValidationReport {
    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn hard_fail_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_hard_fail()).count()
    }

    pub fn has_hard_fail(&self) -> bool {
        self.rows.iter().any(|r| r.is_hard_fail())
    }

    /// Number of rows carrying a specific fail reason
    pub fn count_of(&self, reason: FailReason) -> usize {
        self.rows
            .iter()
            .filter(|r| r.fail_reasons.contains(&reason))
            .count()
    }

    pub fn unpublished_count(&self) -> usize {
        self.rows.iter().filter(|r| r.unpublished).count()
    }

    /// Itemized unpublished SKUs, in input order
    pub fn unpublished_skus(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|r| r.unpublished)
            .map(|r| r.sku.as_str())
            .collect()
    }

    pub fn has_unpublished(&self) -> bool {
        self.rows.iter().any(|r| r.unpublished)
    }

    /// Download gate: at least one row to write, no hard fail, and any
    /// unpublished SKUs explicitly confirmed by the user.
    pub fn can_download(&self, unpublished_confirmed: bool) -> bool {
        !self.rows.is_empty()
            && !self.has_hard_fail()
            && (!self.has_unpublished() || unpublished_confirmed)
    }

    /// Rows eligible for the template, in input order.
    ///
    /// Only meaningful once the gate is open; unpublished rows are included
    /// because confirmation means "upload them anyway".
    pub fn writable_rows(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rows
            .iter()
            .filter(|r| !r.is_hard_fail())
            .filter_map(|r| r.new_price.map(|p| (r.sku.as_str(), p)))
    }
}
