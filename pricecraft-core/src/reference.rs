//! Reference sheet loader
//!
//! Fetches the publicly shared Google Sheet through its CSV export endpoint
//! and builds a SKU-keyed lookup of publish status and current price. The
//! fetch is a single blocking request with a timeout; a failure is surfaced
//! as a [`FetchError`] and the user re-triggers the refresh manually.

use crate::error::FetchError;
use std::collections::HashMap;
use std::io::Read;
use std::time::Duration;

pub const HEADER_SKU: &str = "SKU";
pub const HEADER_STATUS: &str = "Publish Status";
pub const HEADER_PRICE: &str = "Price";

/// One row of the reference sheet, fixed shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRow {
    pub sku: String,
    pub publish_status: String,
    /// Absent when the Price cell is blank or not a number
    pub current_price: Option<f64>,
}

/// Immutable SKU-keyed snapshot of the reference sheet.
///
/// Rebuilt on every refresh. Duplicate reference SKUs keep the last
/// occurrence; reference data is assumed externally clean.
#[derive(Debug, Clone, Default)]
pub struct ReferenceMap {
    rows: Vec<ReferenceRow>,
    index: HashMap<String, usize>,
}

impl ReferenceMap {
    pub fn from_rows(rows: Vec<ReferenceRow>) -> Self {
        let mut index = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            // last occurrence wins
            index.insert(row.sku.clone(), i);
        }
        Self { rows, index }
    }

    /// Case-sensitive exact lookup on the trimmed SKU
    pub fn get(&self, sku: &str) -> Option<&ReferenceRow> {
        self.index.get(sku).map(|&i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Rows in sheet order, duplicates included
    pub fn rows(&self) -> &[ReferenceRow] {
        &self.rows
    }
}

/// Pull the spreadsheet id out of a shareable link (`.../d/<id>/...`).
pub fn extract_sheet_id(sheet_url: &str) -> Option<&str> {
    let tail = sheet_url.split("/d/").nth(1)?;
    let id = tail.split('/').next()?.trim();
    if id.is_empty() { None } else { Some(id) }
}

/// Build the CSV export URL for a shareable sheet link.
pub fn csv_export_url(sheet_url: &str) -> Result<String, FetchError> {
    let id = extract_sheet_id(sheet_url)
        .ok_or_else(|| FetchError::InvalidLink(sheet_url.to_string()))?;
    Ok(format!(
        "https://docs.google.com/spreadsheets/d/{id}/export?format=csv"
    ))
}

/// Fetch the reference sheet and build the lookup snapshot.
pub fn fetch_reference(sheet_url: &str, timeout_secs: u64) -> Result<ReferenceMap, FetchError> {
    let export_url = csv_export_url(sheet_url)?;

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;

    let response = client.get(&export_url).send()?;
    if !response.status().is_success() {
        return Err(FetchError::BadStatus(response.status().as_u16()));
    }

    parse_reference_csv(response)
}

/// Parse the CSV export into a [`ReferenceMap`].
///
/// The header row must contain `SKU`, `Publish Status` and `Price`, in any
/// column order. Rows with a blank SKU are dropped.
pub fn parse_reference_csv<R: Read>(reader: R) -> Result<ReferenceMap, FetchError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let find = |name: &'static str| -> Result<usize, FetchError> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(FetchError::MissingHeader(name))
    };
    let sku_col = find(HEADER_SKU)?;
    let status_col = find(HEADER_STATUS)?;
    let price_col = find(HEADER_PRICE)?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let sku = record.get(sku_col).unwrap_or("").trim().to_string();
        if sku.is_empty() {
            continue;
        }
        let publish_status = record.get(status_col).unwrap_or("").trim().to_string();
        let current_price = record
            .get(price_col)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.replace(',', "").parse::<f64>().ok());

        rows.push(ReferenceRow {
            sku,
            publish_status,
            current_price,
        });
    }

    Ok(ReferenceMap::from_rows(rows))
}
