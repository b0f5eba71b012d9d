//! Writer module for filling the upload template workbook

mod template_filler;

pub use template_filler::fill_template_xlsx;

use crate::error::TemplateError;
use std::path::Path;

/// First data row of the template, 1-indexed
pub const START_ROW: u32 = 7;
/// Column holding the SKU
pub const COL_SKU: &str = "D";
/// Columns holding the New Price; the platform's upload schema wants the
/// same value in all three
pub const COLS_PRICE: [&str; 3] = ["E", "F", "G"];

/// Fill the upload template with validated (SKU, New Price) rows.
///
/// Data is written starting at row 7: column D = SKU, columns E/F/G = the
/// price. Pre-existing template content at and below row 7 is cleared. Only
/// invoked when the validation gate is open.
pub fn fill_template<P: AsRef<Path>>(
    template_path: P,
    output_path: P,
    rows: &[(String, f64)],
) -> Result<(), TemplateError> {
    let template = template_path.as_ref();
    if !template.exists() {
        return Err(TemplateError::Missing(template.to_path_buf()));
    }

    match template.extension().and_then(|s| s.to_str()) {
        Some("xlsx") => fill_template_xlsx(template, output_path.as_ref(), rows),
        _ => Err(TemplateError::Invalid(format!(
            "unsupported template format: {}",
            template.display()
        ))),
    }
}

/// Check that the template exists and is a readable workbook with at least
/// one worksheet. Used for the pre-flight status report.
pub fn validate_template<P: AsRef<Path>>(template_path: P) -> Result<(), TemplateError> {
    use calamine::{Reader, Xlsx, open_workbook};

    let template = template_path.as_ref();
    if !template.exists() {
        return Err(TemplateError::Missing(template.to_path_buf()));
    }

    let workbook: Xlsx<_> = open_workbook(template)
        .map_err(|e: calamine::XlsxError| TemplateError::Invalid(e.to_string()))?;
    if workbook.sheet_names().is_empty() {
        return Err(TemplateError::MissingSheet("<first worksheet>".to_string()));
    }

    Ok(())
}
