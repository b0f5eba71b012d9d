//! Parser for the pasted (SKU, New Price) table

use anyhow::{Result, bail};

/// One pasted line, raw and pre-validation.
///
/// Both fields keep the text the user entered; cleaning and numeric
/// interpretation happen in the validator so malformed lines still show up
/// in the report instead of vanishing at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRow {
    pub sku: String,
    pub new_price: String,
}

/// Parse pasted text into ordered input rows.
///
/// Lines are split on `\n`, fields on `\t` (the shape a two-column copy from
/// a spreadsheet produces). Input order is preserved: it drives the row order
/// of the generated template. Lines whose every field trims to empty are
/// skipped; a line with a SKU but no tab becomes a row with an empty price,
/// deferred to the validator.
pub fn parse_pasted(text: &str, max_rows: usize) -> Result<Vec<InputRow>> {
    let mut rows = Vec::new();

    for line in text.lines() {
        let mut fields = line.split('\t');
        let sku = fields.next().unwrap_or("").trim().to_string();
        let new_price = fields.next().unwrap_or("").trim().to_string();

        // Covers empty lines and lines of tabs/spaces only
        if sku.is_empty() && new_price.is_empty() {
            continue;
        }

        rows.push(InputRow { sku, new_price });
    }

    if rows.len() > max_rows {
        bail!("pasted input has {} rows, maximum is {}", rows.len(), max_rows);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_input_order() {
        let rows = parse_pasted("B-2\t10\nA-1\t20\nC-3\t30", 1000).unwrap();
        let skus: Vec<_> = rows.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(skus, vec!["B-2", "A-1", "C-3"]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let rows = parse_pasted("A-1\t10\n\n   \n\t\nB-2\t20\n", 1000).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_malformed_line_kept_with_empty_price() {
        let rows = parse_pasted("A-1", 1000).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sku, "A-1");
        assert_eq!(rows[0].new_price, "");
    }

    #[test]
    fn test_price_without_sku_kept() {
        let rows = parse_pasted("\t12.50", 1000).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sku, "");
        assert_eq!(rows[0].new_price, "12.50");
    }

    #[test]
    fn test_fields_trimmed() {
        let rows = parse_pasted("  A-1  \t  9.99 ", 1000).unwrap();
        assert_eq!(rows[0].sku, "A-1");
        assert_eq!(rows[0].new_price, "9.99");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let rows = parse_pasted("A-1\t10\tzzz", 1000).unwrap();
        assert_eq!(rows[0].new_price, "10");
    }

    #[test]
    fn test_row_cap() {
        let text = (0..11).map(|i| format!("SKU-{i}\t1")).collect::<Vec<_>>().join("\n");
        assert!(parse_pasted(&text, 10).is_err());
        assert!(parse_pasted(&text, 11).is_ok());
    }
}
