//! Validator/merger: cross-references pasted rows against the reference map
//!
//! `merge_and_validate` is a pure function of its inputs; nothing is carried
//! between calls. Each refresh rebuilds the whole merged set.

use crate::input::InputRow;
use crate::reference::ReferenceMap;
use crate::report::{FailReason, MergedRow, ValidationReport};
use std::collections::BTreeSet;
use std::collections::HashMap;

/// Clean a pasted price string and parse it.
///
/// Commas and the currency sigils the source data carries are stripped
/// before parsing. Returns `None` when the result is empty or not a number.
pub fn clean_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '₹' && *c != '$')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.trim().parse::<f64>().ok()
}

/// Merge pasted rows with the reference snapshot and flag every row.
///
/// SKU matching is case-sensitive exact match on the trimmed value. A row is
/// a hard fail iff it carries at least one [`FailReason`]; unpublished is a
/// soft condition flagged separately. Duplicate SKUs flag every occurrence,
/// never just the later ones.
pub fn merge_and_validate(
    inputs: &[InputRow],
    reference: &ReferenceMap,
    published_status: &str,
) -> ValidationReport {
    // Count SKU occurrences first so every duplicate gets flagged
    let mut sku_counts: HashMap<&str, usize> = HashMap::new();
    for row in inputs {
        let sku = row.sku.trim();
        if !sku.is_empty() {
            *sku_counts.entry(sku).or_insert(0) += 1;
        }
    }

    let rows = inputs
        .iter()
        .map(|input| {
            let mut fail_reasons = BTreeSet::new();
            let sku = input.sku.trim().to_string();

            let new_price = clean_price(&input.new_price);
            match new_price {
                Some(p) if p > 0.0 && p.is_finite() => {}
                _ => {
                    fail_reasons.insert(FailReason::InvalidPrice);
                }
            }

            let mut publish_status = None;
            let mut current_price = None;
            let mut unpublished = false;

            if sku.is_empty() {
                fail_reasons.insert(FailReason::BlankSku);
            } else {
                if sku_counts.get(sku.as_str()).copied().unwrap_or(0) > 1 {
                    fail_reasons.insert(FailReason::DuplicateSku);
                }
                match reference.get(&sku) {
                    Some(reference_row) => {
                        unpublished = reference_row.publish_status.trim() != published_status;
                        publish_status = Some(reference_row.publish_status.clone());
                        current_price = reference_row.current_price;
                    }
                    None => {
                        fail_reasons.insert(FailReason::SkuNotFound);
                    }
                }
            }

            MergedRow {
                sku,
                new_price_raw: input.new_price.clone(),
                new_price,
                publish_status,
                current_price,
                fail_reasons,
                unpublished,
            }
        })
        .collect();

    ValidationReport { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{ReferenceMap, ReferenceRow};

    fn reference() -> ReferenceMap {
        ReferenceMap::from_rows(vec![
            ReferenceRow {
                sku: "A-1".to_string(),
                publish_status: "Published".to_string(),
                current_price: Some(15.0),
            },
            ReferenceRow {
                sku: "B-2".to_string(),
                publish_status: "Unpublished".to_string(),
                current_price: Some(8.0),
            },
            ReferenceRow {
                sku: "C-3".to_string(),
                publish_status: "Published".to_string(),
                current_price: None,
            },
        ])
    }

    fn input(sku: &str, price: &str) -> InputRow {
        InputRow {
            sku: sku.to_string(),
            new_price: price.to_string(),
        }
    }

    #[test]
    fn test_clean_price() {
        assert_eq!(clean_price("12.50"), Some(12.5));
        assert_eq!(clean_price("1,299.00"), Some(1299.0));
        assert_eq!(clean_price("$12.50"), Some(12.5));
        assert_eq!(clean_price("₹999"), Some(999.0));
        assert_eq!(clean_price(""), None);
        assert_eq!(clean_price("abc"), None);
        assert_eq!(clean_price("  "), None);
    }

    #[test]
    fn test_valid_published_row_has_no_flags() {
        let report = merge_and_validate(&[input("A-1", "12.50")], &reference(), "Published");
        let row = &report.rows[0];
        assert!(row.fail_reasons.is_empty());
        assert!(!row.unpublished);
        assert_eq!(row.new_price, Some(12.5));
        assert_eq!(row.publish_status.as_deref(), Some("Published"));
        assert_eq!(row.current_price, Some(15.0));
        assert!(report.can_download(false));
    }

    #[test]
    fn test_blank_sku_blocks_download() {
        let report = merge_and_validate(&[input("", "12.50")], &reference(), "Published");
        assert!(report.rows[0].fail_reasons.contains(&FailReason::BlankSku));
        assert!(!report.can_download(false));
        assert!(!report.can_download(true));
    }

    #[test]
    fn test_invalid_prices() {
        for bad in ["", "abc", "0", "-5", "inf", "NaN"] {
            let report = merge_and_validate(&[input("A-1", bad)], &reference(), "Published");
            assert!(
                report.rows[0].fail_reasons.contains(&FailReason::InvalidPrice),
                "price {bad:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_duplicate_flags_every_occurrence() {
        let report = merge_and_validate(
            &[input("A-1", "10"), input("C-3", "5"), input("A-1", "12")],
            &reference(),
            "Published",
        );
        assert!(report.rows[0].fail_reasons.contains(&FailReason::DuplicateSku));
        assert!(report.rows[2].fail_reasons.contains(&FailReason::DuplicateSku));
        assert!(!report.rows[1].fail_reasons.contains(&FailReason::DuplicateSku));
        assert_eq!(report.count_of(FailReason::DuplicateSku), 2);
    }

    #[test]
    fn test_sku_not_found() {
        let report = merge_and_validate(&[input("ZZZ", "10")], &reference(), "Published");
        assert!(report.rows[0].fail_reasons.contains(&FailReason::SkuNotFound));
        assert!(report.rows[0].publish_status.is_none());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let report = merge_and_validate(&[input("a-1", "10")], &reference(), "Published");
        assert!(report.rows[0].fail_reasons.contains(&FailReason::SkuNotFound));
    }

    #[test]
    fn test_unpublished_is_soft() {
        let report = merge_and_validate(&[input("B-2", "10")], &reference(), "Published");
        let row = &report.rows[0];
        assert!(row.fail_reasons.is_empty());
        assert!(row.unpublished);
        assert!(!report.can_download(false));
        assert!(report.can_download(true));
        assert_eq!(report.unpublished_skus(), vec!["B-2"]);
    }

    #[test]
    fn test_unpublished_not_set_for_missing_sku() {
        let report = merge_and_validate(&[input("ZZZ", "10")], &reference(), "Published");
        assert!(!report.rows[0].unpublished);
    }

    #[test]
    fn test_multiple_reasons_accumulate() {
        let report = merge_and_validate(&[input("", "abc")], &reference(), "Published");
        let reasons = &report.rows[0].fail_reasons;
        assert!(reasons.contains(&FailReason::BlankSku));
        assert!(reasons.contains(&FailReason::InvalidPrice));
    }

    #[test]
    fn test_writable_rows_in_input_order() {
        let report = merge_and_validate(
            &[input("C-3", "5"), input("A-1", "10"), input("B-2", "7")],
            &reference(),
            "Published",
        );
        assert!(report.can_download(true));
        let rows: Vec<_> = report.writable_rows().collect();
        assert_eq!(rows, vec![("C-3", 5.0), ("A-1", 10.0), ("B-2", 7.0)]);
    }

    #[test]
    fn test_empty_input_blocks_download() {
        let report = merge_and_validate(&[], &reference(), "Published");
        assert_eq!(report.total_rows(), 0);
        assert!(!report.has_hard_fail());
        assert!(!report.can_download(false));
        assert!(!report.can_download(true));
    }

    #[test]
    fn test_merge_is_pure() {
        let inputs = vec![input("A-1", "10")];
        let reference = reference();
        let first = merge_and_validate(&inputs, &reference, "Published");
        let second = merge_and_validate(&inputs, &reference, "Published");
        assert_eq!(first.total_rows(), second.total_rows());
        assert_eq!(first.hard_fail_count(), second.hard_fail_count());
    }
}
