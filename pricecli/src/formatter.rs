//! Output formatters for the validation report

use anyhow::Result;
use colored::*;
use pricecraft_core::{FailReason, ValidationReport};

/// Print the report in human-readable form with colors.
///
/// Hard fails are summarized as counts per reason; unpublished SKUs are the
/// one condition listed item by item, since the user has to read the list to
/// decide whether to confirm.
pub fn print_human(report: &ValidationReport, unpublished_confirmed: bool) {
    println!("{} {}", "Rows filled:".bold(), report.total_rows());
    println!();

    if report.has_hard_fail() {
        println!(
            "{}",
            "Hard fail. Fix these issues before downloading:".red().bold()
        );
        for reason in FailReason::ALL {
            let count = report.count_of(reason);
            if count > 0 {
                println!("  {} {} ({})", "-".red(), reason, count);
            }
        }
        println!();
    }

    if report.has_unpublished() {
        println!(
            "{} {} {}",
            "Unpublished SKU:".yellow().bold(),
            report.unpublished_count(),
            if unpublished_confirmed {
                "(confirmed, will be included)".yellow()
            } else {
                "(pass --confirm-unpublished to include them)".yellow()
            }
        );
        for sku in report.unpublished_skus() {
            println!("  {} {}", "-".yellow(), sku);
        }
        println!();
    }

    if report.can_download(unpublished_confirmed) {
        println!("{}", "✓ No issues found. Ready to download.".green().bold());
    } else if report.total_rows() == 0 {
        println!("{}", "✗ No rows found.".red().bold());
    } else if report.has_hard_fail() {
        println!("{}", "✗ Download blocked.".red().bold());
    } else {
        println!("{}", "✗ Download blocked until unpublished SKUs are confirmed.".yellow().bold());
    }
}

/// Print the report in JSON format
pub fn print_json(report: &ValidationReport, unpublished_confirmed: bool) -> Result<()> {
    let output = serde_json::json!({
        "total_rows": report.total_rows(),
        "hard_fail_rows": report.hard_fail_count(),
        "fail_counts": {
            "blank_sku": report.count_of(FailReason::BlankSku),
            "invalid_price": report.count_of(FailReason::InvalidPrice),
            "duplicate_sku": report.count_of(FailReason::DuplicateSku),
            "sku_not_found": report.count_of(FailReason::SkuNotFound),
        },
        "unpublished_skus": report.unpublished_skus(),
        "unpublished_confirmed": unpublished_confirmed,
        "can_download": report.can_download(unpublished_confirmed),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
