//! Terminal reporting.
//!
//! Stateless formatting helpers; no global color or log state.

use colored::Colorize;

use crate::runner::{CategoryTotals, RunSummary};

pub fn item_passed(label: &str) {
    println!("  {} {label}", "✓".green());
}

pub fn item_failed(label: &str, diagnostics: &str) {
    println!("  {} {label}", "✗".red());
    for line in diagnostics.lines() {
        println!("      {line}");
    }
}

pub fn item_skipped(label: &str, reason: &str) {
    println!("  {} {label} {}", "⊘".yellow(), format!("({reason})").dimmed());
}

pub fn section(title: &str) {
    println!("{}", title.bold());
}

/// Category hooks warn (and still pass) when nothing matched.
pub fn warn_nothing_found(category: &str) {
    println!("{} no {category} found", "warning:".yellow().bold());
}

pub fn print_category(name: &str, totals: &CategoryTotals) {
    let failed = if totals.failed > 0 {
        totals.failed.to_string().red().to_string()
    } else {
        totals.failed.to_string()
    };
    println!(
        "  {name:<18} {} passed, {failed} failed, {} skipped",
        totals.passed, totals.skipped
    );
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    section("Summary");
    print_category("custom charts", &summary.custom);
    print_category("values charts", &summary.values);
    print_category("applicationsets", &summary.appsets);
    if summary.unknown_skipped > 0 {
        println!(
            "  {:<18} {} skipped (unknown chart type)",
            "other", summary.unknown_skipped
        );
    }
    print_verdict(summary.success());
}

pub fn print_verdict(success: bool) {
    if success {
        println!("{}", "✓ All validations passed".green().bold());
    } else {
        println!("{}", "✗ Validation failed".red().bold());
    }
}
