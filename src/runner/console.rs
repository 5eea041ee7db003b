//! Human-facing run output.

use colored::*;

use super::report::{CheckResult, OverallStatus, RunReport};

const RULE_WIDTH: usize = 80;

/// Messages at least this long are only printed for failing checks.
const INLINE_MESSAGE_LIMIT: usize = 100;

pub fn print_header(timestamp: &str, strict_mode: bool) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{}", rule.blue().bold());
    println!("{}", "QA Health Check".blue().bold());
    println!("{}\n", rule.blue().bold());
    println!("Timestamp: {}", timestamp);
    let strict = strict_mode.to_string();
    let strict = if strict_mode { strict.yellow() } else { strict.green() };
    println!("Strict Mode: {}\n", strict);
}

pub fn print_category(description: &str) {
    println!("\n{}", format!("━━━ {} ━━━", description).bold());
}

pub fn print_result(result: &CheckResult) {
    let symbol = if result.passed { "✓".green() } else { "✗".red() };
    println!(
        "  {} {}: {} [{}]",
        symbol,
        result.id,
        result.name,
        result.severity.as_str().to_uppercase()
    );
    if should_show_message(result) {
        println!("    → {}", result.message);
    }
}

pub fn should_show_message(result: &CheckResult) -> bool {
    !result.passed || result.message.chars().count() < INLINE_MESSAGE_LIMIT
}

pub fn print_summary(report: &RunReport) {
    let rule = "=".repeat(RULE_WIDTH);
    let summary = &report.summary;

    println!("\n{}", rule.bold());
    println!("{}", "Summary".bold());
    println!("{}", rule);
    println!("Total Checks: {}", summary.total);
    println!("{}", format!("Passed: {}", summary.passed).green());
    println!("{}", format!("Failed: {}", summary.failed).red());

    let status = report.overall_status();
    let line = match status {
        OverallStatus::Green => format!("✓ QA STATUS: {} - All checks passed!", status).green(),
        OverallStatus::Amber => format!(
            "! QA STATUS: {} - {} non-critical check(s) failed",
            status, summary.failed
        )
        .yellow(),
        OverallStatus::Red => {
            format!("✗ QA STATUS: {} - {} check(s) failed", status, summary.failed).red()
        }
    };
    println!("\n{}", line.bold());
    println!("{}\n", rule);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Severity;

    fn result(passed: bool, message: &str) -> CheckResult {
        CheckResult {
            id: "X-1".to_string(),
            name: "x".to_string(),
            severity: Severity::Low,
            passed,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_long_pass_messages_are_hidden() {
        let long = "m".repeat(INLINE_MESSAGE_LIMIT);
        assert!(!should_show_message(&result(true, &long)));
        assert!(should_show_message(&result(false, &long)));
        assert!(should_show_message(&result(true, "short")));
    }
}
