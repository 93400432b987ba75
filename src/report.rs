#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Console and file rendering of expected lists and grading reports.

use std::io::Write;

use anyhow::{Context, Result};
use colored::Colorize;
use itertools::Itertools;
use tabled::{Table, Tabled};

use crate::{
    directives::MatchMode,
    results::{CellResult, TestReport, TestResult, TestStatus},
};

/// Aggregate grade row of the summary table.
#[derive(Tabled)]
struct Summary {
    /// Credit earned.
    #[tabled(rename = "Grade")]
    grade: String,
    /// Credit possible.
    #[tabled(rename = "Total")]
    total: String,
}

/// A bordered text block with a title line.
fn panel(title: &str, body: &str) -> String {
    let body = body.lines().map(|line| format!("│ {line}")).join("\n");
    format!("── {title} ──\n{body}")
}

/// Formats one graded item as a text block.
fn format_test_result(index: usize, result: &TestResult, color: bool) -> String {
    let directives = &result.expected.directives;
    let title = directives
        .title
        .clone()
        .unwrap_or_else(|| result.id.clone());
    let match_label = match directives.match_mode {
        Some(MatchMode::Line) => "line",
        Some(MatchMode::Word) => "word",
        None => "exact",
    };

    let mut lines: Vec<String> = vec![format!("{}. {}", index + 1, title)];

    match result.status {
        TestStatus::Error => {
            let message = format!("Error: {}", result.message);
            lines.push(if color { message.red().to_string() } else { message });
            lines.push(String::new());
            lines.push(panel(
                &format!("Expected {}", result.expected.kind),
                &result.expected.text,
            ));
        }
        TestStatus::Failure => {
            let message = format!(
                "Failure: {:.2}% using {} matching",
                result.ratio * 100.0,
                match_label
            );
            lines.push(if color { message.red().to_string() } else { message });
            lines.push(String::new());
            if let Some(submitted) = &result.submitted {
                lines.push(panel(
                    &format!("Submitted {}", submitted.kind),
                    &submitted.text,
                ));
            }
            lines.push(panel(
                &format!("Expected {}", result.expected.kind),
                &result.expected.text,
            ));
        }
        TestStatus::Success => {
            let success = "Success.";
            let cheer = "Well done. 👍";
            lines.push(if color {
                success.green().bold().to_string()
            } else {
                success.to_string()
            });
            lines.push(if color { cheer.green().to_string() } else { cheer.to_string() });
        }
    }

    lines.push(format!("{:>40}", format!("{:.1} / {:.1}", result.grade, result.total)));
    lines.join("\n")
}

/// Renders a full report as text, optionally colored.
///
/// The summary table is included only for unscoped reports, matching the
/// interactive check workflow where a prefix grades a single section.
pub fn render_report(report: &TestReport, color: bool) -> String {
    let mut out = String::new();

    for (index, result) in report.results.iter().enumerate() {
        out.push_str(&format_test_result(index, result, color));
        out.push_str("\n\n");
    }

    if report.title_prefix.as_deref().unwrap_or("").is_empty() {
        let table = Table::new([Summary {
            grade: format!("{:.1}", report.grade),
            total: format!("{:.1}", report.total),
        }]);
        out.push_str(&table.to_string());
        out.push('\n');
    }

    out
}

/// Prints a report to the console with status coloring.
pub fn print_report(report: &TestReport) {
    println!("{}", render_report(report, true));
}

/// Writes an uncolored report to the given sink.
pub fn write_report(report: &TestReport, sink: &mut dyn Write) -> Result<()> {
    sink.write_all(render_report(report, false).as_bytes())
        .context("Failed to write report")
}

/// Prints an expected list as titled panels, for inspecting what the
/// grader will compare against.
pub fn print_expected(expected_list: &[CellResult]) {
    for expected in expected_list {
        let title = expected
            .directives
            .title
            .clone()
            .unwrap_or_else(|| expected.id.clone());
        println!("{}\n", panel(&format!("{title} ({})", expected.kind), &expected.text));
    }
}
