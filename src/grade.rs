#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Matches a submitted notebook's cells against an expected list and
//! derives per-item and aggregate grades.

use std::collections::HashMap;

use similar::TextDiff;
use tracing::warn;

use crate::{
    directives::{Directives, MatchMode},
    normalize::normalize_str,
    notebook::{Cell, Notebook},
    results::{CellResult, TestReport, TestResult, TestStatus, cell_result},
};

/// Ratio above which a comparison counts as a full success.
const SUCCESS_THRESHOLD: f64 = 0.99;

/// Splits text into comparison tokens per the directive's match mode.
///
/// Absent mode treats the whole text as a single token.
pub fn tokens<'a>(mode: Option<MatchMode>, text: &'a str) -> Vec<&'a str> {
    match mode {
        None => vec![text],
        Some(MatchMode::Line) => text.split('\n').collect(),
        Some(MatchMode::Word) => text.split_whitespace().collect(),
    }
}

/// Sequence-alignment similarity ratio over token sequences, in `[0, 1]`.
///
/// Computed one-directional (submitted vs expected), as the grading
/// pipeline always has. A self-comparison yields exactly `1.0`.
pub fn similarity(submitted: &[&str], expected: &[&str]) -> f64 {
    TextDiff::from_slices(submitted, expected).ratio() as f64
}

/// Grades a single expected item against an optional submitted result.
///
/// Terminal states: no submission resolves to `error`; a kind mismatch is
/// a `failure` with no text comparison; otherwise both texts are
/// normalized with the expected item's options, tokenized, and compared,
/// with partial credit proportional to the ratio.
pub fn get_test_result(submitted: Option<CellResult>, expected: &CellResult) -> TestResult {
    let directives = &expected.directives;
    let title = directives.title.clone().unwrap_or_default();
    let total = directives.grade;

    let Some(submitted) = submitted else {
        return TestResult::builder()
            .id(expected.id.clone())
            .expected(expected.clone())
            .status(TestStatus::Error)
            .message(format!("[\"{title}\"] is not submitted."))
            .ratio(0.0)
            .grade(0.0)
            .total(total)
            .build();
    };

    if submitted.kind != expected.kind {
        return TestResult::builder()
            .id(expected.id.clone())
            .submitted(submitted)
            .expected(expected.clone())
            .status(TestStatus::Failure)
            .ratio(0.0)
            .grade(0.0)
            .total(total)
            .build();
    }

    let options = directives.normalize_options();
    let submitted_text = normalize_str(&submitted.text, &options);
    let expected_text = normalize_str(&expected.text, &options);
    let submitted_tokens = tokens(directives.match_mode, &submitted_text);
    let expected_tokens = tokens(directives.match_mode, &expected_text);

    let ratio = similarity(&submitted_tokens, &expected_tokens);
    let status = if ratio > SUCCESS_THRESHOLD {
        TestStatus::Success
    } else {
        TestStatus::Failure
    };

    TestResult::builder()
        .id(expected.id.clone())
        .submitted(submitted)
        .expected(expected.clone())
        .status(status)
        .ratio(ratio)
        .grade(total * ratio)
        .total(total)
        .build()
}

/// Grades a submitted notebook against an expected list.
///
/// Submitted cells are indexed by identifier, then additionally by any
/// directive title (a later cell with the same title wins, and a title may
/// shadow an identifier). Items whose effective title does not start with
/// `title_prefix` are skipped. Missing or mismatched items never abort the
/// report; each yields its own result.
pub fn make_report(
    nb: &Notebook,
    expected_list: &[CellResult],
    title_prefix: Option<&str>,
) -> TestReport {
    let mut cells: HashMap<String, &Cell> = HashMap::new();
    for cell in &nb.cells {
        cells.insert(cell.id.clone(), cell);
    }
    for cell in &nb.cells {
        // A submitted cell with a broken directive block contributes no
        // title key; grading stays best-effort.
        match Directives::parse(&cell.source) {
            Ok(directives) => {
                if let Some(title) = directives.title {
                    cells.insert(title, cell);
                }
            }
            Err(e) => warn!(cell = %cell.id, error = %e, "ignoring directives on submitted cell"),
        }
    }

    let mut results = Vec::new();
    let mut grade = 0.0;
    let mut total = 0.0;

    for expected in expected_list {
        let title = expected
            .directives
            .title
            .clone()
            .unwrap_or_else(|| expected.id.clone());

        if let Some(prefix) = title_prefix
            && !title.starts_with(prefix)
        {
            continue;
        }

        let submitted_cell = cells
            .get(&expected.id)
            .or_else(|| cells.get(&title))
            .copied();
        let submitted = submitted_cell.map(|cell| cell_result(&expected.directives, cell));

        let result = get_test_result(submitted, expected);
        grade += result.grade;
        total += result.total;
        results.push(result);
    }

    TestReport {
        title_prefix: title_prefix.map(str::to_string),
        results,
        grade,
        total,
    }
}
