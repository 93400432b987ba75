#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Cell results, their extraction from captured outputs, persisted
//! expected lists, and the per-item grading result types.

use std::{fmt::Display, fs, path::Path};

use anyhow::{Context, Result};
use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    directives::Directives,
    notebook::{Cell, Output, StreamName},
};

/// The kind of representative result extracted from a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellResultType {
    /// Value of the cell's last expression.
    ExecuteResult,
    /// An exception raised during execution.
    Error,
    /// Text written to standard output.
    Stdout,
    /// Text written to standard error.
    Stderr,
    /// No output of a recognized kind.
    Empty,
    /// An output this tool does not interpret.
    Unknown,
}

impl Display for CellResultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::ExecuteResult => "execute_result",
            Self::Error => "error",
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::Empty => "empty",
            Self::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// The single canonical result extracted from one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellResult {
    /// Identifier of the cell the result came from.
    pub id:         String,
    /// The directive set owning this result.
    pub directives: Directives,
    /// Extracted (and possibly normalized) output text.
    #[serde(default)]
    pub text:       String,
    /// The kind of output the text was taken from.
    #[serde(rename = "type")]
    pub kind:       CellResultType,
}

/// Extracts the representative result of a cell.
///
/// Outputs are examined in original order with a fixed precedence: the
/// first `error` wins, else the first `stream`, else the first
/// `execute_result`. A cell with no outputs, or none of a recognized
/// kind, yields an `empty` result.
pub fn cell_result(directives: &Directives, cell: &Cell) -> CellResult {
    let outputs = cell.outputs.as_deref().unwrap_or(&[]);

    let mut stream: Option<(CellResultType, String)> = None;
    let mut execute: Option<String> = None;

    for output in outputs {
        match output {
            Output::Error { ename, evalue, .. } => {
                return CellResult {
                    id:         cell.id.clone(),
                    directives: directives.clone(),
                    text:       format!("ENAME: {ename}\nEVALUE: {evalue}"),
                    kind:       CellResultType::Error,
                };
            }
            Output::Stream { name, text } => {
                if stream.is_none() {
                    let kind = match name {
                        StreamName::Stdout => CellResultType::Stdout,
                        StreamName::Stderr => CellResultType::Stderr,
                    };
                    stream = Some((kind, text.trim_end().to_string()));
                }
            }
            Output::ExecuteResult { data, .. } => {
                if execute.is_none() {
                    let text = match data.get("text/plain") {
                        Some(value) => plain_text(value),
                        None => Value::Object(data.clone()).to_string(),
                    };
                    execute = Some(text.trim_end().to_string());
                }
            }
            Output::DisplayData { .. } | Output::Unknown => {}
        }
    }

    let (kind, text) = match (stream, execute) {
        (Some((kind, text)), _) => (kind, text),
        (None, Some(text)) => (CellResultType::ExecuteResult, text),
        (None, None) => (CellResultType::Empty, String::new()),
    };

    CellResult {
        id: cell.id.clone(),
        directives: directives.clone(),
        text,
        kind,
    }
}

/// Flattens a `text/plain` MIME value to a string; nbformat may store it
/// as a single string or as a list of line strings.
fn plain_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(lines) => lines
            .iter()
            .map(|line| line.as_str().unwrap_or_default())
            .collect(),
        other => other.to_string(),
    }
}

/// Writes an expected list to a JSON file, order preserved.
pub fn write_expected(expected_list: &[CellResult], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json =
        serde_json::to_string_pretty(expected_list).context("Failed to serialize expected list")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write expected list at `{}`", path.display()))
}

/// Reads an expected list back from a JSON file.
pub fn open_expected(path: impl AsRef<Path>) -> Result<Vec<CellResult>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read expected list at `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse expected list at `{}`", path.display()))
}

/// Terminal status of one graded item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Similarity ratio above the success threshold.
    Success,
    /// Compared, but below the threshold (or kinds mismatched).
    Failure,
    /// No submitted cell could be resolved.
    Error,
}

/// Outcome of grading a single expected item.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
pub struct TestResult {
    /// Identifier of the expected cell.
    pub id:        String,
    /// The submitted result, when one was resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted: Option<CellResult>,
    /// The expected result being graded against.
    pub expected:  CellResult,
    /// Terminal status of the comparison.
    pub status:    TestStatus,
    /// Human-readable explanation of the outcome.
    #[serde(default)]
    #[builder(default)]
    pub message:   String,
    /// Similarity ratio in `[0, 1]`.
    pub ratio:     f64,
    /// Credit earned, `total × ratio`.
    pub grade:     f64,
    /// Credit possible, from the `grade` directive.
    pub total:     f64,
}

/// A full grading report over one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    /// Title prefix the report was scoped to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_prefix: Option<String>,
    /// Per-item results, in expected-list order.
    pub results:      Vec<TestResult>,
    /// Aggregate credit earned.
    pub grade:        f64,
    /// Aggregate credit possible.
    pub total:        f64,
}
