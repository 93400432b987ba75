#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Directive annotations embedded in leading comment lines of cells.
//!
//! A directive line is a comment marker (`#`, `//` or `;`), whitespace, an
//! `@`, and either a bare key (`@solution`) or a `key: value` pair
//! (`@grade: 2.0`). The set of recognized keys is closed; anything else is
//! a [`DirectiveError`].

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::normalize::NormalizeOptions;

lazy_static! {
    /// Comment marker, whitespace, `@`, then the directive definition.
    static ref DIRECTIVE_LINE: Regex =
        Regex::new(r"^(?:#|//|;)\s+@(.*)").expect("directive pattern is valid");
}

/// Error raised while parsing a cell's directive block.
#[derive(thiserror::Error, Debug)]
pub enum DirectiveError {
    /// The key is not part of the directive schema.
    #[error("unrecognized directive key `{key}`")]
    UnknownKey {
        /// The offending key.
        key: String,
    },
    /// The key requires an explicit `key: value` form.
    #[error("directive `{key}` requires a value")]
    MissingValue {
        /// The offending key.
        key: String,
    },
    /// The value could not be coerced to the field's declared type.
    #[error("directive `{key}` expects {expected}, got `{value}`")]
    InvalidValue {
        /// The offending key.
        key:      String,
        /// Human-readable description of the expected type.
        expected: &'static str,
        /// The value as written in the cell.
        value:    String,
    },
}

/// Tokenization mode used when comparing submitted and expected text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Compare line by line.
    Line,
    /// Compare word by word.
    Word,
}

/// The validated directive set of a single cell.
///
/// Every field maps to a directive key; unknown keys are rejected at parse
/// time rather than silently carried along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directives {
    /// Cell holds a solution; omitted from worksheets.
    #[serde(default)]
    pub solution:    bool,
    /// Cell is for the master only; omitted from worksheets.
    #[serde(default, rename = "masterOnly")]
    pub master_only: bool,
    /// Cell is a student work area.
    #[serde(default, rename = "workUnit")]
    pub work_unit:   bool,
    /// Cell is a graded check (formative).
    #[serde(default)]
    pub check:       bool,
    /// Cell is a graded test (summative).
    #[serde(default)]
    pub test:        bool,
    /// Human-readable title, also used as a fallback lookup key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title:       Option<String>,
    /// Weight of the cell when graded.
    #[serde(default = "default_grade")]
    pub grade:       f64,
    /// Tokenization mode for comparison.
    #[serde(default, rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_mode:  Option<MatchMode>,
    /// Normalization overrides; accepted but not yet interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalize:   Option<String>,
}

/// Default weight of a graded cell.
fn default_grade() -> f64 {
    1.0
}

impl Default for Directives {
    fn default() -> Self {
        Self {
            solution:    false,
            master_only: false,
            work_unit:   false,
            check:       false,
            test:        false,
            title:       None,
            grade:       default_grade(),
            match_mode:  None,
            normalize:   None,
        }
    }
}

impl Directives {
    /// Extracts the directive set from a cell's source text.
    ///
    /// Blank lines are filtered out, then the leading run of directive
    /// lines is consumed; the first non-matching line ends the scan. Later
    /// duplicates overwrite earlier ones.
    pub fn parse(source: &str) -> Result<Self, DirectiveError> {
        let mut directives = Self::default();

        for line in source.lines().filter(|line| !line.trim().is_empty()) {
            let Some(captures) = DIRECTIVE_LINE.captures(line) else {
                break;
            };
            let entry = captures[1].trim();
            let (key, value) = match entry.split_once(':') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (entry, None),
            };
            directives.apply(key, value)?;
        }

        Ok(directives)
    }

    /// Applies a single `key`/`value` entry, coercing per declared type.
    fn apply(&mut self, key: &str, value: Option<&str>) -> Result<(), DirectiveError> {
        match key {
            "solution" => self.solution = bool_value(key, value)?,
            "masterOnly" => self.master_only = bool_value(key, value)?,
            "workUnit" => self.work_unit = bool_value(key, value)?,
            "check" => self.check = bool_value(key, value)?,
            "test" => self.test = bool_value(key, value)?,
            "title" => self.title = Some(string_value(key, value)?),
            "grade" => self.grade = float_value(key, value)?,
            "match" => self.match_mode = Some(match_value(key, value)?),
            "normalize" => self.normalize = Some(string_value(key, value)?),
            _ => {
                return Err(DirectiveError::UnknownKey {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Normalization options for this cell.
    // TODO: derive options from the `normalize` directive once its grammar
    // is settled; for now every cell gets the defaults.
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions::default()
    }
}

/// Coerces a directive entry to a boolean; a bare key means `true`.
fn bool_value(key: &str, value: Option<&str>) -> Result<bool, DirectiveError> {
    match value {
        None => Ok(true),
        Some("true") | Some("True") | Some("1") => Ok(true),
        Some("false") | Some("False") | Some("0") => Ok(false),
        Some(other) => Err(DirectiveError::InvalidValue {
            key:      key.to_string(),
            expected: "a boolean",
            value:    other.to_string(),
        }),
    }
}

/// Requires an explicit string value.
fn string_value(key: &str, value: Option<&str>) -> Result<String, DirectiveError> {
    value
        .map(str::to_string)
        .ok_or_else(|| DirectiveError::MissingValue {
            key: key.to_string(),
        })
}

/// Requires a value that parses as a float.
fn float_value(key: &str, value: Option<&str>) -> Result<f64, DirectiveError> {
    let value = value.ok_or_else(|| DirectiveError::MissingValue {
        key: key.to_string(),
    })?;
    value
        .parse::<f64>()
        .map_err(|_| DirectiveError::InvalidValue {
            key:      key.to_string(),
            expected: "a number",
            value:    value.to_string(),
        })
}

/// Requires a value naming a [`MatchMode`].
fn match_value(key: &str, value: Option<&str>) -> Result<MatchMode, DirectiveError> {
    let value = value.ok_or_else(|| DirectiveError::MissingValue {
        key: key.to_string(),
    })?;
    match value {
        "line" => Ok(MatchMode::Line),
        "word" => Ok(MatchMode::Word),
        other => Err(DirectiveError::InvalidValue {
            key:      key.to_string(),
            expected: "`line` or `word`",
            value:    other.to_string(),
        }),
    }
}
