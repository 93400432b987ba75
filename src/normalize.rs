#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Canonicalization of captured output before comparison.
//!
//! Strings go through a fixed pass order: trailing trim, optional leading
//! trim, lowercasing, whitespace collapsing, blank suppression, masking of
//! volatile substrings (memory addresses, interpreter frame names, ANSI
//! escapes), and decimal truncation. Nested values are normalized leaf by
//! leaf, preserving structure.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::{Number, Value};

lazy_static! {
    /// A run of whitespace, collapsed to a single space.
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("whitespace pattern is valid");
    /// Memory-address-like substrings, e.g. `at 0x7f3b2c`.
    static ref ADDRESS: Regex = Regex::new(r"at 0x[a-f0-9]+").expect("address pattern is valid");
    /// Interpreter frame references, e.g. `<ipython-input-3-abcdef>`.
    static ref INPUT_FRAME: Regex =
        Regex::new(r"<ipython-input-[^>]*>").expect("frame pattern is valid");
    /// ANSI escape sequences.
    static ref ANSI: Regex =
        Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("ansi pattern is valid");
    /// Decimal tokens subject to precision truncation.
    static ref DECIMAL: Regex = Regex::new(r"\b(\d+)\.(\d+)\b").expect("decimal pattern is valid");
}

/// Options controlling the normalization pipeline.
///
/// The masking passes and blank suppression default on; the rest default
/// off. Derived from a cell's directives (currently always the defaults).
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOptions {
    /// Lowercase the text.
    pub lower:          bool,
    /// Collapse whitespace runs to single spaces.
    pub whitespace:     bool,
    /// Trim leading whitespace as well as trailing.
    pub strip:          bool,
    /// Mask memory addresses and interpreter frame references.
    pub mask_addresses: bool,
    /// Strip ANSI escape sequences.
    pub mask_ansi:      bool,
    /// Replace whitespace-only text with the empty string.
    pub ignore_blanks:  bool,
    /// Truncate/round decimals to this many fractional digits.
    pub round:          Option<u32>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            lower:          false,
            whitespace:     false,
            strip:          false,
            mask_addresses: true,
            mask_ansi:      true,
            ignore_blanks:  true,
            round:          None,
        }
    }
}

/// Normalizes a single string through the full pass order.
pub fn normalize_str(data: &str, options: &NormalizeOptions) -> String {
    let mut data = data.trim_end().to_string();

    if options.strip {
        data = data.trim_start().to_string();
    }
    if options.lower {
        data = data.to_lowercase();
    }
    if options.whitespace {
        data = WHITESPACE_RUN.replace_all(&data, " ").into_owned();
    }
    if options.ignore_blanks && data.chars().all(char::is_whitespace) {
        data.clear();
    }
    if options.mask_addresses {
        data = ADDRESS.replace_all(&data, "at 0x***").into_owned();
        data = INPUT_FRAME
            .replace_all(&data, "<ipython-input-***>")
            .into_owned();
    }
    if options.mask_ansi {
        data = ANSI.replace_all(&data, "").into_owned();
    }
    if let Some(digits) = options.round {
        data = truncate_decimals(&data, digits as usize);
    }

    data
}

/// Truncates the fractional part of every decimal token to `digits`,
/// right-padding with spaces so column alignment is preserved. The integer
/// part is kept whole. Idempotent once applied.
fn truncate_decimals(data: &str, digits: usize) -> String {
    DECIMAL
        .replace_all(data, |caps: &Captures| {
            let (integer, fraction) = (&caps[1], &caps[2]);
            if fraction.len() > digits {
                format!(
                    "{}.{}{}",
                    integer,
                    &fraction[..digits],
                    " ".repeat(fraction.len() - digits)
                )
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Recursively normalizes a nested value.
///
/// Strings go through [`normalize_str`]; non-integer numeric leaves are
/// rounded (not truncated) when `round` is set; sequences and mappings are
/// normalized element by element with order and keys preserved. Everything
/// else passes through unchanged.
pub fn normalize_value(data: Value, options: &NormalizeOptions) -> Value {
    match data {
        Value::String(text) => Value::String(normalize_str(&text, options)),
        Value::Number(number) => {
            if let Some(digits) = options.round
                && number.is_f64()
                && let Some(float) = number.as_f64()
            {
                let factor = 10f64.powi(digits as i32);
                let rounded = (float * factor).round() / factor;
                Number::from_f64(rounded)
                    .map(Value::Number)
                    .unwrap_or(Value::Number(number))
            } else {
                Value::Number(number)
            }
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| normalize_value(item, options))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, normalize_value(value, options)))
                .collect(),
        ),
        other => other,
    }
}
