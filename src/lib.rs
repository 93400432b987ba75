#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # nbcheck
//!
//! A worksheet generator and autograder for Jupyter-style notebooks.
//!
//! Instructors annotate a master notebook with directives in leading
//! comment lines (`# @solution`, `# @check`, `# @grade: 2.0`, ...).
//! From that master, `nbcheck` derives a redacted student worksheet plus
//! lists of expected outputs, and later grades submissions against those
//! expectations with fuzzy, weighted matching.

/// Directive annotations parsed from cell comment blocks
pub mod directives;
/// Wrapper around the external notebook-execution engine
pub mod exec;
/// Matching submitted cells against expectations and deriving grades
pub mod grade;
/// Output canonicalization applied before comparison
pub mod normalize;
/// Typed model of the on-disk notebook format
pub mod notebook;
/// Console/file rendering of reports and expected lists
pub mod report;
/// Cell results, expected lists, and grading result types
pub mod results;
/// Worksheet and expected-list derivation from a master notebook
pub mod worksheet;
