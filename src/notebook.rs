#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Typed model of the on-disk notebook document format (nbformat v4).
//!
//! The rest of the crate only ever talks to notebooks through this schema;
//! presence checks on semi-structured data become `Option` fields here.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Accepts nbformat's two text representations: a single string, or a list
/// of line strings that concatenates to one.
pub(crate) mod multiline {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Joins the list representation into a single string on read.
    pub fn deserialize<'de, D>(de: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        /// The two shapes nbformat uses for text fields.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            /// Already a single string.
            One(String),
            /// A list of line strings, each retaining its newline.
            Many(Vec<String>),
        }

        Ok(match Repr::deserialize(de)? {
            Repr::One(text) => text,
            Repr::Many(lines) => lines.concat(),
        })
    }

    /// Always writes the single-string representation.
    pub fn serialize<S>(value: &str, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ser.serialize_str(value)
    }
}

/// The type of a notebook cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    /// Executable code cell.
    Code,
    /// Markdown prose cell.
    Markdown,
    /// Raw cell, passed through converters untouched.
    Raw,
    /// Any cell type this tool does not interpret.
    #[serde(untagged)]
    Other(String),
}

/// Which stream a `stream` output was written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamName {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

/// A single captured output record of a code cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    /// Text written to stdout or stderr.
    Stream {
        /// The stream the text was written to.
        name: StreamName,
        /// The captured text.
        #[serde(default, with = "multiline")]
        text: String,
    },
    /// The value of the last expression in the cell.
    ExecuteResult {
        /// MIME bundle of representations, keyed by MIME type.
        #[serde(default)]
        data:            Map<String, Value>,
        /// Output-level metadata.
        #[serde(default)]
        metadata:        Map<String, Value>,
        /// Execution counter at the time the result was produced.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        execution_count: Option<i64>,
    },
    /// An exception raised while executing the cell.
    Error {
        /// Exception name.
        ename:     String,
        /// Exception value/message.
        evalue:    String,
        /// Rendered traceback lines.
        #[serde(default)]
        traceback: Vec<String>,
    },
    /// Rich display output (images, HTML, and the like).
    DisplayData {
        /// MIME bundle of representations, keyed by MIME type.
        #[serde(default)]
        data:     Map<String, Value>,
        /// Output-level metadata.
        #[serde(default)]
        metadata: Map<String, Value>,
    },
    /// Any output type this tool does not interpret.
    #[serde(other)]
    Unknown,
}

/// A single notebook cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Stable cell identifier (nbformat >= 4.5).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id:              String,
    /// The type of the cell.
    pub cell_type:       CellKind,
    /// Source text of the cell.
    #[serde(default, with = "multiline")]
    pub source:          String,
    /// Cell-level metadata.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata:        Map<String, Value>,
    /// Captured outputs; present on code cells only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs:         Option<Vec<Output>>,
    /// Execution counter; present on code cells only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_count: Option<i64>,
}

impl Cell {
    /// Creates a fresh, empty code cell with a new identifier.
    pub fn new_code() -> Self {
        Self {
            id:              Uuid::new_v4().to_string(),
            cell_type:       CellKind::Code,
            source:          String::new(),
            metadata:        Map::new(),
            outputs:         Some(Vec::new()),
            execution_count: None,
        }
    }

    /// Whether the cell's source is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// Clears captured outputs and the execution counter.
    pub fn clear_outputs(&mut self) {
        if self.outputs.is_some() {
            self.outputs = Some(Vec::new());
        }
        self.execution_count = None;
    }

    /// Marks the cell non-editable in supporting frontends.
    pub fn lock(&mut self) {
        self.metadata.insert("editable".to_string(), Value::Bool(false));
    }
}

/// Kernel specification recorded in the notebook's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelSpec {
    /// Kernel name, e.g. `python3` or `kotlin`.
    pub name: String,
    /// Remaining kernelspec fields, preserved as-is.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Document-level notebook metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotebookMetadata {
    /// The kernel the notebook was authored against, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernelspec: Option<KernelSpec>,
    /// Remaining metadata fields, preserved as-is.
    #[serde(flatten)]
    pub rest:       Map<String, Value>,
}

/// An ordered-cell notebook document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    /// Major format version.
    #[serde(default = "default_nbformat")]
    pub nbformat:       u32,
    /// Minor format version.
    #[serde(default = "default_nbformat_minor")]
    pub nbformat_minor: u32,
    /// Document-level metadata.
    #[serde(default)]
    pub metadata:       NotebookMetadata,
    /// The cells, in document order.
    #[serde(default)]
    pub cells:          Vec<Cell>,
}

/// Major format version written by this tool.
fn default_nbformat() -> u32 {
    4
}

/// Minor format version written by this tool.
fn default_nbformat_minor() -> u32 {
    5
}

impl Notebook {
    /// Comment lead characters for the notebook's kernel language.
    pub fn comment_lead(&self) -> &'static str {
        let Some(kernel) = self.metadata.kernelspec.as_ref() else {
            return "#";
        };
        let name = kernel.name.to_lowercase();
        if name.contains("java") || name.contains("kotlin") || name.contains("scala") {
            "//"
        } else if name.contains("clojure") {
            ";"
        } else {
            "#"
        }
    }
}

/// Opens a notebook from the given path.
pub fn open_notebook(path: impl AsRef<Path>) -> Result<Notebook> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read notebook at `{}`", path.display()))?;
    let nb: Notebook = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse notebook at `{}`", path.display()))?;
    tracing::debug!("[{}] with {} cells.", path.display(), nb.cells.len());
    Ok(nb)
}

/// Writes a notebook to the given path.
pub fn write_notebook(nb: &Notebook, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(nb).context("Failed to serialize notebook")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write notebook at `{}`", path.display()))
}
