#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Thin wrapper around the external notebook-execution engine.
//!
//! Execution itself is delegated to `jupyter nbconvert --execute`; this
//! module only round-trips the document through a scratch file. Per-cell
//! execution errors are tolerated by the engine (`--allow-errors`) so a
//! broken cell never aborts the whole run.

use std::{path::PathBuf, process::Command, time::Duration};

use anyhow::{Context, Result, bail};

use crate::notebook::{Notebook, open_notebook, write_notebook};

/// Knobs forwarded to the execution engine.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Per-cell execution timeout.
    pub timeout:     Option<Duration>,
    /// Directory to execute in; affects relative paths in cells.
    pub working_dir: Option<PathBuf>,
    /// Kernel override; defaults to the notebook's own kernelspec.
    pub kernel:      Option<String>,
}

/// Executes all code cells of a notebook and returns the executed copy
/// with outputs populated.
pub fn execute_notebook(nb: &Notebook, options: &ExecuteOptions) -> Result<Notebook> {
    let jupyter = which::which("jupyter")
        .context("Could not find jupyter. Please ensure it is installed and on PATH.")?;

    let scratch = tempfile::tempdir().context("Failed to create scratch directory")?;
    let input = scratch.path().join("input.ipynb");
    let output = scratch.path().join("executed.ipynb");
    write_notebook(nb, &input)?;

    let mut cmd = Command::new(jupyter);
    cmd.arg("nbconvert")
        .arg("--to")
        .arg("notebook")
        .arg("--execute")
        .arg("--allow-errors")
        .arg("--output")
        .arg("executed")
        .arg("--output-dir")
        .arg(scratch.path());

    if let Some(timeout) = options.timeout {
        cmd.arg(format!("--ExecutePreprocessor.timeout={}", timeout.as_secs()));
    }
    if let Some(kernel) = &options.kernel {
        cmd.arg(format!("--ExecutePreprocessor.kernel_name={kernel}"));
    }
    if let Some(working_dir) = &options.working_dir {
        cmd.current_dir(working_dir);
    }
    cmd.arg(&input);

    tracing::debug!("executing notebook via {:?}", cmd);
    let collected = cmd.output().context("Failed to run jupyter nbconvert")?;

    if !collected.status.success() {
        bail!(
            "notebook execution failed: {}",
            String::from_utf8_lossy(&collected.stderr).trim()
        );
    }

    open_notebook(&output)
}
