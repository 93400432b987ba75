#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Derives student-facing worksheets and expected-output lists from a
//! master notebook.

use anyhow::{Context, Result};

use crate::{
    directives::Directives,
    normalize::normalize_str,
    notebook::{Cell, CellKind, Notebook},
    results::{CellResult, cell_result},
};

/// Marker prepended to student work areas.
const WRITABLE_MARKER: &str = "✍️";
/// Marker prepended to locked cells.
const LOCKED_MARKER: &str = "🔒";

/// Builds the redacted worksheet for a master notebook.
///
/// Solution, master-only, and blank code/raw cells are omitted. Remaining
/// code/raw cells lose their outputs and execution counters; work units
/// become fresh plain code cells with a writable marker, everything else
/// is locked with a locked marker. Markdown cells are locked as-is. Cell
/// order is preserved.
pub fn make_worksheet(master: &Notebook) -> Result<Notebook> {
    let lead = master.comment_lead();
    let mut worksheet = master.clone();
    worksheet.cells = Vec::new();

    for cell in &master.cells {
        let new_cell = match &cell.cell_type {
            CellKind::Code | CellKind::Raw => {
                let directives = Directives::parse(&cell.source)
                    .with_context(|| format!("Invalid directives in cell `{}`", cell.id))?;

                if directives.solution || directives.master_only || cell.is_blank() {
                    continue;
                }

                let mut new_cell = if directives.work_unit {
                    work_unit_to_code(cell)
                } else {
                    cell.clone()
                };
                new_cell.clear_outputs();

                if directives.work_unit {
                    new_cell.source = format!("{lead} {WRITABLE_MARKER}\n{}", new_cell.source);
                } else {
                    new_cell.lock();
                    new_cell.source = format!("{lead} {LOCKED_MARKER}\n{}", new_cell.source);
                }
                new_cell
            }
            CellKind::Markdown => {
                let mut new_cell = cell.clone();
                new_cell.lock();
                new_cell
            }
            CellKind::Other(_) => cell.clone(),
        };
        worksheet.cells.push(new_cell);
    }

    Ok(worksheet)
}

/// Converts a work-unit cell into a fresh plain code cell, retaining only
/// source and metadata. The fresh cell gets a new identifier, so grading
/// resolves work units by title rather than by id.
fn work_unit_to_code(cell: &Cell) -> Cell {
    let mut new_cell = Cell::new_code();
    new_cell.source = cell.source.clone();
    new_cell.metadata = cell.metadata.clone();
    new_cell
}

/// Walks a master notebook and collects the expected results of its
/// graded cells, in document order.
///
/// Cells with `check` are always included; cells with `test` are included
/// when `include_tests` is set. Each result's text is normalized with the
/// options derived from its own directives.
pub fn make_expected_list(master: &Notebook, include_tests: bool) -> Result<Vec<CellResult>> {
    let mut expected_list = Vec::new();

    for cell in &master.cells {
        let directives = Directives::parse(&cell.source)
            .with_context(|| format!("Invalid directives in cell `{}`", cell.id))?;

        if directives.check || (include_tests && directives.test) {
            let mut result = cell_result(&directives, cell);
            result.text = normalize_str(&result.text, &directives.normalize_options());
            expected_list.push(result);
        }
    }

    Ok(expected_list)
}
