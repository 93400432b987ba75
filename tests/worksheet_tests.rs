//! Tests for worksheet derivation and expected-list generation.

use nbcheck::{
    notebook::{CellKind, Notebook},
    results::CellResultType,
    worksheet::{make_expected_list, make_worksheet},
};
use serde_json::{Value, json};

fn notebook(kernel: &str, cells: Value) -> Notebook {
    serde_json::from_value(json!({
        "nbformat": 4,
        "nbformat_minor": 5,
        "metadata": {"kernelspec": {"name": kernel, "display_name": kernel}},
        "cells": cells,
    }))
    .expect("parse notebook")
}

fn code_cell(id: &str, source: &str) -> Value {
    json!({
        "id": id,
        "cell_type": "code",
        "source": source,
        "metadata": {},
        "execution_count": 7,
        "outputs": [{"output_type": "stream", "name": "stdout", "text": "old output\n"}],
    })
}

#[test]
fn solution_cells_are_omitted() {
    let master = notebook(
        "python3",
        json!([
            code_cell("s1", "# @solution\nanswer = 42\n"),
            code_cell("k1", "print('kept')\n"),
        ]),
    );

    let worksheet = make_worksheet(&master).expect("worksheet");
    assert_eq!(worksheet.cells.len(), 1);
    assert_eq!(worksheet.cells[0].id, "k1");
}

#[test]
fn master_only_and_blank_cells_are_omitted() {
    let master = notebook(
        "python3",
        json!([
            code_cell("m1", "# @masterOnly\nsetup()\n"),
            code_cell("b1", "   \n"),
            code_cell("k1", "print('kept')\n"),
        ]),
    );

    let worksheet = make_worksheet(&master).expect("worksheet");
    let ids: Vec<_> = worksheet.cells.iter().map(|cell| cell.id.as_str()).collect();
    assert_eq!(ids, ["k1"]);
}

#[test]
fn kept_code_cells_are_locked_and_cleaned() {
    let master = notebook("python3", json!([code_cell("k1", "print('kept')\n")]));

    let worksheet = make_worksheet(&master).expect("worksheet");
    let cell = &worksheet.cells[0];
    assert!(cell.source.starts_with("# 🔒\n"));
    assert_eq!(cell.metadata.get("editable"), Some(&json!(false)));
    assert_eq!(cell.outputs, Some(vec![]));
    assert_eq!(cell.execution_count, None);
}

#[test]
fn work_units_become_fresh_writable_code_cells() {
    let master = notebook(
        "python3",
        json!([code_cell("w1", "# @workUnit\n# your code here\n")]),
    );

    let worksheet = make_worksheet(&master).expect("worksheet");
    let cell = &worksheet.cells[0];
    assert_ne!(cell.id, "w1", "work units get a fresh identifier");
    assert_eq!(cell.cell_type, CellKind::Code);
    assert!(cell.source.starts_with("# ✍️\n"));
    assert!(cell.metadata.get("editable").is_none());
    assert_eq!(cell.execution_count, None);
}

#[test]
fn markdown_cells_are_locked_but_not_marked() {
    let master = notebook(
        "python3",
        json!([{
            "id": "md1",
            "cell_type": "markdown",
            "source": "## Section\n",
            "metadata": {},
        }]),
    );

    let worksheet = make_worksheet(&master).expect("worksheet");
    let cell = &worksheet.cells[0];
    assert_eq!(cell.source, "## Section\n");
    assert_eq!(cell.metadata.get("editable"), Some(&json!(false)));
}

#[test]
fn unknown_cell_types_pass_through_unchanged() {
    let master = notebook(
        "python3",
        json!([{
            "id": "x1",
            "cell_type": "widget",
            "source": "whatever\n",
            "metadata": {"keep": true},
        }]),
    );

    let worksheet = make_worksheet(&master).expect("worksheet");
    assert_eq!(worksheet.cells[0], master.cells[0]);
}

#[test]
fn comment_lead_follows_the_kernel() {
    let master = notebook("kotlin", json!([code_cell("k1", "println(1)\n")]));
    let worksheet = make_worksheet(&master).expect("worksheet");
    assert!(worksheet.cells[0].source.starts_with("// 🔒\n"));

    let master = notebook("clojure-1.11", json!([code_cell("k1", "(println 1)\n")]));
    let worksheet = make_worksheet(&master).expect("worksheet");
    assert!(worksheet.cells[0].source.starts_with("; 🔒\n"));
}

#[test]
fn cell_order_is_preserved() {
    let master = notebook(
        "python3",
        json!([
            code_cell("a", "print('a')\n"),
            code_cell("s", "# @solution\nx = 1\n"),
            code_cell("b", "print('b')\n"),
            code_cell("c", "print('c')\n"),
        ]),
    );

    let worksheet = make_worksheet(&master).expect("worksheet");
    let ids: Vec<_> = worksheet.cells.iter().map(|cell| cell.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
}

#[test]
fn invalid_directives_abort_generation() {
    let master = notebook("python3", json!([code_cell("bad", "# @bogus\nx = 1\n")]));
    assert!(make_worksheet(&master).is_err());
    assert!(make_expected_list(&master, false).is_err());
}

#[test]
fn checks_and_tests_modes_select_different_cells() {
    let master = notebook(
        "python3",
        json!([
            code_cell("c1", "# @check\nprint(5)\n"),
            code_cell("t1", "# @test\nprint(6)\n"),
            code_cell("p1", "print('plain')\n"),
        ]),
    );

    let checks = make_expected_list(&master, false).expect("checks");
    let ids: Vec<_> = checks.iter().map(|result| result.id.as_str()).collect();
    assert_eq!(ids, ["c1"]);

    let tests = make_expected_list(&master, true).expect("tests");
    let ids: Vec<_> = tests.iter().map(|result| result.id.as_str()).collect();
    assert_eq!(ids, ["c1", "t1"]);
}

#[test]
fn expected_results_are_normalized() {
    let master = notebook(
        "python3",
        json!([code_cell("c1", "# @check\nprint(5)\n")]),
    );

    let expected_list = make_expected_list(&master, false).expect("checks");
    assert_eq!(expected_list.len(), 1);
    assert_eq!(expected_list[0].kind, CellResultType::Stdout);
    // Trailing newline trimmed by normalization.
    assert_eq!(expected_list[0].text, "old output");
}
