#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # nbcheck
//!
//! Command surface for the notebook worksheet generator and autograder.
//!
//! `generate` turns `master.ipynb` into a redacted `worksheet.ipynb` plus
//! `checks.json`/`tests.json` expected lists. `check` grades a worksheet
//! against the checks. `test` grades against the tests for one student and
//! prints a `name,grade,total` summary line.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use bpaf::*;
use nbcheck::{
    exec::{ExecuteOptions, execute_notebook},
    grade::make_report,
    notebook::{open_notebook, write_notebook},
    report::{print_expected, print_report, write_report},
    results::{open_expected, write_expected},
    worksheet::{make_expected_list, make_worksheet},
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Generate worksheet and expected lists from a master notebook
    Generate {
        /// Path to the master notebook
        master: PathBuf,
    },
    /// Grade a worksheet against the formative checks
    Check {
        /// Path to the expected list
        expected: PathBuf,
        /// Path to the submitted notebook
        notebook: PathBuf,
        /// Execute the notebook before grading
        execute:  bool,
        /// Per-cell execution timeout in seconds
        timeout:  Option<u64>,
        /// Only grade items whose title starts with this prefix
        prefix:   Option<String>,
    },
    /// Grade a submission against the summative tests
    Test {
        /// Path to the expected list
        expected:   PathBuf,
        /// Path to the submitted notebook
        notebook:   PathBuf,
        /// Directory to write the per-student report file into
        report_dir: Option<PathBuf>,
        /// Execute the notebook before grading
        execute:    bool,
        /// Per-cell execution timeout in seconds
        timeout:    Option<u64>,
        /// Student identifier for the summary line
        student:    String,
    },
    /// Print an expected list for inspection
    Show {
        /// Path to the expected list
        expected: PathBuf,
    },
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses the expected-list path with the given default
    fn expected_arg(default: &'static str) -> impl Parser<PathBuf> {
        long("expected")
            .help("Path to the expected list")
            .argument::<PathBuf>("FILE")
            .fallback(PathBuf::from(default))
    }

    /// parses the submitted notebook path
    fn notebook_arg() -> impl Parser<PathBuf> {
        long("notebook")
            .help("Path to the submitted notebook")
            .argument::<PathBuf>("FILE")
            .fallback(PathBuf::from("worksheet.ipynb"))
    }

    /// parses the execute switch
    fn execute_arg() -> impl Parser<bool> {
        long("execute")
            .help("Execute the notebook before grading")
            .switch()
    }

    /// parses the execution timeout
    fn timeout_arg() -> impl Parser<Option<u64>> {
        long("timeout")
            .help("Per-cell execution timeout in seconds")
            .argument::<u64>("SECS")
            .optional()
    }

    let generate = {
        let master = long("master")
            .help("Path to the master notebook")
            .argument::<PathBuf>("FILE")
            .fallback(PathBuf::from("master.ipynb"));
        construct!(Cmd::Generate { master })
            .to_options()
            .command("generate")
            .help("Generate worksheet.ipynb, checks.json and tests.json")
    };

    let check = {
        let expected = expected_arg("checks.json");
        let notebook = notebook_arg();
        let execute = execute_arg();
        let timeout = timeout_arg();
        let prefix = positional::<String>("PREFIX")
            .help("Only grade items whose title starts with this prefix")
            .optional();
        construct!(Cmd::Check {
            expected,
            notebook,
            execute,
            timeout,
            prefix,
        })
        .to_options()
        .command("check")
        .help("Grade a worksheet against the formative checks")
    };

    let test = {
        let expected = expected_arg("tests.json");
        let notebook = notebook_arg();
        let report_dir = long("report-dir")
            .help("Directory to write the per-student report file into")
            .argument::<PathBuf>("DIR")
            .optional();
        let execute = execute_arg();
        let timeout = timeout_arg();
        let student = positional::<String>("STUDENT").help("Student identifier");
        construct!(Cmd::Test {
            expected,
            notebook,
            report_dir,
            execute,
            timeout,
            student,
        })
        .to_options()
        .command("test")
        .help("Grade a submission against the summative tests")
    };

    let show = {
        let expected = expected_arg("checks.json");
        construct!(Cmd::Show { expected })
            .to_options()
            .command("show")
            .help("Print an expected list for inspection")
    };

    let cmd = construct!([generate, check, test, show]);

    cmd.to_options()
        .descr("Worksheet generator and autograder for notebooks")
        .run()
}

/// Runs the generation workflow for a master notebook.
fn generate(master_path: &Path) -> Result<()> {
    let master = open_notebook(master_path)?;
    let worksheet = make_worksheet(&master)?;
    let checks = make_expected_list(&master, false)?;
    let tests = make_expected_list(&master, true)?;

    println!("> worksheet.ipynb");
    write_notebook(&worksheet, "worksheet.ipynb")?;

    println!("> checks.json");
    write_expected(&checks, "checks.json")?;

    println!("> tests.json");
    write_expected(&tests, "tests.json")?;
    Ok(())
}

/// Opens a submission, optionally executing it first.
fn open_submission(
    notebook: &Path,
    execute: bool,
    timeout: Option<u64>,
) -> Result<nbcheck::notebook::Notebook> {
    let nb = open_notebook(notebook)?;
    if execute {
        let options = ExecuteOptions {
            timeout: timeout.map(Duration::from_secs),
            ..Default::default()
        };
        execute_notebook(&nb, &options)
    } else {
        Ok(nb)
    }
}

/// Grades a worksheet against the checks and prints the report.
fn check(
    expected: &Path,
    notebook: &Path,
    execute: bool,
    timeout: Option<u64>,
    prefix: Option<&str>,
) -> Result<()> {
    let expected_list = open_expected(expected)?;
    let nb = open_submission(notebook, execute, timeout)?;

    let prefix = prefix.filter(|prefix| !prefix.is_empty());
    let report = make_report(&nb, &expected_list, prefix);
    print_report(&report);
    Ok(())
}

/// Grades a submission against the tests for one student.
fn test(
    expected: &Path,
    notebook: &Path,
    report_dir: Option<&Path>,
    execute: bool,
    timeout: Option<u64>,
    student: &str,
) -> Result<()> {
    let expected_list = open_expected(expected)?;
    let nb = open_submission(notebook, execute, timeout)?;

    let report = make_report(&nb, &expected_list, None);

    if let Some(dir) = report_dir {
        let path = dir.join(format!("{student}.report"));
        let mut file = fs::File::create(&path)
            .with_context(|| format!("Failed to create report file at `{}`", path.display()))?;
        write_report(&report, &mut file)?;
    } else {
        print_report(&report);
    }

    println!("{},{},{}", student, report.grade, report.total);
    Ok(())
}

fn main() {
    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let outcome = match options() {
        Cmd::Generate { master } => generate(&master),
        Cmd::Check {
            expected,
            notebook,
            execute,
            timeout,
            prefix,
        } => check(&expected, &notebook, execute, timeout, prefix.as_deref()),
        Cmd::Test {
            expected,
            notebook,
            report_dir,
            execute,
            timeout,
            student,
        } => test(
            &expected,
            &notebook,
            report_dir.as_deref(),
            execute,
            timeout,
            &student,
        ),
        Cmd::Show { expected } => open_expected(&expected).map(|list| print_expected(&list)),
    };

    // Failures are reported, not thrown; the next invocation can retry.
    if let Err(e) = outcome {
        eprintln!("Error:");
        eprintln!("{e:#}");
    }
}
