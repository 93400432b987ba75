//! Tests for directive parsing and the closed schema.

use nbcheck::directives::{DirectiveError, Directives, MatchMode};

#[test]
fn bare_keys_mean_true() {
    let directives = Directives::parse("# @solution\n# @check\nx = 1\n").expect("parse");
    assert!(directives.solution);
    assert!(directives.check);
    assert!(!directives.master_only);
    assert!(!directives.work_unit);
    assert!(!directives.test);
}

#[test]
fn key_value_pairs_split_on_first_colon() {
    let directives = Directives::parse("# @title: part 1: warmup\n").expect("parse");
    assert_eq!(directives.title.as_deref(), Some("part 1: warmup"));
}

#[test]
fn grade_defaults_to_one() {
    let directives = Directives::parse("# @check\n").expect("parse");
    assert_eq!(directives.grade, 1.0);
}

#[test]
fn grade_parses_as_float() {
    let directives = Directives::parse("# @check\n# @grade: 2.5\n").expect("parse");
    assert_eq!(directives.grade, 2.5);
}

#[test]
fn match_mode_parses_into_closed_enum() {
    let directives = Directives::parse("# @match: line\n").expect("parse");
    assert_eq!(directives.match_mode, Some(MatchMode::Line));

    let directives = Directives::parse("# @match: word\n").expect("parse");
    assert_eq!(directives.match_mode, Some(MatchMode::Word));
}

#[test]
fn all_comment_markers_are_recognized() {
    for lead in ["#", "//", ";"] {
        let directives = Directives::parse(&format!("{lead} @solution\n")).expect("parse");
        assert!(directives.solution, "marker {lead} not recognized");
    }
}

#[test]
fn later_duplicates_overwrite_earlier_ones() {
    let directives = Directives::parse("# @grade: 1.0\n# @grade: 3.0\n").expect("parse");
    assert_eq!(directives.grade, 3.0);
}

#[test]
fn scanning_stops_at_first_non_directive_line() {
    let directives = Directives::parse("# @title: q1\nx = 1\n# @grade: 5.0\n").expect("parse");
    assert_eq!(directives.title.as_deref(), Some("q1"));
    assert_eq!(directives.grade, 1.0);
}

#[test]
fn interior_blank_lines_do_not_stop_scanning() {
    let directives = Directives::parse("# @title: q1\n\n# @grade: 2.0\nx = 1\n").expect("parse");
    assert_eq!(directives.title.as_deref(), Some("q1"));
    assert_eq!(directives.grade, 2.0);
}

#[test]
fn plain_comments_are_not_directives() {
    let directives = Directives::parse("# just a comment\n# @solution\n").expect("parse");
    assert!(!directives.solution);
}

#[test]
fn unknown_key_is_a_hard_error() {
    let err = Directives::parse("# @bogus\n").expect_err("should reject");
    assert!(matches!(err, DirectiveError::UnknownKey { .. }));
}

#[test]
fn non_numeric_grade_is_a_coercion_error() {
    let err = Directives::parse("# @grade: lots\n").expect_err("should reject");
    assert!(matches!(err, DirectiveError::InvalidValue { .. }));
}

#[test]
fn bare_title_is_rejected() {
    let err = Directives::parse("# @title\n").expect_err("should reject");
    assert!(matches!(err, DirectiveError::MissingValue { .. }));
}

#[test]
fn unknown_match_mode_is_rejected() {
    let err = Directives::parse("# @match: char\n").expect_err("should reject");
    assert!(matches!(err, DirectiveError::InvalidValue { .. }));
}

#[test]
fn boolean_values_are_coerced_explicitly() {
    let directives = Directives::parse("# @solution: false\n# @check: true\n").expect("parse");
    assert!(!directives.solution);
    assert!(directives.check);

    let err = Directives::parse("# @solution: maybe\n").expect_err("should reject");
    assert!(matches!(err, DirectiveError::InvalidValue { .. }));
}

#[test]
fn parsing_is_idempotent() {
    let source = "# @check\n# @title: q3\n# @grade: 2.0\n# @match: word\nprint(1)\n";
    let first = Directives::parse(source).expect("parse");
    let second = Directives::parse(source).expect("parse");
    assert_eq!(first, second);
}
