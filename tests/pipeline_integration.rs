//! Integration tests for the full coverage pipeline.
//!
//! These tests drive the real frontend over the testdata fixture and
//! validate the end-to-end behavior: catalog filtering, call attribution,
//! ignore-list handling, and the compilation-database path.

use std::collections::BTreeSet;
use std::path::PathBuf;

use visitcheck::check::Checker;
use visitcheck::cli::{DEFAULT_UNIT_MARKER, DEFAULT_VISITOR_MARKER};
use visitcheck::{ignore, parser, report};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn fixture_model() -> visitcheck::ProgramModel {
    let source = testdata_path().join("widget_visitor.cpp");
    parser::parse_source(&source).expect("fixture should parse")
}

#[test]
fn test_uncovered_accessor_is_the_only_violation() {
    let model = fixture_model();
    let result = Checker::new(DEFAULT_VISITOR_MARKER).run(&model, &BTreeSet::new());

    // getId and size are called; getWeight is not. getLocation is
    // filtered by return type, begin/end_children by name, setId is
    // non-const, classof is static, secret is private. FancyWidget is
    // not an API class because VisitPair takes two parameters.
    assert_eq!(result.violations, vec!["demo::Widget::getWeight"]);
    assert!(!result.passed());
}

#[test]
fn test_ignore_list_clears_the_run() {
    let model = fixture_model();
    let ignored = ignore::load(&testdata_path().join("ignore.txt")).expect("ignore list loads");
    let result = Checker::new(DEFAULT_VISITOR_MARKER).run(&model, &ignored);

    assert!(result.passed());
    assert_eq!(result.visitor_count, 2);
    assert_eq!(result.api_class_count, 1);
}

#[test]
fn test_runs_are_idempotent() {
    let model = fixture_model();
    let checker = Checker::new(DEFAULT_VISITOR_MARKER);

    let first = checker.run(&model, &BTreeSet::new());
    let second = checker.run(&model, &BTreeSet::new());
    assert_eq!(first.violations, second.violations);
}

#[test]
fn test_violations_feed_back_as_ignore_entries() {
    let model = fixture_model();
    let checker = Checker::new(DEFAULT_VISITOR_MARKER);

    let first = checker.run(&model, &BTreeSet::new());
    let grown: BTreeSet<String> = first.violations.into_iter().collect();
    let second = checker.run(&model, &grown);

    assert!(second.passed());
}

#[test]
fn test_zero_visitor_match_is_a_silent_pass() {
    // No function matches this marker: empty catalog, no violations,
    // success. Expected behavior, not a false negative - the CLI warns
    // but exits 0.
    let model = fixture_model();
    let result = Checker::new("NoSuchVisitor::Visit").run(&model, &BTreeSet::new());

    assert!(result.passed());
    assert_eq!(result.visitor_count, 0);
    assert_eq!(result.api_class_count, 0);
}

#[test]
fn test_report_lists_header_and_names() {
    let model = fixture_model();
    let result = Checker::new(DEFAULT_VISITOR_MARKER).run(&model, &BTreeSet::new());

    let mut buf = Vec::new();
    report::write_violations(&mut buf, &result.violations).unwrap();
    let output = String::from_utf8(buf).unwrap();

    assert!(output.starts_with(report::HEADER));
    assert!(output.contains("demo::Widget::getWeight"));
}

#[test]
fn test_compilation_database_mode_finds_the_marked_unit() {
    let temp = tempfile::TempDir::new().unwrap();
    let fixture = testdata_path().join("widget_visitor.cpp");

    // Two entries; only the one ending with the unit marker is analyzed.
    let db = format!(
        r#"[
            {{"directory": "/build", "file": "/src/unrelated.cpp", "command": "c++ -c unrelated.cpp"}},
            {{"directory": "{dir}", "file": "widget_visitor.cpp", "command": "c++ -c widget_visitor.cpp"}}
        ]"#,
        dir = fixture.parent().unwrap().display()
    );
    std::fs::write(temp.path().join("compile_commands.json"), db).unwrap();

    let commands = parser::load_database(temp.path()).unwrap();
    let unit = parser::find_unit(&commands, "widget_visitor.cpp").unwrap();
    let model = parser::parse_source(&unit.source_path()).unwrap();
    let result = Checker::new(DEFAULT_VISITOR_MARKER).run(&model, &BTreeSet::new());

    assert_eq!(result.violations, vec!["demo::Widget::getWeight"]);
}

#[test]
fn test_compilation_database_without_marked_unit_is_fatal() {
    let temp = tempfile::TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("compile_commands.json"),
        r#"[{"directory": "/build", "file": "/src/unrelated.cpp", "command": "c++"}]"#,
    )
    .unwrap();

    let commands = parser::load_database(temp.path()).unwrap();
    assert!(parser::find_unit(&commands, DEFAULT_UNIT_MARKER).is_err());
}
