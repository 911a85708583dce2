//! End-to-end check of the bundled sample file.

use std::path::PathBuf;

use mc_core::{Category, CheckerConfig, Palette};
use mc_rules::Checker;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../samples/test.c")
}

#[test]
fn test_sample_violations() {
    let checker = Checker::new(CheckerConfig::default()).unwrap();
    let report = checker.check_file(&sample_path()).unwrap();

    let found: Vec<(usize, &str)> = report
        .violations
        .iter()
        .map(|v| (v.line, v.rule_id))
        .collect();

    assert_eq!(
        found,
        vec![
            (4, "Review"),
            (5, "Dir 4.6"),
            (7, "Review"),
            (8, "Dir 4.6"),
            (8, "Rule 5.1"),
            (10, "Dir 4.6"),
            (10, "Review"),
            (13, "Review"),
            (14, "Dir 4.6"),
            (14, "Rule 5.3"),
            (16, "Review"),
            (17, "Rule 15.6"),
            (18, "Review"),
            (20, "Review"),
            (21, "Rule 15.1"),
            (26, "Review"),
            (27, "Rule 16.4"),
            (34, "Dir 4.6"),
            (36, "Review"),
        ]
    );
    assert!(report.ast_error.is_none());
}

#[test]
fn test_sample_details() {
    let checker = Checker::new(CheckerConfig::default()).unwrap();
    let report = checker.check_file(&sample_path()).unwrap();

    let shadow = report.by_rule("Rule 5.3").next().unwrap();
    assert_eq!(shadow.matched, "Variable 'x'");
    assert_eq!(shadow.suggestion, "Rename variable. Shadows declaration at line 10.");

    let long = report.by_rule("Rule 5.1").next().unwrap();
    assert_eq!(
        long.matched,
        "this_is_a_very_long_variable_name_that_exceeds_limits_of_misra_c_2012"
    );

    let goto = report.by_rule("Rule 15.1").next().unwrap();
    assert_eq!(goto.matched, "goto label");

    // 5.1, 5.3, 15.6 and 16.4 are required; the rest are advisory.
    assert_eq!(report.count_at_least(Category::Required), 4);
    assert!(!report.passes(Category::Required));
}

#[test]
fn test_sample_text_report() {
    let checker = Checker::new(CheckerConfig::default()).unwrap();
    let report = checker.check_file(&sample_path()).unwrap();
    let text = report.format_report(&Palette::plain());

    assert!(text.contains("for MISRA compliance..."));
    assert!(text.contains("[Line 27] Rule 16.4: Switch statement must have a default label."));
    assert!(text.contains("   Suggestion: Add a 'default: break;' case."));
    assert!(text.trim_end().ends_with("Total violations found: 19"));
}

#[test]
fn test_sample_with_rules_disabled() {
    let config = CheckerConfig {
        disabled_rules: vec!["Review".into(), "Dir 4.6".into()],
        ..Default::default()
    };
    let checker = Checker::new(config).unwrap();
    let report = checker.check_file(&sample_path()).unwrap();
    assert_eq!(report.count(), 5);
}

#[test]
fn test_unparsable_source_falls_back_to_line_rules() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.c");
    std::fs::write(&path, "int main( {\n  goto end; // ???\n").unwrap();

    let checker = Checker::new(CheckerConfig::default()).unwrap();
    let report = checker.check_file(&path).unwrap();
    assert!(report.ast_error.is_some());
    assert_eq!(report.count(), 2);

    let text = report.format_report(&Palette::plain());
    assert!(text.contains("Warning: AST analysis failed:"));
    assert!(text.contains("Running only regex checks."));
}
