//! File-level checking: line pass, then AST pass.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info, warn};

use mc_core::{CheckError, CheckReport, CheckerConfig, ConfigError, Violation};
use mc_parse::SourceText;

use crate::registry::RuleSet;
use crate::visitor::AstChecker;

/// Checks C files against the enabled rules.
pub struct Checker {
    rules: RuleSet,
    config: CheckerConfig,
}

impl Checker {
    /// Create a checker for a configuration.
    pub fn new(config: CheckerConfig) -> Result<Self, ConfigError> {
        let rules = RuleSet::from_config(&config)?;
        debug!(
            rules = rules.enabled().len(),
            ast = config.ast_enabled,
            "checker ready"
        );
        Ok(Self { rules, config })
    }

    /// Check source text. Never fails: a parse error only drops the AST pass.
    pub fn check_source(&self, path: &Path, text: &str) -> CheckReport {
        let source = SourceText::new(text);
        let mut violations = self.check_lines(&source);
        let mut ast_error = None;

        if self.config.ast_enabled && self.rules.needs_ast() {
            match mc_parse::parse(text) {
                Ok(unit) => violations.extend(AstChecker::new(&self.rules).check(&unit)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "AST analysis failed");
                    ast_error = Some(e.to_string());
                }
            }
        }

        let report = CheckReport::from_violations(path, violations, ast_error);
        info!(
            path = %path.display(),
            violations = report.count(),
            "check complete"
        );
        report
    }

    /// Read and check a file.
    ///
    /// Bytes that are not UTF-8 are replaced rather than rejected.
    pub fn check_file(&self, path: &Path) -> Result<CheckReport, CheckError> {
        let bytes = std::fs::read(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => CheckError::NotFound(path.to_path_buf()),
            _ => CheckError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(self.check_source(path, &text))
    }

    fn check_lines(&self, source: &SourceText) -> Vec<Violation> {
        let mut violations = Vec::new();
        for line in source.lines() {
            for rule in self.rules.line_rules() {
                violations.extend(rule.check_line(line, source));
            }
        }
        debug!(
            lines = source.line_count(),
            violations = violations.len(),
            "line pass done"
        );
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(report: &CheckReport) -> Vec<(usize, &'static str)> {
        report.violations.iter().map(|v| (v.line, v.rule_id)).collect()
    }

    #[test]
    fn test_clean_source() {
        let checker = Checker::new(CheckerConfig::default()).unwrap();
        let report = checker.check_source(
            Path::new("clean.c"),
            "#include <stdint.h>\n\nint32_t add(int32_t a, int32_t b) {\n  return a + b;\n}\n",
        );
        assert_eq!(report.count(), 0);
        assert!(report.ast_error.is_none());
    }

    #[test]
    fn test_line_violations_precede_ast_violations_on_same_line() {
        let checker = Checker::new(CheckerConfig::default()).unwrap();
        let code = "int32_t x;\nvoid f(void) {\n  int x = 1;\n}\n";
        let report = checker.check_source(Path::new("a.c"), code);
        assert_eq!(ids(&report), vec![(3, "Dir 4.6"), (3, "Rule 5.3")]);
    }

    #[test]
    fn test_parse_failure_keeps_line_violations() {
        let checker = Checker::new(CheckerConfig::default()).unwrap();
        let report = checker.check_source(Path::new("bad.c"), "int f( {\n  goto x; // no\n");
        assert!(report.ast_error.is_some());
        assert_eq!(ids(&report), vec![(1, "Dir 4.6"), (2, "Review")]);
    }

    #[test]
    fn test_mid_file_parse_failure_keeps_line_violations() {
        let checker = Checker::new(CheckerConfig::default()).unwrap();
        let code = "int32_t a;\nvoid f(void) {\n  a = ;\n}\nint b;\n";
        let report = checker.check_source(Path::new("mid.c"), code);
        assert!(report.ast_error.as_deref().unwrap().starts_with("line 3:"));
        assert_eq!(ids(&report), vec![(5, "Dir 4.6")]);
    }

    #[test]
    fn test_deep_nesting_falls_back_to_line_rules() {
        let checker = Checker::new(CheckerConfig::default()).unwrap();
        let code = format!(
            "void f(void) {{\n  x = {}1{}; // deep\n}}\n",
            "(".repeat(5000),
            ")".repeat(5000)
        );
        let report = checker.check_source(Path::new("deep.c"), &code);
        assert!(report.ast_error.as_deref().unwrap().contains("nesting deeper"));
        assert_eq!(ids(&report), vec![(2, "Review")]);
    }

    #[test]
    fn test_crlf_macro_continuation_keeps_ast_pass() {
        let checker = Checker::new(CheckerConfig::default()).unwrap();
        let code = "#define ADD(a, b) \\\r\n  ((a) + (b))\r\nvoid f(void) {\r\n  goto out;\r\nout:\r\n  return;\r\n}\r\n";
        let report = checker.check_source(Path::new("crlf.c"), code);
        assert!(report.ast_error.is_none());
        assert_eq!(ids(&report), vec![(4, "Rule 15.1")]);
    }

    #[test]
    fn test_regex_only_skips_parser() {
        let checker = Checker::new(CheckerConfig::regex_only()).unwrap();
        let report = checker.check_source(Path::new("bad.c"), "int f( {\n");
        assert!(report.ast_error.is_none());
        assert_eq!(ids(&report), vec![(1, "Dir 4.6")]);
    }

    #[test]
    fn test_check_file_missing() {
        let checker = Checker::new(CheckerConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = checker.check_file(&dir.path().join("missing.c")).unwrap_err();
        assert!(matches!(err, CheckError::NotFound(_)));
        assert!(err.to_string().ends_with("missing.c not found."));
    }

    #[test]
    fn test_check_file_lossy_utf8() {
        let checker = Checker::new(CheckerConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.c");
        std::fs::write(&path, b"/* caf\xe9 */\nint32_t x;\n").unwrap();
        let report = checker.check_file(&path).unwrap();
        assert_eq!(report.count(), 0);
    }
}
