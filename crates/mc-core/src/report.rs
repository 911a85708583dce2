//! Per-file check reports.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::violation::{Category, Violation};

const SEPARATOR_WIDTH: usize = 60;

/// Terminal color codes used by the text report.
///
/// `plain()` yields empty strings, so formatting code never branches on color.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub header: &'static str,
    pub fail: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
    pub ok: &'static str,
    pub bold: &'static str,
    pub reset: &'static str,
}

impl Palette {
    /// ANSI escape codes.
    pub const fn ansi() -> Self {
        Self {
            header: "\x1b[95m",
            fail: "\x1b[91m",
            warning: "\x1b[93m",
            info: "\x1b[96m",
            ok: "\x1b[92m",
            bold: "\x1b[1m",
            reset: "\x1b[0m",
        }
    }

    /// No colors.
    pub const fn plain() -> Self {
        Self {
            header: "",
            fail: "",
            warning: "",
            info: "",
            ok: "",
            bold: "",
            reset: "",
        }
    }
}

/// Result of checking one file.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Checked file
    pub path: PathBuf,
    /// All violations, sorted by line
    pub violations: Vec<Violation>,
    /// Why the AST pass was skipped, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ast_error: Option<String>,
}

impl CheckReport {
    /// Create from violations in discovery order.
    ///
    /// The sort is stable: violations on the same line keep discovery order.
    pub fn from_violations(
        path: impl Into<PathBuf>,
        mut violations: Vec<Violation>,
        ast_error: Option<String>,
    ) -> Self {
        violations.sort_by_key(|v| v.line);
        Self {
            path: path.into(),
            violations,
            ast_error,
        }
    }

    /// Checked file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total violation count.
    pub fn count(&self) -> usize {
        self.violations.len()
    }

    /// Count violations at or above a category.
    pub fn count_at_least(&self, category: Category) -> usize {
        self.violations
            .iter()
            .filter(|v| v.category.at_least(category))
            .count()
    }

    /// Whether no violation reaches the threshold.
    pub fn passes(&self, threshold: Category) -> bool {
        self.count_at_least(threshold) == 0
    }

    /// Violations of one rule.
    pub fn by_rule<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.rule_id == rule_id)
    }

    /// Format as console report.
    pub fn format_report(&self, palette: &Palette) -> String {
        let p = palette;
        let mut report = String::new();

        report.push_str(&format!(
            "{}Checking {} for MISRA compliance...{}\n\n",
            p.header,
            self.path.display(),
            p.reset
        ));

        if let Some(ref error) = self.ast_error {
            report.push_str(&format!(
                "{}Warning: AST analysis failed: {}{}\n",
                p.warning, error, p.reset
            ));
            report.push_str("Running only regex checks.\n\n");
        }

        for v in &self.violations {
            report.push_str(&format!("{}{}{}{}\n", p.fail, p.bold, v.format(), p.reset));
            report.push_str(&format!("   {}Match:{} {}\n", p.warning, p.reset, v.matched));
            report.push_str(&format!(
                "   {}Suggestion:{} {}\n",
                p.info, p.reset, v.suggestion
            ));
            report.push_str(&"-".repeat(SEPARATOR_WIDTH));
            report.push('\n');
        }

        if self.violations.is_empty() {
            report.push_str(&format!(
                "{}No violations found! Elite code!{}\n",
                p.ok, p.reset
            ));
        } else {
            report.push_str(&format!(
                "\n{}Total violations found: {}{}\n",
                p.fail,
                self.count(),
                p.reset
            ));
        }

        report
    }
}
