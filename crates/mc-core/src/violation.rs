//! Rule metadata and violations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// MISRA guideline category.
///
/// Ordered from weakest (Advisory) to strongest (Mandatory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Recommended practice
    Advisory = 0,
    /// Deviation needs a formal record
    Required = 1,
    /// Never deviated from
    Mandatory = 2,
}

impl Category {
    /// Get the name of this category.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Advisory => "advisory",
            Category::Required => "required",
            Category::Mandatory => "mandatory",
        }
    }

    /// Check if this category is at least as strong as another.
    pub fn at_least(&self, other: Category) -> bool {
        *self >= other
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "advisory" => Ok(Category::Advisory),
            "required" => Ok(Category::Required),
            "mandatory" => Ok(Category::Mandatory),
            other => Err(format!(
                "unknown category '{}' (expected advisory, required or mandatory)",
                other
            )),
        }
    }
}

/// Static description of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMeta {
    /// Guideline id as printed in reports (e.g., "Rule 15.1")
    pub id: &'static str,
    /// One-sentence statement of the guideline
    pub description: &'static str,
    /// Guideline category
    pub category: Category,
}

impl RuleMeta {
    /// Create rule metadata.
    pub const fn new(id: &'static str, description: &'static str, category: Category) -> Self {
        Self {
            id,
            description,
            category,
        }
    }

    /// Create a violation of this rule.
    pub fn violation(
        &self,
        line: usize,
        matched: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Violation {
        Violation::new(self, line, matched, suggestion)
    }
}

/// A single guideline violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Rule that was violated
    pub rule_id: &'static str,
    /// 1-based source line
    pub line: usize,
    /// Description of the rule
    pub description: &'static str,
    /// Offending source text
    #[serde(rename = "match")]
    pub matched: String,
    /// How to fix it
    pub suggestion: String,
    /// Guideline category
    pub category: Category,
}

impl Violation {
    /// Create a new violation.
    pub fn new(
        rule: &RuleMeta,
        line: usize,
        matched: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        debug_assert!(line > 0, "Line numbers are 1-based");
        debug_assert!(!rule.id.is_empty(), "Rule id must not be empty");

        Self {
            rule_id: rule.id,
            line,
            description: rule.description,
            matched: matched.into(),
            suggestion: suggestion.into(),
            category: rule.category,
        }
    }

    /// Format the headline for display.
    pub fn format(&self) -> String {
        format!("[Line {}] {}: {}", self.line, self.rule_id, self.description)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
