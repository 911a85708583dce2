//! Line rules.
//!
//! These run on the masked text of each line, so words inside comments and
//! string literals never match.

use once_cell::sync::Lazy;
use regex::Regex;

use mc_core::{Category, RuleMeta, Violation};
use mc_parse::{CommentStyle, SourceLine, SourceText};

use super::LineRule;

static BASIC_TYPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(int|short|long|float|double)\b").unwrap());

static IDENTIFIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").unwrap());

pub static BASIC_TYPES: RuleMeta = RuleMeta::new(
    "Dir 4.6",
    "Use of basic types (int, char, short, long, float, double) is not allowed. Use stdint types (int32_t, etc.)",
    Category::Advisory,
);

pub static IDENTIFIER_LENGTH: RuleMeta = RuleMeta::new(
    "Rule 5.1",
    "External identifiers shall be distinct. (Checking for length > 31 characters)",
    Category::Required,
);

pub static CPP_COMMENTS: RuleMeta = RuleMeta::new(
    "Review",
    "C++ style comments (//) should not be used in purely C90 code.",
    Category::Advisory,
);

/// Dir 4.6: basic numerical types.
///
/// `char` is not matched: plain `char` is the type for character data.
pub struct BasicTypes;

impl LineRule for BasicTypes {
    fn meta(&self) -> &'static RuleMeta {
        &BASIC_TYPES
    }

    fn check_line(&self, line: &SourceLine, _source: &SourceText) -> Vec<Violation> {
        BASIC_TYPE_PATTERN
            .find_iter(&line.masked)
            .map(|m| {
                BASIC_TYPES.violation(
                    line.number,
                    m.as_str(),
                    "Replace with fixed-width types like int32_t, uint16_t, etc.",
                )
            })
            .collect()
    }
}

/// Rule 5.1: identifiers longer than the significant-character limit.
pub struct IdentifierLength {
    length_max: usize,
}

impl IdentifierLength {
    /// Create with a limit in characters.
    pub fn new(length_max: usize) -> Self {
        debug_assert!(length_max > 0, "Identifier limit must be positive");
        Self { length_max }
    }
}

impl LineRule for IdentifierLength {
    fn meta(&self) -> &'static RuleMeta {
        &IDENTIFIER_LENGTH
    }

    fn check_line(&self, line: &SourceLine, _source: &SourceText) -> Vec<Violation> {
        IDENTIFIER_PATTERN
            .find_iter(&line.masked)
            .filter(|m| m.as_str().chars().count() > self.length_max)
            .map(|m| {
                IDENTIFIER_LENGTH.violation(
                    line.number,
                    m.as_str(),
                    format!("Shorten identifier to {} chars.", self.length_max),
                )
            })
            .collect()
    }
}

/// `//` comments, reported once per line.
pub struct CppComments;

impl LineRule for CppComments {
    fn meta(&self) -> &'static RuleMeta {
        &CPP_COMMENTS
    }

    fn check_line(&self, line: &SourceLine, source: &SourceText) -> Vec<Violation> {
        let has_line_comment = source
            .comments_on(line.number)
            .any(|c| c.style == CommentStyle::Line);
        if !has_line_comment {
            return Vec::new();
        }
        vec![CPP_COMMENTS.violation(line.number, "// ...", "Replace // with /* ... */.")]
    }
}
