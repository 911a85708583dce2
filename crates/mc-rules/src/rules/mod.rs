//! MISRA-C rules.
//!
//! Rules come in three shapes, one trait each:
//!
//! - [`LineRule`]: sees one scanned line at a time (masked text and comments)
//! - [`StmtRule`]: sees every statement of the parsed file, nested ones included
//! - [`ScopeRule`]: sees every ordinary identifier as it is defined, with the
//!   symbol table as it stood just before the definition

mod lines;
mod shadowing;
mod statements;

pub use lines::{BasicTypes, CppComments, IdentifierLength, BASIC_TYPES, CPP_COMMENTS, IDENTIFIER_LENGTH};
pub use shadowing::{IdentifierShadowing, SHADOWING};
pub use statements::{
    CompoundBody, GotoStatement, SwitchCompound, SwitchDefault, COMPOUND_BODY, GOTO, SWITCH_COMPOUND,
    SWITCH_DEFAULT,
};

use mc_core::{RuleMeta, Violation};
use mc_parse::{SourceLine, SourceText, Stmt};

use crate::scope::{Symbol, SymbolTable};

/// Rule over one source line.
pub trait LineRule: Send + Sync {
    /// Rule metadata.
    fn meta(&self) -> &'static RuleMeta;

    /// Check one line. `source` gives access to the comments on it.
    fn check_line(&self, line: &SourceLine, source: &SourceText) -> Vec<Violation>;
}

/// Rule over one statement.
pub trait StmtRule: Send + Sync {
    /// Rule metadata.
    fn meta(&self) -> &'static RuleMeta;

    /// Check one statement. Children are visited separately.
    fn check_stmt(&self, stmt: &Stmt) -> Vec<Violation>;
}

/// Rule over identifier definitions.
pub trait ScopeRule: Send + Sync {
    /// Rule metadata.
    fn meta(&self) -> &'static RuleMeta;

    /// Check a symbol about to be defined in the current scope.
    fn check_define(&self, symbol: &Symbol, scopes: &SymbolTable) -> Option<Violation>;
}

/// Every rule the checker knows, in report order.
pub static RULE_CATALOG: [&RuleMeta; 8] = [
    &BASIC_TYPES,
    &IDENTIFIER_LENGTH,
    &CPP_COMMENTS,
    &GOTO,
    &SWITCH_DEFAULT,
    &SWITCH_COMPOUND,
    &COMPOUND_BODY,
    &SHADOWING,
];

/// Find a rule by id, ignoring case.
pub fn find_rule(id: &str) -> Option<&'static RuleMeta> {
    RULE_CATALOG
        .iter()
        .copied()
        .find(|meta| meta.id.eq_ignore_ascii_case(id.trim()))
}
