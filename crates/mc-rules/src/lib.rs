//! # mc-rules
//!
//! Rule engine for the MISRA-C checker.
//!
//! A file is checked in two passes:
//!
//! 1. **Line pass**: every [`LineRule`] runs on each scanned line. This pass
//!    always runs, whatever the state of the source.
//! 2. **AST pass**: the file is parsed and walked by [`AstChecker`], which
//!    runs every [`StmtRule`] on each statement and every [`ScopeRule`] on
//!    each definition. If parsing fails the pass is dropped and the report
//!    records why.
//!
//! ## Rules
//!
//! | Rule | Pass | Category |
//! |------|------|----------|
//! | Dir 4.6 basic numerical types | line | advisory |
//! | Rule 5.1 identifier length | line | required |
//! | Review `//` comments | line | advisory |
//! | Rule 15.1 `goto` | AST | advisory |
//! | Rule 16.4 `switch` without `default` | AST | required |
//! | Rule 16.1 `switch` body not compound | AST | required |
//! | Rule 15.6 body not compound | AST | required |
//! | Rule 5.3 identifier hiding | AST | required |
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use mc_core::{CheckerConfig, Palette};
//! use mc_rules::Checker;
//!
//! let checker = Checker::new(CheckerConfig::default()).unwrap();
//! let report = checker.check_file(Path::new("main.c")).unwrap();
//! print!("{}", report.format_report(&Palette::plain()));
//! ```

pub mod checker;
pub mod registry;
pub mod rules;
pub mod scope;
pub mod visitor;

pub use checker::Checker;
pub use registry::RuleSet;
pub use rules::{find_rule, LineRule, ScopeRule, StmtRule, RULE_CATALOG};
pub use scope::{Symbol, SymbolKind, SymbolTable};
pub use visitor::AstChecker;
