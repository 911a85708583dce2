//! # mc-parse
//!
//! C source front end for the MISRA-C checker.
//!
//! Two independent views of a file are provided:
//!
//! - [`SourceText`]: a tolerant line scanner that never fails. Each line is
//!   available raw and *masked* (comment bodies and literal contents blanked),
//!   together with the comments that start on it. Line rules run on this.
//! - [`parse`]: lexer plus recursive-descent parser producing a
//!   [`TranslationUnit`]. Preprocessor directives are skipped, not expanded,
//!   so common standard-library typedef names are pre-registered.
//!
//! ```text
//! source ──► SourceText (lines, masked lines, comments)
//!        └─► Lexer ──► Parser ──► TranslationUnit
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod source;

pub use ast::{
    Block, DeclSpecifiers, Declaration, Declarator, Derived, Expr, ExternalDecl, ForInit,
    FunctionDef, Initializer, Param, Stmt, TranslationUnit,
};
pub use error::{LexError, ParseError};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Parser, NESTING_DEPTH_MAX};
pub use source::{Comment, CommentStyle, SourceLine, SourceText};

/// Parse a complete C translation unit.
pub fn parse(source: &str) -> Result<TranslationUnit, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    tracing::debug!(tokens = tokens.len(), "lexed translation unit");
    Parser::new(tokens).parse_translation_unit()
}
