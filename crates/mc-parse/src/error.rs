//! Lexer and parser errors.

/// Lexing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },

    #[error("line {line}: unterminated character constant")]
    UnterminatedChar { line: usize },

    #[error("line {line}: unterminated block comment")]
    UnterminatedComment { line: usize },

    #[error("line {line}:{column}: unexpected character '{ch}'")]
    UnexpectedChar { ch: char, line: usize, column: usize },
}

/// Parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("line {line}: expected {expected}, found '{found}'")]
    Unexpected {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("line {line}: nesting deeper than {max} levels")]
    TooDeep { line: usize, max: usize },
}

impl ParseError {
    /// Line the error was raised on.
    pub fn line(&self) -> usize {
        match self {
            ParseError::Lex(LexError::UnterminatedString { line })
            | ParseError::Lex(LexError::UnterminatedChar { line })
            | ParseError::Lex(LexError::UnterminatedComment { line })
            | ParseError::Lex(LexError::UnexpectedChar { line, .. })
            | ParseError::Unexpected { line, .. }
            | ParseError::TooDeep { line, .. } => *line,
        }
    }
}
