//! C lexer.
//!
//! Comments and preprocessor directive lines are dropped. Every token
//! carries the 1-based line and column it starts at.

use crate::error::LexError;

/// C99/C11 keywords.
const KEYWORDS: &[&str] = &[
    "auto",
    "break",
    "case",
    "char",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extern",
    "float",
    "for",
    "goto",
    "if",
    "inline",
    "int",
    "long",
    "register",
    "restrict",
    "return",
    "short",
    "signed",
    "sizeof",
    "static",
    "struct",
    "switch",
    "typedef",
    "union",
    "unsigned",
    "void",
    "volatile",
    "while",
    "_Alignas",
    "_Alignof",
    "_Atomic",
    "_Bool",
    "_Complex",
    "_Imaginary",
    "_Noreturn",
    "_Static_assert",
    "_Thread_local",
];

/// Punctuators, longest first.
const PUNCTUATORS: &[&str] = &[
    "...", "<<=", ">>=", "->", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "*=",
    "/=", "%=", "+=", "-=", "&=", "^=", "|=", "##", "[", "]", "(", ")", "{", "}", ".", "&", "*",
    "+", "-", "~", "!", "/", "%", "<", ">", "^", "|", "?", ":", ";", "=", ",", "#",
];

/// Token classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Keyword,
    Number,
    Char,
    Str,
    Punct,
    Eof,
}

/// A lexed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// Check for a punctuator.
    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == p
    }

    /// Check for a keyword.
    pub fn is_keyword(&self, k: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == k
    }

    /// Check for an identifier, any name.
    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }

    /// Check for end of input.
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

/// C lexer over a source string.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    /// Only whitespace seen since the last newline
    at_line_start: bool,
}

impl Lexer {
    /// Create a lexer.
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            at_line_start: true,
        }
    }

    /// Lex the whole input. The last token is always `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
            self.at_line_start = true;
        } else {
            self.column += 1;
            if !c.is_whitespace() {
                self.at_line_start = false;
            }
        }
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    /// Skip whitespace, comments, line splices and directives.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('\\') if matches!(self.peek_at(1), Some('\n')) => {
                    self.bump();
                    self.bump();
                }
                Some('\\') if self.peek_at(1) == Some('\r') && self.peek_at(2) == Some('\n') => {
                    self.bump();
                    self.bump();
                    self.bump();
                }
                Some('/') if self.peek_at(1) == Some('/') => self.skip_line_comment(),
                Some('/') if self.peek_at(1) == Some('*') => self.skip_block_comment()?,
                Some('#') if self.at_line_start => self.skip_directive()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let line = self.line;
        let at_line_start = self.at_line_start;
        self.bump();
        self.bump();
        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedComment { line }),
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        // A comment is whitespace: `/* x */ #define` still starts a directive.
        if self.line == line {
            self.at_line_start = at_line_start;
        }
        Ok(())
    }

    fn skip_directive(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                None => return Ok(()),
                Some('\n') => return Ok(()),
                Some('\\') if self.peek_at(1) == Some('\n') => {
                    self.bump();
                    self.bump();
                }
                Some('\\') if self.peek_at(1) == Some('\r') && self.peek_at(2) == Some('\n') => {
                    self.bump();
                    self.bump();
                    self.bump();
                }
                Some('/') if self.peek_at(1) == Some('*') => self.skip_block_comment()?,
                Some('/') if self.peek_at(1) == Some('/') => {
                    self.skip_line_comment();
                    return Ok(());
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia()?;

        let line = self.line;
        let column = self.column;
        let make = |kind, text: String| Token {
            kind,
            text,
            line,
            column,
        };

        let c = match self.peek() {
            None => return Ok(make(TokenKind::Eof, String::new())),
            Some(c) => c,
        };

        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            let mut text = String::new();
            while let Some(c) = self.peek() {
                if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                    text.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
            // Encoding prefixes: L"..", u8"..", U'..'
            if matches!(text.as_str(), "L" | "u" | "U" | "u8") {
                match self.peek() {
                    Some('"') => {
                        let body = self.quoted('"', line)?;
                        return Ok(make(TokenKind::Str, text + &body));
                    }
                    Some('\'') if text != "u8" => {
                        let body = self.quoted('\'', line)?;
                        return Ok(make(TokenKind::Char, text + &body));
                    }
                    _ => {}
                }
            }
            let kind = if KEYWORDS.contains(&text.as_str()) {
                TokenKind::Keyword
            } else {
                TokenKind::Ident
            };
            return Ok(make(kind, text));
        }

        if c.is_ascii_digit() || (c == '.' && self.peek_at(1).map_or(false, |d| d.is_ascii_digit()))
        {
            return Ok(make(TokenKind::Number, self.number()));
        }

        if c == '"' {
            let text = self.quoted('"', line)?;
            return Ok(make(TokenKind::Str, text));
        }

        if c == '\'' {
            let text = self.quoted('\'', line)?;
            return Ok(make(TokenKind::Char, text));
        }

        for punct in PUNCTUATORS {
            if self.starts_with(punct) {
                for _ in 0..punct.len() {
                    self.bump();
                }
                return Ok(make(TokenKind::Punct, (*punct).to_string()));
            }
        }

        Err(LexError::UnexpectedChar { ch: c, line, column })
    }

    /// Preprocessing number: digits, letters, dots and signed exponents.
    fn number(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                text.push(c);
                self.bump();
                if matches!(c, 'e' | 'E' | 'p' | 'P') && matches!(self.peek(), Some('+' | '-')) {
                    if let Some(sign) = self.bump() {
                        text.push(sign);
                    }
                }
            } else {
                break;
            }
        }
        text
    }

    /// Quoted literal including its quotes.
    fn quoted(&mut self, quote: char, line: usize) -> Result<String, LexError> {
        let unterminated = || {
            if quote == '"' {
                LexError::UnterminatedString { line }
            } else {
                LexError::UnterminatedChar { line }
            }
        };

        let mut text = String::new();
        if let Some(open) = self.bump() {
            text.push(open);
        }
        loop {
            match self.peek() {
                None | Some('\n') => return Err(unterminated()),
                Some('\\') => {
                    text.push('\\');
                    self.bump();
                    match self.bump() {
                        Some(escaped) => text.push(escaped),
                        None => return Err(unterminated()),
                    }
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                    if c == quote {
                        return Ok(text);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_text(src: &str) -> Vec<(TokenKind, String)> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_tokenize_declaration() {
        let tokens = kinds_and_text("int x = 10;");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Keyword, "int".to_string()),
                (TokenKind::Ident, "x".to_string()),
                (TokenKind::Punct, "=".to_string()),
                (TokenKind::Number, "10".to_string()),
                (TokenKind::Punct, ";".to_string()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn test_skips_directives_and_comments() {
        let src = "#include <stdio.h>\n#define LONG \\\n  1\n// note\nx /* y */ ;\n";
        let tokens = Lexer::new(src).tokenize().unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "x");
        assert_eq!(tokens[0].line, 5);
        assert!(tokens[1].is_punct(";"));
    }

    #[test]
    fn test_crlf_directive_continuation() {
        let src = "#define ADD(a, b) \\\r\n  ((a) + (b))\r\nvoid f(void) {\r\n  goto out;\r\n}\r\n";
        let tokens = Lexer::new(src).tokenize().unwrap();
        assert_eq!(tokens[0].text, "void");
        assert_eq!(tokens[0].line, 3);
        assert!(tokens.iter().all(|t| t.text != "+"));
    }

    #[test]
    fn test_hash_inside_line_is_punct() {
        let tokens = kinds_and_text("a # b");
        assert_eq!(tokens[1], (TokenKind::Punct, "#".to_string()));
    }

    #[test]
    fn test_longest_punctuator_match() {
        let tokens = kinds_and_text("a <<= b->c ... ++");
        let puncts: Vec<_> = tokens
            .iter()
            .filter(|(k, _)| *k == TokenKind::Punct)
            .map(|(_, t)| t.as_str())
            .collect();
        assert_eq!(puncts, vec!["<<=", "->", "...", "++"]);
    }

    #[test]
    fn test_literals() {
        let tokens = kinds_and_text(r#""a\"b" 'c' L"w" 0x1Fu 1.5e-3"#);
        assert_eq!(tokens[0], (TokenKind::Str, r#""a\"b""#.to_string()));
        assert_eq!(tokens[1], (TokenKind::Char, "'c'".to_string()));
        assert_eq!(tokens[2], (TokenKind::Str, "L\"w\"".to_string()));
        assert_eq!(tokens[3], (TokenKind::Number, "0x1Fu".to_string()));
        assert_eq!(tokens[4], (TokenKind::Number, "1.5e-3".to_string()));
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::new("a\n  goto b;").tokenize().unwrap();
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
        assert!(tokens[1].is_keyword("goto"));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            Lexer::new("\"abc\n").tokenize(),
            Err(LexError::UnterminatedString { line: 1 })
        );
        assert_eq!(
            Lexer::new("x /* y").tokenize(),
            Err(LexError::UnterminatedComment { line: 1 })
        );
        assert_eq!(
            Lexer::new("a @").tokenize(),
            Err(LexError::UnexpectedChar {
                ch: '@',
                line: 1,
                column: 3
            })
        );
    }
}
