//! Tolerant line scanner.
//!
//! Splits source into lines and blanks out comment bodies and literal
//! contents, keeping every line the same length in chars. Scanning never
//! fails: an unterminated literal ends at the end of its line and an
//! unterminated block comment runs to the end of the file.

/// Comment syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `// ...`
    Line,
    /// `/* ... */`
    Block,
}

/// A comment and where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// 1-based line the comment starts on
    pub line: usize,
    /// 1-based column of the opening delimiter
    pub column: usize,
    pub style: CommentStyle,
    /// Full comment text including delimiters
    pub text: String,
}

/// One line of source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number
    pub number: usize,
    /// Line as written, without the line terminator
    pub raw: String,
    /// Line with comment bodies and literal contents replaced by spaces
    pub masked: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    BlockComment,
    Str,
    Char,
}

/// Scanned source file.
#[derive(Debug, Clone, Default)]
pub struct SourceText {
    lines: Vec<SourceLine>,
    comments: Vec<Comment>,
}

impl SourceText {
    /// Scan source text.
    pub fn new(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut comments = Vec::new();
        let mut state = ScanState::Code;
        let mut open_block: Option<Comment> = None;

        for (index, raw) in text.lines().enumerate() {
            let number = index + 1;
            let chars: Vec<char> = raw.chars().collect();
            let mut masked = String::with_capacity(raw.len());
            let mut i = 0;

            while i < chars.len() {
                let c = chars[i];
                let next = chars.get(i + 1).copied();

                match state {
                    ScanState::Code => {
                        if c == '/' && next == Some('/') {
                            comments.push(Comment {
                                line: number,
                                column: i + 1,
                                style: CommentStyle::Line,
                                text: chars[i..].iter().collect(),
                            });
                            masked.push_str("//");
                            masked.extend(std::iter::repeat(' ').take(chars.len() - i - 2));
                            i = chars.len();
                            continue;
                        }
                        if c == '/' && next == Some('*') {
                            open_block = Some(Comment {
                                line: number,
                                column: i + 1,
                                style: CommentStyle::Block,
                                text: String::from("/*"),
                            });
                            masked.push_str("/*");
                            state = ScanState::BlockComment;
                            i += 2;
                            continue;
                        }
                        match c {
                            '"' => state = ScanState::Str,
                            '\'' => state = ScanState::Char,
                            _ => {}
                        }
                        masked.push(c);
                        i += 1;
                    }
                    ScanState::BlockComment => {
                        if c == '*' && next == Some('/') {
                            if let Some(mut comment) = open_block.take() {
                                comment.text.push_str("*/");
                                comments.push(comment);
                            }
                            masked.push_str("*/");
                            state = ScanState::Code;
                            i += 2;
                            continue;
                        }
                        if let Some(ref mut comment) = open_block {
                            comment.text.push(c);
                        }
                        masked.push(' ');
                        i += 1;
                    }
                    ScanState::Str | ScanState::Char => {
                        let quote = if state == ScanState::Str { '"' } else { '\'' };
                        if c == '\\' && next.is_some() {
                            masked.push_str("  ");
                            i += 2;
                            continue;
                        }
                        if c == quote {
                            masked.push(c);
                            state = ScanState::Code;
                        } else {
                            masked.push(' ');
                        }
                        i += 1;
                    }
                }
            }

            match state {
                ScanState::BlockComment => {
                    if let Some(ref mut comment) = open_block {
                        comment.text.push('\n');
                    }
                }
                // Literals never span lines.
                ScanState::Str | ScanState::Char => state = ScanState::Code,
                ScanState::Code => {}
            }

            debug_assert_eq!(masked.chars().count(), chars.len());
            lines.push(SourceLine {
                number,
                raw: raw.to_string(),
                masked,
            });
        }

        if let Some(comment) = open_block {
            comments.push(comment);
        }
        comments.sort_by_key(|c| (c.line, c.column));

        Self { lines, comments }
    }

    /// All lines in order.
    pub fn lines(&self) -> &[SourceLine] {
        &self.lines
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// All comments in source order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Comments that start on a given line.
    pub fn comments_on(&self, line: usize) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(move |c| c.line == line)
    }
}
