use std::fmt;

use crate::token::{Keyword, Span, Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum LexErrorKind {
    /// Double-quoted string still open at end of input.
    UnterminatedString,
    /// Raw string whose closing `"#` marker can never be reached.
    UnterminatedRawString { start_marker: String },
    /// `{//` comment without a closing `//}`.
    UnterminatedBlockComment,
    /// Character that cannot start any token.
    UnexpectedCharacter(char),
}

impl LexErrorKind {
    /// Fatal errors stop the scan; nothing after them is tokenized.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::UnexpectedCharacter(_))
    }
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => {
                write!(f, "unterminated string literal")
            }
            Self::UnterminatedRawString { start_marker } => {
                write!(
                    f,
                    "unterminated raw string, \
                     no closing marker for {start_marker}"
                )
            }
            Self::UnterminatedBlockComment => {
                write!(f, "unterminated block comment, expected '//}}'")
            }
            Self::UnexpectedCharacter(ch) => {
                write!(f, "unexpected character: {ch:?}")
            }
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// Output of [`tokenize`].
///
/// `tokens` is the grammar-relevant stream and always ends with a
/// [`TokenKind::Eof`] token. Comments go to `trivia`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub trivia: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl Lexed {
    /// Whether the scan stopped early on a fatal error.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.errors.iter().any(|e| e.kind.is_fatal())
    }

    /// Text of every `///` comment, without the slashes and at most one
    /// leading space.
    pub fn doc_comments(&self) -> impl Iterator<Item = &str> {
        self.trivia
            .iter()
            .filter(|t| t.kind == TokenKind::DocComment)
            .map(|t| {
                let body = t.text.trim_start_matches('/');
                body.strip_prefix(' ').unwrap_or(body)
            })
    }
}

/// Tokenize BAML source text.
///
/// Never fails: problems are collected in [`Lexed::errors`]. A fatal
/// error (unterminated string, raw string or block comment) ends the
/// token stream at the failure point.
#[must_use]
pub fn tokenize(input: &str) -> Lexed {
    Lexer::new(input).tokenize()
}

#[derive(Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    col: usize,
}

struct Lexer<'a> {
    src: &'a str,
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
    trivia: Vec<Token>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        let bytes = input.as_bytes();
        let start = if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            3
        } else {
            0
        };
        Self {
            src: input,
            input: bytes,
            pos: start,
            line: 1,
            col: 1,
            tokens: Vec::new(),
            trivia: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn tokenize(mut self) -> Lexed {
        while let Some(ch) = self.peek() {
            let result = match ch {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.advance();
                    Ok(())
                }
                b'/' if self.peek_at(1) == Some(b'/') => {
                    self.read_line_comment();
                    Ok(())
                }
                b'{' if self.peek_at(1) == Some(b'/') && self.peek_at(2) == Some(b'/') => {
                    self.read_block_comment()
                }
                b'"' => self.read_string(),
                b'#' => self.read_hash(),
                b'0'..=b'9' => {
                    self.read_number();
                    Ok(())
                }
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                    self.read_word();
                    Ok(())
                }
                _ => {
                    self.read_punctuation();
                    Ok(())
                }
            };

            if let Err(err) = result {
                log::debug!("lexing stopped: {err}");
                self.errors.push(err);
                break;
            }
        }

        let end = self.mark();
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            text: String::new(),
            span: self.span_from(end),
        });
        log::trace!(
            "lexed {} tokens, {} trivia, {} errors",
            self.tokens.len(),
            self.trivia.len(),
            self.errors.len()
        );

        Lexed {
            tokens: self.tokens,
            trivia: self.trivia,
            errors: self.errors,
        }
    }

    const fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    const fn span_from(&self, mark: Mark) -> Span {
        Span {
            start: mark.pos,
            end: self.pos,
            line: mark.line,
            column: mark.col,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(&byte) = self.input.get(self.pos) {
            if byte == b'\n' {
                self.line += 1;
                self.col = 1;
            } else if byte & 0xC0 != 0x80 {
                // continuation bytes share the column of their lead byte
                self.col += 1;
            }
            self.pos += 1;
        }
    }

    fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn advance_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.src[start..end].to_string()
    }

    fn push(&mut self, kind: TokenKind, mark: Mark) {
        let token = Token {
            kind,
            text: self.text(mark.pos, self.pos),
            span: self.span_from(mark),
        };
        self.tokens.push(token);
    }

    fn read_line_comment(&mut self) {
        let mark = self.mark();
        let kind = if self.peek_at(2) == Some(b'/') {
            TokenKind::DocComment
        } else {
            TokenKind::LineComment
        };
        self.advance_while(|b| b != b'\n');
        self.trivia.push(Token {
            kind,
            text: self.text(mark.pos, self.pos).trim_end_matches('\r').to_string(),
            span: self.span_from(mark),
        });
    }

    fn read_block_comment(&mut self) -> Result<(), LexError> {
        let mark = self.mark();
        self.advance_n(3);

        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        kind: LexErrorKind::UnterminatedBlockComment,
                        span: self.span_from(mark),
                    });
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') && self.peek_at(2) == Some(b'}') => {
                    self.advance_n(3);
                    break;
                }
                Some(_) => self.advance(),
            }
        }

        self.trivia.push(Token {
            kind: TokenKind::BlockComment,
            text: self.text(mark.pos, self.pos),
            span: self.span_from(mark),
        });
        Ok(())
    }

    fn read_string(&mut self) -> Result<(), LexError> {
        let mark = self.mark();
        self.advance(); // opening quote

        loop {
            match self.peek() {
                None => {
                    return Err(LexError {
                        kind: LexErrorKind::UnterminatedString,
                        span: self.span_from(mark),
                    });
                }
                Some(b'\\') => {
                    // escapes are kept verbatim, only skipped over
                    self.advance();
                    if self.peek().is_none() {
                        continue;
                    }
                    self.advance();
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(_) => self.advance(),
            }
        }

        self.tokens.push(Token {
            kind: TokenKind::String,
            text: self.text(mark.pos + 1, self.pos - 1),
            span: self.span_from(mark),
        });
        Ok(())
    }

    /// `#` starts either a raw string (`#"`) or a markdown header
    /// (`#`-run followed by a space).
    fn read_hash(&mut self) -> Result<(), LexError> {
        if self.peek_at(1) == Some(b'"') {
            return self.read_raw_string();
        }

        let mut level = 0;
        while self.peek_at(level) == Some(b'#') {
            level += 1;
        }

        if self.peek_at(level) == Some(b' ') {
            self.read_markdown_header(level);
        } else {
            self.unexpected_character();
        }
        Ok(())
    }

    fn read_raw_string(&mut self) -> Result<(), LexError> {
        let mark = self.mark();
        self.advance(); // '#'
        let quotes_start = self.pos;
        self.advance_while(|b| b == b'"');
        let quotes = self.pos - quotes_start;

        // `#""#`: the quote run holds both markers and there is no content.
        if quotes >= 2 && self.peek() == Some(b'#') {
            let start_quotes = quotes - quotes / 2;
            let content_at = quotes_start + start_quotes;
            self.advance(); // closing '#'
            self.tokens.push(Token {
                kind: TokenKind::RawString {
                    start_marker: format!("#{}", "\"".repeat(start_quotes)),
                    end_marker: format!("{}#", "\"".repeat(quotes - start_quotes)),
                },
                text: self.text(content_at, content_at),
                span: self.span_from(mark),
            });
            return Ok(());
        }

        let start_marker = self.text(mark.pos, self.pos);
        let marker_span = self.span_from(mark);
        let unterminated = |start_marker: String| LexError {
            kind: LexErrorKind::UnterminatedRawString { start_marker },
            span: marker_span.clone(),
        };

        let content_start = self.pos;
        self.advance_while(|b| b != b'"');
        let content_end = self.pos;
        if self.peek().is_none() {
            return Err(unterminated(start_marker));
        }

        // content never holds a quote, so this run must be the end marker
        let end_start = self.pos;
        self.advance_while(|b| b == b'"');
        if self.peek() != Some(b'#') {
            return Err(unterminated(start_marker));
        }
        self.advance();

        self.tokens.push(Token {
            kind: TokenKind::RawString {
                start_marker,
                end_marker: self.text(end_start, self.pos),
            },
            text: self.text(content_start, content_end),
            span: self.span_from(mark),
        });
        Ok(())
    }

    fn read_markdown_header(&mut self, level: usize) {
        let mark = self.mark();
        self.advance_n(level + 1);
        let text_start = self.pos;
        self.advance_while(|b| b != b'\n');
        let text = self.src[text_start..self.pos].trim_end().to_string();
        self.tokens.push(Token {
            kind: TokenKind::MarkdownHeader { level },
            text,
            span: self.span_from(mark),
        });
    }

    fn read_number(&mut self) {
        let mark = self.mark();
        self.advance_while(|b| b.is_ascii_digit());
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
            self.advance_while(|b| b.is_ascii_digit());
        }
        self.push(TokenKind::Number, mark);
    }

    fn read_word(&mut self) {
        let mark = self.mark();
        self.advance_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        let kind = Keyword::from_word(&self.src[mark.pos..self.pos])
            .map_or(TokenKind::Ident, TokenKind::Keyword);
        self.push(kind, mark);
    }

    fn read_punctuation(&mut self) {
        let mark = self.mark();
        let next = self.peek_at(1);
        let (kind, len) = match (self.input[self.pos], next) {
            (b'{', _) => (TokenKind::LBrace, 1),
            (b'}', _) => (TokenKind::RBrace, 1),
            (b'(', _) => (TokenKind::LParen, 1),
            (b')', _) => (TokenKind::RParen, 1),
            (b'[', _) => (TokenKind::LBracket, 1),
            (b']', _) => (TokenKind::RBracket, 1),
            (b'<', Some(b'=')) => (TokenKind::Le, 2),
            (b'<', _) => (TokenKind::Lt, 1),
            (b'>', Some(b'=')) => (TokenKind::Ge, 2),
            (b'>', _) => (TokenKind::Gt, 1),
            (b'=', Some(b'=')) => (TokenKind::EqEq, 2),
            (b'=', _) => (TokenKind::Assign, 1),
            (b'!', Some(b'=')) => (TokenKind::NotEq, 2),
            (b'+', Some(b'+')) => (TokenKind::PlusPlus, 2),
            (b'+', Some(b'=')) => (TokenKind::PlusAssign, 2),
            (b'+', _) => (TokenKind::Plus, 1),
            (b'-', Some(b'>')) => (TokenKind::Arrow, 2),
            (b'-', Some(b'-')) => (TokenKind::MinusMinus, 2),
            (b'-', Some(b'=')) => (TokenKind::MinusAssign, 2),
            (b'-', _) => (TokenKind::Minus, 1),
            (b'*', Some(b'=')) => (TokenKind::StarAssign, 2),
            (b'*', _) => (TokenKind::Star, 1),
            (b'/', Some(b'=')) => (TokenKind::SlashAssign, 2),
            (b'/', _) => (TokenKind::Slash, 1),
            (b'%', _) => (TokenKind::Percent, 1),
            (b'&', Some(b'&')) => (TokenKind::AndAnd, 2),
            (b'|', Some(b'|')) => (TokenKind::OrOr, 2),
            (b'|', _) => (TokenKind::Pipe, 1),
            (b':', _) => (TokenKind::Colon, 1),
            (b';', _) => (TokenKind::Semicolon, 1),
            (b',', _) => (TokenKind::Comma, 1),
            (b'.', _) => (TokenKind::Dot, 1),
            (b'?', _) => (TokenKind::Question, 1),
            (b'@', Some(b'@')) => (TokenKind::AtAt, 2),
            (b'@', _) => (TokenKind::At, 1),
            _ => {
                self.unexpected_character();
                return;
            }
        };
        self.advance_n(len);
        self.push(kind, mark);
    }

    /// Record the character under the cursor as unexpected and skip it.
    fn unexpected_character(&mut self) {
        let mark = self.mark();
        let ch = self.src[self.pos..].chars().next().unwrap_or('\u{FFFD}');
        self.advance_n(ch.len_utf8());
        self.errors.push(LexError {
            kind: LexErrorKind::UnexpectedCharacter(ch),
            span: self.span_from(mark),
        });
    }
}
