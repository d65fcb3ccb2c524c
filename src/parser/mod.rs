//! Recursive-descent parser from tokens to [`Declaration`]s.
//!
//! The grammar is split across submodules by construct family: type
//! expressions, expressions, statements, attributes and declarations.
//! They all extend the single [`Parser`] cursor defined here.
//!
//! Errors never abort the whole parse. A failing top-level declaration is
//! reported and skipped up to the next declaration keyword; a failing
//! member inside `{ ... }` is reported and the rest of that body is
//! skipped, keeping the enclosing node.

mod attribute;
mod decl;
mod expr;
mod stmt;
mod types;

use std::fmt;

use crate::ast::{Declaration, Ident, RawString};
use crate::diagnostic::{Diagnostic, WarningKind};
use crate::token::{Keyword, Span, Token, TokenKind};

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum ParseErrorKind {
    /// Top-level token that starts no declaration.
    DeclarationExpected { found: String },
    /// Token that starts no type at a type position.
    TypeExpected { found: String },
    /// Token that starts no expression at an expression position.
    ExpressionExpected { found: String },
    /// Any other token mismatch.
    UnexpectedToken {
        expected: Vec<&'static str>,
        found: String,
    },
    /// End of input inside `{`, `(` or `[`.
    UnclosedDelimiter { delimiter: char },
    /// Nesting beyond [`ParseOptions::max_nesting_depth`].
    TooDeeplyNested { limit: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeclarationExpected { found } => {
                write!(f, "expected a declaration, found {found}")
            }
            Self::TypeExpected { found } => {
                write!(f, "expected a type, found {found}")
            }
            Self::ExpressionExpected { found } => {
                write!(f, "expected an expression, found {found}")
            }
            Self::UnexpectedToken { expected, found } => {
                write!(f, "expected {}, found {found}", expected.join(" or "))
            }
            Self::UnclosedDelimiter { delimiter } => {
                write!(f, "unclosed '{delimiter}'")
            }
            Self::TooDeeplyNested { limit } => {
                write!(f, "nesting exceeds the limit of {limit} levels")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", span.line, span.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Parser settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest allowed nesting of grouped expressions, types, literals
    /// and blocks. Operator chains, union and postfix type chains, and
    /// `else if` chains count one level per link.
    pub max_nesting_depth: usize,
}

impl ParseOptions {
    pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_nesting_depth: Self::DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    #[must_use]
    pub const fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a token stream into declarations plus the diagnostics raised on
/// the way.
///
/// Trivia tokens are ignored and a missing [`TokenKind::Eof`] is supplied,
/// so the output of [`crate::tokenize`] can be passed as is.
#[must_use]
pub fn parse_tokens(
    tokens: &[Token],
    options: &ParseOptions,
) -> (Vec<Declaration>, Vec<Diagnostic>) {
    let mut stream: Vec<Token> = tokens
        .iter()
        .filter(|t| !t.kind.is_trivia() && t.kind != TokenKind::Eof)
        .cloned()
        .collect();
    let end = stream
        .last()
        .map_or_else(Span::default, |t| t.span.end_point());
    stream.push(Token {
        kind: TokenKind::Eof,
        text: String::new(),
        span: end,
    });
    parse_stream(&stream, options, false)
}

/// Entry point for an Eof-terminated stream straight from the lexer.
/// `truncated` marks a stream cut short by a fatal lex error.
pub(crate) fn parse_stream(
    tokens: &[Token],
    options: &ParseOptions,
    truncated: bool,
) -> (Vec<Declaration>, Vec<Diagnostic>) {
    Parser::new(tokens, options, truncated).parse_source_file()
}

pub(crate) type PResult<T> = Result<T, ParseError>;

pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
    /// Offset where a fatal lex error cut the stream short.
    cut: Option<usize>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], options: &ParseOptions, truncated: bool) -> Self {
        debug_assert!(tokens.last().is_some_and(|t| t.kind == TokenKind::Eof));
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth: options.max_nesting_depth,
            cut: tokens
                .last()
                .filter(|_| truncated)
                .map(|eof| eof.span.start),
            diagnostics: Vec::new(),
        }
    }

    fn parse_source_file(mut self) -> (Vec<Declaration>, Vec<Diagnostic>) {
        let mut declarations = Vec::new();

        while !self.at_eof() {
            let start = self.pos;
            match self.parse_declaration() {
                Ok(declaration) => declarations.push(declaration),
                Err(err) => {
                    log::debug!("declaration failed: {err}");
                    self.report(err);
                    self.skip_balanced(start + 1, |kind| {
                        matches!(kind, TokenKind::Keyword(k) if k.starts_declaration())
                    });
                }
            }
        }

        log::debug!(
            "parsed {} declarations with {} diagnostics",
            declarations.len(),
            self.diagnostics.len()
        );
        (declarations, self.diagnostics)
    }

    // -- Cursor --

    fn peek(&self) -> &'a Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &'a Token {
        let tokens = self.tokens;
        let index = (self.pos + offset).min(tokens.len() - 1);
        &tokens[index]
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek().kind == *kind
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        self.peek().kind.is_keyword(keyword)
    }

    fn at_eof(&self) -> bool {
        self.at(&TokenKind::Eof)
    }

    /// Consume the current token. Never moves past `Eof`.
    fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> Option<&'a Token> {
        if self.at(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> Option<&'a Token> {
        if self.at_keyword(keyword) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> PResult<&'a Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&[expected]))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword, expected: &'static str) -> PResult<&'a Token> {
        self.eat_keyword(keyword)
            .ok_or_else(|| self.unexpected(&[expected]))
    }

    /// Expect the closer of a delimiter opened at `open`.
    fn expect_close(&mut self, kind: &TokenKind, open: &Span) -> PResult<&'a Token> {
        if self.at(kind) {
            return Ok(self.advance());
        }
        let (delimiter, expected) = match kind {
            TokenKind::RParen => ('(', "')'"),
            TokenKind::RBracket => ('[', "']'"),
            TokenKind::Gt => ('<', "'>'"),
            _ => ('{', "'}'"),
        };
        if self.at_eof() {
            return Err(ParseError {
                kind: ParseErrorKind::UnclosedDelimiter { delimiter },
                span: open.clone(),
            });
        }
        Err(self.unexpected(&[expected]))
    }

    /// End offset of the last consumed token.
    fn last_end(&self) -> usize {
        if self.pos == 0 {
            self.peek().span.start
        } else {
            self.tokens[self.pos - 1].span.end
        }
    }

    /// Span from the start of `start` to the end of the last consumed token.
    fn span_from(&self, start: &Span) -> Span {
        Span {
            start: start.start,
            end: self.last_end().max(start.end),
            line: start.line,
            column: start.column,
        }
    }

    // -- Names --

    /// A plain identifier.
    fn expect_ident(&mut self, expected: &'static str) -> PResult<Ident> {
        let token = self.expect(&TokenKind::Ident, expected)?;
        Ok(Ident {
            name: token.text.clone(),
            span: token.span.clone(),
        })
    }

    fn at_name(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Ident | TokenKind::Keyword(_))
    }

    /// An identifier or a keyword used as a name (`type`, `client`, ...).
    fn expect_name(&mut self, expected: &'static str) -> PResult<Ident> {
        if !self.at_name() {
            return Err(self.unexpected(&[expected]));
        }
        let token = self.advance();
        Ok(Ident {
            name: token.text.clone(),
            span: token.span.clone(),
        })
    }

    // -- Shared pieces --

    /// Consume a raw-string token, warning when its markers disagree.
    fn take_raw_string(&mut self) -> PResult<RawString> {
        let token = self.peek();
        let TokenKind::RawString {
            start_marker,
            end_marker,
        } = &token.kind
        else {
            return Err(self.unexpected(&["raw string"]));
        };
        self.advance();

        let raw = RawString {
            start_marker: start_marker.clone(),
            content: token.text.clone(),
            end_marker: end_marker.clone(),
            span: token.span.clone(),
        };
        let (start_quotes, end_quotes) = raw.quote_counts();
        if start_quotes != end_quotes {
            self.diagnostics.push(Diagnostic::warning(
                WarningKind::MismatchedRawStringMarkers {
                    start_marker: raw.start_marker.clone(),
                    end_marker: raw.end_marker.clone(),
                },
                raw.span.clone(),
            ));
        }
        Ok(raw)
    }

    /// Parse `item (, item)* ,?` up to `close`, pushing into `items`.
    /// The opening delimiter is already consumed; the closer is consumed
    /// here.
    fn parse_comma_list<T>(
        &mut self,
        close: &TokenKind,
        open: &Span,
        items: &mut Vec<T>,
        mut item: impl FnMut(&mut Self) -> PResult<T>,
    ) -> PResult<()> {
        loop {
            if self.eat(close).is_some() {
                return Ok(());
            }
            items.push(item(self)?);
            if self.eat(&TokenKind::Comma).is_none() {
                self.expect_close(close, open)?;
                return Ok(());
            }
        }
    }

    /// Parse `{ member* }`, returning the span from `{` to `}`.
    ///
    /// A failing member is reported, the rest of the body is skipped and
    /// the body still counts as parsed.
    fn parse_body(&mut self, member: impl FnMut(&mut Self) -> PResult<()>) -> PResult<Span> {
        self.parse_body_until(false, member)
    }

    /// [`Self::parse_body`] for enum and class bodies, which also end at
    /// the head of the next declaration when their `}` is missing.
    fn parse_declaration_body(
        &mut self,
        member: impl FnMut(&mut Self) -> PResult<()>,
    ) -> PResult<Span> {
        self.parse_body_until(true, member)
    }

    fn parse_body_until(
        &mut self,
        stop_at_declarations: bool,
        mut member: impl FnMut(&mut Self) -> PResult<()>,
    ) -> PResult<Span> {
        let open = self.expect(&TokenKind::LBrace, "'{'")?.span.clone();
        let stop = |kind: &TokenKind| {
            *kind == TokenKind::RBrace
                || (stop_at_declarations
                    && matches!(kind, TokenKind::Keyword(k) if k.starts_declaration()))
        };

        loop {
            if self.eat(&TokenKind::RBrace).is_some() {
                return Ok(self.span_from(&open));
            }
            if self.at_eof() {
                return Err(ParseError {
                    kind: ParseErrorKind::UnclosedDelimiter { delimiter: '{' },
                    span: open,
                });
            }
            if stop_at_declarations && self.at_declaration_head() {
                log::debug!("body closed by the next declaration");
                self.report(ParseError {
                    kind: ParseErrorKind::UnclosedDelimiter { delimiter: '{' },
                    span: open.clone(),
                });
                return Ok(self.span_from(&open));
            }

            let start = self.pos;
            if let Err(err) = member(self) {
                log::debug!("skipping rest of body: {err}");
                self.report(err);
                self.skip_balanced(start, stop);
                while stop_at_declarations
                    && !self.at(&TokenKind::RBrace)
                    && !self.at_eof()
                    && !self.at_declaration_head()
                {
                    self.skip_balanced(self.pos + 1, stop);
                }
                if self.at_eof() {
                    return Ok(self.span_from(&open));
                }
            }
        }
    }

    /// A declaration keyword in a shape no member can take: `class A {`,
    /// `client<llm>`, `function F(`, `type T =`, `type_builder {`.
    fn at_declaration_head(&self) -> bool {
        let TokenKind::Keyword(keyword) = self.peek().kind else {
            return false;
        };
        if !keyword.starts_declaration() {
            return false;
        }
        match self.peek_at(1).kind {
            TokenKind::Lt => true,
            TokenKind::LBrace => keyword == Keyword::TypeBuilder,
            TokenKind::Ident | TokenKind::Keyword(_) => matches!(
                self.peek_at(2).kind,
                TokenKind::LBrace
                    | TokenKind::LParen
                    | TokenKind::Assign
                    | TokenKind::RawString { .. }
            ),
            _ => false,
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.chained(|p| {
            p.deepen()?;
            f(p)
        })
    }

    /// Run `f`, which may [`deepen`](Self::deepen) once per link of a
    /// left-folded chain, and give the levels back afterwards.
    fn chained<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let depth = self.depth;
        let result = f(self);
        self.depth = depth;
        result
    }

    /// Take one more nesting level.
    fn deepen(&mut self) -> PResult<()> {
        if self.depth >= self.max_depth {
            return Err(self.error(ParseErrorKind::TooDeeplyNested {
                limit: self.max_depth,
            }));
        }
        self.depth += 1;
        Ok(())
    }

    // -- Errors and recovery --

    fn found(&self) -> String {
        let token = self.peek();
        match token.kind {
            TokenKind::Ident | TokenKind::Number => {
                format!("{} '{}'", token.kind.describe(), token.text)
            }
            _ => token.kind.describe(),
        }
    }

    fn unexpected(&self, expected: &[&'static str]) -> ParseError {
        ParseError {
            kind: ParseErrorKind::UnexpectedToken {
                expected: expected.to_vec(),
                found: self.found(),
            },
            span: self.peek().span.clone(),
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            span: self.peek().span.clone(),
        }
    }

    /// Record an error. In a stream the lexer cut short, errors at the cut
    /// and unclosed delimiters are dropped: the lex error explains them.
    fn report(&mut self, err: ParseError) {
        let explained = self.cut.is_some_and(|cut| {
            err.span.start >= cut
                || matches!(err.kind, ParseErrorKind::UnclosedDelimiter { .. })
        });
        if explained {
            log::trace!("dropped after truncation: {err}");
            return;
        }
        self.diagnostics.push(err.into());
    }

    /// Rewind to `from` and skip to the first token at bracket depth zero
    /// for which `stop` holds, or to `Eof`. The stop token is not consumed.
    fn skip_balanced(&mut self, from: usize, stop: impl Fn(&TokenKind) -> bool) {
        self.pos = from.min(self.tokens.len() - 1);
        let mut depth = 0usize;

        loop {
            let kind = &self.peek().kind;
            if *kind == TokenKind::Eof || (depth == 0 && stop(kind)) {
                break;
            }
            match kind {
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            self.advance();
        }
    }
}
