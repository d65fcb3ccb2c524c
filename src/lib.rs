//! BAML lexer, parser, and formatter.
//!
//! A typed AST for the BAML prompt-definition language: enums, classes,
//! type aliases, functions with imperative bodies, config blocks and
//! `#"..."#` raw strings. Parsing never fails outright; every problem is
//! reported as a [`Diagnostic`] next to whatever tree could be built.
//!
//! # Quick start
//!
//! ## Parse and inspect a file
//!
//! ```
//! use baml_syntax::{Declaration, parse};
//!
//! let input = "enum Color { @@description(\"colors\") RED GREEN BLUE }";
//! let result = parse(input, "colors.baml");
//! assert!(!result.has_errors());
//!
//! let Declaration::Enum(color) = &result.ast[0] else { unreachable!() };
//! let names: Vec<_> = color.values.iter().map(|v| v.name.name.as_str()).collect();
//! assert_eq!(names, ["RED", "GREEN", "BLUE"]);
//! ```
//!
//! ## Fail fast and re-format
//!
//! ```
//! use baml_syntax::{format, parse_str};
//!
//! let ast = parse_str("class Person{name string age int?}").unwrap();
//! assert_eq!(format(&ast), "class Person {\n  name string\n  age int?\n}\n");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod diagnostic;
pub mod formatter;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{
    Attribute, ClassDecl, ConfigBlock, Declaration, EnumDecl, Expr, ExprKind, FunctionDecl,
    Statement, TypeExpr, TypeKind,
};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity, WarningKind};
pub use formatter::format;
pub use lexer::{LexError, LexErrorKind, Lexed, tokenize};
pub use parser::{ParseError, ParseErrorKind, ParseOptions, parse_tokens};
pub use token::{Keyword, Span, Token, TokenKind};

/// Unified error type covering both lexing and parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A lexer error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A parser error.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

/// Everything one parse produced.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ParseResult {
    /// Caller-chosen name for the source, usually its path.
    pub source_id: String,
    /// Declarations in source order. May be partial when there are errors.
    pub ast: Vec<Declaration>,
    /// Lex and parse diagnostics ordered by source position.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// The declarations if nothing went wrong, otherwise the first error.
    /// Warnings are dropped.
    pub fn into_result(self) -> Result<Vec<Declaration>, Error> {
        match self
            .diagnostics
            .into_iter()
            .find_map(Diagnostic::into_error)
        {
            Some(err) => Err(err),
            None => Ok(self.ast),
        }
    }
}

/// Parse BAML source text with default options.
#[must_use]
pub fn parse(source_text: &str, source_id: &str) -> ParseResult {
    parse_with_options(source_text, source_id, &ParseOptions::default())
}

/// Parse BAML source text.
///
/// Never panics and never fails; check [`ParseResult::has_errors`].
#[must_use]
pub fn parse_with_options(
    source_text: &str,
    source_id: &str,
    options: &ParseOptions,
) -> ParseResult {
    let lexed = tokenize(source_text);
    let truncated = lexed.is_truncated();
    let (ast, parse_diagnostics) = parser::parse_stream(&lexed.tokens, options, truncated);

    let mut diagnostics: Vec<Diagnostic> = lexed.errors.into_iter().map(Diagnostic::from).collect();
    diagnostics.extend(parse_diagnostics);
    diagnostics.sort_by_key(|d| d.span.start);

    log::debug!(
        "{source_id}: {} declarations, {} diagnostics",
        ast.len(),
        diagnostics.len()
    );
    ParseResult {
        source_id: source_id.to_string(),
        ast,
        diagnostics,
    }
}

/// Tokenize and parse in one step, failing on the first error.
pub fn parse_str(input: &str) -> Result<Vec<Declaration>, Error> {
    parse(input, "<input>").into_result()
}
