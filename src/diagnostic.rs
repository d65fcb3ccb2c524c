//! Diagnostics reported by [`crate::parse`].

use std::fmt;

use serde::Serialize;

use crate::Error;
use crate::lexer::{LexError, LexErrorKind};
use crate::parser::{ParseError, ParseErrorKind};
use crate::token::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// Problems that do not stop a tree from being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    /// Raw string whose start and end markers use different quote counts.
    MismatchedRawStringMarkers {
        start_marker: String,
        end_marker: String,
    },
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MismatchedRawStringMarkers {
                start_marker,
                end_marker,
            } => write!(
                f,
                "raw string opened with {start_marker} but closed with {end_marker}"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    Lex(LexErrorKind),
    Parse(ParseErrorKind),
    Warning(WarningKind),
}

/// One reported problem, located in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    #[must_use]
    pub fn warning(kind: WarningKind, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message: kind.to_string(),
            kind: DiagnosticKind::Warning(kind),
            span,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// The typed error behind an error diagnostic; `None` for warnings.
    #[must_use]
    pub fn into_error(self) -> Option<Error> {
        match self.kind {
            DiagnosticKind::Lex(kind) => Some(Error::Lex(LexError {
                kind,
                span: self.span,
            })),
            DiagnosticKind::Parse(kind) => Some(Error::Parse(ParseError {
                kind,
                span: self.span,
            })),
            DiagnosticKind::Warning(_) => None,
        }
    }
}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        Self {
            severity: Severity::Error,
            message: err.kind.to_string(),
            kind: DiagnosticKind::Lex(err.kind),
            span: err.span,
        }
    }
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        Self {
            severity: Severity::Error,
            message: err.kind.to_string(),
            kind: DiagnosticKind::Parse(err.kind),
            span: err.span,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} at line {}, column {}",
            self.severity, self.message, self.span.line, self.span.column
        )
    }
}
