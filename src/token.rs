use serde::Serialize;

/// Source location: half-open byte range plus the line and column
/// (both 1-based) of its first byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    /// Span starting where `self` starts and ending where `other` ends.
    #[must_use]
    pub const fn to(&self, other: &Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
        }
    }

    /// Zero-width span at the end of `self`.
    #[must_use]
    pub const fn end_point(&self) -> Self {
        Self {
            start: self.end,
            end: self.end,
            line: self.line,
            column: self.column,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` lies entirely inside `self`.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Reserved words. Most of them are contextual: the parser also accepts
/// them wherever a plain name is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Keyword {
    Enum,
    Class,
    Override,
    TemplateString,
    Function,
    Let,
    For,
    In,
    If,
    Else,
    While,
    Client,
    Prompt,
    Type,
    TypeBuilder,
    Generator,
    RetryPolicy,
    Printer,
    Test,
    True,
    False,
    Null,
    Bool,
    Int,
    Float,
    String,
    Image,
    Audio,
    Pdf,
    Map,
}

impl Keyword {
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        let keyword = match word {
            "enum" => Self::Enum,
            "class" => Self::Class,
            "override" => Self::Override,
            "template_string" => Self::TemplateString,
            "function" => Self::Function,
            "let" => Self::Let,
            "for" => Self::For,
            "in" => Self::In,
            "if" => Self::If,
            "else" => Self::Else,
            "while" => Self::While,
            "client" => Self::Client,
            "prompt" => Self::Prompt,
            "type" => Self::Type,
            "type_builder" => Self::TypeBuilder,
            "generator" => Self::Generator,
            "retry_policy" => Self::RetryPolicy,
            "printer" => Self::Printer,
            "test" => Self::Test,
            "true" => Self::True,
            "false" => Self::False,
            "null" => Self::Null,
            "bool" => Self::Bool,
            "int" => Self::Int,
            "float" => Self::Float,
            "string" => Self::String,
            "image" => Self::Image,
            "audio" => Self::Audio,
            "pdf" => Self::Pdf,
            "map" => Self::Map,
            _ => return None,
        };
        Some(keyword)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enum => "enum",
            Self::Class => "class",
            Self::Override => "override",
            Self::TemplateString => "template_string",
            Self::Function => "function",
            Self::Let => "let",
            Self::For => "for",
            Self::In => "in",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::Client => "client",
            Self::Prompt => "prompt",
            Self::Type => "type",
            Self::TypeBuilder => "type_builder",
            Self::Generator => "generator",
            Self::RetryPolicy => "retry_policy",
            Self::Printer => "printer",
            Self::Test => "test",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Pdf => "pdf",
            Self::Map => "map",
        }
    }

    /// Keywords that open a top-level declaration.
    #[must_use]
    pub const fn starts_declaration(self) -> bool {
        matches!(
            self,
            Self::Enum
                | Self::Class
                | Self::Override
                | Self::TemplateString
                | Self::Function
                | Self::Let
                | Self::Client
                | Self::Generator
                | Self::RetryPolicy
                | Self::Printer
                | Self::Test
                | Self::Type
                | Self::TypeBuilder
        )
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    /// Identifier (`[A-Za-z_][A-Za-z0-9_]*`) that is not a keyword.
    Ident,
    Keyword(Keyword),
    /// Unsigned number, text kept verbatim.
    Number,
    /// Double-quoted string; `text` is the content with escapes verbatim.
    String,
    /// Raw string (`#"..."#`); `text` is the content.
    RawString {
        start_marker: String,
        end_marker: String,
    },
    /// `#`-run header inside a block; `text` is the rest of the line.
    MarkdownHeader { level: usize },
    /// `// ...`
    LineComment,
    /// `/// ...`
    DocComment,
    /// `{// ... //}`
    BlockComment,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    NotEq,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    AndAnd,
    OrOr,
    PlusPlus,
    MinusMinus,
    Arrow,
    Colon,
    Semicolon,
    Comma,
    Dot,
    Question,
    Pipe,
    At,
    AtAt,
    Eof,
}

impl TokenKind {
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(
            self,
            Self::LineComment | Self::DocComment | Self::BlockComment
        )
    }

    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, Self::Keyword(k) if *k == keyword)
    }

    /// Short human-readable description used in diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        let fixed = match self {
            Self::Ident => "identifier",
            Self::Keyword(k) => return format!("'{}'", k.as_str()),
            Self::Number => "number",
            Self::String => "string literal",
            Self::RawString { .. } => "raw string",
            Self::MarkdownHeader { .. } => "markdown header",
            Self::LineComment | Self::DocComment | Self::BlockComment => "comment",
            Self::Eof => "end of input",
            other => return format!("'{}'", other.punctuation()),
        };
        fixed.to_string()
    }

    /// Source text of a punctuation token; empty for other kinds.
    #[must_use]
    pub const fn punctuation(&self) -> &'static str {
        match self {
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::EqEq => "==",
            Self::NotEq => "!=",
            Self::Assign => "=",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::StarAssign => "*=",
            Self::SlashAssign => "/=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::PlusPlus => "++",
            Self::MinusMinus => "--",
            Self::Arrow => "->",
            Self::Colon => ":",
            Self::Semicolon => ";",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::Question => "?",
            Self::Pipe => "|",
            Self::At => "@",
            Self::AtAt => "@@",
            _ => "",
        }
    }
}

/// A single token with its kind, text, and source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}
