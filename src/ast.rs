//! Syntax tree produced by the parser.
//!
//! Every node owns its children and carries the [`Span`] of the source
//! text it was parsed from. Member and statement lists keep source order.

use serde::Serialize;

use crate::token::Span;

/// A name together with where it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            span: Span::default(),
        }
    }
}

/// `#"..."#` string. `content` is everything between the markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawString {
    pub start_marker: String,
    pub content: String,
    pub end_marker: String,
    pub span: Span,
}

impl RawString {
    /// Raw string with the shortest markers.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            start_marker: "#\"".to_string(),
            content: content.into(),
            end_marker: "\"#".to_string(),
            span: Span::default(),
        }
    }

    /// Number of quotes in the start and end markers.
    #[must_use]
    pub fn quote_counts(&self) -> (usize, usize) {
        let count = |marker: &str| marker.chars().filter(|&c| c == '"').count();
        (count(&self.start_marker), count(&self.end_marker))
    }
}

// -----------------------------------------------------------
// Declarations.
// -----------------------------------------------------------

/// Top-level form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Declaration {
    Enum(EnumDecl),
    Class(ClassDecl),
    TemplateString(TemplateStringDecl),
    Function(FunctionDecl),
    Let(LetBinding),
    ConfigBlock(ConfigBlock),
    TypeAlias(TypeAlias),
    TypeBuilder(TypeBuilder),
}

impl Declaration {
    #[must_use]
    pub const fn span(&self) -> &Span {
        match self {
            Self::Enum(d) => &d.span,
            Self::Class(d) => &d.span,
            Self::TemplateString(d) => &d.span,
            Self::Function(d) => &d.span,
            Self::Let(d) => &d.span,
            Self::ConfigBlock(d) => &d.span,
            Self::TypeAlias(d) => &d.span,
            Self::TypeBuilder(d) => &d.span,
        }
    }

    /// Declared name; `type_builder` blocks are anonymous.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Enum(d) => Some(&d.name.name),
            Self::Class(d) => Some(&d.name.name),
            Self::TemplateString(d) => Some(&d.name.name),
            Self::Function(d) => Some(&d.name.name),
            Self::Let(d) => Some(&d.name.name),
            Self::ConfigBlock(d) => Some(&d.name.name),
            Self::TypeAlias(d) => Some(&d.name.name),
            Self::TypeBuilder(_) => None,
        }
    }
}

/// `enum Name { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDecl {
    pub name: Ident,
    /// Attributes that belong to the enum itself (`@@...`).
    pub attributes: Vec<Attribute>,
    pub values: Vec<EnumValue>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    pub name: Ident,
    pub attributes: Vec<Attribute>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassKeyword {
    Class,
    Override,
}

/// `class Name { ... }` or `override Name { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDecl {
    pub keyword: ClassKeyword,
    pub name: Ident,
    pub attributes: Vec<Attribute>,
    pub properties: Vec<ClassProperty>,
    pub span: Span,
}

/// `name type @attr(...)*`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassProperty {
    pub name: Ident,
    pub ty: TypeExpr,
    pub attributes: Vec<Attribute>,
    pub span: Span,
}

/// `template_string Name(params) #"..."#`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateStringDecl {
    pub name: Ident,
    pub parameters: Option<Vec<Parameter>>,
    pub body: RawString,
    pub span: Span,
}

/// `function Name(params) -> type { body }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDecl {
    pub name: Ident,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeExpr>,
    pub body: FunctionBody,
    pub span: Span,
}

/// `name: type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: Ident,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionBody {
    pub attributes: Vec<Attribute>,
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// `let name = value` at top level or as a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LetBinding {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfigKind {
    Client,
    Generator,
    RetryPolicy,
    Printer,
    Test,
}

impl ConfigKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Generator => "generator",
            Self::RetryPolicy => "retry_policy",
            Self::Printer => "printer",
            Self::Test => "test",
        }
    }
}

/// `client<llm> Name { ... }` and the other config block kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigBlock {
    pub kind: ConfigKind,
    /// The `<identifier>` after the kind, if any.
    pub type_parameter: Option<Ident>,
    pub name: Ident,
    pub items: Vec<ConfigItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConfigItem {
    Attribute(Attribute),
    Property(PropertyAssignment),
    TypeBuilder(TypeBuilder),
}

/// `key value` inside a config block or nested object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyAssignment {
    pub key: PropertyKey,
    pub value: ConfigValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PropertyKey {
    Ident(Ident),
    String(StringLiteral),
}

impl PropertyKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ident(ident) => &ident.name,
            Self::String(s) => &s.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringLiteral {
    /// Text between the quotes, escapes verbatim.
    pub value: String,
    pub span: Span,
}

/// Value side of a property assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConfigValue {
    String(StringLiteral),
    RawString(RawString),
    Number { text: String, span: Span },
    Bool { value: bool, span: Span },
    Null(Span),
    Array { elements: Vec<Expr>, span: Span },
    Object(NestedObject),
    /// `openai` or `env.OPENAI_API_KEY`.
    Reference { path: Vec<Ident>, span: Span },
}

impl ConfigValue {
    #[must_use]
    pub const fn span(&self) -> &Span {
        match self {
            Self::String(s) => &s.span,
            Self::RawString(r) => &r.span,
            Self::Object(o) => &o.span,
            Self::Number { span, .. }
            | Self::Bool { span, .. }
            | Self::Null(span)
            | Self::Array { span, .. }
            | Self::Reference { span, .. } => span,
        }
    }
}

/// `{ key value ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NestedObject {
    pub properties: Vec<PropertyAssignment>,
    pub span: Span,
}

/// `type Name = type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeAlias {
    pub name: Ident,
    pub ty: TypeExpr,
    pub span: Span,
}

/// `type_builder { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeBuilder {
    pub items: Vec<TypeBuilderItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeBuilderItem {
    Class(ClassDecl),
    Enum(EnumDecl),
    TypeAlias(TypeAlias),
}

// -----------------------------------------------------------
// Attributes.
// -----------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttributeLevel {
    /// `@name(...)`
    Field,
    /// `@@name(...)`
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub level: AttributeLevel,
    pub name: Ident,
    pub arguments: Option<AttributeArguments>,
    pub span: Span,
}

/// Either a single argument or exactly two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttributeArguments {
    Single(AttributeValue),
    Pair(AttributeValue, AttributeValue),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttributeValue {
    String(StringLiteral),
    RawString(RawString),
    Ident(Ident),
    Object(NestedObject),
}

// -----------------------------------------------------------
// Statements.
// -----------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Statement {
    Let(LetBinding),
    Assignment(Assignment),
    ForIn(ForIn),
    ForC(ForC),
    If(IfStatement),
    While(WhileStatement),
    Block(Block),
    ClientProperty(ClientProperty),
    PromptProperty(PromptProperty),
    MarkdownHeader(MarkdownHeader),
    Expression(ExpressionStatement),
}

impl Statement {
    #[must_use]
    pub const fn span(&self) -> &Span {
        match self {
            Self::Let(s) => &s.span,
            Self::Assignment(s) => &s.span,
            Self::ForIn(s) => &s.span,
            Self::ForC(s) => &s.span,
            Self::If(s) => &s.span,
            Self::While(s) => &s.span,
            Self::Block(s) => &s.span,
            Self::ClientProperty(s) => &s.span,
            Self::PromptProperty(s) => &s.span,
            Self::MarkdownHeader(s) => &s.span,
            Self::Expression(s) => &s.span,
        }
    }
}

/// `{ statements }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl AssignOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
        }
    }
}

/// `target op value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub target: Ident,
    pub op: AssignOp,
    pub value: Expr,
    pub span: Span,
}

/// `for (variable in iterable) body`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForIn {
    pub variable: Ident,
    pub iterable: Expr,
    pub body: Block,
    pub span: Span,
}

/// `for (init; condition; update) body`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForC {
    pub init: ForInit,
    pub condition: Expr,
    pub update: ForUpdate,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ForInit {
    Let(LetBinding),
    Assignment(Assignment),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ForUpdate {
    Assignment(Assignment),
    Increment(Increment),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IncrementOp {
    Increment,
    Decrement,
}

/// `target++` or `target--`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Increment {
    pub target: Ident,
    pub op: IncrementOp,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IfStatement {
    pub condition: Expr,
    pub consequence: Block,
    pub alternative: Option<ElseClause>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ElseClause {
    If(Box<IfStatement>),
    Block(Block),
}

impl ElseClause {
    #[must_use]
    pub const fn span(&self) -> &Span {
        match self {
            Self::If(s) => &s.span,
            Self::Block(b) => &b.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhileStatement {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ClientRef {
    Ident(Ident),
    String(StringLiteral),
}

/// `client name` inside a function body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientProperty {
    pub client: ClientRef,
    pub span: Span,
}

/// `prompt #"..."#` inside a function body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptProperty {
    pub content: RawString,
    pub span: Span,
}

/// `## text` line inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownHeader {
    pub level: usize,
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpressionStatement {
    pub expr: Expr,
    pub span: Span,
}

// -----------------------------------------------------------
// Expressions.
// -----------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    #[must_use]
    pub const fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            span: Span {
                start: 0,
                end: 0,
                line: 0,
                column: 0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExprKind {
    Identifier(String),
    /// Text between the quotes, escapes verbatim.
    StringLiteral(String),
    BlockString(RawString),
    /// Verbatim digits, e.g. `3.14`.
    NumberLiteral(String),
    BooleanLiteral(bool),
    NullLiteral,
    ArrayLiteral(Vec<Expr>),
    ObjectConstruction {
        type_name: Ident,
        fields: Vec<ObjectField>,
    },
    FunctionApplication {
        function: Ident,
        arguments: Vec<Expr>,
    },
    MethodCall {
        object: Ident,
        method: Ident,
        arguments: Vec<Expr>,
    },
    BinaryExpression {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Grouped(Box<Expr>),
}

/// `name: value` inside an object construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectField {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    /// Binding tier, 1 (loosest) to 4 (tightest).
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::And | Self::Or => 1,
            Self::Eq | Self::NotEq | Self::Lt | Self::Gt | Self::Le | Self::Ge => 2,
            Self::Add | Self::Sub => 3,
            Self::Mul | Self::Div | Self::Rem => 4,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
        }
    }
}

// -----------------------------------------------------------
// Type expressions.
// -----------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeExpr {
    pub kind: TypeKind,
    pub span: Span,
}

impl TypeExpr {
    #[must_use]
    pub const fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            span: Span {
                start: 0,
                end: 0,
                line: 0,
                column: 0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeKind {
    Primitive(PrimitiveType),
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Array(Box<TypeExpr>),
    Optional(Box<TypeExpr>),
    Union(Box<TypeExpr>, Box<TypeExpr>),
    Grouped(Box<TypeExpr>),
    Custom(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimitiveType {
    Bool,
    Int,
    Float,
    String,
    Null,
    Image,
    Audio,
    Pdf,
}

impl PrimitiveType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Null => "null",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Pdf => "pdf",
        }
    }
}
