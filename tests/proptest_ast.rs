//! Property-based tests with proptest.
//!
//! Generate random ASTs, format them, parse them back, and verify the
//! round-trip produces a stable (idempotent) output.
//!
//! We check `format(parse(format(ast))) == format(ast)` rather than
//! `ast == parse(format(ast))` because spans differ and the parser
//! re-associates unions and binary operators that the formatter prints
//! without parentheses.

mod common;

use baml_syntax::ast::{
    Attribute, AttributeArguments, AttributeLevel, AttributeValue, BinaryOp, ClassKeyword,
    ClassProperty, EnumValue, ExpressionStatement, FunctionBody, Ident, LetBinding, Parameter,
    PrimitiveType, StringLiteral, TypeAlias,
};
use baml_syntax::{
    ClassDecl, Declaration, EnumDecl, Expr, ExprKind, FunctionDecl, Span, Statement, TypeExpr,
    TypeKind, format, parse, parse_str,
};
use common::assert_ast_roundtrip;
use proptest::prelude::*;

// -- Leaf strategies --

/// Type-like name: uppercase start, so never a keyword.
fn type_name() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z0-9_]{0,10}".prop_map(|s| s)
}

/// Member name: may collide with a keyword, which members allow.
fn member_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}".prop_map(|s| s)
}

/// Variable name: prefixed so it is never a keyword.
fn variable_name() -> impl Strategy<Value = String> {
    "v_[a-z0-9]{0,6}".prop_map(|s| s)
}

fn primitive() -> impl Strategy<Value = PrimitiveType> {
    prop::sample::select(vec![
        PrimitiveType::Bool,
        PrimitiveType::Int,
        PrimitiveType::Float,
        PrimitiveType::String,
        PrimitiveType::Null,
        PrimitiveType::Image,
        PrimitiveType::Audio,
        PrimitiveType::Pdf,
    ])
}

/// String literal content without quotes or backslashes.
fn string_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .:_-]{0,20}".prop_map(|s| s)
}

fn boxed(ty: TypeExpr) -> Box<TypeExpr> {
    Box::new(ty)
}

/// Type expression, nesting at most three levels.
fn type_expr() -> impl Strategy<Value = TypeExpr> {
    let leaf = prop_oneof![
        primitive().prop_map(|p| TypeExpr::new(TypeKind::Primitive(p))),
        type_name().prop_map(|n| TypeExpr::new(TypeKind::Custom(n))),
    ];

    leaf.prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            inner
                .clone()
                .prop_map(|t| TypeExpr::new(TypeKind::Array(boxed(t)))),
            inner
                .clone()
                .prop_map(|t| TypeExpr::new(TypeKind::Optional(boxed(t)))),
            inner
                .clone()
                .prop_map(|t| TypeExpr::new(TypeKind::Grouped(boxed(t)))),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| TypeExpr::new(TypeKind::Union(boxed(l), boxed(r)))),
            (inner.clone(), inner).prop_map(|(key, value)| {
                TypeExpr::new(TypeKind::Map {
                    key: boxed(key),
                    value: boxed(value),
                })
            }),
        ]
    })
}

/// Field attribute: `@name()` or `@name("value")`.
fn field_attribute() -> impl Strategy<Value = Attribute> {
    (member_name(), prop::option::of(string_value())).prop_map(|(name, value)| Attribute {
        level: AttributeLevel::Field,
        name: Ident::new(name),
        arguments: value.map(|value| {
            AttributeArguments::Single(AttributeValue::String(StringLiteral {
                value,
                span: Span::default(),
            }))
        }),
        span: Span::default(),
    })
}

fn block_attribute() -> impl Strategy<Value = Attribute> {
    member_name().prop_map(|name| Attribute {
        level: AttributeLevel::Block,
        name: Ident::new(name),
        arguments: None,
        span: Span::default(),
    })
}

fn binary_op() -> impl Strategy<Value = BinaryOp> {
    prop::sample::select(vec![
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Eq,
        BinaryOp::NotEq,
        BinaryOp::Lt,
        BinaryOp::Gt,
        BinaryOp::Le,
        BinaryOp::Ge,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Rem,
    ])
}

/// Expression, nesting at most three levels.
fn expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        "[0-9]{1,4}".prop_map(|n| Expr::new(ExprKind::NumberLiteral(n))),
        string_value().prop_map(|s| Expr::new(ExprKind::StringLiteral(s))),
        variable_name().prop_map(|n| Expr::new(ExprKind::Identifier(n))),
        any::<bool>().prop_map(|b| Expr::new(ExprKind::BooleanLiteral(b))),
        Just(Expr::new(ExprKind::NullLiteral)),
    ];

    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            (inner.clone(), binary_op(), inner.clone()).prop_map(|(left, op, right)| {
                Expr::new(ExprKind::BinaryExpression {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                })
            }),
            inner
                .clone()
                .prop_map(|e| Expr::new(ExprKind::Grouped(Box::new(e)))),
            prop::collection::vec(inner.clone(), 0..=3)
                .prop_map(|elements| Expr::new(ExprKind::ArrayLiteral(elements))),
            ("f_[a-z]{0,5}", prop::collection::vec(inner, 0..=3)).prop_map(
                |(name, arguments)| {
                    Expr::new(ExprKind::FunctionApplication {
                        function: Ident::new(name),
                        arguments,
                    })
                }
            ),
        ]
    })
}

// -- Declaration strategies --

fn enum_decl() -> impl Strategy<Value = EnumDecl> {
    (
        type_name(),
        prop::collection::vec(block_attribute(), 0..=1),
        prop::collection::vec(
            (
                "[A-Z][A-Z0-9_]{0,8}",
                prop::collection::vec(field_attribute(), 0..=2),
            ),
            0..=5,
        ),
    )
        .prop_map(|(name, attributes, values)| EnumDecl {
            name: Ident::new(name),
            attributes,
            values: values
                .into_iter()
                .map(|(name, attributes)| EnumValue {
                    name: Ident::new(name),
                    attributes,
                    span: Span::default(),
                })
                .collect(),
            span: Span::default(),
        })
}

fn class_decl() -> impl Strategy<Value = ClassDecl> {
    (
        any::<bool>(),
        type_name(),
        prop::collection::vec(block_attribute(), 0..=1),
        prop::collection::vec(
            (
                member_name(),
                type_expr(),
                prop::collection::vec(field_attribute(), 0..=2),
            ),
            0..=5,
        ),
    )
        .prop_map(|(is_override, name, attributes, properties)| ClassDecl {
            keyword: if is_override {
                ClassKeyword::Override
            } else {
                ClassKeyword::Class
            },
            name: Ident::new(name),
            attributes,
            properties: properties
                .into_iter()
                .map(|(name, ty, attributes)| ClassProperty {
                    name: Ident::new(name),
                    ty,
                    attributes,
                    span: Span::default(),
                })
                .collect(),
            span: Span::default(),
        })
}

fn type_alias() -> impl Strategy<Value = TypeAlias> {
    (type_name(), type_expr()).prop_map(|(name, ty)| TypeAlias {
        name: Ident::new(name),
        ty,
        span: Span::default(),
    })
}

fn function_decl() -> impl Strategy<Value = FunctionDecl> {
    (
        type_name(),
        prop::collection::vec((member_name(), type_expr()), 0..=3),
        prop::option::of(type_expr()),
        prop::collection::vec((variable_name(), expr()), 0..=4),
        prop::option::of(expr()),
    )
        .prop_map(|(name, parameters, return_type, lets, tail)| {
            let mut statements: Vec<Statement> = lets
                .into_iter()
                .map(|(name, value)| {
                    Statement::Let(LetBinding {
                        name: Ident::new(name),
                        value,
                        span: Span::default(),
                    })
                })
                .collect();
            if let Some(expr) = tail {
                statements.push(Statement::Expression(ExpressionStatement {
                    expr,
                    span: Span::default(),
                }));
            }
            FunctionDecl {
                name: Ident::new(name),
                parameters: parameters
                    .into_iter()
                    .map(|(name, ty)| Parameter {
                        name: Ident::new(name),
                        ty,
                        span: Span::default(),
                    })
                    .collect(),
                return_type,
                body: FunctionBody {
                    attributes: Vec::new(),
                    statements,
                    span: Span::default(),
                },
                span: Span::default(),
            }
        })
}

fn declaration() -> impl Strategy<Value = Declaration> {
    prop_oneof![
        enum_decl().prop_map(Declaration::Enum),
        class_decl().prop_map(Declaration::Class),
        type_alias().prop_map(Declaration::TypeAlias),
        function_decl().prop_map(Declaration::Function),
    ]
}

fn declarations() -> impl Strategy<Value = Vec<Declaration>> {
    prop::collection::vec(declaration(), 0..=5)
}

// -- Property tests --

proptest! {
    /// Formatting is idempotent: format(parse(format(x))) == format(x).
    #[test]
    fn format_idempotent(decls in declarations()) {
        let r1 = format(&decls);
        let parsed = parse_str(&r1)
            .map_err(|e| {
                TestCaseError::fail(
                    std::format!("parse error: {e}\n--- output ---\n{r1}"))
            })?;
        let r2 = format(&parsed);
        prop_assert_eq!(r1, r2);
    }

    /// Formatted output parses without any diagnostic, warnings included.
    #[test]
    fn format_never_produces_diagnostics(decls in declarations()) {
        let formatted = format(&decls);
        let result = parse(&formatted, "generated.baml");
        prop_assert!(
            result.diagnostics.is_empty(),
            "{:?}\n--- output ---\n{}",
            result.diagnostics,
            formatted
        );
    }

    /// Declaration names survive the round-trip in order.
    #[test]
    fn declaration_names_preserved(decls in declarations()) {
        let formatted = format(&decls);
        let parsed = parse_str(&formatted).unwrap();
        let orig: Vec<_> = decls.iter().map(Declaration::name).collect();
        let reparsed: Vec<_> = parsed.iter().map(Declaration::name).collect();
        prop_assert_eq!(orig, reparsed);
    }

    /// Enum values keep their order.
    #[test]
    fn enum_values_preserved(decl in enum_decl()) {
        let decls = vec![Declaration::Enum(decl)];
        let parsed = parse_str(&format(&decls)).unwrap();
        let (Declaration::Enum(orig), Declaration::Enum(re)) = (&decls[0], &parsed[0]) else {
            return Err(TestCaseError::fail("expected enums"));
        };
        let orig_names: Vec<_> = orig.values.iter().map(|v| &v.name.name).collect();
        let re_names: Vec<_> = re.values.iter().map(|v| &v.name.name).collect();
        prop_assert_eq!(orig_names, re_names);
        prop_assert_eq!(orig.attributes.len(), re.attributes.len());
    }

    /// Class properties keep their order and attribute counts.
    #[test]
    fn class_properties_preserved(decl in class_decl()) {
        let decls = vec![Declaration::Class(decl)];
        let parsed = parse_str(&format(&decls)).unwrap();
        let (Declaration::Class(orig), Declaration::Class(re)) = (&decls[0], &parsed[0]) else {
            return Err(TestCaseError::fail("expected classes"));
        };
        prop_assert_eq!(orig.keyword, re.keyword);
        prop_assert_eq!(orig.properties.len(), re.properties.len());
        for (a, b) in orig.properties.iter().zip(&re.properties) {
            prop_assert_eq!(&a.name.name, &b.name.name);
            prop_assert_eq!(a.attributes.len(), b.attributes.len());
        }
    }

    /// Function bodies keep their statement count.
    #[test]
    fn function_statement_count_preserved(decl in function_decl()) {
        let decls = vec![Declaration::Function(decl)];
        let parsed = parse_str(&format(&decls)).unwrap();
        let (Declaration::Function(orig), Declaration::Function(re)) = (&decls[0], &parsed[0])
        else {
            return Err(TestCaseError::fail("expected functions"));
        };
        prop_assert_eq!(orig.body.statements.len(), re.body.statements.len());
        prop_assert_eq!(orig.parameters.len(), re.parameters.len());
    }

    /// The shared helper agrees with the properties above.
    #[test]
    fn ast_roundtrip_helper(decls in declarations()) {
        assert_ast_roundtrip(&decls);
    }
}
