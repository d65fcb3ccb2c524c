//! Pretty-printer that serializes a BAML AST back into canonical text.
//!
//! Produces two-space indented output with one blank line between
//! declarations. Raw strings are written back verbatim, markers included.
//! Parentheses appear where the tree has a `Grouped` node, or where an
//! operand would otherwise re-parse with a different shape.

use std::fmt::Write as _;

use crate::ast::{
    Attribute, AttributeArguments, AttributeLevel, AttributeValue, Block, ClassDecl, ClassKeyword,
    ClientRef, ConfigBlock, ConfigItem, ConfigValue, Declaration, ElseClause, EnumDecl, Expr,
    ExprKind, ForInit, ForUpdate, FunctionDecl, IfStatement, IncrementOp, LetBinding,
    NestedObject, Parameter, PropertyAssignment, PropertyKey, RawString, Statement,
    TemplateStringDecl, TypeAlias, TypeBuilder, TypeBuilderItem, TypeExpr, TypeKind,
};

const INDENT: &str = "  ";

/// Format declarations into BAML source text.
///
/// Parsing the output of a parsed tree yields the same tree again (spans
/// aside), so formatting is idempotent. A hand-built tree whose shape has
/// no flat spelling, such as `a - (b - c)` without a `Grouped` node, gets
/// the parentheses it needs.
#[must_use]
pub fn format(declarations: &[Declaration]) -> String {
    let mut out = String::new();

    for (i, declaration) in declarations.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        format_declaration(&mut out, declaration);
    }

    out
}

fn format_declaration(out: &mut String, declaration: &Declaration) {
    match declaration {
        Declaration::Enum(decl) => format_enum(out, decl, 0),
        Declaration::Class(decl) => format_class(out, decl, 0),
        Declaration::TemplateString(decl) => format_template_string(out, decl),
        Declaration::Function(decl) => format_function(out, decl),
        Declaration::Let(binding) => {
            format_let(out, binding);
            out.push('\n');
        }
        Declaration::ConfigBlock(block) => format_config_block(out, block),
        Declaration::TypeAlias(alias) => format_type_alias(out, alias, 0),
        Declaration::TypeBuilder(builder) => format_type_builder(out, builder, 0),
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str(INDENT);
    }
}

// -- Declarations --

fn format_enum(out: &mut String, decl: &EnumDecl, indent: usize) {
    push_indent(out, indent);
    let _ = writeln!(out, "enum {} {{", decl.name.name);
    format_block_attributes(out, &decl.attributes, indent + 1);

    for value in &decl.values {
        push_indent(out, indent + 1);
        out.push_str(&value.name.name);
        format_trailing_attributes(out, &value.attributes, indent + 1);
        out.push('\n');
    }

    push_indent(out, indent);
    out.push_str("}\n");
}

fn format_class(out: &mut String, decl: &ClassDecl, indent: usize) {
    let keyword = match decl.keyword {
        ClassKeyword::Class => "class",
        ClassKeyword::Override => "override",
    };
    push_indent(out, indent);
    let _ = writeln!(out, "{keyword} {} {{", decl.name.name);
    format_block_attributes(out, &decl.attributes, indent + 1);

    for property in &decl.properties {
        push_indent(out, indent + 1);
        let _ = write!(out, "{} ", property.name.name);
        format_type(out, &property.ty);
        format_trailing_attributes(out, &property.attributes, indent + 1);
        out.push('\n');
    }

    push_indent(out, indent);
    out.push_str("}\n");
}

fn format_template_string(out: &mut String, decl: &TemplateStringDecl) {
    let _ = write!(out, "template_string {}", decl.name.name);
    if let Some(parameters) = &decl.parameters {
        format_parameters(out, parameters);
    }
    out.push(' ');
    format_raw_string(out, &decl.body);
    out.push('\n');
}

fn format_function(out: &mut String, decl: &FunctionDecl) {
    let _ = write!(out, "function {}", decl.name.name);
    format_parameters(out, &decl.parameters);
    if let Some(return_type) = &decl.return_type {
        out.push_str(" -> ");
        format_type(out, return_type);
    }
    out.push_str(" {\n");

    format_block_attributes(out, &decl.body.attributes, 1);
    format_statements(out, &decl.body.statements, 1);

    out.push_str("}\n");
}

fn format_parameters(out: &mut String, parameters: &[Parameter]) {
    out.push('(');
    for (i, parameter) in parameters.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}: ", parameter.name.name);
        format_type(out, &parameter.ty);
    }
    out.push(')');
}

fn format_config_block(out: &mut String, block: &ConfigBlock) {
    out.push_str(block.kind.as_str());
    if let Some(parameter) = &block.type_parameter {
        let _ = write!(out, "<{}>", parameter.name);
    }
    let _ = writeln!(out, " {} {{", block.name.name);

    for item in &block.items {
        match item {
            ConfigItem::Attribute(attribute) => {
                push_indent(out, 1);
                format_attribute(out, attribute, 1);
                out.push('\n');
            }
            ConfigItem::Property(property) => format_property(out, property, 1),
            ConfigItem::TypeBuilder(builder) => format_type_builder(out, builder, 1),
        }
    }

    out.push_str("}\n");
}

fn format_property(out: &mut String, property: &PropertyAssignment, indent: usize) {
    push_indent(out, indent);
    match &property.key {
        PropertyKey::Ident(ident) => out.push_str(&ident.name),
        PropertyKey::String(s) => {
            let _ = write!(out, "\"{}\"", s.value);
        }
    }
    out.push(' ');
    format_config_value(out, &property.value, indent);
    out.push('\n');
}

fn format_config_value(out: &mut String, value: &ConfigValue, indent: usize) {
    match value {
        ConfigValue::String(s) => {
            let _ = write!(out, "\"{}\"", s.value);
        }
        ConfigValue::RawString(raw) => format_raw_string(out, raw),
        ConfigValue::Number { text, .. } => out.push_str(text),
        ConfigValue::Bool { value, .. } => {
            let _ = write!(out, "{value}");
        }
        ConfigValue::Null(_) => out.push_str("null"),
        ConfigValue::Array { elements, .. } => format_expr_list(out, '[', elements, ']'),
        ConfigValue::Object(object) => format_nested_object(out, object, indent),
        ConfigValue::Reference { path, .. } => {
            for (i, segment) in path.iter().enumerate() {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(&segment.name);
            }
        }
    }
}

/// Multi-line `{ key value ... }` whose closing brace sits at `indent`.
fn format_nested_object(out: &mut String, object: &NestedObject, indent: usize) {
    if object.properties.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    for property in &object.properties {
        format_property(out, property, indent + 1);
    }
    push_indent(out, indent);
    out.push('}');
}

fn format_type_alias(out: &mut String, alias: &TypeAlias, indent: usize) {
    push_indent(out, indent);
    let _ = write!(out, "type {} = ", alias.name.name);
    format_type(out, &alias.ty);
    out.push('\n');
}

fn format_type_builder(out: &mut String, builder: &TypeBuilder, indent: usize) {
    push_indent(out, indent);
    out.push_str("type_builder {\n");
    for item in &builder.items {
        match item {
            TypeBuilderItem::Class(decl) => format_class(out, decl, indent + 1),
            TypeBuilderItem::Enum(decl) => format_enum(out, decl, indent + 1),
            TypeBuilderItem::TypeAlias(alias) => format_type_alias(out, alias, indent + 1),
        }
    }
    push_indent(out, indent);
    out.push_str("}\n");
}

// -- Attributes --

/// `@attr` after a member, on the same line.
fn format_trailing_attributes(out: &mut String, attributes: &[Attribute], indent: usize) {
    for attribute in attributes {
        out.push(' ');
        format_attribute(out, attribute, indent);
    }
}

/// Attributes on their own lines, ahead of any member so that a field
/// attribute cannot attach to the member before it.
fn format_block_attributes(out: &mut String, attributes: &[Attribute], indent: usize) {
    for attribute in attributes {
        push_indent(out, indent);
        format_attribute(out, attribute, indent);
        out.push('\n');
    }
}

fn format_attribute(out: &mut String, attribute: &Attribute, indent: usize) {
    out.push_str(match attribute.level {
        AttributeLevel::Field => "@",
        AttributeLevel::Block => "@@",
    });
    out.push_str(&attribute.name.name);
    out.push('(');
    match &attribute.arguments {
        None => {}
        Some(AttributeArguments::Single(value)) => format_attribute_value(out, value, indent),
        Some(AttributeArguments::Pair(first, second)) => {
            format_attribute_value(out, first, indent);
            out.push_str(", ");
            format_attribute_value(out, second, indent);
        }
    }
    out.push(')');
}

fn format_attribute_value(out: &mut String, value: &AttributeValue, indent: usize) {
    match value {
        AttributeValue::String(s) => {
            let _ = write!(out, "\"{}\"", s.value);
        }
        AttributeValue::RawString(raw) => format_raw_string(out, raw),
        AttributeValue::Ident(ident) => out.push_str(&ident.name),
        AttributeValue::Object(object) => format_nested_object(out, object, indent),
    }
}

// -- Statements --

/// One statement per line. Let, assignment and expression statements end
/// with `;` so that the next line can never continue them.
fn format_statements(out: &mut String, statements: &[Statement], indent: usize) {
    for statement in statements {
        push_indent(out, indent);
        format_statement(out, statement, indent);
        if matches!(
            statement,
            Statement::Let(_) | Statement::Assignment(_) | Statement::Expression(_)
        ) {
            out.push(';');
        }
        out.push('\n');
    }
}

fn format_statement(out: &mut String, statement: &Statement, indent: usize) {
    match statement {
        Statement::Let(binding) => format_let(out, binding),
        Statement::Assignment(assign) => {
            let _ = write!(out, "{} {} ", assign.target.name, assign.op.as_str());
            format_expr(out, &assign.value);
        }
        Statement::ForIn(stmt) => {
            let _ = write!(out, "for ({} in ", stmt.variable.name);
            format_expr(out, &stmt.iterable);
            out.push_str(") ");
            format_block(out, &stmt.body, indent);
        }
        Statement::ForC(stmt) => {
            out.push_str("for (");
            match &stmt.init {
                ForInit::Let(binding) => format_let(out, binding),
                ForInit::Assignment(assign) => {
                    let _ = write!(out, "{} {} ", assign.target.name, assign.op.as_str());
                    format_expr(out, &assign.value);
                }
            }
            out.push_str("; ");
            format_expr(out, &stmt.condition);
            out.push_str("; ");
            match &stmt.update {
                ForUpdate::Assignment(assign) => {
                    let _ = write!(out, "{} {} ", assign.target.name, assign.op.as_str());
                    format_expr(out, &assign.value);
                }
                ForUpdate::Increment(inc) => {
                    out.push_str(&inc.target.name);
                    out.push_str(match inc.op {
                        IncrementOp::Increment => "++",
                        IncrementOp::Decrement => "--",
                    });
                }
            }
            out.push_str(") ");
            format_block(out, &stmt.body, indent);
        }
        Statement::If(stmt) => format_if(out, stmt, indent),
        Statement::While(stmt) => {
            out.push_str("while (");
            format_expr(out, &stmt.condition);
            out.push_str(") ");
            format_block(out, &stmt.body, indent);
        }
        Statement::Block(block) => format_block(out, block, indent),
        Statement::ClientProperty(property) => match &property.client {
            ClientRef::Ident(ident) => {
                let _ = write!(out, "client {}", ident.name);
            }
            ClientRef::String(s) => {
                let _ = write!(out, "client \"{}\"", s.value);
            }
        },
        Statement::PromptProperty(property) => {
            out.push_str("prompt ");
            format_raw_string(out, &property.content);
        }
        Statement::MarkdownHeader(header) => {
            let _ = write!(out, "{} {}", "#".repeat(header.level), header.text);
        }
        Statement::Expression(stmt) => format_expr(out, &stmt.expr),
    }
}

fn format_let(out: &mut String, binding: &LetBinding) {
    let _ = write!(out, "let {} = ", binding.name.name);
    format_expr(out, &binding.value);
}

/// `if` chains are walked in a loop, mirroring how they are parsed.
fn format_if(out: &mut String, stmt: &IfStatement, indent: usize) {
    let mut current = stmt;
    loop {
        out.push_str("if (");
        format_expr(out, &current.condition);
        out.push_str(") ");
        format_block(out, &current.consequence, indent);

        match &current.alternative {
            None => return,
            Some(ElseClause::Block(block)) => {
                out.push_str(" else ");
                format_block(out, block, indent);
                return;
            }
            Some(ElseClause::If(next)) => {
                out.push_str(" else ");
                current = &**next;
            }
        }
    }
}

/// `{ ... }` whose closing brace sits at `indent`; no trailing newline.
fn format_block(out: &mut String, block: &Block, indent: usize) {
    if block.statements.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    format_statements(out, &block.statements, indent + 1);
    push_indent(out, indent);
    out.push('}');
}

// -- Expressions and types --

fn format_expr(out: &mut String, expr: &Expr) {
    match &expr.kind {
        ExprKind::Identifier(name) | ExprKind::NumberLiteral(name) => out.push_str(name),
        ExprKind::StringLiteral(value) => {
            let _ = write!(out, "\"{value}\"");
        }
        ExprKind::BlockString(raw) => format_raw_string(out, raw),
        ExprKind::BooleanLiteral(value) => {
            let _ = write!(out, "{value}");
        }
        ExprKind::NullLiteral => out.push_str("null"),
        ExprKind::ArrayLiteral(elements) => format_expr_list(out, '[', elements, ']'),
        ExprKind::ObjectConstruction { type_name, fields } => {
            out.push_str(&type_name.name);
            if fields.is_empty() {
                out.push_str(" {}");
                return;
            }
            out.push_str(" { ");
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{}: ", field.name.name);
                format_expr(out, &field.value);
            }
            out.push_str(" }");
        }
        ExprKind::FunctionApplication {
            function,
            arguments,
        } => {
            out.push_str(&function.name);
            format_expr_list(out, '(', arguments, ')');
        }
        ExprKind::MethodCall {
            object,
            method,
            arguments,
        } => {
            let _ = write!(out, "{}.{}", object.name, method.name);
            format_expr_list(out, '(', arguments, ')');
        }
        ExprKind::BinaryExpression { left, op, right } => {
            let prec = op.precedence();
            let left_looser = binary_precedence(left).is_some_and(|p| p < prec);
            let right_not_tighter = binary_precedence(right).is_some_and(|p| p <= prec);
            format_operand(out, left, left_looser);
            let _ = write!(out, " {} ", op.as_str());
            format_operand(out, right, right_not_tighter);
        }
        ExprKind::Grouped(inner) => {
            out.push('(');
            format_expr(out, inner);
            out.push(')');
        }
    }
}

const fn binary_precedence(expr: &Expr) -> Option<u8> {
    match &expr.kind {
        ExprKind::BinaryExpression { op, .. } => Some(op.precedence()),
        _ => None,
    }
}

fn format_operand(out: &mut String, operand: &Expr, parenthesize: bool) {
    if parenthesize {
        out.push('(');
        format_expr(out, operand);
        out.push(')');
    } else {
        format_expr(out, operand);
    }
}

fn format_expr_list(out: &mut String, open: char, elements: &[Expr], close: char) {
    out.push(open);
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        format_expr(out, element);
    }
    out.push(close);
}

fn format_type(out: &mut String, ty: &TypeExpr) {
    match &ty.kind {
        TypeKind::Primitive(primitive) => out.push_str(primitive.as_str()),
        TypeKind::Map { key, value } => {
            out.push_str("map<");
            format_type(out, key);
            out.push_str(", ");
            format_type(out, value);
            out.push('>');
        }
        TypeKind::Array(inner) => {
            format_type_operand(out, inner);
            out.push_str("[]");
        }
        TypeKind::Optional(inner) => {
            format_type_operand(out, inner);
            out.push('?');
        }
        TypeKind::Union(left, right) => {
            format_type(out, left);
            out.push_str(" | ");
            format_type_operand(out, right);
        }
        TypeKind::Grouped(inner) => {
            out.push('(');
            format_type(out, inner);
            out.push(')');
        }
        TypeKind::Custom(name) => out.push_str(name),
    }
}

/// A union where a postfix or right-hand operand is expected needs
/// parentheses to keep its shape.
fn format_type_operand(out: &mut String, ty: &TypeExpr) {
    if matches!(ty.kind, TypeKind::Union(..)) {
        out.push('(');
        format_type(out, ty);
        out.push(')');
    } else {
        format_type(out, ty);
    }
}

fn format_raw_string(out: &mut String, raw: &RawString) {
    out.push_str(&raw.start_marker);
    out.push_str(&raw.content);
    out.push_str(&raw.end_marker);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, ClassProperty, EnumValue, Ident, PrimitiveType};
    use crate::token::Span;

    fn prim(ty: PrimitiveType) -> TypeExpr {
        TypeExpr::new(TypeKind::Primitive(ty))
    }

    #[test]
    fn simple_enum() {
        let decl = Declaration::Enum(EnumDecl {
            name: Ident::new("Color"),
            attributes: Vec::new(),
            values: vec![
                EnumValue {
                    name: Ident::new("RED"),
                    attributes: Vec::new(),
                    span: Span::default(),
                },
                EnumValue {
                    name: Ident::new("GREEN"),
                    attributes: Vec::new(),
                    span: Span::default(),
                },
            ],
            span: Span::default(),
        });
        assert_eq!(format(&[decl]), "enum Color {\n  RED\n  GREEN\n}\n");
    }

    #[test]
    fn class_with_attributes() {
        let decl = Declaration::Class(ClassDecl {
            keyword: ClassKeyword::Class,
            name: Ident::new("Person"),
            attributes: vec![Attribute {
                level: AttributeLevel::Block,
                name: Ident::new("dynamic"),
                arguments: None,
                span: Span::default(),
            }],
            properties: vec![ClassProperty {
                name: Ident::new("tags"),
                ty: TypeExpr::new(TypeKind::Optional(Box::new(TypeExpr::new(
                    TypeKind::Array(Box::new(prim(PrimitiveType::String))),
                )))),
                attributes: vec![Attribute {
                    level: AttributeLevel::Field,
                    name: Ident::new("alias"),
                    arguments: Some(AttributeArguments::Single(AttributeValue::Ident(
                        Ident::new("labels"),
                    ))),
                    span: Span::default(),
                }],
                span: Span::default(),
            }],
            span: Span::default(),
        });
        assert_eq!(
            format(&[decl]),
            "class Person {\n  @@dynamic()\n  tags string[]? @alias(labels)\n}\n"
        );
    }

    #[test]
    fn union_and_map_types() {
        let union = TypeExpr::new(TypeKind::Union(
            Box::new(prim(PrimitiveType::Int)),
            Box::new(TypeExpr::new(TypeKind::Map {
                key: Box::new(prim(PrimitiveType::String)),
                value: Box::new(TypeExpr::new(TypeKind::Custom("Item".to_string()))),
            })),
        ));
        let mut out = String::new();
        format_type(&mut out, &union);
        assert_eq!(out, "int | map<string, Item>");
    }

    #[test]
    fn raw_string_markers_kept() {
        let raw = RawString {
            start_marker: "#\"\"".to_string(),
            content: "say #hi".to_string(),
            end_marker: "\"\"#".to_string(),
            span: Span::default(),
        };
        let mut out = String::new();
        format_raw_string(&mut out, &raw);
        assert_eq!(out, "#\"\"say #hi\"\"#");
    }

    #[test]
    fn blank_line_between_declarations() {
        let alias = |name: &str| {
            Declaration::TypeAlias(TypeAlias {
                name: Ident::new(name),
                ty: prim(PrimitiveType::Int),
                span: Span::default(),
            })
        };
        assert_eq!(
            format(&[alias("A"), alias("B")]),
            "type A = int\n\ntype B = int\n"
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(format(&[]), "");
    }

    fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
        Expr::new(ExprKind::BinaryExpression {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn ident(name: &str) -> Expr {
        Expr::new(ExprKind::Identifier(name.to_string()))
    }

    fn expr_text(expr: &Expr) -> String {
        let mut out = String::new();
        format_expr(&mut out, expr);
        out
    }

    #[test]
    fn right_nested_operand_keeps_its_shape() {
        let expr = binary(
            ident("a"),
            BinaryOp::Sub,
            binary(ident("b"), BinaryOp::Sub, ident("c")),
        );
        assert_eq!(expr_text(&expr), "a - (b - c)");
    }

    #[test]
    fn looser_operand_keeps_its_shape() {
        let expr = binary(
            binary(ident("a"), BinaryOp::Add, ident("b")),
            BinaryOp::Mul,
            binary(ident("c"), BinaryOp::Mul, ident("d")),
        );
        assert_eq!(expr_text(&expr), "(a + b) * (c * d)");

        let flat = binary(
            binary(ident("a"), BinaryOp::Mul, ident("b")),
            BinaryOp::Add,
            binary(ident("c"), BinaryOp::Mul, ident("d")),
        );
        assert_eq!(expr_text(&flat), "a * b + c * d");
    }

    #[test]
    fn union_operand_keeps_its_shape() {
        let union = || {
            TypeExpr::new(TypeKind::Union(
                Box::new(prim(PrimitiveType::Int)),
                Box::new(prim(PrimitiveType::String)),
            ))
        };
        let mut out = String::new();
        format_type(&mut out, &TypeExpr::new(TypeKind::Array(Box::new(union()))));
        assert_eq!(out, "(int | string)[]");

        let mut out = String::new();
        format_type(
            &mut out,
            &TypeExpr::new(TypeKind::Union(Box::new(prim(PrimitiveType::Bool)), Box::new(union()))),
        );
        assert_eq!(out, "bool | (int | string)");
    }
}
