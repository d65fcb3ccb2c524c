//! Expressions, parsed by precedence climbing over four binary tiers.

use super::{PResult, ParseError, ParseErrorKind, Parser};
use crate::ast::{BinaryOp, Expr, ExprKind, ObjectField};
use crate::token::{Keyword, TokenKind};

impl Parser<'_> {
    pub(super) fn parse_expression(&mut self) -> PResult<Expr> {
        self.parse_binary(1)
    }

    /// Operands bind at least as tightly as `min_prec`; all tiers are
    /// left-associative. Every operator in the chain is one level of
    /// nesting.
    fn parse_binary(&mut self, min_prec: u8) -> PResult<Expr> {
        self.chained(|p| {
            let mut left = p.parse_atom()?;

            while let Some(op) = binary_op(&p.peek().kind) {
                let prec = op.precedence();
                if prec < min_prec {
                    break;
                }
                p.deepen()?;
                p.advance();
                let right = p.parse_binary(prec + 1)?;
                let span = left.span.to(&right.span);
                left = Expr {
                    kind: ExprKind::BinaryExpression {
                        left: Box::new(left),
                        op,
                        right: Box::new(right),
                    },
                    span,
                };
            }

            Ok(left)
        })
    }

    fn parse_atom(&mut self) -> PResult<Expr> {
        let token = self.peek();
        let start = token.span.clone();

        let kind = match &token.kind {
            TokenKind::Ident => return self.parse_identifier_expression(),
            TokenKind::String => {
                self.advance();
                ExprKind::StringLiteral(token.text.clone())
            }
            TokenKind::RawString { .. } => ExprKind::BlockString(self.take_raw_string()?),
            TokenKind::Number => {
                self.advance();
                ExprKind::NumberLiteral(token.text.clone())
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                ExprKind::BooleanLiteral(true)
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                ExprKind::BooleanLiteral(false)
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                ExprKind::NullLiteral
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                self.nested(|p| {
                    p.parse_comma_list(
                        &TokenKind::RBracket,
                        &start,
                        &mut elements,
                        Self::parse_expression,
                    )
                })?;
                ExprKind::ArrayLiteral(elements)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.nested(Self::parse_expression)?;
                self.expect_close(&TokenKind::RParen, &start)?;
                ExprKind::Grouped(Box::new(inner))
            }
            _ => return Err(self.expression_expected()),
        };

        Ok(Expr {
            kind,
            span: self.span_from(&start),
        })
    }

    /// Resolve what an identifier starts with one token of lookahead:
    /// `f(` is a call, `o.m(` a method call, `T {}` or `T { x:` an object
    /// construction, anything else the identifier itself.
    fn parse_identifier_expression(&mut self) -> PResult<Expr> {
        let name = self.expect_ident("identifier")?;
        let start = name.span.clone();

        let kind = match self.peek().kind {
            TokenKind::LParen => ExprKind::FunctionApplication {
                arguments: self.parse_arguments()?,
                function: name,
            },
            TokenKind::Dot
                if self.peek_at(2).kind == TokenKind::LParen
                    && matches!(self.peek_at(1).kind, TokenKind::Ident | TokenKind::Keyword(_)) =>
            {
                self.advance();
                let method = self.expect_name("method name")?;
                ExprKind::MethodCall {
                    object: name,
                    method,
                    arguments: self.parse_arguments()?,
                }
            }
            TokenKind::LBrace if self.at_object_body() => {
                let fields = self.nested(Self::parse_object_fields)?;
                ExprKind::ObjectConstruction {
                    type_name: name,
                    fields,
                }
            }
            _ => ExprKind::Identifier(name.name),
        };

        Ok(Expr {
            kind,
            span: self.span_from(&start),
        })
    }

    /// `{` followed by `}` or `name :`.
    fn at_object_body(&self) -> bool {
        match self.peek_at(1).kind {
            TokenKind::RBrace => true,
            TokenKind::Ident | TokenKind::Keyword(_) => self.peek_at(2).kind == TokenKind::Colon,
            _ => false,
        }
    }

    /// `( expr, ... )`
    fn parse_arguments(&mut self) -> PResult<Vec<Expr>> {
        let open = self.expect(&TokenKind::LParen, "'('")?.span.clone();
        let mut arguments = Vec::new();
        self.nested(|p| {
            p.parse_comma_list(&TokenKind::RParen, &open, &mut arguments, Self::parse_expression)
        })?;
        Ok(arguments)
    }

    /// `{ name: expr, ... }`
    fn parse_object_fields(&mut self) -> PResult<Vec<ObjectField>> {
        let open = self.expect(&TokenKind::LBrace, "'{'")?.span.clone();
        let mut fields = Vec::new();
        self.parse_comma_list(&TokenKind::RBrace, &open, &mut fields, |p| {
            let name = p.expect_name("field name")?;
            p.expect(&TokenKind::Colon, "':'")?;
            let value = p.parse_expression()?;
            let span = name.span.to(&value.span);
            Ok(ObjectField { name, value, span })
        })?;
        Ok(fields)
    }

    fn expression_expected(&self) -> ParseError {
        self.error(ParseErrorKind::ExpressionExpected {
            found: self.found(),
        })
    }
}

const fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::AndAnd => BinaryOp::And,
        TokenKind::OrOr => BinaryOp::Or,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Le => BinaryOp::Le,
        TokenKind::Ge => BinaryOp::Ge,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        _ => return None,
    };
    Some(op)
}
