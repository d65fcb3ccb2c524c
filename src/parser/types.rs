//! Type expressions: `int`, `map<string, Foo>`, `Foo[]?`, `(A | B)[]`.

use super::{PResult, ParseError, ParseErrorKind, Parser};
use crate::ast::{PrimitiveType, TypeExpr, TypeKind};
use crate::token::{Keyword, Span, TokenKind};

impl Parser<'_> {
    /// `type := postfix ('|' postfix)*`, folded to the left. Each `|`,
    /// `[]` and `?` is one level of nesting.
    pub(super) fn parse_type(&mut self) -> PResult<TypeExpr> {
        self.chained(|p| {
            let mut ty = p.parse_postfix_type()?;

            while p.at(&TokenKind::Pipe) {
                p.deepen()?;
                p.advance();
                let right = p.parse_postfix_type()?;
                let span = ty.span.to(&right.span);
                ty = TypeExpr {
                    kind: TypeKind::Union(Box::new(ty), Box::new(right)),
                    span,
                };
            }

            Ok(ty)
        })
    }

    /// An atom followed by any mix of `[]` and `?`.
    fn parse_postfix_type(&mut self) -> PResult<TypeExpr> {
        self.chained(|p| {
            let mut ty = p.parse_type_atom()?;

            loop {
                let start = ty.span.clone();
                match p.peek().kind {
                    TokenKind::LBracket => {
                        p.deepen()?;
                        let open = p.advance().span.clone();
                        p.expect_close(&TokenKind::RBracket, &open)?;
                        ty = TypeExpr {
                            kind: TypeKind::Array(Box::new(ty)),
                            span: p.span_from(&start),
                        };
                    }
                    TokenKind::Question => {
                        p.deepen()?;
                        p.advance();
                        ty = TypeExpr {
                            kind: TypeKind::Optional(Box::new(ty)),
                            span: p.span_from(&start),
                        };
                    }
                    _ => return Ok(ty),
                }
            }
        })
    }

    fn parse_type_atom(&mut self) -> PResult<TypeExpr> {
        let token = self.peek();
        let start = token.span.clone();

        let kind = match &token.kind {
            TokenKind::Keyword(keyword) => {
                if let Some(primitive) = primitive(*keyword) {
                    self.advance();
                    TypeKind::Primitive(primitive)
                } else if *keyword == Keyword::Map {
                    self.advance();
                    return self.nested(|p| p.parse_map_type(&start));
                } else {
                    return Err(self.type_expected());
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.nested(Self::parse_type)?;
                self.expect_close(&TokenKind::RParen, &start)?;
                TypeKind::Grouped(Box::new(inner))
            }
            TokenKind::Ident => {
                self.advance();
                TypeKind::Custom(token.text.clone())
            }
            _ => return Err(self.type_expected()),
        };

        Ok(TypeExpr {
            kind,
            span: self.span_from(&start),
        })
    }

    /// `<K, V>` after the `map` keyword.
    fn parse_map_type(&mut self, start: &Span) -> PResult<TypeExpr> {
        let open = self.expect(&TokenKind::Lt, "'<'")?.span.clone();
        let key = self.parse_type()?;
        self.expect(&TokenKind::Comma, "','")?;
        let value = self.parse_type()?;
        self.expect_close(&TokenKind::Gt, &open)?;

        Ok(TypeExpr {
            kind: TypeKind::Map {
                key: Box::new(key),
                value: Box::new(value),
            },
            span: self.span_from(start),
        })
    }

    fn type_expected(&self) -> ParseError {
        self.error(ParseErrorKind::TypeExpected {
            found: self.found(),
        })
    }
}

const fn primitive(keyword: Keyword) -> Option<PrimitiveType> {
    let ty = match keyword {
        Keyword::Bool => PrimitiveType::Bool,
        Keyword::Int => PrimitiveType::Int,
        Keyword::Float => PrimitiveType::Float,
        Keyword::String => PrimitiveType::String,
        Keyword::Null => PrimitiveType::Null,
        Keyword::Image => PrimitiveType::Image,
        Keyword::Audio => PrimitiveType::Audio,
        Keyword::Pdf => PrimitiveType::Pdf,
        _ => return None,
    };
    Some(ty)
}
