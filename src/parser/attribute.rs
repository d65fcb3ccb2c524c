//! `@name(...)` field attributes and `@@name(...)` block attributes.
//!
//! Arguments are kept as written; nothing here interprets them.

use super::{PResult, Parser};
use crate::ast::{
    Attribute, AttributeArguments, AttributeLevel, AttributeValue, Ident, StringLiteral,
};
use crate::token::TokenKind;

impl Parser<'_> {
    pub(super) fn at_attribute(&self) -> bool {
        matches!(self.peek().kind, TokenKind::At | TokenKind::AtAt)
    }

    /// Attributes directly following a member, on the same member.
    pub(super) fn parse_field_attributes(&mut self) -> PResult<Vec<Attribute>> {
        let mut attributes = Vec::new();
        while self.at(&TokenKind::At) {
            attributes.push(self.parse_attribute()?);
        }
        Ok(attributes)
    }

    pub(super) fn parse_attribute(&mut self) -> PResult<Attribute> {
        let token = self.peek();
        let level = match token.kind {
            TokenKind::At => AttributeLevel::Field,
            TokenKind::AtAt => AttributeLevel::Block,
            _ => return Err(self.unexpected(&["'@'", "'@@'"])),
        };
        self.advance();
        let start = token.span.clone();

        let name = self.expect_name("attribute name")?;
        let open = self.expect(&TokenKind::LParen, "'('")?.span.clone();

        let arguments = if self.eat(&TokenKind::RParen).is_some() {
            None
        } else {
            let first = self.parse_attribute_value()?;
            let arguments = if self.eat(&TokenKind::Comma).is_some() {
                if !matches!(first, AttributeValue::String(_) | AttributeValue::Ident(_)) {
                    return Err(self.unexpected(&["')'"]));
                }
                let second = self.parse_attribute_value()?;
                if matches!(second, AttributeValue::Object(_)) {
                    return Err(self.unexpected(&["')'"]));
                }
                AttributeArguments::Pair(first, second)
            } else {
                AttributeArguments::Single(first)
            };
            self.expect_close(&TokenKind::RParen, &open)?;
            Some(arguments)
        };

        Ok(Attribute {
            level,
            name,
            arguments,
            span: self.span_from(&start),
        })
    }

    fn parse_attribute_value(&mut self) -> PResult<AttributeValue> {
        let token = self.peek();
        let value = match &token.kind {
            TokenKind::String => {
                self.advance();
                AttributeValue::String(StringLiteral {
                    value: token.text.clone(),
                    span: token.span.clone(),
                })
            }
            TokenKind::RawString { .. } => AttributeValue::RawString(self.take_raw_string()?),
            TokenKind::Ident => {
                self.advance();
                AttributeValue::Ident(Ident {
                    name: token.text.clone(),
                    span: token.span.clone(),
                })
            }
            TokenKind::LBrace => AttributeValue::Object(self.parse_nested_object()?),
            _ => {
                return Err(self.unexpected(&[
                    "string literal",
                    "raw string",
                    "identifier",
                    "'{'",
                ]));
            }
        };
        Ok(value)
    }
}
