//! Top-level declarations and config block contents.

use super::{PResult, ParseError, ParseErrorKind, Parser};
use crate::ast::{
    ClassDecl, ClassKeyword, ClassProperty, ConfigBlock, ConfigItem, ConfigKind, ConfigValue,
    Declaration, EnumDecl, EnumValue, FunctionDecl, NestedObject, Parameter, PropertyAssignment,
    PropertyKey, StringLiteral, TemplateStringDecl, TypeAlias, TypeBuilder, TypeBuilderItem,
};
use crate::token::{Keyword, TokenKind};

impl Parser<'_> {
    pub(super) fn parse_declaration(&mut self) -> PResult<Declaration> {
        let TokenKind::Keyword(keyword) = self.peek().kind else {
            return Err(self.declaration_expected());
        };

        let declaration = match keyword {
            Keyword::Enum => Declaration::Enum(self.parse_enum()?),
            Keyword::Class | Keyword::Override => Declaration::Class(self.parse_class()?),
            Keyword::TemplateString => Declaration::TemplateString(self.parse_template_string()?),
            Keyword::Function => Declaration::Function(self.parse_function()?),
            Keyword::Let => Declaration::Let(self.parse_let_binding(true)?),
            Keyword::Client => {
                Declaration::ConfigBlock(self.parse_config_block(ConfigKind::Client)?)
            }
            Keyword::Generator => {
                Declaration::ConfigBlock(self.parse_config_block(ConfigKind::Generator)?)
            }
            Keyword::RetryPolicy => {
                Declaration::ConfigBlock(self.parse_config_block(ConfigKind::RetryPolicy)?)
            }
            Keyword::Printer => {
                Declaration::ConfigBlock(self.parse_config_block(ConfigKind::Printer)?)
            }
            Keyword::Test => Declaration::ConfigBlock(self.parse_config_block(ConfigKind::Test)?),
            Keyword::Type => Declaration::TypeAlias(self.parse_type_alias()?),
            Keyword::TypeBuilder => Declaration::TypeBuilder(self.parse_type_builder()?),
            _ => return Err(self.declaration_expected()),
        };

        log::debug!(
            "parsed {} {}",
            keyword.as_str(),
            declaration.name().unwrap_or("<anonymous>")
        );
        Ok(declaration)
    }

    fn declaration_expected(&self) -> ParseError {
        self.error(ParseErrorKind::DeclarationExpected {
            found: self.found(),
        })
    }

    fn parse_enum(&mut self) -> PResult<EnumDecl> {
        let start = self.expect_keyword(Keyword::Enum, "'enum'")?.span.clone();
        let name = self.expect_name("enum name")?;

        let mut attributes = Vec::new();
        let mut values = Vec::new();
        self.parse_declaration_body(|p| {
            if p.at_attribute() {
                attributes.push(p.parse_attribute()?);
                return Ok(());
            }
            let name = p.expect_name("enum value")?;
            let value_attributes = p.parse_field_attributes()?;
            values.push(EnumValue {
                span: p.span_from(&name.span),
                name,
                attributes: value_attributes,
            });
            Ok(())
        })?;

        Ok(EnumDecl {
            name,
            attributes,
            values,
            span: self.span_from(&start),
        })
    }

    fn parse_class(&mut self) -> PResult<ClassDecl> {
        let keyword = match self.peek().kind {
            TokenKind::Keyword(Keyword::Class) => ClassKeyword::Class,
            TokenKind::Keyword(Keyword::Override) => ClassKeyword::Override,
            _ => return Err(self.unexpected(&["'class'", "'override'"])),
        };
        let start = self.advance().span.clone();
        let name = self.expect_name("class name")?;

        let mut attributes = Vec::new();
        let mut properties = Vec::new();
        self.parse_declaration_body(|p| {
            if p.at_attribute() {
                attributes.push(p.parse_attribute()?);
            } else {
                properties.push(p.parse_class_property()?);
            }
            Ok(())
        })?;

        Ok(ClassDecl {
            keyword,
            name,
            attributes,
            properties,
            span: self.span_from(&start),
        })
    }

    /// `name [:] type @attr(...)*`
    fn parse_class_property(&mut self) -> PResult<ClassProperty> {
        let name = self.expect_name("property name")?;
        self.eat(&TokenKind::Colon);
        let ty = self.parse_type()?;
        let attributes = self.parse_field_attributes()?;

        Ok(ClassProperty {
            span: self.span_from(&name.span),
            name,
            ty,
            attributes,
        })
    }

    fn parse_template_string(&mut self) -> PResult<TemplateStringDecl> {
        let start = self
            .expect_keyword(Keyword::TemplateString, "'template_string'")?
            .span
            .clone();
        let name = self.expect_name("template name")?;
        let parameters = if self.at(&TokenKind::LParen) {
            Some(self.parse_parameters()?)
        } else {
            None
        };
        if !matches!(self.peek().kind, TokenKind::RawString { .. }) {
            return Err(self.unexpected(&["raw string"]));
        }
        let body = self.take_raw_string()?;

        Ok(TemplateStringDecl {
            name,
            parameters,
            body,
            span: self.span_from(&start),
        })
    }

    fn parse_function(&mut self) -> PResult<FunctionDecl> {
        let start = self.expect_keyword(Keyword::Function, "'function'")?.span.clone();
        let name = self.expect_name("function name")?;
        let parameters = self.parse_parameters()?;
        let return_type = if self.eat(&TokenKind::Arrow).is_some() {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = self.parse_function_body()?;

        Ok(FunctionDecl {
            name,
            parameters,
            return_type,
            body,
            span: self.span_from(&start),
        })
    }

    /// `(name: type, ...)`. A malformed list is reported and skipped to
    /// its `)`, keeping the parameters read so far.
    fn parse_parameters(&mut self) -> PResult<Vec<Parameter>> {
        let open = self.expect(&TokenKind::LParen, "'('")?.span.clone();
        let first = self.pos;
        let mut parameters = Vec::new();

        let result = self.parse_comma_list(&TokenKind::RParen, &open, &mut parameters, |p| {
            let name = p.expect_name("parameter name")?;
            p.expect(&TokenKind::Colon, "':'")?;
            let ty = p.parse_type()?;
            Ok(Parameter {
                span: p.span_from(&name.span),
                name,
                ty,
            })
        });
        let Err(err) = result else {
            return Ok(parameters);
        };

        self.skip_balanced(first, |kind| *kind == TokenKind::RParen);
        if self.eat(&TokenKind::RParen).is_none() {
            return Err(err);
        }
        log::debug!("skipped malformed parameter list: {err}");
        self.report(err);
        Ok(parameters)
    }

    /// `client<llm> Name { ... }` and the other config kinds.
    fn parse_config_block(&mut self, kind: ConfigKind) -> PResult<ConfigBlock> {
        let start = self.advance().span.clone();

        let type_parameter = match self.eat(&TokenKind::Lt) {
            Some(open) => {
                let open = open.span.clone();
                let ident = self.expect_name("identifier")?;
                self.expect_close(&TokenKind::Gt, &open)?;
                Some(ident)
            }
            None => None,
        };
        let name = self.expect_name("block name")?;

        let mut items = Vec::new();
        self.parse_body(|p| {
            let item = if p.at_attribute() {
                ConfigItem::Attribute(p.parse_attribute()?)
            } else if p.at_keyword(Keyword::TypeBuilder) && p.peek_at(1).kind == TokenKind::LBrace
            {
                ConfigItem::TypeBuilder(p.parse_type_builder()?)
            } else {
                ConfigItem::Property(p.parse_property_assignment()?)
            };
            items.push(item);
            Ok(())
        })?;

        Ok(ConfigBlock {
            kind,
            type_parameter,
            name,
            items,
            span: self.span_from(&start),
        })
    }

    /// `key value`, where the key is a name or a string.
    fn parse_property_assignment(&mut self) -> PResult<PropertyAssignment> {
        let token = self.peek();
        let key = if token.kind == TokenKind::String {
            self.advance();
            PropertyKey::String(StringLiteral {
                value: token.text.clone(),
                span: token.span.clone(),
            })
        } else {
            PropertyKey::Ident(self.expect_name("property name")?)
        };
        let value = self.parse_config_value()?;

        Ok(PropertyAssignment {
            key,
            value,
            span: self.span_from(&token.span),
        })
    }

    fn parse_config_value(&mut self) -> PResult<ConfigValue> {
        let token = self.peek();
        let start = token.span.clone();

        let value = match &token.kind {
            TokenKind::String => {
                self.advance();
                ConfigValue::String(StringLiteral {
                    value: token.text.clone(),
                    span: start,
                })
            }
            TokenKind::RawString { .. } => ConfigValue::RawString(self.take_raw_string()?),
            TokenKind::Number => {
                self.advance();
                ConfigValue::Number {
                    text: token.text.clone(),
                    span: start,
                }
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                ConfigValue::Bool { value: true, span: start }
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                ConfigValue::Bool {
                    value: false,
                    span: start,
                }
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                ConfigValue::Null(start)
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
                ConfigValue::Array {
                    elements,
                    span: self.span_from(&start),
                }
            }
            TokenKind::LBrace => ConfigValue::Object(self.parse_nested_object()?),
            TokenKind::Ident => {
                let mut path = vec![self.expect_ident("identifier")?];
                while self.eat(&TokenKind::Dot).is_some() {
                    path.push(self.expect_name("identifier")?);
                }
                ConfigValue::Reference {
                    path,
                    span: self.span_from(&start),
                }
            }
            _ => {
                return Err(self.unexpected(&[
                    "string literal",
                    "raw string",
                    "number",
                    "boolean",
                    "'null'",
                    "'['",
                    "'{'",
                    "identifier",
                ]));
            }
        };
        Ok(value)
    }

    /// `{ key value ... }`
    pub(super) fn parse_nested_object(&mut self) -> PResult<NestedObject> {
        self.nested(|p| {
            let mut properties = Vec::new();
            let span = p.parse_body(|p| {
                properties.push(p.parse_property_assignment()?);
                Ok(())
            })?;
            Ok(NestedObject { properties, span })
        })
    }

    fn parse_type_alias(&mut self) -> PResult<TypeAlias> {
        let start = self.expect_keyword(Keyword::Type, "'type'")?.span.clone();
        let name = self.expect_name("type name")?;
        self.expect(&TokenKind::Assign, "'='")?;
        let ty = self.parse_type()?;

        Ok(TypeAlias {
            name,
            ty,
            span: self.span_from(&start),
        })
    }

    fn parse_type_builder(&mut self) -> PResult<TypeBuilder> {
        let start = self
            .expect_keyword(Keyword::TypeBuilder, "'type_builder'")?
            .span
            .clone();

        let mut items = Vec::new();
        self.parse_body(|p| {
            let item = match p.peek().kind {
                TokenKind::Keyword(Keyword::Class | Keyword::Override) => {
                    TypeBuilderItem::Class(p.parse_class()?)
                }
                TokenKind::Keyword(Keyword::Enum) => TypeBuilderItem::Enum(p.parse_enum()?),
                TokenKind::Keyword(Keyword::Type) => {
                    TypeBuilderItem::TypeAlias(p.parse_type_alias()?)
                }
                _ => return Err(p.unexpected(&["'class'", "'override'", "'enum'", "'type'"])),
            };
            items.push(item);
            Ok(())
        })?;

        Ok(TypeBuilder {
            items,
            span: self.span_from(&start),
        })
    }
}
