//! Statements inside function bodies and nested blocks.

use super::{PResult, Parser};
use crate::ast::{
    AssignOp, Assignment, Block, ClientProperty, ClientRef, ElseClause, Expr, ExpressionStatement,
    ForC, ForIn, ForInit, ForUpdate, FunctionBody, IfStatement, Increment, IncrementOp,
    LetBinding, MarkdownHeader, PromptProperty, Statement, StringLiteral, WhileStatement,
};
use crate::token::{Keyword, Span, TokenKind};

/// Where a statement list lives. `client`, `prompt` and attributes are
/// only allowed directly in a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockContext {
    FunctionBody,
    Nested,
}

impl Parser<'_> {
    pub(super) fn parse_function_body(&mut self) -> PResult<FunctionBody> {
        let mut attributes = Vec::new();
        let mut statements = Vec::new();

        let span = self.parse_body(|p| {
            if p.at_attribute() {
                attributes.push(p.parse_attribute()?);
            } else {
                statements.push(p.parse_statement(BlockContext::FunctionBody)?);
            }
            Ok(())
        })?;

        Ok(FunctionBody {
            attributes,
            statements,
            span,
        })
    }

    fn parse_block(&mut self) -> PResult<Block> {
        self.nested(|p| {
            let mut statements = Vec::new();
            let span = p.parse_body(|p| {
                statements.push(p.parse_statement(BlockContext::Nested)?);
                Ok(())
            })?;
            Ok(Block { statements, span })
        })
    }

    fn parse_statement(&mut self, context: BlockContext) -> PResult<Statement> {
        let token = self.peek();

        match &token.kind {
            TokenKind::Keyword(Keyword::Let) => Ok(Statement::Let(self.parse_let_binding(true)?)),
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::If) => Ok(Statement::If(self.parse_if()?)),
            TokenKind::Keyword(Keyword::While) => Ok(Statement::While(self.parse_while()?)),
            TokenKind::LBrace => Ok(Statement::Block(self.parse_block()?)),
            TokenKind::MarkdownHeader { level } => {
                self.advance();
                Ok(Statement::MarkdownHeader(MarkdownHeader {
                    level: *level,
                    text: token.text.clone(),
                    span: token.span.clone(),
                }))
            }
            TokenKind::Keyword(Keyword::Client) if context == BlockContext::FunctionBody => {
                self.parse_client_property()
            }
            TokenKind::Keyword(Keyword::Prompt) if context == BlockContext::FunctionBody => {
                self.parse_prompt_property()
            }
            TokenKind::Keyword(Keyword::Client | Keyword::Prompt) => {
                Err(self.unexpected(&["statement"]))
            }
            TokenKind::At | TokenKind::AtAt => Err(self.unexpected(&["statement"])),
            TokenKind::Ident if assign_op(&self.peek_at(1).kind).is_some() => {
                Ok(Statement::Assignment(self.parse_assignment(true)?))
            }
            _ => {
                let expr = self.parse_expression()?;
                self.eat(&TokenKind::Semicolon);
                Ok(Statement::Expression(ExpressionStatement {
                    span: self.span_from(&expr.span),
                    expr,
                }))
            }
        }
    }

    /// `let name = value`, with an optional `;` when `allow_semicolon`.
    pub(super) fn parse_let_binding(&mut self, allow_semicolon: bool) -> PResult<LetBinding> {
        let start = self.expect_keyword(Keyword::Let, "'let'")?.span.clone();
        let name = self.expect_ident("variable name")?;
        self.expect(&TokenKind::Assign, "'='")?;
        let value = self.parse_expression()?;
        if allow_semicolon {
            self.eat(&TokenKind::Semicolon);
        }

        Ok(LetBinding {
            name,
            value,
            span: self.span_from(&start),
        })
    }

    fn parse_assignment(&mut self, allow_semicolon: bool) -> PResult<Assignment> {
        let target = self.expect_ident("assignment target")?;
        let Some(op) = assign_op(&self.peek().kind) else {
            return Err(self.unexpected(&["'='", "'+='", "'-='", "'*='", "'/='"]));
        };
        self.advance();
        let value = self.parse_expression()?;
        if allow_semicolon {
            self.eat(&TokenKind::Semicolon);
        }

        Ok(Assignment {
            span: self.span_from(&target.span),
            target,
            op,
            value,
        })
    }

    /// `for (x in items) { ... }` or `for (init; cond; update) { ... }`.
    fn parse_for(&mut self) -> PResult<Statement> {
        let start = self.expect_keyword(Keyword::For, "'for'")?.span.clone();
        let open = self.expect(&TokenKind::LParen, "'('")?.span.clone();

        if self.at(&TokenKind::Ident) && self.peek_at(1).kind.is_keyword(Keyword::In) {
            let variable = self.expect_ident("loop variable")?;
            self.advance();
            let iterable = self.parse_expression()?;
            self.expect_close(&TokenKind::RParen, &open)?;
            let body = self.parse_block()?;
            return Ok(Statement::ForIn(ForIn {
                variable,
                iterable,
                body,
                span: self.span_from(&start),
            }));
        }

        let init = if self.at_keyword(Keyword::Let) {
            ForInit::Let(self.parse_let_binding(false)?)
        } else {
            ForInit::Assignment(self.parse_assignment(false)?)
        };
        self.expect(&TokenKind::Semicolon, "';'")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::Semicolon, "';'")?;
        let update = self.parse_for_update()?;
        self.expect_close(&TokenKind::RParen, &open)?;
        let body = self.parse_block()?;

        Ok(Statement::ForC(ForC {
            init,
            condition,
            update,
            body,
            span: self.span_from(&start),
        }))
    }

    fn parse_for_update(&mut self) -> PResult<ForUpdate> {
        let op = match self.peek_at(1).kind {
            TokenKind::PlusPlus => IncrementOp::Increment,
            TokenKind::MinusMinus => IncrementOp::Decrement,
            _ => return Ok(ForUpdate::Assignment(self.parse_assignment(false)?)),
        };
        let target = self.expect_ident("loop variable")?;
        self.advance();

        Ok(ForUpdate::Increment(Increment {
            span: self.span_from(&target.span),
            target,
            op,
        }))
    }

    /// `if (c) { } else if (d) { } else { }`, read as a flat chain and
    /// folded from the end. Each `else if` is one level of nesting.
    fn parse_if(&mut self) -> PResult<IfStatement> {
        self.chained(Self::parse_if_chain)
    }

    fn parse_if_chain(&mut self) -> PResult<IfStatement> {
        let head = self.parse_if_branch()?;
        let mut tail = Vec::new();
        let mut alternative = None;

        while self.eat_keyword(Keyword::Else).is_some() {
            if self.at_keyword(Keyword::If) {
                self.deepen()?;
                tail.push(self.parse_if_branch()?);
            } else {
                alternative = Some(ElseClause::Block(self.parse_block()?));
                break;
            }
        }

        let end = self.last_end();
        let chained = |start: Span| Span { end, ..start };
        for (start, condition, consequence) in tail.into_iter().rev() {
            alternative = Some(ElseClause::If(Box::new(IfStatement {
                condition,
                consequence,
                alternative,
                span: chained(start),
            })));
        }

        let (start, condition, consequence) = head;
        Ok(IfStatement {
            condition,
            consequence,
            alternative,
            span: chained(start),
        })
    }

    fn parse_if_branch(&mut self) -> PResult<(Span, Expr, Block)> {
        let start = self.expect_keyword(Keyword::If, "'if'")?.span.clone();
        let condition = self.parse_condition()?;
        let consequence = self.parse_block()?;
        Ok((start, condition, consequence))
    }

    fn parse_while(&mut self) -> PResult<WhileStatement> {
        let start = self.expect_keyword(Keyword::While, "'while'")?.span.clone();
        let condition = self.parse_condition()?;
        let body = self.parse_block()?;

        Ok(WhileStatement {
            condition,
            body,
            span: self.span_from(&start),
        })
    }

    /// `( expr )`
    fn parse_condition(&mut self) -> PResult<Expr> {
        let open = self.expect(&TokenKind::LParen, "'('")?.span.clone();
        let condition = self.parse_expression()?;
        self.expect_close(&TokenKind::RParen, &open)?;
        Ok(condition)
    }

    fn parse_client_property(&mut self) -> PResult<Statement> {
        let start = self.expect_keyword(Keyword::Client, "'client'")?.span.clone();
        let token = self.peek();
        let client = match token.kind {
            TokenKind::Ident => ClientRef::Ident(self.expect_ident("client name")?),
            TokenKind::String => {
                self.advance();
                ClientRef::String(StringLiteral {
                    value: token.text.clone(),
                    span: token.span.clone(),
                })
            }
            _ => return Err(self.unexpected(&["identifier", "string literal"])),
        };

        Ok(Statement::ClientProperty(ClientProperty {
            client,
            span: self.span_from(&start),
        }))
    }

    fn parse_prompt_property(&mut self) -> PResult<Statement> {
        let start = self.expect_keyword(Keyword::Prompt, "'prompt'")?.span.clone();
        if !matches!(self.peek().kind, TokenKind::RawString { .. }) {
            return Err(self.unexpected(&["raw string"]));
        }
        let content = self.take_raw_string()?;

        Ok(Statement::PromptProperty(PromptProperty {
            content,
            span: self.span_from(&start),
        }))
    }
}

const fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::PlusAssign => AssignOp::AddAssign,
        TokenKind::MinusAssign => AssignOp::SubAssign,
        TokenKind::StarAssign => AssignOp::MulAssign,
        TokenKind::SlashAssign => AssignOp::DivAssign,
        _ => return None,
    };
    Some(op)
}
