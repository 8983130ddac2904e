//! Parameter lists and captured default-value expressions.

use std::mem::discriminant;

use super::Parser;
use crate::ast::span::Spanned;
use crate::cst::{DefaultExpr, DefaultKind, ParamDef};
use crate::diagnostics::WrapError;
use crate::lexer::Token;

impl Parser<'_> {
    /// `'(' [param {',' param}] ')'`
    pub(super) fn parse_params(&mut self) -> Result<Vec<ParamDef>, WrapError> {
        self.stream.expect(Token::LParen, "to open parameter list")?;
        let mut params = Vec::new();
        if self.stream.eat(&Token::RParen) {
            return Ok(params);
        }
        loop {
            let start = self.stream.start();
            let ty = self.parse_type()?;
            let name = self.stream.expect_ident("as parameter name")?;
            let default = if self.stream.eat(&Token::Equals) {
                Some(self.capture_expression(&[Token::Comma, Token::RParen], "default value")?)
            } else {
                None
            };
            params.push(ParamDef {
                span: self.stream.span_from(start),
                ty,
                name: name.node,
                default,
            });
            if !self.stream.eat(&Token::Comma) {
                break;
            }
        }
        self.stream.expect(Token::RParen, "to close parameter list")?;
        Ok(params)
    }

    /// Consume a balanced token run up to one of `stops` at depth zero and
    /// keep its exact source text.
    pub(super) fn capture_expression(
        &mut self,
        stops: &[Token],
        what: &str,
    ) -> Result<DefaultExpr, WrapError> {
        let first = self.stream.position();
        let start = self.stream.start();
        let mut closers: Vec<Token> = Vec::new();
        let mut previous: Option<&Token> = None;

        loop {
            let Some(token) = self.stream.peek() else {
                return Err(self.stream.error(format!("unterminated {what}")));
            };
            if closers.is_empty() && stops.iter().any(|s| discriminant(s) == discriminant(token)) {
                break;
            }
            match token {
                Token::LParen => closers.push(Token::RParen),
                Token::LBracket => closers.push(Token::RBracket),
                Token::LBrace => closers.push(Token::RBrace),
                // template arguments only follow a name; any other `<` compares
                Token::Less if matches!(previous, Some(Token::Ident(_) | Token::DoubleColon)) => {
                    closers.push(Token::Greater)
                }
                Token::RParen | Token::RBracket | Token::RBrace | Token::Greater => {
                    match closers.last() {
                        Some(expected) if expected == token => {
                            closers.pop();
                        }
                        // a bare comparison such as `a > b`
                        _ if matches!(token, Token::Greater) => {}
                        // `a < b)`: the open `<` was a comparison after all
                        Some(Token::Greater) => {
                            while matches!(closers.last(), Some(Token::Greater)) {
                                closers.pop();
                            }
                            continue;
                        }
                        _ => return Err(self.stream.error(format!("unbalanced bracket in {what}"))),
                    }
                }
                _ => {}
            }
            previous = Some(token);
            self.stream.advance();
        }

        let last = self.stream.position();
        if last == first {
            return Err(self.stream.error(format!("expected {what}")));
        }
        let span = self.stream.span_from(start);
        Ok(DefaultExpr {
            span,
            text: span.slice(self.stream.source()).to_string(),
            kind: classify(self.stream.tokens_between(first, last)),
        })
    }
}

fn classify(tokens: &[Spanned<Token>]) -> DefaultKind {
    let kinds: Vec<&Token> = tokens.iter().map(|t| &t.node).collect();
    match kinds.as_slice() {
        [Token::Integer(_)] | [Token::Float(_)] => DefaultKind::Number,
        [Token::Minus | Token::Plus, Token::Integer(_) | Token::Float(_)] => DefaultKind::Number,
        [Token::String(_), ..] if kinds.iter().all(|t| matches!(t, Token::String(_))) => {
            DefaultKind::String
        }
        [Token::Char(_)] => DefaultKind::Char,
        [t] if t.is_ident("true") || t.is_ident("false") => DefaultKind::Bool,
        [t] if t.is_ident("nullptr") || t.is_ident("NULL") => DefaultKind::Null,
        [Token::LBrace, .., Token::RBrace] => DefaultKind::Braced,
        [Token::Ident(_) | Token::DoubleColon, .., Token::RParen] => DefaultKind::Call,
        _ if kinds.iter().all(|t| matches!(t, Token::Ident(_) | Token::DoubleColon)) => {
            DefaultKind::Name
        }
        _ => DefaultKind::Expression,
    }
}
