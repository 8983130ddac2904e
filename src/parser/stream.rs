//! Token cursor for the hand-written recursive-descent parser.

use std::mem::discriminant;

use crate::ast::span::{Span, Spanned};
use crate::diagnostics::WrapError;
use crate::lexer::Token;

/// Token stream with lookahead and byte-span tracking.
pub struct TokenStream<'src> {
    source: &'src str,
    tokens: &'src [Spanned<Token>],
    pos: usize,
}

impl<'src> TokenStream<'src> {
    pub fn new(source: &'src str, tokens: &'src [Spanned<Token>]) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> Option<&'src Token> {
        self.tokens.get(self.pos).map(|t| &t.node)
    }

    /// Peek at the nth token ahead without consuming.
    pub fn peek_nth(&self, n: usize) -> Option<&'src Token> {
        self.tokens.get(self.pos + n).map(|t| &t.node)
    }

    /// Advance to the next token and return the current one.
    pub fn advance(&mut self) -> Option<&'src Spanned<Token>> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Check if the current token has the same kind as `expected`.
    pub fn check(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(t) if discriminant(t) == discriminant(expected))
    }

    /// Consume the current token if it has the kind of `expected`.
    pub fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Expect a specific token and advance if it matches.
    pub fn expect(&mut self, expected: Token, context: &str) -> Result<Span, WrapError> {
        if self.check(&expected) {
            let span = self.current_span();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.error(format!("expected '{expected}' {context}")))
        }
    }

    /// Expect an identifier and return its text.
    pub fn expect_ident(&mut self, context: &str) -> Result<Spanned<String>, WrapError> {
        match self.tokens.get(self.pos) {
            Some(Spanned {
                node: Token::Ident(ident),
                span,
            }) => {
                self.pos += 1;
                Ok(Spanned::new(ident.to_name(), *span))
            }
            _ => Err(self.error(format!("expected identifier {context}"))),
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Index of the current token, used to slice token runs.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn tokens_between(&self, start: usize, end: usize) -> &'src [Spanned<Token>] {
        &self.tokens[start..end]
    }

    /// Span of the current token; an empty span at end of input.
    pub fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(t) => t.span,
            None => Span::new(self.source.len(), self.source.len()),
        }
    }

    /// Byte offset where the current token starts.
    pub fn start(&self) -> usize {
        self.current_span().start
    }

    /// Byte offset where the previously consumed token ends.
    pub fn prev_end(&self) -> usize {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(t) => t.span.end,
            None => 0,
        }
    }

    /// Span from `start` (a byte offset) to the end of the last consumed token.
    pub fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    /// True when the current token starts exactly where the previous one ended.
    pub fn is_adjacent(&self) -> bool {
        self.pos > 0 && self.current_span().start == self.prev_end()
    }

    /// Syntax error at the current token.
    pub fn error(&self, message: impl Into<String>) -> WrapError {
        let found = match self.peek() {
            Some(token) => token.to_string(),
            None => "end of input".to_string(),
        };
        WrapError::syntax(self.source, self.current_span(), found, message)
    }
}
