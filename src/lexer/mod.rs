pub mod logos_lexer;
pub mod token;

pub use logos_lexer::{lex as lex_raw, LexError, RawToken};
pub use token::{Ident, Token};

use crate::ast::span::Spanned;
use crate::diagnostics::WrapError;

/// Main lexer entry point: raw lex, then drop comments.
pub fn lex(source: &str) -> Result<Vec<Spanned<Token>>, WrapError> {
    let raw_tokens = lex_raw(source).map_err(|LexError(message, span)| {
        WrapError::syntax(source, span, span.slice(source), message)
    })?;

    Ok(raw_tokens
        .into_iter()
        .filter_map(|(raw, span)| raw.to_token().map(|tok| Spanned::new(tok, span)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_are_stripped() {
        let tokens = lex("class A; // trailing\n/* block */ class B;").unwrap();
        let texts: Vec<String> = tokens.iter().map(|t| t.node.to_string()).collect();
        assert_eq!(texts, ["class", "A", ";", "class", "B", ";"]);
    }

    #[test]
    fn lex_errors_carry_position() {
        let err = lex("class A;\n  $").unwrap_err();
        assert_eq!(err.code(), "SyntaxError");
        assert!(err.to_string().contains("2:3"), "{err}");
    }
}
