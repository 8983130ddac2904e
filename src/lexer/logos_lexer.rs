use std::fmt::Display;

use crate::ast::span::Span;
use crate::interner::Ident;
use crate::lexer::token::Token;
use logos::Logos;

/// Raw tokens from the Logos lexer, comments still present
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum RawToken {
    // Keywords
    #[token("namespace")]
    Namespace,
    #[token("class")]
    Class,
    #[token("struct")]
    Struct,
    #[token("virtual")]
    Virtual,
    #[token("static")]
    Static,
    #[token("const")]
    Const,
    #[token("template")]
    Template,
    #[token("typedef")]
    Typedef,
    #[token("enum")]
    Enum,
    #[token("operator")]
    Operator,
    #[token("export")]
    Export,
    #[token("public")]
    Public,
    #[token("unsigned")]
    Unsigned,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| Ident::new(lex.slice()))]
    Ident(Ident),

    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| i64::from_str_radix(&lex.slice()[2..], 16).ok())]
    Integer(i64),

    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?[fF]?", parse_float)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fF]?", parse_float)]
    Float(f64),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| strip_quotes(lex.slice()))]
    String(String),

    #[regex(r"'([^'\\\n]|\\.)+'", |lex| strip_quotes(lex.slice()))]
    Char(String),

    #[regex(r"#include[ \t]*<[^>\n]*>", include_path)]
    #[regex(r#"#include[ \t]*"[^"\n]*""#, include_path)]
    Include(String),

    // Comments
    #[regex(r"//[^\n]*")]
    LineComment,
    #[token("/*", lex_block_comment)]
    BlockComment,

    // Punctuation
    #[token("::")]
    DoubleColon,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("=")]
    Equals,
    #[token("*")]
    Star,
    #[token("@")]
    At,
    #[token("&")]
    Amp,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("|")]
    Pipe,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
}

fn parse_float(lex: &mut logos::Lexer<RawToken>) -> Option<f64> {
    lex.slice().trim_end_matches(['f', 'F']).parse().ok()
}

fn strip_quotes(s: &str) -> String {
    s[1..s.len() - 1].to_string()
}

fn include_path(lex: &mut logos::Lexer<RawToken>) -> String {
    let rest = lex.slice()["#include".len()..].trim();
    rest[1..rest.len() - 1].trim().to_string()
}

/// Block comments do not nest; an unterminated one is a lexical error.
fn lex_block_comment(lex: &mut logos::Lexer<RawToken>) -> Option<()> {
    let end = lex.remainder().find("*/")?;
    lex.bump(end + 2);
    Some(())
}

impl RawToken {
    /// Convert to the parser-facing token; comments map to `None`.
    pub fn to_token(&self) -> Option<Token> {
        Some(match self {
            RawToken::Namespace => Token::Namespace,
            RawToken::Class => Token::Class,
            RawToken::Struct => Token::Struct,
            RawToken::Virtual => Token::Virtual,
            RawToken::Static => Token::Static,
            RawToken::Const => Token::Const,
            RawToken::Template => Token::Template,
            RawToken::Typedef => Token::Typedef,
            RawToken::Enum => Token::Enum,
            RawToken::Operator => Token::Operator,
            RawToken::Export => Token::Export,
            RawToken::Public => Token::Public,
            RawToken::Unsigned => Token::Unsigned,
            RawToken::Ident(ident) => Token::Ident(*ident),
            RawToken::Integer(n) => Token::Integer(*n),
            RawToken::Float(n) => Token::Float(*n),
            RawToken::String(s) => Token::String(s.clone()),
            RawToken::Char(c) => Token::Char(c.clone()),
            RawToken::Include(path) => Token::Include(path.clone()),
            RawToken::LineComment | RawToken::BlockComment => return None,
            RawToken::DoubleColon => Token::DoubleColon,
            RawToken::Colon => Token::Colon,
            RawToken::Semicolon => Token::Semicolon,
            RawToken::Comma => Token::Comma,
            RawToken::LBrace => Token::LBrace,
            RawToken::RBrace => Token::RBrace,
            RawToken::LParen => Token::LParen,
            RawToken::RParen => Token::RParen,
            RawToken::LBracket => Token::LBracket,
            RawToken::RBracket => Token::RBracket,
            RawToken::Less => Token::Less,
            RawToken::Greater => Token::Greater,
            RawToken::Equals => Token::Equals,
            RawToken::Star => Token::Star,
            RawToken::At => Token::At,
            RawToken::Amp => Token::Amp,
            RawToken::Plus => Token::Plus,
            RawToken::Minus => Token::Minus,
            RawToken::Slash => Token::Slash,
            RawToken::Percent => Token::Percent,
            RawToken::Caret => Token::Caret,
            RawToken::Pipe => Token::Pipe,
            RawToken::Tilde => Token::Tilde,
            RawToken::Bang => Token::Bang,
            RawToken::Dot => Token::Dot,
            RawToken::Question => Token::Question,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LexError(pub String, pub Span);

impl Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lex error at {}: {}", self.1, self.0)
    }
}

/// Lex source into raw tokens with their byte spans.
pub fn lex(source: &str) -> Result<Vec<(RawToken, Span)>, LexError> {
    let mut lexer = RawToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(range.start, range.end);
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(LexError(
                    format!("unexpected input '{}'", lexer.slice()),
                    span,
                ))
            }
        }
    }

    Ok(tokens)
}
