use std::fmt;

pub use crate::interner::Ident;

/// Tokens of the interface language, comments already removed
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Namespace,
    Class,
    Struct,
    Virtual,
    Static,
    Const,
    Template,
    Typedef,
    Enum,
    Operator,
    Export,
    Public,
    Unsigned,

    Ident(Ident),

    // Literals
    Integer(i64),
    Float(f64),
    String(String),
    Char(String),

    /// `#include <path>` or `#include "path"`, carrying the path only
    Include(String),

    // Punctuation
    DoubleColon,
    Colon,
    Semicolon,
    Comma,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Less,
    Greater,
    Equals,
    Star,
    At,
    Amp,
    Plus,
    Minus,
    Slash,
    Percent,
    Caret,
    Pipe,
    Tilde,
    Bang,
    Dot,
    Question,
}

impl Token {
    /// Single-character operator spelling, used to glue operator symbols
    /// such as `<<=` back together from adjacent tokens.
    pub fn operator_char(&self) -> Option<char> {
        Some(match self {
            Token::Less => '<',
            Token::Greater => '>',
            Token::Equals => '=',
            Token::Star => '*',
            Token::Amp => '&',
            Token::Plus => '+',
            Token::Minus => '-',
            Token::Slash => '/',
            Token::Percent => '%',
            Token::Caret => '^',
            Token::Pipe => '|',
            Token::Tilde => '~',
            Token::Bang => '!',
            _ => return None,
        })
    }

    pub fn is_ident(&self, text: &str) -> bool {
        matches!(self, Token::Ident(ident) if ident.is(text))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Namespace => "namespace",
            Token::Class => "class",
            Token::Struct => "struct",
            Token::Virtual => "virtual",
            Token::Static => "static",
            Token::Const => "const",
            Token::Template => "template",
            Token::Typedef => "typedef",
            Token::Enum => "enum",
            Token::Operator => "operator",
            Token::Export => "export",
            Token::Public => "public",
            Token::Unsigned => "unsigned",
            Token::Ident(ident) => return write!(f, "{ident}"),
            Token::Integer(n) => return write!(f, "{n}"),
            Token::Float(n) => return write!(f, "{n}"),
            Token::String(s) => return write!(f, "\"{s}\""),
            Token::Char(c) => return write!(f, "'{c}'"),
            Token::Include(path) => return write!(f, "#include <{path}>"),
            Token::DoubleColon => "::",
            Token::Colon => ":",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Less => "<",
            Token::Greater => ">",
            Token::Equals => "=",
            Token::Star => "*",
            Token::At => "@",
            Token::Amp => "&",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Caret => "^",
            Token::Pipe => "|",
            Token::Tilde => "~",
            Token::Bang => "!",
            Token::Dot => ".",
            Token::Question => "?",
        };
        f.write_str(text)
    }
}
