//! Identifier interning for the lexer.
//!
//! The interner is thread-local: a module is lexed and parsed on one thread,
//! and the parser turns every identifier back into an owned `String` before
//! the raw tree leaves that thread.

use std::cell::RefCell;
use std::fmt;

use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

pub type Symbol = DefaultSymbol;

type Interner = StringInterner<DefaultBackend>;

thread_local! {
    static INTERNER: RefCell<Interner> = RefCell::new(StringInterner::new());
}

/// Intern a string and return its symbol
pub fn intern(s: &str) -> Symbol {
    INTERNER.with(|interner| interner.borrow_mut().get_or_intern(s))
}

/// Run `f` against the interned text without allocating.
pub fn with_str<R>(sym: Symbol, f: impl FnOnce(&str) -> R) -> R {
    INTERNER.with(|interner| f(interner.borrow().resolve(sym).unwrap_or("")))
}

/// Resolve a symbol back to an owned string.
pub fn resolve(sym: Symbol) -> String {
    with_str(sym, str::to_owned)
}

/// An interned identifier carried by `Token::Ident`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident(Symbol);

impl Ident {
    pub fn new(text: &str) -> Self {
        Ident(intern(text))
    }

    pub fn to_name(self) -> String {
        resolve(self.0)
    }

    /// Compare against a literal without resolving to an owned string.
    pub fn is(self, text: &str) -> bool {
        with_str(self.0, |s| s == text)
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_str(self.0, |s| write!(f, "Ident({s})"))
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_str(self.0, |s| f.write_str(s))
    }
}
