//! Recursive-descent parser for the interface language.
//!
//! Every production decides on at most two tokens of lookahead; bracketed
//! runs (template arguments, default values) are matched by depth instead
//! of backtracking.

mod params;
mod stream;
mod types;

pub use stream::TokenStream;

use crate::ast::span::{Span, Spanned};
use crate::cst::*;
use crate::diagnostics::WrapError;
use crate::lexer::{lex, Token};

/// Parse interface source into the raw declaration tree.
pub fn parse(source: &str) -> Result<Module, WrapError> {
    let tokens = lex(source)?;
    let mut parser = Parser::new(source, &tokens);
    parser.parse_module()
}

pub struct Parser<'src> {
    stream: TokenStream<'src>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, tokens: &'src [Spanned<Token>]) -> Self {
        Self {
            stream: TokenStream::new(source, tokens),
        }
    }

    pub fn parse_module(&mut self) -> Result<Module, WrapError> {
        let items = self.parse_items(false)?;
        Ok(Module {
            span: Span::new(0, self.stream.source().len()),
            items,
        })
    }

    /// Items up to end of input, or up to a closing `}` inside a namespace.
    fn parse_items(&mut self, in_namespace: bool) -> Result<Vec<Item>, WrapError> {
        let mut items = Vec::new();
        loop {
            if self.stream.at_end() {
                if in_namespace {
                    return Err(self.stream.error("expected '}' to close namespace"));
                }
                break;
            }
            if in_namespace && self.stream.check(&Token::RBrace) {
                break;
            }
            items.push(self.parse_item()?);
        }
        Ok(items)
    }

    fn parse_item(&mut self) -> Result<Item, WrapError> {
        let start = self.stream.start();
        match self.stream.peek() {
            Some(Token::Include(path)) => {
                self.stream.advance();
                Ok(Item::Include(Spanned::new(path.clone(), self.stream.span_from(start))))
            }
            Some(Token::Namespace) => self.parse_namespace().map(Item::Namespace),
            Some(Token::Typedef) => self.parse_typedef().map(Item::Typedef),
            Some(Token::Enum) | Some(Token::Export) => self.parse_enum().map(Item::Enum),
            Some(Token::Template) => {
                let template = self.parse_template()?;
                if self.stream.check(&Token::Class) || self.stream.check(&Token::Virtual) {
                    self.parse_class_or_forward(start, Some(template))
                } else {
                    self.parse_function_or_variable(start, Some(template))
                }
            }
            Some(Token::Class) | Some(Token::Virtual) => self.parse_class_or_forward(start, None),
            Some(_) => self.parse_function_or_variable(start, None),
            None => Err(self.stream.error("expected a declaration")),
        }
    }

    fn parse_namespace(&mut self) -> Result<Namespace, WrapError> {
        let start = self.stream.start();
        self.stream.expect(Token::Namespace, "")?;
        let name = self.stream.expect_ident("after 'namespace'")?;
        self.stream.expect(Token::LBrace, "to open namespace body")?;
        let items = self.parse_items(true)?;
        self.stream.expect(Token::RBrace, "to close namespace")?;
        self.stream.eat(&Token::Semicolon);
        Ok(Namespace {
            span: self.stream.span_from(start),
            name,
            items,
        })
    }

    fn parse_typedef(&mut self) -> Result<Typedef, WrapError> {
        let start = self.stream.start();
        self.stream.expect(Token::Typedef, "")?;
        let target = self.parse_type()?;
        let alias = self.stream.expect_ident("as typedef name")?;
        self.stream.expect(Token::Semicolon, "after typedef")?;
        Ok(Typedef {
            span: self.stream.span_from(start),
            target,
            alias,
        })
    }

    fn parse_enum(&mut self) -> Result<EnumDef, WrapError> {
        let start = self.stream.start();
        let export_values = self.stream.eat(&Token::Export);
        self.stream.expect(Token::Enum, "")?;
        let is_scoped = self.stream.eat(&Token::Class) || self.stream.eat(&Token::Struct);
        let name = self.stream.expect_ident("as enum name")?;
        self.stream.expect(Token::LBrace, "to open enum body")?;

        let mut enumerators = Vec::new();
        while !self.stream.check(&Token::RBrace) {
            let label_start = self.stream.start();
            let label = self.stream.expect_ident("as enumerator")?;
            let value = if self.stream.eat(&Token::Equals) {
                Some(self.capture_expression(&[Token::Comma, Token::RBrace], "enumerator value")?.text)
            } else {
                None
            };
            enumerators.push(Enumerator {
                span: self.stream.span_from(label_start),
                name: label.node,
                value,
            });
            if !self.stream.eat(&Token::Comma) {
                break;
            }
        }
        self.stream.expect(Token::RBrace, "to close enum body")?;
        self.stream.expect(Token::Semicolon, "after enum")?;

        if enumerators.is_empty() {
            return Err(WrapError::syntax(
                self.stream.source(),
                name.span,
                name.node.clone(),
                "enum must declare at least one enumerator",
            ));
        }
        Ok(EnumDef {
            span: self.stream.span_from(start),
            name,
            is_scoped,
            export_values,
            enumerators,
        })
    }

    fn parse_class_or_forward(
        &mut self,
        start: usize,
        template: Option<TemplateDecl>,
    ) -> Result<Item, WrapError> {
        let is_virtual = self.stream.eat(&Token::Virtual);
        self.stream.expect(Token::Class, "")?;
        let name_start = self.stream.start();
        let path = self.parse_type_path()?;
        let name_span = self.stream.span_from(name_start);
        let base = if self.stream.eat(&Token::Colon) {
            self.stream.eat(&Token::Public);
            Some(self.parse_type()?)
        } else {
            None
        };

        if self.stream.eat(&Token::Semicolon) {
            if template.is_some() {
                return Err(WrapError::syntax(
                    self.stream.source(),
                    name_span,
                    path.join("::"),
                    "forward declarations cannot carry a template",
                ));
            }
            return Ok(Item::ForwardDecl(ForwardDecl {
                span: self.stream.span_from(start),
                is_virtual,
                path,
                base,
            }));
        }

        if path.len() != 1 {
            return Err(WrapError::syntax(
                self.stream.source(),
                name_span,
                path.join("::"),
                "a class definition must use an unqualified name; wrap it in a namespace",
            ));
        }
        let name = Spanned::new(path.into_iter().next().unwrap_or_default(), name_span);

        self.stream.expect(Token::LBrace, "to open class body")?;
        let mut members = Vec::new();
        while !self.stream.check(&Token::RBrace) {
            if self.stream.at_end() {
                return Err(self.stream.error("expected '}' to close class body"));
            }
            if let Some(member) = self.parse_member(&name.node)? {
                members.push(member);
            }
        }
        self.stream.expect(Token::RBrace, "to close class body")?;
        self.stream.expect(Token::Semicolon, "after class definition")?;

        Ok(Item::Class(ClassDef {
            span: self.stream.span_from(start),
            template,
            is_virtual,
            name,
            base,
            members,
        }))
    }

    /// One class member; `None` for an access label such as `public:`.
    fn parse_member(&mut self, class_name: &str) -> Result<Option<Member>, WrapError> {
        let start = self.stream.start();
        if self.stream.check(&Token::Public) && matches!(self.stream.peek_nth(1), Some(Token::Colon)) {
            self.stream.advance();
            self.stream.advance();
            return Ok(None);
        }

        let template = if self.stream.check(&Token::Template) {
            Some(self.parse_template()?)
        } else {
            None
        };

        match self.stream.peek() {
            Some(Token::Enum) | Some(Token::Export) => {
                self.reject_template(&template, "nested enums")?;
                return self.parse_enum().map(|e| Some(Member::Enum(e)));
            }
            Some(Token::Static) => {
                self.stream.advance();
                let method = self.parse_method_rest(start, template)?;
                return Ok(Some(Member::StaticMethod(method)));
            }
            Some(Token::Ident(ident))
                if dunder_name(&ident.to_name()).is_some()
                    && matches!(self.stream.peek_nth(1), Some(Token::LParen)) =>
            {
                self.reject_template(&template, "dunder methods")?;
                let name = self.stream.expect_ident("as dunder method name")?;
                return self.parse_dunder_rest(start, name).map(|d| Some(Member::Dunder(d)));
            }
            Some(Token::Ident(ident))
                if ident.is(class_name) && matches!(self.stream.peek_nth(1), Some(Token::LParen)) =>
            {
                self.stream.advance();
                let params = self.parse_params()?;
                self.stream.expect(Token::Semicolon, "after constructor")?;
                return Ok(Some(Member::Constructor(CtorDef {
                    span: self.stream.span_from(start),
                    template,
                    params,
                })));
            }
            Some(Token::Virtual) => {
                self.stream.advance();
            }
            _ => {}
        }

        let ty = self.parse_type()?;
        if self.stream.eat(&Token::Operator) {
            self.reject_template(&template, "operators")?;
            let symbol = self.parse_operator_symbol()?;
            let params = self.parse_params()?;
            let is_const = self.stream.eat(&Token::Const);
            self.stream.expect(Token::Semicolon, "after operator declaration")?;
            return Ok(Some(Member::Operator(OperatorDef {
                span: self.stream.span_from(start),
                return_type: ty,
                symbol,
                params,
                is_const,
            })));
        }

        let name = self.stream.expect_ident("as member name")?;
        if dunder_name(&name.node).is_some() && self.stream.check(&Token::LParen) {
            // the protocol fixes the host signature; a written return type is ignored
            self.reject_template(&template, "dunder methods")?;
            return self.parse_dunder_rest(start, name).map(|d| Some(Member::Dunder(d)));
        }
        if self.stream.check(&Token::LParen) {
            let params = self.parse_params()?;
            let is_const = self.stream.eat(&Token::Const);
            self.stream.expect(Token::Semicolon, "after method declaration")?;
            return Ok(Some(Member::Method(MethodDef {
                span: self.stream.span_from(start),
                template,
                return_type: ty,
                name,
                params,
                is_const,
            })));
        }

        self.reject_template(&template, "fields")?;
        self.stream.expect(Token::Semicolon, "after field declaration")?;
        Ok(Some(Member::Field(FieldDef {
            span: self.stream.span_from(start),
            ty,
            name,
        })))
    }

    /// `(params) [const];` after a `__name__` identifier.
    fn parse_dunder_rest(&mut self, start: usize, name: Spanned<String>) -> Result<DunderDef, WrapError> {
        let params = self.parse_params()?;
        self.stream.eat(&Token::Const);
        self.stream.expect(Token::Semicolon, "after dunder method")?;
        let bare = dunder_name(&name.node).unwrap_or(&name.node).to_string();
        Ok(DunderDef {
            span: self.stream.span_from(start),
            name: Spanned::new(bare, name.span),
            params,
        })
    }

    /// `ret name(params) [const];` after an optional `static`.
    fn parse_method_rest(
        &mut self,
        start: usize,
        template: Option<TemplateDecl>,
    ) -> Result<MethodDef, WrapError> {
        let return_type = self.parse_type()?;
        let name = self.stream.expect_ident("as method name")?;
        let params = self.parse_params()?;
        let is_const = self.stream.eat(&Token::Const);
        self.stream.expect(Token::Semicolon, "after method declaration")?;
        Ok(MethodDef {
            span: self.stream.span_from(start),
            template,
            return_type,
            name,
            params,
            is_const,
        })
    }

    /// `()`, `[]`, or a run of adjacent operator characters such as `<<=`.
    fn parse_operator_symbol(&mut self) -> Result<Spanned<String>, WrapError> {
        let start = self.stream.start();
        if self.stream.eat(&Token::LParen) {
            self.stream.expect(Token::RParen, "in 'operator()'")?;
            return Ok(Spanned::new("()".into(), self.stream.span_from(start)));
        }
        if self.stream.eat(&Token::LBracket) {
            self.stream.expect(Token::RBracket, "in 'operator[]'")?;
            return Ok(Spanned::new("[]".into(), self.stream.span_from(start)));
        }

        let mut symbol = String::new();
        while let Some(c) = self.stream.peek().and_then(Token::operator_char) {
            if !symbol.is_empty() && !self.stream.is_adjacent() {
                break;
            }
            symbol.push(c);
            self.stream.advance();
        }
        if symbol.is_empty() {
            return Err(self.stream.error("expected an operator symbol after 'operator'"));
        }
        Ok(Spanned::new(symbol, self.stream.span_from(start)))
    }

    fn parse_function_or_variable(
        &mut self,
        start: usize,
        template: Option<TemplateDecl>,
    ) -> Result<Item, WrapError> {
        let ty = self.parse_type()?;
        let name = self.stream.expect_ident("as declaration name")?;
        if self.stream.check(&Token::LParen) {
            let params = self.parse_params()?;
            self.stream.expect(Token::Semicolon, "after function declaration")?;
            return Ok(Item::Function(FunctionDef {
                span: self.stream.span_from(start),
                template,
                return_type: ty,
                name,
                params,
            }));
        }

        self.reject_template(&template, "variables")?;
        let default = if self.stream.eat(&Token::Equals) {
            Some(self.capture_expression(&[Token::Semicolon], "variable initializer")?)
        } else {
            None
        };
        self.stream.expect(Token::Semicolon, "after variable declaration")?;
        Ok(Item::Variable(VariableDef {
            span: self.stream.span_from(start),
            ty,
            name,
            default,
        }))
    }

    fn reject_template(&self, template: &Option<TemplateDecl>, what: &str) -> Result<(), WrapError> {
        match template {
            Some(t) => Err(WrapError::syntax(
                self.stream.source(),
                t.span,
                "template",
                format!("{what} cannot be templated"),
            )),
            None => Ok(()),
        }
    }
}

/// `len` for `__len__`.
fn dunder_name(ident: &str) -> Option<&str> {
    ident
        .strip_prefix("__")?
        .strip_suffix("__")
        .filter(|name| !name.is_empty())
}
