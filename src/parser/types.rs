//! Type syntax and template parameter lists.

use super::Parser;
use crate::ast::span::Spanned;
use crate::cst::{Indirection, TemplateArg, TemplateDecl, TemplateParam, TypeExpr};
use crate::diagnostics::WrapError;
use crate::lexer::Token;

impl Parser<'_> {
    /// `['const'] path ['<' args '>'] ['*' | '@' | '&']`
    pub(super) fn parse_type(&mut self) -> Result<TypeExpr, WrapError> {
        let start = self.stream.start();
        let is_const = self.stream.eat(&Token::Const);
        let path = self.parse_type_path()?;
        let args = if self.stream.check(&Token::Less) {
            self.parse_template_args()?
        } else {
            Vec::new()
        };
        let indirection = if self.stream.eat(&Token::Star) {
            Indirection::Shared
        } else if self.stream.eat(&Token::At) {
            Indirection::Raw
        } else if self.stream.eat(&Token::Amp) {
            Indirection::Ref
        } else {
            Indirection::None
        };
        Ok(TypeExpr {
            span: self.stream.span_from(start),
            is_const,
            path,
            args,
            indirection,
        })
    }

    /// Qualified name with an optional leading `::`.
    pub(super) fn parse_type_path(&mut self) -> Result<Vec<String>, WrapError> {
        self.stream.eat(&Token::DoubleColon);
        if self.stream.eat(&Token::Unsigned) {
            let base = self.stream.expect_ident("after 'unsigned'")?;
            return Ok(vec![format!("unsigned {}", base.node)]);
        }
        let mut path = vec![self.stream.expect_ident("as type name")?.node];
        while self.stream.eat(&Token::DoubleColon) {
            path.push(self.stream.expect_ident("after '::'")?.node);
        }
        Ok(path)
    }

    /// `'<' arg {',' arg} '>'`; each `>` closes exactly one level.
    fn parse_template_args(&mut self) -> Result<Vec<TemplateArg>, WrapError> {
        self.stream.expect(Token::Less, "")?;
        let mut args = Vec::new();
        loop {
            args.push(self.parse_template_arg()?);
            if !self.stream.eat(&Token::Comma) {
                break;
            }
        }
        self.stream.expect(Token::Greater, "to close template arguments")?;
        Ok(args)
    }

    fn parse_template_arg(&mut self) -> Result<TemplateArg, WrapError> {
        let start = self.stream.start();
        let negative = matches!(
            (self.stream.peek(), self.stream.peek_nth(1)),
            (Some(Token::Minus), Some(Token::Integer(_)))
        );
        if negative {
            self.stream.advance();
        }
        if let Some(Token::Integer(n)) = self.stream.peek() {
            self.stream.advance();
            let text = if negative { format!("-{n}") } else { n.to_string() };
            return Ok(TemplateArg::Literal(Spanned::new(text, self.stream.span_from(start))));
        }
        self.parse_type().map(TemplateArg::Type)
    }

    /// `template<T = {double, int}, U = {...}>`
    pub(super) fn parse_template(&mut self) -> Result<TemplateDecl, WrapError> {
        let start = self.stream.start();
        self.stream.expect(Token::Template, "")?;
        self.stream.expect(Token::Less, "after 'template'")?;
        let mut params = Vec::new();
        loop {
            let name = self.stream.expect_ident("as template parameter")?;
            let mut instantiations = Vec::new();
            if self.stream.eat(&Token::Equals) {
                self.stream.expect(Token::LBrace, "to open instantiation list")?;
                loop {
                    instantiations.push(self.parse_template_arg()?);
                    if !self.stream.eat(&Token::Comma) {
                        break;
                    }
                }
                self.stream.expect(Token::RBrace, "to close instantiation list")?;
            }
            params.push(TemplateParam {
                name,
                instantiations,
            });
            if !self.stream.eat(&Token::Comma) {
                break;
            }
        }
        self.stream.expect(Token::Greater, "to close template parameters")?;
        Ok(TemplateDecl {
            span: self.stream.span_from(start),
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::cst::{Indirection, Item, TemplateArg};
    use crate::parser::parse;

    fn first_param_type(source: &str) -> crate::cst::TypeExpr {
        match parse(source).unwrap().items.remove(0) {
            Item::Function(f) => f.params[0].ty.clone(),
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn test_nested_template_arguments() {
        let ty = first_param_type("void f(const std::vector<std::vector<gtsam::Point2*>>& v);");
        assert!(ty.is_const);
        assert_eq!(ty.path, ["std", "vector"]);
        assert_eq!(ty.indirection, Indirection::Ref);
        let TemplateArg::Type(inner) = &ty.args[0] else { panic!() };
        let TemplateArg::Type(innermost) = &inner.args[0] else { panic!() };
        assert_eq!(innermost.path, ["gtsam", "Point2"]);
        assert_eq!(innermost.indirection, Indirection::Shared);
    }

    #[test]
    fn test_literal_template_arguments() {
        let ty = first_param_type("void f(Eigen::Matrix<double, 3, -1> m);");
        assert_eq!(ty.args.len(), 3);
        assert!(matches!(&ty.args[1], TemplateArg::Literal(l) if l.node == "3"));
        assert!(matches!(&ty.args[2], TemplateArg::Literal(l) if l.node == "-1"));
    }

    #[test]
    fn test_unsigned_char_and_raw_pointer() {
        let ty = first_param_type("void f(unsigned char c);");
        assert_eq!(ty.path, ["unsigned char"]);
        let ty = first_param_type("void f(gtsam::noiseModel::Base@ model);");
        assert_eq!(ty.indirection, Indirection::Raw);
        let ty = first_param_type("void f(::Leading x);");
        assert_eq!(ty.path, ["Leading"]);
    }

    #[test]
    fn test_template_parameter_lists() {
        let module = parse("template<T = {double, gtsam::Pose3}, U> class A { };").unwrap();
        let Item::Class(class) = &module.items[0] else { panic!() };
        let template = class.template.as_ref().unwrap();
        assert_eq!(template.params.len(), 2);
        assert_eq!(template.params[0].instantiations.len(), 2);
        assert!(template.params[1].instantiations.is_empty());
    }
}
