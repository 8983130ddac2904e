pub mod error;

pub use error::WrapError;

use crate::ast::span::SourcePos;

/// Render an error as `path:line:column: Code: message`, with a note line
/// for the other side of an overload collision.
pub fn render(path: &str, source: &str, error: &WrapError) -> String {
    let pos: SourcePos = error.span().start_pos(source);
    let mut out = format!("{path}:{pos}: {}: {error}", error.code());
    if let Some(related) = error.related_span() {
        out.push_str(&format!(
            "\n{path}:{}: note: first declared here",
            related.start_pos(source)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::span::Span;

    #[test]
    fn collision_renders_both_locations() {
        let source = "void f(int a);\nvoid f(int b);\n";
        let err = WrapError::OverloadCollision {
            name: "f".into(),
            scope: "module m".into(),
            first: Span::new(0, 14),
            first_signature: "f(int)".into(),
            second: Span::new(15, 29),
            second_signature: "f(int)".into(),
        };
        let rendered = render("m.i", source, &err);
        assert!(rendered.starts_with("m.i:2:1: OverloadCollisionError:"), "{rendered}");
        assert!(rendered.contains("m.i:1:1: note: first declared here"), "{rendered}");
    }
}
