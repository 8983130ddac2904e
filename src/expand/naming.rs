use crate::ast::TypeRef;

/// Instantiation suffix of one template argument: its unqualified name
/// with the first character upper-cased, followed by the suffixes of its
/// own template arguments (`Fun<double>` gives `FunDouble`).
pub fn camel_suffix(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Primitive(kind) => kind.cpp_name().split_whitespace().map(capitalize).collect(),
        TypeRef::String(path) | TypeRef::Enum(path) => capitalize(&path.name),
        TypeRef::NativeClass { path, args }
        | TypeRef::Numeric { path, args, .. }
        | TypeRef::Container { path, args, .. } => {
            let mut out = capitalize(&path.name);
            for arg in args {
                out.push_str(&camel_suffix(&arg.ty));
            }
            out
        }
        TypeRef::Literal(text) => text.replace('-', "Neg"),
        TypeRef::Placeholder(p) => capitalize(&p.name),
        TypeRef::Member { owner, member } => {
            let mut out = camel_suffix(owner);
            for m in member {
                out.push_str(&capitalize(m));
            }
            out
        }
    }
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{PrimitiveKind, QualifiedName, TypeUse};

    #[test]
    fn suffixes() {
        assert_eq!(camel_suffix(&TypeRef::Primitive(PrimitiveKind::Double)), "Double");
        assert_eq!(camel_suffix(&TypeRef::Primitive(PrimitiveKind::SizeT)), "Size_t");
        assert_eq!(camel_suffix(&TypeRef::Primitive(PrimitiveKind::UnsignedChar)), "UnsignedChar");
        assert_eq!(camel_suffix(&TypeRef::String(QualifiedName::simple("string"))), "String");
        let fun = TypeRef::NativeClass {
            path: QualifiedName::from_segments(&["ns".into(), "Fun".into()]),
            args: vec![TypeUse::value(TypeRef::Primitive(PrimitiveKind::Double))],
        };
        assert_eq!(camel_suffix(&fun), "FunDouble");
        assert_eq!(camel_suffix(&TypeRef::Literal("3".into())), "3");
    }
}
