//! Resolved type references.

use std::fmt;

/// A `::`-separated native name such as `gtsam::noiseModel::Base`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub namespaces: Vec<String>,
    pub name: String,
}

impl QualifiedName {
    /// Build from path segments; the last segment is the name.
    pub fn from_segments(segments: &[String]) -> Self {
        match segments.split_last() {
            Some((name, namespaces)) => QualifiedName {
                namespaces: namespaces.to_vec(),
                name: name.clone(),
            },
            None => QualifiedName::simple(""),
        }
    }

    pub fn simple(name: &str) -> Self {
        QualifiedName {
            namespaces: Vec::new(),
            name: name.to_string(),
        }
    }

    /// `self::name`
    pub fn child(&self, name: &str) -> Self {
        QualifiedName {
            namespaces: self.segments(),
            name: name.to_string(),
        }
    }

    pub fn segments(&self) -> Vec<String> {
        let mut segments = self.namespaces.clone();
        segments.push(self.name.clone());
        segments
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ns in &self.namespaces {
            write!(f, "{ns}::")?;
        }
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Void,
    Bool,
    Char,
    UnsignedChar,
    Int,
    SizeT,
    Float,
    Double,
}

impl PrimitiveKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "void" => PrimitiveKind::Void,
            "bool" => PrimitiveKind::Bool,
            "char" => PrimitiveKind::Char,
            "unsigned char" => PrimitiveKind::UnsignedChar,
            "int" => PrimitiveKind::Int,
            "size_t" => PrimitiveKind::SizeT,
            "float" => PrimitiveKind::Float,
            "double" => PrimitiveKind::Double,
            _ => return None,
        })
    }

    pub fn cpp_name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::UnsignedChar => "unsigned char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::SizeT => "size_t",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }
}

/// Dense vector/matrix shape; these marshal through buffers, not objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericShape {
    DynamicVector,
    DynamicMatrix,
    FixedVector(usize),
    FixedMatrix(usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Vector,
    List,
    Set,
    Map,
    Pair,
}

impl ContainerKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "vector" => ContainerKind::Vector,
            "list" => ContainerKind::List,
            "set" => ContainerKind::Set,
            "map" => ContainerKind::Map,
            "pair" => ContainerKind::Pair,
            _ => return None,
        })
    }

    pub fn arity(self) -> usize {
        match self {
            ContainerKind::Map | ContainerKind::Pair => 2,
            _ => 1,
        }
    }
}

/// Reference to a template parameter, by position in the combined
/// class-then-member parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    pub index: usize,
    pub name: String,
    /// Scoped member access, e.g. `["Value"]` for `T::Value`
    pub member: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    /// Spelled as written: `string` or `std::string`
    String(QualifiedName),
    NativeClass {
        path: QualifiedName,
        args: Vec<TypeUse>,
    },
    Enum(QualifiedName),
    Numeric {
        path: QualifiedName,
        args: Vec<TypeUse>,
        shape: NumericShape,
    },
    Container {
        kind: ContainerKind,
        path: QualifiedName,
        args: Vec<TypeUse>,
    },
    /// Non-type template argument
    Literal(String),
    Placeholder(Placeholder),
    /// Member type of a substituted placeholder, e.g. `gtsam::Pose3::Value`
    Member {
        owner: Box<TypeRef>,
        member: Vec<String>,
    },
}

impl TypeRef {
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Primitive(PrimitiveKind::Void))
    }

    /// Type arguments carried by this reference.
    pub fn args(&self) -> &[TypeUse] {
        match self {
            TypeRef::NativeClass { args, .. }
            | TypeRef::Numeric { args, .. }
            | TypeRef::Container { args, .. } => args,
            _ => &[],
        }
    }

    /// First placeholder found anywhere inside this reference.
    pub fn find_placeholder(&self) -> Option<&Placeholder> {
        match self {
            TypeRef::Placeholder(p) => Some(p),
            TypeRef::Member { owner, .. } => owner.find_placeholder(),
            _ => self.args().iter().find_map(|a| a.ty.find_placeholder()),
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[TypeUse]) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    let rendered: Vec<String> = args.iter().map(TypeUse::to_cpp).collect();
    write!(f, "<{}>", rendered.join(", "))
}

/// Native spelling of the bare type.
impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(kind) => f.write_str(kind.cpp_name()),
            TypeRef::String(path) | TypeRef::Enum(path) => write!(f, "{path}"),
            TypeRef::NativeClass { path, args }
            | TypeRef::Numeric { path, args, .. }
            | TypeRef::Container { path, args, .. } => {
                write!(f, "{path}")?;
                write_args(f, args)
            }
            TypeRef::Literal(text) => f.write_str(text),
            TypeRef::Placeholder(p) => {
                f.write_str(&p.name)?;
                for m in &p.member {
                    write!(f, "::{m}")?;
                }
                Ok(())
            }
            TypeRef::Member { owner, member } => {
                write!(f, "{owner}")?;
                for m in member {
                    write!(f, "::{m}")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    Value,
    /// `std::shared_ptr<T>`
    Shared,
    /// `T*`
    Raw,
}

/// A type at a use site: the type plus calling convention and ownership.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeUse {
    pub ty: TypeRef,
    pub is_const: bool,
    pub is_ref: bool,
    pub ownership: Ownership,
}

impl TypeUse {
    pub fn value(ty: TypeRef) -> Self {
        TypeUse {
            ty,
            is_const: false,
            is_ref: false,
            ownership: Ownership::Value,
        }
    }

    pub fn with_ty(&self, ty: TypeRef) -> Self {
        TypeUse { ty, ..self.clone() }
    }

    pub fn to_cpp(&self) -> String {
        let base = self.ty.to_string();
        let typename = match self.ownership {
            Ownership::Shared => format!("std::shared_ptr<{base}>"),
            Ownership::Raw => format!("{base}*"),
            Ownership::Value if self.is_ref => format!("{base}&"),
            Ownership::Value => base,
        };
        if self.is_const {
            format!("const {typename}")
        } else {
            typename
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(path: &str) -> TypeRef {
        let segments: Vec<String> = path.split("::").map(str::to_string).collect();
        TypeRef::NativeClass {
            path: QualifiedName::from_segments(&segments),
            args: vec![],
        }
    }

    #[test]
    fn cpp_spelling_follows_ownership() {
        let pose = class("gtsam::Pose3");
        let by_ref = TypeUse {
            is_const: true,
            is_ref: true,
            ..TypeUse::value(pose.clone())
        };
        assert_eq!(by_ref.to_cpp(), "const gtsam::Pose3&");
        let shared = TypeUse {
            is_const: true,
            ownership: Ownership::Shared,
            ..TypeUse::value(pose.clone())
        };
        assert_eq!(shared.to_cpp(), "const std::shared_ptr<gtsam::Pose3>");
        let raw = TypeUse {
            ownership: Ownership::Raw,
            ..TypeUse::value(pose)
        };
        assert_eq!(raw.to_cpp(), "gtsam::Pose3*");
    }

    #[test]
    fn template_arguments_render_inside_angles() {
        let vector = TypeRef::Container {
            kind: ContainerKind::Vector,
            path: QualifiedName::from_segments(&["std".into(), "vector".into()]),
            args: vec![TypeUse {
                ownership: Ownership::Shared,
                ..TypeUse::value(class("Test"))
            }],
        };
        assert_eq!(vector.to_string(), "std::vector<std::shared_ptr<Test>>");
    }

    #[test]
    fn placeholders_are_found_in_nested_arguments() {
        let ty = TypeRef::Container {
            kind: ContainerKind::Vector,
            path: QualifiedName::simple("vector"),
            args: vec![TypeUse::value(TypeRef::Placeholder(Placeholder {
                index: 0,
                name: "T".into(),
                member: vec![],
            }))],
        };
        assert_eq!(ty.find_placeholder().map(|p| p.index), Some(0));
        assert!(class("A").find_placeholder().is_none());
    }
}
