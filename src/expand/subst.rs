use std::collections::BTreeMap;

use crate::ast::{Param, QualifiedName, TypeRef, TypeUse};

/// Immutable map from placeholder index to concrete type.
///
/// Applying it never touches the generic declaration; every call builds new
/// nodes, so one template body serves all of its instantiations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitution {
    bindings: BTreeMap<usize, TypeRef>,
    /// Generic class path and the instance its nested enums belong to
    owner: Option<(QualifiedName, TypeRef)>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new map with `types` bound from index `offset` on.
    pub fn extend(&self, offset: usize, types: &[TypeRef]) -> Substitution {
        let mut extended = self.clone();
        for (i, ty) in types.iter().enumerate() {
            extended.bindings.insert(offset + i, ty.clone());
        }
        extended
    }

    /// Requalify enums nested in the class template `generic` as members
    /// of `instance`: `Fun::Kind` becomes `Fun<double>::Kind`.
    pub fn with_owner(mut self, generic: &QualifiedName, instance: TypeRef) -> Substitution {
        self.owner = Some((generic.clone(), instance));
        self
    }

    pub fn get(&self, index: usize) -> Option<&TypeRef> {
        self.bindings.get(&index)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn apply(&self, ty: &TypeRef) -> TypeRef {
        match ty {
            TypeRef::Placeholder(p) => match self.bindings.get(&p.index) {
                Some(bound) if p.member.is_empty() => bound.clone(),
                Some(bound) => TypeRef::Member {
                    owner: Box::new(bound.clone()),
                    member: p.member.clone(),
                },
                None => ty.clone(),
            },
            TypeRef::NativeClass { path, args } => TypeRef::NativeClass {
                path: path.clone(),
                args: self.apply_all(args),
            },
            TypeRef::Numeric { path, args, shape } => TypeRef::Numeric {
                path: path.clone(),
                args: self.apply_all(args),
                shape: *shape,
            },
            TypeRef::Container { kind, path, args } => TypeRef::Container {
                kind: *kind,
                path: path.clone(),
                args: self.apply_all(args),
            },
            TypeRef::Member { owner, member } => TypeRef::Member {
                owner: Box::new(self.apply(owner)),
                member: member.clone(),
            },
            TypeRef::Enum(path) => match &self.owner {
                Some((generic, instance)) if path.namespaces == generic.segments() => TypeRef::Member {
                    owner: Box::new(instance.clone()),
                    member: vec![path.name.clone()],
                },
                _ => ty.clone(),
            },
            TypeRef::Primitive(_) | TypeRef::String(_) | TypeRef::Literal(_) => ty.clone(),
        }
    }

    /// Substitute the type, keeping the use site's const/ref/ownership.
    pub fn apply_use(&self, ty: &TypeUse) -> TypeUse {
        ty.with_ty(self.apply(&ty.ty))
    }

    pub fn apply_params(&self, params: &[Param]) -> Vec<Param> {
        params
            .iter()
            .map(|p| Param {
                ty: self.apply_use(&p.ty),
                ..p.clone()
            })
            .collect()
    }

    fn apply_all(&self, args: &[TypeUse]) -> Vec<TypeUse> {
        args.iter().map(|a| self.apply_use(a)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Ownership, Placeholder, PrimitiveKind, QualifiedName};

    fn placeholder(index: usize, member: &[&str]) -> TypeRef {
        TypeRef::Placeholder(Placeholder {
            index,
            name: "T".into(),
            member: member.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn extend_leaves_original_untouched() {
        let base = Substitution::new().extend(0, &[TypeRef::Primitive(PrimitiveKind::Double)]);
        let inner = base.extend(1, &[TypeRef::Primitive(PrimitiveKind::Int)]);
        assert_eq!(base.len(), 1);
        assert_eq!(inner.len(), 2);
        assert!(base.get(1).is_none());
    }

    #[test]
    fn substitution_keeps_use_site_qualifiers() {
        let subst = Substitution::new().extend(0, &[TypeRef::Primitive(PrimitiveKind::Double)]);
        let generic = TypeUse {
            is_const: true,
            is_ref: true,
            ..TypeUse::value(placeholder(0, &[]))
        };
        assert_eq!(subst.apply_use(&generic).to_cpp(), "const double&");
    }

    #[test]
    fn scoped_member_becomes_member_type() {
        let pose = TypeRef::NativeClass {
            path: QualifiedName::from_segments(&["gtsam".into(), "Pose3".into()]),
            args: vec![],
        };
        let subst = Substitution::new().extend(0, &[pose]);
        assert_eq!(subst.apply(&placeholder(0, &["Value"])).to_string(), "gtsam::Pose3::Value");
    }

    #[test]
    fn nested_arguments_are_substituted() {
        let subst = Substitution::new().extend(0, &[TypeRef::Primitive(PrimitiveKind::Int)]);
        let shared = TypeUse {
            ownership: Ownership::Shared,
            ..TypeUse::value(placeholder(0, &[]))
        };
        let vector = TypeRef::Container {
            kind: crate::ast::ContainerKind::Vector,
            path: QualifiedName::simple("vector"),
            args: vec![shared],
        };
        assert_eq!(subst.apply(&vector).to_string(), "vector<std::shared_ptr<int>>");
        assert!(subst.apply(&placeholder(3, &[])).find_placeholder().is_some());
    }

    #[test]
    fn nested_enum_follows_class_instance() {
        let generic = QualifiedName::simple("Fun");
        let instance = TypeRef::NativeClass {
            path: generic.clone(),
            args: vec![TypeUse::value(TypeRef::Primitive(PrimitiveKind::Double))],
        };
        let subst = Substitution::new()
            .extend(0, &[TypeRef::Primitive(PrimitiveKind::Double)])
            .with_owner(&generic, instance);
        let nested = TypeRef::Enum(generic.child("Kind"));
        assert_eq!(subst.apply(&nested).to_string(), "Fun<double>::Kind");
        // bindings added later keep the owner
        let inner = subst.extend(1, &[TypeRef::Primitive(PrimitiveKind::Int)]);
        assert_eq!(inner.apply(&nested).to_string(), "Fun<double>::Kind");

        let elsewhere = TypeRef::Enum(QualifiedName::from_segments(&["gtsam".into(), "Kind".into()]));
        assert_eq!(subst.apply(&elsewhere), elsewhere);
    }
}
