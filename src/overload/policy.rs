//! Pairwise overload decisions.

use crate::ast::{Param, PrimitiveKind, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumericClass {
    Integral,
    Floating,
}

fn numeric_class(ty: &TypeRef) -> Option<NumericClass> {
    match ty {
        TypeRef::Primitive(PrimitiveKind::Int | PrimitiveKind::SizeT | PrimitiveKind::UnsignedChar) => {
            Some(NumericClass::Integral)
        }
        TypeRef::Primitive(PrimitiveKind::Float | PrimitiveKind::Double) => Some(NumericClass::Floating),
        _ => None,
    }
}

/// How two same-named overloads relate from the host's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// Arity or some non-numeric position differs; the host dispatches
    Resolvable,
    /// Differ only at these positions, and only in numeric precision
    NumericOnly(Vec<usize>),
    /// Same types everywhere, qualifiers aside
    Identical,
}

pub fn compare(a: &[Param], b: &[Param]) -> Relation {
    if a.len() != b.len() {
        return Relation::Resolvable;
    }
    let mut differing = Vec::new();
    for (i, (pa, pb)) in a.iter().zip(b).enumerate() {
        if pa.ty.ty == pb.ty.ty {
            continue;
        }
        // Python has one int and one float; both sides must collapse to the same one
        match (numeric_class(&pa.ty.ty), numeric_class(&pb.ty.ty)) {
            (Some(ca), Some(cb)) if ca == cb => differing.push(i),
            _ => return Relation::Resolvable,
        }
    }
    if differing.is_empty() {
        Relation::Identical
    } else {
        Relation::NumericOnly(differing)
    }
}

/// Partition `signatures` into clusters linked by numeric-only differences.
/// Returns, per cluster of two or more, its members and the union of their
/// differing positions. Clusters are ordered by first member.
pub fn numeric_clusters(signatures: &[&[Param]]) -> Vec<(Vec<usize>, Vec<usize>)> {
    let n = signatures.len();
    let mut cluster_of: Vec<usize> = (0..n).collect();
    let mut positions: Vec<Vec<usize>> = vec![Vec::new(); n];

    fn root(cluster_of: &mut [usize], mut i: usize) -> usize {
        while cluster_of[i] != i {
            cluster_of[i] = cluster_of[cluster_of[i]];
            i = cluster_of[i];
        }
        i
    }

    for i in 0..n {
        for j in i + 1..n {
            if let Relation::NumericOnly(diff) = compare(signatures[i], signatures[j]) {
                let (ri, rj) = (root(&mut cluster_of, i), root(&mut cluster_of, j));
                let (keep, merge) = (ri.min(rj), ri.max(rj));
                cluster_of[merge] = keep;
                let moved = std::mem::take(&mut positions[merge]);
                positions[keep].extend(moved);
                positions[keep].extend(diff);
            }
        }
    }

    let mut clusters: Vec<(Vec<usize>, Vec<usize>)> = Vec::new();
    for i in 0..n {
        let r = root(&mut cluster_of, i);
        if r == i {
            let mut pos = std::mem::take(&mut positions[i]);
            pos.sort_unstable();
            pos.dedup();
            clusters.push((vec![i], pos));
        } else if let Some(cluster) = clusters.iter_mut().find(|(members, _)| members[0] == r) {
            cluster.0.push(i);
        }
    }
    clusters.retain(|(members, _)| members.len() > 1);
    clusters
}

/// Disambiguated name: base plus the suffix of each type at `positions`.
pub fn manufactured_name(
    base: &str,
    params: &[Param],
    positions: &[usize],
    naming: fn(&TypeRef) -> String,
) -> String {
    let mut name = base.to_string();
    for &i in positions {
        if let Some(p) = params.get(i) {
            name.push_str(&naming(&p.ty.ty));
        }
    }
    name
}

/// Trailing-default omission variants: the full list first, then one entry
/// per omitted trailing default. Defaults are stripped from every variant.
pub fn default_variants(params: &[Param]) -> Vec<Vec<Param>> {
    let required = params
        .iter()
        .rposition(|p| p.default.is_none())
        .map_or(0, |i| i + 1);
    let stripped: Vec<Param> = params
        .iter()
        .cloned()
        .map(|mut p| {
            p.default = None;
            p
        })
        .collect();
    (required..=params.len())
        .rev()
        .map(|len| stripped[..len].to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DefaultKind, DefaultValue, QualifiedName, Span, TypeUse};
    use crate::expand::naming::camel_suffix;

    fn param(name: &str, ty: TypeRef) -> Param {
        Param {
            span: Span::default(),
            name: name.to_string(),
            ty: TypeUse::value(ty),
            default: None,
        }
    }

    fn prim(kind: PrimitiveKind) -> TypeRef {
        TypeRef::Primitive(kind)
    }

    fn class(name: &str) -> TypeRef {
        TypeRef::NativeClass {
            path: QualifiedName::simple(name),
            args: vec![],
        }
    }

    #[test]
    fn test_relation_table() {
        use PrimitiveKind::*;
        let a = [param("x", prim(Double))];
        let b = [param("x", prim(Float))];
        let c = [param("x", prim(Int))];
        let d = [param("x", class("Pose3"))];
        let e = [param("x", prim(Double)), param("y", prim(Int))];
        assert_eq!(compare(&a, &b), Relation::NumericOnly(vec![0]));
        assert_eq!(compare(&a, &c), Relation::Resolvable);
        assert_eq!(compare(&a, &d), Relation::Resolvable);
        assert_eq!(compare(&a, &e), Relation::Resolvable);
        assert_eq!(compare(&a, &a), Relation::Identical);
    }

    #[test]
    fn test_qualifiers_do_not_distinguish() {
        let mut by_ref = param("p", class("Pose3"));
        by_ref.ty.is_const = true;
        by_ref.ty.is_ref = true;
        assert_eq!(compare(&[by_ref], &[param("p", class("Pose3"))]), Relation::Identical);
    }

    #[test]
    fn test_clusters_and_names() {
        use PrimitiveKind::*;
        let f1 = vec![param("a", prim(Int)), param("b", prim(Float))];
        let f2 = vec![param("a", prim(Int)), param("b", prim(Double))];
        let f3 = vec![param("a", class("Pose3"))];
        let sigs: Vec<&[Param]> = vec![&f1, &f3, &f2];
        let clusters = numeric_clusters(&sigs);
        assert_eq!(clusters, vec![(vec![0, 2], vec![1])]);
        assert_eq!(manufactured_name("f", &f1, &[1], camel_suffix), "fFloat");
        assert_eq!(manufactured_name("f", &f2, &[1], camel_suffix), "fDouble");
    }

    #[test]
    fn test_default_variants() {
        use PrimitiveKind::*;
        let mut b = param("b", prim(Int));
        b.default = Some(DefaultValue {
            text: "0".into(),
            kind: DefaultKind::Number,
        });
        let mut c = param("c", prim(Double));
        c.default = Some(DefaultValue {
            text: "1.5".into(),
            kind: DefaultKind::Number,
        });
        let params = vec![param("a", prim(Int)), b, c];
        let variants = default_variants(&params);
        let arities: Vec<usize> = variants.iter().map(Vec::len).collect();
        assert_eq!(arities, [3, 2, 1]);
        assert!(variants.iter().flatten().all(|p| p.default.is_none()));
    }
}
