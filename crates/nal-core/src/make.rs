//! Canonicalizing term constructors.
//!
//! Every `make_*` performs algebraic reduction before allocating: nested
//! same-operator compounds flatten, commutative components sort and dedup,
//! singletons collapse to their sole member, set algebra runs at
//! construction time, and invalid statements and images simply don't get
//! built. `None` means "no term producible here" and silently kills the
//! inference branch that asked — it is never an error.

use crate::term::{CompoundTerm, Term, TermOperator, invalid_statement};

fn compound(op: TermOperator, components: Vec<Term>, relation_index: usize) -> Term {
    Term::Compound(CompoundTerm {
        op,
        components,
        relation_index,
    })
}

/// Sort and dedup for commutative operators.
fn canonical_set(mut components: Vec<Term>) -> Vec<Term> {
    components.sort();
    components.dedup();
    components
}

// --- sets ---

pub fn make_set_ext(components: Vec<Term>) -> Option<Term> {
    let components = canonical_set(components);
    if components.is_empty() {
        return None;
    }
    Some(compound(TermOperator::SetExt, components, 0))
}

pub fn make_set_int(components: Vec<Term>) -> Option<Term> {
    let components = canonical_set(components);
    if components.is_empty() {
        return None;
    }
    Some(compound(TermOperator::SetInt, components, 0))
}

// --- intersections ---

/// Extensional intersection. Two intensional sets union; two extensional
/// sets intersect; nested intersections flatten; a singleton collapses.
pub fn make_intersection_ext(components: Vec<Term>) -> Option<Term> {
    let mut iter = components.into_iter();
    let mut acc = iter.next()?;
    for t in iter {
        acc = intersect2(acc, t, TermOperator::IntersectionExt)?;
    }
    Some(acc)
}

/// Intensional intersection: the exact dual.
pub fn make_intersection_int(components: Vec<Term>) -> Option<Term> {
    let mut iter = components.into_iter();
    let mut acc = iter.next()?;
    for t in iter {
        acc = intersect2(acc, t, TermOperator::IntersectionInt)?;
    }
    Some(acc)
}

fn intersect2(t1: Term, t2: Term, op: TermOperator) -> Option<Term> {
    debug_assert!(matches!(
        op,
        TermOperator::IntersectionExt | TermOperator::IntersectionInt
    ));
    // the set kind that unions under this intersection, and the one that
    // intersects
    let (union_set, intersect_set) = if op == TermOperator::IntersectionExt {
        (TermOperator::SetInt, TermOperator::SetExt)
    } else {
        (TermOperator::SetExt, TermOperator::SetInt)
    };
    if t1.op() == Some(union_set) && t2.op() == Some(union_set) {
        let mut members = t1.as_compound()?.components.clone();
        members.extend(t2.as_compound()?.components.clone());
        return Some(compound(union_set, canonical_set(members), 0));
    }
    if t1.op() == Some(intersect_set) && t2.op() == Some(intersect_set) {
        let right = &t2.as_compound()?.components;
        let members: Vec<Term> = t1
            .as_compound()?
            .components
            .iter()
            .filter(|m| right.contains(m))
            .cloned()
            .collect();
        if members.is_empty() {
            return None;
        }
        return Some(compound(intersect_set, members, 0));
    }
    let mut members = Vec::new();
    for t in [t1, t2] {
        if t.op() == Some(op) {
            members.extend(t.as_compound()?.components.clone());
        } else {
            members.push(t);
        }
    }
    let members = canonical_set(members);
    if members.len() == 1 {
        return members.into_iter().next();
    }
    Some(compound(op, members, 0))
}

// --- differences ---

pub fn make_difference_ext(t1: Term, t2: Term) -> Option<Term> {
    if t1 == t2 {
        return None;
    }
    if t1.op() == Some(TermOperator::SetExt) && t2.op() == Some(TermOperator::SetExt) {
        let right = &t2.as_compound()?.components;
        let members: Vec<Term> = t1
            .as_compound()?
            .components
            .iter()
            .filter(|m| !right.contains(m))
            .cloned()
            .collect();
        return make_set_ext(members);
    }
    Some(compound(TermOperator::DifferenceExt, vec![t1, t2], 0))
}

pub fn make_difference_int(t1: Term, t2: Term) -> Option<Term> {
    if t1 == t2 {
        return None;
    }
    if t1.op() == Some(TermOperator::SetInt) && t2.op() == Some(TermOperator::SetInt) {
        let right = &t2.as_compound()?.components;
        let members: Vec<Term> = t1
            .as_compound()?
            .components
            .iter()
            .filter(|m| !right.contains(m))
            .cloned()
            .collect();
        return make_set_int(members);
    }
    Some(compound(TermOperator::DifferenceInt, vec![t1, t2], 0))
}

// --- products and images ---

pub fn make_product(components: Vec<Term>) -> Option<Term> {
    if components.is_empty() {
        return None;
    }
    Some(compound(TermOperator::Product, components, 0))
}

/// Product recovered from an image: the component replaces the relation
/// slot, giving back the original argument tuple.
pub fn make_product_from_image(image: &CompoundTerm, component: &Term) -> Option<Term> {
    let mut components = image.components.clone();
    components[image.relation_index] = component.clone();
    make_product(components)
}

/// Raw image constructor: `components` with the relation already sitting
/// at `relation_index`.
pub fn make_image_ext(components: Vec<Term>, relation_index: usize) -> Option<Term> {
    make_image(TermOperator::ImageExt, components, relation_index)
}

pub fn make_image_int(components: Vec<Term>, relation_index: usize) -> Option<Term> {
    make_image(TermOperator::ImageInt, components, relation_index)
}

fn make_image(op: TermOperator, components: Vec<Term>, relation_index: usize) -> Option<Term> {
    if components.len() < 2 || relation_index >= components.len() {
        return None;
    }
    Some(compound(op, components, relation_index))
}

/// Image from a product by eliding the component at `index` and putting
/// the relation in its place. A relation that is itself a matching
/// product reduces away entirely.
pub fn make_image_from_product(
    op: TermOperator,
    product: &CompoundTerm,
    relation: &Term,
    index: usize,
) -> Option<Term> {
    if let Some(rel) = relation.as_compound() {
        if rel.op == TermOperator::Product && product.size() == 2 && rel.size() == 2 {
            if index == 0 && product.components[1] == rel.components[1] {
                // (/,(*,a,b),_,b) reduces to a
                return Some(rel.components[0].clone());
            }
            if index == 1 && product.components[0] == rel.components[0] {
                return Some(rel.components[1].clone());
            }
        }
    }
    let mut components = product.components.clone();
    components[index] = relation.clone();
    make_image(op, components, index)
}

/// Image with the elided slot moved: the old relation slot takes
/// `component`, and the relation moves to `index`.
pub fn make_image_from_image(
    op: TermOperator,
    old: &CompoundTerm,
    component: &Term,
    index: usize,
) -> Option<Term> {
    let mut components = old.components.clone();
    let relation = components[old.relation_index].clone();
    components[old.relation_index] = component.clone();
    components[index] = relation;
    make_image(op, components, index)
}

// --- negation, conjunction, disjunction ---

/// Negation; a double negation collapses to the inner term.
pub fn make_negation(t: Term) -> Option<Term> {
    match t {
        Term::Compound(c) if c.op == TermOperator::Negation => {
            c.components.into_iter().next()
        }
        t => Some(compound(TermOperator::Negation, vec![t], 0)),
    }
}

pub fn make_conjunction(components: Vec<Term>) -> Option<Term> {
    make_junction(TermOperator::Conjunction, components)
}

pub fn make_disjunction(components: Vec<Term>) -> Option<Term> {
    make_junction(TermOperator::Disjunction, components)
}

fn make_junction(op: TermOperator, components: Vec<Term>) -> Option<Term> {
    let mut members = Vec::new();
    for t in components {
        match t {
            Term::Compound(c) if c.op == op => members.extend(c.components),
            t => members.push(t),
        }
    }
    let mut members = canonical_set(members);
    match members.len() {
        0 => None,
        1 => members.pop(),
        _ => Some(compound(op, members, 0)),
    }
}

// --- statements ---

pub fn make_inheritance(subject: Term, predicate: Term) -> Option<Term> {
    if invalid_statement(&subject, &predicate) {
        return None;
    }
    Some(compound(TermOperator::Inheritance, vec![subject, predicate], 0))
}

pub fn make_similarity(subject: Term, predicate: Term) -> Option<Term> {
    if invalid_statement(&subject, &predicate) {
        return None;
    }
    let components = canonical_set(vec![subject, predicate]);
    Some(compound(TermOperator::Similarity, components, 0))
}

/// Implication. The subject may not itself be higher-order; a nested
/// consequent `A ==> (B ==> C)` flattens into `(A && B) ==> C` unless the
/// old condition already contains the new one.
pub fn make_implication(subject: Term, predicate: Term) -> Option<Term> {
    if matches!(
        subject.op(),
        Some(TermOperator::Implication) | Some(TermOperator::Equivalence)
    ) || predicate.op() == Some(TermOperator::Equivalence)
    {
        return None;
    }
    if invalid_statement(&subject, &predicate) {
        return None;
    }
    if predicate.op() == Some(TermOperator::Implication) {
        let inner = predicate.as_compound()?;
        let old_condition = inner.components[0].clone();
        if let Some(c) = old_condition.as_compound() {
            if c.op == TermOperator::Conjunction && old_condition.contains_component(&subject) {
                return None;
            }
        }
        let new_condition = make_conjunction(vec![subject, old_condition])?;
        let consequent = inner.components[1].clone();
        return make_implication(new_condition, consequent);
    }
    Some(compound(TermOperator::Implication, vec![subject, predicate], 0))
}

pub fn make_equivalence(subject: Term, predicate: Term) -> Option<Term> {
    if matches!(
        subject.op(),
        Some(TermOperator::Implication) | Some(TermOperator::Equivalence)
    ) || matches!(
        predicate.op(),
        Some(TermOperator::Implication) | Some(TermOperator::Equivalence)
    ) {
        return None;
    }
    if invalid_statement(&subject, &predicate) {
        return None;
    }
    let components = canonical_set(vec![subject, predicate]);
    Some(compound(TermOperator::Equivalence, components, 0))
}

/// Statement with an explicit copula.
pub fn make_statement(op: TermOperator, subject: Term, predicate: Term) -> Option<Term> {
    match op {
        TermOperator::Inheritance => make_inheritance(subject, predicate),
        TermOperator::Similarity => make_similarity(subject, predicate),
        TermOperator::Implication => make_implication(subject, predicate),
        TermOperator::Equivalence => make_equivalence(subject, predicate),
        _ => None,
    }
}

/// Statement with the same copula as `template`.
pub fn make_statement_from(template: &CompoundTerm, subject: Term, predicate: Term) -> Option<Term> {
    make_statement(template.op, subject, predicate)
}

/// The symmetric counterpart of `template`'s copula: inheritance becomes
/// similarity, implication becomes equivalence.
pub fn make_statement_symmetric(
    template: &CompoundTerm,
    subject: Term,
    predicate: Term,
) -> Option<Term> {
    match template.op {
        TermOperator::Inheritance | TermOperator::Similarity => {
            make_similarity(subject, predicate)
        }
        TermOperator::Implication | TermOperator::Equivalence => {
            make_equivalence(subject, predicate)
        }
        _ => None,
    }
}

// --- generic rebuild / component surgery ---

/// Rebuild a compound of the given operator from fresh components,
/// re-running every reduction and validation.
pub fn make_compound(op: TermOperator, components: Vec<Term>, relation_index: usize) -> Option<Term> {
    match op {
        TermOperator::SetExt => make_set_ext(components),
        TermOperator::SetInt => make_set_int(components),
        TermOperator::IntersectionExt => make_intersection_ext(components),
        TermOperator::IntersectionInt => make_intersection_int(components),
        TermOperator::DifferenceExt | TermOperator::DifferenceInt => {
            let mut iter = components.into_iter();
            let t1 = iter.next()?;
            let t2 = iter.next()?;
            if iter.next().is_some() {
                return None;
            }
            if op == TermOperator::DifferenceExt {
                make_difference_ext(t1, t2)
            } else {
                make_difference_int(t1, t2)
            }
        }
        TermOperator::Product => make_product(components),
        TermOperator::ImageExt => make_image_ext(components, relation_index),
        TermOperator::ImageInt => make_image_int(components, relation_index),
        TermOperator::Negation => {
            let mut iter = components.into_iter();
            let t = iter.next()?;
            if iter.next().is_some() {
                return None;
            }
            make_negation(t)
        }
        TermOperator::Conjunction => make_conjunction(components),
        TermOperator::Disjunction => make_disjunction(components),
        op => {
            let mut iter = components.into_iter();
            let subject = iter.next()?;
            let predicate = iter.next()?;
            if iter.next().is_some() {
                return None;
            }
            make_statement(op, subject, predicate)
        }
    }
}

/// Rebuild `compound` with the same operator but new components.
pub fn clone_with_components(template: &CompoundTerm, components: Vec<Term>) -> Option<Term> {
    make_compound(template.op, components, template.relation_index)
}

/// Remove `to_remove` (or, if it shares the operator, all of its
/// components) from `compound`; `None` when nothing was removed or
/// nothing is left.
pub fn reduce_components(source: &CompoundTerm, to_remove: &Term) -> Option<Term> {
    let before = source.components.len();
    let remaining: Vec<Term> = if to_remove.op() == Some(source.op) {
        let removed = &to_remove.as_compound()?.components;
        source
            .components
            .iter()
            .filter(|t| !removed.contains(t))
            .cloned()
            .collect()
    } else {
        source
            .components
            .iter()
            .filter(|t| *t != to_remove)
            .cloned()
            .collect()
    };
    if remaining.len() == before {
        return None;
    }
    match remaining.len() {
        0 => None,
        1 => {
            if matches!(
                source.op,
                TermOperator::Conjunction
                    | TermOperator::Disjunction
                    | TermOperator::IntersectionExt
                    | TermOperator::IntersectionInt
                    | TermOperator::DifferenceExt
                    | TermOperator::DifferenceInt
            ) {
                remaining.into_iter().next()
            } else {
                None
            }
        }
        _ => make_compound(source.op, remaining, source.relation_index),
    }
}

/// Replace the component at `index` with `t` (splicing same-operator
/// compounds in flat) and rebuild.
pub fn set_component(source: &CompoundTerm, index: usize, t: Option<Term>) -> Option<Term> {
    let mut components = source.components.clone();
    components.remove(index);
    if let Some(t) = t {
        if t.op() == Some(source.op) {
            let inner = t.as_compound()?.components.clone();
            for (offset, item) in inner.into_iter().enumerate() {
                components.insert(index + offset, item);
            }
        } else {
            components.insert(index, t);
        }
    }
    make_compound(source.op, components, source.relation_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(s: &str) -> Term {
        Term::word(s)
    }

    #[test]
    fn test_set_commutative_canonicalization() {
        let ab = make_set_ext(vec![w("A"), w("B")]).unwrap();
        let ba = make_set_ext(vec![w("B"), w("A")]).unwrap();
        assert_eq!(ab, ba);
        let dup = make_set_ext(vec![w("A"), w("A"), w("B")]).unwrap();
        assert_eq!(dup, ab);
    }

    #[test]
    fn test_empty_set_not_producible() {
        assert!(make_set_ext(vec![]).is_none());
    }

    #[test]
    fn test_conjunction_flattens() {
        let inner = make_conjunction(vec![w("b"), w("c")]).unwrap();
        let nested = make_conjunction(vec![inner, w("a")]).unwrap();
        let flat = make_conjunction(vec![w("a"), w("b"), w("c")]).unwrap();
        assert_eq!(nested, flat);
    }

    #[test]
    fn test_conjunction_associative_multiset() {
        let left = make_conjunction(vec![
            make_conjunction(vec![w("a"), w("b")]).unwrap(),
            w("c"),
        ])
        .unwrap();
        let right = make_conjunction(vec![
            w("a"),
            make_conjunction(vec![w("b"), w("c")]).unwrap(),
        ])
        .unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn test_singleton_collapse() {
        assert_eq!(make_conjunction(vec![w("a")]).unwrap(), w("a"));
        assert_eq!(
            make_intersection_ext(vec![w("a"), w("a")]).unwrap(),
            w("a")
        );
    }

    #[test]
    fn test_intersection_of_ext_sets_intersects() {
        let s1 = make_set_ext(vec![w("a"), w("b")]).unwrap();
        let s2 = make_set_ext(vec![w("b"), w("c")]).unwrap();
        let i = make_intersection_ext(vec![s1, s2]).unwrap();
        assert_eq!(i, make_set_ext(vec![w("b")]).unwrap());
    }

    #[test]
    fn test_intersection_of_disjoint_ext_sets_vanishes() {
        let s1 = make_set_ext(vec![w("a")]).unwrap();
        let s2 = make_set_ext(vec![w("b")]).unwrap();
        assert!(make_intersection_ext(vec![s1, s2]).is_none());
    }

    #[test]
    fn test_intersection_of_int_sets_unions() {
        let s1 = make_set_int(vec![w("a")]).unwrap();
        let s2 = make_set_int(vec![w("b")]).unwrap();
        let i = make_intersection_ext(vec![s1, s2]).unwrap();
        assert_eq!(i, make_set_int(vec![w("a"), w("b")]).unwrap());
    }

    #[test]
    fn test_difference_of_identical_vanishes() {
        assert!(make_difference_ext(w("a"), w("a")).is_none());
    }

    #[test]
    fn test_difference_of_sets() {
        let s1 = make_set_ext(vec![w("a"), w("b")]).unwrap();
        let s2 = make_set_ext(vec![w("b")]).unwrap();
        let d = make_difference_ext(s1, s2).unwrap();
        assert_eq!(d, make_set_ext(vec![w("a")]).unwrap());
    }

    #[test]
    fn test_double_negation_collapses() {
        let n = make_negation(w("a")).unwrap();
        assert_eq!(make_negation(n).unwrap(), w("a"));
    }

    #[test]
    fn test_similarity_side_order_irrelevant() {
        let ab = make_similarity(w("a"), w("b")).unwrap();
        let ba = make_similarity(w("b"), w("a")).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_invalid_statement_rejected() {
        assert!(make_inheritance(w("a"), w("a")).is_none());
    }

    #[test]
    fn test_implication_nesting_flattens() {
        let bc = make_implication(w("b"), w("c")).unwrap();
        let nested = make_implication(w("a"), bc).unwrap();
        let condition = make_conjunction(vec![w("a"), w("b")]).unwrap();
        let flat = make_implication(condition, w("c")).unwrap();
        assert_eq!(nested, flat);
    }

    #[test]
    fn test_implication_rejects_higher_order_subject() {
        let inner = make_implication(w("a"), w("b")).unwrap();
        assert!(make_implication(inner, w("c")).is_none());
    }

    #[test]
    fn test_equivalence_rejects_implication_side() {
        let impl_term = make_implication(w("a"), w("b")).unwrap();
        assert!(make_equivalence(impl_term, w("c")).is_none());
    }

    #[test]
    fn test_image_product_round_trip() {
        // <(*,acid,base) --> reaction>  ⟷  <acid --> (/,reaction,_,base)>
        let product = make_product(vec![w("acid"), w("base")]).unwrap();
        let img = make_image_from_product(
            TermOperator::ImageExt,
            product.as_compound().unwrap(),
            &w("reaction"),
            0,
        )
        .unwrap();
        assert_eq!(img.name(), "(/,reaction,_,base)");
        let back =
            make_product_from_image(img.as_compound().unwrap(), &w("acid")).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn test_image_of_matching_product_relation_reduces() {
        let product = make_product(vec![w("x"), w("b")]).unwrap();
        let relation = make_product(vec![w("a"), w("b")]).unwrap();
        let reduced = make_image_from_product(
            TermOperator::ImageExt,
            product.as_compound().unwrap(),
            &relation,
            0,
        )
        .unwrap();
        assert_eq!(reduced, w("a"));
    }

    #[test]
    fn test_reduce_components() {
        let conj = make_conjunction(vec![w("a"), w("b"), w("c")]).unwrap();
        let reduced = reduce_components(conj.as_compound().unwrap(), &w("b")).unwrap();
        assert_eq!(reduced, make_conjunction(vec![w("a"), w("c")]).unwrap());
        // removing down to one component collapses
        let pair = make_conjunction(vec![w("a"), w("b")]).unwrap();
        let one = reduce_components(pair.as_compound().unwrap(), &w("b")).unwrap();
        assert_eq!(one, w("a"));
        // removing something absent produces nothing
        assert!(reduce_components(conj.as_compound().unwrap(), &w("z")).is_none());
    }

    #[test]
    fn test_set_component() {
        let product = make_product(vec![w("a"), w("b")]).unwrap();
        let swapped =
            set_component(product.as_compound().unwrap(), 0, Some(w("z"))).unwrap();
        assert_eq!(swapped, make_product(vec![w("z"), w("b")]).unwrap());
    }
}
