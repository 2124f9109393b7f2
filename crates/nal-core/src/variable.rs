//! Variable unification and substitution.
//!
//! Unification is keyed to a single variable kind per call: only variables
//! of the selected kind may be bound, everything else must match
//! structurally. When both sides present a bindable variable, a fresh
//! "common variable" (an id above anything in either parent) goes into
//! both maps, so the later rename pass collapses the pair into one slot.
//!
//! Substitution is functional: it builds new terms bottom-up through the
//! `make` constructors, so the result is re-canonicalized for free and an
//! invalid statement surfaces as `None` rather than a malformed term.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

use crate::make;
use crate::term::{Term, VariableKind};

pub type Substitution = HashMap<Term, Term>;

/// Unify `t1` and `t2` under `kind`, then apply the two substitution maps
/// to the enclosing parents and canonically rename. Returns the rewritten
/// parents, or `None` when no unifier exists or substitution produced an
/// invalid term.
pub fn unify(
    kind: VariableKind,
    t1: &Term,
    t2: &Term,
    parent1: &Term,
    parent2: &Term,
    rng: &mut impl Rng,
) -> Option<(Term, Term)> {
    let mut map1 = Substitution::new();
    let mut map2 = Substitution::new();
    let mut fresh = max_var_id(parent1).max(max_var_id(parent2)) + 1;
    if !find_substitute(kind, t1, t2, &mut map1, &mut map2, &mut fresh, rng) {
        return None;
    }
    let r1 = rewrite(parent1, &map1)?;
    let r2 = rewrite(parent2, &map2)?;
    Some((r1, r2))
}

/// True when the two terms have a unifier, without rewriting anything.
pub fn has_substitute(
    kind: VariableKind,
    t1: &Term,
    t2: &Term,
    rng: &mut impl Rng,
) -> bool {
    let mut map1 = Substitution::new();
    let mut map2 = Substitution::new();
    let mut fresh = max_var_id(t1).max(max_var_id(t2)) + 1;
    find_substitute(kind, t1, t2, &mut map1, &mut map2, &mut fresh, rng)
}

fn rewrite(parent: &Term, map: &Substitution) -> Option<Term> {
    if map.is_empty() {
        return Some(parent.clone());
    }
    let substituted = apply_substitute(parent, map)?;
    Some(rename_variables(&substituted))
}

/// Core recursion: extend `map1`/`map2` toward making `t1` and `t2`
/// equal. Order of commutative children is shuffled so repeated calls
/// explore different pairings at linear cost instead of trying all
/// permutations.
pub fn find_substitute(
    kind: VariableKind,
    t1: &Term,
    t2: &Term,
    map1: &mut Substitution,
    map2: &mut Substitution,
    fresh: &mut u32,
    rng: &mut impl Rng,
) -> bool {
    if let Term::Variable(k, _) = t1 {
        if *k == kind {
            if let Some(bound) = map1.get(t1).cloned() {
                return find_substitute(kind, &bound, t2, map1, map2, fresh, rng);
            }
            if matches!(t2, Term::Variable(k2, _) if *k2 == kind) {
                let common = Term::Variable(kind, *fresh);
                *fresh += 1;
                map1.insert(t1.clone(), common.clone());
                map2.insert(t2.clone(), common);
            } else {
                map1.insert(t1.clone(), t2.clone());
            }
            return true;
        }
    }
    if let Term::Variable(k, _) = t2 {
        if *k == kind {
            if let Some(bound) = map2.get(t2).cloned() {
                return find_substitute(kind, t1, &bound, map1, map2, fresh, rng);
            }
            map2.insert(t2.clone(), t1.clone());
            return true;
        }
    }
    if let (Term::Compound(c1), Term::Compound(c2)) = (t1, t2) {
        if c1.op != c2.op || c1.size() != c2.size() {
            return false;
        }
        if c1.op.is_image() && c1.relation_index != c2.relation_index {
            return false;
        }
        let mut order: Vec<usize> = (0..c2.size()).collect();
        if c1.op.is_commutative() {
            order.shuffle(rng);
        }
        return c1
            .components
            .iter()
            .zip(order.into_iter().map(|i| &c2.components[i]))
            .all(|(a, b)| find_substitute(kind, a, b, map1, map2, fresh, rng));
    }
    t1 == t2
}

/// Apply a substitution map, resolving transitive chains (`A→B→C` lands
/// on `C`). A chain that revisits a key is a broken caller invariant and
/// panics. `None` when a rebuilt compound fails validation.
pub fn apply_substitute(term: &Term, map: &Substitution) -> Option<Term> {
    if map.contains_key(term) {
        return Some(resolve_chain(term, map));
    }
    match term {
        Term::Compound(c) => {
            let components: Option<Vec<Term>> = c
                .components
                .iter()
                .map(|t| apply_substitute(t, map))
                .collect();
            make::clone_with_components(c, components?)
        }
        t => Some(t.clone()),
    }
}

fn resolve_chain(start: &Term, map: &Substitution) -> Term {
    let mut seen: Vec<&Term> = vec![start];
    let mut current = map.get(start).expect("resolve_chain on unmapped term");
    while let Some(next) = map.get(current) {
        if seen.contains(&current) {
            panic!("substitution cycle through {current:?}");
        }
        seen.push(current);
        current = next;
    }
    current.clone()
}

/// Relabel every variable by first-occurrence order, so structurally
/// equivalent terms reached along different substitution paths end up
/// identical.
pub fn rename_variables(term: &Term) -> Term {
    let mut numbering: HashMap<(VariableKind, u32), u32> = HashMap::new();
    rename_walk(term, &mut numbering)
}

fn rename_walk(term: &Term, numbering: &mut HashMap<(VariableKind, u32), u32>) -> Term {
    match term {
        Term::Variable(kind, id) => {
            let next = numbering.len() as u32 + 1;
            let new_id = *numbering.entry((*kind, *id)).or_insert(next);
            Term::Variable(*kind, new_id)
        }
        Term::Compound(c) => {
            let components: Vec<Term> = c
                .components
                .iter()
                .map(|t| rename_walk(t, numbering))
                .collect();
            make::clone_with_components(c, components)
                .expect("renaming cannot invalidate a term")
        }
        t => t.clone(),
    }
}

pub(crate) fn max_var_id(term: &Term) -> u32 {
    match term {
        Term::Variable(_, id) => *id,
        Term::Compound(c) => c.components.iter().map(max_var_id).max().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn w(s: &str) -> Term {
        Term::word(s)
    }

    fn var(kind: VariableKind, id: u32) -> Term {
        Term::Variable(kind, id)
    }

    #[test]
    fn test_unify_independent_variable() {
        // <$x --> bird> against <robin --> bird> binds $x → robin
        let pattern =
            make::make_inheritance(var(VariableKind::Independent, 1), w("bird")).unwrap();
        let fact = make::make_inheritance(w("robin"), w("bird")).unwrap();
        let (r1, r2) = unify(
            VariableKind::Independent,
            &pattern,
            &fact,
            &pattern,
            &fact,
            &mut rng(),
        )
        .unwrap();
        assert_eq!(r1, fact);
        assert_eq!(r2, fact);
    }

    #[test]
    fn test_unify_soundness() {
        // whenever unify succeeds, both rewritten parents are equal
        let p1 = make::make_implication(
            make::make_inheritance(var(VariableKind::Independent, 1), w("bird")).unwrap(),
            make::make_inheritance(var(VariableKind::Independent, 1), w("animal")).unwrap(),
        )
        .unwrap();
        let p2 = make::make_implication(
            make::make_inheritance(w("robin"), w("bird")).unwrap(),
            make::make_inheritance(w("robin"), w("animal")).unwrap(),
        )
        .unwrap();
        let (r1, r2) =
            unify(VariableKind::Independent, &p1, &p2, &p1, &p2, &mut rng()).unwrap();
        assert_eq!(r1, r2);
    }

    #[test]
    fn test_unify_wrong_kind_fails() {
        let pattern =
            make::make_inheritance(var(VariableKind::Dependent, 1), w("bird")).unwrap();
        let fact = make::make_inheritance(w("robin"), w("bird")).unwrap();
        assert!(
            unify(
                VariableKind::Independent,
                &pattern,
                &fact,
                &pattern,
                &fact,
                &mut rng()
            )
            .is_none()
        );
    }

    #[test]
    fn test_unify_mismatched_structure_fails() {
        let a = make::make_inheritance(w("a"), w("b")).unwrap();
        let b = make::make_similarity(w("a"), w("b")).unwrap();
        assert!(unify(VariableKind::Independent, &a, &b, &a, &b, &mut rng()).is_none());
    }

    #[test]
    fn test_unify_two_variables_collapse_to_common() {
        let p1 = make::make_inheritance(var(VariableKind::Independent, 1), w("bird")).unwrap();
        let p2 = make::make_inheritance(var(VariableKind::Independent, 7), w("bird")).unwrap();
        let (r1, r2) = unify(
            VariableKind::Independent,
            &p1,
            &p2,
            &p1,
            &p2,
            &mut rng(),
        )
        .unwrap();
        // both sides renamed to the same canonical variable
        assert_eq!(r1, r2);
        assert!(r1.contains_var_kind(VariableKind::Independent));
    }

    #[test]
    fn test_unify_commutative_any_pairing() {
        let conj1 = make::make_conjunction(vec![
            make::make_inheritance(var(VariableKind::Independent, 1), w("bird")).unwrap(),
            w("flies"),
        ])
        .unwrap();
        let conj2 = make::make_conjunction(vec![
            make::make_inheritance(w("robin"), w("bird")).unwrap(),
            w("flies"),
        ])
        .unwrap();
        // the pairing is shuffled, so a single attempt may miss; over many
        // seeds the valid pairing must be found, and every success must be
        // sound
        let mut successes = 0;
        for seed in 0..32 {
            let mut rng = SmallRng::seed_from_u64(seed);
            if let Some((r1, r2)) = unify(
                VariableKind::Independent,
                &conj1,
                &conj2,
                &conj1,
                &conj2,
                &mut rng,
            ) {
                assert_eq!(r1, r2, "seed {seed} produced unequal rewrites");
                successes += 1;
            }
        }
        assert!(successes > 0, "no seed found the valid pairing");
    }

    #[test]
    fn test_apply_substitute_transitive_chain() {
        let mut map = Substitution::new();
        map.insert(var(VariableKind::Independent, 1), var(VariableKind::Independent, 2));
        map.insert(var(VariableKind::Independent, 2), w("c"));
        let t = make::make_inheritance(var(VariableKind::Independent, 1), w("bird")).unwrap();
        let applied = apply_substitute(&t, &map).unwrap();
        assert_eq!(applied, make::make_inheritance(w("c"), w("bird")).unwrap());
    }

    #[test]
    #[should_panic(expected = "substitution cycle")]
    fn test_substitution_cycle_is_fatal() {
        let mut map = Substitution::new();
        map.insert(var(VariableKind::Independent, 1), var(VariableKind::Independent, 2));
        map.insert(var(VariableKind::Independent, 2), var(VariableKind::Independent, 1));
        let t = var(VariableKind::Independent, 1);
        let _ = apply_substitute(&t, &map);
    }

    #[test]
    fn test_substitution_to_invalid_statement_is_absent() {
        // binding $1 → b turns <$1 --> b> into <b --> b>, which is invalid
        let t = make::make_inheritance(var(VariableKind::Independent, 1), w("b")).unwrap();
        let mut map = Substitution::new();
        map.insert(var(VariableKind::Independent, 1), w("b"));
        assert!(apply_substitute(&t, &map).is_none());
    }

    #[test]
    fn test_rename_first_occurrence_order() {
        let t = make::make_inheritance(
            var(VariableKind::Independent, 9),
            var(VariableKind::Dependent, 4),
        )
        .unwrap();
        let renamed = rename_variables(&t);
        assert_eq!(
            renamed,
            make::make_inheritance(
                var(VariableKind::Independent, 1),
                var(VariableKind::Dependent, 2),
            )
            .unwrap()
        );
        // idempotent
        assert_eq!(rename_variables(&renamed), renamed);
    }

    #[test]
    fn test_rename_collapses_equivalent_numberings() {
        let a = make::make_implication(
            make::make_inheritance(var(VariableKind::Independent, 3), w("bird")).unwrap(),
            make::make_inheritance(var(VariableKind::Independent, 3), w("animal")).unwrap(),
        )
        .unwrap();
        let b = make::make_implication(
            make::make_inheritance(var(VariableKind::Independent, 8), w("bird")).unwrap(),
            make::make_inheritance(var(VariableKind::Independent, 8), w("animal")).unwrap(),
        )
        .unwrap();
        assert_eq!(rename_variables(&a), rename_variables(&b));
    }

    #[test]
    fn test_query_variable_unification() {
        let question =
            make::make_inheritance(var(VariableKind::Query, 1), w("bird")).unwrap();
        let belief = make::make_inheritance(w("robin"), w("bird")).unwrap();
        let (r1, _) = unify(
            VariableKind::Query,
            &question,
            &belief,
            &question,
            &belief,
            &mut rng(),
        )
        .unwrap();
        assert_eq!(r1, belief);
    }
}
