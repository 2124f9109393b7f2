//! Property-based tests for the algebraic claims the calculus rests on:
//! commutativity of the pooling operations, bounds on merged evidence,
//! decay monotonicity, and canonicalization being order-insensitive.

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use nal_core::budget::{self, BudgetValue};
use nal_core::constants::MAX_STAMP_LENGTH;
use nal_core::make;
use nal_core::stamp::Stamp;
use nal_core::term::{Term, VariableKind};
use nal_core::truth::{self, TruthValue};
use nal_core::variable;
use nal_core::ShortFloat;

const WORDS: [&str; 6] = ["robin", "bird", "animal", "swan", "swimmer", "feathered"];

fn unit() -> impl Strategy<Value = f32> {
    (0u16..=10000).prop_map(|i| i as f32 / 10000.0)
}

fn confidence() -> impl Strategy<Value = f32> {
    // stay below the cap so revision runs its pooled-weight branch
    (0u16..=9900).prop_map(|i| i as f32 / 10000.0)
}

fn truth_value() -> impl Strategy<Value = TruthValue> {
    (unit(), confidence()).prop_map(|(f, c)| TruthValue::new(f, c))
}

fn stamp(serials: Vec<i64>) -> Stamp {
    Stamp {
        serials,
        creation_time: 0,
    }
}

proptest! {
    #[test]
    fn revision_is_commutative(a in truth_value(), b in truth_value()) {
        prop_assert_eq!(truth::revision(&a, &b), truth::revision(&b, &a));
    }

    #[test]
    fn intersection_union_comparison_commute(a in truth_value(), b in truth_value()) {
        prop_assert_eq!(truth::intersection(&a, &b), truth::intersection(&b, &a));
        prop_assert_eq!(truth::union(&a, &b), truth::union(&b, &a));
        prop_assert_eq!(truth::comparison(&a, &b), truth::comparison(&b, &a));
    }

    #[test]
    fn revision_confidence_dominates_parents(a in truth_value(), b in truth_value()) {
        let r = truth::revision(&a, &b);
        prop_assert!(r.confidence() >= a.confidence().max(b.confidence()) - 1e-4);
    }

    #[test]
    fn expectation_stays_in_unit_interval(t in truth_value()) {
        prop_assert!((0.0..=1.0).contains(&t.expectation()));
    }

    #[test]
    fn weight_conversion_round_trips(c in 0u16..=9900) {
        let c = c as f32 / 10000.0;
        prop_assert!((truth::w2c(truth::c2w(c)) - c).abs() < 1e-3);
    }

    #[test]
    fn short_float_round_trip_error_is_bounded(v in unit()) {
        prop_assert!((ShortFloat::new(v).to_f32() - v).abs() <= 0.5 / 10000.0 + 1e-6);
    }

    #[test]
    fn stamp_merge_is_bounded_and_order_insensitive_as_a_set(
        a in prop::collection::vec(0i64..50, 1..10),
        b in prop::collection::vec(50i64..100, 1..10),
    ) {
        let sa = stamp(a);
        let sb = stamp(b);
        let m1 = Stamp::merge(&sa, &sb, 7).unwrap();
        let m2 = Stamp::merge(&sb, &sa, 7).unwrap();
        prop_assert!(m1.serials.len() <= MAX_STAMP_LENGTH);
        // equal-length parents tie-break by argument order, so the
        // interleaving may differ; the retained evidence must not
        let mut e1 = m1.serials;
        let mut e2 = m2.serials;
        e1.sort_unstable();
        e2.sort_unstable();
        prop_assert_eq!(e1, e2);
    }

    #[test]
    fn stamp_overlap_is_symmetric_and_blocks_merge(
        a in prop::collection::vec(0i64..20, 1..8),
        b in prop::collection::vec(0i64..20, 1..8),
    ) {
        let sa = stamp(a);
        let sb = stamp(b);
        prop_assert_eq!(sa.overlaps(&sb), sb.overlaps(&sa));
        prop_assert_eq!(Stamp::merge(&sa, &sb, 0).is_none(), sa.overlaps(&sb));
    }

    #[test]
    fn forget_never_raises_priority_above_start_or_floor(
        p in unit(),
        d in unit(),
        q in unit(),
        rate in 1u8..100,
    ) {
        let mut b = BudgetValue::new(p, d, q);
        let relative_threshold = 0.3;
        budget::forget(&mut b, rate as f32, relative_threshold);
        let floor = q * relative_threshold;
        prop_assert!(b.priority() <= p.max(floor) + 1e-3);
        prop_assert!(b.priority() >= floor - 1e-3);
    }

    #[test]
    fn conjunction_canonical_form_ignores_order(
        indices in prop::collection::vec(0usize..WORDS.len(), 2..6),
        rotation in 0usize..6,
    ) {
        let original: Vec<Term> = indices.iter().map(|&i| Term::word(WORDS[i])).collect();
        let mut rotated = original.clone();
        let len = rotated.len();
        rotated.rotate_left(rotation % len);
        prop_assert_eq!(
            make::make_conjunction(original),
            make::make_conjunction(rotated)
        );
    }

    #[test]
    fn intersection_canonical_form_ignores_order(
        indices in prop::collection::vec(0usize..WORDS.len(), 2..6),
        rotation in 0usize..6,
    ) {
        let original: Vec<Term> = indices.iter().map(|&i| Term::word(WORDS[i])).collect();
        let mut rotated = original.clone();
        let len = rotated.len();
        rotated.rotate_left(rotation % len);
        prop_assert_eq!(
            make::make_intersection_ext(original),
            make::make_intersection_ext(rotated)
        );
    }

    #[test]
    fn unification_is_reflexive(s in 0usize..WORDS.len(), p in 0usize..WORDS.len()) {
        prop_assume!(s != p);
        let t = make::make_inheritance(Term::word(WORDS[s]), Term::word(WORDS[p])).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        prop_assert!(variable::has_substitute(
            VariableKind::Independent,
            &t,
            &t,
            &mut rng
        ));
    }

    #[test]
    fn unification_rewrites_variable_to_constant(
        s in 0usize..WORDS.len(),
        p in 0usize..WORDS.len(),
    ) {
        prop_assume!(s != p);
        let var = Term::Variable(VariableKind::Independent, 1);
        let open = make::make_inheritance(var.clone(), Term::word(WORDS[p])).unwrap();
        let closed =
            make::make_inheritance(Term::word(WORDS[s]), Term::word(WORDS[p])).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let (r1, r2) = variable::unify(
            VariableKind::Independent,
            &var,
            &Term::word(WORDS[s]),
            &open,
            &closed,
            &mut rng,
        )
        .expect("variable against constant must unify");
        prop_assert_eq!(r1, closed.clone());
        prop_assert_eq!(r2, closed);
    }
}
