//! Truth-value calculus: the closed-form combinators that propagate
//! frequency/confidence pairs through each inference rule.
//!
//! Every function is pure and returns a fresh value. The two primitives
//! everything reduces to are `and` (product) and `or` (complement of the
//! product of complements), plus the evidence/confidence conversions
//! `w2c` / `c2w` with a fixed evidential horizon.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{HORIZON, MAX_CONFIDENCE};
use crate::short_float::ShortFloat;

/// Degree of belief: frequency (proportion of positive evidence) and
/// confidence (stability of that frequency under future evidence).
///
/// `analytic` marks values produced by structural rules; several
/// combinators refuse to do empirical work on analytic inputs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TruthValue {
    pub frequency: ShortFloat,
    pub confidence: ShortFloat,
    pub analytic: bool,
}

impl TruthValue {
    /// Confidence is clamped strictly below 1: full certainty is reserved
    /// for the revision special case, never constructed directly.
    pub fn new(frequency: f32, confidence: f32) -> Self {
        Self {
            frequency: ShortFloat::new(frequency),
            confidence: ShortFloat::new(confidence.min(MAX_CONFIDENCE)),
            analytic: false,
        }
    }

    pub fn new_analytic(frequency: f32, confidence: f32) -> Self {
        Self {
            analytic: true,
            ..Self::new(frequency, confidence)
        }
    }

    /// The neutral value: no evidence either way.
    pub fn unknown() -> Self {
        Self::new(0.5, 0.0)
    }

    pub fn frequency(&self) -> f32 {
        self.frequency.to_f32()
    }

    pub fn confidence(&self) -> f32 {
        self.confidence.to_f32()
    }

    /// Expectation: e = c·(f − 0.5) + 0.5, the decision-making value.
    pub fn expectation(&self) -> f32 {
        self.confidence() * (self.frequency() - 0.5) + 0.5
    }

    /// Absolute difference of expectations, used to score solutions.
    pub fn expectation_abs_dif(&self, other: &TruthValue) -> f32 {
        (self.expectation() - other.expectation()).abs()
    }

    /// A judgement counts as negative when its frequency is below half.
    pub fn is_negative(&self) -> bool {
        self.frequency() < 0.5
    }
}

impl fmt::Debug for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{};{}%", self.frequency, self.confidence)
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{:.2};{:.2}%", self.frequency(), self.confidence())
    }
}

// --- primitives ---

pub fn and2(a: f32, b: f32) -> f32 {
    a * b
}

pub fn and3(a: f32, b: f32, c: f32) -> f32 {
    a * b * c
}

pub fn and4(a: f32, b: f32, c: f32, d: f32) -> f32 {
    a * b * c * d
}

pub fn or2(a: f32, b: f32) -> f32 {
    1.0 - (1.0 - a) * (1.0 - b)
}

/// Evidence weight to confidence: w / (w + K).
pub fn w2c(w: f32) -> f32 {
    w / (w + HORIZON)
}

/// Confidence back to evidence weight: K·c / (1 − c).
pub fn c2w(c: f32) -> f32 {
    HORIZON * c / (1.0 - c)
}

// --- two-premise combinators ---

/// Revision: pool two bodies of evidence about the same content.
///
/// Confidence at the cap is treated as infinite evidence: two capped
/// operands average arithmetically, a single capped operand dominates.
pub fn revision(a: &TruthValue, b: &TruthValue) -> TruthValue {
    let cap = ShortFloat::new(MAX_CONFIDENCE);
    match (a.confidence == cap, b.confidence == cap) {
        (true, true) => TruthValue::new(
            (a.frequency() + b.frequency()) / 2.0,
            MAX_CONFIDENCE,
        ),
        (true, false) => *a,
        (false, true) => *b,
        (false, false) => {
            let w1 = c2w(a.confidence());
            let w2 = c2w(b.confidence());
            let w = w1 + w2;
            TruthValue::new(
                (w1 * a.frequency() + w2 * b.frequency()) / w,
                w2c(w),
            )
        }
    }
}

/// Deduction: {<M → P>, <S → M>} ⊢ <S → P>.
pub fn deduction(a: &TruthValue, b: &TruthValue) -> TruthValue {
    let f = and2(a.frequency(), b.frequency());
    TruthValue::new(f, and3(a.confidence(), b.confidence(), f))
}

/// Structural deduction against a fixed reliance; the result is analytic.
pub fn deduction_reliance(a: &TruthValue, reliance: f32) -> TruthValue {
    let f = a.frequency();
    TruthValue::new_analytic(f, and3(f, a.confidence(), reliance))
}

/// Analogy: asymmetric premise carried across a symmetric one.
pub fn analogy(a: &TruthValue, b: &TruthValue) -> TruthValue {
    TruthValue::new(
        and2(a.frequency(), b.frequency()),
        and3(a.confidence(), b.confidence(), b.frequency()),
    )
}

/// Resemblance: two symmetric premises chained.
pub fn resemblance(a: &TruthValue, b: &TruthValue) -> TruthValue {
    TruthValue::new(
        and2(a.frequency(), b.frequency()),
        and3(
            a.confidence(),
            b.confidence(),
            or2(a.frequency(), b.frequency()),
        ),
    )
}

/// Abduction: weak inference from shared predicate. Analytic premises
/// carry no evidence for it, so they yield the neutral value.
pub fn abduction(a: &TruthValue, b: &TruthValue) -> TruthValue {
    if a.analytic || b.analytic {
        return TruthValue::unknown();
    }
    let w = and3(b.frequency(), a.confidence(), b.confidence());
    TruthValue::new(a.frequency(), w2c(w))
}

/// Structural abduction against a fixed reliance; the result is analytic.
pub fn abduction_reliance(a: &TruthValue, reliance: f32) -> TruthValue {
    if a.analytic {
        return TruthValue::unknown();
    }
    TruthValue::new_analytic(a.frequency(), w2c(and2(a.confidence(), reliance)))
}

/// Induction: abduction with the premises swapped.
pub fn induction(a: &TruthValue, b: &TruthValue) -> TruthValue {
    abduction(b, a)
}

/// Exemplification: weak inverse of deduction; analytic premises yield
/// the neutral value.
pub fn exemplification(a: &TruthValue, b: &TruthValue) -> TruthValue {
    if a.analytic || b.analytic {
        return TruthValue::unknown();
    }
    let w = and4(a.frequency(), b.frequency(), a.confidence(), b.confidence());
    TruthValue::new(1.0, w2c(w))
}

/// Comparison: similarity between two terms sharing a component.
pub fn comparison(a: &TruthValue, b: &TruthValue) -> TruthValue {
    let f0 = or2(a.frequency(), b.frequency());
    let f = if f0 == 0.0 {
        0.0
    } else {
        and2(a.frequency(), b.frequency()) / f0
    };
    let w = and3(f0, a.confidence(), b.confidence());
    TruthValue::new(f, w2c(w))
}

// --- single-premise combinators ---

/// Conversion: <S → P> from <P → S>; evidence only from the positive case.
pub fn conversion(a: &TruthValue) -> TruthValue {
    let w = and2(a.frequency(), a.confidence());
    TruthValue::new_analytic(1.0, w2c(w))
}

/// Negation flips frequency and keeps confidence.
pub fn negation(a: &TruthValue) -> TruthValue {
    TruthValue {
        frequency: ShortFloat::new(1.0 - a.frequency()),
        confidence: a.confidence,
        analytic: a.analytic,
    }
}

/// Contraposition: evidence only from the negative case.
pub fn contraposition(a: &TruthValue) -> TruthValue {
    let w = and2(1.0 - a.frequency(), a.confidence());
    TruthValue::new_analytic(0.0, w2c(w))
}

// --- compositional combinators ---

/// Union of the evidence for two components.
pub fn union(a: &TruthValue, b: &TruthValue) -> TruthValue {
    TruthValue::new(
        or2(a.frequency(), b.frequency()),
        and2(a.confidence(), b.confidence()),
    )
}

/// Intersection of the evidence for two components.
pub fn intersection(a: &TruthValue, b: &TruthValue) -> TruthValue {
    TruthValue::new(
        and2(a.frequency(), b.frequency()),
        and2(a.confidence(), b.confidence()),
    )
}

/// Recover a disjunction component: (A ∨ B) and ¬B give A.
pub fn reduce_disjunction(a: &TruthValue, b: &TruthValue) -> TruthValue {
    let v0 = intersection(a, &negation(b));
    deduction_reliance(&v0, 1.0)
}

/// Recover a conjunction component: ¬(A ∧ B) and A give ¬B.
pub fn reduce_conjunction(a: &TruthValue, b: &TruthValue) -> TruthValue {
    let v0 = intersection(&negation(a), b);
    negation(&deduction_reliance(&v0, 1.0))
}

/// `reduce_conjunction` against the negated second premise.
pub fn reduce_conjunction_neg(a: &TruthValue, b: &TruthValue) -> TruthValue {
    reduce_conjunction(a, &negation(b))
}

/// Analogy through an anonymous (dependent-variable) middle term: the
/// first premise participates only at single-evidence strength.
pub fn anonymous_analogy(a: &TruthValue, b: &TruthValue) -> TruthValue {
    let v0 = TruthValue::new(a.frequency(), w2c(a.confidence()));
    analogy(b, &v0)
}
