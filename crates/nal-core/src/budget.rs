//! Budget-value calculus: the resource side of every inference.
//!
//! A budget is the only mutable-in-place value in the engine. Decay,
//! activation and merge rewrite an owning item's budget directly, and the
//! inference-budget family feeds priority back into the belief link that
//! triggered a derivation — conclusions and attention shifts are produced
//! by the same call.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::BUDGET_THRESHOLD;
use crate::context::DerivationContext;
use crate::sentence::Sentence;
use crate::short_float::ShortFloat;
use crate::term::Term;
use crate::truth::{TruthValue, and2, or2, w2c};

/// Priority (immediate urgency), durability (decay resistance) and
/// quality (long-term usefulness) of an item.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetValue {
    pub priority: ShortFloat,
    pub durability: ShortFloat,
    pub quality: ShortFloat,
}

impl BudgetValue {
    pub fn new(priority: f32, durability: f32, quality: f32) -> Self {
        Self {
            priority: ShortFloat::new(priority),
            durability: ShortFloat::new(durability),
            quality: ShortFloat::new(quality),
        }
    }

    pub fn priority(&self) -> f32 {
        self.priority.to_f32()
    }

    pub fn durability(&self) -> f32 {
        self.durability.to_f32()
    }

    pub fn quality(&self) -> f32 {
        self.quality.to_f32()
    }

    pub fn inc_priority(&mut self, v: f32) {
        self.priority.increment(v);
    }

    pub fn dec_priority(&mut self, v: f32) {
        self.priority.decrement(v);
    }

    pub fn inc_durability(&mut self, v: f32) {
        self.durability.increment(v);
    }

    pub fn dec_durability(&mut self, v: f32) {
        self.durability.decrement(v);
    }

    /// Geometric mean of the three components.
    pub fn summary(&self) -> f32 {
        (self.priority() * self.durability() * self.quality()).cbrt()
    }

    /// Whether the item deserves any processing at all.
    pub fn above_threshold(&self) -> bool {
        self.summary() >= BUDGET_THRESHOLD
    }

    /// Component-wise maximum, in place. Used when a duplicate item
    /// arrives and the copies must collapse into one.
    pub fn merge(&mut self, other: &BudgetValue) {
        self.priority = self.priority.max(other.priority);
        self.durability = self.durability.max(other.durability);
        self.quality = self.quality.max(other.quality);
    }
}

impl fmt::Debug for BudgetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${};{};{}$", self.priority, self.durability, self.quality)
    }
}

/// Exponential decay of priority toward the quality floor.
///
/// Quality is first rescaled by the eviction threshold so that items never
/// decay below the point where they would be evicted anyway; the portion of
/// priority above that floor shrinks by durability^(1/(rate·p)).
pub fn forget(budget: &mut BudgetValue, forget_rate: f32, relative_threshold: f32) {
    let mut quality = budget.quality() * relative_threshold;
    let p = budget.priority() - quality;
    if p > 0.0 {
        quality += p * budget.durability().powf(1.0 / (forget_rate * p));
    }
    budget.priority.set(quality);
}

/// Activate a concept's budget with an incoming task's: priority climbs by
/// `or`, durability averages, quality is untouched.
pub fn activate(concept: &mut BudgetValue, incoming: &BudgetValue) {
    let priority = or2(concept.priority(), incoming.priority());
    let durability = ave_ari(concept.durability(), incoming.durability());
    concept.priority.set(priority);
    concept.durability.set(durability);
}

/// Split one budget across `n` freshly minted links.
pub fn distribute_among_links(budget: &BudgetValue, n: usize) -> BudgetValue {
    let priority = budget.priority() / (n.max(1) as f32).sqrt();
    BudgetValue::new(priority, budget.durability(), budget.quality())
}

/// Quality of a conclusion judged purely by its truth: high for decisive
/// values far from the midpoint, floored at 0.75 of the negation side.
pub fn truth_to_quality(t: &TruthValue) -> f32 {
    let e = t.expectation();
    e.max((1.0 - e) * 0.75)
}

/// Ranking score for stored beliefs: confidence spiced with originality
/// (shorter evidential bases rank higher at equal confidence).
pub fn rank_belief(judgement: &Sentence) -> f32 {
    let confidence = judgement
        .truth
        .as_ref()
        .map(|t| t.confidence())
        .unwrap_or(0.0);
    let originality = 1.0 / (judgement.stamp.serials.len() as f32 + 1.0);
    or2(confidence, originality)
}

/// How well `solution` answers `problem`.
///
/// A question with query variables scores by expectation per unit of
/// syntactic complexity; a specific question scores by confidence alone.
pub fn solution_quality(problem: &Sentence, solution: &Sentence) -> f32 {
    let truth = match &solution.truth {
        Some(t) => t,
        None => return 0.0,
    };
    if problem.punctuation.is_question() && problem.content.contains_query_var() {
        truth.expectation() / solution.content.complexity() as f32
    } else {
        truth.confidence()
    }
}

/// Reward the current task (and optionally the triggering links) for a
/// found solution; for question tasks, return the budget of the derived
/// answer.
pub fn solution_eval(
    solution: &Sentence,
    feedback_to_links: bool,
    ctx: &mut DerivationContext,
) -> Option<BudgetValue> {
    let quality = solution_quality(&ctx.current_task().sentence, solution);
    let budget = {
        let task = ctx.current_task_mut();
        if task.sentence.punctuation.is_judgement() {
            task.budget.inc_priority(quality);
            None
        } else {
            let task_priority = task.budget.priority();
            let budget = BudgetValue::new(
                or2(task_priority, quality),
                task.budget.durability(),
                solution
                    .truth
                    .as_ref()
                    .map(truth_to_quality)
                    .unwrap_or(0.0),
            );
            task.budget.priority.set((1.0 - quality).min(task_priority));
            Some(budget)
        }
    };
    if feedback_to_links {
        if let Some(t_link) = ctx.task_link.as_mut() {
            t_link.budget.inc_priority(quality);
        }
        if let Some(b_link) = ctx.belief_link.as_mut() {
            b_link.budget.inc_priority(quality);
        }
    }
    budget
}

/// Budget of a revision conclusion. Punishes the premises in proportion to
/// how little the merged truth moved, and rewards the merge itself by the
/// confidence it gained.
pub fn revise(
    t_truth: &TruthValue,
    b_truth: &TruthValue,
    truth: &TruthValue,
    feedback_to_links: bool,
    ctx: &mut DerivationContext,
) -> BudgetValue {
    let dif_t = truth.expectation_abs_dif(t_truth);
    {
        let task = ctx.current_task_mut();
        task.budget.dec_priority(1.0 - dif_t);
        task.budget.dec_durability(1.0 - dif_t);
    }
    if feedback_to_links {
        if let Some(t_link) = ctx.task_link.as_mut() {
            t_link.budget.dec_priority(1.0 - dif_t);
            t_link.budget.dec_durability(1.0 - dif_t);
        }
        let dif_b = truth.expectation_abs_dif(b_truth);
        if let Some(b_link) = ctx.belief_link.as_mut() {
            b_link.budget.dec_priority(1.0 - dif_b);
            b_link.budget.dec_durability(1.0 - dif_b);
        }
    }
    let dif = truth.confidence() - t_truth.confidence().max(b_truth.confidence());
    let task = ctx.current_task();
    BudgetValue::new(
        or2(dif.max(0.0), task.budget.priority()),
        ave_ari(dif.max(0.0), task.budget.durability()),
        truth_to_quality(truth),
    )
}

// --- inference-budget family ---

/// Forward inference: conclusion from two judgements.
pub fn forward(truth: &TruthValue, ctx: &mut DerivationContext) -> BudgetValue {
    budget_inference(truth_to_quality(truth), 1, ctx)
}

/// Backward inference with a strong rule.
pub fn backward(truth: &TruthValue, ctx: &mut DerivationContext) -> BudgetValue {
    budget_inference(truth_to_quality(truth), 1, ctx)
}

/// Backward inference with a weak rule.
pub fn backward_weak(truth: &TruthValue, ctx: &mut DerivationContext) -> BudgetValue {
    budget_inference(w2c(1.0) * truth_to_quality(truth), 1, ctx)
}

/// Forward inference into a compound conclusion.
pub fn compound_forward(
    truth: &TruthValue,
    content: &Term,
    ctx: &mut DerivationContext,
) -> BudgetValue {
    budget_inference(truth_to_quality(truth), content.complexity(), ctx)
}

/// Backward inference into a compound conclusion, strong rule.
pub fn compound_backward(content: &Term, ctx: &mut DerivationContext) -> BudgetValue {
    budget_inference(1.0, content.complexity(), ctx)
}

/// Backward inference into a compound conclusion, weak rule.
pub fn compound_backward_weak(content: &Term, ctx: &mut DerivationContext) -> BudgetValue {
    budget_inference(w2c(1.0), content.complexity(), ctx)
}

/// Common kernel: derive the conclusion budget from the task link (or the
/// task itself) and the belief link, divided by the conclusion's
/// complexity, and feed an activation boost back into the belief link.
fn budget_inference(quality: f32, complexity: usize, ctx: &mut DerivationContext) -> BudgetValue {
    let (mut priority, mut durability) = match ctx.task_link.as_ref() {
        Some(t_link) => (t_link.budget.priority(), t_link.budget.durability()),
        None => {
            let task = ctx.current_task();
            (task.budget.priority(), task.budget.durability())
        }
    };
    let complexity = complexity.max(1) as f32;
    durability /= complexity;
    let quality = quality / complexity;
    if let Some(b_link) = ctx.belief_link.as_mut() {
        priority = or2(priority, b_link.budget.priority());
        durability = and2(durability, b_link.budget.durability());
        let target_activation = ctx.belief_concept_activation;
        b_link.budget.inc_priority(or2(quality, target_activation));
        b_link.budget.inc_durability(quality);
    }
    BudgetValue::new(priority, durability, quality)
}

fn ave_ari(a: f32, b: f32) -> f32 {
    (a + b) / 2.0
}
