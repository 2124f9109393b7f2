//! Rules that fire when the task and a belief share content (or mirror
//! each other's content): revision, question answering, and the
//! conversion family that rewrites one statement into its reverse or
//! symmetric form.

use tracing::debug;

use crate::budget;
use crate::context::{DerivationContext, ReportKind};
use crate::make;
use crate::sentence::{Punctuation, Sentence};
use crate::term::{Term, VariableKind};
use crate::truth::{self, TruthValue};
use crate::variable;

/// Whether two judgements of the same content may merge.
pub fn revisable(s1: &Sentence, s2: &Sentence) -> bool {
    s1.content == s2.content && s1.revisable
}

/// Entry point when the selected belief lives in the task's own concept.
///
/// A judgement meeting an identical evidential base is a duplicate and
/// loses its priority; a judgement meeting fresh evidence revises; a
/// question that unifies with the belief takes it as a candidate answer.
pub fn match_task_and_belief(ctx: &mut DerivationContext) {
    let belief = ctx.require_belief().clone();
    if ctx.current_task().sentence.is_judgement() {
        if ctx.current_task().sentence.stamp.serials == belief.stamp.serials {
            debug!(task = %ctx.current_task().key(), "duplicate evidence");
            ctx.current_task_mut().budget.dec_priority(0.0);
            return;
        }
        if revisable(&ctx.current_task().sentence, &belief) {
            revision(ctx, false);
        }
    } else {
        let task_content = ctx.current_task().sentence.content.clone();
        if variable::has_substitute(
            VariableKind::Query,
            &task_content,
            &belief.content,
            &mut ctx.rng,
        ) {
            try_solution(&belief, ctx);
        }
    }
}

/// Merge the current task with the belief into a single judgement backed
/// by the pooled evidence.
pub fn revision(ctx: &mut DerivationContext, feedback_to_links: bool) {
    let task_truth = ctx.current_task().sentence.truth().clone();
    let belief_truth = ctx.require_belief().truth().clone();
    let truth = truth::revision(&task_truth, &belief_truth);
    let budget = budget::revise(&task_truth, &belief_truth, &truth, feedback_to_links, ctx);
    let content = ctx.current_task().sentence.content.clone();
    debug!(content = %content, "revision");
    ctx.double_premise_task(content, Some(truth), budget);
}

/// Offer `solution` as an answer to the current (question) task. Keeps
/// only the best answer seen so far, reports it when the question came
/// from outside, and may re-inject the answer as a task.
pub fn try_solution(solution: &Sentence, ctx: &mut DerivationContext) {
    let new_quality = budget::solution_quality(&ctx.current_task().sentence, solution);
    if let Some(old) = &ctx.current_task().best_solution {
        let old_quality = budget::solution_quality(&ctx.current_task().sentence, old);
        if old_quality >= new_quality {
            return;
        }
    }
    ctx.current_task_mut().best_solution = Some(solution.clone());
    if ctx.current_task().is_input() {
        ctx.report(solution, ReportKind::Answer);
    }
    if let Some(budget) = budget::solution_eval(solution, true, ctx) {
        ctx.activated_task(budget, solution.clone());
    }
}

/// The task and the belief carry the same statement with subject and
/// predicate swapped. A judgement pair infers the symmetric statement; a
/// question converts the belief instead.
pub fn match_reverse(ctx: &mut DerivationContext) {
    if ctx.current_task().sentence.is_judgement() {
        infer_to_sym(ctx);
    } else {
        conversion(ctx);
    }
}

/// An asymmetric and a symmetric statement about the same terms met. A
/// judgement pair strips the symmetric premise down to one direction; a
/// question converts across the pair.
pub fn match_asym_sym(asym: &Sentence, sym: &Sentence, ctx: &mut DerivationContext) {
    if ctx.current_task().sentence.is_judgement() {
        infer_to_asym(asym, sym, ctx);
    } else {
        convert_relation(ctx);
    }
}

/// {<S → P>, <P → S>} ⊢ <S ↔ P>.
fn infer_to_sym(ctx: &mut DerivationContext) {
    let statement = match ctx.current_task().sentence.content.as_statement() {
        Some(s) => s.clone(),
        None => return,
    };
    let subject = statement.components[0].clone();
    let predicate = statement.components[1].clone();
    let content = match make::make_statement_symmetric(&statement, subject, predicate) {
        Some(c) => c,
        None => return,
    };
    let truth = truth::intersection(
        ctx.current_task().sentence.truth(),
        ctx.require_belief().truth(),
    );
    let budget = budget::forward(&truth, ctx);
    ctx.double_premise_task(content, Some(truth), budget);
}

/// {<S ↔ P>, <P → S>} ⊢ <S → P>.
fn infer_to_asym(asym: &Sentence, sym: &Sentence, ctx: &mut DerivationContext) {
    let statement = match asym.content.as_statement() {
        Some(s) => s.clone(),
        None => return,
    };
    let subject = statement.components[1].clone();
    let predicate = statement.components[0].clone();
    let content = match make::make_statement_from(&statement, subject, predicate) {
        Some(c) => c,
        None => return,
    };
    let truth = truth::reduce_conjunction(sym.truth(), asym.truth());
    let budget = budget::forward(&truth, ctx);
    ctx.double_premise_task(content, Some(truth), budget);
}

/// Answer a reversed question by converting the belief.
fn conversion(ctx: &mut DerivationContext) {
    let truth = truth::conversion(ctx.require_belief().truth());
    let budget = budget::forward(&truth, ctx);
    converted_judgement(truth, budget, ctx);
}

/// Answer an asymmetric question from a symmetric belief (or the other
/// way round) by a structural one-premise step.
fn convert_relation(ctx: &mut DerivationContext) {
    let commutative = ctx
        .current_task()
        .sentence
        .content
        .op()
        .map(|op| op.is_commutative())
        .unwrap_or(false);
    let belief_truth = ctx.require_belief().truth().clone();
    let truth = if commutative {
        truth::abduction_reliance(&belief_truth, 1.0)
    } else {
        truth::deduction_reliance(&belief_truth, 1.0)
    };
    let budget = budget::forward(&truth, ctx);
    converted_judgement(truth, budget, ctx);
}

/// Build the answer statement by filling the question's query-variable
/// side with the matching term from the belief.
fn converted_judgement(truth: TruthValue, budget: crate::budget::BudgetValue, ctx: &mut DerivationContext) {
    let statement = match ctx.current_task().sentence.content.as_statement() {
        Some(s) => s.clone(),
        None => return,
    };
    let belief_statement = match ctx.require_belief().content.as_statement() {
        Some(s) => s.clone(),
        None => return,
    };
    let subj_t = statement.components[0].clone();
    let pred_t = statement.components[1].clone();
    let subj_b = belief_statement.components[0].clone();
    let pred_b = belief_statement.components[1].clone();
    let content = if subj_t.contains_query_var() {
        let other = if pred_t == subj_b { pred_b } else { subj_b };
        make::make_statement_from(&statement, other, pred_t)
    } else if pred_t.contains_query_var() {
        let other = if subj_t == pred_b { subj_b } else { pred_b };
        make::make_statement_from(&statement, subj_t, other)
    } else {
        Some(Term::Compound(statement))
    };
    if let Some(content) = content {
        ctx.single_premise_task(content, Punctuation::Judgement, Some(truth), budget);
    }
}
