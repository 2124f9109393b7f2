//! Rules that build or dismantle compound terms from two premises
//! sharing one side, plus the variable-introduction rules that abstract
//! a shared term into a variable.

use crate::budget;
use crate::context::DerivationContext;
use crate::make;
use crate::term::{CompoundTerm, Term, TermOperator, VariableKind};
use crate::truth::{self, TruthValue};
use crate::variable;

/// {<M → T1>, <M → T2>} ⊢ <M → (T1 op T2)> for union, intersection and
/// difference (`index` names the shared side). When one component already
/// contains the other, decomposition fires instead.
pub fn compose_compound(
    task_content: &CompoundTerm,
    belief_content: &CompoundTerm,
    index: usize,
    ctx: &mut DerivationContext,
) {
    if !ctx.current_task().sentence.is_judgement() || task_content.op != belief_content.op {
        return;
    }
    let component_common = task_content.components[index].clone();
    let component_t = task_content.components[1 - index].clone();
    let component_b = belief_content.components[1 - index].clone();
    if let Some(ct) = component_t.as_compound() {
        if contains_all_components(ct, &component_b) {
            decompose_compound(
                &ct.clone(),
                &component_b,
                &component_common,
                index,
                true,
                ctx,
            );
            return;
        }
    }
    if let Some(cb) = component_b.as_compound() {
        if contains_all_components(cb, &component_t) {
            decompose_compound(
                &cb.clone(),
                &component_t,
                &component_common,
                index,
                false,
                ctx,
            );
            return;
        }
    }
    let truth_t = ctx.current_task().sentence.truth().clone();
    let truth_b = ctx.require_belief().truth().clone();
    let truth_or = truth::union(&truth_t, &truth_b);
    let truth_and = truth::intersection(&truth_t, &truth_b);
    let inheritance = task_content.op == TermOperator::Inheritance;
    let pair = vec![component_t.clone(), component_b.clone()];
    if index == 0 {
        let (term_or, term_and, dif) = if inheritance {
            (
                make::make_intersection_int(pair.clone()),
                make::make_intersection_ext(pair),
                difference(&component_t, &component_b, &truth_t, &truth_b, false),
            )
        } else if task_content.op == TermOperator::Implication {
            (
                make::make_disjunction(pair.clone()),
                make::make_conjunction(pair),
                (None, None),
            )
        } else {
            return;
        };
        process_composed(task_content, component_common.clone(), term_or, truth_or, ctx);
        process_composed(task_content, component_common.clone(), term_and, truth_and, ctx);
        if let (term_dif, Some(t)) = dif {
            process_composed(task_content, component_common.clone(), term_dif, t, ctx);
        }
    } else {
        let (term_or, term_and, dif) = if inheritance {
            (
                make::make_intersection_ext(pair.clone()),
                make::make_intersection_int(pair),
                difference(&component_t, &component_b, &truth_t, &truth_b, true),
            )
        } else if task_content.op == TermOperator::Implication {
            (
                make::make_conjunction(pair.clone()),
                make::make_disjunction(pair),
                (None, None),
            )
        } else {
            return;
        };
        process_composed_rev(task_content, component_common.clone(), term_or, truth_or, ctx);
        process_composed_rev(task_content, component_common.clone(), term_and, truth_and, ctx);
        if let (term_dif, Some(t)) = dif {
            process_composed_rev(task_content, component_common.clone(), term_dif, t, ctx);
        }
    }
    if inheritance {
        intro_var_outer(task_content, belief_content, index, ctx);
    }
}

/// A difference term only makes sense when exactly one premise is
/// negative; the negative side is subtracted.
fn difference(
    component_t: &Term,
    component_b: &Term,
    truth_t: &TruthValue,
    truth_b: &TruthValue,
    intensional: bool,
) -> (Option<Term>, Option<TruthValue>) {
    let build = |a: &Term, b: &Term| {
        if intensional {
            make::make_difference_int(a.clone(), b.clone())
        } else {
            make::make_difference_ext(a.clone(), b.clone())
        }
    };
    if truth_b.is_negative() && !truth_t.is_negative() {
        (
            build(component_t, component_b),
            Some(truth::intersection(truth_t, &truth::negation(truth_b))),
        )
    } else if truth_t.is_negative() && !truth_b.is_negative() {
        (
            build(component_b, component_t),
            Some(truth::intersection(truth_b, &truth::negation(truth_t))),
        )
    } else {
        (None, None)
    }
}

fn process_composed(
    template: &CompoundTerm,
    subject: Term,
    predicate: Option<Term>,
    truth: TruthValue,
    ctx: &mut DerivationContext,
) {
    let Some(predicate) = predicate else { return };
    let Some(content) = make::make_statement_from(template, subject, predicate) else {
        return;
    };
    finish_composed(template, content, truth, ctx);
}

fn process_composed_rev(
    template: &CompoundTerm,
    predicate: Term,
    subject: Option<Term>,
    truth: TruthValue,
    ctx: &mut DerivationContext,
) {
    let Some(subject) = subject else { return };
    let Some(content) = make::make_statement_from(template, subject, predicate) else {
        return;
    };
    finish_composed(template, content, truth, ctx);
}

fn finish_composed(
    template: &CompoundTerm,
    content: Term,
    truth: TruthValue,
    ctx: &mut DerivationContext,
) {
    if content == Term::Compound(template.clone())
        || content == ctx.require_belief().content
    {
        return;
    }
    let budget = budget::compound_forward(&truth, &content, ctx);
    ctx.double_premise_task(content, Some(truth), budget);
}

/// {<M → (T1 op T2)>, <M → T1>} ⊢ <M → T2>: strip a shared component
/// out of a compound side.
pub fn decompose_compound(
    compound: &CompoundTerm,
    component: &Term,
    term1: &Term,
    index: usize,
    compound_task: bool,
    ctx: &mut DerivationContext,
) {
    if compound.op.is_statement() || compound.op.is_image() {
        return;
    }
    let Some(term2) = make::reduce_components(compound, component) else {
        return;
    };
    let statement = match ctx.current_task().sentence.content.as_statement() {
        Some(s) => s.clone(),
        None => return,
    };
    if ctx.current_task().sentence.is_question() {
        return;
    }
    let (v1, v2) = premise_truths(compound_task, ctx);
    let inheritance = statement.op == TermOperator::Inheritance;
    let higher = statement.op == TermOperator::Implication;
    let truth = if index == 0 {
        if inheritance {
            match compound.op {
                TermOperator::IntersectionExt => Some(truth::reduce_conjunction(&v1, &v2)),
                TermOperator::IntersectionInt => Some(truth::reduce_disjunction(&v1, &v2)),
                TermOperator::SetInt if component.op() == Some(TermOperator::SetInt) => {
                    Some(truth::reduce_conjunction(&v1, &v2))
                }
                TermOperator::SetExt if component.op() == Some(TermOperator::SetExt) => {
                    Some(truth::reduce_disjunction(&v1, &v2))
                }
                TermOperator::DifferenceExt => {
                    if &compound.components[0] == component {
                        Some(truth::reduce_disjunction(&v2, &v1))
                    } else {
                        Some(truth::reduce_conjunction_neg(&v1, &v2))
                    }
                }
                _ => None,
            }
        } else if higher {
            match compound.op {
                TermOperator::Conjunction => Some(truth::reduce_conjunction(&v1, &v2)),
                TermOperator::Disjunction => Some(truth::reduce_disjunction(&v1, &v2)),
                _ => None,
            }
        } else {
            None
        }
    } else if inheritance {
        match compound.op {
            TermOperator::IntersectionInt => Some(truth::reduce_conjunction(&v1, &v2)),
            TermOperator::IntersectionExt => Some(truth::reduce_disjunction(&v1, &v2)),
            TermOperator::SetExt if component.op() == Some(TermOperator::SetExt) => {
                Some(truth::reduce_conjunction(&v1, &v2))
            }
            TermOperator::SetInt if component.op() == Some(TermOperator::SetInt) => {
                Some(truth::reduce_disjunction(&v1, &v2))
            }
            TermOperator::DifferenceInt => {
                if &compound.components[1] == component {
                    Some(truth::reduce_disjunction(&v2, &v1))
                } else {
                    Some(truth::reduce_conjunction_neg(&v1, &v2))
                }
            }
            _ => None,
        }
    } else if higher {
        match compound.op {
            TermOperator::Disjunction => Some(truth::reduce_conjunction(&v1, &v2)),
            TermOperator::Conjunction => Some(truth::reduce_disjunction(&v1, &v2)),
            _ => None,
        }
    } else {
        None
    };
    let Some(truth) = truth else { return };
    let content = if index == 0 {
        make::make_statement_from(&statement, term1.clone(), term2)
    } else {
        make::make_statement_from(&statement, term2, term1.clone())
    };
    let Some(content) = content else { return };
    let budget = budget::compound_forward(&truth, &content, ctx);
    ctx.double_premise_task(content, Some(truth), budget);
}

/// {(T1 op T2), T1} ⊢ T2 for conjunction and disjunction at statement
/// level.
pub fn decompose_statement(
    compound: &CompoundTerm,
    component: &Term,
    compound_task: bool,
    ctx: &mut DerivationContext,
) {
    if ctx.current_task().sentence.is_question() {
        return;
    }
    let Some(content) = make::reduce_components(compound, component) else {
        return;
    };
    let (v1, v2) = premise_truths(compound_task, ctx);
    let truth = match compound.op {
        TermOperator::Conjunction => truth::reduce_conjunction(&v1, &v2),
        TermOperator::Disjunction => truth::reduce_disjunction(&v1, &v2),
        _ => return,
    };
    let budget = budget::compound_forward(&truth, &content, ctx);
    ctx.double_premise_task(content, Some(truth), budget);
}

/// A conjunction containing a dependent variable met a statement that
/// binds it: peel the matched component off and keep the rest.
pub fn elimi_var_dep(
    compound: &CompoundTerm,
    component: &Term,
    compound_task: bool,
    ctx: &mut DerivationContext,
) {
    let Some(content) = make::reduce_components(compound, component) else {
        return;
    };
    if ctx.current_task().sentence.is_question() {
        let belief_truth = ctx.require_belief().truth().clone();
        let budget = if compound_task {
            budget::backward(&belief_truth, ctx)
        } else {
            budget::backward_weak(&belief_truth, ctx)
        };
        ctx.double_premise_task(content, None, budget);
    } else {
        let (v1, v2) = premise_truths(compound_task, ctx);
        let truth = truth::anonymous_analogy(&v1, &v2);
        let budget = budget::compound_forward(&truth, &content, ctx);
        ctx.double_premise_task(content, Some(truth), budget);
    }
}

/// Abstract the term shared by two inheritance premises into variables,
/// producing implication, equivalence and conjunction conclusions.
pub fn intro_var_outer(
    task_content: &CompoundTerm,
    belief_content: &CompoundTerm,
    index: usize,
    ctx: &mut DerivationContext,
) {
    if !ctx.current_task().sentence.is_judgement() {
        return;
    }
    let truth_t = ctx.current_task().sentence.truth().clone();
    let truth_b = ctx.require_belief().truth().clone();
    let base = variable::max_var_id(&Term::Compound(task_content.clone()))
        .max(variable::max_var_id(&Term::Compound(belief_content.clone())));
    let var_ind = Term::variable(VariableKind::Independent, base + 1);
    let var_ind2 = Term::variable(VariableKind::Independent, base + 2);
    // the shared side becomes a variable; if the other sides are both
    // images sharing a second term, that term abstracts too
    let (mut term11, mut term21, mut term12, mut term22) = if index == 0 {
        (
            var_ind.clone(),
            var_ind.clone(),
            task_content.components[1].clone(),
            belief_content.components[1].clone(),
        )
    } else {
        (
            task_content.components[0].clone(),
            belief_content.components[0].clone(),
            var_ind.clone(),
            var_ind.clone(),
        )
    };
    let (image_op, open1, open2) = if index == 0 {
        (TermOperator::ImageExt, &mut term12, &mut term22)
    } else {
        (TermOperator::ImageInt, &mut term11, &mut term21)
    };
    if let Some(common) = second_common_term(open1, open2, image_op) {
        let mut subs = variable::Substitution::new();
        subs.insert(common, var_ind2.clone());
        if let Some(t) = variable::apply_substitute(open1, &subs) {
            *open1 = t;
        }
        if let Some(t) = variable::apply_substitute(open2, &subs) {
            *open2 = t;
        }
    }
    let (Some(state1), Some(state2)) = (
        make::make_inheritance(term11, term12),
        make::make_inheritance(term21, term22),
    ) else {
        return;
    };
    if let Some(content) = make::make_implication(state1.clone(), state2.clone()) {
        let truth = truth::induction(&truth_t, &truth_b);
        let budget = budget::compound_forward(&truth, &content, ctx);
        ctx.double_premise_task_revisable(content, Some(truth), budget, false);
    }
    if let Some(content) = make::make_implication(state2.clone(), state1.clone()) {
        let truth = truth::induction(&truth_b, &truth_t);
        let budget = budget::compound_forward(&truth, &content, ctx);
        ctx.double_premise_task_revisable(content, Some(truth), budget, false);
    }
    if let Some(content) = make::make_equivalence(state1.clone(), state2.clone()) {
        let truth = truth::comparison(&truth_t, &truth_b);
        let budget = budget::compound_forward(&truth, &content, ctx);
        ctx.double_premise_task_revisable(content, Some(truth), budget, false);
    }
    let var_dep = Term::variable(VariableKind::Dependent, base + 3);
    let (state1, state2) = if index == 0 {
        (
            make::make_inheritance(var_dep.clone(), task_content.components[1].clone()),
            make::make_inheritance(var_dep, belief_content.components[1].clone()),
        )
    } else {
        (
            make::make_inheritance(task_content.components[0].clone(), var_dep.clone()),
            make::make_inheritance(belief_content.components[0].clone(), var_dep),
        )
    };
    let (Some(state1), Some(state2)) = (state1, state2) else {
        return;
    };
    if let Some(content) = make::make_conjunction(vec![state1, state2]) {
        let truth = truth::intersection(&truth_t, &truth_b);
        let budget = budget::compound_forward(&truth, &content, ctx);
        ctx.double_premise_task_revisable(content, Some(truth), budget, false);
    }
}

/// Abstract the term shared by a statement inside a compound and a
/// matching belief statement, binding it inside the compound.
pub fn intro_var_inner(
    premise1: &CompoundTerm,
    premise2: &CompoundTerm,
    old_compound: &Term,
    ctx: &mut DerivationContext,
) {
    if !ctx.current_task().sentence.is_judgement()
        || premise1.op != premise2.op
        || old_compound.contains_component(&Term::Compound(premise1.clone()))
    {
        return;
    }
    let subject1 = &premise1.components[0];
    let subject2 = &premise2.components[0];
    let predicate1 = &premise1.components[1];
    let predicate2 = &premise2.components[1];
    let (common1, common2) = if subject1 == subject2 {
        (
            subject1.clone(),
            second_common_term(predicate1, predicate2, TermOperator::ImageExt),
        )
    } else if predicate1 == predicate2 {
        (
            predicate1.clone(),
            second_common_term(subject1, subject2, TermOperator::ImageInt),
        )
    } else {
        return;
    };
    let truth_t = ctx.current_task().sentence.truth().clone();
    let truth_b = ctx.require_belief().truth().clone();
    let premise1_term = Term::Compound(premise1.clone());
    let base = variable::max_var_id(&premise1_term).max(variable::max_var_id(old_compound));

    let mut subs = variable::Substitution::new();
    subs.insert(
        common1.clone(),
        Term::variable(VariableKind::Dependent, base + 1),
    );
    if let Some(conj) = make::make_conjunction(vec![premise1_term.clone(), old_compound.clone()]) {
        if let Some(content) = variable::apply_substitute(&conj, &subs) {
            let truth = truth::intersection(&truth_t, &truth_b);
            let budget = budget::forward(&truth, ctx);
            ctx.double_premise_task_revisable(content, Some(truth), budget, false);
        }
    }

    let mut subs = variable::Substitution::new();
    subs.insert(
        common1,
        Term::variable(VariableKind::Independent, base + 1),
    );
    if let Some(common2) = common2 {
        subs.insert(
            common2,
            Term::variable(VariableKind::Independent, base + 2),
        );
    }
    if let Some(implication) =
        make::make_implication(premise1_term, old_compound.clone())
    {
        if let Some(content) = variable::apply_substitute(&implication, &subs) {
            let truth = truth::induction(&truth_t, &truth_b);
            let budget = budget::forward(&truth, ctx);
            ctx.double_premise_task_revisable(content, Some(truth), budget, false);
        }
    }
}

/// The component two images share besides the relation, when both terms
/// are images of the given kind.
fn second_common_term(term1: &Term, term2: &Term, op: TermOperator) -> Option<Term> {
    let c1 = term1.as_compound().filter(|c| c.op == op)?;
    let c2 = term2.as_compound().filter(|c| c.op == op)?;
    let candidate = the_other_component(c1)
        .filter(|t| term2.contains_term_recursively(t));
    candidate.or_else(|| the_other_component(c2).filter(|t| term1.contains_term_recursively(t)))
}

/// For a two-place image, the single component that is not the relation.
fn the_other_component(image: &CompoundTerm) -> Option<Term> {
    if image.components.len() != 2 {
        return None;
    }
    Some(image.components[1 - image.relation_index].clone())
}

fn contains_all_components(compound: &CompoundTerm, other: &Term) -> bool {
    match other.as_compound() {
        Some(o) if o.op == compound.op => o
            .components
            .iter()
            .all(|c| compound.components.contains(c)),
        _ => compound.components.contains(other),
    }
}

fn premise_truths(compound_task: bool, ctx: &DerivationContext) -> (TruthValue, TruthValue) {
    let task_truth = ctx.current_task().sentence.truth().clone();
    let belief_truth = ctx.require_belief().truth().clone();
    if compound_task {
        (task_truth, belief_truth)
    } else {
        (belief_truth, task_truth)
    }
}
