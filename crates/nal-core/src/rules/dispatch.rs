//! Entry point of the engine: route a task-link/term-link pair to the
//! applicable rules, keyed entirely off the two link type tags and the
//! syllogistic figure formed by their index paths.

use tracing::trace;

use crate::context::DerivationContext;
use crate::link::TermLinkType;
use crate::rules::{compositional, local, structural, syllogistic};
use crate::sentence::Sentence;
use crate::term::{CompoundTerm, Term, TermOperator, VariableKind};
use crate::variable;

/// One reasoning step over the current premise pair.
///
/// The context must carry both links; a belief is optional (backward
/// inference runs without one). Direct matching runs first and, when it
/// produces a result, preempts the structured rules.
pub fn reason(ctx: &mut DerivationContext) {
    let (t_type, t_indices) = match &ctx.task_link {
        Some(l) => (l.link_type, l.indices.clone()),
        None => panic!("reasoning step without a task link"),
    };
    let (b_type, b_indices, belief_term) = match &ctx.belief_link {
        Some(l) => (l.link_type, l.indices.clone(), l.target.clone()),
        None => panic!("reasoning step without a term link"),
    };
    trace!(task = ?t_type, belief = ?b_type, "dispatch");

    if t_type.is_transform() {
        structural::transform_product_image(&t_indices, ctx);
        return;
    }

    let task_term = ctx.current_task().sentence.content.clone();
    let belief = ctx.current_belief.clone();
    if belief.is_some() {
        local::match_task_and_belief(ctx);
        if !ctx.no_result() {
            return;
        }
    }

    let t_index = t_indices.first().copied();
    let b_index = b_indices.first().copied();
    match t_type {
        TermLinkType::SelfLink => match b_type {
            TermLinkType::Component => {
                if let Some(task_compound) = task_term.as_compound() {
                    compound_and_self(&task_compound.clone(), &belief_term, true, ctx);
                }
            }
            TermLinkType::Compound => {
                if let Some(belief_compound) = belief_term.as_compound() {
                    compound_and_self(&belief_compound.clone(), &task_term, false, ctx);
                }
            }
            TermLinkType::ComponentStatement => {
                if let (Some(belief), Some(index)) = (&belief, b_index) {
                    let task_sentence = ctx.current_task().sentence.clone();
                    syllogistic::detachment(&task_sentence, &belief.clone(), index, ctx);
                }
            }
            TermLinkType::CompoundStatement => {
                if let (Some(belief), Some(index)) = (&belief, b_index) {
                    let task_sentence = ctx.current_task().sentence.clone();
                    syllogistic::detachment(belief, &task_sentence, index, ctx);
                }
            }
            TermLinkType::ComponentCondition => {
                if belief.is_some() {
                    if let Some(index) = b_indices.get(1).copied() {
                        syllogistic::conditional_ded_ind(
                            &task_term,
                            index,
                            &belief_term,
                            None,
                            ctx,
                        );
                    }
                }
            }
            TermLinkType::CompoundCondition => {
                if belief.is_some() {
                    if let Some(index) = b_indices.get(1).copied() {
                        syllogistic::conditional_ded_ind(
                            &belief_term,
                            index,
                            &task_term,
                            None,
                            ctx,
                        );
                    }
                }
            }
            _ => {}
        },
        TermLinkType::Compound => match b_type {
            TermLinkType::Compound => {
                if let (Some(tc), Some(bc)) = (task_term.as_compound(), belief_term.as_compound())
                {
                    compound_and_compound(&tc.clone(), &bc.clone(), ctx);
                }
            }
            TermLinkType::CompoundStatement => {
                if let (Some(tc), Some(bc), Some(ti), Some(bi)) = (
                    task_term.as_compound(),
                    belief_term.as_statement(),
                    t_index,
                    b_index,
                ) {
                    compound_and_statement(&tc.clone(), ti, &bc.clone(), bi, &belief_term, ctx);
                }
            }
            TermLinkType::CompoundCondition => {
                if belief.is_some() {
                    match belief_term.op() {
                        Some(TermOperator::Implication) => {
                            if let Some(bi) = b_index {
                                syllogistic::conditional_ded_ind(
                                    &belief_term,
                                    bi,
                                    &task_term,
                                    None,
                                    ctx,
                                );
                            }
                        }
                        Some(TermOperator::Equivalence) => {
                            if let Some(bi) = b_index {
                                syllogistic::conditional_ana(
                                    &belief_term,
                                    bi,
                                    &task_term,
                                    None,
                                    ctx,
                                );
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        },
        TermLinkType::CompoundStatement => match b_type {
            TermLinkType::Component => {
                let concept_term = ctx.current_term.clone();
                if let (Some(cc), Some(ts), Some(bi), Some(ti)) = (
                    concept_term.as_compound(),
                    task_term.as_statement(),
                    b_index,
                    t_index,
                ) {
                    component_and_statement(&cc.clone(), bi, &ts.clone(), ti, ctx);
                }
            }
            TermLinkType::Compound => {
                if let (Some(bc), Some(ts), Some(bi), Some(ti)) = (
                    belief_term.as_compound(),
                    task_term.as_statement(),
                    b_index,
                    t_index,
                ) {
                    compound_and_statement(&bc.clone(), bi, &ts.clone(), ti, &belief_term, ctx);
                }
            }
            TermLinkType::CompoundStatement => {
                if let (Some(belief), Some(ti), Some(bi)) = (&belief, t_index, b_index) {
                    syllogisms(ti, bi, &task_term, &belief_term, &belief.clone(), ctx);
                }
            }
            TermLinkType::CompoundCondition => {
                if belief.is_some()
                    && belief_term.op() == Some(TermOperator::Implication)
                {
                    if let (Some(bi), Some(ti)) = (b_indices.get(1).copied(), t_index) {
                        conditional_ded_ind_with_var(&belief_term, bi, &task_term, Some(ti), ctx);
                    }
                }
            }
            _ => {}
        },
        TermLinkType::CompoundCondition => match b_type {
            TermLinkType::Compound => {
                if let (Some(belief), Some(ti)) = (&belief, t_index) {
                    let task_sentence = ctx.current_task().sentence.clone();
                    detachment_with_var(&task_sentence, &belief.clone(), ti, ctx);
                }
            }
            TermLinkType::CompoundStatement => {
                if belief.is_some() && task_term.op() == Some(TermOperator::Implication) {
                    if let (Some(ti), Some(bi)) = (t_indices.get(1).copied(), b_index) {
                        conditional_ded_ind_with_var(&task_term, ti, &belief_term, Some(bi), ctx);
                    }
                }
            }
            _ => {}
        },
        _ => {}
    }
}

/// The task or the belief term is a component of the other: structural
/// and decompositional rules with no shared-term syllogism.
fn compound_and_self(
    compound: &CompoundTerm,
    component: &Term,
    compound_task: bool,
    ctx: &mut DerivationContext,
) {
    match compound.op {
        TermOperator::Conjunction | TermOperator::Disjunction => {
            if ctx.current_belief.is_some() {
                compositional::decompose_statement(compound, component, compound_task, ctx);
            } else if compound.components.contains(component) {
                structural::structural_compound(compound, component, compound_task, ctx);
            }
        }
        TermOperator::Negation => {
            if compound_task {
                structural::transform_negation(compound.components[0].clone(), ctx);
            } else if let Some(negated) = crate::make::make_negation(component.clone()) {
                structural::transform_negation(negated, ctx);
            }
        }
        _ => {}
    }
}

/// Two compounds of the same operator met; treat the larger as the
/// whole and the smaller as the part.
fn compound_and_compound(
    task_compound: &CompoundTerm,
    belief_compound: &CompoundTerm,
    ctx: &mut DerivationContext,
) {
    if task_compound.op != belief_compound.op {
        return;
    }
    if task_compound.size() > belief_compound.size() {
        compound_and_self(
            task_compound,
            &Term::Compound(belief_compound.clone()),
            true,
            ctx,
        );
    } else if task_compound.size() < belief_compound.size() {
        compound_and_self(
            belief_compound,
            &Term::Compound(task_compound.clone()),
            false,
            ctx,
        );
    }
}

/// A compound met a statement that may occur inside it.
fn compound_and_statement(
    compound: &CompoundTerm,
    index: usize,
    statement: &CompoundTerm,
    side: usize,
    belief_term: &Term,
    ctx: &mut DerivationContext,
) {
    let Some(component) = compound.components.get(index).cloned() else {
        return;
    };
    let statement_term = Term::Compound(statement.clone());
    if component.op() == Some(statement.op) {
        if compound.op == TermOperator::Conjunction && ctx.current_belief.is_some() {
            let compound_term = Term::Compound(compound.clone());
            let unified = variable::unify(
                VariableKind::Dependent,
                &component,
                &statement_term,
                &compound_term,
                &statement_term,
                &mut ctx.rng,
            );
            if let Some((rewritten_compound, rewritten_component)) = unified {
                // the rebuild re-sorts commutative components, so the unified
                // conjunct must be identified by value, not by its old index
                if let Some(rc) = rewritten_compound.as_compound() {
                    let rc = rc.clone();
                    compositional::elimi_var_dep(
                        &rc,
                        &rewritten_component,
                        statement_term == *belief_term,
                        ctx,
                    );
                }
            } else if ctx.current_task().sentence.is_judgement() {
                if let Some(inner) = component.as_statement() {
                    compositional::intro_var_inner(
                        statement,
                        &inner.clone(),
                        &Term::Compound(compound.clone()),
                        ctx,
                    );
                }
            }
        }
    } else if !structural_task(ctx) {
        match statement.op {
            TermOperator::Inheritance => {
                structural::structural_compose1(compound, index, statement, ctx);
                if !matches!(
                    compound.op,
                    TermOperator::SetExt | TermOperator::SetInt | TermOperator::Negation
                ) {
                    structural::structural_compose2(compound, index, statement, side, ctx);
                }
            }
            TermOperator::Similarity if compound.op != TermOperator::Conjunction => {
                structural::structural_compose2(compound, index, statement, side, ctx);
            }
            _ => {}
        }
    }
}

/// The concept's own compound met the statement task that contains it.
fn component_and_statement(
    compound: &CompoundTerm,
    index: usize,
    statement: &CompoundTerm,
    side: usize,
    ctx: &mut DerivationContext,
) {
    if structural_task(ctx) {
        return;
    }
    match statement.op {
        TermOperator::Inheritance => {
            structural::structural_decompose1(compound, index, statement, ctx);
            if matches!(compound.op, TermOperator::SetExt | TermOperator::SetInt) {
                structural::transform_set_relation(compound, statement, side, ctx);
            } else {
                structural::structural_decompose2(statement, index, ctx);
            }
        }
        TermOperator::Similarity => {
            structural::structural_decompose2(statement, index, ctx);
            if matches!(compound.op, TermOperator::SetExt | TermOperator::SetInt) {
                structural::transform_set_relation(compound, statement, side, ctx);
            }
        }
        TermOperator::Implication if compound.op == TermOperator::Negation => {
            if index == 0 {
                structural::contraposition(statement, ctx);
            }
        }
        _ => {}
    }
}

/// A conclusion whose truth is analytic came from a structural rule;
/// running further structural rules on it would compound the discount.
fn structural_task(ctx: &DerivationContext) -> bool {
    ctx.current_task()
        .sentence
        .truth
        .as_ref()
        .map(|t| t.analytic)
        .unwrap_or(false)
}

/// Both premises are statements sharing a term: pick the figure and the
/// symmetric/asymmetric pairing.
fn syllogisms(
    t_index: usize,
    b_index: usize,
    task_term: &Term,
    belief_term: &Term,
    belief: &Sentence,
    ctx: &mut DerivationContext,
) {
    let (Some(task_op), Some(belief_op)) = (task_term.op(), belief_term.op()) else {
        return;
    };
    let task_sentence = ctx.current_task().sentence.clone();
    match (task_op.is_asymmetric_statement(), belief_op.is_asymmetric_statement()) {
        (true, true) => {
            if task_op.is_higher_order() == belief_op.is_higher_order() {
                let figure = figure_of(t_index, b_index);
                asymmetric_asymmetric(&task_sentence, belief, figure, ctx);
            } else if belief_op == TermOperator::Inheritance {
                // a first-order statement detaches from a conditional
                detachment_with_var(&task_sentence, belief, t_index, ctx);
            } else {
                detachment_with_var(belief, &task_sentence, b_index, ctx);
            }
        }
        (true, false) => {
            if task_op.is_higher_order() == belief_op.is_higher_order() {
                let figure = figure_of(t_index, b_index);
                asymmetric_symmetric(&task_sentence, belief, figure, ctx);
            }
        }
        (false, true) => {
            if task_op.is_higher_order() == belief_op.is_higher_order() {
                let figure = figure_of(b_index, t_index);
                asymmetric_symmetric(belief, &task_sentence, figure, ctx);
            } else if task_op == TermOperator::Inheritance {
                detachment_with_var(belief, &task_sentence, b_index, ctx);
            }
        }
        (false, false) => {
            if task_op.is_higher_order() == belief_op.is_higher_order() {
                let figure = figure_of(b_index, t_index);
                symmetric_symmetric(belief, &task_sentence, figure, ctx);
            }
        }
    }
}

/// Encode which sides of the two statements hold the shared term.
fn figure_of(index1: usize, index2: usize) -> u8 {
    ((index1 + 1) * 10 + index2 + 1) as u8
}

/// Both statements asymmetric: unify the shared term and run the weak
/// or strong triple for the figure.
fn asymmetric_asymmetric(
    sentence: &Sentence,
    belief: &Sentence,
    figure: u8,
    ctx: &mut DerivationContext,
) {
    let (Some(s1), Some(s2)) = (sentence.content.as_statement(), belief.content.as_statement())
    else {
        return;
    };
    let (s1, s2) = (s1.clone(), s2.clone());
    let t1 = Term::Compound(s1.clone());
    let t2 = Term::Compound(s2.clone());
    let pick = |s: &CompoundTerm, side: usize| s.components[side].clone();
    let (u1, u2) = match figure {
        11 => (pick(&s1, 0), pick(&s2, 0)),
        12 => (pick(&s1, 0), pick(&s2, 1)),
        21 => (pick(&s1, 1), pick(&s2, 0)),
        _ => (pick(&s1, 1), pick(&s2, 1)),
    };
    let Some((r1, r2)) = variable::unify(
        VariableKind::Independent,
        &u1,
        &u2,
        &t1,
        &t2,
        &mut ctx.rng,
    ) else {
        return;
    };
    if r1 == r2 {
        return;
    }
    let (Some(s1), Some(s2)) = (r1.as_statement(), r2.as_statement()) else {
        return;
    };
    let (s1, s2) = (s1.clone(), s2.clone());
    match figure {
        11 => {
            let term1 = s2.components[1].clone();
            let term2 = s1.components[1].clone();
            compositional::compose_compound(&s1, &s2, 0, ctx);
            syllogistic::abd_ind_com(&term1, &term2, &s1, ctx);
        }
        12 => {
            let term1 = s2.components[0].clone();
            let term2 = s1.components[1].clone();
            if variable::has_substitute(VariableKind::Query, &term1, &term2, &mut ctx.rng) {
                local::match_reverse(ctx);
            } else {
                syllogistic::ded_exe(&term1, &term2, &s1, ctx);
            }
        }
        21 => {
            let term1 = s1.components[0].clone();
            let term2 = s2.components[1].clone();
            if variable::has_substitute(VariableKind::Query, &term1, &term2, &mut ctx.rng) {
                local::match_reverse(ctx);
            } else {
                syllogistic::ded_exe(&term1, &term2, &s1, ctx);
            }
        }
        _ => {
            let term1 = s1.components[0].clone();
            let term2 = s2.components[0].clone();
            if !syllogistic::conditional_abd(&term1, &term2, &s1, &s2, ctx) {
                compositional::compose_compound(&s1, &s2, 1, ctx);
                syllogistic::abd_ind_com(&term1, &term2, &s1, ctx);
            }
        }
    }
}

/// One asymmetric and one symmetric statement: analogy, or a direct
/// match when query variables line up.
fn asymmetric_symmetric(
    asym: &Sentence,
    sym: &Sentence,
    figure: u8,
    ctx: &mut DerivationContext,
) {
    let (Some(s1), Some(s2)) = (asym.content.as_statement(), sym.content.as_statement()) else {
        return;
    };
    let (s1, s2) = (s1.clone(), s2.clone());
    let t1 = Term::Compound(s1.clone());
    let t2 = Term::Compound(s2.clone());
    let (u1, u2, side1, side2) = match figure {
        11 => (s1.components[0].clone(), s2.components[0].clone(), 1, 1),
        12 => (s1.components[0].clone(), s2.components[1].clone(), 1, 0),
        21 => (s1.components[1].clone(), s2.components[0].clone(), 0, 1),
        _ => (s1.components[1].clone(), s2.components[1].clone(), 0, 0),
    };
    let Some((r1, r2)) = variable::unify(
        VariableKind::Independent,
        &u1,
        &u2,
        &t1,
        &t2,
        &mut ctx.rng,
    ) else {
        return;
    };
    let (Some(rs1), Some(rs2)) = (r1.as_statement(), r2.as_statement()) else {
        return;
    };
    let term_asym = rs1.components[side1].clone();
    let term_sym = rs2.components[side2].clone();
    if variable::has_substitute(VariableKind::Query, &term_asym, &term_sym, &mut ctx.rng) {
        local::match_asym_sym(asym, sym, ctx);
    } else {
        // keep the asymmetric direction: its remaining term becomes the
        // subject for first-position figures
        let (subject, predicate) = match figure {
            11 | 12 => (term_sym, term_asym),
            _ => (term_asym, term_sym),
        };
        syllogistic::analogy(&subject, &predicate, asym, sym, ctx);
    }
}

/// Both statements symmetric: resemblance chains the two.
fn symmetric_symmetric(
    belief: &Sentence,
    task_sentence: &Sentence,
    figure: u8,
    ctx: &mut DerivationContext,
) {
    let (Some(s1), Some(s2)) = (
        belief.content.as_statement(),
        task_sentence.content.as_statement(),
    ) else {
        return;
    };
    let (s1, s2) = (s1.clone(), s2.clone());
    let t1 = Term::Compound(s1.clone());
    let t2 = Term::Compound(s2.clone());
    let (u1, u2, o1, o2) = match figure {
        11 => (0, 0, 1, 1),
        12 => (0, 1, 1, 0),
        21 => (1, 0, 0, 1),
        _ => (1, 1, 0, 0),
    };
    let Some((r1, r2)) = variable::unify(
        VariableKind::Independent,
        &s1.components[u1],
        &s2.components[u2],
        &t1,
        &t2,
        &mut ctx.rng,
    ) else {
        return;
    };
    let (Some(rs1), Some(rs2)) = (r1.as_statement(), r2.as_statement()) else {
        return;
    };
    let term1 = rs1.components[o1].clone();
    let term2 = rs2.components[o2].clone();
    let belief = belief.clone();
    syllogistic::resemblance(&term1, &term2, &belief, ctx);
}

/// Detachment that first unifies an independent variable in the
/// detached component, falling back to inner variable introduction.
fn detachment_with_var(
    main: &Sentence,
    sub: &Sentence,
    index: usize,
    ctx: &mut DerivationContext,
) {
    let Some(statement) = main.content.as_statement() else {
        return;
    };
    let statement = statement.clone();
    let component = statement.components[index].clone();
    let content = sub.content.clone();
    if component.op() != Some(TermOperator::Inheritance) || ctx.current_belief.is_none() {
        return;
    }
    if component.is_constant() {
        syllogistic::detachment(main, sub, index, ctx);
    } else if let Some((rewritten_main, _)) = variable::unify(
        VariableKind::Independent,
        &component,
        &content,
        &main.content,
        &content,
        &mut ctx.rng,
    ) {
        let mut main = main.clone();
        main.content = rewritten_main;
        syllogistic::detachment(&main, sub, index, ctx);
    } else if statement.op == TermOperator::Implication
        && statement.components[1].is_statement()
        && ctx.current_task().sentence.is_judgement()
    {
        let Some(s2) = statement.components[1].as_statement() else {
            return;
        };
        let s2 = s2.clone();
        if let Some(content_statement) = content.as_statement() {
            if s2.components[0] == content_statement.components[0] {
                compositional::intro_var_inner(
                    &content_statement.clone(),
                    &s2,
                    &Term::Compound(statement),
                    ctx,
                );
            }
        }
    }
}

/// Conditional deduction/induction after aligning the chosen condition
/// with the statement through variable unification.
fn conditional_ded_ind_with_var(
    conditional: &Term,
    index: usize,
    statement: &Term,
    side: Option<usize>,
    ctx: &mut DerivationContext,
) {
    let Some(cond_statement) = conditional.as_statement() else {
        return;
    };
    let Some(condition) = cond_statement.components[0].as_compound() else {
        return;
    };
    let Some(component) = condition.components.get(index).cloned() else {
        return;
    };
    let (component2, side) = match statement.op() {
        Some(TermOperator::Inheritance) => (Some(statement.clone()), None),
        Some(TermOperator::Implication) => {
            let s = statement.as_statement().map(|s| {
                s.components[side.unwrap_or(0)].clone()
            });
            (s, side)
        }
        _ => (None, side),
    };
    let Some(component2) = component2 else { return };
    let unifiable = variable::has_substitute(
        VariableKind::Independent,
        &component,
        &component2,
        &mut ctx.rng,
    ) || variable::has_substitute(
        VariableKind::Dependent,
        &component,
        &component2,
        &mut ctx.rng,
    );
    if unifiable {
        syllogistic::conditional_ded_ind(conditional, index, statement, side, ctx);
    }
}
