//! Single-premise rules that follow the structure of one term: moving a
//! statement in and out of compounds, set/relation conversions, the
//! product/image transformations, negation and contraposition. Their
//! conclusions are analytic, discounted against a fixed reliance.

use crate::budget;
use crate::constants::RELIANCE;
use crate::context::DerivationContext;
use crate::make;
use crate::sentence::Punctuation;
use crate::term::{CompoundTerm, Term, TermOperator};
use crate::truth::{self, TruthValue};

/// Whether moving through `compound` at `index` flips statement order
/// (the subtracted side of a difference, the non-relation slots of an
/// image).
fn switch_order(compound: &CompoundTerm, index: usize) -> bool {
    (matches!(
        compound.op,
        TermOperator::DifferenceExt | TermOperator::DifferenceInt
    ) && index == 1)
        || (compound.op.is_image() && index != compound.relation_index)
}

/// {<S → P>} ⊢ <(S op T) → (P op T)>: embed both sides of a statement
/// into the same compound position.
pub fn structural_compose2(
    compound: &CompoundTerm,
    index: usize,
    statement: &CompoundTerm,
    side: usize,
    ctx: &mut DerivationContext,
) {
    let compound_term = Term::Compound(compound.clone());
    if compound_term == statement.components[side] {
        return;
    }
    let mut sub = statement.components[0].clone();
    let mut pred = statement.components[1].clone();
    let mut components = compound.components.clone();
    if (side == 0 && components.contains(&pred)) || (side == 1 && components.contains(&sub)) {
        return;
    }
    if side == 0 && components.contains(&sub) {
        sub = compound_term;
        components[index] = pred.clone();
        pred = match make::make_compound(compound.op, components, compound.relation_index) {
            Some(t) => t,
            None => return,
        };
    } else if side == 1 && components.contains(&pred) {
        components[index] = sub.clone();
        sub = match make::make_compound(compound.op, components, compound.relation_index) {
            Some(t) => t,
            None => return,
        };
        pred = compound_term;
    } else {
        return;
    }
    let content = if switch_order(compound, index) {
        make::make_statement_from(statement, pred, sub)
    } else {
        make::make_statement_from(statement, sub, pred)
    };
    let Some(content) = content else { return };
    if ctx.current_task().sentence.is_question() {
        let budget = budget::compound_backward_weak(&content, ctx);
        ctx.single_premise_task_current(content, None, budget);
    } else {
        let mut truth = ctx.current_task().sentence.truth().clone();
        if compound.size() > 1 {
            truth = truth::deduction_reliance(&truth, RELIANCE);
        }
        let budget = budget::compound_forward(&truth, &content, ctx);
        ctx.single_premise_task_current(content, Some(truth), budget);
    }
}

/// {<(S op T) → (P op T)>} ⊢ <S → P>: pull a statement back out of two
/// parallel compounds.
pub fn structural_decompose2(statement: &CompoundTerm, index: usize, ctx: &mut DerivationContext) {
    let subj = &statement.components[0];
    let pred = &statement.components[1];
    let (Some(sub), Some(pre)) = (subj.as_compound(), pred.as_compound()) else {
        return;
    };
    if sub.op != pre.op || sub.size() != pre.size() || index >= sub.size() {
        return;
    }
    let t1 = sub.components[index].clone();
    let t2 = pre.components[index].clone();
    let content = if switch_order(sub, index) {
        make::make_statement_from(statement, t2, t1)
    } else {
        make::make_statement_from(statement, t1, t2)
    };
    let Some(content) = content else { return };
    if ctx.current_task().sentence.is_question() {
        let budget = budget::compound_backward(&content, ctx);
        ctx.single_premise_task_current(content, None, budget);
    } else {
        if sub.op != TermOperator::Product && sub.size() > 1 {
            return;
        }
        let truth = ctx.current_task().sentence.truth().clone();
        let budget = budget::compound_forward(&truth, &content, ctx);
        ctx.single_premise_task_current(content, Some(truth), budget);
    }
}

/// One-sided composition: {<S → M>} ⊢ <(S & T) → M> and the dual cases
/// where the compound entails (or refutes) the bare statement.
pub fn structural_compose1(
    compound: &CompoundTerm,
    index: usize,
    statement: &CompoundTerm,
    ctx: &mut DerivationContext,
) {
    if !ctx.current_task().sentence.is_judgement() {
        return;
    }
    let component = &compound.components[index];
    let truth = ctx.current_task().sentence.truth().clone();
    let truth_ded = truth::deduction_reliance(&truth, RELIANCE);
    let truth_nded = truth::negation(&truth_ded);
    let compound_term = Term::Compound(compound.clone());
    let subj = statement.components[0].clone();
    let pred = statement.components[1].clone();
    if *component == subj {
        match compound.op {
            TermOperator::IntersectionExt => {
                structural_statement(compound_term, pred, truth_ded, ctx);
            }
            TermOperator::DifferenceExt if index == 0 => {
                structural_statement(compound_term, pred, truth_ded, ctx);
            }
            TermOperator::DifferenceInt => {
                if index == 0 {
                    structural_statement(compound_term, pred, truth_ded, ctx);
                } else {
                    structural_statement(compound_term, pred, truth_nded, ctx);
                }
            }
            _ => {}
        }
    } else if *component == pred {
        match compound.op {
            TermOperator::IntersectionInt => {
                structural_statement(subj, compound_term, truth_ded, ctx);
            }
            TermOperator::DifferenceInt if index == 1 => {
                structural_statement(subj, compound_term, truth_ded, ctx);
            }
            TermOperator::DifferenceExt => {
                if index == 0 {
                    structural_statement(subj, compound_term, truth_ded, ctx);
                } else {
                    structural_statement(subj, compound_term, truth_nded, ctx);
                }
            }
            _ => {}
        }
    }
}

/// One-sided decomposition, the dual of
/// [`structural_compose1`](structural_compose1).
pub fn structural_decompose1(
    compound: &CompoundTerm,
    index: usize,
    statement: &CompoundTerm,
    ctx: &mut DerivationContext,
) {
    if !ctx.current_task().sentence.is_judgement() {
        return;
    }
    let component = compound.components[index].clone();
    let truth = ctx.current_task().sentence.truth().clone();
    let truth_ded = truth::deduction_reliance(&truth, RELIANCE);
    let truth_nded = truth::negation(&truth_ded);
    let compound_term = Term::Compound(compound.clone());
    let subj = statement.components[0].clone();
    let pred = statement.components[1].clone();
    if compound_term == subj {
        match compound.op {
            TermOperator::IntersectionInt => {
                structural_statement(component, pred, truth_ded, ctx);
            }
            TermOperator::SetExt if compound.size() > 1 => {
                if let Some(singleton) = make::make_set_ext(vec![component]) {
                    structural_statement(singleton, pred, truth_ded, ctx);
                }
            }
            TermOperator::DifferenceInt => {
                if index == 0 {
                    structural_statement(component, pred, truth_ded, ctx);
                } else {
                    structural_statement(component, pred, truth_nded, ctx);
                }
            }
            _ => {}
        }
    } else if compound_term == pred {
        match compound.op {
            TermOperator::IntersectionExt => {
                structural_statement(subj, component, truth_ded, ctx);
            }
            TermOperator::SetInt if compound.size() > 1 => {
                if let Some(singleton) = make::make_set_int(vec![component]) {
                    structural_statement(subj, singleton, truth_ded, ctx);
                }
            }
            TermOperator::DifferenceExt => {
                if index == 0 {
                    structural_statement(subj, component, truth_ded, ctx);
                } else {
                    structural_statement(subj, component, truth_nded, ctx);
                }
            }
            _ => {}
        }
    }
}

fn structural_statement(
    subject: Term,
    predicate: Term,
    truth: TruthValue,
    ctx: &mut DerivationContext,
) {
    let task_content = ctx.current_task().sentence.content.clone();
    let Some(content) = make::make_inheritance(subject, predicate) else {
        return;
    };
    if content == task_content {
        return;
    }
    let budget = budget::compound_forward(&truth, &content, ctx);
    ctx.single_premise_task(content, Punctuation::Judgement, Some(truth), budget);
}

/// Between a singleton set and its member: <{T} → P> ⇄ <{T} ↔ P> and
/// the intensional dual.
pub fn transform_set_relation(
    compound: &CompoundTerm,
    statement: &CompoundTerm,
    side: usize,
    ctx: &mut DerivationContext,
) {
    if compound.size() > 1 {
        return;
    }
    let ext_subject = compound.op == TermOperator::SetExt && side == 0;
    let int_predicate = compound.op == TermOperator::SetInt && side == 1;
    if statement.op == TermOperator::Inheritance && (ext_subject || int_predicate) {
        return;
    }
    let sub = statement.components[0].clone();
    let pre = statement.components[1].clone();
    let content = if statement.op == TermOperator::Inheritance {
        make::make_similarity(sub, pre)
    } else if ext_subject || int_predicate {
        make::make_inheritance(pre, sub)
    } else {
        make::make_inheritance(sub, pre)
    };
    let Some(content) = content else { return };
    if ctx.current_task().sentence.is_question() {
        let budget = budget::compound_backward(&content, ctx);
        ctx.single_premise_task_current(content, None, budget);
    } else {
        let truth = ctx.current_task().sentence.truth().clone();
        let budget = budget::compound_forward(&truth, &content, ctx);
        ctx.single_premise_task_current(content, Some(truth), budget);
    }
}

/// Entry point for a transform link: locate the inheritance inside the
/// task content along the link's index path and rewrite it between its
/// product and image forms.
pub fn transform_product_image(indices: &[usize], ctx: &mut DerivationContext) {
    let content = ctx.current_task().sentence.content.clone();
    let Some(compound) = content.as_compound() else {
        return;
    };
    let inheritance = if indices.len() == 2 || content.op() == Some(TermOperator::Inheritance) {
        content.clone()
    } else if indices.len() == 3 {
        match compound.components.get(indices[0]) {
            Some(t) => t.clone(),
            None => return,
        }
    } else if indices.len() == 4 {
        let condition = match compound.components.get(indices[0]) {
            Some(t) => t,
            None => return,
        };
        let conditional_root = (compound.op == TermOperator::Implication && indices[0] == 0)
            || compound.op == TermOperator::Equivalence;
        match condition.as_compound() {
            Some(c) if c.op == TermOperator::Conjunction && conditional_root => {
                match c.components.get(indices[1]) {
                    Some(t) => t.clone(),
                    None => return,
                }
            }
            _ => return,
        }
    } else {
        return;
    };
    let Some(statement) = inheritance.as_compound() else {
        return;
    };
    if statement.op != TermOperator::Inheritance {
        return;
    }
    transform_inheritance(&statement.clone(), &content, indices, ctx);
}

fn transform_inheritance(
    inheritance: &CompoundTerm,
    old_content: &Term,
    indices: &[usize],
    ctx: &mut DerivationContext,
) {
    let inheritance_term = Term::Compound(inheritance.clone());
    if inheritance_term == *old_content {
        if inheritance.components[0].is_compound() {
            transform_subject_pi(inheritance, ctx);
        }
        if inheritance.components[1].is_compound() {
            transform_predicate_pi(inheritance, ctx);
        }
        return;
    }
    let index = indices[indices.len() - 1];
    let side = indices[indices.len() - 2];
    let Some(comp) = inheritance.components[side].as_compound().cloned() else {
        return;
    };
    let (subject, predicate) = if comp.op == TermOperator::Product {
        if side == 0 {
            let Some(pred) = make::make_image_from_product(
                TermOperator::ImageExt,
                &comp,
                &inheritance.components[1],
                index,
            ) else {
                return;
            };
            (comp.components[index].clone(), pred)
        } else {
            let Some(subj) = make::make_image_from_product(
                TermOperator::ImageInt,
                &comp,
                &inheritance.components[0],
                index,
            ) else {
                return;
            };
            (subj, comp.components[index].clone())
        }
    } else if comp.op == TermOperator::ImageExt && side == 1 {
        if index == comp.relation_index {
            let Some(subj) = make::make_product_from_image(&comp, &inheritance.components[0])
            else {
                return;
            };
            (subj, comp.components[index].clone())
        } else {
            let Some(pred) = make::make_image_from_image(
                TermOperator::ImageExt,
                &comp,
                &inheritance.components[0],
                index,
            ) else {
                return;
            };
            (comp.components[index].clone(), pred)
        }
    } else if comp.op == TermOperator::ImageInt && side == 0 {
        if index == comp.relation_index {
            let Some(pred) = make::make_product_from_image(&comp, &inheritance.components[1])
            else {
                return;
            };
            (comp.components[index].clone(), pred)
        } else {
            let Some(subj) = make::make_image_from_image(
                TermOperator::ImageInt,
                &comp,
                &inheritance.components[1],
                index,
            ) else {
                return;
            };
            (subj, comp.components[index].clone())
        }
    } else {
        return;
    };
    let Some(new_inheritance) = make::make_inheritance(subject, predicate) else {
        return;
    };
    let content = rebuild_around(old_content, new_inheritance, indices);
    let Some(content) = content else { return };
    emit_structural(content, ctx);
}

/// Splice a rewritten inner statement back into the outer term.
fn rebuild_around(old_content: &Term, new_inner: Term, indices: &[usize]) -> Option<Term> {
    if indices.len() == 2 {
        return Some(new_inner);
    }
    let outer = old_content.as_compound()?;
    if outer.op.is_statement() && indices[0] == 1 {
        return make::make_statement_from(outer, outer.components[0].clone(), new_inner);
    }
    if indices.len() == 4 {
        let condition = outer.components[0].as_compound()?;
        let new_condition = make::set_component(condition, indices[1], Some(new_inner))?;
        return make::make_statement_from(outer, new_condition, outer.components[1].clone());
    }
    make::set_component(outer, indices[0], Some(new_inner))
}

/// All images of a product subject: {<(S1 × S2) → P>} ⊢ <S1 → (/ P _ S2)> …
fn transform_subject_pi(inheritance: &CompoundTerm, ctx: &mut DerivationContext) {
    let predicate = inheritance.components[1].clone();
    let Some(subject) = inheritance.components[0].as_compound().cloned() else {
        return;
    };
    if subject.op == TermOperator::Product {
        for i in 0..subject.size() {
            let new_subject = subject.components[i].clone();
            let Some(new_predicate) =
                make::make_image_from_product(TermOperator::ImageExt, &subject, &predicate, i)
            else {
                continue;
            };
            if let Some(content) = make::make_inheritance(new_subject, new_predicate) {
                emit_structural(content, ctx);
            }
        }
    } else if subject.op == TermOperator::ImageInt {
        for i in 0..subject.size() {
            let (new_subject, new_predicate) = if i == subject.relation_index {
                let Some(product) = make::make_product_from_image(&subject, &predicate) else {
                    continue;
                };
                (subject.components[i].clone(), product)
            } else {
                let Some(image) = make::make_image_from_image(
                    TermOperator::ImageInt,
                    &subject,
                    &predicate,
                    i,
                ) else {
                    continue;
                };
                (image, subject.components[i].clone())
            };
            if let Some(content) = make::make_inheritance(new_subject, new_predicate) {
                emit_structural(content, ctx);
            }
        }
    }
}

/// All images of a product predicate: {<S → (P1 × P2)>} ⊢ <(\ S _ P2) → P1> …
fn transform_predicate_pi(inheritance: &CompoundTerm, ctx: &mut DerivationContext) {
    let subject = inheritance.components[0].clone();
    let Some(predicate) = inheritance.components[1].as_compound().cloned() else {
        return;
    };
    if predicate.op == TermOperator::Product {
        for i in 0..predicate.size() {
            let Some(new_subject) =
                make::make_image_from_product(TermOperator::ImageInt, &predicate, &subject, i)
            else {
                continue;
            };
            let new_predicate = predicate.components[i].clone();
            if let Some(content) = make::make_inheritance(new_subject, new_predicate) {
                emit_structural(content, ctx);
            }
        }
    } else if predicate.op == TermOperator::ImageExt {
        for i in 0..predicate.size() {
            let (new_subject, new_predicate) = if i == predicate.relation_index {
                let Some(product) = make::make_product_from_image(&predicate, &subject) else {
                    continue;
                };
                (product, predicate.components[i].clone())
            } else {
                let Some(image) = make::make_image_from_image(
                    TermOperator::ImageExt,
                    &predicate,
                    &subject,
                    i,
                ) else {
                    continue;
                };
                (predicate.components[i].clone(), image)
            };
            if let Some(content) = make::make_inheritance(new_subject, new_predicate) {
                emit_structural(content, ctx);
            }
        }
    }
}

fn emit_structural(content: Term, ctx: &mut DerivationContext) {
    if content == ctx.current_task().sentence.content {
        return;
    }
    if ctx.current_task().sentence.is_question() {
        let budget = budget::compound_backward(&content, ctx);
        ctx.single_premise_task_current(content, None, budget);
    } else {
        let truth = ctx.current_task().sentence.truth().clone();
        let budget = budget::compound_forward(&truth, &content, ctx);
        ctx.single_premise_task_current(content, Some(truth), budget);
    }
}

/// Between a compound and its member at statement level: a conjunction
/// entails each component, a component entails the disjunction.
pub fn structural_compound(
    compound: &CompoundTerm,
    component: &Term,
    compound_task: bool,
    ctx: &mut DerivationContext,
) {
    if !component.is_constant() {
        return;
    }
    let content = if compound_task {
        component.clone()
    } else {
        Term::Compound(compound.clone())
    };
    if ctx.current_task().sentence.is_question() {
        let budget = budget::compound_backward(&content, ctx);
        ctx.single_premise_task_current(content, None, budget);
        return;
    }
    // only the entailed direction is derivable
    let strong = compound_task == (compound.op == TermOperator::Conjunction);
    if !strong {
        return;
    }
    let truth = truth::deduction_reliance(ctx.current_task().sentence.truth(), RELIANCE);
    let budget = budget::forward(&truth, ctx);
    ctx.single_premise_task_current(content, Some(truth), budget);
}

/// Wrap or unwrap a negation, flipping the truth value.
pub fn transform_negation(content: Term, ctx: &mut DerivationContext) {
    if ctx.current_task().sentence.is_question() {
        let budget = budget::compound_backward(&content, ctx);
        ctx.single_premise_task_current(content, None, budget);
    } else {
        let truth = truth::negation(ctx.current_task().sentence.truth());
        let budget = budget::compound_forward(&truth, &content, ctx);
        ctx.single_premise_task_current(content, Some(truth), budget);
    }
}

/// {<S ⇒ P>} ⊢ <¬P ⇒ ¬S>, weakly.
pub fn contraposition(statement: &CompoundTerm, ctx: &mut DerivationContext) {
    let subj = statement.components[0].clone();
    let pred = statement.components[1].clone();
    let (Some(neg_pred), Some(neg_subj)) = (make::make_negation(pred), make::make_negation(subj))
    else {
        return;
    };
    let Some(content) = make::make_statement_from(statement, neg_pred, neg_subj) else {
        return;
    };
    if ctx.current_task().sentence.is_question() {
        let budget = budget::compound_backward_weak(&content, ctx);
        ctx.single_premise_task_current(content, None, budget);
    } else {
        let truth = truth::contraposition(ctx.current_task().sentence.truth());
        let budget = budget::compound_forward(&truth, &content, ctx);
        ctx.single_premise_task_current(content, Some(truth), budget);
    }
}
