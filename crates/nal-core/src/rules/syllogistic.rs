//! Two-premise rules over statements that share one term: the syllogism
//! figures, detachment, and the conditional variants that operate on a
//! conjunction of preconditions.

use crate::budget;
use crate::context::DerivationContext;
use crate::make;
use crate::term::{self, CompoundTerm, Term, TermOperator, VariableKind};
use crate::truth;
use crate::variable;

/// First-figure weak pair: {<M → P>, <M → S>} ⊢ <S → P>, <P → S>,
/// <S ↔ P> (abduction, induction, comparison).
pub fn abd_ind_com(
    term1: &Term,
    term2: &Term,
    template: &CompoundTerm,
    ctx: &mut DerivationContext,
) {
    if term::invalid_statement(term1, term2) || invalid_pair(term1, term2) {
        return;
    }
    let content1 = make::make_statement_from(template, term1.clone(), term2.clone());
    let content2 = make::make_statement_from(template, term2.clone(), term1.clone());
    let content3 = make::make_statement_symmetric(template, term1.clone(), term2.clone());
    if ctx.current_task().sentence.is_question() {
        let belief_truth = ctx.require_belief().truth().clone();
        let budget1 = budget::backward(&belief_truth, ctx);
        let budget2 = budget::backward_weak(&belief_truth, ctx);
        let budget3 = budget::backward(&belief_truth, ctx);
        emit(ctx, content1, None, budget1);
        emit(ctx, content2, None, budget2);
        emit(ctx, content3, None, budget3);
    } else {
        let v1 = ctx.current_task().sentence.truth().clone();
        let v2 = ctx.require_belief().truth().clone();
        let truth1 = truth::abduction(&v1, &v2);
        let truth2 = truth::abduction(&v2, &v1);
        let truth3 = truth::comparison(&v1, &v2);
        let budget1 = budget::forward(&truth1, ctx);
        let budget2 = budget::forward(&truth2, ctx);
        let budget3 = budget::forward(&truth3, ctx);
        emit(ctx, content1, Some(truth1), budget1);
        emit(ctx, content2, Some(truth2), budget2);
        emit(ctx, content3, Some(truth3), budget3);
    }
}

/// Strong pair across the middle term: {<M → P>, <S → M>} ⊢ <S → P>
/// and its exemplification reverse.
pub fn ded_exe(term1: &Term, term2: &Term, template: &CompoundTerm, ctx: &mut DerivationContext) {
    if term::invalid_statement(term1, term2) {
        return;
    }
    let content1 = make::make_statement_from(template, term1.clone(), term2.clone());
    let content2 = make::make_statement_from(template, term2.clone(), term1.clone());
    if ctx.current_task().sentence.is_question() {
        let belief_truth = ctx.require_belief().truth().clone();
        let budget1 = budget::backward_weak(&belief_truth, ctx);
        let budget2 = budget::backward_weak(&belief_truth, ctx);
        emit(ctx, content1, None, budget1);
        emit(ctx, content2, None, budget2);
    } else {
        let v1 = ctx.current_task().sentence.truth().clone();
        let v2 = ctx.require_belief().truth().clone();
        let truth1 = truth::deduction(&v1, &v2);
        let truth2 = truth::exemplification(&v1, &v2);
        let budget1 = budget::forward(&truth1, ctx);
        let budget2 = budget::forward(&truth2, ctx);
        emit(ctx, content1, Some(truth1), budget1);
        emit(ctx, content2, Some(truth2), budget2);
    }
}

/// Carry an asymmetric statement across a symmetric one:
/// {<M → P>, <S ↔ M>} ⊢ <S → P>.
pub fn analogy(
    subject: &Term,
    predicate: &Term,
    asym: &crate::sentence::Sentence,
    sym: &crate::sentence::Sentence,
    ctx: &mut DerivationContext,
) {
    if term::invalid_statement(subject, predicate) {
        return;
    }
    let template = match asym.content.as_statement() {
        Some(s) => s.clone(),
        None => return,
    };
    let content = make::make_statement_from(&template, subject.clone(), predicate.clone());
    if ctx.current_task().sentence.is_question() {
        let task_commutative = ctx
            .current_task()
            .sentence
            .content
            .op()
            .map(|op| op.is_commutative())
            .unwrap_or(false);
        let budget = if task_commutative {
            let t = asym.truth().clone();
            budget::backward_weak(&t, ctx)
        } else {
            let t = sym.truth().clone();
            budget::backward(&t, ctx)
        };
        emit(ctx, content, None, budget);
    } else {
        let truth = truth::analogy(asym.truth(), sym.truth());
        let budget = budget::forward(&truth, ctx);
        emit(ctx, content, Some(truth), budget);
    }
}

/// Chain two symmetric statements: {<M ↔ P>, <S ↔ M>} ⊢ <S ↔ P>.
pub fn resemblance(
    term1: &Term,
    term2: &Term,
    belief: &crate::sentence::Sentence,
    ctx: &mut DerivationContext,
) {
    if term::invalid_statement(term1, term2) {
        return;
    }
    let template = match belief.content.as_statement() {
        Some(s) => s.clone(),
        None => return,
    };
    let content = make::make_statement_from(&template, term1.clone(), term2.clone());
    if ctx.current_task().sentence.is_question() {
        let t = belief.truth().clone();
        let budget = budget::backward(&t, ctx);
        emit(ctx, content, None, budget);
    } else {
        let truth = truth::resemblance(
            ctx.current_task().sentence.truth(),
            belief.truth(),
        );
        let budget = budget::forward(&truth, ctx);
        emit(ctx, content, Some(truth), budget);
    }
}

/// Detach one side of a higher-order statement given the other:
/// {<S ⇒ P>, S} ⊢ P (deduction), {<S ⇒ P>, P} ⊢ S (abduction),
/// {<S ⇔ P>, S} ⊢ P (analogy).
pub fn detachment(
    main: &crate::sentence::Sentence,
    sub: &crate::sentence::Sentence,
    index: usize,
    ctx: &mut DerivationContext,
) {
    let statement = match main.content.as_statement() {
        Some(s) if s.op.is_higher_order() => s.clone(),
        _ => return,
    };
    let subject = statement.components[0].clone();
    let predicate = statement.components[1].clone();
    let content = if index == 0 && sub.content == subject {
        predicate
    } else if index == 1 && sub.content == predicate {
        subject
    } else {
        return;
    };
    if let Some(c) = content.as_statement() {
        if term::invalid_statement(&c.components[0], &c.components[1]) {
            return;
        }
    }
    let symmetric = statement.op == TermOperator::Equivalence;
    if ctx.current_task().sentence.is_question() {
        let belief_truth = ctx.require_belief().truth().clone();
        let budget = if !symmetric && index == 0 {
            budget::backward_weak(&belief_truth, ctx)
        } else {
            budget::backward(&belief_truth, ctx)
        };
        emit(ctx, Some(content), None, budget);
    } else {
        let truth1 = main.truth().clone();
        let truth2 = sub.truth().clone();
        let truth = if symmetric {
            truth::analogy(&truth2, &truth1)
        } else if index == 0 {
            truth::deduction(&truth1, &truth2)
        } else {
            truth::abduction(&truth2, &truth1)
        };
        let budget = budget::forward(&truth, ctx);
        emit(ctx, Some(content), Some(truth), budget);
    }
}

/// Conditional deduction/induction: consume one precondition of
/// <(&&, C1..Cn) ⇒ P> against a matching premise. `side` selects which
/// half of `premise2` carries the condition; `None` means `premise2` is
/// the condition itself.
pub fn conditional_ded_ind(
    conditional: &Term,
    index: usize,
    premise2: &Term,
    side: Option<usize>,
    ctx: &mut DerivationContext,
) {
    conditional_detach(conditional, index, premise2, side, false, ctx);
}

/// The equivalence counterpart of
/// [`conditional_ded_ind`](conditional_ded_ind), using analogy and
/// comparison for truth.
pub fn conditional_ana(
    conditional: &Term,
    index: usize,
    premise2: &Term,
    side: Option<usize>,
    ctx: &mut DerivationContext,
) {
    conditional_detach(conditional, index, premise2, side, true, ctx);
}

fn conditional_detach(
    conditional: &Term,
    index: usize,
    premise2: &Term,
    side: Option<usize>,
    symmetric: bool,
    ctx: &mut DerivationContext,
) {
    let required = if symmetric {
        TermOperator::Equivalence
    } else {
        TermOperator::Implication
    };
    let statement = match conditional.as_statement() {
        Some(s) if s.op == required => s.clone(),
        _ => return,
    };
    let old_condition = match statement.components[0].as_compound() {
        Some(c) if c.op == TermOperator::Conjunction => c.clone(),
        _ => return,
    };
    let common = match side {
        Some(0) => match premise2.as_statement() {
            Some(s) => s.components[0].clone(),
            None => return,
        },
        Some(_) => match premise2.as_statement() {
            Some(s) => s.components[1].clone(),
            None => return,
        },
        None => premise2.clone(),
    };
    let belief_content = ctx.require_belief().content.clone();
    let conditional_task =
        variable::has_substitute(VariableKind::Independent, premise2, &belief_content, &mut ctx.rng);

    // Align the condition at `index` with the common component, unifying
    // independent variables when a literal match fails.
    let mut conditional_term = conditional.clone();
    let mut premise2_term = premise2.clone();
    let mut index = index;
    if let Some(pos) = old_condition.components.iter().position(|c| *c == common) {
        index = pos;
    } else {
        let at = match old_condition.components.get(index) {
            Some(t) => t.clone(),
            None => return,
        };
        let unified = variable::unify(
            VariableKind::Independent,
            &at,
            &common,
            &conditional_term,
            &premise2_term,
            &mut ctx.rng,
        )
        .or_else(|| {
            let common_child = common
                .as_compound()
                .filter(|c| c.op == old_condition.op)
                .and_then(|c| c.components.get(index))?
                .clone();
            variable::unify(
                VariableKind::Independent,
                &at,
                &common_child,
                &conditional_term,
                &premise2_term,
                &mut ctx.rng,
            )
        });
        match unified {
            Some((r1, r2)) => {
                conditional_term = r1;
                premise2_term = r2;
            }
            None => return,
        }
    }

    let statement = match conditional_term.as_statement() {
        Some(s) => s.clone(),
        None => return,
    };
    let old_condition = match statement.components[0].as_compound() {
        Some(c) if c.op == TermOperator::Conjunction => c.clone(),
        _ => return,
    };
    let common = match side {
        Some(0) => premise2_term.subject().clone(),
        Some(_) => premise2_term.predicate().clone(),
        None => premise2_term.clone(),
    };
    let new_component = match side {
        Some(0) => Some(premise2_term.predicate().clone()),
        Some(_) => Some(premise2_term.subject().clone()),
        None => None,
    };
    let content = if statement.components[0] == common {
        statement.components[1].clone()
    } else {
        let new_condition = match make::set_component(&old_condition, index, new_component) {
            Some(c) => c,
            None => return,
        };
        match make::make_statement_from(&statement, new_condition, statement.components[1].clone())
        {
            Some(c) => c,
            None => return,
        }
    };

    if ctx.current_task().sentence.is_question() {
        let belief_truth = ctx.require_belief().truth().clone();
        let budget = if conditional_task {
            budget::backward_weak(&belief_truth, ctx)
        } else {
            budget::backward(&belief_truth, ctx)
        };
        emit(ctx, Some(content), None, budget);
    } else {
        let truth1 = ctx.current_task().sentence.truth().clone();
        let truth2 = ctx.require_belief().truth().clone();
        // the rule is strong unless the premise entered through the
        // antecedent side of a statement
        let strong = side != Some(0);
        let truth = if symmetric {
            if conditional_task {
                truth::comparison(&truth1, &truth2)
            } else {
                truth::analogy(&truth2, &truth1)
            }
        } else if strong {
            truth::deduction(&truth1, &truth2)
        } else if conditional_task {
            truth::induction(&truth2, &truth1)
        } else {
            truth::induction(&truth1, &truth2)
        };
        let budget = budget::forward(&truth, ctx);
        emit(ctx, Some(content), Some(truth), budget);
    }
}

/// Conditional abduction: two implications sharing a consequent, where
/// one condition set contains the other. Returns whether the rule
/// applied.
pub fn conditional_abd(
    cond1: &Term,
    cond2: &Term,
    st1: &CompoundTerm,
    st2: &CompoundTerm,
    ctx: &mut DerivationContext,
) -> bool {
    if st1.op != TermOperator::Implication || st2.op != TermOperator::Implication {
        return false;
    }
    let conj1 = cond1
        .as_compound()
        .filter(|c| c.op == TermOperator::Conjunction);
    let conj2 = cond2
        .as_compound()
        .filter(|c| c.op == TermOperator::Conjunction);
    if conj1.is_none() && conj2.is_none() {
        return false;
    }
    let term1 = conj1.and_then(|c| make::reduce_components(c, cond2));
    let term2 = conj2.and_then(|c| make::reduce_components(c, cond1));
    if term1.is_none() && term2.is_none() {
        return false;
    }
    let question = ctx.current_task().sentence.is_question();
    if let Some(t1) = &term1 {
        let content = match &term2 {
            Some(t2) => make::make_statement_from(st2, t2.clone(), t1.clone()),
            None => Some(t1.clone()),
        };
        if question {
            let belief_truth = ctx.require_belief().truth().clone();
            let budget = budget::backward_weak(&belief_truth, ctx);
            emit(ctx, content, None, budget);
        } else {
            let v1 = ctx.current_task().sentence.truth().clone();
            let v2 = ctx.require_belief().truth().clone();
            let truth = truth::abduction(&v2, &v1);
            let budget = budget::forward(&truth, ctx);
            emit(ctx, content, Some(truth), budget);
        }
    }
    if let Some(t2) = &term2 {
        let content = match &term1 {
            Some(t1) => make::make_statement_from(st1, t1.clone(), t2.clone()),
            None => Some(t2.clone()),
        };
        if question {
            let belief_truth = ctx.require_belief().truth().clone();
            let budget = budget::backward_weak(&belief_truth, ctx);
            emit(ctx, content, None, budget);
        } else {
            let v1 = ctx.current_task().sentence.truth().clone();
            let v2 = ctx.require_belief().truth().clone();
            let truth = truth::abduction(&v1, &v2);
            let budget = budget::forward(&truth, ctx);
            emit(ctx, content, Some(truth), budget);
        }
    }
    true
}

/// One side carries an independent variable the other lacks; such a pair
/// never forms a meaningful syllogism.
fn invalid_pair(t1: &Term, t2: &Term) -> bool {
    t1.contains_var_kind(VariableKind::Independent)
        != t2.contains_var_kind(VariableKind::Independent)
}

fn emit(
    ctx: &mut DerivationContext,
    content: Option<Term>,
    truth: Option<crate::truth::TruthValue>,
    budget: crate::budget::BudgetValue,
) {
    if let Some(content) = content {
        ctx.double_premise_task(content, truth, budget);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetValue;
    use crate::context::DerivationContext;
    use crate::sentence::Sentence;
    use crate::stamp::Stamp;
    use crate::task::Task;
    use crate::truth::TruthValue;

    fn inheritance(s: &str, p: &str) -> Term {
        make::make_inheritance(Term::word(s), Term::word(p)).unwrap()
    }

    fn judgement(content: Term, f: f32, c: f32, serial: i64) -> Sentence {
        Sentence::new_judgement(content, TruthValue::new(f, c), Stamp::new(serial, 0))
    }

    fn ctx_with(task_sentence: Sentence, belief: Sentence) -> DerivationContext {
        let task = Task::new_input(task_sentence, BudgetValue::new(0.8, 0.8, 0.8));
        DerivationContext::new(task, 1, 42).with_belief(belief)
    }

    #[test]
    fn test_ded_exe_produces_deduction_and_exemplification() {
        // task <bird --> animal>, belief <robin --> bird>
        let task = judgement(inheritance("bird", "animal"), 1.0, 0.9, 1);
        let belief = judgement(inheritance("robin", "bird"), 1.0, 0.9, 2);
        let template = task.content.as_statement().unwrap().clone();
        let mut ctx = ctx_with(task, belief);
        ded_exe(
            &Term::word("robin"),
            &Term::word("animal"),
            &template,
            &mut ctx,
        );
        let derived = ctx.take_derived();
        assert_eq!(derived.len(), 2);
        let deduced = derived
            .iter()
            .find(|t| t.sentence.content == inheritance("robin", "animal"))
            .expect("deduction missing");
        let truth = deduced.sentence.truth();
        assert!((truth.frequency() - 1.0).abs() < 1e-4);
        assert!((truth.confidence() - 0.81).abs() < 1e-3);
        // exemplification goes the other way, weakly
        let exemplified = derived
            .iter()
            .find(|t| t.sentence.content == inheritance("animal", "robin"))
            .expect("exemplification missing");
        assert!(exemplified.sentence.truth().confidence() < 0.5);
    }

    #[test]
    fn test_abd_ind_com_produces_three_conclusions() {
        // task <bird --> animal>, belief <bird --> flyer>, middle term bird
        let task = judgement(inheritance("bird", "animal"), 1.0, 0.9, 1);
        let belief = judgement(inheritance("bird", "flyer"), 1.0, 0.9, 2);
        let template = task.content.as_statement().unwrap().clone();
        let mut ctx = ctx_with(task, belief);
        abd_ind_com(
            &Term::word("flyer"),
            &Term::word("animal"),
            &template,
            &mut ctx,
        );
        let derived = ctx.take_derived();
        let contents: Vec<Term> = derived.iter().map(|t| t.sentence.content.clone()).collect();
        assert!(contents.contains(&inheritance("flyer", "animal")));
        assert!(contents.contains(&inheritance("animal", "flyer")));
        assert!(contents
            .contains(&make::make_similarity(Term::word("flyer"), Term::word("animal")).unwrap()));
        for t in &derived {
            assert!(t.sentence.truth().confidence() < 0.5);
        }
    }

    #[test]
    fn test_detachment_deduction() {
        let implication = make::make_implication(
            inheritance("robin", "bird"),
            inheritance("robin", "animal"),
        )
        .unwrap();
        let task = judgement(implication, 1.0, 0.9, 1);
        let belief = judgement(inheritance("robin", "bird"), 1.0, 0.9, 2);
        let mut ctx = ctx_with(task.clone(), belief.clone());
        detachment(&task, &belief, 0, &mut ctx);
        let derived = ctx.take_derived();
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].sentence.content, inheritance("robin", "animal"));
        assert!((derived[0].sentence.truth().confidence() - 0.81).abs() < 1e-3);
    }

    #[test]
    fn test_detachment_abduction_is_weak() {
        let implication = make::make_implication(
            inheritance("robin", "bird"),
            inheritance("robin", "animal"),
        )
        .unwrap();
        let task = judgement(implication, 1.0, 0.9, 1);
        let belief = judgement(inheritance("robin", "animal"), 1.0, 0.9, 2);
        let mut ctx = ctx_with(task.clone(), belief.clone());
        detachment(&task, &belief, 1, &mut ctx);
        let derived = ctx.take_derived();
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].sentence.content, inheritance("robin", "bird"));
        assert!(derived[0].sentence.truth().confidence() < 0.5);
    }

    #[test]
    fn test_detachment_rejects_mismatched_component() {
        let implication = make::make_implication(
            inheritance("robin", "bird"),
            inheritance("robin", "animal"),
        )
        .unwrap();
        let task = judgement(implication, 1.0, 0.9, 1);
        let belief = judgement(inheritance("swan", "bird"), 1.0, 0.9, 2);
        let mut ctx = ctx_with(task.clone(), belief.clone());
        detachment(&task, &belief, 0, &mut ctx);
        assert!(ctx.no_result());
    }

    #[test]
    fn test_conditional_ded_ind_consumes_one_condition() {
        // <(&&, <robin --> bird>, <robin --> flyer>) ==> <robin --> animal>>
        // against <robin --> bird> leaves the flyer condition
        let condition = make::make_conjunction(vec![
            inheritance("robin", "bird"),
            inheritance("robin", "flyer"),
        ])
        .unwrap();
        let conditional =
            make::make_implication(condition, inheritance("robin", "animal")).unwrap();
        let task = judgement(conditional.clone(), 1.0, 0.9, 1);
        let belief = judgement(inheritance("robin", "bird"), 1.0, 0.9, 2);
        let mut ctx = ctx_with(task, belief);
        let premise2 = inheritance("robin", "bird");
        conditional_ded_ind(&conditional, 0, &premise2, None, &mut ctx);
        let derived = ctx.take_derived();
        assert_eq!(derived.len(), 1);
        let expected = make::make_implication(
            inheritance("robin", "flyer"),
            inheritance("robin", "animal"),
        )
        .unwrap();
        assert_eq!(derived[0].sentence.content, expected);
    }

    #[test]
    fn test_conditional_abd_extracts_extra_condition() {
        // <(&&, A, B) ==> C> and <A ==> C> suggest B.
        let a = inheritance("robin", "bird");
        let b = inheritance("robin", "flyer");
        let c = inheritance("robin", "animal");
        let conj = make::make_conjunction(vec![a.clone(), b.clone()]).unwrap();
        let st1 = make::make_implication(conj.clone(), c.clone()).unwrap();
        let st2 = make::make_implication(a.clone(), c.clone()).unwrap();
        let task = judgement(st1.clone(), 1.0, 0.9, 1);
        let belief = judgement(st2.clone(), 1.0, 0.9, 2);
        let mut ctx = ctx_with(task, belief);
        let applied = conditional_abd(
            &conj,
            &a,
            st1.as_statement().unwrap(),
            st2.as_statement().unwrap(),
            &mut ctx,
        );
        assert!(applied);
        let derived = ctx.take_derived();
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].sentence.content, b);
    }
}
