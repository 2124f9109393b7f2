//! Working state of a single inference step.
//!
//! A [`DerivationContext`] is built by the control loop around one selected
//! task (and, when concept-level reasoning applies, one belief and the link
//! pair that brought them together), handed to the rule dispatcher, and then
//! drained of whatever the rules produced. Nothing in here outlives the
//! step: derived tasks and reports are buffers, not storage.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::rc::Rc;
use tracing::{debug, trace};

use crate::budget::BudgetValue;
use crate::link::{TaskLink, TermLink};
use crate::sentence::{Punctuation, Sentence};
use crate::stamp::Stamp;
use crate::task::Task;
use crate::term::Term;
use crate::truth::TruthValue;

/// What a drained sentence means to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    /// Best answer so far to an input question.
    Answer,
    /// A derived judgement worth surfacing.
    Output,
}

#[derive(Clone, Debug)]
pub struct Report {
    pub kind: ReportKind,
    pub sentence: Sentence,
}

/// Premises, attention state and output buffers for one step.
pub struct DerivationContext {
    /// Term of the concept doing the reasoning.
    pub current_term: Term,
    current_task: Task,
    pub current_belief: Option<Sentence>,
    pub task_link: Option<TaskLink>,
    pub belief_link: Option<TermLink>,
    /// Priority of the concept named by the belief link's target, sampled
    /// when the link was selected. Feeds back into link budgets.
    pub belief_concept_activation: f32,
    /// Clock value stamped onto every conclusion.
    pub time: i64,
    pub rng: SmallRng,
    derived: Vec<Task>,
    reports: Vec<Report>,
}

impl DerivationContext {
    pub fn new(task: Task, time: i64, seed: u64) -> Self {
        let current_term = task.sentence.content.clone();
        Self {
            current_term,
            current_task: task,
            current_belief: None,
            task_link: None,
            belief_link: None,
            belief_concept_activation: 0.0,
            time,
            rng: SmallRng::seed_from_u64(seed),
            derived: Vec::new(),
            reports: Vec::new(),
        }
    }

    pub fn with_concept_term(mut self, term: Term) -> Self {
        self.current_term = term;
        self
    }

    pub fn with_belief(mut self, belief: Sentence) -> Self {
        self.current_belief = Some(belief);
        self
    }

    pub fn with_links(
        mut self,
        task_link: TaskLink,
        belief_link: TermLink,
        belief_concept_activation: f32,
    ) -> Self {
        self.task_link = Some(task_link);
        self.belief_link = Some(belief_link);
        self.belief_concept_activation = belief_concept_activation;
        self
    }

    pub fn current_task(&self) -> &Task {
        &self.current_task
    }

    pub fn current_task_mut(&mut self) -> &mut Task {
        &mut self.current_task
    }

    /// The belief premise, which the caller guaranteed to exist.
    pub fn require_belief(&self) -> &Sentence {
        match &self.current_belief {
            Some(belief) => belief,
            None => panic!("two-premise rule fired without a belief"),
        }
    }

    /// Whether the step has produced anything yet.
    pub fn no_result(&self) -> bool {
        self.derived.is_empty()
    }

    /// Emit a conclusion drawn from the current task and the current
    /// belief. The evidential bases of both premises are merged; if they
    /// overlap, the conclusion is circular and silently dropped.
    pub fn double_premise_task(
        &mut self,
        content: Term,
        truth: Option<TruthValue>,
        budget: BudgetValue,
    ) {
        self.double_premise_task_revisable(content, truth, budget, true);
    }

    /// As [`double_premise_task`](Self::double_premise_task), but marking
    /// the conclusion non-revisable. Used by rules that introduce
    /// variables, whose conclusions must not merge with each other.
    pub fn double_premise_task_revisable(
        &mut self,
        content: Term,
        truth: Option<TruthValue>,
        budget: BudgetValue,
        revisable: bool,
    ) {
        if !budget.above_threshold() {
            return;
        }
        let belief = self.require_belief().clone();
        let stamp = match Stamp::merge(&self.current_task.sentence.stamp, &belief.stamp, self.time)
        {
            Some(stamp) => stamp,
            None => {
                trace!(content = %content, "overlapping evidence, conclusion dropped");
                return;
            }
        };
        let sentence = match self.current_task.sentence.punctuation {
            Punctuation::Judgement => {
                let truth = match truth {
                    Some(t) => t,
                    None => panic!("judgement conclusion without a truth value"),
                };
                Sentence::new_judgement(content, truth, stamp).with_revisable(revisable)
            }
            Punctuation::Question => Sentence::new_question(content, stamp),
        };
        let parent = Rc::new(self.current_task.clone());
        let task = Task::new_derived(sentence, budget, Some(parent), Some(belief));
        debug!(task = %task.key(), "derived");
        self.derived.push(task);
    }

    /// Emit a conclusion drawn from the current task alone. The conclusion
    /// inherits the task's evidential base with a fresh creation time.
    pub fn single_premise_task(
        &mut self,
        content: Term,
        punctuation: Punctuation,
        truth: Option<TruthValue>,
        budget: BudgetValue,
    ) {
        if !budget.above_threshold() {
            return;
        }
        let stamp = self.current_task.sentence.stamp.with_time(self.time);
        let sentence = match punctuation {
            Punctuation::Judgement => {
                let truth = match truth {
                    Some(t) => t,
                    None => panic!("judgement conclusion without a truth value"),
                };
                Sentence::new_judgement(content, truth, stamp)
            }
            Punctuation::Question => Sentence::new_question(content, stamp),
        };
        let parent = Rc::new(self.current_task.clone());
        let task = Task::new_derived(sentence, budget, Some(parent), None);
        debug!(task = %task.key(), "derived");
        self.derived.push(task);
    }

    /// Keep the current task's punctuation; the common case for
    /// structural rules.
    pub fn single_premise_task_current(
        &mut self,
        content: Term,
        truth: Option<TruthValue>,
        budget: BudgetValue,
    ) {
        let punctuation = self.current_task.sentence.punctuation;
        self.single_premise_task(content, punctuation, truth, budget);
    }

    /// Re-inject an existing sentence as a task of its own, typically a
    /// belief that just answered a question.
    pub fn activated_task(&mut self, budget: BudgetValue, sentence: Sentence) {
        if !budget.above_threshold() {
            return;
        }
        let parent_belief = self.current_task.parent_belief.clone();
        let parent = Rc::new(self.current_task.clone());
        let task = Task::new_derived(sentence, budget, Some(parent), parent_belief);
        debug!(task = %task.key(), "activated");
        self.derived.push(task);
    }

    pub fn report(&mut self, sentence: &Sentence, kind: ReportKind) {
        debug!(?kind, sentence = %sentence.key(), "report");
        self.reports.push(Report {
            kind,
            sentence: sentence.clone(),
        });
    }

    pub fn take_derived(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.derived)
    }

    pub fn take_reports(&mut self) -> Vec<Report> {
        std::mem::take(&mut self.reports)
    }

    /// Hand the (possibly rebudgeted) task and links back to the caller.
    pub fn into_parts(self) -> (Task, Option<TaskLink>, Option<TermLink>) {
        (self.current_task, self.task_link, self.belief_link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;
    use crate::truth::TruthValue;

    fn judgement_task(serial: i64, name: &str) -> Task {
        let sentence = Sentence::new_judgement(
            Term::word(name),
            TruthValue::new(1.0, 0.9),
            Stamp::new(serial, 0),
        );
        Task::new_input(sentence, BudgetValue::new(0.8, 0.8, 0.8))
    }

    fn belief(serial: i64, name: &str) -> Sentence {
        Sentence::new_judgement(
            Term::word(name),
            TruthValue::new(1.0, 0.9),
            Stamp::new(serial, 0),
        )
    }

    #[test]
    fn test_double_premise_merges_stamps() {
        let mut ctx =
            DerivationContext::new(judgement_task(1, "a"), 5, 42).with_belief(belief(2, "b"));
        ctx.double_premise_task(
            Term::word("c"),
            Some(TruthValue::new(1.0, 0.81)),
            BudgetValue::new(0.5, 0.5, 0.5),
        );
        let derived = ctx.take_derived();
        assert_eq!(derived.len(), 1);
        let stamp = &derived[0].sentence.stamp;
        assert_eq!(stamp.creation_time, 5);
        assert!(stamp.serials.contains(&1) && stamp.serials.contains(&2));
        assert!(derived[0].parent_belief.is_some());
        assert!(!derived[0].is_input());
    }

    #[test]
    fn test_double_premise_drops_overlapping_evidence() {
        let mut ctx =
            DerivationContext::new(judgement_task(7, "a"), 5, 42).with_belief(belief(7, "b"));
        ctx.double_premise_task(
            Term::word("c"),
            Some(TruthValue::new(1.0, 0.81)),
            BudgetValue::new(0.5, 0.5, 0.5),
        );
        assert!(ctx.no_result());
    }

    #[test]
    fn test_budget_below_threshold_is_not_emitted() {
        let mut ctx =
            DerivationContext::new(judgement_task(1, "a"), 5, 42).with_belief(belief(2, "b"));
        ctx.double_premise_task(
            Term::word("c"),
            Some(TruthValue::new(1.0, 0.81)),
            BudgetValue::new(0.0, 0.0, 0.0),
        );
        assert!(ctx.no_result());
    }

    #[test]
    fn test_single_premise_keeps_evidence() {
        let mut ctx = DerivationContext::new(judgement_task(3, "a"), 9, 42);
        ctx.single_premise_task_current(
            Term::word("b"),
            Some(TruthValue::new(0.0, 0.9)),
            BudgetValue::new(0.5, 0.5, 0.5),
        );
        let derived = ctx.take_derived();
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].sentence.stamp.serials, vec![3]);
        assert_eq!(derived[0].sentence.stamp.creation_time, 9);
        assert!(derived[0].parent_belief.is_none());
    }

    #[test]
    #[should_panic(expected = "without a belief")]
    fn test_double_premise_without_belief_panics() {
        let mut ctx = DerivationContext::new(judgement_task(1, "a"), 5, 42);
        ctx.double_premise_task(
            Term::word("c"),
            Some(TruthValue::new(1.0, 0.81)),
            BudgetValue::new(0.5, 0.5, 0.5),
        );
    }

    #[test]
    fn test_report_buffering() {
        let mut ctx = DerivationContext::new(judgement_task(1, "a"), 5, 42);
        let answer = belief(2, "b");
        ctx.report(&answer, ReportKind::Answer);
        let reports = ctx.take_reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, ReportKind::Answer);
        assert_eq!(reports[0].sentence.key(), answer.key());
    }
}
