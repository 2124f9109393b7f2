//! Tasks: a sentence wrapped with its processing budget and derivation
//! lineage. The unit of work the scheduler moves around.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

use crate::budget::BudgetValue;
use crate::sentence::Sentence;

#[derive(Clone, Serialize, Deserialize)]
pub struct Task {
    pub sentence: Sentence,
    pub budget: BudgetValue,
    /// The task this one was derived from, if any. Lineage only points
    /// backward, so the graph of parents is acyclic by construction.
    #[serde(skip)]
    pub parent_task: Option<Rc<Task>>,
    /// The belief used as second premise, if any.
    pub parent_belief: Option<Sentence>,
    /// Best answer found so far for a question task. Monotonic: only ever
    /// replaced by a strictly better solution, never cleared.
    pub best_solution: Option<Sentence>,
}

impl Task {
    /// A task entering from outside the reasoner.
    pub fn new_input(sentence: Sentence, budget: BudgetValue) -> Self {
        Self {
            sentence,
            budget,
            parent_task: None,
            parent_belief: None,
            best_solution: None,
        }
    }

    pub fn new_derived(
        sentence: Sentence,
        budget: BudgetValue,
        parent_task: Option<Rc<Task>>,
        parent_belief: Option<Sentence>,
    ) -> Self {
        Self {
            sentence,
            budget,
            parent_task,
            parent_belief,
            best_solution: None,
        }
    }

    pub fn is_input(&self) -> bool {
        self.parent_task.is_none()
    }

    pub fn key(&self) -> String {
        self.sentence.key()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.budget, self.sentence)?;
        if let Some(parent) = &self.parent_task {
            write!(f, " <<= {}", parent.key())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make;
    use crate::stamp::Stamp;
    use crate::term::Term;
    use crate::truth::TruthValue;

    fn task(name: &str) -> Task {
        Task::new_input(
            Sentence::new_judgement(
                make::make_inheritance(Term::word(name), Term::word("bird")).unwrap(),
                TruthValue::new(1.0, 0.9),
                Stamp::new(1, 0),
            ),
            BudgetValue::new(0.8, 0.5, 0.5),
        )
    }

    #[test]
    fn test_lineage_points_backward() {
        let parent = Rc::new(task("robin"));
        let child = Task::new_derived(
            parent.sentence.clone(),
            BudgetValue::new(0.5, 0.5, 0.5),
            Some(parent.clone()),
            None,
        );
        assert!(!child.is_input());
        assert!(parent.is_input());
        assert_eq!(child.parent_task.as_ref().unwrap().key(), parent.key());
    }
}
