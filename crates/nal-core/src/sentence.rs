//! Sentences: a term plus punctuation, evidence and (for judgements)
//! truth. Immutable once built.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stamp::Stamp;
use crate::term::Term;
use crate::truth::TruthValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Punctuation {
    Judgement,
    Question,
}

impl Punctuation {
    pub fn is_judgement(self) -> bool {
        self == Punctuation::Judgement
    }

    pub fn is_question(self) -> bool {
        self == Punctuation::Question
    }

    pub fn symbol(self) -> char {
        match self {
            Punctuation::Judgement => '.',
            Punctuation::Question => '?',
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub content: Term,
    pub punctuation: Punctuation,
    /// Present exactly when the sentence is a judgement.
    pub truth: Option<TruthValue>,
    pub stamp: Stamp,
    /// Whether revision may consume this sentence. Conclusions reached
    /// through variable unification are not revisable: their content no
    /// longer matches their evidence trail literally.
    pub revisable: bool,
}

impl Sentence {
    pub fn new_judgement(content: Term, truth: TruthValue, stamp: Stamp) -> Self {
        Self {
            content,
            punctuation: Punctuation::Judgement,
            truth: Some(truth),
            stamp,
            revisable: true,
        }
    }

    pub fn new_question(content: Term, stamp: Stamp) -> Self {
        Self {
            content,
            punctuation: Punctuation::Question,
            truth: None,
            stamp,
            revisable: false,
        }
    }

    pub fn with_revisable(mut self, revisable: bool) -> Self {
        self.revisable = revisable;
        self
    }

    pub fn is_judgement(&self) -> bool {
        self.punctuation.is_judgement()
    }

    pub fn is_question(&self) -> bool {
        self.punctuation.is_question()
    }

    /// Truth of a judgement. Calling this on a question is a caller bug.
    pub fn truth(&self) -> &TruthValue {
        self.truth.as_ref().expect("question has no truth value")
    }

    /// Stable display key: content, punctuation, truth. Task-link novelty
    /// records and duplicate detection compare these.
    pub fn key(&self) -> String {
        match &self.truth {
            Some(t) => format!("{}{} {}", self.content, self.punctuation.symbol(), t),
            None => format!("{}{}", self.content, self.punctuation.symbol()),
        }
    }
}

impl fmt::Debug for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.key(), self.stamp)
    }
}
