//! Non-axiomatic logic inference core.
//!
//! Everything an evidential reasoner needs below the control loop:
//! fixed-precision truth and budget values, evidential stamps, an
//! immutable term algebra with canonicalizing constructors, variable
//! unification, the sentence/task premise model, link types, and the
//! full syllogistic/compositional/structural rule set driven by a
//! link-indexed dispatch table.
//!
//! Zero I/O — pure inference with no opinions about storage or
//! scheduling. A single derivation step is `rules::dispatch::reason`
//! over a [`DerivationContext`] holding the premise pair.

pub mod budget;
pub mod constants;
pub mod context;
pub mod link;
pub mod make;
pub mod rules;
pub mod sentence;
pub mod short_float;
pub mod stamp;
pub mod task;
pub mod term;
pub mod truth;
pub mod variable;

pub use budget::BudgetValue;
pub use constants::{BUDGET_THRESHOLD, HORIZON, MAX_STAMP_LENGTH, RELIANCE};
pub use context::{DerivationContext, Report, ReportKind};
pub use link::{TaskLink, TermLink, TermLinkTemplate, TermLinkType, component_link_templates};
pub use rules::dispatch::reason;
pub use sentence::{Punctuation, Sentence};
pub use short_float::ShortFloat;
pub use stamp::Stamp;
pub use task::Task;
pub use term::{CompoundTerm, Term, TermOperator, VariableKind};
pub use truth::TruthValue;
