//! Inference rules and the dispatch table that selects among them.
//!
//! Each submodule mirrors one family of rules: `local` for same-content
//! matching (revision, answering), `syllogistic` for two-statement
//! inference, `compositional` for term composition and variable
//! introduction, and `structural` for one-premise rewrites. `dispatch`
//! routes a premise pair to the right family from its link types.

pub mod compositional;
pub mod dispatch;
pub mod local;
pub mod structural;
pub mod syllogistic;
