/// Evidential horizon: amount of future evidence to be considered
pub const HORIZON: f32 = 1.0;

/// Reliance factor for structural (analytic) conclusions
pub const RELIANCE: f32 = 0.9;

/// Minimum budget summary for an item to stay active
pub const BUDGET_THRESHOLD: f32 = 0.01;

/// Confidence cap: confidence is always strictly below 1
pub const MAX_CONFIDENCE: f32 = 0.9999;

/// Maximum length of an evidential base after merge
pub const MAX_STAMP_LENGTH: usize = 8;

/// Number of recently paired term-link keys remembered per task link
pub const RECORD_LENGTH: usize = 10;

/// Age (in clock ticks) after which a remembered pairing may fire again
pub const NOVELTY_HORIZON: i64 = 2000;

/// Default forgetting cycles, carried for callers that drive `forget`
pub const TASK_FORGET_CYCLES: f32 = 50.0;
pub const BELIEF_FORGET_CYCLES: f32 = 10.0;
pub const CONCEPT_FORGET_CYCLES: f32 = 100.0;
