mod evaluator;
mod rule;

pub use evaluator::{Threshold, ThresholdError, Thresholds};
pub use rule::{Bound, Condition, Level};
