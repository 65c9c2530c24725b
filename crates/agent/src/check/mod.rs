mod definition;
mod hysteresis;
mod interpret;
mod runner;

pub use definition::{Check, CheckDefinition, CheckSpec, CheckState};
pub use interpret::{interpret, CheckOutput, InterpretError, ProcessOutput};
pub use runner::{crashed, execute, perform, timed_out};
