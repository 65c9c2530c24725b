pub mod fault;
pub mod metric;
pub mod perfdata;
pub mod retry;
pub mod squelch;
pub mod time;

pub use fault::{Fault, Severity};
pub use metric::Metric;
pub use squelch::Squelch;
