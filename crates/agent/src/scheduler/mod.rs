mod clock;
mod policy;

pub use clock::{next_tick, ClockStats, TickClock, TickHandler};
pub use policy::should_run;
