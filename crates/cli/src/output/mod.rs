mod format;
mod table;
pub mod theme;

pub use format::{print_compact_json, print_json, print_success, OutputMode};
pub use table::{fault_table, squelch_table};
