mod sink;

pub use sink::{LogMetrics, MemoryMetrics, MetricsSink, NullMetrics};
