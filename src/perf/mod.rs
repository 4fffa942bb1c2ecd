/// Performance measurement utilities
/// Call counters for the traversal hot path, plus hardware counters under
/// the profiling feature
pub mod profiling;

pub use profiling::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};
