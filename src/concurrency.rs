//! Concurrency primitives for variant generation.
//!
//! A FIFO permit gate bounding in-flight tasks, retry with exponential backoff for
//! transient failures, and a wall-clock deadline. The generation pipeline composes
//! them as `gate { deadline { retry { prompt -> image } } -> upload }`.

mod deadline;
mod gate;
mod retry;

pub use deadline::with_timeout;
pub use gate::{ConcurrencyGate, GatePermit};
pub use retry::{retry_with_backoff, RetryPolicy};
