//! # pb-core
//!
//! Shared data model for comparing templated and raw prompt construction.
//!
//! ## Records
//!
//! | Type | Produced by | Lifetime |
//! |------|-------------|----------|
//! | `RenderedPrompt` | template adapter / raw builder | one pipeline invocation |
//! | `InferenceResult` | inference client | moved into the pipeline |
//! | `ComparisonRecord` | comparison pipeline | one per query |
//!
//! ## Timing
//!
//! Every duration in a `ComparisonRecord` is read from a single [`Clock`].
//! Production code uses [`MonotonicClock`]; tests use [`SimClock`], which only
//! advances when told to.

pub mod clock;
pub mod record;

pub use clock::{Clock, MonotonicClock, SimClock};
pub use record::{
    ComparisonRecord, InferenceResult, PathRun, PromptRequest, PromptSource, RenderedPrompt,
};
