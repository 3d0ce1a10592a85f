//! # pb-perf
//!
//! Timing reports for the templated vs raw prompt comparison.
//!
//! ## Overhead
//!
//! One definition is used everywhere:
//!
//! ```text
//! overhead% = (templated_total - raw_total) / raw_total * 100     (0 when raw_total == 0)
//! ```
//!
//! | Overhead | Band |
//! |----------|------|
//! | `> 5%` | significant overhead |
//! | `> 0%` and `<= 5%` | minor overhead |
//! | `<= 0%` | comparable or faster |
//!
//! Batch summaries apply the same formula to the mean totals.

pub mod report;
pub mod single;
pub mod stats;
pub mod summary;

pub use report::{millis, overhead_percent, ComparisonReport, OverheadBand, PathView, StageTimes};
pub use single::SinglePathMetrics;
pub use summary::BatchSummary;
