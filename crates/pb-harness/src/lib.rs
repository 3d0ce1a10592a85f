//! # pb-harness
//!
//! Runs the templated and raw prompt paths side by side and presents the
//! timings.
//!
//! ```text
//! query ─┬─> template file + engine ──> inference ─┐
//!        └─> raw prompt builder ──────> inference ─┴─> ComparisonRecord ─> report
//! ```
//!
//! ## Front ends
//!
//! | Mode | Entry point |
//! |------|-------------|
//! | interactive comparison | [`cli::run_compare_loop`] |
//! | batch | [`cli::run_batch_report`] / [`batch::run_batch`] |
//! | templated-only metrics | [`cli::run_metrics_loop`] |
//! | web UI | [`ui::serve`] |

pub mod batch;
pub mod cli;
pub mod config;
pub mod logging;
pub mod pipeline;
pub mod session;
pub mod ui;

pub use batch::{run_batch, BatchFailure, BatchRun};
pub use cli::{parse_command, CliError, Command};
pub use config::{load_queries, ConfigError, HarnessConfig, DEFAULT_BATCH_QUERIES};
pub use logging::init_logging;
pub use pipeline::{ComparisonPipeline, PathOptions, PipelineError, USER_INPUT_VAR};
pub use session::{SessionEntry, SessionLog, UiSession, UiSettings};
pub use ui::{router, serve, UiError, UiState};
