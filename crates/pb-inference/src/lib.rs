//! # pb-inference
//!
//! Client for a locally hosted language model reached through a subprocess
//! (by default `ollama run <model>`).
//!
//! ```text
//! prompt ──stdin──> <program> <args...> <model> ──stdout──> response
//! ```
//!
//! | Outcome | Result |
//! |---------|--------|
//! | exit 0 | `failed = false`, trimmed stdout |
//! | non-zero exit | `failed = true`, generic message, stderr logged |
//! | spawn / IO error | `failed = true`, error description |
//! | timeout | `failed = true`, child killed |
//!
//! No retries are performed.

pub mod client;
pub mod input;

pub use client::{InferenceClient, InferenceConfig, InferenceConfigError, PREVIEW_CHARS_MAX};
pub use input::PromptInput;
