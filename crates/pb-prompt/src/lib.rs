//! # pb-prompt
//!
//! The two prompt construction paths being compared.
//!
//! ## Templated
//!
//! A template file is rendered by an engine (`minijinja` by default) through
//! the narrow [`TemplateEngine`] contract. If the engine fails for any reason,
//! the file is re-read and `{key}` or `{{ key }}` placeholders are substituted
//! directly.
//!
//! ## Raw
//!
//! [`RawPromptBuilder`] classifies the input as a greeting or a question and
//! emits a fixed, hand-written prompt.
//!
//! ```rust
//! use pb_prompt::{RawPromptBuilder, SECTION_LABELS};
//!
//! let prompt = RawPromptBuilder::default().build("What is AI?");
//! assert!(SECTION_LABELS.iter().all(|label| prompt.contains(label)));
//! ```

pub mod engine;
pub mod raw;
pub mod template;

pub use engine::{DisabledEngine, EngineError, EngineOutput, MiniJinjaEngine, TemplateEngine};
pub use raw::{
    is_greeting, RawPromptBuilder, RawPromptStyle, CONCISE_GREETING_PHRASES, GREETING_PHRASES,
    GREETING_WORDS_MAX, SECTION_LABELS,
};
pub use template::{
    substitute, RenderOutcome, RenderPath, TemplateError, TemplateRenderer, Variables,
};
