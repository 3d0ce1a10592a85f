//! Boundary to the external template engine.
//!
//! Engines may hand back a message with content, a displayable document, or
//! plain text. [`EngineOutput::into_text`] is the only place those shapes are
//! reconciled.

use std::fmt;

use minijinja::{Environment, ErrorKind, UndefinedBehavior};

use crate::template::Variables;

/// Maximum recursion depth for engine templates.
pub const RECURSION_DEPTH_MAX: usize = 100;

/// What an engine produced.
pub enum EngineOutput {
    /// Chat-style message exposing its rendered content
    Message { content: String },
    /// Object that converts itself to a string
    Document(Box<dyn fmt::Display + Send>),
    /// Plain rendered text
    Text(String),
}

impl EngineOutput {
    /// Normalize any output shape to the prompt text.
    pub fn into_text(self) -> String {
        match self {
            EngineOutput::Message { content } => content,
            EngineOutput::Document(doc) => doc.to_string(),
            EngineOutput::Text(text) => text,
        }
    }
}

impl fmt::Debug for EngineOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineOutput::Message { content } => {
                f.debug_struct("Message").field("content", content).finish()
            }
            EngineOutput::Document(_) => f.write_str("Document(..)"),
            EngineOutput::Text(text) => f.debug_tuple("Text").field(text).finish(),
        }
    }
}

/// Failure on the engine path. Always recoverable through the fallback.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to load template source: {0}")]
    Load(#[from] std::io::Error),

    #[error("template syntax error: {0}")]
    Syntax(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("template engine unavailable: {0}")]
    Unavailable(String),
}

/// Narrow contract with a template engine: source text plus variables in,
/// rendered output out.
pub trait TemplateEngine: Send + Sync {
    /// Engine name for diagnostics.
    fn name(&self) -> &'static str;

    /// Render `source` with `variables`.
    fn render(&self, source: &str, variables: &Variables) -> Result<EngineOutput, EngineError>;
}

impl<T: TemplateEngine + ?Sized> TemplateEngine for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn render(&self, source: &str, variables: &Variables) -> Result<EngineOutput, EngineError> {
        (**self).render(source, variables)
    }
}

/// Jinja-style engine backed by `minijinja`.
///
/// Undefined variables are errors, so a template that references a variable
/// the caller did not supply falls back to substitution.
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Create an engine with strict undefined handling.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_recursion_limit(RECURSION_DEPTH_MAX);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        Self { env }
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn name(&self) -> &'static str {
        "minijinja"
    }

    fn render(&self, source: &str, variables: &Variables) -> Result<EngineOutput, EngineError> {
        self.env
            .render_str(source, variables)
            .map(EngineOutput::Text)
            .map_err(|e| match e.kind() {
                ErrorKind::SyntaxError => EngineError::Syntax(e.to_string()),
                _ => EngineError::Render(e.to_string()),
            })
    }
}

/// Engine that always fails, forcing naive substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEngine;

impl TemplateEngine for DisabledEngine {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn render(&self, _source: &str, _variables: &Variables) -> Result<EngineOutput, EngineError> {
        Err(EngineError::Unavailable("engine disabled".to_string()))
    }
}
