//! Records produced while comparing the two prompt paths.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// A single user query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptRequest {
    /// Free text typed by the user
    pub user_input: String,
}

impl PromptRequest {
    /// Create a request from user input.
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
        }
    }
}

/// Which construction path produced a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PromptSource {
    /// Template file rendered with variables
    Templated,
    /// Hand-built string
    Raw,
}

impl PromptSource {
    /// Short label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            PromptSource::Templated => "TEMPLATED",
            PromptSource::Raw => "RAW",
        }
    }
}

impl fmt::Display for PromptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A constructed prompt and how long it took to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPrompt {
    /// Path that produced the prompt
    pub source: PromptSource,
    /// Final prompt text
    pub text: String,
    /// Time spent building the prompt
    pub construction_duration: Duration,
    /// True when the template engine failed and naive substitution was used
    pub used_fallback: bool,
}

impl RenderedPrompt {
    /// Prompt built by the template path.
    pub fn templated(text: String, construction_duration: Duration, used_fallback: bool) -> Self {
        Self {
            source: PromptSource::Templated,
            text,
            construction_duration,
            used_fallback,
        }
    }

    /// Prompt built by the raw path.
    pub fn raw(text: String, construction_duration: Duration) -> Self {
        Self {
            source: PromptSource::Raw,
            text,
            construction_duration,
            used_fallback: false,
        }
    }

    /// Prompt length in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Outcome of one inference call.
///
/// Failures are values, not errors: a failed call still carries its duration
/// and a description for inline display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferenceResult {
    /// Model response (empty when failed)
    pub text: String,
    /// Time spent waiting for the model
    pub duration: Duration,
    /// Whether the call failed
    pub failed: bool,
    /// Failure description
    pub error_message: Option<String>,
}

impl InferenceResult {
    /// Create a successful result.
    #[must_use]
    pub fn success(text: impl Into<String>, duration: Duration) -> Self {
        Self {
            text: text.into(),
            duration,
            failed: false,
            error_message: None,
        }
    }

    /// Create a failed result.
    #[must_use]
    pub fn failure(message: impl Into<String>, duration: Duration) -> Self {
        let message = message.into();
        debug_assert!(!message.is_empty(), "Failure message must not be empty");

        Self {
            text: String::new(),
            duration,
            failed: true,
            error_message: Some(message),
        }
    }

    /// Replace the duration with one measured by another clock.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Response text, or the failure description.
    pub fn display_text(&self) -> &str {
        if self.failed {
            self.error_message.as_deref().unwrap_or("unknown error")
        } else {
            &self.text
        }
    }

    /// Response length in characters (0 when failed).
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Prompt and inference result for one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathRun {
    pub prompt: RenderedPrompt,
    pub result: InferenceResult,
}

impl PathRun {
    /// Construction plus inference time.
    pub fn total_duration(&self) -> Duration {
        self.prompt.construction_duration + self.result.duration
    }
}

/// Side-by-side comparison of both paths for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRecord {
    /// The user query both paths answered
    pub query: String,
    /// Template path
    pub templated: PathRun,
    /// Raw path
    pub raw: PathRun,
    /// Span from first to last timestamp of the templated path
    pub total_duration_templated: Duration,
    /// Span from first to last timestamp of the raw path
    pub total_duration_raw: Duration,
}

impl ComparisonRecord {
    /// Assemble a record; totals are derived from each path's stages.
    pub fn new(query: impl Into<String>, templated: PathRun, raw: PathRun) -> Self {
        debug_assert_eq!(templated.prompt.source, PromptSource::Templated);
        debug_assert_eq!(raw.prompt.source, PromptSource::Raw);

        let total_duration_templated = templated.total_duration();
        let total_duration_raw = raw.total_duration();
        Self {
            query: query.into(),
            templated,
            raw,
            total_duration_templated,
            total_duration_raw,
        }
    }

    /// Whether either inference call failed.
    pub fn any_failed(&self) -> bool {
        self.templated.result.failed || self.raw.result.failed
    }
}
