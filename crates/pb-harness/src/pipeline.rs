//! Timed comparison of the templated and raw prompt paths.
//!
//! For each path the pipeline takes three readings from one clock:
//!
//! ```text
//! start ── construct prompt ── built ── inference ── finished
//! ```
//!
//! so `total = construction + inference = finished - start` exactly. The
//! paths run strictly one after the other; the raw path's inference never
//! overlaps the templated path's.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pb_core::{Clock, ComparisonRecord, MonotonicClock, PathRun, RenderedPrompt};
use pb_inference::InferenceClient;
use pb_prompt::{
    DisabledEngine, MiniJinjaEngine, RawPromptBuilder, RawPromptStyle, TemplateEngine,
    TemplateError, TemplateRenderer, Variables,
};

use crate::config::HarnessConfig;

/// Template variable that receives the user's input.
pub const USER_INPUT_VAR: &str = "user_input";

/// Per-request choices for the two paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathOptions {
    /// Template file for the templated path
    pub template_path: PathBuf,
    /// Shape of the raw prompt
    pub raw_style: RawPromptStyle,
}

/// Fatal pipeline errors. Inference failures are not errors; they are
/// carried inside the record.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Runs both prompt paths for a query and records their timings.
pub struct ComparisonPipeline {
    renderer: TemplateRenderer<Box<dyn TemplateEngine>>,
    client: InferenceClient,
    clock: Arc<dyn Clock>,
    options: PathOptions,
}

impl ComparisonPipeline {
    /// Create a pipeline timed by the monotonic clock.
    pub fn new(
        renderer: TemplateRenderer<Box<dyn TemplateEngine>>,
        client: InferenceClient,
        options: PathOptions,
    ) -> Self {
        Self {
            renderer,
            client,
            clock: Arc::new(MonotonicClock::new()),
            options,
        }
    }

    /// Build the pipeline described by a harness config.
    pub fn from_config(config: &HarnessConfig) -> Self {
        let engine: Box<dyn TemplateEngine> = if config.substitution_only {
            Box::new(DisabledEngine)
        } else {
            Box::new(MiniJinjaEngine::new())
        };

        Self::new(
            TemplateRenderer::new(engine),
            InferenceClient::new(config.inference.clone()),
            PathOptions {
                template_path: config.template_path.clone(),
                raw_style: config.raw_style,
            },
        )
    }

    /// Replace the clock used for all timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Default path options.
    pub fn options(&self) -> &PathOptions {
        &self.options
    }

    /// Name of the template engine in use.
    pub fn engine_name(&self) -> &'static str {
        self.renderer.engine_name()
    }

    /// Model passed to the inference process.
    pub fn model(&self) -> &str {
        &self.client.config().model
    }

    /// Compare both paths with the default options.
    pub async fn compare(&self, user_input: &str) -> Result<ComparisonRecord, PipelineError> {
        self.compare_with(user_input, &self.options).await
    }

    /// Compare both paths with explicit options.
    ///
    /// Fails only when the template file cannot be read on either render
    /// path. Inference failures on either side leave the other side intact.
    pub async fn compare_with(
        &self,
        user_input: &str,
        options: &PathOptions,
    ) -> Result<ComparisonRecord, PipelineError> {
        tracing::info!(query = user_input, "running comparison");

        let templated = self.run_templated_with(user_input, &options.template_path).await?;
        let raw = self.run_raw_with(user_input, options.raw_style).await;

        let record = ComparisonRecord::new(user_input, templated, raw);
        tracing::debug!(
            templated_total = ?record.total_duration_templated,
            raw_total = ?record.total_duration_raw,
            "comparison complete"
        );
        Ok(record)
    }

    /// Run only the templated path with the default template.
    pub async fn run_templated(&self, user_input: &str) -> Result<PathRun, PipelineError> {
        self.run_templated_with(user_input, &self.options.template_path).await
    }

    /// Run only the raw path with the default style.
    pub async fn run_raw(&self, user_input: &str) -> PathRun {
        self.run_raw_with(user_input, self.options.raw_style).await
    }

    async fn run_templated_with(
        &self,
        user_input: &str,
        template_path: &Path,
    ) -> Result<PathRun, PipelineError> {
        let start = self.clock.now();
        let mut variables = Variables::new();
        variables.insert(USER_INPUT_VAR.to_string(), user_input.to_string());
        let outcome = self.renderer.render(template_path, &variables)?;
        let built = self.clock.now();

        let used_fallback = outcome.used_fallback();
        let prompt = RenderedPrompt::templated(outcome.text, built.saturating_sub(start), used_fallback);
        Ok(self.infer(prompt, built).await)
    }

    async fn run_raw_with(&self, user_input: &str, style: RawPromptStyle) -> PathRun {
        let start = self.clock.now();
        let text = RawPromptBuilder::new(style).build(user_input);
        let built = self.clock.now();

        let prompt = RenderedPrompt::raw(text, built.saturating_sub(start));
        self.infer(prompt, built).await
    }

    async fn infer(&self, prompt: RenderedPrompt, built: std::time::Duration) -> PathRun {
        let result = self.client.query(&prompt.text).await;
        let finished = self.clock.now();

        if result.failed {
            tracing::warn!(
                source = %prompt.source,
                error = result.error_message.as_deref().unwrap_or("unknown"),
                "inference failed"
            );
        }

        PathRun {
            prompt,
            result: result.with_duration(finished.saturating_sub(built)),
        }
    }
}
