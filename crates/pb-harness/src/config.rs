//! Harness configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pb_inference::{InferenceConfig, InferenceConfigError};
use pb_prompt::RawPromptStyle;

/// Queries run by the batch mode unless a queries file is given.
pub const DEFAULT_BATCH_QUERIES: [&str; 5] = [
    "hi",
    "What is AI?",
    "Explain machine learning in simple terms",
    "Tell me about the weather today",
    "How do neural networks work?",
];

/// Default chat template, relative to the working directory.
pub const DEFAULT_TEMPLATE: &str = "prompts/chat.prompt";
/// Longer alternative offered by the web UI.
pub const ELABORATE_TEMPLATE: &str = "prompts/elaborate_chat.prompt";
/// Chat template written with `{user_input}` placeholders, for runs without
/// the engine.
pub const PLAIN_TEMPLATE: &str = "prompts/chat_plain.prompt";

/// Everything the front ends need to build a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Inference process settings
    pub inference: InferenceConfig,
    /// Template used by the templated path
    pub template_path: PathBuf,
    /// Templates selectable in the web UI
    pub template_choices: Vec<PathBuf>,
    /// Shape of the raw prompt
    pub raw_style: RawPromptStyle,
    /// Skip the template engine and always substitute
    pub substitution_only: bool,
    /// Queries for batch mode, in order
    pub batch_queries: Vec<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            inference: InferenceConfig::default(),
            template_path: PathBuf::from(DEFAULT_TEMPLATE),
            template_choices: vec![
                PathBuf::from(DEFAULT_TEMPLATE),
                PathBuf::from(ELABORATE_TEMPLATE),
            ],
            raw_style: RawPromptStyle::default(),
            substitution_only: false,
            batch_queries: DEFAULT_BATCH_QUERIES.iter().map(|q| q.to_string()).collect(),
        }
    }
}

impl HarnessConfig {
    /// Short timeout for fast iteration against small models.
    pub fn quick() -> Self {
        Self {
            inference: InferenceConfig::default().with_timeout(Duration::from_secs(30)),
            ..Default::default()
        }
    }

    /// Check the configuration before running anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.inference.validate()?;
        if self.batch_queries.is_empty() {
            return Err(ConfigError::NoBatchQueries);
        }
        Ok(())
    }

    /// Skip the template engine.
    ///
    /// The default template is swapped for [`PLAIN_TEMPLATE`]; an explicitly
    /// chosen template is kept.
    pub fn enable_substitution_only(&mut self) {
        self.substitution_only = true;
        if self.template_path == Path::new(DEFAULT_TEMPLATE) {
            self.template_path = PathBuf::from(PLAIN_TEMPLATE);
        }
    }

    /// Make sure the selected template is among the UI choices.
    pub fn ensure_template_choice(&mut self) {
        if !self.template_choices.contains(&self.template_path) {
            self.template_choices.insert(0, self.template_path.clone());
        }
    }
}

/// Read batch queries from a file, one per line. Blank lines are skipped.
pub fn load_queries(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::QueriesFile {
        path: path.to_path_buf(),
        source,
    })?;
    let queries: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if queries.is_empty() {
        return Err(ConfigError::NoBatchQueries);
    }
    Ok(queries)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Inference(#[from] InferenceConfigError),

    #[error("batch mode needs at least one query")]
    NoBatchQueries,

    #[error("failed to read queries file {}: {source}", path.display())]
    QueriesFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown raw prompt style: {0} (expected structured or concise)")]
    UnknownRawStyle(String),
}
