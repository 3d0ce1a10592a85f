//! Blocking-style inference through an external process.
//!
//! Runs `<program> <args...> <model>`, writes the prompt to stdin and reads
//! the response from stdout. Every failure mode becomes a failed
//! `InferenceResult`; nothing is propagated to the caller.

use std::io::ErrorKind;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use pb_core::InferenceResult;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::input::{preview, PromptInput};

/// Characters of the prompt included in the per-call diagnostic.
pub const PREVIEW_CHARS_MAX: usize = 100;

/// Inference process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceConfig {
    /// Executable to run
    pub program: String,
    /// Arguments placed before the model identifier
    pub args: Vec<String>,
    /// Model identifier, passed as the last argument
    pub model: String,
    /// Upper bound on a single call
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self::ollama("mistral")
    }
}

impl InferenceConfig {
    /// `ollama run <model>` with a five minute bound.
    pub fn ollama(model: impl Into<String>) -> Self {
        Self {
            program: "ollama".to_string(),
            args: vec!["run".to_string()],
            model: model.into(),
            timeout: Duration::from_secs(300),
        }
    }

    /// Arbitrary command line; the model is still appended last.
    pub fn command(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reject configurations that can never succeed.
    pub fn validate(&self) -> Result<(), InferenceConfigError> {
        if self.program.trim().is_empty() {
            return Err(InferenceConfigError::EmptyProgram);
        }
        if self.model.trim().is_empty() {
            return Err(InferenceConfigError::EmptyModel);
        }
        if self.timeout.is_zero() {
            return Err(InferenceConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Invalid inference configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceConfigError {
    #[error("inference program must not be empty")]
    EmptyProgram,

    #[error("model identifier must not be empty")]
    EmptyModel,

    #[error("inference timeout must be greater than zero")]
    ZeroTimeout,
}

/// Client for a locally hosted model driven through a subprocess.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    config: InferenceConfig,
}

impl InferenceClient {
    /// Create a client with the given config.
    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    /// Get the current config.
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Send a prompt and wait for the response.
    ///
    /// Output is decoded lossily and trimmed. Non-zero exit, spawn errors and
    /// timeouts all produce a failed result.
    pub async fn query(&self, prompt: impl Into<PromptInput>) -> InferenceResult {
        let input = prompt.into();
        let input_kind = input.kind();
        let text = input.into_text();

        tracing::debug!(
            model = %self.config.model,
            input_kind,
            preview = ?preview(&text, PREVIEW_CHARS_MAX),
            "sending prompt to inference process"
        );

        let start = Instant::now();
        let result = tokio::time::timeout(self.config.timeout, self.run_process(&text)).await;
        let duration = start.elapsed();

        match result {
            Ok(Ok(output)) => {
                if output.status.success() {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    InferenceResult::success(stdout.trim(), duration)
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    tracing::warn!(
                        status = %output.status,
                        stderr = %stderr.trim(),
                        "inference process failed"
                    );
                    InferenceResult::failure(
                        format!("inference process exited with {}", output.status),
                        duration,
                    )
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(program = %self.config.program, error = %e, "failed to run inference process");
                InferenceResult::failure(
                    format!("failed to run {}: {}", self.config.program, e),
                    duration,
                )
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.config.timeout, "inference process timed out");
                InferenceResult::failure(format!("timed out after {:?}", self.config.timeout), duration)
            }
        }
    }

    async fn run_process(&self, prompt: &str) -> std::io::Result<Output> {
        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .arg(&self.config.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take();
        let write = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(prompt.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };

        let (written, output) = tokio::join!(write, child.wait_with_output());
        match written {
            Ok(()) => {}
            // The process may exit without reading its input.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                tracing::debug!("inference process closed stdin early");
            }
            Err(e) => return Err(e),
        }
        output
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn script(body: &str) -> InferenceClient {
        // `sh -c <body> <model>` binds the model to $0.
        InferenceClient::new(
            InferenceConfig::command("sh", ["-c", body], "mock-model")
                .with_timeout(Duration::from_secs(10)),
        )
    }

    #[tokio::test]
    async fn test_success_output_is_trimmed() {
        let client = script("cat > /dev/null; printf '  the answer  \\n\\n'");
        let result = client.query("What is AI?").await;
        assert!(!result.failed);
        assert_eq!(result.text, "the answer");
        assert!(result.error_message.is_none());
    }

    #[tokio::test]
    async fn test_prompt_reaches_stdin_and_model_is_argument() {
        let client = script("printf '%s:' \"$0\"; cat");
        let result = client.query("hello there").await;
        assert!(!result.failed);
        assert_eq!(result.text, "mock-model:hello there");
    }

    #[tokio::test]
    async fn test_fragments_are_joined() {
        let client = script("cat");
        let result = client
            .query(vec!["line one".to_string(), "line two".to_string()])
            .await;
        assert_eq!(result.text, "line one\nline two");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let client = script("cat > /dev/null; echo 'raw output'; echo 'boom' >&2; exit 3");
        let result = client.query("hi").await;
        assert!(result.failed);
        assert!(result.text.is_empty());
        let message = result.error_message.unwrap();
        assert!(message.contains("inference process exited"));
        assert!(!message.contains("raw output"));
    }

    #[tokio::test]
    async fn test_spawn_error_is_failure() {
        let client = InferenceClient::new(InferenceConfig::command(
            "/nonexistent/promptbench-model-runner",
            Vec::<String>::new(),
            "mock-model",
        ));
        let result = client.query("hi").await;
        assert!(result.failed);
        assert!(result.error_message.unwrap().contains("failed to run"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let client = script("cat > /dev/null; printf 'ok \\377 done'");
        let result = client.query("hi").await;
        assert!(!result.failed);
        assert!(result.text.contains('\u{FFFD}'));
        assert!(result.text.starts_with("ok"));
    }

    #[tokio::test]
    async fn test_timeout_is_failure() {
        let client = InferenceClient::new(
            InferenceConfig::command("sh", ["-c", "sleep 5"], "mock-model")
                .with_timeout(Duration::from_millis(100)),
        );
        let result = client.query("hi").await;
        assert!(result.failed);
        assert!(result.error_message.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_process_ignoring_stdin_succeeds() {
        let client = script("echo ignored-input");
        let result = client.query("x".repeat(1024)).await;
        assert!(!result.failed);
        assert_eq!(result.text, "ignored-input");
    }

    #[test]
    fn test_config_validation() {
        assert!(InferenceConfig::default().validate().is_ok());
        assert_eq!(
            InferenceConfig::command(" ", Vec::<String>::new(), "m").validate(),
            Err(InferenceConfigError::EmptyProgram)
        );
        assert_eq!(
            InferenceConfig::ollama("").validate(),
            Err(InferenceConfigError::EmptyModel)
        );
        assert_eq!(
            InferenceConfig::default()
                .with_timeout(Duration::ZERO)
                .validate(),
            Err(InferenceConfigError::ZeroTimeout)
        );
    }
}
