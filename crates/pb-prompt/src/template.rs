//! Template file rendering with a substitution fallback.
//!
//! The primary path reads the file and hands it to the engine. Any engine
//! failure (including an unreadable file) switches to the fallback, which
//! re-reads the file and replaces each literal `{key}` with its value. The
//! engine's own `{{ key }}` form is replaced too, so engine templates still
//! carry the user's input when the engine is unavailable.
//! Nothing is cached: every call goes back to disk.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::engine::{EngineError, MiniJinjaEngine, TemplateEngine};

/// Named template variables. Ordered so substitution is deterministic.
pub type Variables = BTreeMap<String, String>;

/// Which path produced the rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPath {
    /// Template engine succeeded
    Engine,
    /// Naive placeholder substitution
    Fallback,
}

/// Rendered prompt text and how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Rendered prompt
    pub text: String,
    /// Path that produced `text`
    pub path: RenderPath,
    /// Engine failure that triggered the fallback
    pub engine_error: Option<String>,
    /// Placeholders replaced by the fallback (0 on the engine path)
    pub placeholders_replaced: usize,
}

impl RenderOutcome {
    /// Whether the fallback produced this outcome.
    pub fn used_fallback(&self) -> bool {
        self.path == RenderPath::Fallback
    }
}

/// Fatal rendering failure: the fallback could not read the file either.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Renders prompt template files through an engine.
pub struct TemplateRenderer<E = MiniJinjaEngine> {
    engine: E,
}

impl TemplateRenderer<MiniJinjaEngine> {
    /// Renderer backed by `minijinja`.
    pub fn with_defaults() -> Self {
        Self::new(MiniJinjaEngine::new())
    }
}

impl<E: TemplateEngine> TemplateRenderer<E> {
    /// Create a renderer over the given engine.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Name of the underlying engine.
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Render the template at `path` with `variables`.
    ///
    /// Only a missing or unreadable file on the fallback path is an error.
    pub fn render(&self, path: &Path, variables: &Variables) -> Result<RenderOutcome, TemplateError> {
        match self.render_with_engine(path, variables) {
            Ok(text) => Ok(RenderOutcome {
                text,
                path: RenderPath::Engine,
                engine_error: None,
                placeholders_replaced: 0,
            }),
            Err(err) => {
                tracing::warn!(
                    engine = self.engine.name(),
                    template = %path.display(),
                    error = %err,
                    "template engine failed, using substitution fallback"
                );
                let (text, placeholders_replaced) = render_fallback(path, variables)?;
                if placeholders_replaced == 0 && !variables.is_empty() {
                    tracing::warn!(
                        template = %path.display(),
                        "substitution fallback found no placeholders; prompt carries no variables"
                    );
                }
                Ok(RenderOutcome {
                    text,
                    path: RenderPath::Fallback,
                    engine_error: Some(err.to_string()),
                    placeholders_replaced,
                })
            }
        }
    }

    fn render_with_engine(&self, path: &Path, variables: &Variables) -> Result<String, EngineError> {
        let source = std::fs::read_to_string(path)?;
        let output = self.engine.render(&source, variables)?;
        Ok(output.into_text())
    }
}

/// Re-read the file and substitute placeholders, counting replacements.
fn render_fallback(path: &Path, variables: &Variables) -> Result<(String, usize), TemplateError> {
    let source = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => TemplateError::NotFound {
            path: path.to_path_buf(),
        },
        _ => TemplateError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    Ok(substitute_counted(&source, variables))
}

/// Replace every literal `{key}`, `{{ key }}` and `{{key}}` with its value.
/// Unknown placeholders stay.
pub fn substitute(template: &str, variables: &Variables) -> String {
    substitute_counted(template, variables).0
}

fn substitute_counted(template: &str, variables: &Variables) -> (String, usize) {
    let mut text = template.to_string();
    let mut replaced = 0;
    for (key, value) in variables {
        // Engine forms first so `{key}` never splits a `{{key}}`.
        for placeholder in [
            format!("{{{{ {key} }}}}"),
            format!("{{{{{key}}}}}"),
            format!("{{{key}}}"),
        ] {
            let count = text.matches(placeholder.as_str()).count();
            if count > 0 {
                text = text.replace(&placeholder, value);
                replaced += count;
            }
        }
    }
    (text, replaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DisabledEngine;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn template_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_substitute_leaves_unknown_placeholders() {
        let text = substitute(
            "Q: {user_input} / {other} / {user_input}",
            &vars(&[("user_input", "Hello")]),
        );
        assert_eq!(text, "Q: Hello / {other} / Hello");
    }

    #[test]
    fn test_substitute_replaces_engine_placeholders() {
        let text = substitute(
            "A: {{ user_input }} B: {{user_input}} C: {user_input} D: {{ other }}",
            &vars(&[("user_input", "Hello")]),
        );
        assert_eq!(text, "A: Hello B: Hello C: Hello D: {{ other }}");
    }

    #[test]
    fn test_fallback_counts_replacements() {
        let renderer = TemplateRenderer::new(DisabledEngine);

        let file = template_file("Q: {{ user_input }} / {user_input}");
        let outcome = renderer
            .render(file.path(), &vars(&[("user_input", "Hello")]))
            .unwrap();
        assert_eq!(outcome.text, "Q: Hello / Hello");
        assert_eq!(outcome.placeholders_replaced, 2);

        let file = template_file("no placeholders here");
        let outcome = renderer
            .render(file.path(), &vars(&[("user_input", "Hello")]))
            .unwrap();
        assert!(outcome.used_fallback());
        assert_eq!(outcome.placeholders_replaced, 0);
        assert_eq!(outcome.text, "no placeholders here");
    }

    #[test]
    fn test_engine_path() {
        let file = template_file("Answer: {{ user_input }}\n");
        let renderer = TemplateRenderer::with_defaults();
        let outcome = renderer
            .render(file.path(), &vars(&[("user_input", "What is AI?")]))
            .unwrap();
        assert_eq!(outcome.path, RenderPath::Engine);
        assert_eq!(outcome.text, "Answer: What is AI?\n");
        assert!(outcome.engine_error.is_none());
    }

    #[test]
    fn test_disabled_engine_falls_back_to_substitution() {
        let file = template_file("User said {user_input}. Keep {other}.");
        let renderer = TemplateRenderer::new(DisabledEngine);
        let outcome = renderer
            .render(file.path(), &vars(&[("user_input", "Hello")]))
            .unwrap();
        assert!(outcome.used_fallback());
        assert_eq!(outcome.text, "User said Hello. Keep {other}.");
        assert!(outcome.engine_error.unwrap().contains("unavailable"));
    }

    #[test]
    fn test_engine_error_falls_back() {
        // Strict undefined: `other` is not supplied, so the engine fails.
        let file = template_file("{{ other }} {user_input}");
        let renderer = TemplateRenderer::with_defaults();
        let outcome = renderer
            .render(file.path(), &vars(&[("user_input", "Hello")]))
            .unwrap();
        assert_eq!(outcome.path, RenderPath::Fallback);
        assert_eq!(outcome.text, "{{ other }} Hello");
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.prompt");
        let renderer = TemplateRenderer::with_defaults();
        let err = renderer.render(&path, &Variables::new()).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound { .. }));
        assert!(err.to_string().contains("absent.prompt"));
    }

    #[test]
    fn test_every_call_rereads_file() {
        let file = template_file("first {{ user_input }}");
        let renderer = TemplateRenderer::with_defaults();
        let variables = vars(&[("user_input", "x")]);
        assert_eq!(renderer.render(file.path(), &variables).unwrap().text, "first x");

        std::fs::write(file.path(), "second {{ user_input }}").unwrap();
        assert_eq!(renderer.render(file.path(), &variables).unwrap().text, "second x");
    }
}
