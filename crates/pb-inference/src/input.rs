//! Prompt input normalization.
//!
//! The client accepts either a single string or a list of fragments.
//! Fragments are joined with newlines before they reach the process.

/// Prompt handed to the inference client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptInput {
    /// A complete prompt
    Text(String),
    /// Pieces of a prompt, joined with `\n`
    Fragments(Vec<String>),
}

impl PromptInput {
    /// Name of the input shape, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PromptInput::Text(_) => "text",
            PromptInput::Fragments(_) => "fragments",
        }
    }

    /// Normalize into the text written to the process.
    pub fn into_text(self) -> String {
        match self {
            PromptInput::Text(text) => text,
            PromptInput::Fragments(parts) => parts.join("\n"),
        }
    }
}

impl From<String> for PromptInput {
    fn from(text: String) -> Self {
        PromptInput::Text(text)
    }
}

impl From<&str> for PromptInput {
    fn from(text: &str) -> Self {
        PromptInput::Text(text.to_string())
    }
}

impl From<&String> for PromptInput {
    fn from(text: &String) -> Self {
        PromptInput::Text(text.clone())
    }
}

impl From<Vec<String>> for PromptInput {
    fn from(parts: Vec<String>) -> Self {
        PromptInput::Fragments(parts)
    }
}

impl From<&[&str]> for PromptInput {
    fn from(parts: &[&str]) -> Self {
        PromptInput::Fragments(parts.iter().map(|p| p.to_string()).collect())
    }
}

/// First `max_chars` characters of a prompt, for log previews.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
