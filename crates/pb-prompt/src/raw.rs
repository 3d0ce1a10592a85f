//! Hand-built prompts, no template engine involved.
//!
//! Input is classified as a greeting or a substantive question and one of
//! two fixed prompt shapes is emitted. Output is a pure function of the
//! input and the style.

use serde::{Deserialize, Serialize};

/// Phrases that mark an input as a greeting (case-insensitive substring match).
pub const GREETING_PHRASES: [&str; 10] = [
    "hi",
    "hello",
    "hey",
    "sup",
    "what's up",
    "good morning",
    "good afternoon",
    "good evening",
    "how are you",
    "howdy",
];

/// Shorter phrase list used by the concise style.
pub const CONCISE_GREETING_PHRASES: [&str; 5] = ["hi", "hello", "hey", "sup", "good morning"];

/// Inputs longer than this many words are never greetings.
pub const GREETING_WORDS_MAX: usize = 3;

/// Section labels of a structured answer, in order.
pub const SECTION_LABELS: [&str; 5] = [
    "Direct Answer",
    "Explanation",
    "Examples",
    "Additional Insights",
    "Summary",
];

/// Shape of the non-template prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawPromptStyle {
    /// Five labelled sections with length guidance
    #[default]
    Structured,
    /// One-line instruction, greetings matched against
    /// [`CONCISE_GREETING_PHRASES`]
    Concise,
}

impl RawPromptStyle {
    /// Parse a style name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "structured" => Some(RawPromptStyle::Structured),
            "concise" => Some(RawPromptStyle::Concise),
            _ => None,
        }
    }

    /// Phrases that classify an input as a greeting for this style.
    pub fn greeting_phrases(&self) -> &'static [&'static str] {
        match self {
            RawPromptStyle::Structured => &GREETING_PHRASES,
            RawPromptStyle::Concise => &CONCISE_GREETING_PHRASES,
        }
    }

    /// Lower-case style name.
    pub fn name(&self) -> &'static str {
        match self {
            RawPromptStyle::Structured => "structured",
            RawPromptStyle::Concise => "concise",
        }
    }
}

/// Whether `input` is a short greeting.
///
/// Both conditions must hold: a greeting phrase occurs somewhere in the
/// lower-cased input, and the input has at most `GREETING_WORDS_MAX` words.
pub fn is_greeting(input: &str) -> bool {
    matches_greeting(input, &GREETING_PHRASES)
}

fn matches_greeting(input: &str, phrases: &[&str]) -> bool {
    let lowered = input.trim().to_lowercase();
    let has_phrase = phrases.iter().any(|phrase| lowered.contains(phrase));
    has_phrase && input.split_whitespace().count() <= GREETING_WORDS_MAX
}

/// Builds prompts without the template engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawPromptBuilder {
    style: RawPromptStyle,
}

impl RawPromptBuilder {
    /// Create a builder for the given style.
    pub fn new(style: RawPromptStyle) -> Self {
        Self { style }
    }

    /// Style this builder emits.
    pub fn style(&self) -> RawPromptStyle {
        self.style
    }

    /// Build the prompt for `user_input`.
    pub fn build(&self, user_input: &str) -> String {
        let greeting = matches_greeting(user_input, self.style.greeting_phrases());
        match (self.style, greeting) {
            (RawPromptStyle::Structured, true) => structured_greeting(user_input),
            (RawPromptStyle::Structured, false) => structured_question(user_input),
            (RawPromptStyle::Concise, true) => format!(
                "You are a friendly assistant. The user said: '{user_input}' - respond with a brief, friendly greeting and ask how you can help."
            ),
            (RawPromptStyle::Concise, false) => {
                format!("You are a helpful assistant. Answer this question clearly: {user_input}")
            }
        }
    }
}

fn structured_greeting(user_input: &str) -> String {
    format!(
        r#"You are a friendly, helpful assistant.

The user has sent a greeting: "{user_input}"

Respond with a warm, friendly greeting and ask how you can help them today.
Keep your response brief and welcoming (1-2 sentences maximum).
Do not provide structured analysis or detailed explanations.
"#
    )
}

fn structured_question(user_input: &str) -> String {
    let [direct, explanation, examples, insights, summary] = SECTION_LABELS;
    format!(
        r#"You are an expert assistant with expertise across multiple domains.
Your responses should be comprehensive, well-structured, and educational.

Analyze the user's question: "{user_input}" and provide a thorough, educational response.

Follow these guidelines:
- Use clear, professional language appropriate for the topic complexity
- Include at least 2-3 specific examples when relevant
- Provide actionable insights or recommendations
- Keep each section focused and well-organized
- Target approximately 300-500 words for comprehensive coverage

Please structure your response as follows:

**{direct}:** [A concise, direct answer to the question]

**{explanation}:** [Detailed context, background, and how/why information]

**{examples}:** [2-3 relevant, specific examples or use cases]

**{insights}:** [Recommendations, tips, or related considerations]

**{summary}:** [1-2 sentences capturing the key takeaway]
"#
    )
}
