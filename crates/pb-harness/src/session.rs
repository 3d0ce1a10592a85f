//! Conversation history for the web UI.

use pb_core::ComparisonRecord;
use pb_perf::ComparisonReport;
use pb_prompt::RawPromptStyle;
use serde::Serialize;
use std::path::PathBuf;

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEntry {
    /// Both paths ran; the report is derived once when the entry is added
    Comparison {
        record: ComparisonRecord,
        report: ComparisonReport,
    },
    /// The request ended before a record was produced
    Failed { query: String, error: String },
}

impl SessionEntry {
    /// Entry for a completed comparison.
    pub fn comparison(record: ComparisonRecord) -> Self {
        let report = ComparisonReport::from_record(&record);
        SessionEntry::Comparison { record, report }
    }

    /// The user query for this turn.
    pub fn query(&self) -> &str {
        match self {
            SessionEntry::Comparison { record, .. } => &record.query,
            SessionEntry::Failed { query, .. } => query,
        }
    }
}

/// Append-only history of a UI session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionLog {
    entries: Vec<SessionEntry>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: SessionEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Display and prompt choices made in the UI sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiSettings {
    /// Template used for the templated path
    pub template_path: PathBuf,
    pub raw_style: RawPromptStyle,
    /// Show the timing table under each turn
    pub show_metrics: bool,
    /// Show both full prompts under each turn
    pub show_prompts: bool,
}

/// Mutable state of the single UI session.
#[derive(Debug, Clone)]
pub struct UiSession {
    pub log: SessionLog,
    pub settings: UiSettings,
}

impl UiSession {
    pub fn new(settings: UiSettings) -> Self {
        Self {
            log: SessionLog::new(),
            settings,
        }
    }

    /// Start a fresh history, keeping the settings.
    pub fn clear(&mut self) {
        self.log = SessionLog::new();
    }
}
