//! Per-query comparison report.

use std::fmt::Write as _;
use std::time::Duration;

use pb_core::{ComparisonRecord, PathRun};
use serde::Serialize;

/// Characters of each prompt shown in the report.
pub const PROMPT_PREVIEW_CHARS_MAX: usize = 200;
/// Characters of each response shown in the report.
pub const RESPONSE_PREVIEW_CHARS_MAX: usize = 100;
/// Overhead above this percentage is significant.
pub const SIGNIFICANT_OVERHEAD_PERCENT: f64 = 5.0;

const RULE_WIDTH: usize = 60;

/// Convert a duration to fractional milliseconds.
pub fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Relative cost of the templated path over the raw path, in percent.
///
/// `(templated - raw) / raw * 100`, or 0 when `raw` is zero. Used for both
/// per-query reports and batch summaries.
pub fn overhead_percent(templated_ms: f64, raw_ms: f64) -> f64 {
    if raw_ms <= 0.0 {
        return 0.0;
    }
    (templated_ms - raw_ms) / raw_ms * 100.0
}

/// Qualitative band for an overhead percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverheadBand {
    /// More than 5%
    SignificantOverhead,
    /// Above 0% up to and including 5%
    MinorOverhead,
    /// 0% or less
    ComparableOrFaster,
}

impl OverheadBand {
    /// Classify a percentage. `> 5` is significant, `> 0` is minor.
    pub fn from_percent(percent: f64) -> Self {
        if percent > SIGNIFICANT_OVERHEAD_PERCENT {
            OverheadBand::SignificantOverhead
        } else if percent > 0.0 {
            OverheadBand::MinorOverhead
        } else {
            OverheadBand::ComparableOrFaster
        }
    }

    /// Short label.
    pub fn label(&self) -> &'static str {
        match self {
            OverheadBand::SignificantOverhead => "significant overhead",
            OverheadBand::MinorOverhead => "minor overhead",
            OverheadBand::ComparableOrFaster => "comparable or faster",
        }
    }

    /// One-line verdict for console output.
    pub fn verdict(&self) -> &'static str {
        match self {
            OverheadBand::SignificantOverhead => "❌ Templating adds significant overhead",
            OverheadBand::MinorOverhead => "⚠️  Templating adds minor overhead",
            OverheadBand::ComparableOrFaster => "✅ Templating is comparable or faster",
        }
    }
}

/// Stage timings for one path, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageTimes {
    pub processing_ms: f64,
    pub inference_ms: f64,
    pub total_ms: f64,
}

/// Display-ready view of one path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathView {
    pub times: StageTimes,
    pub prompt_chars: usize,
    pub response_chars: usize,
    pub prompt_preview: String,
    pub response_preview: String,
    /// Full prompt text
    pub prompt: String,
    /// Full response, or the failure description
    pub response: String,
    /// Failure description when inference failed
    pub error: Option<String>,
    pub used_fallback: bool,
}

impl PathView {
    fn new(run: &PathRun, total: Duration) -> Self {
        Self {
            times: StageTimes {
                processing_ms: millis(run.prompt.construction_duration),
                inference_ms: millis(run.result.duration),
                total_ms: millis(total),
            },
            prompt_chars: run.prompt.char_count(),
            response_chars: run.result.char_count(),
            prompt_preview: truncate(&run.prompt.text, PROMPT_PREVIEW_CHARS_MAX),
            response_preview: truncate(run.result.display_text(), RESPONSE_PREVIEW_CHARS_MAX),
            prompt: run.prompt.text.clone(),
            response: run.result.display_text().to_string(),
            error: run.result.error_message.clone(),
            used_fallback: run.prompt.used_fallback,
        }
    }
}

/// Comparison of both paths for one query, with derived differences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub query: String,
    pub templated: PathView,
    pub raw: PathView,
    /// Templated minus raw
    pub processing_diff_ms: f64,
    pub inference_diff_ms: f64,
    pub total_diff_ms: f64,
    pub overhead_percent: f64,
    pub band: OverheadBand,
}

impl ComparisonReport {
    /// Derive the report for a record.
    pub fn from_record(record: &ComparisonRecord) -> Self {
        let templated = PathView::new(&record.templated, record.total_duration_templated);
        let raw = PathView::new(&record.raw, record.total_duration_raw);

        let total_diff_ms = templated.times.total_ms - raw.times.total_ms;
        let overhead = overhead_percent(templated.times.total_ms, raw.times.total_ms);

        Self {
            query: record.query.clone(),
            processing_diff_ms: templated.times.processing_ms - raw.times.processing_ms,
            inference_diff_ms: templated.times.inference_ms - raw.times.inference_ms,
            total_diff_ms,
            overhead_percent: overhead,
            band: OverheadBand::from_percent(overhead),
            templated,
            raw,
        }
    }

    /// Signed difference in prompt length (templated minus raw).
    pub fn prompt_length_diff(&self) -> i64 {
        self.templated.prompt_chars as i64 - self.raw.prompt_chars as i64
    }

    /// Signed difference in response length (templated minus raw).
    pub fn response_length_diff(&self) -> i64 {
        self.templated.response_chars as i64 - self.raw.response_chars as i64
    }

    /// Format as console text.
    pub fn format_text(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "📊 PERFORMANCE COMPARISON: {:?}", self.query);
        let _ = writeln!(out, "{rule}");

        let _ = writeln!(out, "\n⏱️  TIMING BREAKDOWN:");
        let _ = writeln!(
            out,
            "{:<20} {:>12} {:>12} {:>14}",
            "Metric", "TEMPLATED", "RAW", "Difference"
        );
        let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
        let rows = [
            (
                "Processing",
                self.templated.times.processing_ms,
                self.raw.times.processing_ms,
                self.processing_diff_ms,
            ),
            (
                "LLM Inference",
                self.templated.times.inference_ms,
                self.raw.times.inference_ms,
                self.inference_diff_ms,
            ),
            (
                "Total Time",
                self.templated.times.total_ms,
                self.raw.times.total_ms,
                self.total_diff_ms,
            ),
        ];
        for (metric, templated, raw, diff) in rows {
            let _ = writeln!(
                out,
                "{metric:<20} {:>10.1}ms {:>10.1}ms {:>+12.1}ms",
                templated, raw, diff
            );
        }

        let _ = writeln!(out, "\n💡 PERFORMANCE IMPACT:");
        let _ = writeln!(
            out,
            "   Template overhead: {:+.1}ms ({:+.1}%)",
            self.total_diff_ms, self.overhead_percent
        );
        let _ = writeln!(out, "   {}", self.band.verdict());

        let _ = writeln!(out, "\n📝 PROMPT ANALYSIS:");
        let _ = writeln!(out, "   Templated prompt length: {} characters", self.templated.prompt_chars);
        let _ = writeln!(out, "   Raw prompt length:       {} characters", self.raw.prompt_chars);
        let _ = writeln!(out, "   Length difference:       {:+} characters", self.prompt_length_diff());
        if self.templated.used_fallback {
            let _ = writeln!(out, "   Templated prompt used the substitution fallback");
        }

        let _ = writeln!(out, "\n💬 RESPONSE ANALYSIS:");
        let _ = writeln!(out, "   Templated response: {} characters", self.templated.response_chars);
        let _ = writeln!(out, "   Raw response:       {} characters", self.raw.response_chars);
        let _ = writeln!(out, "   Length difference:  {:+} characters", self.response_length_diff());

        let _ = writeln!(out, "\n📋 PROMPTS USED:");
        let _ = writeln!(out, "   Templated: {:?}...", self.templated.prompt_preview);
        let _ = writeln!(out, "   Raw:       {:?}...", self.raw.prompt_preview);

        let _ = writeln!(out, "\n🤖 RESPONSES:");
        let _ = writeln!(out, "   Templated: {}", response_line(&self.templated));
        let _ = writeln!(out, "   Raw:       {}", response_line(&self.raw));

        out
    }
}

fn response_line(view: &PathView) -> String {
    match view.error {
        Some(ref error) => format!("[error] {error}"),
        None => format!("{}...", view.response_preview),
    }
}

/// First `max_chars` characters of `text`.
pub fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
