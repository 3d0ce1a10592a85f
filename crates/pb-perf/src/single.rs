//! Metrics for a single prompt path run on its own.

use std::fmt::Write as _;

use pb_core::PathRun;
use serde::Serialize;

use crate::report::millis;

/// Timing and size of one path, with the share spent building the prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinglePathMetrics {
    pub processing_ms: f64,
    pub inference_ms: f64,
    pub total_ms: f64,
    pub prompt_chars: usize,
    pub response_chars: usize,
    /// `processing / total * 100`; 0 when total is 0
    pub processing_share_percent: f64,
}

impl SinglePathMetrics {
    /// Derive metrics for a path run.
    pub fn from_run(run: &PathRun) -> Self {
        let processing_ms = millis(run.prompt.construction_duration);
        let total_ms = millis(run.total_duration());
        let processing_share_percent = if total_ms > 0.0 {
            processing_ms / total_ms * 100.0
        } else {
            0.0
        };

        Self {
            processing_ms,
            inference_ms: millis(run.result.duration),
            total_ms,
            prompt_chars: run.prompt.char_count(),
            response_chars: run.result.char_count(),
            processing_share_percent,
        }
    }

    /// Format as console text.
    pub fn format_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "📊 Query Metrics:");
        let _ = writeln!(out, "   Template processing: {:.1}ms", self.processing_ms);
        let _ = writeln!(out, "   LLM inference:       {:.1}ms", self.inference_ms);
        let _ = writeln!(out, "   Total time:          {:.1}ms", self.total_ms);
        let _ = writeln!(out, "   Prompt length:       {} chars", self.prompt_chars);
        let _ = writeln!(out, "   Response length:     {} chars", self.response_chars);
        let _ = writeln!(out, "   Processing share:    {:.1}%", self.processing_share_percent);
        out
    }
}
