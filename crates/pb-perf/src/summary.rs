//! Aggregate statistics over a batch of comparisons.

use std::fmt::Write as _;

use pb_core::ComparisonRecord;
use serde::Serialize;

use crate::report::{millis, overhead_percent};
use crate::stats::{mean, sample_std_dev};

/// Read-only aggregate over a sequence of comparison records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Number of records summarized
    pub query_count: u64,
    /// Records where at least one inference call failed
    pub failed_count: u64,
    pub mean_total_templated_ms: f64,
    pub mean_total_raw_ms: f64,
    pub mean_processing_templated_ms: f64,
    /// `overhead_percent` of the two mean totals
    pub mean_overhead_percent: f64,
    /// Sample standard deviation; 0 for a single record
    pub std_dev_total_templated_ms: f64,
    pub std_dev_total_raw_ms: f64,
}

impl BatchSummary {
    /// Summarize records. Returns `None` for an empty batch.
    pub fn from_records(records: &[ComparisonRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let templated_totals: Vec<f64> = records
            .iter()
            .map(|r| millis(r.total_duration_templated))
            .collect();
        let raw_totals: Vec<f64> = records
            .iter()
            .map(|r| millis(r.total_duration_raw))
            .collect();
        let templated_processing: Vec<f64> = records
            .iter()
            .map(|r| millis(r.templated.prompt.construction_duration))
            .collect();

        let mean_total_templated_ms = mean(&templated_totals);
        let mean_total_raw_ms = mean(&raw_totals);

        Some(Self {
            query_count: records.len() as u64,
            failed_count: records.iter().filter(|r| r.any_failed()).count() as u64,
            mean_total_templated_ms,
            mean_total_raw_ms,
            mean_processing_templated_ms: mean(&templated_processing),
            mean_overhead_percent: overhead_percent(mean_total_templated_ms, mean_total_raw_ms),
            std_dev_total_templated_ms: sample_std_dev(&templated_totals),
            std_dev_total_raw_ms: sample_std_dev(&raw_totals),
        })
    }

    /// Format as console text.
    pub fn format_text(&self) -> String {
        let rule = "=".repeat(60);
        let mut out = String::new();

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "📈 BATCH TEST SUMMARY");
        let _ = writeln!(out, "{rule}");

        let _ = writeln!(out, "\n📊 AVERAGES ACROSS {} QUERIES:", self.query_count);
        let _ = writeln!(out, "   Average templated total time: {:.1}ms", self.mean_total_templated_ms);
        let _ = writeln!(out, "   Average raw total time:       {:.1}ms", self.mean_total_raw_ms);
        let _ = writeln!(out, "   Average templated processing: {:.1}ms", self.mean_processing_templated_ms);
        let _ = writeln!(out, "   Average overhead:             {:+.1}%", self.mean_overhead_percent);

        let _ = writeln!(out, "\n📏 CONSISTENCY:");
        let _ = writeln!(out, "   Templated time std dev: {:.1}ms", self.std_dev_total_templated_ms);
        let _ = writeln!(out, "   Raw time std dev:       {:.1}ms", self.std_dev_total_raw_ms);

        if self.failed_count > 0 {
            let _ = writeln!(
                out,
                "\n⚠️  {} of {} queries had a failed inference call",
                self.failed_count, self.query_count
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::{InferenceResult, PathRun, RenderedPrompt};
    use std::time::Duration;

    fn record(processing_ms: u64, templated_ms: u64, raw_ms: u64) -> ComparisonRecord {
        let templated = PathRun {
            prompt: RenderedPrompt::templated("t".into(), Duration::from_millis(processing_ms), false),
            result: InferenceResult::success("a", Duration::from_millis(templated_ms)),
        };
        let raw = PathRun {
            prompt: RenderedPrompt::raw("r".into(), Duration::ZERO),
            result: InferenceResult::success("b", Duration::from_millis(raw_ms)),
        };
        ComparisonRecord::new("q", templated, raw)
    }

    #[test]
    fn test_empty_batch_has_no_summary() {
        assert!(BatchSummary::from_records(&[]).is_none());
    }

    #[test]
    fn test_single_record_std_dev_is_zero() {
        let summary = BatchSummary::from_records(&[record(2, 100, 90)]).unwrap();
        assert_eq!(summary.query_count, 1);
        assert_eq!(summary.std_dev_total_templated_ms, 0.0);
        assert_eq!(summary.std_dev_total_raw_ms, 0.0);
    }

    #[test]
    fn test_means_and_overhead() {
        let records = [record(2, 98, 90), record(4, 116, 110)];
        let summary = BatchSummary::from_records(&records).unwrap();
        assert!((summary.mean_total_templated_ms - 110.0).abs() < 1e-9);
        assert!((summary.mean_total_raw_ms - 100.0).abs() < 1e-9);
        assert!((summary.mean_processing_templated_ms - 3.0).abs() < 1e-9);
        assert!((summary.mean_overhead_percent - 10.0).abs() < 1e-9);
        // Totals 100 and 120: sample std dev is sqrt(200).
        assert!((summary.std_dev_total_templated_ms - 200f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_failed_records_are_counted() {
        let mut failing = record(1, 10, 10);
        failing.templated.result = InferenceResult::failure("boom", Duration::ZERO);
        let summary = BatchSummary::from_records(&[failing, record(1, 10, 10)]).unwrap();
        assert_eq!(summary.failed_count, 1);
        assert!(summary.format_text().contains("1 of 2 queries"));
    }
}
