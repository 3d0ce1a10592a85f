//! Batch mode: a fixed list of queries compared in order.

use std::path::Path;

use pb_core::ComparisonRecord;
use pb_perf::BatchSummary;
use serde::Serialize;

use crate::pipeline::ComparisonPipeline;

/// A query whose comparison could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    /// Position of the query in the batch
    pub index: usize,
    pub query: String,
    pub error: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchRun {
    /// Successful comparisons, in input order
    pub records: Vec<ComparisonRecord>,
    /// Queries that failed fatally, in input order
    pub failures: Vec<BatchFailure>,
}

/// JSON document written by `--output`.
#[derive(Serialize)]
struct BatchExport<'a> {
    records: &'a [ComparisonRecord],
    failures: &'a [BatchFailure],
    summary: Option<BatchSummary>,
}

impl BatchRun {
    /// Aggregate over the successful records.
    pub fn summary(&self) -> Option<BatchSummary> {
        BatchSummary::from_records(&self.records)
    }

    /// Number of queries attempted.
    pub fn attempted(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    /// Records, failures and summary as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&BatchExport {
            records: &self.records,
            failures: &self.failures,
            summary: self.summary(),
        })
    }

    /// Write the JSON export to `path`.
    pub async fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        tokio::fs::write(path, json).await
    }
}

/// Compare every query in order.
///
/// `on_record` is called after each successful comparison, with the query's
/// index. A fatal error on one query is recorded and the batch continues.
pub async fn run_batch<F>(
    pipeline: &ComparisonPipeline,
    queries: &[String],
    mut on_record: F,
) -> BatchRun
where
    F: FnMut(usize, &ComparisonRecord),
{
    let mut run = BatchRun::default();

    for (index, query) in queries.iter().enumerate() {
        tracing::info!(index, total = queries.len(), query = %query, "batch query");
        match pipeline.compare(query).await {
            Ok(record) => {
                on_record(index, &record);
                run.records.push(record);
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "batch query failed");
                run.failures.push(BatchFailure {
                    index,
                    query: query.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    debug_assert_eq!(run.attempted(), queries.len());
    run
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::pipeline::PathOptions;
    use pb_inference::{InferenceClient, InferenceConfig};
    use pb_prompt::{MiniJinjaEngine, RawPromptStyle, TemplateEngine, TemplateRenderer};
    use std::time::Duration;

    fn pipeline(template_path: std::path::PathBuf, script: &str) -> ComparisonPipeline {
        let engine: Box<dyn TemplateEngine> = Box::new(MiniJinjaEngine::new());
        ComparisonPipeline::new(
            TemplateRenderer::new(engine),
            InferenceClient::new(
                InferenceConfig::command("sh", ["-c", script], "mock-model")
                    .with_timeout(Duration::from_secs(10)),
            ),
            PathOptions {
                template_path,
                raw_style: RawPromptStyle::Structured,
            },
        )
    }

    fn queries(items: &[&str]) -> Vec<String> {
        items.iter().map(|q| q.to_string()).collect()
    }

    #[tokio::test]
    async fn test_batch_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("chat.prompt");
        std::fs::write(&template, "Q: {{ user_input }}").unwrap();
        let pipeline = pipeline(template, "cat >/dev/null; echo ok");

        let mut seen = Vec::new();
        let run = run_batch(&pipeline, &queries(&["hi", "What is AI?", "Tell me more"]), |i, r| {
            seen.push((i, r.query.clone()));
        })
        .await;

        assert!(run.failures.is_empty());
        let order: Vec<&str> = run.records.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(order, ["hi", "What is AI?", "Tell me more"]);
        assert_eq!(seen[2], (2, "Tell me more".to_string()));

        let summary = run.summary().unwrap();
        assert_eq!(summary.query_count, 3);
        assert_eq!(summary.failed_count, 0);
    }

    #[tokio::test]
    async fn test_batch_continues_past_inference_failures() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("chat.prompt");
        std::fs::write(&template, "Q: {{ user_input }}").unwrap();
        let script = r#"input=$(cat); case "$input" in *boom*) exit 3;; *) echo fine;; esac"#;
        let pipeline = pipeline(template, script);

        let run = run_batch(&pipeline, &queries(&["boom", "What is AI?"]), |_, _| {}).await;

        assert_eq!(run.records.len(), 2);
        assert!(run.records[0].templated.result.failed);
        assert!(!run.records[1].any_failed());
        assert_eq!(run.summary().unwrap().failed_count, 1);
    }

    #[tokio::test]
    async fn test_missing_template_is_collected_per_query() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path().join("missing.prompt"), "cat");

        let run = run_batch(&pipeline, &queries(&["hi", "What is AI?"]), |_, _| {}).await;

        assert!(run.records.is_empty());
        assert_eq!(run.failures.len(), 2);
        assert_eq!(run.failures[1].index, 1);
        assert!(run.failures[1].error.contains("missing.prompt"));
        assert!(run.summary().is_none());
    }

    #[tokio::test]
    async fn test_json_export_includes_summary() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("chat.prompt");
        std::fs::write(&template, "Q: {{ user_input }}").unwrap();
        let pipeline = pipeline(template, "cat");

        let run = run_batch(&pipeline, &queries(&["What is AI?"]), |_, _| {}).await;
        let out = dir.path().join("batch.json");
        run.write_json(&out).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["records"][0]["query"], "What is AI?");
        assert_eq!(json["summary"]["query_count"], 1);
        assert_eq!(json["summary"]["std_dev_total_raw_ms"], 0.0);
    }
}
