//! Console front ends: interactive comparison, batch run and metrics loop.
//!
//! The loops read lines from any async reader and write reports to any
//! writer, so they run against stdin/stdout in the binary and against byte
//! buffers in tests.

use std::io::Write;
use std::path::Path;

use pb_perf::{ComparisonReport, SinglePathMetrics};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::batch::{run_batch, BatchRun};
use crate::config::ConfigError;
use crate::pipeline::ComparisonPipeline;
use crate::ui::UiError;

/// Words that end an interactive loop (case-insensitive).
pub const QUIT_WORDS: [&str; 3] = ["quit", "exit", "bye"];

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Run the batch sequence
    Batch,
    /// Blank line
    Empty,
    Query(String),
}

/// Front end errors.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ui(#[from] UiError),
}

/// Whether `line` ends an interactive loop.
pub fn is_quit(line: &str) -> bool {
    let word = line.trim().to_lowercase();
    QUIT_WORDS.contains(&word.as_str())
}

/// Classify a line typed at the comparison prompt.
pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Command::Empty
    } else if is_quit(trimmed) {
        Command::Quit
    } else if trimmed.eq_ignore_ascii_case("batch") {
        Command::Batch
    } else {
        Command::Query(trimmed.to_string())
    }
}

/// Interactive comparison loop. Ends on a quit word or end of input.
pub async fn run_compare_loop<R, W>(
    pipeline: &ComparisonPipeline,
    batch_queries: &[String],
    input: R,
    out: &mut W,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "🔬 Templated vs Raw Prompt Comparison")?;
    writeln!(out, "Type 'quit' to exit, 'batch' for batch testing")?;

    let mut lines = input.lines();
    loop {
        write!(out, "\n🎯 Enter query to test: ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        match parse_command(&line) {
            Command::Quit => break,
            Command::Empty => continue,
            Command::Batch => {
                run_batch_report(pipeline, batch_queries, None, &mut *out).await?;
            }
            Command::Query(query) => {
                writeln!(out, "\n🔄 Running both approaches...")?;
                match pipeline.compare(&query).await {
                    Ok(record) => {
                        write!(out, "\n{}", ComparisonReport::from_record(&record).format_text())?
                    }
                    Err(e) => writeln!(out, "❌ {e}")?,
                }
            }
        }
    }

    writeln!(out, "👋 Goodbye!")?;
    Ok(())
}

/// Run the batch, printing each report and the summary.
///
/// Records and the summary are also written as JSON when `output` is given.
pub async fn run_batch_report<W: Write>(
    pipeline: &ComparisonPipeline,
    queries: &[String],
    output: Option<&Path>,
    out: &mut W,
) -> Result<BatchRun, CliError> {
    let total = queries.len();
    writeln!(out, "\n🔄 Running batch tests with {total} queries...")?;

    let mut write_error = None;
    let run = run_batch(pipeline, queries, |index, record| {
        let report = ComparisonReport::from_record(record);
        let result = write!(
            out,
            "\n{banner} Test {n}/{total} {banner}\n{text}",
            banner = "=".repeat(20),
            n = index + 1,
            text = report.format_text()
        );
        if let Err(e) = result {
            if write_error.is_none() {
                write_error = Some(e);
            }
        }
    })
    .await;
    if let Some(e) = write_error {
        return Err(e.into());
    }

    for failure in &run.failures {
        writeln!(
            out,
            "❌ Test {}/{total} ({:?}) failed: {}",
            failure.index + 1,
            failure.query,
            failure.error
        )?;
    }

    match run.summary() {
        Some(summary) => write!(out, "\n{}", summary.format_text())?,
        None => writeln!(out, "\n⚠️  No successful comparisons to summarize")?,
    }

    if let Some(path) = output {
        run.write_json(path).await?;
        writeln!(out, "✅ Results written to {}", path.display())?;
    }

    Ok(run)
}

/// Templated-only loop printing per-query metrics and the response.
pub async fn run_metrics_loop<R, W>(
    pipeline: &ComparisonPipeline,
    input: R,
    out: &mut W,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(out, "\nAsk me something: ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        if is_quit(&line) {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        match pipeline.run_templated(query).await {
            Ok(run) => {
                write!(out, "\n{}", SinglePathMetrics::from_run(&run).format_text())?;
                writeln!(out, "\n🤖 Response: {}", run.result.display_text())?;
            }
            Err(e) => writeln!(out, "❌ {e}")?,
        }
    }

    writeln!(out, "👋 Goodbye!")?;
    Ok(())
}
