//! CLI for comparing templated and raw prompt construction.
//!
//! # Usage
//!
//! ```bash
//! # Interactive comparison against `ollama run mistral`
//! cargo run -p pb-harness --bin promptbench
//!
//! # Predefined batch with JSON export
//! cargo run -p pb-harness --bin promptbench -- batch --output results.json
//!
//! # Templated path only, another model
//! cargo run -p pb-harness --bin promptbench -- --model llama3 metrics
//!
//! # Web UI
//! cargo run -p pb-harness --bin promptbench -- serve --addr 127.0.0.1:8501
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use pb_harness::cli::{run_batch_report, run_compare_loop, run_metrics_loop};
use pb_harness::{
    init_logging, load_queries, serve, CliError, ComparisonPipeline, ConfigError, HarnessConfig,
};
use pb_prompt::RawPromptStyle;
use tokio::io::BufReader;

#[derive(Debug, Parser)]
#[command(name = "promptbench", version, about = "Templated vs raw prompt latency harness")]
struct Cli {
    /// Inference executable
    #[arg(long, env = "PROMPTBENCH_PROGRAM")]
    program: Option<String>,

    /// Argument placed before the model (repeatable)
    #[arg(long = "program-arg", allow_hyphen_values = true)]
    program_args: Vec<String>,

    /// Model identifier passed to the inference program
    #[arg(long, env = "PROMPTBENCH_MODEL")]
    model: Option<String>,

    /// Per-call inference timeout in seconds
    #[arg(long, env = "PROMPTBENCH_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Template file for the templated path
    #[arg(long, env = "PROMPTBENCH_TEMPLATE")]
    template: Option<PathBuf>,

    /// Raw prompt style: structured or concise
    #[arg(long)]
    raw_style: Option<String>,

    /// Skip the template engine and substitute placeholders directly
    /// (uses the plain chat template unless --template is given)
    #[arg(long)]
    substitution_only: bool,

    /// Short timeout preset
    #[arg(long)]
    quick: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Interactive comparison loop (default)
    Compare,
    /// Compare a fixed list of queries and summarize
    Batch {
        /// One query per line instead of the predefined list
        #[arg(long)]
        queries_file: Option<PathBuf>,
        /// Write records and summary as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Templated path only, with per-query metrics
    Metrics,
    /// Single-page web UI
    Serve {
        #[arg(long, default_value = "127.0.0.1:8501")]
        addr: SocketAddr,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Run with --help for usage information");
            return ExitCode::FAILURE;
        }
    };

    match run(cli.mode.unwrap_or(Mode::Compare), config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Apply command-line overrides onto the chosen preset.
fn build_config(cli: &Cli) -> Result<HarnessConfig, ConfigError> {
    let mut config = if cli.quick {
        HarnessConfig::quick()
    } else {
        HarnessConfig::default()
    };

    if let Some(ref program) = cli.program {
        config.inference.program = program.clone();
        config.inference.args = cli.program_args.clone();
    } else if !cli.program_args.is_empty() {
        config.inference.args = cli.program_args.clone();
    }

    if let Some(ref model) = cli.model {
        config.inference.model = model.clone();
    }

    if let Some(secs) = cli.timeout_secs {
        config.inference.timeout = Duration::from_secs(secs);
    }

    if let Some(ref template) = cli.template {
        config.template_path = template.clone();
    }

    if let Some(ref style) = cli.raw_style {
        config.raw_style =
            RawPromptStyle::parse(style).ok_or_else(|| ConfigError::UnknownRawStyle(style.clone()))?;
    }

    if cli.substitution_only {
        config.enable_substitution_only();
    }
    config.validate()?;
    Ok(config)
}

async fn run(mode: Mode, config: HarnessConfig) -> Result<ExitCode, CliError> {
    let mut stdout = std::io::stdout();

    match mode {
        Mode::Compare => {
            print_banner(&config);
            let pipeline = ComparisonPipeline::from_config(&config);
            let stdin = BufReader::new(tokio::io::stdin());
            run_compare_loop(&pipeline, &config.batch_queries, stdin, &mut stdout).await?;
            Ok(ExitCode::SUCCESS)
        }
        Mode::Batch {
            queries_file,
            output,
        } => {
            print_banner(&config);
            let queries = match queries_file {
                Some(path) => load_queries(&path)?,
                None => config.batch_queries.clone(),
            };
            let pipeline = ComparisonPipeline::from_config(&config);
            let run = run_batch_report(&pipeline, &queries, output.as_deref(), &mut stdout).await?;
            if run.records.is_empty() {
                eprintln!("Batch produced no comparisons");
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Mode::Metrics => {
            print_banner(&config);
            let pipeline = ComparisonPipeline::from_config(&config);
            let stdin = BufReader::new(tokio::io::stdin());
            run_metrics_loop(&pipeline, stdin, &mut stdout).await?;
            Ok(ExitCode::SUCCESS)
        }
        Mode::Serve { addr } => {
            println!("Serving web UI on http://{addr}");
            serve(&config, addr).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_banner(config: &HarnessConfig) {
    println!("Prompt Construction Benchmark");
    println!("=============================");
    println!();
    println!(
        "Inference: {} {} {}",
        config.inference.program,
        config.inference.args.join(" "),
        config.inference.model
    );
    println!("Template:  {}", config.template_path.display());
    println!("Raw style: {}", config.raw_style.name());
    println!("Timeout:   {:?}", config.inference.timeout);
}
