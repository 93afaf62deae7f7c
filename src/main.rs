//! `crewline`: run a crew blueprint against an OpenAI-compatible LLM endpoint
//! and print the final task's output.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;

use crewline::llm::{DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crewline::{Blueprint, Client, Inputs, LlmConfig, MemoryTelemetry, RetryPolicy};

#[derive(Parser, Debug)]
#[command(name = "crewline", version, about = "Run a sequential LLM agent crew")]
struct Cli {
    /// API key for the LLM provider
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Root URL of the OpenAI-compatible API
    #[arg(long, env = "CREWLINE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Model identifier; a `groq/` prefix is accepted
    #[arg(long, env = "CREWLINE_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Maximum output tokens per completion
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Value for the `{topic}` placeholder
    #[arg(long, default_value = "Large language models")]
    topic: String,

    /// Extra placeholder values, as KEY=VALUE
    #[arg(long = "input", value_name = "KEY=VALUE", value_parser = parse_input)]
    inputs: Vec<(String, String)>,

    /// Crew blueprint (JSON); defaults to the built-in content crew
    #[arg(long)]
    crew: Option<PathBuf>,

    /// Seconds to wait before the first retry of a rate-limited task
    #[arg(long, default_value_t = 10)]
    backoff_secs: u64,

    /// Seconds to pause between tasks
    #[arg(long, default_value_t = 5)]
    task_delay_secs: u64,

    /// Invocations per task before giving up on rate limits
    #[arg(long, default_value_t = 6)]
    max_attempts: u32,

    /// Double the wait before each retry instead of keeping it fixed
    #[arg(long)]
    exponential_backoff: bool,

    /// Print a per-task trace summary to stderr when the run finishes
    #[arg(long)]
    trace: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn parse_input(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// A missing `.env` is silent; anything else wrong with it is worth a warning.
fn dotenv_warning<T>(result: &dotenvy::Result<T>) -> Option<String> {
    match result {
        Ok(_) => None,
        Err(err) if err.not_found() => None,
        Err(err) => Some(format!("Ignoring malformed .env file: {err}")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    if let Some(warning) = dotenv_warning(&dotenv) {
        log::warn!("{warning}");
    }

    if cli.api_key.trim().is_empty() {
        bail!("GROQ_API_KEY is empty");
    }

    let config = LlmConfig::groq(cli.api_key.trim())
        .with_base_url(&cli.base_url)
        .with_model(&cli.model)
        .with_max_tokens(cli.max_tokens);
    log::info!("Using model {} at {}", config.model, config.base_url);
    let client = Client::new(config);

    let blueprint = match &cli.crew {
        Some(path) => Blueprint::from_path(path)
            .with_context(|| format!("loading crew blueprint {}", path.display()))?,
        None => Blueprint::content_crew().context("loading built-in content crew")?,
    };

    let backoff = Duration::from_secs(cli.backoff_secs);
    let policy = if cli.exponential_backoff {
        RetryPolicy::exponential(backoff, cli.max_attempts)
    } else {
        RetryPolicy::fixed(backoff, cli.max_attempts)
    };

    let telemetry = Arc::new(MemoryTelemetry::new());
    let crew = blueprint
        .into_crew(&client)?
        .with_policy(policy)
        .with_task_delay(Duration::from_secs(cli.task_delay_secs))
        .with_telemetry(telemetry.clone());

    let mut inputs = Inputs::new();
    inputs.insert("topic".to_string(), cli.topic.clone());
    inputs.extend(cli.inputs);

    let output = crew.kickoff(&inputs).await.context("crew run failed")?;

    if cli.trace {
        for entry in telemetry.get_traces() {
            eprintln!(
                "task {} [{}]: {} attempt(s), waited {} ms, took {} ms, {} chars",
                entry.task_index + 1,
                entry.agent,
                entry.attempts,
                entry.waited_ms,
                entry.elapsed_ms,
                entry.output_chars
            );
        }
    }

    println!("{}", output);
    Ok(())
}
