//! Binary entry point for `health-triage`.
//!
//! This module provides the command-line interface for health-triage with
//! options for the question to route, configuration file paths, and logging
//! verbosity. It initializes the necessary components and routes a single
//! question.

use clap::Parser;
use health_triage::{
    Runtime,
    base::{config::Config, types::Void},
};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Health-triage – an LLM-backed triage router for health questions.
///
/// Configuration can come from `config.toml` or environment variables.
/// Each run classifies the question, answers emergencies from the grounded
/// knowledge base, and answers everything else with the general model.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// The question to triage and answer.
    ///
    /// Defaults to an example emergency question when omitted.
    question: Option<String>,
    /// Override the config file path (optional).
    ///
    /// By default, the binary will look for a config file at
    /// `.hidden/config.toml` in the current directory.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Main entry point for the health-triage binary.
///
/// Sets up logging based on verbosity, loads configuration, and routes the
/// question.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Prepare the otlp layer.

    let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
    let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("health-triage");
    let otel = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    let config = Config::load(args.config.as_deref())?;

    let question = args.question.unwrap_or_else(|| "What should I do if I'm having chest pain?".to_string());

    println!("Processing question: {question}");

    let runtime = Runtime::new(config);
    let result = runtime.route(&question).await;

    println!("Classification: {}", result.classification);
    println!("Source: {}", result.source);
    println!("Answer: {}", result.answer);

    Ok(())
}
