//! ONNX Inference Runner - Main Entry Point
//!
//! Prints exactly one `{"score", "uid", "reason"}` line on stdout and
//! always exits 0. Logs go to stderr.

use clap::error::ErrorKind;
use clap::Parser;
use infer_runner::{
    cli::Cli,
    config::{RunnerConfig, DEFAULT_LOG_DIRECTIVE},
    error::ScoreError,
    models::loader::OrtRuntime,
    pipeline::{failure_result, score_request},
    types::result::ScoreResult,
};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let config = RunnerConfig::load();

    init_logging(
        config
            .as_ref()
            .map(|c| c.log_directive.as_str())
            .unwrap_or(DEFAULT_LOG_DIRECTIVE),
    );

    let config = config.unwrap_or_else(|e| {
        warn!(error = %format!("{:#}", e), "Invalid runner configuration, using defaults");
        RunnerConfig::default()
    });

    let result = match Cli::try_parse() {
        Ok(cli) => score_request(OrtRuntime::acquire(&config), &cli.model, &cli.input),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return;
        }
        Err(e) => failure_result(ScoreError::InvalidArgs(format!("{:?}", e.kind()))),
    };

    emit(&result);
}

/// stderr-only subscriber; stdout is reserved for the result line.
/// `RUST_LOG` replaces the configured directive when set.
fn init_logging(directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn emit(result: &ScoreResult) {
    if let Err(e) = result.write_line(std::io::stdout().lock()) {
        error!(error = %e, "Failed to write result line");
    }
}
