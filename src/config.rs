//! Runtime configuration for the scoring runner
//!
//! Scoring semantics take no configuration. These knobs only tune the ONNX
//! Runtime session and the log filter, read from `INFER_RUNNER_*`
//! environment variables over built-in defaults. Callers fall back to
//! `RunnerConfig::default()` when the environment is malformed.

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "INFER_RUNNER";

/// Graph optimization level applied when building a session
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    Disable,
    /// Constant folding and redundant node elimination
    #[default]
    Basic,
    Extended,
    All,
}

/// Runner configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RunnerConfig {
    /// Intra-op threads for ONNX Runtime
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
    /// Graph optimization level
    #[serde(default)]
    pub optimization: OptimizationLevel,
    /// Default `tracing` directive, `RUST_LOG` still applies on top
    #[serde(default = "default_log_directive")]
    pub log_directive: String,
}

fn default_intra_threads() -> usize {
    1
}

/// Crate log directive used when none is configured
pub const DEFAULT_LOG_DIRECTIVE: &str = "infer_runner=warn";

fn default_log_directive() -> String {
    DEFAULT_LOG_DIRECTIVE.to_string()
}

impl RunnerConfig {
    /// Load from the `INFER_RUNNER_*` process environment
    pub fn load() -> Result<Self> {
        Self::load_from(Environment::with_prefix(ENV_PREFIX))
    }

    /// Load from a specific environment source
    pub fn load_from(source: Environment) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(source.try_parsing(true))
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        if config.intra_threads == 0 {
            anyhow::bail!("intra_threads must be at least 1");
        }

        Ok(config)
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            intra_threads: default_intra_threads(),
            optimization: OptimizationLevel::Basic,
            log_directive: default_log_directive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.intra_threads, 1);
        assert_eq!(config.optimization, OptimizationLevel::Basic);
        assert_eq!(config.log_directive, "infer_runner=warn");
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = RunnerConfig::load_from(env(&[])).unwrap();
        assert_eq!(config, RunnerConfig::default());
    }

    #[test]
    fn test_environment_overrides() {
        let config = RunnerConfig::load_from(env(&[
            ("INFER_RUNNER_INTRA_THREADS", "4"),
            ("INFER_RUNNER_OPTIMIZATION", "all"),
        ]))
        .unwrap();
        assert_eq!(config.intra_threads, 4);
        assert_eq!(config.optimization, OptimizationLevel::All);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(RunnerConfig::load_from(env(&[("INFER_RUNNER_INTRA_THREADS", "0")])).is_err());
        assert!(RunnerConfig::load_from(env(&[("INFER_RUNNER_OPTIMIZATION", "max")])).is_err());
    }
}
