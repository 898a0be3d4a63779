//! Pipeline configuration management for `atelier.toml`.
//!
//! # Sections
//!
//! | Section    | Purpose                                         |
//! |------------|-------------------------------------------------|
//! | `[paths]`  | Source and output roots (the path registry)     |
//! | `[build]`  | Transform settings (minify, quality, browsers)  |
//! | `[serve]`  | Development server (interface, port, watch)     |
//!
//! The configuration is loaded once at startup, merged with CLI
//! overrides, and passed by shared reference to every task. Nothing
//! mutates it afterwards.

mod build;
mod paths;
mod serve;

pub use build::BuildConfig;
pub use paths::PathsConfig;
pub use serve::ServeConfig;

use std::fs;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::Cli;

/// Root configuration structure representing atelier.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Path registry settings
    pub paths: PathsConfig,

    /// Transform settings
    pub build: BuildConfig,

    /// Development server settings
    pub serve: ServeConfig,
}

impl PipelineConfig {
    /// Load configuration, merging `atelier.toml` (when present) with
    /// CLI overrides. A missing config file yields all defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = if cli.config.is_file() {
            let raw = fs::read_to_string(&cli.config)
                .with_context(|| format!("failed to read {}", cli.config.display()))?;
            Self::parse(&raw)
                .with_context(|| format!("invalid config file {}", cli.config.display()))?
        } else {
            Self::default()
        };

        if let Some(source) = &cli.source {
            config.paths.source = source.clone();
        }
        if let Some(output) = &cli.output {
            config.paths.output = output.clone();
        }
        if let Some(interface) = cli.interface {
            config.serve.interface = interface;
        }
        if let Some(port) = cli.port {
            config.serve.port = port;
        }

        Ok(config)
    }

    /// Parse configuration from TOML text.
    fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(Into::into)
    }
}

#[cfg(test)]
pub(crate) fn test_parse_config(raw: &str) -> PipelineConfig {
    PipelineConfig::parse(raw).expect("test config must parse")
}
