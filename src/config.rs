//! Configuration management for fdgraph.
//!
//! This module handles loading, merging, and validating configuration from
//! files and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_LSOF_PATH: &str = "lsof";
pub const DEFAULT_RANKDIR: &str = "LR";

/// Rank directions Graphviz accepts.
const VALID_RANKDIRS: [&str; 4] = ["LR", "RL", "TB", "BT"];

/// Effective configuration. Every field is optional so that file values
/// and CLI overrides can be merged before defaults apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Capture acquisition
    #[serde(alias = "lsof-path", skip_serializing_if = "Option::is_none")]
    pub lsof_path: Option<String>,

    // Process selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_names: Option<Vec<String>>,

    // Graph layout and content
    #[serde(alias = "rank-dir", skip_serializing_if = "Option::is_none")]
    pub rankdir: Option<String>,
    #[serde(alias = "show-ancestry", skip_serializing_if = "Option::is_none")]
    pub show_ancestry: Option<bool>,

    // Channel class enable flags
    #[serde(alias = "enable-unix", skip_serializing_if = "Option::is_none")]
    pub enable_unix: Option<bool>,
    #[serde(alias = "enable-fifo", skip_serializing_if = "Option::is_none")]
    pub enable_fifo: Option<bool>,
    #[serde(alias = "enable-tcp", skip_serializing_if = "Option::is_none")]
    pub enable_tcp: Option<bool>,
    #[serde(alias = "enable-udp", skip_serializing_if = "Option::is_none")]
    pub enable_udp: Option<bool>,

    // Logging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lsof_path: Some(DEFAULT_LSOF_PATH.to_string()),
            include_names: None,
            exclude_names: None,
            rankdir: Some(DEFAULT_RANKDIR.to_string()),
            show_ancestry: Some(true),
            enable_unix: Some(true),
            enable_fifo: Some(true),
            enable_tcp: Some(true),
            enable_udp: Some(true),
            log_level: Some("warn".into()),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> anyhow::Result<()> {
    if let Some(rankdir) = cfg.rankdir.as_deref() {
        if !VALID_RANKDIRS.contains(&rankdir) {
            bail!(
                "Invalid rankdir '{}', expected one of LR, RL, TB, BT",
                rankdir
            );
        }
    }

    if let Some(path) = cfg.lsof_path.as_deref() {
        if path.is_empty() {
            bail!("lsof_path must not be empty");
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref().and_then(|p| p.to_str()))?
    };

    if let Some(lsof_path) = &args.lsof_path {
        config.lsof_path = Some(lsof_path.clone());
    }

    if let Some(rankdir) = &args.rankdir {
        config.rankdir = Some(rankdir.clone());
    }

    // Parse comma-separated include/exclude names
    if let Some(include_str) = &args.include_names {
        config.include_names = Some(
            include_str
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        );
    }

    if let Some(exclude_str) = &args.exclude_names {
        config.exclude_names = Some(
            exclude_str
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        );
    }

    if args.no_ancestry {
        config.show_ancestry = Some(false);
    }

    Ok(config)
}

/// Enhanced configuration loading with multiple format support
pub fn load_config(path: Option<&str>) -> anyhow::Result<Config> {
    let path = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        // Try default locations
        let defaults = [
            "/etc/fdgraph/fdgraph.yaml",
            "/etc/fdgraph/fdgraph.yml",
            "/etc/fdgraph/fdgraph.json",
            "./fdgraph.yaml",
            "./fdgraph.yml",
            "./fdgraph.json",
        ];

        defaults
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(""))
    };

    if !path.exists() || path.to_string_lossy().is_empty() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> anyhow::Result<()> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };

    println!("{output}");
    Ok(())
}
