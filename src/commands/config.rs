//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::Config;

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> anyhow::Result<()> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from("fdgraph.yaml"),
    };

    let content = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
        ConfigFormat::Toml => toml::to_string_pretty(&config)?,
        ConfigFormat::Yaml => {
            let mut content = serde_yaml::to_string(&config)?;
            if commented {
                content = add_config_comments(content);
            }
            content
        }
    };

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# fdgraph Configuration
# =====================
#
# Capture Acquisition
# -------------------
# lsof_path: "lsof"            # Path to the lsof binary
#
# Process Selection
# -----------------
# include_names: null          # Include only processes matching these names
# exclude_names: null          # Exclude processes matching these names
#
# Graph Layout and Content
# ------------------------
# rankdir: "LR"                # Rank direction: LR, RL, TB, BT
# show_ancestry: true          # Draw parent/child edges
#
# Channel Class Enable Flags
# --------------------------
# enable_unix: true            # Draw unix-domain socket links
# enable_fifo: true            # Draw FIFO links
# enable_tcp: true             # Draw TCP links
# enable_udp: true             # Draw UDP links
#
# Logging
# -------
# log_level: "warn"            # off, error, warn, info, debug, trace
"#;

    format!("{comments}\n{yaml}")
}
