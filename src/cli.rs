//! CLI arguments and subcommands for fdgraph.
//!
//! This module defines the command-line interface structure using the clap
//! library, including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "fdgraph",
    about = "Graph inter-process communication channels from lsof output",
    long_about = "Graph inter-process communication channels from lsof output.\n\n\
                  Reads an `lsof -F` capture (piped in, from a file, or by running lsof \
                  itself), pairs descriptors that share a socket, FIFO or network \
                  connection, and prints a Graphviz digraph of process ancestry and \
                  communication links. Pipe the output into `dot -Tpng` or `xdot` to \
                  render it.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version = "0.1.0",
    propagate_version = true,
    after_help = "Example: fdgraph -- -u $USER | dot -Tsvg > procs.svg"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read a saved lsof -F capture from a file instead of stdin/lsof
    #[arg(short = 'i', long, global = true)]
    pub input: Option<PathBuf>,

    /// Write the graph description to a file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Path to the lsof binary
    #[arg(long)]
    pub lsof_path: Option<String>,

    /// Rank direction of the emitted graph (LR, RL, TB, BT)
    #[arg(long)]
    pub rankdir: Option<String>,

    /// Include only processes matching these names (comma-separated)
    #[arg(long)]
    pub include_names: Option<String>,

    /// Exclude processes matching these names (comma-separated)
    #[arg(long)]
    pub exclude_names: Option<String>,

    /// Suppress parent/child ancestry edges
    #[arg(long)]
    pub no_ancestry: bool,

    /// Log level (logs go to stderr; stdout carries the graph)
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Extra arguments passed verbatim to lsof (after --)
    #[arg(last = true)]
    pub lsof_args: Vec<String>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse and correlate a capture, print a summary instead of a graph
    Check {
        /// Show per-link details
        #[arg(long)]
        verbose: bool,
    },

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Generate a synthetic lsof -F capture for testing
    GenerateTestdata {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long, default_value = "testdata.lsof")]
        output: PathBuf,

        /// Number of unconnected background processes
        #[arg(long, default_value_t = 8)]
        processes: usize,

        /// Number of unix-socket connected process pairs
        #[arg(long, default_value_t = 3)]
        unix_pairs: usize,

        /// Number of FIFO connected process pairs
        #[arg(long, default_value_t = 2)]
        fifo_pairs: usize,

        /// Number of TCP connected process pairs
        #[arg(long, default_value_t = 2)]
        tcp_pairs: usize,
    },
}
