//! fdgraph — lsof capture to Graphviz process-communication graph
//!
//! The pipeline is a one-shot batch transformation over a finite capture:
//!
//! 1. [`record::parse_capture`] decodes the field-tagged line stream into
//!    process and descriptor tables.
//! 2. [`record::filter`] drops kernel worker threads (and optionally
//!    filters by process name).
//! 3. [`link::correlate`] pairs descriptors that share a unix socket,
//!    FIFO, or network connection into links between exactly two
//!    processes.
//! 4. [`graph::render`] emits the retained processes as nodes and the
//!    ancestry relations plus realized links as edges of a Graphviz
//!    `digraph`.
//!
//! # Usage
//!
//! ```rust
//! use fdgraph::config::Config;
//! use fdgraph::graph;
//! use fdgraph::link::correlate;
//! use fdgraph::record::parse_capture;
//!
//! let capture = "p10\ncbash\nLroot\nR1\n";
//! let snapshot = parse_capture(capture.as_bytes()).unwrap();
//! let links = correlate(&snapshot).unwrap();
//! let dot = graph::render(&snapshot, &links, &Config::default());
//! assert!(dot.starts_with("digraph G {"));
//! ```

pub mod capture;
pub mod cli;
pub mod commands;
pub mod config;
pub mod graph;
pub mod link;
pub mod record;

// Re-export main types for convenience
pub use link::{ChannelClass, Link, LinkDirection, ResourceKey};
pub use record::{DescriptorRecord, Pid, ProcessRecord, Snapshot};
