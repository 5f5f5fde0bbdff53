//! Inter-process communication links derived from shared descriptors.
//!
//! This module provides:
//! - `correlator`: Partitioning of descriptors by channel class and
//!   realization of links between exactly two processes
//!
//! The types here describe *what* a link is; the pairing rules live in
//! [`correlator`].

pub mod correlator;

use std::fmt;

pub use correlator::{correlate, partition, realize, CorrelateError, LinkPartitions};

use crate::record::Pid;

/// The categories eligible for inter-process correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelClass {
    Unix,
    Fifo,
    Pipe,
    Tcp,
    Udp,
}

impl ChannelClass {
    pub fn label(&self) -> &'static str {
        match self {
            ChannelClass::Unix => "unix",
            ChannelClass::Fifo => "fifo",
            ChannelClass::Pipe => "pipe",
            ChannelClass::Tcp => "tcp",
            ChannelClass::Udp => "udp",
        }
    }
}

impl fmt::Display for ChannelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Correlation identity of a communication resource: the kernel exposes
/// the same inode (or device) to both ends of a local channel, and the
/// same endpoint pair, canonicalized, to both ends of a connection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKey {
    Inode(u64),
    Device(String),
    /// Lexicographically sorted endpoint pair of a network connection.
    Endpoints(String, String),
}

impl ResourceKey {
    /// Canonical key for a two-endpoint name like `A:80->B:1234`: both
    /// sides of the connection record the same endpoints in opposite
    /// order, so sorting collapses them to one key.
    pub fn endpoints(name: &str) -> Option<ResourceKey> {
        let (a, b) = name.split_once("->")?;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Some(ResourceKey::Endpoints(lo.to_string(), hi.to_string()))
    }
}

impl fmt::Display for ResourceKey {
    /// Rendered into edge labels; the `\n` between endpoints is a literal
    /// two-character escape that Graphviz turns into a line break.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Inode(i) => write!(f, "{}", i),
            ResourceKey::Device(d) => write!(f, "{}", d),
            ResourceKey::Endpoints(a, b) => write!(f, "{}\\n{}", a, b),
        }
    }
}

/// Arrow style of a realized link, derived from the access mode of the
/// lower-pid participant (the edge source).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDirection {
    Forward,
    Backward,
    Both,
}

impl LinkDirection {
    pub fn dot_value(&self) -> &'static str {
        match self {
            LinkDirection::Forward => "forward",
            LinkDirection::Backward => "backward",
            LinkDirection::Both => "both",
        }
    }
}

/// A resource key held by exactly two distinct processes, ready to become
/// a graph edge. `src` is always the lower pid.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub class: ChannelClass,
    pub key: ResourceKey,
    pub src: Pid,
    pub dst: Pid,
    pub direction: LinkDirection,
}
