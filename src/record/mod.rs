//! Typed tables for the lsof field-tagged record stream.
//!
//! This module provides:
//! - `parser`: Stateful line-protocol parser producing a `Snapshot`
//! - `filter`: Kernel-thread and name-based process filtering
//!
//! lsof's `-F` output tags every line with a single field character; `p`
//! opens a process record, `f` opens a descriptor record under it, and all
//! other characters attach an attribute to whichever record is open.

pub mod filter;
pub mod parser;

use ahash::AHashMap as HashMap;
use std::fmt;

pub use parser::{parse_capture, ParseError, Parser, ParserState};

/// Process identifier as reported by lsof.
pub type Pid = u32;

/// Parent pid value meaning "no parent": children of init carry their own
/// ancestry, so an `R1` reference never draws an ancestry edge.
pub const NO_PARENT: Pid = 1;

/// Descriptor identifier: an open file number, or a symbolic token such as
/// `txt` (text segment) or `cwd` (working directory).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FdId {
    Num(u32),
    Sym(String),
}

impl FdId {
    /// Decodes an `f` field value. Purely numeric values become open file
    /// numbers, everything else stays symbolic.
    pub fn decode(value: &str) -> FdId {
        if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = value.parse() {
                return FdId::Num(n);
            }
        }
        FdId::Sym(value.to_string())
    }

    /// Whether this is the text-segment marker used by the kernel-thread
    /// heuristic.
    pub fn is_text_segment(&self) -> bool {
        matches!(self, FdId::Sym(s) if s == "txt")
    }
}

impl fmt::Display for FdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FdId::Num(n) => write!(f, "{}", n),
            FdId::Sym(s) => write!(f, "{}", s),
        }
    }
}

/// Descriptor type from the `t` field. lsof reports many more types than
/// the correlator cares about; everything outside the channel classes is
/// carried verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorKind {
    Unix,
    Fifo,
    Pipe,
    Ipv4,
    Ipv6,
    Other(String),
}

impl DescriptorKind {
    pub fn decode(value: &str) -> DescriptorKind {
        match value {
            "unix" => DescriptorKind::Unix,
            "FIFO" => DescriptorKind::Fifo,
            "PIPE" => DescriptorKind::Pipe,
            "IPv4" => DescriptorKind::Ipv4,
            "IPv6" => DescriptorKind::Ipv6,
            other => DescriptorKind::Other(other.to_string()),
        }
    }

    /// The `unknown` type sentinel lsof emits when it cannot resolve a
    /// descriptor, e.g. the text segment of a kernel worker thread.
    pub fn is_unknown(&self) -> bool {
        matches!(self, DescriptorKind::Other(s) if s == "unknown")
    }
}

/// Access mode from the `a` field. Anything other than `r`/`w`/`u` (lsof
/// emits a space for "unknown") decodes to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
    ReadWrite,
}

impl AccessMode {
    pub fn decode(value: &str) -> Option<AccessMode> {
        match value {
            "r" => Some(AccessMode::Read),
            "w" => Some(AccessMode::Write),
            "u" => Some(AccessMode::ReadWrite),
            _ => None,
        }
    }
}

/// Transport protocol from the `P` field of network descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
    Other(String),
}

impl Protocol {
    pub fn decode(value: &str) -> Protocol {
        match value {
            "TCP" => Protocol::Tcp,
            "UDP" => Protocol::Udp,
            other => Protocol::Other(other.to_string()),
        }
    }
}

/// One process from the capture, keyed externally by pid.
///
/// Unrecognized field characters land in `extra` untouched: the capture
/// protocol is extensible and forward compatibility matters more than
/// strict validation here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessRecord {
    /// Command name (`c`).
    pub command: Option<String>,
    /// Owning login (`L`).
    pub login: Option<String>,
    /// Parent pid (`R`); `NO_PARENT` means top of the visible tree.
    pub parent: Option<Pid>,
    /// Unrecognized attributes, kept verbatim.
    pub extra: HashMap<char, String>,
}

impl ProcessRecord {
    /// Whether the process hangs directly off init. Drawn with a distinct
    /// fill so long-lived daemons stand out.
    pub fn is_resident(&self) -> bool {
        self.parent == Some(NO_PARENT)
    }

    pub fn display_name(&self) -> &str {
        self.command.as_deref().unwrap_or("?")
    }
}

/// One descriptor from the capture, keyed externally by (pid, fd).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorRecord {
    /// Descriptor type (`t`). Required by the correlator for every
    /// retained descriptor.
    pub kind: Option<DescriptorKind>,
    /// Access mode (`a`).
    pub access: Option<AccessMode>,
    /// Free-form name (`n`), e.g. a path or `host:port->host:port`.
    pub name: Option<String>,
    /// Transport protocol (`P`) for network descriptors.
    pub protocol: Option<Protocol>,
    /// Inode number (`i`).
    pub inode: Option<u64>,
    /// Device identifier (`d`), kept as text (lsof prints hex).
    pub device: Option<String>,
    /// Unrecognized attributes, kept verbatim.
    pub extra: HashMap<char, String>,
}

/// Map of fd to descriptor record for one process.
pub type DescriptorSet = HashMap<FdId, DescriptorRecord>;

/// Parsed capture: the two tables every downstream stage works from.
/// Treated as immutable after filtering.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub processes: HashMap<Pid, ProcessRecord>,
    pub descriptors: HashMap<Pid, DescriptorSet>,
}

impl Snapshot {
    /// Removes a process and all of its descriptors.
    pub fn remove_pid(&mut self, pid: Pid) {
        self.processes.remove(&pid);
        self.descriptors.remove(&pid);
    }

    /// Total descriptor count across all processes.
    pub fn descriptor_count(&self) -> usize {
        self.descriptors.values().map(|set| set.len()).sum()
    }

    /// Pids sorted ascending, for deterministic output.
    pub fn sorted_pids(&self) -> Vec<Pid> {
        let mut pids: Vec<Pid> = self.processes.keys().copied().collect();
        pids.sort_unstable();
        pids
    }
}
