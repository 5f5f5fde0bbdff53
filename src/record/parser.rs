//! Stateful parser for the lsof `-F` field-tagged line protocol.
//!
//! Each line is one field character followed immediately by its value.
//! `p` and `f` are structural (they open a process or descriptor record);
//! every other character is an attribute of the currently open record.
//! The open-context rule is held in an explicit [`ParserState`] so the
//! context switches are visible and testable in isolation.

use std::io::BufRead;

use thiserror::Error;
use tracing::debug;

use super::{DescriptorRecord, FdId, Pid, ProcessRecord, Snapshot};

/// Fatal conditions while decoding the record stream. Any of these aborts
/// the run before a single line of graph output is produced.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: process record id {value:?} is not a positive integer")]
    InvalidPid { line: usize, value: String },

    #[error("line {line}: field '{field}' expects an integer, got {value:?}")]
    InvalidNumber {
        line: usize,
        field: char,
        value: String,
    },

    #[error("line {line}: descriptor line before any process record")]
    DescriptorBeforeProcess { line: usize },

    #[error("line {line}: attribute field '{field}' with no open record to attach to")]
    AttributeBeforeProcess { line: usize, field: char },

    #[error("failed to read capture: {0}")]
    Io(#[from] std::io::Error),
}

/// Open-context state threaded through the scan: which process and which
/// descriptor attribute lines currently attach to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserState {
    pub current_pid: Option<Pid>,
    pub current_fd: Option<FdId>,
}

/// Incremental parser. Feed lines in stream order, then take the snapshot.
#[derive(Debug, Default)]
pub struct Parser {
    state: ParserState,
    snapshot: Snapshot,
    line_no: usize,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one line of the capture. Empty lines are ignored.
    pub fn feed_line(&mut self, line: &str) -> Result<(), ParseError> {
        self.line_no += 1;
        let mut chars = line.chars();
        let field = match chars.next() {
            Some(c) => c,
            None => return Ok(()),
        };
        let value = chars.as_str();

        match field {
            'p' => self.open_process(value),
            'f' => self.open_descriptor(value),
            _ => self.attach_attribute(field, value),
        }
    }

    /// `p<pid>`: establishes a new current process and closes any open
    /// descriptor context.
    fn open_process(&mut self, value: &str) -> Result<(), ParseError> {
        let pid: Pid = value.parse().map_err(|_| ParseError::InvalidPid {
            line: self.line_no,
            value: value.to_string(),
        })?;
        self.snapshot.processes.entry(pid).or_default();
        self.state.current_pid = Some(pid);
        self.state.current_fd = None;
        Ok(())
    }

    /// `f<fd>`: establishes a new current descriptor under the current
    /// process. Only valid once a process is open.
    fn open_descriptor(&mut self, value: &str) -> Result<(), ParseError> {
        let pid = self
            .state
            .current_pid
            .ok_or(ParseError::DescriptorBeforeProcess {
                line: self.line_no,
            })?;
        let fd = FdId::decode(value);
        self.snapshot
            .descriptors
            .entry(pid)
            .or_default()
            .entry(fd.clone())
            .or_default();
        self.state.current_fd = Some(fd);
        Ok(())
    }

    fn attach_attribute(&mut self, field: char, value: &str) -> Result<(), ParseError> {
        let pid = self
            .state
            .current_pid
            .ok_or(ParseError::AttributeBeforeProcess {
                line: self.line_no,
                field,
            })?;

        if let Some(fd) = &self.state.current_fd {
            let rec = self
                .snapshot
                .descriptors
                .entry(pid)
                .or_default()
                .entry(fd.clone())
                .or_default();
            set_descriptor_field(rec, field, value, self.line_no)
        } else {
            let rec = self.snapshot.processes.entry(pid).or_default();
            set_process_field(rec, field, value, self.line_no)
        }
    }

    /// Finishes the scan and hands out the two tables.
    pub fn finish(self) -> Snapshot {
        debug!(
            processes = self.snapshot.processes.len(),
            descriptors = self.snapshot.descriptor_count(),
            "capture parsed"
        );
        self.snapshot
    }

    /// Current open-context state, exposed for tests.
    pub fn state(&self) -> &ParserState {
        &self.state
    }
}

/// Typed decoding for recognized process fields; anything else is kept as
/// an opaque extension attribute.
fn set_process_field(
    rec: &mut ProcessRecord,
    field: char,
    value: &str,
    line: usize,
) -> Result<(), ParseError> {
    match field {
        'c' => rec.command = Some(value.to_string()),
        'L' => rec.login = Some(value.to_string()),
        'R' => {
            rec.parent = Some(value.parse().map_err(|_| ParseError::InvalidNumber {
                line,
                field,
                value: value.to_string(),
            })?)
        }
        _ => {
            rec.extra.insert(field, value.to_string());
        }
    }
    Ok(())
}

/// Typed decoding for recognized descriptor fields.
fn set_descriptor_field(
    rec: &mut DescriptorRecord,
    field: char,
    value: &str,
    line: usize,
) -> Result<(), ParseError> {
    match field {
        't' => rec.kind = Some(super::DescriptorKind::decode(value)),
        'a' => rec.access = super::AccessMode::decode(value),
        'n' => rec.name = Some(value.to_string()),
        'P' => rec.protocol = Some(super::Protocol::decode(value)),
        'i' => {
            rec.inode = Some(value.parse().map_err(|_| ParseError::InvalidNumber {
                line,
                field,
                value: value.to_string(),
            })?)
        }
        'd' => rec.device = Some(value.to_string()),
        _ => {
            rec.extra.insert(field, value.to_string());
        }
    }
    Ok(())
}

/// Parses a whole capture from a buffered reader.
pub fn parse_capture<R: BufRead>(reader: R) -> Result<Snapshot, ParseError> {
    let mut parser = Parser::new();
    for line in reader.lines() {
        parser.feed_line(&line?)?;
    }
    Ok(parser.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AccessMode, DescriptorKind, Protocol};

    fn parse_str(input: &str) -> Result<Snapshot, ParseError> {
        parse_capture(input.as_bytes())
    }

    #[test]
    fn test_parse_single_process() {
        let snap = parse_str("p10\ncbash\nLroot\nR1\n").unwrap();
        assert_eq!(snap.processes.len(), 1);
        let rec = &snap.processes[&10];
        assert_eq!(rec.command.as_deref(), Some("bash"));
        assert_eq!(rec.login.as_deref(), Some("root"));
        assert_eq!(rec.parent, Some(1));
        assert!(rec.is_resident());
    }

    #[test]
    fn test_parse_descriptor_attributes() {
        let snap = parse_str("p10\ncbash\nf4\ntunix\nau\ni12345\nn/run/x.sock\n").unwrap();
        let fds = &snap.descriptors[&10];
        let rec = &fds[&FdId::Num(4)];
        assert_eq!(rec.kind, Some(DescriptorKind::Unix));
        assert_eq!(rec.access, Some(AccessMode::ReadWrite));
        assert_eq!(rec.inode, Some(12345));
        assert_eq!(rec.name.as_deref(), Some("/run/x.sock"));
    }

    #[test]
    fn test_process_attributes_after_descriptor_go_to_descriptor() {
        // Once a descriptor is open, attribute lines attach to it until the
        // next structural line.
        let snap = parse_str("p10\nf4\ntIPv4\nPTCP\np20\ncsshd\n").unwrap();
        assert_eq!(
            snap.descriptors[&10][&FdId::Num(4)].protocol,
            Some(Protocol::Tcp)
        );
        // `c` after the second `p` attaches to process 20, not the fd
        assert_eq!(snap.processes[&20].command.as_deref(), Some("sshd"));
    }

    #[test]
    fn test_unrecognized_fields_are_retained() {
        let snap = parse_str("p10\ng77\nf4\ntREG\no0t0\n").unwrap();
        assert_eq!(snap.processes[&10].extra[&'g'], "77");
        assert_eq!(snap.descriptors[&10][&FdId::Num(4)].extra[&'o'], "0t0");
    }

    #[test]
    fn test_attribute_before_process_is_fatal() {
        let err = parse_str("cbash\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::AttributeBeforeProcess { field: 'c', .. }
        ));
    }

    #[test]
    fn test_descriptor_before_process_is_fatal() {
        let err = parse_str("f4\ntunix\n").unwrap_err();
        assert!(matches!(err, ParseError::DescriptorBeforeProcess { .. }));
    }

    #[test]
    fn test_non_numeric_pid_is_fatal() {
        let err = parse_str("pxyz\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidPid { .. }));
    }

    #[test]
    fn test_non_numeric_parent_is_fatal() {
        let err = parse_str("p10\nRnone\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidNumber { field: 'R', .. }
        ));
    }

    #[test]
    fn test_empty_lines_are_ignored() {
        let snap = parse_str("\np10\n\ncbash\n\n").unwrap();
        assert_eq!(snap.processes[&10].command.as_deref(), Some("bash"));
    }

    #[test]
    fn test_state_transitions() {
        let mut parser = Parser::new();
        assert_eq!(parser.state().current_pid, None);
        parser.feed_line("p10").unwrap();
        assert_eq!(parser.state().current_pid, Some(10));
        assert_eq!(parser.state().current_fd, None);
        parser.feed_line("f4").unwrap();
        assert_eq!(parser.state().current_fd, Some(FdId::Num(4)));
        // New process closes the descriptor context
        parser.feed_line("p20").unwrap();
        assert_eq!(parser.state().current_pid, Some(20));
        assert_eq!(parser.state().current_fd, None);
    }

    #[test]
    fn test_duplicate_fd_accumulates_fields() {
        let snap = parse_str("p10\nf4\ntunix\np10\nf4\ni999\n").unwrap();
        let rec = &snap.descriptors[&10][&FdId::Num(4)];
        assert_eq!(rec.kind, Some(DescriptorKind::Unix));
        assert_eq!(rec.inode, Some(999));
    }
}
