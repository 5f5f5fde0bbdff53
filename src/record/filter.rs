//! Process filtering applied between parsing and correlation.
//!
//! Two filters run here: the kernel-thread heuristic (always on) and the
//! optional include/exclude name filters from the configuration. A dropped
//! pid loses its process record and every descriptor, so it can neither
//! become a node nor participate in a link.

use tracing::debug;

use crate::config::Config;

use super::{Pid, Snapshot};

/// Pids classified as kernel worker threads: their `txt` (text segment)
/// descriptor carries the `unknown` type sentinel. Real user processes
/// always have a resolvable text segment.
pub fn kernel_thread_pids(snapshot: &Snapshot) -> Vec<Pid> {
    let mut pids: Vec<Pid> = snapshot
        .descriptors
        .iter()
        .filter(|(_, fds)| {
            fds.iter().any(|(fd, rec)| {
                fd.is_text_segment() && rec.kind.as_ref().is_some_and(|k| k.is_unknown())
            })
        })
        .map(|(pid, _)| *pid)
        .collect();
    pids.sort_unstable();
    pids
}

/// Drops every kernel-thread pid from both tables. Returns how many were
/// removed.
pub fn drop_kernel_threads(snapshot: &mut Snapshot) -> usize {
    let pids = kernel_thread_pids(snapshot);
    for pid in &pids {
        snapshot.remove_pid(*pid);
    }
    if !pids.is_empty() {
        debug!(count = pids.len(), "dropped kernel threads");
    }
    pids.len()
}

/// Determines if a process should be included based on configuration
/// filters. Exclude takes priority over include.
pub fn should_include_process(name: &str, cfg: &Config) -> bool {
    if let Some(ex) = &cfg.exclude_names {
        if ex.iter().any(|s| name.contains(s)) {
            return false;
        }
    }
    if let Some(inc) = &cfg.include_names {
        if !inc.is_empty() {
            return inc.iter().any(|s| name.contains(s));
        }
    }
    true
}

/// Applies the include/exclude name filters, dropping non-matching pids
/// from both tables. Returns how many were removed.
pub fn apply_name_filters(snapshot: &mut Snapshot, cfg: &Config) -> usize {
    if cfg.include_names.is_none() && cfg.exclude_names.is_none() {
        return 0;
    }
    let dropped: Vec<Pid> = snapshot
        .processes
        .iter()
        .filter(|(_, rec)| !should_include_process(rec.display_name(), cfg))
        .map(|(pid, _)| *pid)
        .collect();
    for pid in &dropped {
        snapshot.remove_pid(*pid);
    }
    if !dropped.is_empty() {
        debug!(count = dropped.len(), "dropped processes by name filter");
    }
    dropped.len()
}
