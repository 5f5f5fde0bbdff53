//! Descriptor correlation: groups retained descriptors by resource key and
//! realizes a link wherever exactly two distinct processes share one.
//!
//! The four partitions (unix, fifo, tcp, udp) are mutually independent. A
//! key held by one process, or by three or more, produces nothing: drawing
//! ambiguous multi-party sharing is deliberately out of scope.

use ahash::AHashMap as HashMap;
use thiserror::Error;
use tracing::debug;

use crate::record::{AccessMode, DescriptorKind, FdId, Pid, Protocol, Snapshot};

use super::{ChannelClass, Link, LinkDirection, ResourceKey};

/// Fatal conditions during correlation: every retained descriptor must be
/// classifiable, so a missing type attribute aborts the run.
#[derive(Debug, Error)]
pub enum CorrelateError {
    #[error("descriptor {fd} of process {pid} has no type attribute")]
    UntypedDescriptor { pid: Pid, fd: FdId },
}

/// Per-key holders within one partition: pid mapped to the access mode of
/// its (last seen) descriptor under that key.
pub type Partition = HashMap<ResourceKey, HashMap<Pid, Option<AccessMode>>>;

/// The channel-class partitions. `pipe` is reserved: on Linux lsof reports
/// pipe endpoints with type `FIFO`, so under the observed type taxonomy no
/// descriptor is ever routed here.
#[derive(Debug, Default)]
pub struct LinkPartitions {
    pub unix: Partition,
    pub fifo: Partition,
    pub pipe: Partition,
    pub tcp: Partition,
    pub udp: Partition,
}

impl LinkPartitions {
    fn classes(&self) -> [(ChannelClass, &Partition); 5] {
        [
            (ChannelClass::Unix, &self.unix),
            (ChannelClass::Fifo, &self.fifo),
            (ChannelClass::Pipe, &self.pipe),
            (ChannelClass::Tcp, &self.tcp),
            (ChannelClass::Udp, &self.udp),
        ]
    }
}

/// Routes every retained (pid, descriptor) pair into its partition.
///
/// A descriptor missing the name/inode/device its class keys on is simply
/// excluded from correlation; only a missing type attribute is fatal.
pub fn partition(snapshot: &Snapshot) -> Result<LinkPartitions, CorrelateError> {
    let mut parts = LinkPartitions::default();

    for (pid, fds) in &snapshot.descriptors {
        for (fd, rec) in fds {
            let kind = rec.kind.as_ref().ok_or_else(|| {
                CorrelateError::UntypedDescriptor {
                    pid: *pid,
                    fd: fd.clone(),
                }
            })?;

            match kind {
                DescriptorKind::Unix => {
                    // Inode when lsof reports one, else the device id:
                    // both ends of a local socket expose the same value.
                    let key = rec
                        .inode
                        .map(ResourceKey::Inode)
                        .or_else(|| rec.device.clone().map(ResourceKey::Device));
                    if let Some(key) = key {
                        parts.unix.entry(key).or_default().insert(*pid, rec.access);
                    }
                }
                DescriptorKind::Fifo => {
                    if let Some(inode) = rec.inode {
                        parts
                            .fifo
                            .entry(ResourceKey::Inode(inode))
                            .or_default()
                            .insert(*pid, rec.access);
                    }
                }
                DescriptorKind::Ipv4 | DescriptorKind::Ipv6 => {
                    // Only established connections carry both endpoints;
                    // listening or one-sided sockets never pair up.
                    let key = rec.name.as_deref().and_then(ResourceKey::endpoints);
                    let (Some(key), Some(proto)) = (key, &rec.protocol) else {
                        continue;
                    };
                    let part = match proto {
                        Protocol::Tcp => &mut parts.tcp,
                        _ => &mut parts.udp,
                    };
                    part.entry(key).or_default().insert(*pid, rec.access);
                }
                DescriptorKind::Pipe | DescriptorKind::Other(_) => {}
            }
        }
    }

    Ok(parts)
}

/// Emits one link per key held by exactly two distinct processes, sorted
/// deterministically by (class, key, pids).
pub fn realize(parts: &LinkPartitions) -> Vec<Link> {
    let mut links = Vec::new();

    for (class, part) in parts.classes() {
        for (key, holders) in part {
            if holders.len() != 2 {
                continue;
            }
            let mut pids: Vec<Pid> = holders.keys().copied().collect();
            pids.sort_unstable();
            let (src, dst) = (pids[0], pids[1]);

            // Direction comes from the source participant's access mode: a
            // write-only end feeds the channel, a read-only end drains it.
            let direction = match holders[&src] {
                Some(AccessMode::Write) => LinkDirection::Forward,
                Some(AccessMode::Read) => LinkDirection::Backward,
                _ => LinkDirection::Both,
            };

            links.push(Link {
                class,
                key: key.clone(),
                src,
                dst,
                direction,
            });
        }
    }

    links.sort_by(|a, b| {
        (a.class, &a.key, a.src, a.dst).cmp(&(b.class, &b.key, b.src, b.dst))
    });
    links
}

/// Single-pass convenience: partition then realize.
pub fn correlate(snapshot: &Snapshot) -> Result<Vec<Link>, CorrelateError> {
    let parts = partition(snapshot)?;
    let links = realize(&parts);
    debug!(links = links.len(), "correlation finished");
    Ok(links)
}
