//! Check command implementation.
//!
//! Runs the parse/filter/correlate stages over a capture and prints a
//! summary report instead of a graph. Useful for verifying that a saved
//! capture is well-formed before rendering it.

use std::path::Path;

use anyhow::Context;
use chrono::Local;

use crate::capture;
use crate::config::Config;
use crate::link::{correlate, ChannelClass};
use crate::record::{filter, parse_capture};

/// Validates a capture and prints a correlation summary.
pub fn command_check(input: Option<&Path>, verbose: bool, config: &Config) -> anyhow::Result<()> {
    let lsof_path = config.lsof_path.as_deref().unwrap_or("lsof");
    let raw = capture::acquire(input, lsof_path, &[]).context("failed to acquire capture")?;

    println!("🔍 fdgraph capture check");
    println!("========================");
    println!("Checked at: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!();

    let mut snapshot = match parse_capture(raw.as_bytes()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Capture is malformed: {}", e);
            std::process::exit(1);
        }
    };

    let total_processes = snapshot.processes.len();
    let total_descriptors = snapshot.descriptor_count();
    let kernel_threads = filter::drop_kernel_threads(&mut snapshot);
    let name_filtered = filter::apply_name_filters(&mut snapshot, config);

    println!("Processes:            {}", total_processes);
    println!("Descriptors:          {}", total_descriptors);
    println!("Kernel threads:       {} (dropped)", kernel_threads);
    if name_filtered > 0 {
        println!("Name-filtered:        {} (dropped)", name_filtered);
    }

    let links = match correlate(&snapshot) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("❌ Correlation failed: {}", e);
            std::process::exit(1);
        }
    };

    for class in [
        ChannelClass::Unix,
        ChannelClass::Fifo,
        ChannelClass::Tcp,
        ChannelClass::Udp,
    ] {
        let count = links.iter().filter(|l| l.class == class).count();
        println!("{:<4} links:           {}", class.label(), count);
    }

    if verbose && !links.is_empty() {
        println!();
        println!("Links:");
        for link in &links {
            println!(
                "  {} <-> {}  [{}] {}",
                link.src,
                link.dst,
                link.class.label(),
                link.key
            );
        }
    }

    println!();
    println!("✅ Capture parsed and correlated cleanly");
    Ok(())
}
