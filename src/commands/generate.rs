//! Generate testdata command implementation.
//!
//! Emits a synthetic `lsof -F` capture with a mix of unconnected
//! processes, communicating pairs for each channel class, and one kernel
//! thread, so every pipeline stage has something to chew on.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use ahash::AHashSet as HashSet;
use rand::Rng;
use tracing::debug;

const COMMANDS: &[&str] = &[
    "nginx",
    "postgres",
    "redis-server",
    "bash",
    "sshd",
    "cron",
    "dbus-daemon",
    "systemd-journal",
];

const LOGINS: &[&str] = &["root", "daemon", "www-data", "postgres"];

/// Generates a synthetic capture file for testing purposes.
pub fn command_generate_testdata(
    output: PathBuf,
    processes: usize,
    unix_pairs: usize,
    fifo_pairs: usize,
    tcp_pairs: usize,
) -> anyhow::Result<()> {
    debug!(
        "Generating testdata: processes={}, unix_pairs={}, fifo_pairs={}, tcp_pairs={}",
        processes, unix_pairs, fifo_pairs, tcp_pairs
    );

    let mut rng = rand::thread_rng();
    let mut used_pids = HashSet::new();
    let mut out = String::new();

    let mut next_pid = |rng: &mut rand::rngs::ThreadRng| -> u32 {
        loop {
            let pid = rng.gen_range(100..30000);
            if used_pids.insert(pid) {
                return pid;
            }
        }
    };

    // Unconnected background processes with ordinary descriptors
    for _ in 0..processes {
        let pid = next_pid(&mut rng);
        push_process(&mut out, pid, &mut rng);
        let _ = writeln!(out, "fcwd\ntDIR\nn/");
        let _ = writeln!(
            out,
            "f{}\ntREG\nar\ni{}\nn/var/log/syslog",
            rng.gen_range(3..10),
            rng.gen_range(10_000..100_000)
        );
    }

    // Unix-socket connected pairs sharing an inode
    for _ in 0..unix_pairs {
        let inode: u64 = rng.gen_range(100_000..999_999);
        for _ in 0..2 {
            let pid = next_pid(&mut rng);
            push_process(&mut out, pid, &mut rng);
            let _ = writeln!(
                out,
                "f{}\ntunix\nau\ni{}\nnsocket",
                rng.gen_range(3..10),
                inode
            );
        }
    }

    // FIFO pairs: one writer, one reader
    for _ in 0..fifo_pairs {
        let inode: u64 = rng.gen_range(100_000..999_999);
        let writer = next_pid(&mut rng);
        push_process(&mut out, writer, &mut rng);
        let _ = writeln!(out, "f{}\ntFIFO\naw\ni{}\nnpipe", rng.gen_range(3..10), inode);
        let reader = next_pid(&mut rng);
        push_process(&mut out, reader, &mut rng);
        let _ = writeln!(out, "f{}\ntFIFO\nar\ni{}\nnpipe", rng.gen_range(3..10), inode);
    }

    // TCP pairs: each side records the endpoints in its own order
    for _ in 0..tcp_pairs {
        let port_a: u16 = rng.gen_range(1024..65000);
        let port_b: u16 = rng.gen_range(1024..65000);
        let a = format!("127.0.0.1:{}", port_a);
        let b = format!("127.0.0.1:{}", port_b);

        let pid = next_pid(&mut rng);
        push_process(&mut out, pid, &mut rng);
        let _ = writeln!(
            out,
            "f{}\ntIPv4\nau\nPTCP\nn{}->{}",
            rng.gen_range(3..10),
            a,
            b
        );
        let pid = next_pid(&mut rng);
        push_process(&mut out, pid, &mut rng);
        let _ = writeln!(
            out,
            "f{}\ntIPv4\nau\nPTCP\nn{}->{}",
            rng.gen_range(3..10),
            b,
            a
        );
    }

    // One kernel worker thread, to exercise the filter
    let pid = next_pid(&mut rng);
    let _ = writeln!(out, "p{}\nckworker/0:1\nLroot\nR2", pid);
    let _ = writeln!(out, "ftxt\ntunknown");

    if output.to_string_lossy() == "-" {
        print!("{}", out);
    } else {
        fs::write(&output, &out)?;
        println!("✅ Testdata capture written to: {}", output.display());
    }

    Ok(())
}

/// Writes one process header block: pid, command, login, parent.
fn push_process(out: &mut String, pid: u32, rng: &mut rand::rngs::ThreadRng) {
    let command = COMMANDS[rng.gen_range(0..COMMANDS.len())];
    let login = LOGINS[rng.gen_range(0..LOGINS.len())];
    // Roughly a third of the processes hang directly off init
    let parent = if rng.gen_bool(0.33) {
        1
    } else {
        rng.gen_range(2..100)
    };
    let _ = writeln!(out, "p{}\nc{}\nL{}\nR{}", pid, command, login, parent);
}
