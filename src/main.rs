//! fdgraph - version 0.1.0
//!
//! Graphs inter-process communication channels from lsof output.
//! This is the main entry point that runs the pipeline and handles
//! subcommands.

use std::fs;
use std::io::Write;

use clap::Parser;
use tracing::{debug, error, info, Level};

use fdgraph::capture;
use fdgraph::cli::{Args, Commands, LogLevel};
use fdgraph::commands::{command_check, command_config, command_generate_testdata};
use fdgraph::config::{resolve_config, show_config, validate_effective_config, Config};
use fdgraph::graph;
use fdgraph::link::{correlate, ChannelClass};
use fdgraph::record::{filter, parse_capture};

/// Initializes tracing logging with the configured log level. Logs go to
/// stderr: stdout is reserved for the graph description.
fn setup_logging(args: &Args) {
    let log_level = match args.log_level {
        LogLevel::Off => Level::ERROR,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> anyhow::Result<Config> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Channel classes the configuration keeps enabled.
fn enabled_classes(config: &Config) -> Vec<ChannelClass> {
    let mut classes = Vec::new();
    if config.enable_unix.unwrap_or(true) {
        classes.push(ChannelClass::Unix);
    }
    if config.enable_fifo.unwrap_or(true) {
        classes.push(ChannelClass::Fifo);
        classes.push(ChannelClass::Pipe);
    }
    if config.enable_tcp.unwrap_or(true) {
        classes.push(ChannelClass::Tcp);
    }
    if config.enable_udp.unwrap_or(true) {
        classes.push(ChannelClass::Udp);
    }
    classes
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(&args);

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format);
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        // GenerateTestdata doesn't need config validation
        if let Commands::GenerateTestdata {
            output,
            processes,
            unix_pairs,
            fifo_pairs,
            tcp_pairs,
        } = command
        {
            return command_generate_testdata(
                output.clone(),
                *processes,
                *unix_pairs,
                *fifo_pairs,
                *tcp_pairs,
            );
        }

        let config = load_validated_config(&args)?;

        return match command {
            Commands::Check { verbose } => command_check(args.input.as_deref(), *verbose, &config),

            Commands::Config {
                output,
                format,
                commented,
            } => command_config(output.clone(), format.clone(), *commented),

            Commands::GenerateTestdata { .. } => unreachable!("GenerateTestdata handled above"),
        };
    }

    // Default mode: run the full pipeline
    let config = load_validated_config(&args)?;

    let lsof_path = config.lsof_path.as_deref().unwrap_or("lsof");
    let raw = match capture::acquire(args.input.as_deref(), lsof_path, &args.lsof_args) {
        Ok(raw) => raw,
        Err(e) => {
            // A failing inspection command forwards its exit status to our
            // caller; no graph output is produced.
            error!("{}", e);
            if let Some(status) = e.exit_status() {
                std::process::exit(status);
            }
            return Err(e.into());
        }
    };

    let mut snapshot = parse_capture(raw.as_bytes())?;
    info!(
        "Parsed {} processes, {} descriptors",
        snapshot.processes.len(),
        snapshot.descriptor_count()
    );

    let kernel_threads = filter::drop_kernel_threads(&mut snapshot);
    if kernel_threads > 0 {
        info!("Dropped {} kernel threads", kernel_threads);
    }
    filter::apply_name_filters(&mut snapshot, &config);

    let mut links = correlate(&snapshot)?;
    let enabled = enabled_classes(&config);
    links.retain(|l| enabled.contains(&l.class));
    debug!("Realized {} links", links.len());

    let dot = graph::render(&snapshot, &links, &config);

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{}\n", dot))?;
            info!("Graph written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", dot)?;
        }
    }

    Ok(())
}
