//! Integration tests for configuration loading and precedence.

use fdgraph::cli::Args;
use fdgraph::config::{load_config, resolve_config, validate_effective_config, Config};

use clap::Parser;
use std::io::Write;
use tempfile::NamedTempFile;

fn args_from(argv: &[&str]) -> Args {
    Args::try_parse_from(argv).expect("argv should parse")
}

#[test]
fn test_load_yaml_config() {
    let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(file, "rankdir: TB\nlsof_path: /usr/bin/lsof").unwrap();

    let cfg = load_config(file.path().to_str()).unwrap();
    assert_eq!(cfg.rankdir.as_deref(), Some("TB"));
    assert_eq!(cfg.lsof_path.as_deref(), Some("/usr/bin/lsof"));
}

#[test]
fn test_load_json_config() {
    let mut file = NamedTempFile::with_suffix(".json").unwrap();
    writeln!(file, "{{\"rankdir\": \"BT\", \"enable_udp\": false}}").unwrap();

    let cfg = load_config(file.path().to_str()).unwrap();
    assert_eq!(cfg.rankdir.as_deref(), Some("BT"));
    assert_eq!(cfg.enable_udp, Some(false));
}

#[test]
fn test_load_toml_config() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(file, "rankdir = \"RL\"\nexclude_names = [\"chrome\"]").unwrap();

    let cfg = load_config(file.path().to_str()).unwrap();
    assert_eq!(cfg.rankdir.as_deref(), Some("RL"));
    assert_eq!(cfg.exclude_names, Some(vec!["chrome".to_string()]));
}

#[test]
fn test_cli_overrides_config_file() {
    let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(file, "rankdir: TB").unwrap();

    let path = file.path().to_str().unwrap().to_string();
    let args = args_from(&["fdgraph", "-c", &path, "--rankdir", "RL"]);
    let cfg = resolve_config(&args).unwrap();
    assert_eq!(cfg.rankdir.as_deref(), Some("RL"));
}

#[test]
fn test_no_config_uses_defaults() {
    let args = args_from(&["fdgraph", "--no-config"]);
    let cfg = resolve_config(&args).unwrap();
    assert_eq!(cfg.rankdir, Config::default().rankdir);
    assert_eq!(cfg.lsof_path, Config::default().lsof_path);
}

#[test]
fn test_comma_separated_name_filters() {
    let args = args_from(&[
        "fdgraph",
        "--no-config",
        "--include-names",
        "nginx, postgres",
        "--exclude-names",
        "chrome",
    ]);
    let cfg = resolve_config(&args).unwrap();
    assert_eq!(
        cfg.include_names,
        Some(vec!["nginx".to_string(), "postgres".to_string()])
    );
    assert_eq!(cfg.exclude_names, Some(vec!["chrome".to_string()]));
}

#[test]
fn test_no_ancestry_flag() {
    let args = args_from(&["fdgraph", "--no-config", "--no-ancestry"]);
    let cfg = resolve_config(&args).unwrap();
    assert_eq!(cfg.show_ancestry, Some(false));
}

#[test]
fn test_invalid_rankdir_from_file_fails_validation() {
    let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(file, "rankdir: SIDEWAYS").unwrap();

    let cfg = load_config(file.path().to_str()).unwrap();
    assert!(validate_effective_config(&cfg).is_err());
}

#[test]
fn test_lsof_passthrough_args_after_double_dash() {
    let args = args_from(&["fdgraph", "--", "-u", "root", "-p", "123"]);
    assert_eq!(args.lsof_args, vec!["-u", "root", "-p", "123"]);
}
