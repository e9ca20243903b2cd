#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::path::Path;

use clap::{CommandFactory, Parser};

use super::*;

#[test]
fn root_help_lists_all_subcommands() {
    let mut cmd = Cli::command();
    let help = format!("{}", cmd.render_help());
    for name in ["quick", "full", "report"] {
        assert!(
            help.contains(name),
            "root help should mention subcommand '{name}'"
        );
    }
}

#[test]
fn root_help_lists_global_flags() {
    let mut cmd = Cli::command();
    let help = format!("{}", cmd.render_help());
    for flag in [
        "--output",
        "--history",
        "--history-retention",
        "--format",
        "--quiet",
        "--verbose",
        "--no-color",
        "--log-json",
        "--max-file-size",
        "--version",
    ] {
        assert!(help.contains(flag), "root help should mention flag '{flag}'");
    }
}

#[test]
fn full_help_mentions_its_switches() {
    let mut cmd = Cli::command();
    let sub = cmd
        .find_subcommand_mut("full")
        .expect("full subcommand should exist");
    let help = format!("{}", sub.render_help());
    for flag in ["--performance", "--integration", "--fail-fast", "--regions", "--critical"] {
        assert!(help.contains(flag), "full help should mention {flag}");
    }
    assert!(help.contains("SOURCE"));
}

#[test]
fn quick_takes_a_source_and_optional_inputs() {
    let cli = Cli::try_parse_from([
        "mapverify",
        "quick",
        "world.json",
        "--critical",
        "critical.json",
    ])
    .expect("should parse");
    let Command::Quick { input } = cli.command else {
        panic!("expected Quick subcommand");
    };
    assert!(matches!(input.source, PathOrStdin::Path(ref p) if p == Path::new("world.json")));
    assert_eq!(input.critical.as_deref(), Some(Path::new("critical.json")));
    assert!(input.regions.is_none());
}

#[test]
fn dash_means_stdin() {
    let cli = Cli::try_parse_from(["mapverify", "quick", "-"]).expect("should parse");
    let Command::Quick { input } = cli.command else {
        panic!("expected Quick subcommand");
    };
    assert!(matches!(input.source, PathOrStdin::Stdin));
    assert_eq!(input.source.label(), "-");
}

#[test]
fn full_flags_default_off() {
    let cli = Cli::try_parse_from(["mapverify", "full", "world.json"]).expect("should parse");
    let Command::Full {
        performance,
        integration,
        fail_fast,
        ..
    } = cli.command
    else {
        panic!("expected Full subcommand");
    };
    assert!(!performance && !integration && !fail_fast);
}

#[test]
fn integration_conflicts_with_pre_split_regions() {
    let result = Cli::try_parse_from([
        "mapverify",
        "full",
        "world.json",
        "--integration",
        "--regions",
        "split/",
    ]);
    assert!(result.is_err());
}

#[test]
fn expected_counts_require_integration() {
    let result = Cli::try_parse_from(["mapverify", "full", "world.json", "--expect-rooms", "6"]);
    assert!(result.is_err());

    let cli = Cli::try_parse_from([
        "mapverify",
        "full",
        "world.json",
        "--integration",
        "--expect-rooms",
        "6",
        "--expect-regions",
        "3",
    ])
    .expect("should parse");
    let Command::Full { expect, .. } = cli.command else {
        panic!("expected Full subcommand");
    };
    assert_eq!(expect.expect_rooms, Some(6));
    assert_eq!(expect.expect_regions, Some(3));
    assert_eq!(expect.expect_cross_region, None);
}

#[test]
fn quiet_and_verbose_conflict() {
    let result = Cli::try_parse_from(["mapverify", "-q", "-v", "quick", "world.json"]);
    assert!(result.is_err());
}

#[test]
fn history_defaults_into_the_output_directory() {
    let cli = Cli::try_parse_from(["mapverify", "--output", "out", "full", "world.json"])
        .expect("should parse");
    assert_eq!(cli.history_path(), Path::new("out").join("test-history.json"));

    let cli = Cli::try_parse_from([
        "mapverify",
        "full",
        "world.json",
        "--history",
        "runs.json",
    ])
    .expect("global flag after the subcommand");
    assert_eq!(cli.history_path(), Path::new("runs.json"));
}

#[test]
fn history_retention_defaults_and_rejects_zero() {
    let cli = Cli::try_parse_from(["mapverify", "full", "world.json"]).expect("should parse");
    assert_eq!(cli.history_retention, DEFAULT_RETENTION);

    let cli = Cli::try_parse_from(["mapverify", "full", "world.json", "--history-retention", "5"])
        .expect("should parse");
    assert_eq!(cli.history_retention, 5);

    assert!(
        Cli::try_parse_from(["mapverify", "full", "world.json", "--history-retention", "0"])
            .is_err()
    );
}

#[test]
fn json_format_is_accepted() {
    let cli = Cli::try_parse_from(["mapverify", "-f", "json", "report", "results.json"])
        .expect("should parse");
    assert_eq!(cli.format, OutputFormat::Json);
}
