/// Result formatting: human-readable and JSON modes.
///
/// - **Human mode** (default): one line per suite or stage with its status,
///   the issues beneath it tagged `[E]`/`[W]`/`[I]`, then an overall line. All
///   of it goes to stderr. Colors are disabled when `--no-color` is set, the
///   `NO_COLOR` environment variable is present (per <https://no-color.org>),
///   or stderr is not a TTY.
/// - **JSON mode**: the run summary is written as one JSON object to stdout.
///
/// Quiet mode keeps only error issues and drops the summary lines.
use std::io::{IsTerminal as _, Write};

use mapverify_core::integration::IntegrationRun;
use mapverify_core::pipeline::RegressionStatus;
use mapverify_core::{HealthCheck, Issue, PipelineRun, Severity, Status};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Color support detection
// ---------------------------------------------------------------------------

/// Returns `true` if ANSI color codes should be emitted to stderr.
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}

const ANSI_RED: &str = "\x1b[31m";
const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// FormatterConfig
// ---------------------------------------------------------------------------

/// Configuration for the formatter, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Whether ANSI colors are enabled.
    pub colors: bool,
    /// Suppress all non-error stderr output.
    pub quiet: bool,
    /// Emit timing to stderr.
    pub verbose: bool,
}

impl FormatterConfig {
    /// Constructs a [`FormatterConfig`] from the raw CLI flags.
    pub fn from_flags(no_color_flag: bool, quiet: bool, verbose: bool) -> Self {
        Self {
            colors: colors_enabled(no_color_flag),
            quiet,
            verbose,
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.colors {
            format!("{color}{text}{ANSI_RESET}")
        } else {
            text.to_owned()
        }
    }

    fn status(&self, status: Status) -> String {
        let color = match status {
            Status::Pass => ANSI_GREEN,
            Status::Partial => ANSI_YELLOW,
            Status::Fail => ANSI_RED,
        };
        self.paint(color, &format!("{:<7}", status.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Human mode
// ---------------------------------------------------------------------------

/// Writes a single [`Issue`] indented under its suite.
///
/// Format: `  [E] DI-02 room "docks_1": missing from every region bundle`
///
/// In quiet mode, warnings and info are suppressed.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_issue_human<W: Write>(
    writer: &mut W,
    issue: &Issue,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet {
        match issue.severity {
            Severity::Warning | Severity::Info => return Ok(()),
            Severity::Error => {}
        }
    }

    let (tag, color) = match issue.severity {
        Severity::Error => ("[E]", ANSI_RED),
        Severity::Warning => ("[W]", ANSI_YELLOW),
        Severity::Info => ("[I]", ANSI_CYAN),
    };
    writeln!(
        writer,
        "  {} {} {}: {}",
        config.paint(color, tag),
        issue.kind,
        issue.subject,
        issue.message
    )
}

/// Writes one line per suite with its issues, then the regression verdict
/// and the overall grade.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_pipeline_human<W: Write>(
    writer: &mut W,
    run: &PipelineRun,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    for report in &run.results {
        if !config.quiet {
            writeln!(
                writer,
                "{:<14} {} score {:>5.1}{}",
                report.name().as_str(),
                config.status(report.status()),
                report.score(),
                timing(report.execution_time_ms(), config),
            )?;
        }
        for issue in report.issues() {
            write_issue_human(writer, issue, config)?;
        }
    }
    for failure in &run.failed {
        writeln!(
            writer,
            "{:<14} {} {}",
            failure.suite.as_str(),
            config.paint(ANSI_RED, "ERROR  "),
            failure.error
        )?;
    }
    if config.quiet {
        return Ok(());
    }

    match run.regression.status {
        RegressionStatus::NoBaseline => writeln!(writer, "regression: no baseline")?,
        RegressionStatus::Stable => writeln!(writer, "regression: stable")?,
        RegressionStatus::RegressionDetected => writeln!(
            writer,
            "regression: {}",
            config.paint(
                ANSI_RED,
                &format!(
                    "{} {} detected",
                    run.regression.regressions.len(),
                    pluralize(run.regression.regressions.len(), "regression", "regressions")
                )
            )
        )?,
    }
    writeln!(
        writer,
        "overall: {} ({:.1}), {} {}, {} failed to run",
        run.overall_grade,
        run.overall_score,
        run.completed.len(),
        pluralize(run.completed.len(), "suite completed", "suites completed"),
        run.failed.len(),
    )?;
    write_timing_human(writer, "pipeline finished", run.duration_ms, config)
}

/// Writes the two health checks and the overall verdict.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_health_human<W: Write>(
    writer: &mut W,
    check: &HealthCheck,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    let conn = &check.connectivity;
    writeln!(
        writer,
        "{:<14} {} {} rooms, {} {}, {} isolated",
        "connectivity",
        config.status(conn.status),
        conn.total_rooms,
        conn.components,
        pluralize(conn.components, "component", "components"),
        conn.isolated_rooms,
    )?;
    let integ = &check.data_integrity;
    writeln!(
        writer,
        "{:<14} {} {} {}, {} {}",
        "dataIntegrity",
        config.status(integ.status),
        integ.errors,
        pluralize(integ.errors, "error", "errors"),
        integ.warnings,
        pluralize(integ.warnings, "warning", "warnings"),
    )?;
    writeln!(
        writer,
        "health: {:?} ({:.0}%)",
        check.status, check.overall_score
    )
}

/// Writes one line per stage, the stage recommendations and the expected
/// against actual counts.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_integration_human<W: Write>(
    writer: &mut W,
    run: &IntegrationRun,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    for issue in run
        .setup
        .issues
        .iter()
        .chain(run.map_splitting.issues.iter())
    {
        writeln!(writer, "  {} {issue}", config.paint(ANSI_YELLOW, "[W]"))?;
    }
    if let Some(error) = &run.map_splitting.error {
        writeln!(writer, "  {} {error}", config.paint(ANSI_RED, "[E]"))?;
    }
    for (stage, status) in run.stage_statuses() {
        writeln!(writer, "{:<17} {}", stage.as_str(), config.status(status))?;
    }
    for rec in &run.recommendations {
        writeln!(writer, "  {} ({} priority)", rec.message, rec.priority)?;
        for suggestion in &rec.suggestions {
            writeln!(writer, "    - {suggestion}")?;
        }
    }
    let m = &run.metrics;
    writeln!(
        writer,
        "rooms {}/{}, regions {}/{}, cross-region connections {}/{}",
        m.actual_rooms,
        m.expected_rooms,
        m.actual_regions,
        m.expected_regions,
        m.actual_cross_region_connections,
        m.expected_cross_region_connections,
    )?;
    writeln!(writer, "integration: {}", config.status(run.status).trim_end())?;
    write_timing_human(writer, "integration finished", run.duration_ms, config)
}

/// Writes timing information in verbose mode; a no-op otherwise.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_timing_human<W: Write>(
    writer: &mut W,
    label: &str,
    duration_ms: u64,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if !config.verbose {
        return Ok(());
    }
    writeln!(writer, "{label} in {duration_ms}ms")
}

fn timing(ms: u64, config: &FormatterConfig) -> String {
    if config.verbose {
        format!(" ({ms}ms)")
    } else {
        String::new()
    }
}

// ---------------------------------------------------------------------------
// JSON mode
// ---------------------------------------------------------------------------

/// Writes `value` as a single-line JSON object followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json_line<W: Write, T: Serialize + ?Sized>(
    writer: &mut W,
    value: &T,
) -> std::io::Result<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writeln!(writer)
}

fn pluralize<'a>(n: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if n == 1 { singular } else { plural }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
