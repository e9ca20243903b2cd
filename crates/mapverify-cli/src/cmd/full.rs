//! Implementation of `mapverify full <source>`.
//!
//! Without `--integration` the verification pipeline runs over the source and
//! its split, appends the run to the history file and writes the results,
//! summary and report into the output directory. With `--integration` the
//! integration suite partitions the source itself, writes the region files
//! next to its own results, and leaves the history untouched.
//!
//! Exit codes:
//! - 0 = every suite (or stage) completed and none reported FAIL
//! - 1 = a suite reported FAIL or could not run, fail-fast stopped the run,
//!   or the results could not be written
//! - 2 = the inputs could not be read or are malformed
use mapverify_core::{
    IntegrationConfig, IntegrationError, IntegrationRun, IntegrationSuite, Pipeline,
    PipelineConfig, PipelineError, PipelineRun, PipelineStatus, Status, SuiteName,
};

use crate::cmd::{Context, load_critical, load_source, load_test_data, partitioner_for};
use crate::error::CliError;
use crate::format::{write_integration_human, write_pipeline_human};
use crate::store::{DirectoryArtifacts, JsonFileHistory};
use crate::{ExpectArgs, InputArgs, OutputFormat};

/// Runs the verification pipeline.
///
/// # Errors
///
/// - [`CliError::Structural`] when setup validation rejects the input.
/// - [`CliError::Aborted`] when fail-fast stopped the run.
/// - [`CliError::Persistence`] when results could not be written; the run
///   is still printed first.
/// - [`CliError::VerificationFailed`] when a suite failed or could not run.
pub fn run_pipeline(
    ctx: &Context,
    input: &InputArgs,
    performance: bool,
    fail_fast: bool,
) -> Result<(), CliError> {
    let data = load_test_data(ctx, input)?;
    let partitioner = partitioner_for(&data.critical);

    let mut config = PipelineConfig::default();
    if performance {
        config.suites.push(SuiteName::Performance);
    }
    config.fail_fast = fail_fast;

    let mut history = JsonFileHistory::new(&ctx.history).with_retention(ctx.history_retention);
    let mut artifacts = DirectoryArtifacts::new(&ctx.output);
    let outcome = Pipeline::new(config)
        .with_partitioner(&partitioner)
        .run(&data, &mut history, &mut artifacts);

    let run = match outcome {
        Ok(run) => run,
        Err(PipelineError::Structural(e)) => return Err(e.into()),
        Err(PipelineError::Aborted(e)) => {
            return Err(CliError::Aborted {
                detail: format!("pipeline aborted: {e}"),
            });
        }
        Err(PipelineError::Persistence { run, source }) => {
            emit_pipeline(ctx, &run)?;
            return Err(source.into());
        }
    };

    emit_pipeline(ctx, &run)?;
    for path in artifacts.written() {
        tracing::info!(path = %path.display(), "result written");
    }

    if run.status != PipelineStatus::Passed || run.any_suite_failed() {
        return Err(CliError::VerificationFailed);
    }
    Ok(())
}

fn emit_pipeline(ctx: &Context, run: &PipelineRun) -> Result<(), CliError> {
    match ctx.format {
        OutputFormat::Human => ctx.stderr(|w| write_pipeline_human(w, run, &ctx.formatter)),
        OutputFormat::Json => ctx.stdout_json(&run.summary()),
    }
}

/// Runs the integration suite: partition, pipeline, direct checks and,
/// with `performance`, the benchmark limits.
///
/// # Errors
///
/// - [`CliError::Structural`] when the source is malformed.
/// - [`CliError::Persistence`] when region files or results could not be
///   written; the run is still printed first.
/// - [`CliError::VerificationFailed`] when any stage reported FAIL.
pub fn run_integration(
    ctx: &Context,
    input: &InputArgs,
    performance: bool,
    expect: &ExpectArgs,
) -> Result<(), CliError> {
    let (source, label) = load_source(ctx, input)?;
    let critical = load_critical(ctx, input.critical.as_deref())?;
    let partitioner = partitioner_for(&critical);

    let defaults = IntegrationConfig::default();
    let config = IntegrationConfig {
        expected_rooms: expect.expect_rooms.unwrap_or(defaults.expected_rooms),
        expected_regions: expect.expect_regions.unwrap_or(defaults.expected_regions),
        expected_cross_region_connections: expect
            .expect_cross_region
            .unwrap_or(defaults.expected_cross_region_connections),
        source_file: Some(label),
        run_performance: performance,
        ..defaults
    };

    let mut history = JsonFileHistory::new(&ctx.history).with_retention(ctx.history_retention);
    let mut artifacts = DirectoryArtifacts::new(&ctx.output);
    let outcome = IntegrationSuite::new(config).run(
        &source,
        &critical,
        &partitioner,
        &mut history,
        &mut artifacts,
    );

    let run = match outcome {
        Ok(run) => run,
        Err(IntegrationError::Structural(e)) => return Err(e.into()),
        Err(IntegrationError::Persistence { run, source }) => {
            emit_integration(ctx, &run)?;
            return Err(source.into());
        }
    };

    emit_integration(ctx, &run)?;
    for path in artifacts.written() {
        tracing::info!(path = %path.display(), "result written");
    }

    match run.status {
        Status::Fail => Err(CliError::VerificationFailed),
        Status::Pass | Status::Partial => Ok(()),
    }
}

fn emit_integration(ctx: &Context, run: &IntegrationRun) -> Result<(), CliError> {
    match ctx.format {
        OutputFormat::Human => ctx.stderr(|w| write_integration_human(w, run, &ctx.formatter)),
        OutputFormat::Json => ctx.stdout_json(&run.summary()),
    }
}
