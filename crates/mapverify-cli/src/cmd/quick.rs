//! Implementation of `mapverify quick <source>`.
//!
//! Runs connectivity and data integrity only. Nothing is persisted.
//!
//! Exit codes:
//! - 0 = healthy
//! - 1 = unhealthy
//! - 2 = the inputs could not be read or are malformed
use mapverify_core::{HealthStatus, quick_health_check};

use crate::cmd::{Context, load_test_data};
use crate::error::CliError;
use crate::format::write_health_human;
use crate::{InputArgs, OutputFormat};

/// Runs the `quick` command.
///
/// # Errors
///
/// - [`CliError::Structural`] and the read errors when the inputs are bad.
/// - [`CliError::Unhealthy`] when either check did not pass.
pub fn run(ctx: &Context, input: &InputArgs) -> Result<(), CliError> {
    let data = load_test_data(ctx, input)?;
    let check = quick_health_check(&data)?;

    match ctx.format {
        OutputFormat::Human => ctx.stderr(|w| write_health_human(w, &check, &ctx.formatter))?,
        OutputFormat::Json => ctx.stdout_json(&check)?,
    }

    match check.status {
        HealthStatus::Healthy => Ok(()),
        HealthStatus::Unhealthy => Err(CliError::Unhealthy),
    }
}
