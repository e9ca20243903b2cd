//! Implementation of `mapverify report <results.json>`.
//!
//! Re-renders the markdown report from a persisted pipeline or integration
//! results document and writes it to stdout. Documents carrying a
//! `suiteName` field are integration results; everything else is read as a
//! pipeline run.
use mapverify_core::{IntegrationRun, PipelineRun, render_integration, render_pipeline};

use crate::PathOrStdin;
use crate::cmd::Context;
use crate::error::CliError;
use crate::io::{parse_json, read_input};

/// Runs the `report` command.
///
/// # Errors
///
/// Returns the read errors, or [`CliError::ParseFailed`] when the document
/// is neither kind of results file.
pub fn run(ctx: &Context, results: &PathOrStdin) -> Result<(), CliError> {
    let label = results.label();
    let content = read_input(results, ctx.max_file_size)?;
    let markdown = render(&label, &content)?;
    ctx.stdout_text(&markdown)
}

fn render(label: &str, content: &str) -> Result<String, CliError> {
    let value: serde_json::Value = parse_json(label, content)?;
    if value.get("suiteName").is_some() {
        let run: IntegrationRun = from_value(label, value)?;
        Ok(render_integration(&run))
    } else {
        let run: PipelineRun = from_value(label, value)?;
        Ok(render_pipeline(&run))
    }
}

fn from_value<T: serde::de::DeserializeOwned>(
    label: &str,
    value: serde_json::Value,
) -> Result<T, CliError> {
    serde_json::from_value(value).map_err(|e| CliError::ParseFailed {
        source: label.to_owned(),
        detail: e.to_string(),
    })
}
