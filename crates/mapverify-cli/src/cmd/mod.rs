/// Command module for the `mapverify` CLI.
///
/// Each submodule implements one subcommand. Shared here: the [`Context`]
/// built from the global flags, dataset loading, and the stdout/stderr
/// writers.
pub mod full;
pub mod quick;
pub mod report;

use std::io::Write;
use std::path::{Path, PathBuf};

use mapverify_core::integrity::validate_source;
use mapverify_core::{
    CriticalReference, DistrictPartitioner, Partitioner as _, RegionBundle, SourceDataset,
    SplitData, TestData,
};
use serde::Serialize;

use crate::error::CliError;
use crate::format::{FormatterConfig, write_json_line};
use crate::io::{io_error_to_cli, parse_json, read_file, read_input};
use crate::{Cli, InputArgs, OutputFormat};

/// Settings every command shares.
#[derive(Debug, Clone)]
pub struct Context {
    pub format: OutputFormat,
    pub formatter: FormatterConfig,
    pub max_file_size: u64,
    /// Directory for result artifacts.
    pub output: PathBuf,
    /// History file.
    pub history: PathBuf,
    /// Records the history file keeps.
    pub history_retention: usize,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            formatter: FormatterConfig::from_flags(cli.no_color, cli.quiet, cli.verbose),
            max_file_size: cli.max_file_size,
            output: cli.output.clone(),
            history: cli.history_path(),
            history_retention: cli.history_retention,
        }
    }

    /// Runs `f` against a locked stderr.
    pub fn stderr<F>(&self, f: F) -> Result<(), CliError>
    where
        F: FnOnce(&mut std::io::StderrLock<'static>) -> std::io::Result<()>,
    {
        let mut err = std::io::stderr().lock();
        f(&mut err).map_err(|e| CliError::IoError {
            source: "stderr".to_owned(),
            detail: e.to_string(),
        })
    }

    /// Writes raw text to stdout.
    pub fn stdout_text(&self, text: &str) -> Result<(), CliError> {
        let mut out = std::io::stdout().lock();
        out.write_all(text.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| CliError::IoError {
                source: "stdout".to_owned(),
                detail: e.to_string(),
            })
    }

    /// Writes `value` as one JSON line to stdout.
    pub fn stdout_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), CliError> {
        let mut out = std::io::stdout().lock();
        write_json_line(&mut out, value).map_err(|e| CliError::IoError {
            source: "stdout".to_owned(),
            detail: e.to_string(),
        })
    }
}

/// The source dataset named by `input`, and the label it was read from.
pub fn load_source(ctx: &Context, input: &InputArgs) -> Result<(SourceDataset, String), CliError> {
    let label = input.source.label();
    let content = read_input(&input.source, ctx.max_file_size)?;
    let source = parse_json(&label, &content)?;
    Ok((source, label))
}

/// The critical-connection reference, or an empty one when none was given.
pub fn load_critical(ctx: &Context, path: Option<&Path>) -> Result<CriticalReference, CliError> {
    let Some(path) = path else {
        return Ok(CriticalReference::default());
    };
    let content = read_file(path, ctx.max_file_size)?;
    parse_json(&path.display().to_string(), &content)
}

/// A partitioner that maps districts to regions through the reference's
/// region mapping.
pub fn partitioner_for(critical: &CriticalReference) -> DistrictPartitioner {
    DistrictPartitioner::new(critical.region_mapping.clone())
}

/// Reads every `*.json` file in `dir` as a region bundle.
///
/// Bundles are keyed by their `region.id`, falling back to the file stem.
/// Two files claiming the same region are rejected.
pub fn load_regions(ctx: &Context, dir: &Path) -> Result<SplitData, CliError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_error_to_cli(&e, dir))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| io_error_to_cli(&e, dir))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut split = SplitData::new();
    for path in paths {
        let label = path.display().to_string();
        let content = read_file(&path, ctx.max_file_size)?;
        let bundle: RegionBundle = parse_json(&label, &content)?;
        let key = match bundle.region.as_ref().map(|r| r.id.as_str()) {
            Some(id) if !id.is_empty() => id.to_owned(),
            Some(_) | None => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        if split.contains_key(&key) {
            return Err(CliError::Structural {
                detail: format!("region {key:?} appears in more than one file ({label})"),
            });
        }
        tracing::debug!(region = %key, file = %label, rooms = bundle.room_count(), "region bundle loaded");
        split.insert(key, bundle);
    }
    Ok(split)
}

/// Assembles the pipeline input: the source, its split (read from
/// `--regions` or produced by the district partitioner) and the reference.
pub fn load_test_data(ctx: &Context, input: &InputArgs) -> Result<TestData, CliError> {
    let (source, label) = load_source(ctx, input)?;
    validate_source(&source)?;
    let critical = load_critical(ctx, input.critical.as_deref())?;
    let split = match &input.regions {
        Some(dir) => load_regions(ctx, dir)?,
        None => {
            let split = partitioner_for(&critical).partition(&source)?;
            tracing::info!(source = %label, regions = split.len(), "source partitioned by district");
            split
        }
    };
    Ok(TestData {
        source,
        split,
        critical,
    })
}
