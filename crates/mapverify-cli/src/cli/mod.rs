//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::builder::TypedValueParser as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use mapverify_core::DEFAULT_RETENTION;

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

impl PathOrStdin {
    /// `"-"` for stdin, otherwise the path as given.
    pub fn label(&self) -> String {
        match self {
            Self::Stdin => "-".to_owned(),
            Self::Path(p) => p.display().to_string(),
        }
    }
}

/// Output format for CLI commands.
///
/// `Human` writes issue lines and a summary to stderr. `Json` writes the run
/// summary as a single JSON object to stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, optionally colored output (default).
    Human,
    /// One JSON summary object on stdout.
    Json,
}

/// Where the datasets come from.
#[derive(Args, Clone, Debug)]
pub struct InputArgs {
    /// Source dataset (JSON), or `-` for stdin.
    #[arg(value_name = "SOURCE")]
    pub source: PathOrStdin,

    /// Directory of pre-split region bundle files (`*.json`).
    ///
    /// Without it the source is split with the built-in district
    /// partitioner.
    #[arg(long, value_name = "DIR")]
    pub regions: Option<PathBuf>,

    /// Critical-connection reference data (JSON).
    #[arg(long, value_name = "FILE")]
    pub critical: Option<PathBuf>,
}

/// Counts the integration suite compares the split against.
#[derive(Args, Clone, Debug, Default)]
pub struct ExpectArgs {
    /// Expected total room count [default: 140].
    #[arg(long, value_name = "N", requires = "integration")]
    pub expect_rooms: Option<usize>,

    /// Expected number of regions [default: 4].
    #[arg(long, value_name = "N", requires = "integration")]
    pub expect_regions: Option<usize>,

    /// Expected number of cross-region connections [default: 38].
    #[arg(long, value_name = "N", requires = "integration")]
    pub expect_cross_region: Option<usize>,
}

/// All top-level subcommands exposed by the `mapverify` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Connectivity and basic integrity only; no history, no artifacts.
    Quick {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Run the verification pipeline and persist its results.
    Full {
        #[command(flatten)]
        input: InputArgs,
        /// Also run the performance benchmarks.
        #[arg(long)]
        performance: bool,
        /// Run the integration suite (partitioning plus pipeline) instead.
        #[arg(long, conflicts_with = "regions")]
        integration: bool,
        /// Stop at the first suite that fails to run.
        #[arg(long)]
        fail_fast: bool,
        #[command(flatten)]
        expect: ExpectArgs,
    },

    /// Re-render the markdown report from a persisted results document.
    Report {
        /// A `pipeline-results-*.json` file, or `-` for stdin.
        #[arg(value_name = "RESULTS_JSON")]
        results: PathOrStdin,
    },
}

/// Root CLI struct for the `mapverify` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Parser)]
#[command(
    name = "mapverify",
    version,
    about = "Verify a partitioned room-graph world",
    long_about = "Verifies that splitting a world dataset into region bundles\n\
                  kept every room, exit and critical connection intact, and\n\
                  tracks verification scores across runs."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Directory for result artifacts.
    #[arg(
        long,
        global = true,
        env = "MAPVERIFY_OUTPUT_DIR",
        default_value = "./test-results",
        value_name = "DIR"
    )]
    pub output: PathBuf,

    /// History file [default: <OUTPUT>/test-history.json].
    #[arg(long, global = true, env = "MAPVERIFY_HISTORY", value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Newest history records kept when appending.
    #[arg(
        long,
        global = true,
        env = "MAPVERIFY_HISTORY_RETENTION",
        default_value_t = DEFAULT_RETENTION,
        value_parser = clap::value_parser!(u16).range(1..).map(usize::from),
        value_name = "N"
    )]
    pub history_retention: usize,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Suppress all stderr output except errors (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log progress and timing to stderr (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable ANSI color codes in human output.
    ///
    /// Also respects the `NO_COLOR` environment variable per
    /// <https://no-color.org>.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Emit log lines as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Maximum input file size in bytes.
    #[arg(
        long,
        global = true,
        env = "MAPVERIFY_MAX_FILE_SIZE",
        default_value = "268435456"
    )]
    pub max_file_size: u64,
}

impl Cli {
    /// The history file, defaulting to `test-history.json` in the output
    /// directory.
    pub fn history_path(&self) -> PathBuf {
        self.history
            .clone()
            .unwrap_or_else(|| self.output.join("test-history.json"))
    }
}

#[cfg(test)]
mod tests;
