#![deny(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod cmd;
mod error;
mod format;
mod io;
mod logging;
mod store;

use std::io::Write as _;

use clap::Parser;

pub use cli::{Cli, Command, ExpectArgs, InputArgs, OutputFormat, PathOrStdin};

use crate::cmd::Context;
use crate::error::CliError;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_json, logging::level_for(cli.quiet, cli.verbose));

    if let Err(e) = run(&cli) {
        let stderr = std::io::stderr();
        writeln!(stderr.lock(), "{}", e.message()).ok();
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let ctx = Context::from_cli(cli);
    match &cli.command {
        Command::Quick { input } => cmd::quick::run(&ctx, input),
        Command::Full {
            input,
            performance,
            integration,
            fail_fast,
            expect,
        } => {
            if *integration {
                cmd::full::run_integration(&ctx, input, *performance, expect)
            } else {
                cmd::full::run_pipeline(&ctx, input, *performance, *fail_fast)
            }
        }
        Command::Report { results } => cmd::report::run(&ctx, results),
    }
}
