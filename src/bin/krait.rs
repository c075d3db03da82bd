//! The `krait` command-line entry point.

use clap::Parser;
use krait::config::RunConfig;
use krait::io::StdPrint;
use krait::{run, RunOutcome};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "krait")]
#[command(author, version, about = "A lazy, closure-capturing interpreter for Krait programs", long_about = None)]
struct Cli {
    /// The `.krait` file to run.
    entry_file: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = RunConfig::from_env();
    let mut sink = StdPrint;

    match run(&cli.entry_file, &config, &mut sink) {
        Ok(RunOutcome::Success) => ExitCode::SUCCESS,
        Ok(RunOutcome::LanguageError(err, source)) => {
            eprintln!("{}", krait::diagnostics::render(&err, &source));
            ExitCode::from(1)
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
