//! CLI entrypoint for the traffic generator.

use std::process::ExitCode;

use clap::Parser;

use mftrace_workload::cli::Cli;

fn main() -> ExitCode {
    let config = Cli::parse().into_config();
    match mftrace_workload::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mftrace-workload: {err}");
            ExitCode::FAILURE
        }
    }
}
