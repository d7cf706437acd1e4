use clap::Parser;
use dirsort::cli::{Cli, init_tracing, run_cli};
use dirsort::output::OutputFormatter;
use dirsort::report::TracingReporter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run_cli(&cli, &TracingReporter) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::from(e.exit_code())
        }
    }
}
