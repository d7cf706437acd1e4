//! Command-line interface module for dirsort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing (`categorize` and `organize` subcommands)
//! - Building the classification rule from flags and configuration
//! - Running the sort and printing the plan or summary

use crate::classifier::ClassificationRule;
use crate::config::RuleConfig;
use crate::error::OrganizeResult;
use crate::file_pattern::{DEFAULT_PATTERN, PatternRule};
use crate::output::OutputFormatter;
use crate::pipeline::{SortOptions, sort_directory};
use crate::report::{Reporter, RunReport};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Sort the files of a directory into subdirectories.
#[derive(Parser, Debug)]
#[command(name = "dirsort", version, about, long_about = None)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Show what would happen without creating or moving anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Source and destination shared by both modes.
#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// Directory containing the files to sort
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Root of the new subdirectories (defaults to SOURCE)
    #[arg(short, long, value_name = "DESTINATION")]
    pub destination: Option<PathBuf>,
}

impl PathArgs {
    pub fn destination(&self) -> &Path {
        self.destination.as_deref().unwrap_or(&self.source)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Group files by extension into (nested) category directories
    Categorize {
        #[command(flatten)]
        paths: PathArgs,

        /// TOML file with [extensions] and [directories] tables
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Only sort these categories (a parent selects all its children)
        #[arg(long = "only", value_name = "CATEGORY")]
        only: Vec<String>,
    },
    /// Derive directories from the capture groups of a filename pattern
    Organize {
        #[command(flatten)]
        paths: PathArgs,

        /// Regex matched against the whole filename; each group is one level
        #[arg(short, long, default_value = DEFAULT_PATTERN)]
        pattern: String,
    },
}

impl Command {
    pub fn paths(&self) -> &PathArgs {
        match self {
            Command::Categorize { paths, .. } | Command::Organize { paths, .. } => paths,
        }
    }

    /// Builds the classification rule for this command.
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::Config` for an unreadable or malformed
    /// configuration, an invalid pattern or an unknown `--only` category.
    pub fn rule(&self) -> OrganizeResult<ClassificationRule> {
        match self {
            Command::Categorize { config, only, .. } => {
                let mut rule = RuleConfig::load(config.as_deref())?.into_rule()?;
                if !only.is_empty() {
                    rule.retain_categories(only)?;
                }
                Ok(ClassificationRule::Extension(rule))
            }
            Command::Organize { pattern, .. } => {
                Ok(ClassificationRule::Pattern(PatternRule::new(pattern)?))
            }
        }
    }
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the verbosity count.
pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the parsed command line.
///
/// Builds the rule, sorts, then prints either the JSON report or the
/// colored plan and summary. Per-item conflicts and failures do not make
/// this return an error; they are part of the returned report.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use dirsort::cli::{Cli, run_cli};
/// use dirsort::report::TracingReporter;
///
/// let cli = Cli::parse_from(["dirsort", "categorize", "/path/to/downloads"]);
/// match run_cli(&cli, &TracingReporter) {
///     Ok(report) => println!("{}", report),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli, reporter: &dyn Reporter) -> OrganizeResult<RunReport> {
    let rule = cli.command.rule()?;
    let paths = cli.command.paths();
    let options = SortOptions {
        dry_run: cli.dry_run,
    };

    if !cli.json {
        if cli.dry_run {
            OutputFormatter::dry_run_notice(&format!(
                "Analyzing contents of: {}",
                paths.source.display()
            ));
        } else {
            OutputFormatter::info(&format!("Sorting contents of: {}", paths.source.display()));
        }
    }

    let outcome = sort_directory(
        &paths.source,
        paths.destination(),
        &rule,
        options,
        reporter,
    )?;

    if cli.json {
        print_json(&outcome.report);
    } else if outcome.bucket.is_empty() {
        OutputFormatter::warning("No files found to sort.");
    } else {
        OutputFormatter::plan_table(&outcome.bucket);
        if cli.dry_run {
            OutputFormatter::dry_run_notice("No files were modified.");
        } else {
            OutputFormatter::run_summary(&outcome.report);
        }
    }

    Ok(outcome.report)
}

fn print_json(report: &RunReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{json}"),
        Err(e) => OutputFormatter::error(&format!("Could not serialize report: {e}")),
    }
}
