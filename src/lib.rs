//! dirsort - sort the files of a directory into a tree of subdirectories
//!
//! Files are classified by name alone, either through an extension -> category
//! table with nested categories, or through the capture groups of a filename
//! pattern. The matching directories are created under a destination root and
//! the files moved into them without ever overwriting anything.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod file_category;
pub mod file_organizer;
pub mod file_pattern;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod scanner;
pub mod tree_builder;

pub use classifier::{ClassificationRule, DestinationPath};
pub use config::{ConfigError, RuleConfig};
pub use error::{OrganizeError, OrganizeResult};
pub use file_category::ExtensionRule;
pub use file_organizer::FileOrganizer;
pub use file_pattern::PatternRule;
pub use pipeline::{SortOptions, SortOutcome, sort_directory};
pub use report::{MemoryReporter, Reporter, RunReport, TracingReporter};
pub use scanner::{FileBucket, scan};
pub use tree_builder::build_tree;

pub use cli::{Cli, run_cli};
