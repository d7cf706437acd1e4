//! Logging collaborator and run statistics.
//!
//! Every stage of a run receives a `&dyn Reporter` instead of logging through
//! global state. The binary uses [`TracingReporter`]; tests use
//! [`MemoryReporter`] to inspect what was reported.

use crate::file_organizer::RelocateReport;
use crate::tree_builder::TreeReport;
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;

/// Severity of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Sink for human-readable progress and diagnostics.
pub trait Reporter {
    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

/// Forwards messages to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::Debug => tracing::debug!("{message}"),
            Level::Info => tracing::info!("{message}"),
            Level::Warn => tracing::warn!("{message}"),
            Level::Error => tracing::error!("{message}"),
        }
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: RefCell<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages, oldest first.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.borrow().clone()
    }

    /// Messages recorded at exactly `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(entry_level, _)| *entry_level == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn log(&self, level: Level, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

/// One item that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// A file moved out of the way because it blocked a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideRelocation {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Aggregate counters for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Regular files found in the source directory.
    pub scanned: usize,
    /// Files that received a destination.
    pub classified: usize,
    /// Distinct destination paths.
    pub buckets: usize,
    /// Directories created at any level.
    pub dirs_created: usize,
    /// Destination leaves created by this run.
    pub leaves_created: usize,
    /// Destination leaves that already existed.
    pub leaves_existing: usize,
    /// Files moved into place.
    pub moved: usize,
    /// Files left in place because the destination name was taken.
    pub conflicts: usize,
    /// Files left in place because their directory could not be made.
    pub skipped: usize,
    /// Files moved aside because they blocked a directory.
    pub side_relocations: Vec<SideRelocation>,
    /// Per-item failures.
    pub failures: Vec<ItemFailure>,
    /// True when nothing was touched on disk.
    pub dry_run: bool,
}

impl RunReport {
    /// Number of per-item failures.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} scanned={} classified={} created={} moved={} conflicts={} skipped={} relocated={} failed={}",
            self.scanned,
            self.classified,
            self.leaves_created,
            self.moved,
            self.conflicts,
            self.skipped,
            self.side_relocations.len(),
            self.failed()
        )
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[SORT]"))
    }
}

/// Mutable accumulator for run statistics.
#[derive(Debug, Default, Clone)]
pub struct RunReportBuilder {
    report: RunReport,
}

impl RunReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of scanning.
    pub fn scanned(&mut self, scanned: usize, classified: usize, buckets: usize) {
        self.report.scanned = scanned;
        self.report.classified = classified;
        self.report.buckets = buckets;
    }

    /// Fold in the directory-building stage.
    pub fn tree(&mut self, tree: TreeReport) {
        self.report.dirs_created += tree.dirs_created;
        self.report.leaves_created += tree.leaves_created;
        self.report.leaves_existing += tree.leaves_existing;
        self.report.side_relocations.extend(tree.side_relocations);
        self.report.failures.extend(tree.failures);
    }

    /// Fold in the move stage.
    pub fn relocation(&mut self, relocation: RelocateReport) {
        self.report.moved += relocation.moved;
        self.report.conflicts += relocation.conflicts;
        self.report.skipped += relocation.skipped;
        self.report.failures.extend(relocation.failures);
    }

    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.report.dry_run = dry_run;
    }

    /// Finalize builder into an immutable report.
    pub fn build(self) -> RunReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format() {
        let mut builder = RunReportBuilder::new();
        builder.scanned(5, 3, 2);
        builder.tree(TreeReport {
            dirs_created: 2,
            leaves_created: 1,
            leaves_existing: 1,
            ..Default::default()
        });
        builder.relocation(RelocateReport {
            moved: 2,
            conflicts: 1,
            skipped: 3,
            failures: vec![ItemFailure {
                path: PathBuf::from("x"),
                reason: "denied".to_string(),
            }],
        });
        let report = builder.build();

        let txt = report.format("[SORT]");
        assert_eq!(
            txt,
            "[SORT] scanned=5 classified=3 created=1 moved=2 conflicts=1 skipped=3 relocated=0 failed=1"
        );
        assert_eq!(report.to_string(), txt);
    }

    #[test]
    fn test_report_serializes_counts() {
        let mut builder = RunReportBuilder::new();
        builder.tree(TreeReport {
            side_relocations: vec![SideRelocation {
                from: PathBuf::from("media"),
                to: PathBuf::from("temp/media"),
            }],
            ..Default::default()
        });
        let value = serde_json::to_value(builder.build()).unwrap();

        assert_eq!(value["moved"], 0);
        assert_eq!(value["side_relocations"][0]["to"], "temp/media");
        assert_eq!(value["dry_run"], false);
    }

    #[test]
    fn test_memory_reporter_filters_by_level() {
        let reporter = MemoryReporter::new();
        reporter.info("scanning");
        reporter.warn("conflict");
        reporter.debug("detail");

        assert_eq!(reporter.entries().len(), 3);
        assert_eq!(reporter.messages(Level::Warn), vec!["conflict".to_string()]);
    }
}
