//! The full sort: scan, build the tree, move.

use crate::classifier::ClassificationRule;
use crate::error::{OrganizeError, OrganizeResult};
use crate::file_organizer::FileOrganizer;
use crate::report::{Reporter, RunReport, RunReportBuilder};
use crate::scanner::{self, FileBucket};
use crate::tree_builder;
use std::path::Path;

/// Switches for a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SortOptions {
    /// Scan and classify only; leave the filesystem untouched.
    pub dry_run: bool,
}

/// Result of a run together with the plan it executed.
#[derive(Debug, Clone)]
pub struct SortOutcome {
    pub bucket: FileBucket,
    pub report: RunReport,
}

/// Sorts the files of `source` into a tree under `destination`.
///
/// Validation happens first: a missing source, or a rule that fails while
/// classifying, returns an error before anything on disk changes. After that
/// every problem is per item and ends up in the returned report. Running
/// twice in a row is safe; the second run finds nothing left to move.
///
/// # Errors
///
/// * `NotFound`, `ReadDir` or `Config` from scanning
/// * `DestinationUnavailable` if `destination` cannot be created
pub fn sort_directory(
    source: &Path,
    destination: &Path,
    rule: &ClassificationRule,
    options: SortOptions,
    reporter: &dyn Reporter,
) -> OrganizeResult<SortOutcome> {
    let bucket = scanner::scan(source, rule, reporter)?;

    let mut builder = RunReportBuilder::new();
    builder.set_dry_run(options.dry_run);
    let scanned = bucket.file_count() + bucket.unclassified().len();
    builder.scanned(scanned, bucket.file_count(), bucket.len());

    if bucket.is_empty() {
        reporter.info("Did not find anything to organize.");
        return Ok(SortOutcome {
            bucket,
            report: builder.build(),
        });
    }

    if options.dry_run {
        reporter.info("Dry run: no directories created, no files moved.");
        return Ok(SortOutcome {
            bucket,
            report: builder.build(),
        });
    }

    if !destination.is_dir() {
        reporter.info(&format!("Creating destination {}", destination.display()));
        tree_builder::create_dir_all(destination).map_err(|e| {
            OrganizeError::DestinationUnavailable {
                path: destination.to_path_buf(),
                source: e,
            }
        })?;
    }

    let tree = tree_builder::build_tree(destination, &bucket, reporter);
    let relocation =
        FileOrganizer::relocate(source, destination, &bucket, &tree.blocked, reporter);
    builder.tree(tree);
    builder.relocation(relocation);

    let report = builder.build();
    if report.failed() > 0 {
        reporter.warn(&format!("{} items could not be processed.", report.failed()));
    }
    reporter.info(&report.to_string());
    Ok(SortOutcome { bucket, report })
}
