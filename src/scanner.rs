//! Source directory scanning and bucketing.
//!
//! [`scan`] lists the regular files directly inside the source directory,
//! classifies each name and groups the classified names by destination.

use crate::classifier::{ClassificationRule, DestinationPath};
use crate::error::{OrganizeError, OrganizeResult};
use crate::report::Reporter;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Destination path -> names of the files that go there.
///
/// Ordered collections are used throughout, so the bucket for a directory
/// does not depend on the order the OS listed it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileBucket {
    entries: BTreeMap<DestinationPath, BTreeSet<String>>,
    unclassified: BTreeSet<String>,
}

impl FileBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `file_name` to the set for `destination`.
    pub fn insert(&mut self, destination: DestinationPath, file_name: String) {
        self.entries.entry(destination).or_default().insert(file_name);
    }

    /// Remembers a file that no rule matched.
    pub fn skip(&mut self, file_name: String) {
        self.unclassified.insert(file_name);
    }

    /// Files bound for `destination`, if any.
    pub fn get(&self, destination: &DestinationPath) -> Option<&BTreeSet<String>> {
        self.entries.get(destination)
    }

    /// Iterates destinations in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&DestinationPath, &BTreeSet<String>)> {
        self.entries.iter()
    }

    pub fn destinations(&self) -> impl Iterator<Item = &DestinationPath> {
        self.entries.keys()
    }

    /// Number of distinct destinations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of classified files across all destinations.
    pub fn file_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    /// Files left where they are.
    pub fn unclassified(&self) -> &BTreeSet<String> {
        &self.unclassified
    }
}

/// Lists and classifies the files directly inside `source`.
///
/// Directories are ignored. Symlinks are followed to decide whether an entry
/// is a file, so a link to a file is bucketed and a link to a directory is
/// not. Names that are not valid UTF-8 are treated as unclassified.
///
/// # Errors
///
/// * `NotFound` if `source` is missing or not a directory
/// * `ReadDir` if the listing itself fails
/// * `Config` if the rule fails while classifying
///
/// Nothing on disk is modified, so an error here leaves the run without
/// side effects.
pub fn scan(
    source: &Path,
    rule: &ClassificationRule,
    reporter: &dyn Reporter,
) -> OrganizeResult<FileBucket> {
    if !source.is_dir() {
        reporter.error(&format!("{} is an invalid path.", source.display()));
        return Err(OrganizeError::NotFound {
            path: source.to_path_buf(),
        });
    }

    reporter.info(&format!("Scanning {} with {}", source.display(), rule.describe()));

    let entries = fs::read_dir(source).map_err(|e| OrganizeError::ReadDir {
        path: source.to_path_buf(),
        source: e,
    })?;

    let mut bucket = FileBucket::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                reporter.warn(&format!("Skipping unreadable entry: {e}"));
                continue;
            }
        };

        let path = entry.path();
        // fs::metadata follows symlinks
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => continue,
            Err(e) => {
                reporter.debug(&format!("Skipping {}: {e}", path.display()));
                continue;
            }
        }

        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            reporter.debug(&format!("Skipping non UTF-8 name {}", path.display()));
            bucket.skip(file_name.to_string_lossy().into_owned());
            continue;
        };

        reporter.debug(&format!("Checking: {name}"));
        match rule.classify(name)? {
            Some(destination) => {
                reporter.debug(&format!("{name} -> {destination}"));
                bucket.insert(destination, name.to_string());
            }
            None => bucket.skip(name.to_string()),
        }
    }

    if bucket.is_empty() {
        reporter.warn("No files were classified. Check the directory or the rule.");
    } else {
        reporter.info(&format!(
            "Classified {} files into {} destinations",
            bucket.file_count(),
            bucket.len()
        ));
    }
    Ok(bucket)
}
