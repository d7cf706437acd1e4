/// Moving classified files into their destination directories.
///
/// This module moves each bucketed file from the source directory into the
/// matching directory under the destination root. A file is never written
/// over: when the destination name is taken the source file stays where it
/// is and the conflict is reported.
use crate::classifier::DestinationPath;
use crate::report::{ItemFailure, Reporter};
use crate::scanner::FileBucket;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

/// Result of moving a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The file now lives at the destination.
    Moved,
    /// Something already exists at the destination; nothing was touched.
    Conflict,
}

/// Counters for one relocation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelocateReport {
    pub moved: usize,
    pub conflicts: usize,
    /// Files left in place because their directory could not be made.
    pub skipped: usize,
    pub failures: Vec<ItemFailure>,
}

/// Moves files from a source directory into a prepared destination tree.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves `source_file` to `destination_file` unless the destination is taken.
    ///
    /// The existence check uses `symlink_metadata`, so a dangling symlink at
    /// the destination also counts as taken. The move is a `rename`; when
    /// source and destination are on different devices the file is copied and
    /// the source removed afterwards.
    ///
    /// The check and the move are separate calls, so this is only safe with a
    /// single writer per destination directory.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::file_organizer::{FileOrganizer, MoveOutcome};
    /// use std::path::Path;
    ///
    /// let outcome = FileOrganizer::move_file(
    ///     Path::new("/path/to/src/song.mp3"),
    ///     Path::new("/path/to/dest/media/audio/song.mp3"),
    /// );
    ///
    /// match outcome {
    ///     Ok(MoveOutcome::Moved) => println!("moved"),
    ///     Ok(MoveOutcome::Conflict) => println!("left in place"),
    ///     Err(e) => eprintln!("move failed: {}", e),
    /// }
    /// ```
    pub fn move_file(source_file: &Path, destination_file: &Path) -> io::Result<MoveOutcome> {
        if fs::symlink_metadata(destination_file).is_ok() {
            return Ok(MoveOutcome::Conflict);
        }

        match fs::rename(source_file, destination_file) {
            Ok(()) => Ok(MoveOutcome::Moved),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                move_by_copy(source_file, destination_file, |from, to| fs::copy(from, to))?;
                Ok(MoveOutcome::Moved)
            }
            Err(e) => Err(e),
        }
    }

    /// Moves every file in `bucket` from `source` into `destination_root`.
    ///
    /// Destination directories are expected to exist already (see
    /// [`build_tree`](crate::tree_builder::build_tree)). Destinations in
    /// `blocked` were already reported as failed there, so their files are
    /// only counted as skipped. Any other missing directory makes the
    /// individual moves fail and be reported. Each move is independent, so
    /// the order files are processed in does not change the result.
    pub fn relocate(
        source: &Path,
        destination_root: &Path,
        bucket: &FileBucket,
        blocked: &BTreeSet<DestinationPath>,
        reporter: &dyn Reporter,
    ) -> RelocateReport {
        let mut report = RelocateReport::default();

        for (destination, files) in bucket.iter() {
            if blocked.contains(destination) {
                reporter.warn(&format!(
                    "Leaving {} files in place: {destination} could not be created",
                    files.len()
                ));
                report.skipped += files.len();
                continue;
            }

            let Some(relative) = destination.relative_path() else {
                reporter.error(&format!(
                    "Skipping {} files bound for {destination}: it leaves the destination root",
                    files.len()
                ));
                for file in files {
                    report.failures.push(ItemFailure {
                        path: source.join(file),
                        reason: "destination leaves the destination root".to_string(),
                    });
                }
                continue;
            };
            let destination_dir = destination_root.join(relative);

            for file in files {
                let source_file = source.join(file);
                let destination_file = destination_dir.join(file);

                reporter.debug(&format!(
                    "Moving {} to {}.",
                    file,
                    destination_file.display()
                ));
                match Self::move_file(&source_file, &destination_file) {
                    Ok(MoveOutcome::Moved) => {
                        reporter.info(&format!("{} moved to {}.", file, destination_file.display()));
                        report.moved += 1;
                    }
                    Ok(MoveOutcome::Conflict) => {
                        reporter.warn(&format!(
                            "Skipping {} because a file is already detected at {}.",
                            file,
                            destination_file.display()
                        ));
                        report.conflicts += 1;
                    }
                    Err(e) => {
                        reporter.error(&format!(
                            "Failed to move {} to {}: {e}",
                            source_file.display(),
                            destination_file.display()
                        ));
                        report.failures.push(ItemFailure {
                            path: source_file,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        report
    }
}

/// Copies `source_file` with `copy`, then removes it.
///
/// A failed copy must not leave a truncated file at the destination, or every
/// later run would see the name as taken.
fn move_by_copy<F>(source_file: &Path, destination_file: &Path, copy: F) -> io::Result<()>
where
    F: FnOnce(&Path, &Path) -> io::Result<u64>,
{
    if let Err(e) = copy(source_file, destination_file) {
        return match fs::remove_file(destination_file) {
            Err(cleanup) if cleanup.kind() != io::ErrorKind::NotFound => Err(io::Error::new(
                e.kind(),
                format!(
                    "{e}; partial copy left at {}: {cleanup}",
                    destination_file.display()
                ),
            )),
            _ => Err(e),
        };
    }
    fs::remove_file(source_file)
}
