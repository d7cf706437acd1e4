//! Destination directory tree creation.
//!
//! [`build_tree`] makes sure every destination in a [`FileBucket`] exists as a
//! directory under the destination root. Directories are created one level at
//! a time so that a plain file sitting where a directory has to go is caught
//! at whatever depth it occurs. Such a file is moved into the side directory
//! [`SIDE_DIR_NAME`] under the destination root, never deleted.

use crate::classifier::DestinationPath;
use crate::report::{ItemFailure, Reporter, SideRelocation};
use crate::scanner::FileBucket;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory under the destination root that receives blocking files.
pub const SIDE_DIR_NAME: &str = "temp";

/// Appended to a blocking file's name when its plain name is taken.
pub const SIDE_SUFFIX: &str = "temp";

/// Numbered attempts after the plain and suffixed names.
pub const MAX_SIDE_ATTEMPTS: usize = 99;

/// Mode for new directories (rwxr--r--), before the process umask.
pub const DIR_MODE: u32 = 0o744;

/// Outcome of building the destination tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TreeReport {
    /// Directories created at any depth, the side directory included.
    pub dirs_created: usize,
    /// Destinations whose leaf directory was created by this call.
    pub leaves_created: usize,
    /// Destinations whose leaf directory was already there.
    pub leaves_existing: usize,
    pub side_relocations: Vec<SideRelocation>,
    pub failures: Vec<ItemFailure>,
    /// Destinations that could not be made; their files must stay put.
    pub blocked: BTreeSet<DestinationPath>,
}

/// Creates a single directory with [`DIR_MODE`] where the platform supports it.
pub fn create_dir(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(path)
}

/// Creates `path` and any missing parents with [`DIR_MODE`].
pub fn create_dir_all(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(path)
}

/// State of one level of a destination path before it is made.
enum Slot {
    Directory,
    Missing,
    Blocked,
}

fn inspect(path: &Path) -> io::Result<Slot> {
    match fs::symlink_metadata(path) {
        // is_dir() follows a symlink to a directory
        Ok(_) if path.is_dir() => Ok(Slot::Directory),
        Ok(_) => Ok(Slot::Blocked),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Slot::Missing),
        Err(e) => Err(e),
    }
}

/// Candidate names in the side directory, in the order they are tried.
fn side_candidates(name: &OsString) -> impl Iterator<Item = OsString> + '_ {
    let plain = std::iter::once(name.clone());
    let suffixed = std::iter::once({
        let mut candidate = name.clone();
        candidate.push(SIDE_SUFFIX);
        candidate
    });
    let numbered = (1..=MAX_SIDE_ATTEMPTS).map(move |n| {
        let mut candidate = name.clone();
        candidate.push(format!("{SIDE_SUFFIX}.{n}"));
        candidate
    });
    plain.chain(suffixed).chain(numbered)
}

/// Moves `blocked` into the side directory under `root`.
///
/// Returns the new location. Fails with `AlreadyExists` when every
/// candidate name is taken; nothing is overwritten.
fn move_aside(root: &Path, blocked: &Path, report: &mut TreeReport) -> io::Result<PathBuf> {
    let side_dir = root.join(SIDE_DIR_NAME);
    match inspect(&side_dir)? {
        Slot::Directory => {}
        Slot::Missing => {
            create_dir(&side_dir)?;
            report.dirs_created += 1;
        }
        Slot::Blocked => {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} exists and is not a directory", side_dir.display()),
            ));
        }
    }

    let name = blocked
        .file_name()
        .map(OsString::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;

    for candidate in side_candidates(&name) {
        let target = side_dir.join(&candidate);
        if fs::symlink_metadata(&target).is_err() {
            fs::rename(blocked, &target)?;
            return Ok(target);
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free name in {} for {:?}", side_dir.display(), name),
    ))
}

/// Makes every destination in `bucket` exist as a directory under `root`.
///
/// `root` itself must already exist. Existing directories are left alone, so
/// a second call with the same bucket creates nothing. Problems are recorded
/// per destination; the remaining destinations are still processed.
pub fn build_tree(root: &Path, bucket: &FileBucket, reporter: &dyn Reporter) -> TreeReport {
    let mut report = TreeReport::default();

    for destination in bucket.destinations() {
        let Some(relative) = destination.relative_path() else {
            reporter.error(&format!("Refusing to create {destination}: it leaves the destination root"));
            report.failures.push(ItemFailure {
                path: PathBuf::from(destination.to_string()),
                reason: "destination leaves the destination root".to_string(),
            });
            report.blocked.insert(destination.clone());
            continue;
        };

        let mut current = root.to_path_buf();
        let mut leaf_created = false;
        let mut failed = false;

        for component in relative.components() {
            current.push(component);
            leaf_created = false;

            let slot = match inspect(&current) {
                Ok(slot) => slot,
                Err(e) => {
                    reporter.error(&format!("Cannot inspect {}: {e}", current.display()));
                    report.failures.push(ItemFailure {
                        path: current.clone(),
                        reason: e.to_string(),
                    });
                    failed = true;
                    break;
                }
            };

            match slot {
                Slot::Directory => continue,
                Slot::Missing => {}
                Slot::Blocked => {
                    reporter.warn(&format!(
                        "Dir name conflicts with file at {}.",
                        current.display()
                    ));
                    match move_aside(root, &current, &mut report) {
                        Ok(target) => {
                            reporter.info(&format!(
                                "Moved {} to {}",
                                current.display(),
                                target.display()
                            ));
                            report.side_relocations.push(SideRelocation {
                                from: current.clone(),
                                to: target,
                            });
                        }
                        Err(e) => {
                            reporter.error(&format!(
                                "Could not move {} aside: {e}",
                                current.display()
                            ));
                            report.failures.push(ItemFailure {
                                path: current.clone(),
                                reason: format!("could not move blocking file aside: {e}"),
                            });
                            failed = true;
                            break;
                        }
                    }
                }
            }

            match create_dir(&current) {
                Ok(()) => {
                    reporter.info(&format!(
                        "Dir made at {} with permission set to {:o}.",
                        current.display(),
                        DIR_MODE
                    ));
                    report.dirs_created += 1;
                    leaf_created = true;
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && current.is_dir() => {}
                Err(e) => {
                    reporter.error(&format!("Failed to make {}: {e}", current.display()));
                    report.failures.push(ItemFailure {
                        path: current.clone(),
                        reason: e.to_string(),
                    });
                    failed = true;
                    break;
                }
            }
        }

        if failed {
            report.blocked.insert(destination.clone());
            continue;
        }
        if leaf_created {
            report.leaves_created += 1;
        } else {
            reporter.debug(&format!("{} already exists", current.display()));
            report.leaves_existing += 1;
        }
    }

    reporter.info(&format!("{} leaf directories made.", report.leaves_created));
    report
}
