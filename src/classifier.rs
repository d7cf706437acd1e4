//! Classification rules and the destination paths they produce.

use crate::config::ConfigError;
use crate::file_category::ExtensionRule;
use crate::file_pattern::PatternRule;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Where a file goes, as an ordered list of directory names under the
/// destination root.
///
/// Always holds at least one segment. Segments are kept verbatim; see
/// [`DestinationPath::relative_path`] for how they become a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DestinationPath(Vec<String>);

impl DestinationPath {
    /// Wraps `segments`, or returns `None` if there are none.
    pub fn new(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(Self(segments))
        }
    }

    /// A one-segment path.
    pub fn single(segment: &str) -> Self {
        Self(vec![segment.to_string()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Joins the segments into a path relative to the destination root.
    ///
    /// Empty and `.` segments are no-ops. Returns `None` when a segment is
    /// `..`, since the result would leave the destination root.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsort::classifier::DestinationPath;
    /// use std::path::PathBuf;
    ///
    /// let path = DestinationPath::new(vec!["ENEE408A".into(), "".into(), "HW1".into()]).unwrap();
    /// assert_eq!(path.relative_path(), Some(PathBuf::from("ENEE408A/HW1")));
    ///
    /// let escaping = DestinationPath::new(vec!["..".into(), "etc".into()]).unwrap();
    /// assert_eq!(escaping.relative_path(), None);
    /// ```
    pub fn relative_path(&self) -> Option<PathBuf> {
        let mut path = PathBuf::new();
        for segment in &self.0 {
            match segment.as_str() {
                "" | "." => {}
                ".." => return None,
                name => path.push(name),
            }
        }
        Some(path)
    }
}

impl fmt::Display for DestinationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// A rule that decides where a file belongs from its name alone.
#[derive(Debug, Clone)]
pub enum ClassificationRule {
    /// Extension -> category, nested through parent categories.
    Extension(ExtensionRule),
    /// Anchored regex whose capture groups are the path segments.
    Pattern(PatternRule),
}

impl ClassificationRule {
    /// Maps a filename to its destination, or `None` if the file should stay put.
    ///
    /// # Errors
    ///
    /// Only an extension rule with cyclic nesting can fail here.
    pub fn classify(&self, file_name: &str) -> Result<Option<DestinationPath>, ConfigError> {
        match self {
            Self::Extension(rule) => rule.classify(file_name),
            Self::Pattern(rule) => Ok(rule.classify(file_name)),
        }
    }

    /// Short description for log output.
    pub fn describe(&self) -> String {
        match self {
            Self::Extension(rule) => {
                format!("extension rule ({} categories)", rule.categories().len())
            }
            Self::Pattern(rule) => format!("pattern rule {}", rule.as_str()),
        }
    }
}

impl From<ExtensionRule> for ClassificationRule {
    fn from(rule: ExtensionRule) -> Self {
        Self::Extension(rule)
    }
}

impl From<PatternRule> for ClassificationRule {
    fn from(rule: PatternRule) -> Self {
        Self::Pattern(rule)
    }
}
