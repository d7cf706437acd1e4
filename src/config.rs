//! Rule configuration loaded from TOML.
//!
//! A configuration file replaces the built-in extension groups used by the
//! `categorize` mode. Both sections are optional.
//!
//! # Configuration File Format
//!
//! ```toml
//! [extensions]
//! audio = [".mp3", ".wav"]
//! images = [".png", ".jpg"]
//! documents = [".pdf", ".txt"]
//!
//! [directories]
//! media = ["audio", "images"]
//! ```
//!
//! `[extensions]` maps a category (a directory name) to the extensions it
//! collects; every extension must start with `.`. `[directories]` maps a parent
//! category to its child categories. When `[extensions]` is given, the built-in
//! groups and nesting are discarded entirely.

use crate::file_category::ExtensionRule;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_NAME: &str = ".dirsortrc.toml";

/// Errors raised while building a classification rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// An extension that does not start with '.'.
    #[error("Invalid extension '{extension}' for category '{category}': extensions must start with '.'")]
    InvalidExtension { category: String, extension: String },
    /// Invalid regex pattern provided with the actual error reason.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// A pattern without capture groups cannot produce a destination.
    #[error("Pattern '{0}' has no capture groups")]
    NoCaptureGroups(String),
    /// A category listed under two different parents.
    #[error("Category '{category}' has two parents: '{first}' and '{second}'")]
    MultipleParents {
        category: String,
        first: String,
        second: String,
    },
    /// Walking up from this category never reached a root.
    #[error("Category nesting contains a cycle through '{0}'")]
    CategoryCycle(String),
    /// A category selected on the command line that the rule does not know.
    #[error("Unknown category '{0}'")]
    UnknownCategory(String),
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    Io(String),
}

/// A section of name -> list of strings, in the order the file declares it.
///
/// Later entries override earlier ones when they register the same
/// extension, so the file order has to survive parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedTable(Vec<(String, Vec<String>)>);

impl OrderedTable {
    pub fn entries(&self) -> &[(String, Vec<String>)] {
        &self.0
    }

    pub fn into_entries(self) -> Vec<(String, Vec<String>)> {
        self.0
    }
}

impl<'de> Deserialize<'de> for OrderedTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = OrderedTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of string arrays")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Vec<String>>()? {
                    entries.push(entry);
                }
                Ok(OrderedTable(entries))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Deserialized form of a rule configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Category name to the extensions it collects.
    #[serde(default)]
    pub extensions: Option<OrderedTable>,

    /// Parent category name to its child categories.
    #[serde(default)]
    pub directories: Option<OrderedTable>,
}

impl RuleConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.dirsortrc.toml` in the current directory
    /// 3. Look for `~/.config/dirsort/config.toml` in home directory
    /// 4. Fall back to the built-in groups
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_NAME);
        if local_config.is_file() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("dirsort")
                .join("config.toml");
            if home_config.is_file() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::Io` if file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Build the extension rule described by this configuration.
    ///
    /// Without an `[extensions]` section the built-in groups are used, and a
    /// `[directories]` section on its own re-nests those built-in groups.
    /// Groups are registered in file order, so when two categories claim the
    /// same extension the one declared last keeps it.
    pub fn into_rule(self) -> Result<ExtensionRule, ConfigError> {
        match (self.extensions, self.directories) {
            (None, None) => Ok(ExtensionRule::default()),
            (None, Some(directories)) => {
                let defaults = ExtensionRule::default();
                ExtensionRule::from_groups(defaults.extension_groups(), directories.into_entries())
            }
            (Some(extensions), directories) => ExtensionRule::from_groups(
                extensions.into_entries(),
                directories.map(OrderedTable::into_entries).unwrap_or_default(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RuleConfig::from_toml("").unwrap();
        assert_eq!(config, RuleConfig::default());

        let rule = config.into_rule().unwrap();
        assert_eq!(rule.extension_to_category(".mp3"), Some("audio"));
        assert_eq!(rule.extension_to_category(".csv"), Some("data"));
    }

    #[test]
    fn test_extensions_section_replaces_defaults() {
        let config = RuleConfig::from_toml(
            r#"
            [extensions]
            music = [".mp3", ".wav", ".midi", ".mid"]
            "#,
        )
        .unwrap();
        let rule = config.into_rule().unwrap();

        assert_eq!(rule.extension_to_category(".mp3"), Some("music"));
        assert_eq!(rule.extension_to_category(".mid"), Some("music"));
        assert_eq!(rule.extension_to_category(".png"), None);
    }

    #[test]
    fn test_directories_section_nests_categories() {
        let config = RuleConfig::from_toml(
            r#"
            [extensions]
            audio = [".mp3"]
            images = [".png"]
            documents = [".txt"]

            [directories]
            media = ["audio", "images"]
            "#,
        )
        .unwrap();
        let rule = config.into_rule().unwrap();

        let path = rule.classify("a.mp3").unwrap().unwrap();
        assert_eq!(path.segments(), ["media", "audio"]);
        let path = rule.classify("c.txt").unwrap().unwrap();
        assert_eq!(path.segments(), ["documents"]);
    }

    #[test]
    fn test_directories_only_renests_defaults() {
        let config = RuleConfig::from_toml(
            r#"
            [directories]
            archive = ["compressed", "data"]
            "#,
        )
        .unwrap();
        let rule = config.into_rule().unwrap();

        let path = rule.classify("dump.sql").unwrap().unwrap();
        assert_eq!(path.segments(), ["archive", "data"]);
        // The default media nesting is replaced, not merged.
        let path = rule.classify("song.mp3").unwrap().unwrap();
        assert_eq!(path.segments(), ["audio"]);
    }

    #[test]
    fn test_duplicate_extension_follows_file_order() {
        let config = RuleConfig::from_toml(
            r#"
            [extensions]
            zmusic = [".ogg"]
            audio = [".ogg", ".mp3"]
            "#,
        )
        .unwrap();
        let names: Vec<&str> = config
            .extensions
            .as_ref()
            .unwrap()
            .entries()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, ["zmusic", "audio"]);

        let rule = config.into_rule().unwrap();
        assert_eq!(rule.extension_to_category(".ogg"), Some("audio"));

        let rule = RuleConfig::from_toml("[extensions]\naudio = [\".ogg\"]\nzmusic = [\".ogg\"]\n")
            .unwrap()
            .into_rule()
            .unwrap();
        assert_eq!(rule.extension_to_category(".ogg"), Some("zmusic"));
    }

    #[test]
    fn test_wrong_value_shape_is_config_invalid() {
        let result = RuleConfig::from_toml(
            r#"
            [extensions]
            this = "should fail"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let result = RuleConfig::from_toml("[filters]\nhidden = true\n");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_extension_without_dot_is_rejected() {
        let config = RuleConfig::from_toml(
            r#"
            [extensions]
            audio = ["mp3"]
            "#,
        )
        .unwrap();
        let result = config.into_rule();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidExtension {
                category: "audio".to_string(),
                extension: "mp3".to_string(),
            }
        );
    }

    #[test]
    fn test_cyclic_directories_are_rejected() {
        let config = RuleConfig::from_toml(
            r#"
            [extensions]
            audio = [".mp3"]

            [directories]
            media = ["audio"]
            audio = ["media"]
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.into_rule(),
            Err(ConfigError::CategoryCycle(_))
        ));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[extensions]\nnotes = [\".md\"]").unwrap();

        let config = RuleConfig::load(Some(file.path())).unwrap();
        let rule = config.into_rule().unwrap();
        assert_eq!(rule.extension_to_category(".md"), Some("notes"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = RuleConfig::load(Some(Path::new("/non/existent/dirsort.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }
}
