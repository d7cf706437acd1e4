/// Extension-based classification with nested categories.
///
/// This module maps a file extension (including the leading dot, e.g. `.mp3`)
/// to a leaf category, and walks a category -> parent table to build the full
/// destination path, root-most category first.
///
/// # Examples
///
/// ```
/// use dirsort::file_category::ExtensionRule;
///
/// let rule = ExtensionRule::default();
/// let path = rule.classify("song.mp3").unwrap().unwrap();
/// assert_eq!(path.segments(), ["media", "audio"]);
/// assert_eq!(rule.classify("notes.txt").unwrap().unwrap().segments(), ["documents"]);
/// assert!(rule.classify("README").unwrap().is_none());
/// ```
use crate::classifier::DestinationPath;
use crate::config::ConfigError;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Built-in extension groups, used when no configuration file is found.
pub const DEFAULT_EXTENSION_GROUPS: &[(&str, &[&str])] = &[
    (
        "audio",
        &[".wav", ".mp3", ".mid", ".midi", ".mpa", ".wma", ".ogg"],
    ),
    (
        "documents",
        &[
            ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".pdf", ".txt",
        ],
    ),
    (
        "compressed",
        &[".zip", ".7z", ".gz", ".arj", ".pkg", ".deb", ".rpm", ".z"],
    ),
    (
        "data",
        &[
            ".csv", ".dat", ".db", ".dbf", ".log", ".mdb", ".sql", ".sav", ".xml",
        ],
    ),
    (
        "images",
        &[
            ".ai", ".bmp", ".png", ".jpeg", ".jpg", ".gif", ".ico", ".ps", ".psd", ".svg",
            ".tif", ".tiff",
        ],
    ),
    (
        "videos",
        &[
            ".3g2", ".3gp", ".avi", ".flv", ".h264", ".m4v", ".mkv", ".mov", ".mp4", ".mpg",
            ".mpeg", ".swf", ".rm", ".vob", ".wmv",
        ],
    ),
];

/// Built-in nesting: parent category and its children.
pub const DEFAULT_NESTING: &[(&str, &[&str])] = &[("media", &["audio", "images", "videos"])];

/// Maps extensions to categories and categories to their parents.
///
/// Both tables are built once and never change during a run. Extension keys
/// are stored lowercased, so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRule {
    extension_map: HashMap<String, String>,
    parent_map: HashMap<String, String>,
}

impl ExtensionRule {
    /// Creates a rule with no mappings at all.
    pub fn empty() -> Self {
        Self {
            extension_map: HashMap::new(),
            parent_map: HashMap::new(),
        }
    }

    /// Builds a rule from category -> extensions groups and parent -> children nesting.
    ///
    /// Groups are registered in iteration order; when an extension appears in
    /// more than one group the last registration wins. The resulting category
    /// graph is checked for cycles before the rule is returned.
    ///
    /// # Errors
    ///
    /// * `InvalidExtension` if an extension does not start with `.`
    /// * `MultipleParents` if a category is listed under two parents
    /// * `CategoryCycle` if the nesting loops back on itself
    pub fn from_groups(
        groups: impl IntoIterator<Item = (String, Vec<String>)>,
        nesting: impl IntoIterator<Item = (String, Vec<String>)>,
    ) -> Result<Self, ConfigError> {
        let mut rule = Self::empty();
        for (category, extensions) in groups {
            for extension in &extensions {
                rule.add_extension_mapping(extension, &category)?;
            }
        }
        for (parent, children) in nesting {
            for child in &children {
                rule.add_parent_mapping(&parent, child)?;
            }
        }
        rule.validate()?;
        Ok(rule)
    }

    /// Adds an extension to category mapping, replacing any earlier one.
    pub fn add_extension_mapping(
        &mut self,
        extension: &str,
        category: &str,
    ) -> Result<(), ConfigError> {
        if !extension.starts_with('.') {
            return Err(ConfigError::InvalidExtension {
                category: category.to_string(),
                extension: extension.to_string(),
            });
        }
        self.extension_map
            .insert(extension.to_lowercase(), category.to_string());
        Ok(())
    }

    /// Records `parent` as the parent category of `child`.
    pub fn add_parent_mapping(&mut self, parent: &str, child: &str) -> Result<(), ConfigError> {
        match self.parent_map.get(child) {
            Some(existing) if existing != parent => Err(ConfigError::MultipleParents {
                category: child.to_string(),
                first: existing.clone(),
                second: parent.to_string(),
            }),
            _ => {
                self.parent_map
                    .insert(child.to_string(), parent.to_string());
                Ok(())
            }
        }
    }

    /// Checks that every category reaches a root.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for category in self.all_categories() {
            self.ancestors(category)?;
        }
        Ok(())
    }

    /// Maps an extension such as `.pdf` to its leaf category.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirsort::file_category::ExtensionRule;
    ///
    /// let rule = ExtensionRule::default();
    /// assert_eq!(rule.extension_to_category(".PDF"), Some("documents"));
    /// assert_eq!(rule.extension_to_category(".unknown"), None);
    /// ```
    pub fn extension_to_category(&self, extension: &str) -> Option<&str> {
        self.extension_map
            .get(&extension.to_lowercase())
            .map(String::as_str)
    }

    /// Returns `category` followed by its parent, grandparent and so on.
    ///
    /// The walk is bounded by the number of distinct categories, so a cyclic
    /// table fails with `CategoryCycle` instead of looping.
    pub fn ancestors(&self, category: &str) -> Result<Vec<String>, ConfigError> {
        let limit = self.all_categories().len();
        let mut chain = vec![category.to_string()];
        let mut current = category;

        while let Some(parent) = self.parent_map.get(current) {
            if chain.len() > limit {
                return Err(ConfigError::CategoryCycle(category.to_string()));
            }
            chain.push(parent.clone());
            current = parent.as_str();
        }
        Ok(chain)
    }

    /// Destination path for a category: root-most ancestor first, `category` last.
    pub fn category_path(&self, category: &str) -> Result<DestinationPath, ConfigError> {
        let mut chain = self.ancestors(category)?;
        chain.reverse();
        // ancestors() always returns at least the category itself
        Ok(DestinationPath::new(chain).unwrap_or_else(|| DestinationPath::single(category)))
    }

    /// Determines where a file belongs based on its name.
    ///
    /// The extension is everything from the last `.` on. Names without a dot,
    /// and names whose extension is not mapped, yield `None` and are left
    /// alone by the caller.
    pub fn classify(&self, file_name: &str) -> Result<Option<DestinationPath>, ConfigError> {
        let Some(dot) = file_name.rfind('.') else {
            return Ok(None);
        };
        match self.extension_to_category(&file_name[dot..]) {
            Some(category) => self.category_path(category).map(Some),
            None => Ok(None),
        }
    }

    /// Leaf categories that have at least one extension.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.extension_map.values().map(String::as_str).collect()
    }

    /// Every category name that appears anywhere in the rule.
    fn all_categories(&self) -> BTreeSet<&str> {
        self.extension_map
            .values()
            .chain(self.parent_map.keys())
            .chain(self.parent_map.values())
            .map(String::as_str)
            .collect()
    }

    /// Category -> sorted extensions, the inverse of the extension table.
    pub fn extension_groups(&self) -> BTreeMap<String, Vec<String>> {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (extension, category) in &self.extension_map {
            groups
                .entry(category.clone())
                .or_default()
                .push(extension.clone());
        }
        for extensions in groups.values_mut() {
            extensions.sort();
        }
        groups
    }

    /// Keeps only extensions whose category, or one of its ancestors, is in `selected`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownCategory` for a selected name the rule never mentions.
    pub fn retain_categories(&mut self, selected: &[String]) -> Result<(), ConfigError> {
        let known = self.all_categories();
        if let Some(unknown) = selected.iter().find(|name| !known.contains(name.as_str())) {
            return Err(ConfigError::UnknownCategory(unknown.clone()));
        }

        let mut keep = HashMap::new();
        for category in self.categories() {
            let chain = self.ancestors(category)?;
            let wanted = chain.iter().any(|name| selected.contains(name));
            keep.insert(category.to_string(), wanted);
        }
        self.extension_map
            .retain(|_, category| keep.get(category).copied().unwrap_or(false));
        Ok(())
    }
}

impl Default for ExtensionRule {
    /// The built-in groups: audio, documents, compressed, data, images and
    /// videos, with audio, images and videos nested under media.
    fn default() -> Self {
        let mut rule = Self::empty();
        for (category, extensions) in DEFAULT_EXTENSION_GROUPS {
            for extension in *extensions {
                rule.extension_map
                    .insert((*extension).to_string(), (*category).to_string());
            }
        }
        for (parent, children) in DEFAULT_NESTING {
            for child in *children {
                rule.parent_map
                    .insert((*child).to_string(), (*parent).to_string());
            }
        }
        rule
    }
}
