/// Regex-driven classification.
///
/// A [`PatternRule`] holds one regex. A filename either matches the whole
/// pattern or it does not match at all; on a match, each capture group becomes
/// one directory level, in declaration order.
///
/// # Examples
///
/// ```
/// use dirsort::file_pattern::PatternRule;
///
/// let rule = PatternRule::default();
/// let path = rule.classify("ENEE408A_HOMEWORK1_Bob.pdf").unwrap();
/// assert_eq!(path.segments(), ["ENEE408A", "HOMEWORK1"]);
/// assert!(rule.classify("notes.pdf").is_none());
/// ```
use crate::classifier::DestinationPath;
use crate::config::ConfigError;
use regex::Regex;

/// `COURSE_ASSIGNMENT_NAME.ext` -> `COURSE/ASSIGNMENT`.
pub const DEFAULT_PATTERN: &str = r"^(.*?)_(.*?)_.*?\.\w{3,4}$";

/// A compiled, fully anchored filename pattern.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pattern: String,
    regex: Regex,
}

impl PatternRule {
    /// Compiles `pattern`, anchoring it at both ends.
    ///
    /// # Errors
    ///
    /// * `InvalidRegexPattern` if the pattern does not compile
    /// * `NoCaptureGroups` if it has nothing to build a path from
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            ConfigError::InvalidRegexPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        })?;

        // captures_len() counts the implicit whole-match group
        if regex.captures_len() < 2 {
            return Err(ConfigError::NoCaptureGroups(pattern.to_string()));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as given by the caller, without the added anchors.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Number of capture groups, i.e. the depth of every destination.
    pub fn group_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Matches `file_name` against the whole pattern.
    ///
    /// Groups that did not participate in the match become empty segments.
    pub fn classify(&self, file_name: &str) -> Option<DestinationPath> {
        let captures = self.regex.captures(file_name)?;
        let segments = captures
            .iter()
            .skip(1)
            .map(|group| group.map_or("", |m| m.as_str()).to_string())
            .collect();
        DestinationPath::new(segments)
    }
}

impl Default for PatternRule {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN).expect("default pattern is valid")
    }
}
