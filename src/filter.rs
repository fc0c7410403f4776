/*!
 * Inclusion and exclusion rules for scanned files
 */

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::config::{ScanOptions, MANIFEST_NAME};
use crate::error::Result;

/// Extra rule called with `(relative_path, is_dir)`; returning `false` excludes
pub type PathPredicate = Arc<dyn Fn(&str, bool) -> bool + Send + Sync>;

/// Decides whether a relative path is left out of the manifest
///
/// Rules are checked in a fixed order and the first match wins: the
/// manifest's own name, test and spec suffixes, exclude patterns, then the
/// optional predicate.
#[derive(Clone)]
pub struct Filter {
    test_suffixes: Vec<String>,
    patterns: Vec<Regex>,
    predicate: Option<PathPredicate>,
}

impl Filter {
    /// Compile the rules described by `options`
    pub fn new(options: &ScanOptions) -> Result<Self> {
        let test_suffixes = if options.exclude_tests {
            options
                .extensions
                .iter()
                .flat_map(|ext| [format!(".test{}", ext), format!(".spec{}", ext)])
                .collect()
        } else {
            Vec::new()
        };

        let patterns = options
            .exclude_patterns
            .iter()
            .map(|pattern| wildcard_to_regex(pattern))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            test_suffixes,
            patterns,
            predicate: None,
        })
    }

    /// Attach a predicate evaluated after the built-in rules
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, bool) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Whether a file should be left out of the manifest
    pub fn should_exclude(&self, relative_path: &str) -> bool {
        if relative_path.contains(MANIFEST_NAME) {
            return true;
        }

        if self
            .test_suffixes
            .iter()
            .any(|suffix| relative_path.ends_with(suffix.as_str()))
        {
            return true;
        }

        if self.patterns.iter().any(|re| re.is_match(relative_path)) {
            return true;
        }

        matches!(&self.predicate, Some(predicate) if !predicate(relative_path, false))
    }

    /// Whether the scanner should skip a whole directory
    ///
    /// Only the predicate can prune directories; patterns apply to files.
    pub fn should_skip_dir(&self, relative_path: &str) -> bool {
        matches!(&self.predicate, Some(predicate) if !predicate(relative_path, true))
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("test_suffixes", &self.test_suffixes)
            .field("patterns", &self.patterns)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Translate a simple wildcard into an unanchored regex
///
/// `*` matches any sequence, `?` any single character, everything else is
/// literal.
pub fn wildcard_to_regex(pattern: &str) -> Result<Regex> {
    let translated = pattern
        .split('*')
        .map(|part| {
            part.split('?')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".")
        })
        .collect::<Vec<_>>()
        .join(".*");

    Ok(Regex::new(&translated)?)
}
