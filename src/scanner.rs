/*!
 * Directory scanning
 */

use std::path::Path;
use std::sync::Arc;

use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{to_slash, ScanOptions};
use crate::error::Result;
use crate::filter::Filter;
use crate::key::derive_key;
use crate::types::{FlatManifest, ScanOutcome};

/// Scanner for the base directory
pub struct Scanner {
    /// Scan options
    options: ScanOptions,
    /// Exclusion rules
    filter: Filter,
    /// Progress bar, ticked once per candidate file
    pub progress: Arc<ProgressBar>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(options: ScanOptions, filter: Filter, progress: Arc<ProgressBar>) -> Self {
        Self {
            options,
            filter,
            progress,
        }
    }

    /// Walk the base directory and return the flat manifest
    ///
    /// Any unreadable entry aborts the scan; a partial map is never returned.
    pub fn scan(&self) -> Result<ScanOutcome> {
        let base = &self.options.base_dir;
        let mut candidates = Vec::new();
        let mut excluded = 0;

        let mut walker = WalkDir::new(base)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry?;
            let relative = relative_path(entry.path(), base);

            if entry.file_type().is_dir() {
                if self.filter.should_skip_dir(&relative) {
                    if self.options.verbose {
                        info!("🚫 Excluded directory: {}", relative);
                    }
                    excluded += 1;
                    walker.skip_current_dir();
                }
                continue;
            }

            if entry.file_type().is_file() && self.has_extension(&relative) {
                candidates.push(relative);
            }
        }

        debug!("{} candidate files under {}", candidates.len(), base.display());
        self.progress.set_length(candidates.len() as u64);

        // Classify in parallel; collect keeps the sorted walk order
        let classified: Vec<(String, Option<String>)> = candidates
            .into_par_iter()
            .map(|relative| {
                self.progress.inc(1);
                let key = if self.filter.should_exclude(&relative) {
                    None
                } else {
                    Some(derive_key(&relative, &self.options.extensions))
                };
                (relative, key)
            })
            .collect();

        let prefix = self.options.value_prefix();
        let mut manifest = FlatManifest::new();
        let mut included = 0;

        for (relative, key) in classified {
            let Some(key) = key else {
                if self.options.verbose {
                    info!("🚫 Excluded file: {}", relative);
                }
                excluded += 1;
                continue;
            };

            if self.options.verbose {
                info!("✅ Included file: {} → {}", relative, key);
            }

            let value = join_value(&prefix, &relative);
            if let Some(previous) = manifest.insert(key.clone(), value) {
                warn!(
                    "Key {} derived from both {} and {}; keeping the latter",
                    key, previous, relative
                );
            }
            included += 1;
        }

        Ok(ScanOutcome {
            manifest,
            included,
            excluded,
        })
    }

    fn has_extension(&self, relative: &str) -> bool {
        self.options
            .extensions
            .iter()
            .any(|ext| relative.ends_with(ext.as_str()))
    }
}

/// Path of `path` below `base`, with forward slashes
fn relative_path(path: &Path, base: &Path) -> String {
    to_slash(path.strip_prefix(base).unwrap_or(path))
}

/// Stored manifest value for a file relative to the base directory
pub fn join_value(prefix: &str, relative: &str) -> String {
    if prefix.is_empty() {
        relative.to_string()
    } else {
        format!("{}/{}", prefix, relative)
    }
}
