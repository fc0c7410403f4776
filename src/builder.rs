/*!
 * One-shot manifest generation: scan, group, render, write
 */

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use indicatif::ProgressBar;
use tracing::info;

use crate::config::{to_slash, ScanOptions};
use crate::error::Result;
use crate::filter::{Filter, PathPredicate};
use crate::grouper::group;
use crate::report::{ReportFormat, Reporter};
use crate::scanner::Scanner;
use crate::types::{BuildSummary, ScanOutcome};
use crate::writer::{render, ManifestWriter};

/// Runs the whole pipeline for one set of options
#[derive(Clone)]
pub struct ManifestBuilder {
    options: ScanOptions,
    progress: Arc<ProgressBar>,
    predicate: Option<PathPredicate>,
}

/// Rendered manifest text plus what the scan found
struct Rendered {
    text: String,
    outcome: ScanOutcome,
    regions: usize,
}

impl ManifestBuilder {
    /// Create a builder without a visible progress bar
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            progress: Arc::new(ProgressBar::hidden()),
            predicate: None,
        }
    }

    /// Report scan progress on `progress`
    pub fn with_progress(mut self, progress: Arc<ProgressBar>) -> Self {
        self.progress = progress;
        self
    }

    /// Exclude files (and prune directories) rejected by `predicate`
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, bool) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Options this builder runs with
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Same builder with verbose output turned off
    pub fn quiet(&self) -> Self {
        Self {
            options: self.options.quiet(),
            ..self.clone()
        }
    }

    /// Scan and render without touching the manifest file
    pub fn render(&self) -> Result<String> {
        Ok(self.prepare()?.text)
    }

    /// Generate the manifest and overwrite the file
    ///
    /// Nothing is written unless the scan and render both succeed.
    pub fn build(&self) -> Result<BuildSummary> {
        let start = Instant::now();
        let Rendered {
            text,
            outcome,
            regions,
        } = self.prepare()?;

        let manifest_path = self.options.manifest_path();
        ManifestWriter::new(&manifest_path).write(&text)?;

        let summary = BuildSummary {
            output_file: self.display_path(&manifest_path),
            included: outcome.included,
            excluded: outcome.excluded,
            regions,
            duration: start.elapsed(),
        };

        info!("✅ Manifest generated: {}", summary.output_file);
        if self.options.verbose {
            Reporter::new(ReportFormat::ConsoleTable).print_report(&summary);
        }

        Ok(summary)
    }

    fn prepare(&self) -> Result<Rendered> {
        let options = &self.options;

        if options.verbose {
            info!("🔍 Scanning files...");
            info!("📂 Base directory: {}", self.display_path(&options.base_dir));
            if !options.exclude_patterns.is_empty() {
                info!("🚫 Exclude patterns: {}", options.exclude_patterns.join(", "));
            }
        }

        let mut filter = Filter::new(options)?;
        if let Some(predicate) = &self.predicate {
            let predicate = Arc::clone(predicate);
            filter = filter.with_predicate(move |path, is_dir| predicate(path, is_dir));
        }

        let outcome = Scanner::new(options.clone(), filter, Arc::clone(&self.progress)).scan()?;
        let root = group(&outcome.manifest, &options.value_prefix());
        let text = render(&root, options.as_const);

        Ok(Rendered {
            text,
            regions: root.region_count(),
            outcome,
        })
    }

    fn display_path(&self, path: &Path) -> String {
        let relative =
            pathdiff::diff_paths(path, &self.options.root).unwrap_or_else(|| path.to_path_buf());
        to_slash(&relative)
    }
}
