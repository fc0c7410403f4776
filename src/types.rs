/*!
 * Core types and data structures for the manifest pipeline
 */

use std::collections::BTreeMap;
use std::time::Duration;

/// Key to stored path, rebuilt from scratch on every scan
pub type FlatManifest = BTreeMap<String, String>;

/// One line of the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Dotted key, unique within a scan
    pub key: String,
    /// Path relative to the project root, forward slashes
    pub value: String,
}

/// One directory level of the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionNode {
    /// Directory segment name; empty for the root
    pub name: String,
    /// Files directly in this directory, in render order
    pub entries: Vec<ManifestEntry>,
    /// Subdirectories holding at least one included file
    pub children: BTreeMap<String, RegionNode>,
}

impl RegionNode {
    /// Total number of entries in this region and below
    pub fn len(&self) -> usize {
        self.entries.len() + self.children.values().map(RegionNode::len).sum::<usize>()
    }

    /// Whether the region holds no entries at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of regions below this one
    pub fn region_count(&self) -> usize {
        self.children
            .values()
            .map(|child| 1 + child.region_count())
            .sum()
    }
}

/// Counters produced by one scan
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Included entries
    pub manifest: FlatManifest,
    /// Files that made it into the manifest
    pub included: usize,
    /// Files and directories left out
    pub excluded: usize,
}

/// Result of one complete build
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Path of the written manifest
    pub output_file: String,
    /// Files included
    pub included: usize,
    /// Files and directories excluded
    pub excluded: usize,
    /// Regions rendered
    pub regions: usize,
    /// Scan, render and write time
    pub duration: Duration,
}
