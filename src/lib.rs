/*!
 * tsmanifest - Generate a TypeScript manifest of a source tree
 *
 * Scans a directory, derives a dotted key for every source file and writes
 * a `.manifest.ts` declaring the key-to-path object, grouped into regions
 * that mirror the directory tree. Watch mode keeps the file up to date.
 */

pub mod builder;
pub mod config;
pub mod error;
pub mod filter;
pub mod grouper;
pub mod key;
pub mod report;
pub mod scanner;
pub mod types;
pub mod watch;
pub mod writer;

#[cfg(test)]
mod tests;

// Re-export main components for easier access
pub use builder::ManifestBuilder;
pub use config::{Args, ScanOptions, DEFAULT_EXTENSION, MANIFEST_NAME};
pub use error::{ManifestError, Result};
pub use filter::Filter;
pub use grouper::group;
pub use key::derive_key;
pub use report::{ReportFormat, Reporter};
pub use scanner::Scanner;
pub use types::{BuildSummary, FlatManifest, ManifestEntry, RegionNode, ScanOutcome};
pub use watch::{ShutdownHandle, WatchLoop, WatchSession, WatchSummary};
pub use writer::{render, ManifestWriter};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
