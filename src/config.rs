/*!
 * Configuration handling for tsmanifest
 */

use std::env;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use clap_complete::Shell;

use crate::error::Result;
use crate::{bail, ensure};

/// File name of the generated manifest, placed at the root of the base directory
pub const MANIFEST_NAME: &str = ".manifest.ts";

/// Extension every scan includes; stripped silently from keys
pub const DEFAULT_EXTENSION: &str = ".ts";

/// Base directory used when none is given
pub const DEFAULT_BASE_DIR: &str = "src";

/// Command-line arguments for tsmanifest
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "tsmanifest",
    version = env!("CARGO_PKG_VERSION"),
    about = "Generate a TypeScript manifest mapping module keys to source paths",
    long_about = "Scans a source directory and writes a .manifest.ts file declaring an object that maps dotted module keys to file paths, grouped into regions per directory."
)]
pub struct Args {
    /// Watch the base directory and regenerate the manifest on change
    #[clap(long, short = 'w')]
    pub watch: bool,

    /// Base directory to scan
    #[clap(long, short = 'b', default_value = DEFAULT_BASE_DIR, env = "BASE_DIR")]
    pub base_dir: String,

    /// Patterns of files to exclude (can be repeated)
    #[clap(long = "exclude", short = 'e')]
    pub exclude_patterns: Vec<String>,

    /// Extra file extensions to include besides .ts (can be repeated)
    #[clap(long = "extensions", short = 'x', value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Exclude *.test.* and *.spec.* files
    #[clap(long, default_value = "true", action = ArgAction::Set, env = "EXCLUDE_TESTS")]
    pub exclude_tests: bool,

    /// Append "as const" to the generated manifest
    #[clap(long = "const", short = 'c', env = "AS_CONST")]
    pub as_const: bool,

    /// Print detailed progress
    #[clap(long, short = 'v')]
    pub verbose: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Immutable options for one manifest build
#[derive(Clone, Debug)]
pub struct ScanOptions {
    /// Absolute directory to scan
    pub base_dir: PathBuf,

    /// Directory manifest values are relative to
    pub root: PathBuf,

    /// Wildcard patterns excluding matching paths
    pub exclude_patterns: Vec<String>,

    /// Whether test and spec files are dropped
    pub exclude_tests: bool,

    /// Recognized extensions, the default one first
    pub extensions: Vec<String>,

    /// Close the declaration with `as const`
    pub as_const: bool,

    /// Emit per-file notices and the summary report
    pub verbose: bool,
}

impl ScanOptions {
    /// Options with defaults for `base_dir`, values made relative to `root`
    pub fn new(base_dir: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            root: root.into(),
            exclude_patterns: Vec::new(),
            exclude_tests: true,
            extensions: vec![DEFAULT_EXTENSION.to_string()],
            as_const: false,
            verbose: false,
        }
    }

    /// Create options from command-line arguments, relative to the working directory
    pub fn from_args(args: &Args) -> Result<Self> {
        let root = env::current_dir()?;
        let base_dir = root.join(&args.base_dir);

        let options = Self {
            exclude_patterns: args.exclude_patterns.clone(),
            exclude_tests: args.exclude_tests,
            as_const: args.as_const,
            verbose: args.verbose,
            ..Self::new(base_dir, root)
        }
        .with_extensions(args.extensions.as_slice())?;

        options.validate()?;
        Ok(options)
    }

    /// Add extra extensions after the default one
    pub fn with_extensions<S: AsRef<str>>(mut self, extra: &[S]) -> Result<Self> {
        for ext in extra {
            let ext = normalize_extension(ext.as_ref())?;
            if !self.extensions.contains(&ext) {
                self.extensions.push(ext);
            }
        }
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.base_dir.is_absolute(),
            Config,
            "Base directory must be absolute: {}",
            self.base_dir.display()
        );
        ensure!(
            self.base_dir.is_dir(),
            Config,
            "Base directory not found: {}",
            self.base_dir.display()
        );
        ensure!(
            !self.extensions.is_empty(),
            Config,
            "At least one extension is required"
        );
        Ok(())
    }

    /// Absolute path of the generated manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.base_dir.join(MANIFEST_NAME)
    }

    /// Base directory relative to the root, with forward slashes
    pub fn value_prefix(&self) -> String {
        let relative = pathdiff::diff_paths(&self.base_dir, &self.root)
            .unwrap_or_else(|| self.base_dir.clone());
        to_slash(&relative)
    }

    /// Same options with verbose output turned off
    pub fn quiet(&self) -> Self {
        Self {
            verbose: false,
            ..self.clone()
        }
    }
}

/// Normalize an extension to carry a single leading dot
pub fn normalize_extension(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_start_matches('*').trim_start_matches('.');
    if trimmed.is_empty() || trimmed.contains(['/', '\\']) {
        bail!(Config, "Invalid extension: {:?}", raw);
    }
    Ok(format!(".{}", trimmed))
}

/// Render a path with forward slashes regardless of platform
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn extensions_gain_a_leading_dot() {
        assert_eq!(normalize_extension("css").unwrap(), ".css");
        assert_eq!(normalize_extension(".txt").unwrap(), ".txt");
        assert_eq!(normalize_extension("*.json").unwrap(), ".json");
        assert!(normalize_extension("").is_err());
        assert!(normalize_extension("a/b").is_err());
    }

    #[test]
    fn default_extension_is_not_duplicated() {
        let options = ScanOptions::new("/tmp", "/")
            .with_extensions(&["ts", "css", ".css"])
            .unwrap();
        assert_eq!(options.extensions, vec![".ts", ".css"]);
    }

    #[test]
    fn missing_base_dir_is_a_config_error() {
        let temp = tempdir().unwrap();
        let options = ScanOptions::new(temp.path().join("nope"), temp.path());
        let err = options.validate().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn value_prefix_is_relative_to_root() {
        let options = ScanOptions::new("/work/project/src/cli", "/work/project");
        assert_eq!(options.value_prefix(), "src/cli");

        let same = ScanOptions::new("/work/project", "/work/project");
        assert_eq!(same.value_prefix(), "");
    }

    #[test]
    fn args_parse_repeated_flags() {
        let args = Args::parse_from([
            "tsmanifest",
            "-e",
            "helpers",
            "--exclude",
            "cli/*.ts",
            "-x",
            "css,txt",
            "--exclude-tests",
            "false",
            "-c",
        ]);
        assert_eq!(args.exclude_patterns, vec!["helpers", "cli/*.ts"]);
        assert_eq!(args.extensions, vec!["css", "txt"]);
        assert!(!args.exclude_tests);
        assert!(args.as_const);
        assert!(!args.watch);
    }
}
