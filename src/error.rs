//! Global error handling for tsmanifest
//!
//! Every fallible operation in the crate reports through [`ManifestError`],
//! so the front-end can decide in one place whether a failure is fatal.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Global error type for manifest generation
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Invalid options, detected before any scan starts
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A directory could not be read during traversal
    #[error("Scan error: {0}")]
    Walk(#[from] walkdir::Error),

    /// An exclude pattern did not compile
    #[error("Invalid exclude pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The manifest file could not be persisted
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// Target manifest path
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: io::Error,
    },

    /// Filesystem subscription errors
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    /// The shutdown hook could not be installed
    #[error("Signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Specialized Result type for manifest operations
pub type Result<T> = std::result::Result<T, ManifestError>;

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error::ManifestError::$error_type(format!($($arg)*)))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

impl ManifestError {
    /// Whether the error happened before any file was touched
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// Allow converting ManifestError to io::Error for io-based tests and callers
impl From<ManifestError> for io::Error {
    fn from(err: ManifestError) -> Self {
        match err {
            ManifestError::Io(inner) => inner,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}
