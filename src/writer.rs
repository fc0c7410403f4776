/*!
 * Manifest rendering and persistence
 */

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{ManifestError, Result};
use crate::types::{ManifestEntry, RegionNode};

/// Opening line of the generated declaration
pub const DECLARATION: &str = "export const MANIFEST = {";

const INDENT: &str = "  ";

static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Render the region tree as a TypeScript object declaration
///
/// Output depends only on `root` and `as_const`, so identical scans give
/// byte-identical files.
pub fn render(root: &RegionNode, as_const: bool) -> String {
    let mut out = String::new();
    out.push_str(DECLARATION);
    out.push('\n');

    render_body(root, 1, &mut out);

    out.push_str(if as_const { "} as const;" } else { "};" });
    out.push('\n');
    out
}

fn render_body(region: &RegionNode, depth: usize, out: &mut String) {
    let indent = INDENT.repeat(depth);

    for ManifestEntry { key, value } in &region.entries {
        let _ = writeln!(out, "{}{}: {},", indent, format_key(key), quote(value));
    }

    let children = region.sorted_children();
    if !region.entries.is_empty() && !children.is_empty() {
        out.push('\n');
    }

    for (i, child) in children.iter().enumerate() {
        let _ = writeln!(out, "{}// #region {}", indent, child.name);
        render_body(child, depth + 1, out);
        let _ = writeln!(out, "{}// #endregion", indent);

        if i + 1 < children.len() {
            out.push('\n');
        }
    }
}

/// Object key, quoted unless it is a plain identifier
pub fn format_key(key: &str) -> String {
    if IDENTIFIER_REGEX.is_match(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Single-quoted string literal
pub fn quote(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

/// Persists rendered manifests
pub struct ManifestWriter {
    /// Final manifest location
    path: PathBuf,
}

impl ManifestWriter {
    /// Create a writer targeting `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the manifest with `content`
    ///
    /// The buffer goes to a sibling temp file first and is renamed over the
    /// target, so the manifest is either the old or the new version.
    pub fn write(&self, content: &str) -> Result<()> {
        let tmp = self.tmp_path();
        let result = fs::write(&tmp, content).and_then(|_| fs::rename(&tmp, &self.path));

        if let Err(source) = result {
            let _ = fs::remove_file(&tmp);
            return Err(ManifestError::Write {
                path: self.path.clone(),
                source,
            });
        }

        debug!("wrote {} bytes to {}", content.len(), self.path.display());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
