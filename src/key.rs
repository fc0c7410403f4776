/*!
 * Manifest key derivation
 *
 * A key is the relative path with separators turned into dots. The default
 * extension disappears; any other recognized extension survives as a
 * `:ext` marker so `button.ts` and `button.css` stay distinct.
 */

use crate::config::DEFAULT_EXTENSION;

/// Derive the dotted key for a path relative to the base directory
///
/// `extensions` is checked in order and the first suffix match wins; a path
/// matching none of them keeps its full name.
pub fn derive_key<S: AsRef<str>>(relative_path: &str, extensions: &[S]) -> String {
    let normalized = relative_path.replace('\\', "/");

    let stem = extensions
        .iter()
        .map(AsRef::as_ref)
        .find(|ext| normalized.ends_with(ext) && normalized.len() > ext.len())
        .map(|ext| {
            let stem = &normalized[..normalized.len() - ext.len()];
            if ext == DEFAULT_EXTENSION {
                stem.to_string()
            } else {
                format!("{}:{}", stem, ext.trim_start_matches('.'))
            }
        })
        .unwrap_or(normalized);

    stem.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Number of dot-separated segments in a key
pub fn key_depth(key: &str) -> usize {
    key.split('.').count()
}
