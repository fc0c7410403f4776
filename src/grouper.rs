/*!
 * Grouping of the flat manifest into nested regions
 *
 * Regions mirror the directory tree of the stored values. The tree is built
 * bottom-up from owned entry lists, so no node is touched after it is
 * returned.
 */

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::key::key_depth;
use crate::types::{FlatManifest, ManifestEntry, RegionNode};

/// Render order of two keys: shallower first, then alphabetical
pub fn entry_order(a: &str, b: &str) -> Ordering {
    key_depth(a).cmp(&key_depth(b)).then_with(|| a.cmp(b))
}

/// Build the region tree for `flat`, whose values all start with `prefix`
pub fn group(flat: &FlatManifest, prefix: &str) -> RegionNode {
    let members = flat
        .iter()
        .map(|(key, value)| {
            let relative = strip_prefix(value, prefix).to_string();
            let entry = ManifestEntry {
                key: key.clone(),
                value: value.clone(),
            };
            (relative, entry)
        })
        .collect();

    build_region(String::new(), members)
}

fn build_region(name: String, members: Vec<(String, ManifestEntry)>) -> RegionNode {
    let mut entries = Vec::new();
    let mut nested: BTreeMap<String, Vec<(String, ManifestEntry)>> = BTreeMap::new();

    for (relative, entry) in members {
        match relative.split_once('/') {
            Some((segment, rest)) => nested
                .entry(segment.to_string())
                .or_default()
                .push((rest.to_string(), entry)),
            None => entries.push(entry),
        }
    }

    entries.sort_by(|a, b| entry_order(&a.key, &b.key));

    let children = nested
        .into_iter()
        .map(|(segment, members)| (segment.clone(), build_region(segment, members)))
        .collect();

    RegionNode {
        name,
        entries,
        children,
    }
}

fn strip_prefix<'a>(value: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return value;
    }
    value
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(value)
}

impl RegionNode {
    /// Smallest key of the region in render order, searching all descendants
    pub fn first_key(&self) -> Option<&str> {
        let own = self.entries.first().map(|entry| entry.key.as_str());
        self.children
            .values()
            .filter_map(RegionNode::first_key)
            .chain(own)
            .min_by(|a, b| entry_order(a, b))
    }

    /// Child regions in render order
    pub fn sorted_children(&self) -> Vec<&RegionNode> {
        let mut children: Vec<&RegionNode> = self.children.values().collect();
        children.sort_by(|a, b| match (a.first_key(), b.first_key()) {
            (Some(x), Some(y)) => entry_order(x, y),
            _ => a.name.cmp(&b.name),
        });
        children
    }
}
