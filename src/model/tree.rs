use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One value inside a language tree: either a translated string or a nested
/// group of keys. Intermediate nodes are always maps, leaves always strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeValue {
    Leaf(String),
    Node(BTreeMap<String, TreeValue>),
}

/// A language tree root. Roots are always maps in the persisted files.
pub type Tree = BTreeMap<String, TreeValue>;

/// Collects every dotted path to a leaf, depth-first. BTreeMap iteration
/// keeps the output sorted.
pub fn flatten(tree: &Tree) -> Vec<String> {
    let mut keys = Vec::new();
    for (k, v) in tree {
        collect(v, k, &mut keys);
    }
    keys
}

fn collect(value: &TreeValue, prefix: &str, keys: &mut Vec<String>) {
    match value {
        TreeValue::Leaf(_) => keys.push(prefix.to_string()),
        TreeValue::Node(map) => {
            for (k, v) in map {
                collect(v, &format!("{prefix}.{k}"), keys);
            }
        }
    }
}

/// Resolves a dotted key to its leaf string. Any missing segment, or a
/// path that ends on a node instead of a leaf, is a normal miss.
pub fn get_path<'a>(tree: &'a Tree, key: &str) -> Option<&'a str> {
    let mut parts = key.split('.');
    let first = parts.next()?;
    let mut current = tree.get(first)?;

    for part in parts {
        match current {
            TreeValue::Node(map) => current = map.get(part)?,
            TreeValue::Leaf(_) => return None,
        }
    }

    match current {
        TreeValue::Leaf(s) => Some(s),
        TreeValue::Node(_) => None,
    }
}

/// Sets a leaf at a dotted key, creating intermediate nodes as needed.
/// A leaf sitting where an intermediate node is required gets replaced.
pub fn set_path(tree: &mut Tree, key: &str, value: &str) {
    let parts: Vec<&str> = key.split('.').collect();
    set_parts(tree, &parts, value);
}

fn set_parts(map: &mut Tree, parts: &[&str], value: &str) {
    match parts {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), TreeValue::Leaf(value.to_string()));
        }
        [head, rest @ ..] => {
            let entry = map
                .entry((*head).to_string())
                .or_insert_with(|| TreeValue::Node(BTreeMap::new()));

            if let TreeValue::Leaf(_) = entry {
                *entry = TreeValue::Node(BTreeMap::new());
            }

            if let TreeValue::Node(child) = entry {
                set_parts(child, rest, value);
            }
        }
    }
}
