use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Error;
use crate::model::tree::{self, Tree};

/// Reference language used to derive the key list when present.
const DEFAULT_LANGUAGE: &str = "en";

/// In-memory view of the per-language translation trees. Loaded fully at
/// startup, mutated key-by-key during a sync run, written back at the end.
pub struct LanguagePack {
    dir: PathBuf,
    languages: Vec<String>,
    packs: BTreeMap<String, Tree>,
    key_list: Option<Vec<String>>,
}

impl LanguagePack {
    /// Loads every `<lang>.json` file in `dir`. Non-JSON files are ignored.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let mut languages = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
            if !is_json {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                languages.push(stem.to_string());
            }
        }

        languages.sort();

        let mut packs = BTreeMap::new();
        for lang in &languages {
            let text = fs::read_to_string(language_file(dir, lang))?;
            let tree: Tree = serde_json::from_str(&text)?;
            packs.insert(lang.clone(), tree);
        }

        Ok(LanguagePack {
            dir: dir.to_path_buf(),
            languages,
            packs,
            key_list: None,
        })
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn get(&self, lang: &str, key: &str) -> Option<&str> {
        tree::get_path(self.packs.get(lang)?, key)
    }

    /// Sets a leaf, creating intermediate nodes as needed. Unknown
    /// languages get an empty tree so the value is not silently dropped.
    pub fn set(&mut self, lang: &str, key: &str, value: &str) {
        if !self.packs.contains_key(lang) {
            self.packs.insert(lang.to_string(), Tree::new());
            self.languages.push(lang.to_string());
            self.languages.sort();
        }
        if let Some(tree) = self.packs.get_mut(lang) {
            tree::set_path(tree, key, value);
        }
    }

    /// The value of one key across every language.
    pub fn all_values(&self, key: &str) -> BTreeMap<String, Option<String>> {
        self.languages
            .iter()
            .map(|lang| (lang.clone(), self.get(lang, key).map(str::to_string)))
            .collect()
    }

    /// Dotted keys of the reference tree (`en` when present, otherwise the
    /// first language). Computed once and cached for the store's lifetime.
    pub fn key_list(&mut self) -> &[String] {
        if self.key_list.is_none() {
            let reference = self
                .packs
                .get(DEFAULT_LANGUAGE)
                .or_else(|| self.packs.values().next());
            let keys = reference.map(tree::flatten).unwrap_or_default();
            self.key_list = Some(keys);
        }
        self.key_list.as_deref().unwrap_or_default()
    }

    /// Writes every language back to its own file: UTF-8 JSON, sorted keys,
    /// tab indentation. Deterministic output keeps VCS diffs stable.
    pub fn save(&self) -> Result<(), Error> {
        for (lang, tree) in &self.packs {
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
            let mut buf = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            tree.serialize(&mut ser)?;
            fs::write(language_file(&self.dir, lang), buf)?;
        }
        Ok(())
    }
}

fn language_file(dir: &Path, lang: &str) -> PathBuf {
    dir.join(format!("{lang}.json"))
}
