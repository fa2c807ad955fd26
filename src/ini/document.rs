//! In-memory section/key/value document.
//!
//! Sections and keys are kept in `BTreeMap`s so serialization is
//! deterministic: the same content always produces the same bytes.

use std::collections::BTreeMap;

use crate::errors::{Result, StoreError};

/// Key → value table of one section.
pub type Section = BTreeMap<String, String>;

/// A single match returned by [`Document::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub section: String,
    pub key: String,
    pub value: String,
}

/// The whole store: section name → section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    sections: BTreeMap<String, Section>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Section names in output order.
    pub fn section_names(&self) -> Vec<String> {
        self.sections.keys().cloned().collect()
    }

    /// Iterate sections in output order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Section)> {
        self.sections.iter()
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    pub fn has_key(&self, section: &str, key: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|s| s.contains_key(key))
    }

    pub fn section(&self, section: &str) -> Option<&Section> {
        self.sections.get(section)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }

    /// Return the named section, creating an empty one if absent.
    pub fn section_entry(&mut self, section: &str) -> &mut Section {
        self.sections.entry(section.to_string()).or_default()
    }

    /// Insert or overwrite a value, creating the section if needed.
    ///
    /// Returns `true` when the stored content changed.
    pub fn set(&mut self, section: &str, key: &str, value: &str) -> bool {
        let value = value.trim();
        let table = self.section_entry(section);
        match table.get(key) {
            Some(existing) if existing == value => false,
            _ => {
                table.insert(key.to_string(), value.to_string());
                true
            }
        }
    }

    /// Add an empty section. Returns `false` if it already existed.
    pub fn add_section(&mut self, section: &str) -> bool {
        if self.sections.contains_key(section) {
            return false;
        }
        self.sections.insert(section.to_string(), Section::new());
        true
    }

    /// Insert a key only if it is absent. Returns `false` if it already existed.
    pub fn add_key(&mut self, section: &str, key: &str, value: &str) -> bool {
        let table = self.section_entry(section);
        if table.contains_key(key) {
            return false;
        }
        table.insert(key.to_string(), value.trim().to_string());
        true
    }

    pub fn remove_section(&mut self, section: &str) -> Option<Section> {
        self.sections.remove(section)
    }

    pub fn remove_key(&mut self, section: &str, key: &str) -> Option<String> {
        self.sections.get_mut(section).and_then(|s| s.remove(key))
    }

    /// Rename a section, keeping its keys.
    ///
    /// Fails if `from` is missing or `to` already exists.
    pub fn rename_section(&mut self, from: &str, to: &str) -> Result<()> {
        if from == to {
            return if self.has_section(from) {
                Ok(())
            } else {
                Err(StoreError::SectionNotFound(from.to_string()))
            };
        }
        if self.sections.contains_key(to) {
            return Err(StoreError::AlreadyExists(format!("[{to}]")));
        }
        let table = self
            .sections
            .remove(from)
            .ok_or_else(|| StoreError::SectionNotFound(from.to_string()))?;
        self.sections.insert(to.to_string(), table);
        Ok(())
    }

    /// Rename a key within its section, keeping its value.
    pub fn rename_key(&mut self, section: &str, from: &str, to: &str) -> Result<()> {
        let table = self
            .sections
            .get_mut(section)
            .ok_or_else(|| StoreError::SectionNotFound(section.to_string()))?;
        if !table.contains_key(from) {
            return Err(StoreError::KeyNotFound {
                section: section.to_string(),
                key: from.to_string(),
            });
        }
        if from == to {
            return Ok(());
        }
        if table.contains_key(to) {
            return Err(StoreError::AlreadyExists(format!("[{section}] {to}")));
        }
        if let Some(value) = table.remove(from) {
            table.insert(to.to_string(), value);
        }
        Ok(())
    }

    /// Remove every key of a section, keeping the (now empty) section.
    pub fn clear_section(&mut self, section: &str) -> Result<()> {
        self.sections
            .get_mut(section)
            .map(Section::clear)
            .ok_or_else(|| StoreError::SectionNotFound(section.to_string()))
    }

    pub fn clear(&mut self) {
        self.sections.clear();
    }

    /// Substring search across keys and values.
    pub fn search(&self, needle: &str, ignore_case: bool) -> Vec<SearchHit> {
        let folded = needle.to_lowercase();
        let matches = |text: &str| {
            if ignore_case {
                text.to_lowercase().contains(&folded)
            } else {
                text.contains(needle)
            }
        };

        self.sections
            .iter()
            .flat_map(|(section, table)| {
                table.iter().map(move |(key, value)| (section, key, value))
            })
            .filter(|(_, key, value)| matches(key.as_str()) || matches(value.as_str()))
            .map(|(section, key, value)| SearchHit {
                section: section.clone(),
                key: key.clone(),
                value: value.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.set("server", "host", "localhost");
        doc.set("server", "port", "8080");
        doc.set("client", "timeout", "30");
        doc
    }

    #[test]
    fn set_trims_and_reports_change() {
        let mut doc = Document::new();
        assert!(doc.set("a", "k", "  v  "));
        assert_eq!(doc.get("a", "k"), Some("v"));
        assert!(!doc.set("a", "k", "v"));
    }

    #[test]
    fn empty_section_is_distinct_from_absent() {
        let mut doc = Document::new();
        assert!(doc.add_section("empty"));
        assert!(doc.has_section("empty"));
        assert!(!doc.has_section("other"));
        assert!(!doc.add_section("empty"));
    }

    #[test]
    fn add_key_does_not_overwrite() {
        let mut doc = sample();
        assert!(!doc.add_key("server", "port", "9090"));
        assert_eq!(doc.get("server", "port"), Some("8080"));
        assert!(doc.add_key("server", "tls", "off"));
    }

    #[test]
    fn rename_section_moves_keys() {
        let mut doc = sample();
        doc.rename_section("server", "backend").unwrap();
        assert!(!doc.has_section("server"));
        assert_eq!(doc.get("backend", "port"), Some("8080"));
        assert!(doc.rename_section("missing", "x").is_err());
        assert!(matches!(
            doc.rename_section("backend", "client"),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn rename_key_keeps_value() {
        let mut doc = sample();
        doc.rename_key("server", "host", "hostname").unwrap();
        assert_eq!(doc.get("server", "hostname"), Some("localhost"));
        assert!(!doc.has_key("server", "host"));
        assert!(matches!(
            doc.rename_key("server", "nope", "x"),
            Err(StoreError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn clear_section_keeps_section() {
        let mut doc = sample();
        doc.clear_section("server").unwrap();
        assert!(doc.has_section("server"));
        assert!(doc.section("server").unwrap().is_empty());
    }

    #[test]
    fn search_matches_keys_and_values() {
        let doc = sample();
        let hits = doc.search("local", false);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "host");
        let hits = doc.search("PORT", true);
        assert_eq!(hits.len(), 1);
        assert!(doc.search("HOST", false).is_empty());
        assert_eq!(doc.search("30", false)[0].key, "timeout");
    }
}
