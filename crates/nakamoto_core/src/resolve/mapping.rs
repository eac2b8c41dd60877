//! Case-insensitive organization mapping table.
//!
//! # Responsibility
//! - Own key case folding so call sites never re-fold.
//! - Union-merge organization sets whenever two keys fold together.
//! - Provide the single-writer build phase (`MappingBuilder`).
//!
//! # Invariants
//! - `OrganizationMapping` is immutable once built.
//! - Stored labels are trimmed and non-empty.
//! - No key is ever overwritten; collisions take the union.

use crate::resolve::canonical::canonicalize_list;
use log::debug;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One mapping entry, keyed by its folded form inside the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Spelling of the key as first seen.
    pub key: String,
    pub organizations: BTreeSet<String>,
}

/// Read-only person/handle → organizations table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationMapping {
    entries: BTreeMap<String, MappingEntry>,
}

/// Folds a lookup key: trimmed and lowercased.
pub fn fold_key(key: &str) -> String {
    key.trim().to_lowercase()
}

impl OrganizationMapping {
    pub fn builder() -> MappingBuilder {
        MappingBuilder::default()
    }

    /// Looks up organizations for `key`, ignoring case and outer whitespace.
    ///
    /// Returns `None` for blank keys and keys without labels.
    pub fn lookup(&self, key: &str) -> Option<&BTreeSet<String>> {
        let folded = fold_key(key);
        if folded.is_empty() {
            return None;
        }
        self.entries
            .get(&folded)
            .map(|entry| &entry.organizations)
            .filter(|organizations| !organizations.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in folded-key order.
    pub fn entries(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.values()
    }

    /// Loads a canonical table from `{ "key": ["Org", ...] }` JSON.
    ///
    /// A bare string value is read as a one-element list. Labels are taken
    /// as already canonical; keys that fold together are merged.
    pub fn from_json_str(json: &str) -> Result<Self, MappingError> {
        let raw: BTreeMap<String, MappingValue> =
            serde_json::from_str(json).map_err(MappingError::Json)?;
        let mut builder = MappingBuilder::default();
        for (key, value) in raw {
            builder.insert_canonical(&key, value.into_labels());
        }
        Ok(builder.build())
    }

    /// Serializes the table with sorted keys and labels.
    pub fn to_json_string(&self) -> Result<String, MappingError> {
        let table: BTreeMap<&str, Vec<&str>> = self
            .entries
            .values()
            .map(|entry| {
                (
                    entry.key.as_str(),
                    entry.organizations.iter().map(String::as_str).collect(),
                )
            })
            .collect();
        serde_json::to_string_pretty(&table).map_err(MappingError::Json)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MappingValue {
    One(String),
    Many(Vec<String>),
}

impl MappingValue {
    fn into_labels(self) -> Vec<String> {
        match self {
            Self::One(label) => vec![label],
            Self::Many(labels) => labels,
        }
    }
}

/// Mapping load/save errors.
#[derive(Debug)]
pub enum MappingError {
    Json(serde_json::Error),
}

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid organization mapping json: {err}"),
        }
    }
}

impl Error for MappingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}

/// Single-writer builder for `OrganizationMapping`.
#[derive(Debug, Clone, Default)]
pub struct MappingBuilder {
    entries: BTreeMap<String, MappingEntry>,
}

impl MappingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions already-canonical labels into the entry for `key`.
    ///
    /// Blank keys and blank labels are ignored.
    pub fn insert_canonical<I, S>(&mut self, key: &str, labels: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let folded = fold_key(key);
        if folded.is_empty() {
            debug!("event=mapping_key_skipped module=resolve reason=blank_key");
            return self;
        }

        let labels: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().trim().to_string())
            .filter(|label| !label.is_empty())
            .collect();
        if labels.is_empty() {
            return self;
        }

        self.entries
            .entry(folded)
            .or_insert_with(|| MappingEntry {
                key: key.trim().to_string(),
                organizations: BTreeSet::new(),
            })
            .organizations
            .extend(labels);
        self
    }

    /// Canonicalizes a `;`-separated raw organization list into `key`.
    pub fn insert_raw(&mut self, key: &str, raw_organizations: &str) -> &mut Self {
        let labels = canonicalize_list(raw_organizations);
        self.insert_canonical(key, labels)
    }

    /// Maps an author's name and every handle to the same raw organizations.
    pub fn add_author<H>(&mut self, name: &str, handles: &[H], raw_organizations: &str) -> &mut Self
    where
        H: AsRef<str>,
    {
        let labels = canonicalize_list(raw_organizations);
        self.insert_canonical(name, &labels);
        for handle in handles {
            self.insert_canonical(handle.as_ref(), &labels);
        }
        self
    }

    /// Unions every entry of an existing table into this builder.
    pub fn merge(&mut self, mapping: &OrganizationMapping) -> &mut Self {
        for entry in mapping.entries() {
            self.insert_canonical(&entry.key, &entry.organizations);
        }
        self
    }

    /// Freezes the builder into a read-only table.
    pub fn build(&self) -> OrganizationMapping {
        OrganizationMapping {
            entries: self.entries.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{fold_key, MappingBuilder, OrganizationMapping};

    #[test]
    fn fold_key_trims_and_lowercases() {
        assert_eq!(fold_key("  Tim BEIKO "), "tim beiko");
    }

    #[test]
    fn colliding_keys_union_instead_of_overwriting() {
        let mapping = MappingBuilder::new()
            .insert_canonical("Tim Beiko", ["Ethereum"])
            .insert_canonical("tim beiko", ["Protocol Support"])
            .build();

        assert_eq!(mapping.len(), 1);
        let orgs = mapping.lookup("TIM BEIKO").expect("entry should exist");
        assert!(orgs.contains("Ethereum"));
        assert!(orgs.contains("Protocol Support"));
        assert_eq!(mapping.entries().next().map(|e| e.key.as_str()), Some("Tim Beiko"));
    }

    #[test]
    fn blank_keys_and_labels_are_ignored() {
        let mapping = MappingBuilder::new()
            .insert_canonical("   ", ["Ethereum"])
            .insert_canonical("ann", ["  ", ""])
            .build();
        assert!(mapping.is_empty());
        assert!(mapping.lookup("").is_none());
    }

    #[test]
    fn add_author_maps_name_and_handles() {
        let mapping = MappingBuilder::new()
            .add_author("Péter Szilágyi", &["karalabe"], "EF/Geth")
            .build();
        assert_eq!(mapping.lookup("péter szilágyi"), mapping.lookup("KARALABE"));
        assert!(mapping.lookup("karalabe").expect("handle entry").contains("Geth"));
    }

    #[test]
    fn json_round_trip_keeps_merged_entries() {
        let mapping = OrganizationMapping::from_json_str(
            r#"{"Alice": ["Acme"], "ALICE": "Globex", "bob": []}"#,
        )
        .expect("json should load");
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.lookup("alice").map(|orgs| orgs.len()), Some(2));

        let json = mapping.to_json_string().expect("json should serialize");
        let reloaded = OrganizationMapping::from_json_str(&json).expect("reload");
        assert_eq!(reloaded, mapping);
    }

    #[test]
    fn merge_unions_labels_for_case_folded_keys() {
        let existing = OrganizationMapping::from_json_str(r#"{"VITALIK BUTERIN": ["Ethereum"]}"#)
            .expect("json should load");
        let mapping = OrganizationMapping::builder()
            .insert_canonical("Vitalik Buterin", ["Protocol Guild"])
            .merge(&existing)
            .build();

        assert_eq!(mapping.len(), 1);
        assert!(mapping.contains_key("vitalik buterin"));
        let orgs = mapping.lookup("Vitalik Buterin").expect("merged entry");
        assert_eq!(
            orgs.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["Ethereum", "Protocol Guild"]
        );
        assert!(!mapping.contains_key("vitalik"));
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(OrganizationMapping::from_json_str("[1, 2]").is_err());
    }
}
