//! Record inclusion rules applied before aggregation.
//!
//! # Responsibility
//! - Drop records that moved to another numbering track.
//! - Apply the optional exact status filter and accepted-status set.
//!
//! # Invariants
//! - Track exclusion always runs before any status filter.
//! - Filtering is a pure predicate; applying it twice equals applying it once.

use crate::model::record::RawRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Category/status pair that marks a record as moved elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedTrack {
    pub category: String,
    pub status: String,
}

impl ExcludedTrack {
    pub fn new(category: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            status: status.into(),
        }
    }

    fn matches(&self, record: &RawRecord) -> bool {
        record.category() == Some(self.category.trim())
            && record.status() == Some(self.status.trim())
    }
}

/// Tracks excluded unless configured otherwise: ERCs moved to their own repo.
pub fn default_excluded_tracks() -> Vec<ExcludedTrack> {
    vec![ExcludedTrack::new("ERC", "Moved")]
}

/// Ordered composition of track exclusion and status filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    excluded_tracks: Vec<ExcludedTrack>,
    status: Option<String>,
    accepted_statuses: BTreeSet<String>,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RecordFilter {
    /// Creates a filter with the default excluded tracks and an optional
    /// exact-match status.
    pub fn new(status: Option<&str>) -> Self {
        Self {
            excluded_tracks: default_excluded_tracks(),
            status: status
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            accepted_statuses: BTreeSet::new(),
        }
    }

    pub fn with_excluded_tracks(mut self, tracks: Vec<ExcludedTrack>) -> Self {
        self.excluded_tracks = tracks;
        self
    }

    /// Keeps only records whose status is in `statuses` (ignored when empty).
    pub fn with_accepted_statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.accepted_statuses = statuses
            .into_iter()
            .map(|status| status.as_ref().trim().to_string())
            .filter(|status| !status.is_empty())
            .collect();
        self
    }

    /// Returns whether the record sits on an excluded track.
    pub fn is_excluded(&self, record: &RawRecord) -> bool {
        self.excluded_tracks.iter().any(|track| track.matches(record))
    }

    /// Returns whether the record passes every rule.
    pub fn accepts(&self, record: &RawRecord) -> bool {
        if self.is_excluded(record) {
            return false;
        }
        if let Some(status) = self.status.as_deref() {
            if record.status() != Some(status) {
                return false;
            }
        }
        if !self.accepted_statuses.is_empty() {
            return record
                .status()
                .is_some_and(|status| self.accepted_statuses.contains(status));
        }
        true
    }

    /// Borrows the accepted records, keeping input order.
    pub fn apply<'a>(&self, records: &'a [RawRecord]) -> Vec<&'a RawRecord> {
        records.iter().filter(|record| self.accepts(record)).collect()
    }
}

/// Drops moved-track records, then applies an optional exact status filter.
pub fn filter_records(records: &[RawRecord], status: Option<&str>) -> Vec<RawRecord> {
    RecordFilter::new(status)
        .apply(records)
        .into_iter()
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{filter_records, ExcludedTrack, RecordFilter};
    use crate::model::record::{GroupingKey, RawRecord};

    fn proposal(number: u32, category: &str, status: &str) -> RawRecord {
        RawRecord::new(GroupingKey::Proposal(number), ["Ann"])
            .with_category(category)
            .with_status(status)
    }

    #[test]
    fn moved_erc_is_dropped_even_when_status_filter_asks_for_it() {
        let records = vec![proposal(20, "ERC", "Moved"), proposal(1559, "Core", "Moved")];
        let kept = filter_records(&records, Some("Moved"));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].key, GroupingKey::Proposal(1559));
    }

    #[test]
    fn exact_status_filter_is_case_sensitive() {
        let records = vec![proposal(1, "Core", "Final"), proposal(2, "Core", "final")];
        let kept = filter_records(&records, Some("Final"));
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn accepted_statuses_require_a_status() {
        let filter = RecordFilter::new(None).with_accepted_statuses(["Final", "Living"]);
        let no_status = RawRecord::new(GroupingKey::Proposal(3), ["Ann"]);
        assert!(!filter.accepts(&no_status));
        assert!(filter.accepts(&proposal(4, "Core", "Living")));
        assert!(!filter.accepts(&proposal(5, "Core", "Draft")));
    }

    #[test]
    fn custom_tracks_replace_defaults() {
        let filter =
            RecordFilter::new(None).with_excluded_tracks(vec![ExcludedTrack::new("Core", "Stagnant")]);
        assert!(filter.accepts(&proposal(20, "ERC", "Moved")));
        assert!(!filter.accepts(&proposal(21, "Core", "Stagnant")));
    }
}
