//! Raw input records.
//!
//! # Responsibility
//! - Carry one proposal or one meeting together with its unparsed
//!   author/attendee strings.
//! - Provide the grouping key used for per-group deduplication.
//!
//! # Invariants
//! - `GroupingKey` is totally ordered so grouped output is reproducible.
//! - `participants` keeps source order; it is not deduplicated here.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifies the unit inside which organizations are deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "number", rename_all = "snake_case")]
pub enum GroupingKey {
    /// One improvement proposal, keyed by its number.
    Proposal(u32),
    /// One core-dev meeting, keyed by its sequence number.
    Meeting(u32),
}

impl GroupingKey {
    /// Returns whether this key identifies a proposal.
    pub fn is_proposal(self) -> bool {
        matches!(self, Self::Proposal(_))
    }
}

impl Display for GroupingKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proposal(number) => write!(f, "EIP-{number}"),
            Self::Meeting(number) => write!(f, "ACD-{number}"),
        }
    }
}

/// One unit of input text with its raw participant strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub key: GroupingKey,
    pub title: Option<String>,
    /// Lifecycle status, e.g. `Final` or `Moved`.
    pub status: Option<String>,
    /// Proposal track category, e.g. `Core` or `ERC`.
    pub category: Option<String>,
    /// Proposal type (`Standards Track`, `Meta`, ...). Serialized as `type`.
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    /// Creation or meeting date as written in the source.
    pub date: Option<String>,
    /// Author/attendee strings, one identity each, not yet parsed.
    pub participants: Vec<String>,
}

impl RawRecord {
    /// Creates a record with only a key and participants.
    pub fn new<I, S>(key: GroupingKey, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key,
            title: None,
            status: None,
            category: None,
            record_type: None,
            date: None,
            participants: participants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Returns the trimmed status, treating blank values as absent.
    pub fn status(&self) -> Option<&str> {
        non_blank(self.status.as_deref())
    }

    /// Returns the trimmed category, treating blank values as absent.
    pub fn category(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
