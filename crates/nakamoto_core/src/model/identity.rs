//! Extracted identities and their resolved attributions.

use crate::model::record::GroupingKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Structured candidate parsed from one raw author/attendee string.
///
/// Absent fields are `None`; extraction never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Remainder after email, handle and inline organization are removed.
    pub name: String,
    /// Address found inside angle brackets.
    pub email: Option<String>,
    /// Platform handle without the leading `@`.
    pub handle: Option<String>,
    /// Text found inside the first non-empty parentheses.
    pub inline_organization: Option<String>,
}

impl Identity {
    /// Returns whether nothing usable was extracted.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
            && self.email.is_none()
            && self.handle.is_none()
            && self.inline_organization.is_none()
    }
}

/// Organizations attributed to one identity inside one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAttribution {
    pub grouping_key: GroupingKey,
    /// Display name of the identity; used by the author-name fallback.
    pub identity_name: String,
    /// Empty means unattributed.
    pub organizations: BTreeSet<String>,
}

impl ResolvedAttribution {
    pub fn is_unattributed(&self) -> bool {
        self.organizations.is_empty()
    }
}
