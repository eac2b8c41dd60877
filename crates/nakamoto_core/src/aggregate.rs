//! Share aggregation over grouped attributions.
//!
//! # Responsibility
//! - Deduplicate organizations inside each group.
//! - Convert group membership counts into normalized shares.
//!
//! # Invariants
//! - One organization contributes at most one unit per group.
//! - Shares divide by the number of (group, entity) pairs, so a
//!   distribution with at least one unit sums to one.
//! - Unattributed groups are counted, never relabelled here.

use crate::model::identity::ResolvedAttribution;
use crate::model::record::GroupingKey;
use crate::model::share::ShareRow;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// What a group counts as when no identity in it resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyGroupPolicy {
    /// Count the group under its authors' literal names.
    AuthorNames,
    /// Count the group as one unattributed unit.
    Unattributed,
}

impl EmptyGroupPolicy {
    /// Proposals fall back to author names, meetings stay unattributed.
    pub fn for_key(key: GroupingKey) -> Self {
        if key.is_proposal() {
            Self::AuthorNames
        } else {
            Self::Unattributed
        }
    }
}

/// Invalid aggregation input; indicates a caller bug, not bad data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// Attribution references a group missing from the batch.
    UnknownGroupingKey(GroupingKey),
    /// Organization label is blank or carries outer whitespace.
    InvalidLabel { key: GroupingKey, label: String },
}

impl Display for AggregateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownGroupingKey(key) => write!(f, "attribution for unknown group {key}"),
            Self::InvalidLabel { key, label } => {
                write!(f, "invalid organization label `{label}` in {key}")
            }
        }
    }
}

impl Error for AggregateError {}

/// Normalized organization shares for one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareDistribution {
    rows: Vec<ShareRow>,
    unattributed_groups: usize,
    unattributed_share: f64,
    group_count: usize,
    total_units: usize,
}

impl ShareDistribution {
    /// Attributed rows sorted by share descending, then entity ascending.
    pub fn rows(&self) -> &[ShareRow] {
        &self.rows
    }

    pub fn unattributed_groups(&self) -> usize {
        self.unattributed_groups
    }

    /// Share held by groups without any attribution.
    pub fn unattributed_share(&self) -> f64 {
        self.unattributed_share
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Number of (group, entity) pairs, the share denominator.
    pub fn total_units(&self) -> usize {
        self.total_units
    }

    pub fn is_empty(&self) -> bool {
        self.total_units == 0
    }

    /// Returns the share held by `entity`, or zero.
    pub fn share_of(&self, entity: &str) -> f64 {
        self.rows
            .iter()
            .find(|row| row.entity == entity)
            .map(|row| row.share)
            .unwrap_or(0.0)
    }

    /// Rows with the unattributed share folded in under `label`.
    ///
    /// Used at the reporting boundary; an existing row named `label`
    /// absorbs the unattributed share.
    pub fn labelled_rows(&self, label: &str) -> Vec<ShareRow> {
        let mut rows = self.rows.clone();
        if self.unattributed_groups > 0 {
            match rows.iter_mut().find(|row| row.entity == label) {
                Some(row) => row.share += self.unattributed_share,
                None => rows.push(ShareRow::new(label, self.unattributed_share)),
            }
            sort_rows(&mut rows);
        }
        rows
    }
}

#[derive(Default)]
struct GroupState {
    organizations: BTreeSet<String>,
    names: BTreeSet<String>,
}

/// Groups attributions and computes per-entity shares.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShareAggregator {
    policy: Option<EmptyGroupPolicy>,
}

impl ShareAggregator {
    /// Creates an aggregator choosing the empty-group policy per key kind.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an aggregator applying `policy` to every group.
    pub fn with_policy(policy: EmptyGroupPolicy) -> Self {
        Self {
            policy: Some(policy),
        }
    }

    /// Aggregates `attributions` over the groups named by `keys`.
    ///
    /// Groups present in `keys` without any attribution follow the
    /// empty-group policy.
    ///
    /// # Errors
    /// - `UnknownGroupingKey` when an attribution's key is not in `keys`.
    /// - `InvalidLabel` when a label is blank or untrimmed.
    pub fn aggregate<'k, K>(
        &self,
        keys: K,
        attributions: &[ResolvedAttribution],
    ) -> Result<ShareDistribution, AggregateError>
    where
        K: IntoIterator<Item = &'k GroupingKey>,
    {
        let mut groups: BTreeMap<GroupingKey, GroupState> = keys
            .into_iter()
            .map(|key| (*key, GroupState::default()))
            .collect();

        for attribution in attributions {
            let key = attribution.grouping_key;
            let group = groups
                .get_mut(&key)
                .ok_or(AggregateError::UnknownGroupingKey(key))?;
            for label in &attribution.organizations {
                if label.is_empty() || label.trim() != label {
                    return Err(AggregateError::InvalidLabel {
                        key,
                        label: label.clone(),
                    });
                }
            }
            group
                .organizations
                .extend(attribution.organizations.iter().cloned());
            let name = attribution.identity_name.trim();
            if !name.is_empty() {
                group.names.insert(name.to_string());
            }
        }

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut unattributed_groups = 0usize;
        for (key, group) in &groups {
            let policy = self.policy.unwrap_or_else(|| EmptyGroupPolicy::for_key(*key));
            let entities = if !group.organizations.is_empty() {
                &group.organizations
            } else if policy == EmptyGroupPolicy::AuthorNames && !group.names.is_empty() {
                debug!("event=author_name_fallback module=aggregate key={key}");
                &group.names
            } else {
                unattributed_groups += 1;
                continue;
            };
            for entity in entities {
                *counts.entry(entity.clone()).or_insert(0) += 1;
            }
        }

        let attributed_units: usize = counts.values().sum();
        let total_units = attributed_units + unattributed_groups;
        let mut rows: Vec<ShareRow> = counts
            .into_iter()
            .map(|(entity, count)| ShareRow::new(entity, ratio(count, total_units)))
            .collect();
        sort_rows(&mut rows);

        Ok(ShareDistribution {
            rows,
            unattributed_groups,
            unattributed_share: ratio(unattributed_groups, total_units),
            group_count: groups.len(),
            total_units,
        })
    }
}

/// Aggregates with the per-key default policy.
pub fn aggregate<'k, K>(
    keys: K,
    attributions: &[ResolvedAttribution],
) -> Result<ShareDistribution, AggregateError>
where
    K: IntoIterator<Item = &'k GroupingKey>,
{
    ShareAggregator::new().aggregate(keys, attributions)
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

pub(crate) fn sort_rows(rows: &mut [ShareRow]) {
    rows.sort_by(|a, b| {
        b.share
            .total_cmp(&a.share)
            .then_with(|| a.entity.cmp(&b.entity))
    });
}
