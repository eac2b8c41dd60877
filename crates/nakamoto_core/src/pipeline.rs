//! End-to-end analysis over a record batch.
//!
//! # Responsibility
//! - Compose filter → extract → resolve → aggregate → coefficient.
//! - Contain malformed records at the per-record boundary.
//!
//! # Invariants
//! - A malformed record is logged, counted and skipped; the batch continues.
//! - The mapping is borrowed read-only for the whole run.
//! - The unattributed label is applied only to `reported_rows`; the
//!   canonical `distribution` is never relabelled.

use crate::aggregate::{AggregateError, ShareAggregator, ShareDistribution};
use crate::coefficient::{nakamoto_coefficient, CoefficientError};
use crate::config::{AnalysisConfig, ConfigError};
use crate::documents::{ParseError, ParseResult};
use crate::extract::identity::extract_identity;
use crate::model::identity::ResolvedAttribution;
use crate::model::record::{GroupingKey, RawRecord};
use crate::model::share::{CoefficientResult, ShareRow};
use crate::resolve::mapping::OrganizationMapping;
use crate::resolve::resolver::OrganizationResolver;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stage failure that aborts a run (caller bug or bad configuration).
#[derive(Debug)]
pub enum PipelineError {
    Config(ConfigError),
    Aggregate(AggregateError),
    Coefficient(CoefficientError),
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Aggregate(err) => write!(f, "{err}"),
            Self::Coefficient(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Aggregate(err) => Some(err),
            Self::Coefficient(err) => Some(err),
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<AggregateError> for PipelineError {
    fn from(value: AggregateError) -> Self {
        Self::Aggregate(value)
    }
}

impl From<CoefficientError> for PipelineError {
    fn from(value: CoefficientError) -> Self {
        Self::Coefficient(value)
    }
}

/// Result of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    /// Canonical distribution with unattributed groups kept apart.
    pub distribution: ShareDistribution,
    /// Distribution rows with the unattributed share under the configured label.
    pub reported_rows: Vec<ShareRow>,
    /// Coefficient over `reported_rows`.
    pub coefficient: CoefficientResult,
    /// Records that passed the filter and produced attributions.
    pub processed_records: usize,
    /// Records removed by the filter.
    pub filtered_records: usize,
    /// Records skipped as malformed.
    pub skipped_records: usize,
}

/// One configured analysis over a borrowed mapping table.
#[derive(Debug, Clone)]
pub struct Analysis<'m> {
    mapping: &'m OrganizationMapping,
    config: AnalysisConfig,
}

impl<'m> Analysis<'m> {
    pub fn new(mapping: &'m OrganizationMapping, config: AnalysisConfig) -> Self {
        Self { mapping, config }
    }

    /// Extracts and resolves every participant of one record.
    ///
    /// # Errors
    /// - `NoParticipants` when the record lists nobody.
    /// - `NoIdentities` when every participant string is blank.
    pub fn attribute_record(&self, record: &RawRecord) -> ParseResult<Vec<ResolvedAttribution>> {
        let resolver =
            OrganizationResolver::with_options(self.mapping, self.config.resolver_options());
        attribute_with(&resolver, record)
    }

    /// Runs the full pipeline over `records`.
    ///
    /// # Errors
    /// - `Config` when the configuration is invalid.
    /// - `Aggregate`/`Coefficient` on invariant violations between stages.
    pub fn run(&self, records: &[RawRecord]) -> Result<AnalysisOutcome, PipelineError> {
        self.config.validate()?;

        let kept = self.config.record_filter().apply(records);
        let filtered_records = records.len() - kept.len();
        info!(
            "event=records_filtered module=pipeline total={} kept={} filtered={}",
            records.len(),
            kept.len(),
            filtered_records
        );

        let resolver =
            OrganizationResolver::with_options(self.mapping, self.config.resolver_options());
        let mut keys: Vec<GroupingKey> = Vec::with_capacity(kept.len());
        let mut attributions: Vec<ResolvedAttribution> = Vec::new();
        let mut skipped_records = 0usize;

        for record in kept {
            match attribute_with(&resolver, record) {
                Ok(resolved) => {
                    keys.push(record.key);
                    attributions.extend(resolved);
                }
                Err(err) => {
                    skipped_records += 1;
                    warn!(
                        "event=record_skipped module=pipeline key={} reason={}",
                        record.key, err
                    );
                }
            }
        }

        let distribution = ShareAggregator::new().aggregate(keys.iter(), &attributions)?;
        let reported_rows = distribution.labelled_rows(&self.config.unattributed_label);
        let coefficient = nakamoto_coefficient(&reported_rows, self.config.threshold)?;

        info!(
            "event=analysis_complete module=pipeline processed={} skipped={} entities={} coefficient={} cumulative={:.4}",
            keys.len(),
            skipped_records,
            reported_rows.len(),
            coefficient.coefficient,
            coefficient.cumulative_share
        );

        Ok(AnalysisOutcome {
            distribution,
            reported_rows,
            coefficient,
            processed_records: keys.len(),
            filtered_records,
            skipped_records,
        })
    }
}

fn attribute_with(
    resolver: &OrganizationResolver<'_>,
    record: &RawRecord,
) -> ParseResult<Vec<ResolvedAttribution>> {
    if record.participants.is_empty() {
        return Err(ParseError::NoParticipants(record.key));
    }

    let attributions: Vec<ResolvedAttribution> = record
        .participants
        .iter()
        .map(|raw| extract_identity(raw))
        .filter(|identity| !identity.is_empty())
        .map(|identity| resolver.attribute(record.key, &identity))
        .collect();
    if attributions.is_empty() {
        return Err(ParseError::NoIdentities(record.key));
    }

    debug!(
        "event=record_attributed module=pipeline key={} identities={} unattributed={}",
        record.key,
        attributions.len(),
        attributions.iter().filter(|a| a.is_unattributed()).count()
    );
    Ok(attributions)
}

/// Governance domain a coefficient was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Domain {
    ProposalAuthorship,
    MeetingAttendance,
    ClientDiversity,
    StakingDistribution,
}

impl Domain {
    /// Stable identifier used in summary tables.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProposalAuthorship => "EIP_Authorship",
            Self::MeetingAttendance => "Core_Dev_Attendance",
            Self::ClientDiversity => "Client_Diversity",
            Self::StakingDistribution => "Staking_Distribution",
        }
    }

    /// Human-readable report title.
    pub fn title(self) -> &'static str {
        match self {
            Self::ProposalAuthorship => "EIP Authorship by Organization",
            Self::MeetingAttendance => "Core Dev Attendance by Organization",
            Self::ClientDiversity => "Client Diversity Share",
            Self::StakingDistribution => "Staking Distribution by Pool",
        }
    }

    /// Column header for the entity column.
    pub fn entity_column(self) -> &'static str {
        match self {
            Self::ProposalAuthorship | Self::MeetingAttendance => "Organization",
            Self::ClientDiversity => "Client",
            Self::StakingDistribution => "Pool",
        }
    }
}

/// Coefficients for several domains, ordered by `Domain`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainSummary {
    results: BTreeMap<Domain, CoefficientResult>,
}

impl DomainSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `result` for `domain`, replacing an earlier one.
    pub fn record(&mut self, domain: Domain, result: CoefficientResult) {
        self.results.insert(domain, result);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Domain, &CoefficientResult)> {
        self.results.iter().map(|(domain, result)| (*domain, result))
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Analysis, Domain, DomainSummary};
    use crate::config::AnalysisConfig;
    use crate::documents::ParseError;
    use crate::model::record::{GroupingKey, RawRecord};
    use crate::model::share::CoefficientResult;
    use crate::resolve::mapping::MappingBuilder;

    #[test]
    fn blank_participants_are_malformed() {
        let mapping = MappingBuilder::new().build();
        let analysis = Analysis::new(&mapping, AnalysisConfig::default());
        let record = RawRecord::new(GroupingKey::Proposal(1), ["  ", "**"]);
        assert_eq!(
            analysis.attribute_record(&record).unwrap_err(),
            ParseError::NoIdentities(GroupingKey::Proposal(1))
        );
    }

    #[test]
    fn invalid_config_aborts_run() {
        let mapping = MappingBuilder::new().build();
        let config = AnalysisConfig {
            threshold: f64::NAN,
            ..AnalysisConfig::default()
        };
        assert!(Analysis::new(&mapping, config).run(&[]).is_err());
    }

    #[test]
    fn summary_iterates_in_domain_order() {
        let result = CoefficientResult {
            coefficient: 2,
            cumulative_share: 0.6,
            threshold: 0.5,
            threshold_reached: true,
        };
        let mut summary = DomainSummary::new();
        summary.record(Domain::StakingDistribution, result.clone());
        summary.record(Domain::ProposalAuthorship, result);
        let order: Vec<_> = summary.iter().map(|(domain, _)| domain.as_str()).collect();
        assert_eq!(order, vec!["EIP_Authorship", "Staking_Distribution"]);
    }
}
