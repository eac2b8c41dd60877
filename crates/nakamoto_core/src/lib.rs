//! Nakamoto-coefficient analysis of protocol governance activity.
//!
//! Records (proposals, meetings) flow through extraction, organization
//! resolution, filtering and share aggregation before the coefficient is
//! computed. Every stage is a pure function over borrowed inputs; only the
//! CLI touches the filesystem.

pub mod aggregate;
pub mod coefficient;
pub mod config;
pub mod documents;
pub mod extract;
pub mod filter;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod resolve;
pub mod share_list;

pub use aggregate::{
    aggregate, AggregateError, EmptyGroupPolicy, ShareAggregator, ShareDistribution,
};
pub use coefficient::{
    majority_coefficient, nakamoto_coefficient, rank_shares, CoefficientError,
    BOUNDARY_TOLERANCE, DEFAULT_THRESHOLD,
};
pub use config::{AnalysisConfig, ConfigError};
pub use documents::{
    parse_batch, parse_meeting, parse_proposal, DocumentBatch, ParseError, ParseResult,
};
pub use extract::{extract_attendees, extract_identity, split_participants, AttendeeList};
pub use filter::{filter_records, ExcludedTrack, RecordFilter};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::identity::{Identity, ResolvedAttribution};
pub use model::record::{GroupingKey, RawRecord};
pub use model::share::{CoefficientResult, ShareRow};
pub use pipeline::{Analysis, AnalysisOutcome, Domain, DomainSummary, PipelineError};
pub use report::{
    render_summary_text, write_summary_csv, ReportFormatter, ReportInput, SilentFormatter,
    TextReportFormatter,
};
pub use resolve::{
    canonicalize, canonicalize_list, organization_from_email, resolve, MappingBuilder,
    MappingError, OrganizationMapping, OrganizationResolver, ResolverOptions,
};
pub use share_list::{shares_from_json, ShareParseError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
