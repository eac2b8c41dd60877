//! Analysis configuration.
//!
//! ## Example
//!
//! ```json
//! {
//!   "threshold": 0.5,
//!   "accepted_statuses": ["Final", "Living", "Last Call", "Review"],
//!   "excluded_tracks": [{ "category": "ERC", "status": "Moved" }],
//!   "unattributed_label": "Independent"
//! }
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use crate::coefficient::DEFAULT_THRESHOLD;
use crate::filter::{default_excluded_tracks, ExcludedTrack, RecordFilter};
use crate::resolve::resolver::ResolverOptions;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Label shown for unattributed groups at the reporting boundary.
pub const DEFAULT_UNATTRIBUTED_LABEL: &str = "Independent";
/// Rows shown in text reports.
pub const DEFAULT_REPORT_TOP_N: usize = 15;
/// Statuses counted as accepted proposals.
pub const ACCEPTED_PROPOSAL_STATUSES: &[&str] = &["Final", "Living", "Last Call", "Review"];

/// Knobs for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub threshold: f64,
    /// Exact-match status filter.
    pub status_filter: Option<String>,
    /// When non-empty, only these statuses are kept.
    pub accepted_statuses: Vec<String>,
    pub excluded_tracks: Vec<ExcludedTrack>,
    pub unattributed_label: String,
    pub report_top_n: usize,
    pub infer_from_email: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            status_filter: None,
            accepted_statuses: Vec::new(),
            excluded_tracks: default_excluded_tracks(),
            unattributed_label: DEFAULT_UNATTRIBUTED_LABEL.to_string(),
            report_top_n: DEFAULT_REPORT_TOP_N,
            infer_from_email: false,
        }
    }
}

impl AnalysisConfig {
    /// Default config restricted to accepted proposal statuses.
    pub fn accepted_proposals() -> Self {
        Self {
            accepted_statuses: ACCEPTED_PROPOSAL_STATUSES
                .iter()
                .map(|status| status.to_string())
                .collect(),
            ..Self::default()
        }
    }

    /// Same settings without status filtering, for records that carry no
    /// status (meetings).
    pub fn without_status_filters(&self) -> Self {
        Self {
            status_filter: None,
            accepted_statuses: Vec::new(),
            ..self.clone()
        }
    }

    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() {
            return Err(ConfigError::NonFiniteThreshold(self.threshold));
        }
        if self.unattributed_label.trim().is_empty() {
            return Err(ConfigError::EmptyUnattributedLabel);
        }
        if self.report_top_n == 0 {
            return Err(ConfigError::ZeroReportTopN);
        }
        Ok(())
    }

    /// Builds the record filter described by this config.
    pub fn record_filter(&self) -> RecordFilter {
        RecordFilter::new(self.status_filter.as_deref())
            .with_excluded_tracks(self.excluded_tracks.clone())
            .with_accepted_statuses(&self.accepted_statuses)
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            infer_from_email: self.infer_from_email,
        }
    }
}

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    NonFiniteThreshold(f64),
    EmptyUnattributedLabel,
    ZeroReportTopN,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid config json: {err}"),
            Self::NonFiniteThreshold(value) => write!(f, "threshold must be finite, got {value}"),
            Self::EmptyUnattributedLabel => write!(f, "unattributed_label must not be empty"),
            Self::ZeroReportTopN => write!(f, "report_top_n must be at least 1"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalysisConfig, ConfigError};

    #[test]
    fn empty_object_yields_defaults() {
        let config = AnalysisConfig::from_json_str("{}").expect("config");
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.excluded_tracks.len(), 1);
    }

    #[test]
    fn partial_config_overrides_fields() {
        let config = AnalysisConfig::from_json_str(
            r#"{"threshold": 0.33, "status_filter": "Final", "infer_from_email": true}"#,
        )
        .expect("config");
        assert_eq!(config.threshold, 0.33);
        assert_eq!(config.status_filter.as_deref(), Some("Final"));
        assert!(config.resolver_options().infer_from_email);
        assert_eq!(config.unattributed_label, "Independent");
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert!(matches!(
            AnalysisConfig::from_json_str(r#"{"unattributed_label": "  "}"#),
            Err(ConfigError::EmptyUnattributedLabel)
        ));
        assert!(matches!(
            AnalysisConfig::from_json_str(r#"{"report_top_n": 0}"#),
            Err(ConfigError::ZeroReportTopN)
        ));
        assert!(matches!(
            AnalysisConfig::from_json_str(r#"{"threshold": "half"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn accepted_preset_lists_review_statuses() {
        let config = AnalysisConfig::accepted_proposals();
        assert!(config.accepted_statuses.iter().any(|status| status == "Last Call"));
    }
}
