//! Per-identity organization resolution.
//!
//! # Invariants
//! - Rules run in `RESOLUTION_ORDER`; the first non-empty result wins.
//! - The mapping is only read, never mutated.
//! - An empty result means unattributed; no placeholder label is invented.

use crate::model::identity::{Identity, ResolvedAttribution};
use crate::model::record::GroupingKey;
use crate::resolve::email::organization_from_email;
use crate::resolve::mapping::OrganizationMapping;
use std::collections::BTreeSet;

/// One step of the resolution precedence chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionRule {
    /// Mapping lookup by extracted name.
    MappedName,
    /// Mapping lookup by handle.
    MappedHandle,
    /// Parenthetical organization from the raw string.
    InlineOrganization,
    /// Handle used as its own organization label.
    HandleSelfAttribution,
    /// Organization inferred from the email domain (opt-in).
    EmailDomain,
}

const RESOLUTION_ORDER: [ResolutionRule; 5] = [
    ResolutionRule::MappedName,
    ResolutionRule::MappedHandle,
    ResolutionRule::InlineOrganization,
    ResolutionRule::HandleSelfAttribution,
    ResolutionRule::EmailDomain,
];

/// Optional resolver behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Enables `ResolutionRule::EmailDomain` after handle self-attribution.
    pub infer_from_email: bool,
}

/// Resolution outcome with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// `None` when no rule produced a label.
    pub rule: Option<ResolutionRule>,
    pub organizations: BTreeSet<String>,
}

/// Resolves identities against a borrowed mapping table.
#[derive(Debug, Clone, Copy)]
pub struct OrganizationResolver<'m> {
    mapping: &'m OrganizationMapping,
    options: ResolverOptions,
}

impl<'m> OrganizationResolver<'m> {
    pub fn new(mapping: &'m OrganizationMapping) -> Self {
        Self::with_options(mapping, ResolverOptions::default())
    }

    pub fn with_options(mapping: &'m OrganizationMapping, options: ResolverOptions) -> Self {
        Self { mapping, options }
    }

    /// Resolves `identity` and reports which rule fired.
    pub fn resolve_with_rule(&self, identity: &Identity) -> Resolution {
        for rule in RESOLUTION_ORDER {
            let organizations = self.apply(rule, identity);
            if !organizations.is_empty() {
                return Resolution {
                    rule: Some(rule),
                    organizations,
                };
            }
        }
        Resolution {
            rule: None,
            organizations: BTreeSet::new(),
        }
    }

    /// Resolves `identity` to a possibly empty set of labels.
    pub fn resolve(&self, identity: &Identity) -> BTreeSet<String> {
        self.resolve_with_rule(identity).organizations
    }

    /// Resolves `identity` into an attribution for `grouping_key`.
    pub fn attribute(&self, grouping_key: GroupingKey, identity: &Identity) -> ResolvedAttribution {
        ResolvedAttribution {
            grouping_key,
            identity_name: identity.name.trim().to_string(),
            organizations: self.resolve(identity),
        }
    }

    fn apply(&self, rule: ResolutionRule, identity: &Identity) -> BTreeSet<String> {
        match rule {
            ResolutionRule::MappedName => self.mapped(Some(identity.name.as_str())),
            ResolutionRule::MappedHandle => self.mapped(identity.handle.as_deref()),
            ResolutionRule::InlineOrganization => singleton(identity.inline_organization.as_deref()),
            ResolutionRule::HandleSelfAttribution => singleton(identity.handle.as_deref()),
            ResolutionRule::EmailDomain if self.options.infer_from_email => singleton(
                identity
                    .email
                    .as_deref()
                    .and_then(organization_from_email)
                    .as_deref(),
            ),
            ResolutionRule::EmailDomain => BTreeSet::new(),
        }
    }

    fn mapped(&self, key: Option<&str>) -> BTreeSet<String> {
        key.and_then(|key| self.mapping.lookup(key))
            .cloned()
            .unwrap_or_default()
    }
}

fn singleton(label: Option<&str>) -> BTreeSet<String> {
    label
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(|label| BTreeSet::from([label.to_string()]))
        .unwrap_or_default()
}

/// Resolves `identity` with default options.
pub fn resolve(identity: &Identity, mapping: &OrganizationMapping) -> BTreeSet<String> {
    OrganizationResolver::new(mapping).resolve(identity)
}
