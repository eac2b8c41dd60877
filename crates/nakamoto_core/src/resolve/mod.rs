//! Organization resolution.
//!
//! # Responsibility
//! - Canonicalize raw organization strings into label sets.
//! - Own the case-insensitive person/handle → organizations mapping.
//! - Resolve one `Identity` to a set of organization labels.
//!
//! # Invariants
//! - Canonical rules are additive; every rule sees the same input.
//! - Mapping keys compare case-insensitively and collisions union-merge.
//! - Resolution never fails; no data means an empty set.

pub mod canonical;
pub mod email;
pub mod mapping;
pub mod resolver;

pub use canonical::{canonicalize, canonicalize_list};
pub use email::organization_from_email;
pub use mapping::{MappingBuilder, MappingError, OrganizationMapping};
pub use resolver::{
    resolve, OrganizationResolver, Resolution, ResolutionRule, ResolverOptions,
};
