//! Domain model shared by extraction, resolution and aggregation.
//!
//! # Responsibility
//! - Define the canonical data shapes that flow between pipeline stages.
//! - Keep every shape plain data: no I/O, no interior mutability.
//!
//! # Invariants
//! - A `RawRecord` is immutable once loaded.
//! - Organization labels carried by a `ResolvedAttribution` are non-empty and
//!   trimmed.
//! - Share rows carry absolute shares; normalization is the producer's job.

pub mod identity;
pub mod record;
pub mod share;
