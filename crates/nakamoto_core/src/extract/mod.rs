//! Identity extraction from semi-structured author and attendee text.
//!
//! # Responsibility
//! - Turn one raw author/attendee token into a structured `Identity`.
//! - Locate attendee lists inside free-form meeting notes.
//!
//! # Invariants
//! - Extraction never fails; missing structure yields empty optionals.
//! - Field precedence is fixed: email, handle, inline organization, name.
//! - Attendee output is a set; order inside one record is not meaningful.

pub mod attendees;
pub mod identity;

pub use attendees::{extract_attendees, AttendeeList, AttendeeSource};
pub use identity::{
    extract_identity, match_field, split_participants, FieldMatch, IdentityField,
};
