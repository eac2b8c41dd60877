//! Single-token identity extraction.
//!
//! Each field is pulled by an independent pattern that returns the captured
//! value plus the residual string. Patterns run in `FIELD_PIPELINE` order and
//! every later pattern only sees what earlier ones left behind.

use crate::model::identity::Identity;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([^<>]*\.[^<>]*)>").expect("valid email regex"));
static HANDLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(\[<,])@([\w-]+)").expect("valid handle regex"));
static INLINE_ORG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^()]*[^()\s][^()]*)\)").expect("valid inline org regex"));
static EMPTY_BRACKETS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([\s,;]*\)|<\s*>|\[\s*\]").expect("valid empty bracket regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Identity field populated by one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Email,
    Handle,
    InlineOrganization,
}

/// Value captured by one stage and the input with the match removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    pub value: String,
    pub residual: String,
}

struct FieldPattern {
    field: IdentityField,
    regex: &'static Lazy<Regex>,
    value_group: usize,
    /// Group re-inserted into the residual (a boundary consumed by the match).
    keep_group: Option<usize>,
}

impl FieldPattern {
    fn apply(&self, input: &str) -> Option<FieldMatch> {
        let caps = self.regex.captures(input)?;
        let whole = caps.get(0)?;
        // A handle removed from `(@ann, Acme)` leaves its separator behind.
        let value = caps
            .get(self.value_group)?
            .as_str()
            .trim_matches(|c: char| c.is_whitespace() || c == ',' || c == ';');
        if value.is_empty() {
            return None;
        }

        let kept = self
            .keep_group
            .and_then(|group| caps.get(group))
            .map(|m| m.as_str())
            .unwrap_or("");
        let residual = format!(
            "{}{} {}",
            &input[..whole.start()],
            kept,
            &input[whole.end()..]
        );

        Some(FieldMatch {
            value: value.to_string(),
            residual,
        })
    }
}

static FIELD_PIPELINE: [FieldPattern; 3] = [
    FieldPattern {
        field: IdentityField::Email,
        regex: &EMAIL_RE,
        value_group: 1,
        keep_group: None,
    },
    FieldPattern {
        field: IdentityField::Handle,
        regex: &HANDLE_RE,
        value_group: 2,
        keep_group: Some(1),
    },
    FieldPattern {
        field: IdentityField::InlineOrganization,
        regex: &INLINE_ORG_RE,
        value_group: 1,
        keep_group: None,
    },
];

/// Runs a single pipeline stage in isolation.
pub fn match_field(field: IdentityField, input: &str) -> Option<FieldMatch> {
    FIELD_PIPELINE
        .iter()
        .find(|pattern| pattern.field == field)
        .and_then(|pattern| pattern.apply(input))
}

/// Parses one author/attendee token into an `Identity`.
///
/// Unmatched or partial brackets stay in the name. A token without any
/// recognizable structure becomes a name-only identity.
pub fn extract_identity(raw: &str) -> Identity {
    let mut identity = Identity::default();
    let mut working = raw.to_string();

    for pattern in &FIELD_PIPELINE {
        let Some(found) = pattern.apply(&working) else {
            continue;
        };
        match pattern.field {
            IdentityField::Email => identity.email = Some(found.value),
            IdentityField::Handle => identity.handle = Some(found.value),
            IdentityField::InlineOrganization => identity.inline_organization = Some(found.value),
        }
        working = found.residual;
    }

    identity.name = clean_name(&working);
    identity
}

fn clean_name(residual: &str) -> String {
    let without_empty = EMPTY_BRACKETS_RE.replace_all(residual, " ");
    let collapsed = WHITESPACE_RE.replace_all(&without_empty, " ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '*')
        .to_string()
}

/// Splits a delimiter-joined participant list.
///
/// Delimiters nested inside `()`, `<>` or `[]` do not split, so
/// `"Ann (Foo, Inc), Bob"` yields two tokens. Blank tokens are dropped.
pub fn split_participants(raw: &str, delimiter: char) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in raw.chars() {
        match c {
            '(' | '<' | '[' => depth += 1,
            ')' | '>' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if c == delimiter && depth == 0 {
            tokens.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    tokens.push(current);

    tokens
        .into_iter()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .collect()
}
