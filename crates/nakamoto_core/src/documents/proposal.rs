//! Proposal markdown parsing.
//!
//! # Invariants
//! - The proposal number comes from the file name (`eip-<n>`), never from
//!   front matter.
//! - The `author` field may be a comma-joined string or a YAML list.

use crate::documents::{ParseError, ParseResult};
use crate::extract::identity::split_participants;
use crate::model::record::{GroupingKey, RawRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};

static FRONT_MATTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A\s*---\r?\n(.*?)\r?\n---").expect("valid front matter regex")
});
static PROPOSAL_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)eip-(\d+)").expect("valid proposal number regex"));

/// Parses one proposal document.
///
/// # Errors
/// - `MissingFrontMatter` when no `---` block opens the document.
/// - `InvalidFrontMatter` when the block is not a YAML mapping.
/// - `MissingProposalNumber` when `file_name` carries no `eip-<n>`.
pub fn parse_proposal(file_name: &str, content: &str) -> ParseResult<RawRecord> {
    let front_matter = FRONT_MATTER_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .ok_or(ParseError::MissingFrontMatter)?;

    let fields: Mapping = match serde_yaml::from_str::<Value>(front_matter.as_str()) {
        Ok(Value::Mapping(mapping)) => mapping,
        Ok(_) => {
            return Err(ParseError::InvalidFrontMatter(
                "front matter is not a mapping".to_string(),
            ))
        }
        Err(err) => return Err(ParseError::InvalidFrontMatter(err.to_string())),
    };

    let number = proposal_number(file_name)
        .ok_or_else(|| ParseError::MissingProposalNumber(file_name.to_string()))?;

    let participants = match fields.get("author") {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_string).collect(),
        Some(other) => scalar_string(other)
            .map(|joined| split_participants(&joined, ','))
            .unwrap_or_default(),
        None => Vec::new(),
    };

    let mut record = RawRecord::new(GroupingKey::Proposal(number), participants);
    record.title = field(&fields, "title");
    record.status = field(&fields, "status");
    record.record_type = field(&fields, "type");
    record.category = field(&fields, "category");
    record.date = field(&fields, "created");
    Ok(record)
}

fn proposal_number(file_name: &str) -> Option<u32> {
    PROPOSAL_NUMBER_RE
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn field(fields: &Mapping, key: &str) -> Option<String> {
    fields.get(key).and_then(scalar_string)
}

fn scalar_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::parse_proposal;
    use crate::documents::ParseError;
    use crate::model::record::GroupingKey;

    #[test]
    fn author_list_form_is_supported() {
        let content = "---\neip: 9\ntitle: Listed\nauthor:\n  - Ann <ann@x.org>\n  - Bob @bob\nstatus: Draft\n---\nbody";
        let record = parse_proposal("eip-9.md", content).expect("parse should succeed");
        assert_eq!(record.key, GroupingKey::Proposal(9));
        assert_eq!(record.participants, vec!["Ann <ann@x.org>", "Bob @bob"]);
    }

    #[test]
    fn numeric_title_is_kept_as_text() {
        let content = "---\ntitle: 1234\nauthor: Ann\n---\n";
        let record = parse_proposal("eip-5.md", content).expect("parse should succeed");
        assert_eq!(record.title.as_deref(), Some("1234"));
    }

    #[test]
    fn scalar_front_matter_is_rejected() {
        let err = parse_proposal("eip-5.md", "---\njust text\n---\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidFrontMatter(_)));
    }
}
