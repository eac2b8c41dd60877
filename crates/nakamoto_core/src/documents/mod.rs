//! Source document parsing into `RawRecord`s.
//!
//! # Responsibility
//! - Parse proposal markdown (YAML front matter) and meeting notes into
//!   records carrying raw participant strings.
//! - Report documents lacking required structure as `ParseError`.
//!
//! # Invariants
//! - Parsing is pure: callers own file discovery and reading.
//! - A parse error concerns one document only; batches keep going.

use crate::model::record::{GroupingKey, RawRecord};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod meeting;
pub mod proposal;

pub use meeting::parse_meeting;
pub use proposal::parse_proposal;

pub type ParseResult<T> = Result<T, ParseError>;

/// Malformed-input errors for one document or record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No `---` delimited front matter at the top of a proposal.
    MissingFrontMatter,
    /// Front matter is present but is not a YAML mapping.
    InvalidFrontMatter(String),
    /// File name does not carry an `eip-<number>` pattern.
    MissingProposalNumber(String),
    /// Neither content nor file name carries a meeting number.
    MissingMeetingNumber(String),
    /// Record has no participant strings at all.
    NoParticipants(GroupingKey),
    /// Every participant string was blank after extraction.
    NoIdentities(GroupingKey),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFrontMatter => write!(f, "document has no front matter block"),
            Self::InvalidFrontMatter(details) => write!(f, "invalid front matter: {details}"),
            Self::MissingProposalNumber(file) => {
                write!(f, "no proposal number in file name `{file}`")
            }
            Self::MissingMeetingNumber(file) => write!(f, "no meeting number in `{file}`"),
            Self::NoParticipants(key) => write!(f, "{key} lists no participants"),
            Self::NoIdentities(key) => write!(f, "{key} has no parseable identity"),
        }
    }
}

impl Error for ParseError {}

/// Records parsed from a batch of documents plus the count that failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentBatch {
    pub records: Vec<RawRecord>,
    pub skipped: usize,
}

/// Parses `(file_name, content)` pairs with `parse`, skipping failures.
///
/// Each failure is logged with its file name and counted in `skipped`.
pub fn parse_batch<'a, I>(
    documents: I,
    parse: fn(&str, &str) -> ParseResult<RawRecord>,
) -> DocumentBatch
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut batch = DocumentBatch::default();
    for (file_name, content) in documents {
        match parse(file_name, content) {
            Ok(record) => batch.records.push(record),
            Err(err) => {
                batch.skipped += 1;
                warn!(
                    "event=document_skipped module=documents file={} reason={}",
                    file_name, err
                );
            }
        }
    }
    debug!(
        "event=batch_parsed module=documents parsed={} skipped={}",
        batch.records.len(),
        batch.skipped
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::{parse_batch, parse_proposal};

    #[test]
    fn batch_counts_failed_documents() {
        let good = "---\nauthor: Alice (@alice)\nstatus: Final\n---\nBody";
        let batch = parse_batch(
            [
                ("eip-1.md", good),
                ("eip-2.md", "no front matter"),
                ("notes.md", good),
            ],
            parse_proposal,
        );
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.skipped, 2);
    }
}
