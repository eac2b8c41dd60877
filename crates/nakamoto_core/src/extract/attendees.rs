//! Attendee list extraction for meeting notes.
//!
//! # Responsibility
//! - Find the attendee list in markdown meeting notes.
//! - Return raw attendee tokens (`"Name (Org)"`) for identity extraction.
//!
//! # Invariants
//! - A heading-delimited block wins; the inline label is only a fallback.
//! - Section-label words from `ATTENDEE_STOPLIST` never appear in the output.
//! - Link targets are discarded; only display text survives.

use crate::extract::identity::split_participants;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Section labels that bullet/label patterns pick up but are not people.
pub const ATTENDEE_STOPLIST: &[&str] = &["agenda", "summary", "actions", "notes"];

static ATTENDEE_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]{0,3}#{1,6}[ \t]*(?:attendees|participants)\b[^\n]*$")
        .expect("valid attendee heading regex")
});
static NEXT_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]{0,3}#{1,6}\s").expect("valid heading regex"));
static INLINE_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(?:attendees|participants)\**[ \t]*:\**[ \t]*(.*?)(?:\n[ \t]*\n|\n[ \t]*#|\z)")
        .expect("valid inline attendee label regex")
});
static BULLET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[-*+][ \t]+(?:\[[ xX]\][ \t]*)?").expect("valid bullet regex")
});
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]*)\)").expect("valid link regex"));
static MARKER_GLYPH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\p{L}\p{N}@(<]+").expect("valid marker glyph regex"));
/// Word-only prefix ending in a colon: `Attendees:`, `Notes taken by:`.
static LINE_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\**\p{L}[\p{L} ]{0,40}?\**[ \t]*:\**(?:[ \t]+|$)")
        .expect("valid line label regex")
});

/// Which pattern produced an attendee list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendeeSource {
    /// A markdown heading such as `## Attendees` followed by its body.
    HeadingBlock,
    /// An inline `Attendees:` / `Participants:` label.
    InlineLabel,
}

/// Attendees found in one meeting record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendeeList {
    /// `None` when no pattern matched.
    pub source: Option<AttendeeSource>,
    pub names: BTreeSet<String>,
}

impl AttendeeList {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Extracts the attendee set from meeting notes.
///
/// A heading block that yields no names is treated as absent so the inline
/// label fallback still gets a chance.
pub fn extract_attendees(content: &str) -> AttendeeList {
    if let Some(body) = heading_block(content) {
        let names = parse_list_body(body);
        if !names.is_empty() {
            return AttendeeList {
                source: Some(AttendeeSource::HeadingBlock),
                names,
            };
        }
    }

    if let Some(caps) = INLINE_LABEL_RE.captures(content) {
        let body = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let names = parse_list_body(body);
        if !names.is_empty() {
            return AttendeeList {
                source: Some(AttendeeSource::InlineLabel),
                names,
            };
        }
    }

    AttendeeList::default()
}

fn heading_block(content: &str) -> Option<&str> {
    let heading = ATTENDEE_HEADING_RE.find(content)?;
    let rest = &content[heading.end()..];
    let end = NEXT_HEADING_RE
        .find(rest)
        .map(|m| m.start())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

fn parse_list_body(body: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for line in body.lines() {
        let line = BULLET_RE.replace(line, "");
        let line = MARKDOWN_LINK_RE.replace_all(&line, "$1");
        let line = MARKER_GLYPH_RE.replace(&line, "");
        let line = LINE_LABEL_RE.replace(&line, "");
        for token in split_participants(&line, ',') {
            if let Some(name) = clean_attendee(&token) {
                names.insert(name);
            }
        }
    }
    names
}

fn clean_attendee(token: &str) -> Option<String> {
    let cleaned = token
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | ',' | ':' | '.' | ';'))
        .to_string();
    if cleaned.chars().count() <= 1 || is_stoplisted(&cleaned) {
        return None;
    }
    Some(cleaned)
}

/// Returns whether `name` is a section label rather than a person.
pub fn is_stoplisted(name: &str) -> bool {
    let folded = name
        .trim()
        .trim_end_matches(':')
        .trim()
        .to_lowercase();
    ATTENDEE_STOPLIST.contains(&folded.as_str())
}

#[cfg(test)]
mod tests {
    use super::{extract_attendees, is_stoplisted, AttendeeSource};

    #[test]
    fn heading_block_with_bullets_and_glyphs() {
        let notes = "# ACD 100\n\n## Attendees\n- ✅ Tim Beiko (EF)\n* 👤 Danny Ryan\n- [x] Pooja\n\n## Agenda\n- Summary\n";
        let list = extract_attendees(notes);
        assert_eq!(list.source, Some(AttendeeSource::HeadingBlock));
        let names: Vec<_> = list.names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["Danny Ryan", "Pooja", "Tim Beiko (EF)"]);
    }

    #[test]
    fn labels_inside_heading_block_are_stripped() {
        let list = extract_attendees("# Meeting\n\n# Attendees\n\nAttendees: Ann, Bob\n\n");
        assert_eq!(list.source, Some(AttendeeSource::HeadingBlock));
        let names: Vec<_> = list.names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["Ann", "Bob"]);

        let list = extract_attendees("## Attendees\nNotes taken by: Jim\n- Tim (EF)\n");
        let names: Vec<_> = list.names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["Jim", "Tim (EF)"]);

        let list = extract_attendees("## Participants\n**Participants**: Lightclient\n");
        let names: Vec<_> = list.names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["Lightclient"]);
    }

    #[test]
    fn link_bullets_keep_display_text_only() {
        let notes = "### Attendees\n- [Martin Holst Swende (Geth)](https://github.com/holiman)\n- [Lightclient](https://x.io) (Geth)\n";
        let list = extract_attendees(notes);
        assert!(list.names.contains("Martin Holst Swende (Geth)"));
        assert!(list.names.contains("Lightclient (Geth)"));
        assert!(list.names.iter().all(|name| !name.contains("http")));
    }

    #[test]
    fn comma_separated_heading_body() {
        let notes = "## Participants\nAlice, Bob (Nethermind), Alice\n";
        let list = extract_attendees(notes);
        assert_eq!(list.names.len(), 2);
        assert!(list.names.contains("Bob (Nethermind)"));
    }

    #[test]
    fn inline_label_fallback_without_heading() {
        let notes = "Date: 2020-01-03\nAttendees: Hudson Jameson, Notes,\nPeter Szilagyi\n\nAgenda follows";
        let list = extract_attendees(notes);
        assert_eq!(list.source, Some(AttendeeSource::InlineLabel));
        let names: Vec<_> = list.names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["Hudson Jameson", "Peter Szilagyi"]);
    }

    #[test]
    fn no_pattern_yields_empty_list() {
        let list = extract_attendees("just some prose\nwith no list");
        assert!(list.is_empty());
        assert_eq!(list.source, None);
    }

    #[test]
    fn stoplist_is_case_insensitive() {
        assert!(is_stoplisted("Agenda:"));
        assert!(is_stoplisted("  SUMMARY "));
        assert!(!is_stoplisted("Agendas"));
    }
}
