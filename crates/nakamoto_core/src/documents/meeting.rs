//! Core-dev meeting notes parsing.

use crate::documents::{ParseError, ParseResult};
use crate::extract::attendees::extract_attendees;
use crate::model::record::{GroupingKey, RawRecord};
use once_cell::sync::Lazy;
use regex::Regex;

static MEETING_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"All Core Devs (?:Meeting |Call |)#?(\d+)").expect("valid meeting number regex")
});
static FILE_MEETING_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:meeting|call|acd)[\s_-]*#?(\d+)").expect("valid file meeting regex")
});
static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Date: (\d{4}-\d{2}-\d{2})").expect("valid iso date regex"));
static WRITTEN_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}(?:st|nd|rd|th)? \w+ \d{4})").expect("valid written date regex")
});

/// Parses one meeting notes document.
///
/// The meeting number is read from the content first and from `file_name`
/// second. Attendees come from `extract_attendees`; an empty attendee list
/// is not an error here.
///
/// # Errors
/// - `MissingMeetingNumber` when neither source carries a number.
pub fn parse_meeting(file_name: &str, content: &str) -> ParseResult<RawRecord> {
    let number = first_number(&MEETING_NUMBER_RE, content)
        .or_else(|| first_number(&FILE_MEETING_NUMBER_RE, file_name))
        .filter(|number| *number > 0)
        .ok_or_else(|| ParseError::MissingMeetingNumber(file_name.to_string()))?;

    let attendees = extract_attendees(content);
    let mut record = RawRecord::new(GroupingKey::Meeting(number), attendees.names);
    record.date = meeting_date(content);
    Ok(record)
}

fn first_number(regex: &Regex, text: &str) -> Option<u32> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn meeting_date(content: &str) -> Option<String> {
    ISO_DATE_RE
        .captures(content)
        .or_else(|| WRITTEN_DATE_RE.captures(content))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
