use nakamoto_core::{extract_attendees, extract_identity, split_participants};

#[test]
fn email_and_inline_organization_are_separated_from_name() {
    let identity =
        extract_identity("Vitalik Buterin <vitalik@ethereum.org> (Ethereum Foundation)");

    assert_eq!(identity.name, "Vitalik Buterin");
    assert_eq!(identity.email.as_deref(), Some("vitalik@ethereum.org"));
    assert_eq!(
        identity.inline_organization.as_deref(),
        Some("Ethereum Foundation")
    );
    assert_eq!(identity.handle, None);
}

#[test]
fn bare_handle_is_extracted_without_email() {
    let identity = extract_identity("Fabian Vogelsteller @frozeman");

    assert_eq!(identity.name, "Fabian Vogelsteller");
    assert_eq!(identity.handle.as_deref(), Some("frozeman"));
    assert_eq!(identity.email, None);
    assert_eq!(identity.inline_organization, None);
}

#[test]
fn unstructured_and_broken_input_never_fails() {
    let plain = extract_identity("  Hudson Jameson  ");
    assert_eq!(plain.name, "Hudson Jameson");
    assert!(plain.email.is_none() && plain.handle.is_none());

    let broken = extract_identity("Alex (Unclosed <alex");
    assert!(broken.name.contains("(Unclosed"));
    assert!(broken.inline_organization.is_none());

    let empty_parens = extract_identity("Dana ()");
    assert_eq!(empty_parens.name, "Dana");
    assert!(empty_parens.inline_organization.is_none());
}

#[test]
fn author_line_splits_on_top_level_commas_only() {
    let authors = split_participants(
        "Fabian Vogelsteller @frozeman, Vitalik Buterin <vitalik@ethereum.org> (Ethereum Foundation, Research)",
        ',',
    );
    assert_eq!(authors.len(), 2);
    assert!(authors[1].ends_with("(Ethereum Foundation, Research)"));
}

#[test]
fn meeting_heading_block_yields_attendees() {
    let notes = "\
# All Core Devs Meeting 12

## Attendees
* Hudson Jameson (EF)
- [Péter Szilágyi](https://github.com/karalabe) (Geth)
- Agenda

## Agenda
- Not an attendee
";
    let attendees = extract_attendees(notes);
    let names: Vec<&str> = attendees.names.iter().map(String::as_str).collect();

    assert_eq!(names, vec!["Hudson Jameson (EF)", "Péter Szilágyi (Geth)"]);
}

#[test]
fn inline_label_is_used_without_heading() {
    let notes = "Call notes\n\n**Attendees**: Alice, Bob,\nCarol\n\nSummary follows";
    let attendees = extract_attendees(notes);
    let names: Vec<&str> = attendees.names.iter().map(String::as_str).collect();

    assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
}
