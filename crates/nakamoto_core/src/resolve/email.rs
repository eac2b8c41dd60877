//! Organization inference from email domains.

use once_cell::sync::Lazy;
use regex::Regex;

static GENERIC_TLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(?:com|org|io|net|edu|gov)$").expect("valid tld regex"));

/// Derives a readable organization name from an email domain.
///
/// `vitalik@ethereum.org` → `Ethereum`, `a@www.status.im` → `Status Im`.
/// Returns `None` when the address has no domain part.
pub fn organization_from_email(email: &str) -> Option<String> {
    let (_, domain) = email.trim().split_once('@')?;
    let domain = domain.trim().to_lowercase();
    let without_tld = GENERIC_TLD_RE.replace(&domain, "");
    let bare = without_tld
        .strip_prefix("www.")
        .unwrap_or(&without_tld)
        .replace('.', " ");
    let name = title_case(bare.trim());
    (!name.is_empty()).then_some(name)
}

fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = !c.is_alphabetic();
    }
    out
}
