//! Raw organization string canonicalization.
//!
//! Used while building or merging the mapping table, not per record. Each
//! rule is an independent predicate that emits labels into a shared set, so
//! several rules can fire for one input (`"EF Solidity"` yields the parent
//! foundation, `Solidity` and the audit firm).

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Parent foundation label for `EF`-prefixed sub-teams.
pub const PARENT_FOUNDATION: &str = "Ethereum";
/// Consortium owning MetaMask and PegaSys.
pub const CONSORTIUM: &str = "Consensys";
/// Foundation stewarding the Solidity language.
pub const LANGUAGE_FOUNDATION: &str = PARENT_FOUNDATION;
/// Auditing firm credited alongside Solidity work.
pub const AUDIT_FIRM: &str = "Cantina";
/// Execution client team label.
pub const CLIENT_TEAM: &str = "Geth";

static EF_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^EF(?:[/:]\s*|\s+)").expect("valid EF prefix regex"));
static GETH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:geth|EF(?:[/:]\s*|\s+)geth)$").expect("valid geth regex")
});

struct CanonicalRule {
    name: &'static str,
    emit: fn(&str, &mut BTreeSet<String>),
}

static RULES: [CanonicalRule; 4] = [
    CanonicalRule {
        name: "self_label",
        emit: emit_self_label,
    },
    CanonicalRule {
        name: "consortium",
        emit: emit_consortium,
    },
    CanonicalRule {
        name: "solidity",
        emit: emit_solidity,
    },
    CanonicalRule {
        name: "client_team",
        emit: emit_client_team,
    },
];

/// Canonicalizes one raw organization token.
///
/// Bare `Research` never becomes a label, with or without an `EF` prefix.
pub fn canonicalize(raw: &str) -> BTreeSet<String> {
    let org = raw.trim();
    let mut labels = BTreeSet::new();
    if org.is_empty() {
        return labels;
    }
    for rule in &RULES {
        let before = labels.len();
        (rule.emit)(org, &mut labels);
        if labels.len() > before {
            trace!(
                "event=canonical_rule_fired module=resolve rule={} added={}",
                rule.name,
                labels.len() - before
            );
        }
    }
    labels
}

/// Splits `raw` on `;` and unions the canonical labels of every token.
pub fn canonicalize_list(raw: &str) -> BTreeSet<String> {
    raw.split(';').flat_map(canonicalize).collect()
}

fn emit_self_label(org: &str, labels: &mut BTreeSet<String>) {
    if let Some(prefix) = EF_PREFIX_RE.find(org) {
        labels.insert(PARENT_FOUNDATION.to_string());
        let team = org[prefix.end()..].trim();
        if !is_bare_research_or_empty(team) {
            labels.insert(team.to_string());
        }
    } else if org.eq_ignore_ascii_case("ef") {
        labels.insert(PARENT_FOUNDATION.to_string());
    } else if !is_bare_research_or_empty(org) {
        labels.insert(org.to_string());
    }
}

fn emit_consortium(org: &str, labels: &mut BTreeSet<String>) {
    let folded = org.to_lowercase();
    let pegasys = folded.contains("pegasys");
    if !(pegasys || folded.contains("metamask")) {
        return;
    }
    labels.insert(CONSORTIUM.to_string());
    if pegasys {
        labels.insert("PegaSys".to_string());
    }
    if folded.contains("pantheon") {
        labels.insert("Pantheon".to_string());
    }
}

fn emit_solidity(org: &str, labels: &mut BTreeSet<String>) {
    if org.to_lowercase().contains("solidity") {
        labels.insert(LANGUAGE_FOUNDATION.to_string());
        labels.insert(AUDIT_FIRM.to_string());
    }
}

fn emit_client_team(org: &str, labels: &mut BTreeSet<String>) {
    if GETH_RE.is_match(org) {
        labels.insert(CLIENT_TEAM.to_string());
        labels.insert(PARENT_FOUNDATION.to_string());
    }
}

fn is_bare_research_or_empty(value: &str) -> bool {
    let folded = value.trim().to_lowercase();
    folded.is_empty() || folded == "research"
}
