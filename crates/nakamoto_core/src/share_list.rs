//! Plain share lists supplied from outside the pipeline.
//!
//! Client-diversity and staking data arrive as ready-made shares, either
//! `[{"entity": "Geth", "share": 0.6}, ...]` (also accepting the
//! `Client`/`Pool`/`Share` column names) or `{"Geth": 0.6, ...}`.

use crate::model::share::ShareRow;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Deserialize)]
#[serde(untagged)]
enum ShareListJson {
    Rows(Vec<ShareRowJson>),
    Table(BTreeMap<String, f64>),
}

#[derive(Deserialize)]
struct ShareRowJson {
    #[serde(alias = "Client", alias = "Pool", alias = "Entity", alias = "name")]
    entity: String,
    #[serde(alias = "Share")]
    share: f64,
}

/// Share list parse errors.
#[derive(Debug)]
pub enum ShareParseError {
    Json(serde_json::Error),
    EmptyEntity,
}

impl Display for ShareParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "unsupported share list json: {err}"),
            Self::EmptyEntity => write!(f, "share list contains an empty entity name"),
        }
    }
}

impl Error for ShareParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::EmptyEntity => None,
        }
    }
}

/// Parses a share list. Shares are returned as given, not normalized.
pub fn shares_from_json(json: &str) -> Result<Vec<ShareRow>, ShareParseError> {
    let parsed: ShareListJson = serde_json::from_str(json).map_err(ShareParseError::Json)?;
    let rows: Vec<ShareRow> = match parsed {
        ShareListJson::Rows(rows) => rows
            .into_iter()
            .map(|row| ShareRow::new(row.entity.trim(), row.share))
            .collect(),
        ShareListJson::Table(table) => table
            .into_iter()
            .map(|(entity, share)| ShareRow::new(entity.trim(), share))
            .collect(),
    };
    if rows.iter().any(|row| row.entity.is_empty()) {
        return Err(ShareParseError::EmptyEntity);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::{shares_from_json, ShareParseError};

    #[test]
    fn parses_row_list_with_column_aliases() {
        let json = r#"[{"Client": "Geth", "Share": 0.6}, {"entity": "Besu", "share": 0.1}]"#;
        let rows = shares_from_json(json).expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].entity, "Geth");
        assert_eq!(rows[1].share, 0.1);
    }

    #[test]
    fn parses_name_to_share_table() {
        let rows = shares_from_json(r#"{"Lido": 0.3, "Coinbase": 0.12}"#).expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].entity, "Coinbase");
    }

    #[test]
    fn rejects_blank_entities_and_other_shapes() {
        assert!(matches!(
            shares_from_json(r#"{" ": 0.3}"#),
            Err(ShareParseError::EmptyEntity)
        ));
        assert!(matches!(shares_from_json("42"), Err(ShareParseError::Json(_))));
    }
}
