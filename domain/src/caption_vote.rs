//! Caption votes cast by signed-in users.

use crate::error::Error;
use crate::gateway::data_store::{DataStore, Row};
use log::*;
use serde::Deserialize;
use serde_json::{Number, Value};
use service::config::Config;

pub const INVALID_CAPTION_ID: &str = "Caption ID must be a positive integer.";
pub const INVALID_SCORE: &str = "Score must be a number between 1 and 5.";

/// Request body as sent by the browser. Either field may be a string or a number.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotePayload {
    #[serde(default)]
    pub caption_id: Value,
    #[serde(default)]
    pub score: Value,
}

/// A validated vote.
#[derive(Debug, Clone, PartialEq)]
pub struct Vote {
    pub caption_id: u64,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct VoteTable {
    pub table: String,
    pub caption_id_column: String,
    pub score_column: String,
}

impl Default for VoteTable {
    fn default() -> Self {
        Self {
            table: "caption_votes".to_string(),
            caption_id_column: "caption_id".to_string(),
            score_column: "vote".to_string(),
        }
    }
}

impl From<&Config> for VoteTable {
    fn from(config: &Config) -> Self {
        Self {
            table: config.caption_votes_table.clone(),
            caption_id_column: config.caption_votes_caption_id_column.clone(),
            score_column: config.caption_votes_score_column.clone(),
        }
    }
}

impl VotePayload {
    /// Validate the caption id before the score.
    pub fn validate(&self) -> Result<Vote, Error> {
        let caption_id = numeric(&self.caption_id)
            .filter(|n| n.is_finite() && n.fract() == 0.0 && *n >= 1.0 && *n <= u64::MAX as f64)
            .map(|n| n as u64)
            .ok_or_else(|| Error::invalid(INVALID_CAPTION_ID))?;

        let score = numeric(&self.score)
            .filter(|n| n.is_finite() && (1.0..=5.0).contains(n))
            .ok_or_else(|| Error::invalid(INVALID_SCORE))?;

        Ok(Vote { caption_id, score })
    }
}

impl Vote {
    fn score_value(&self) -> Value {
        if self.score.fract() == 0.0 {
            Value::from(self.score as i64)
        } else {
            Number::from_f64(self.score)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }
    }

    fn to_row(&self, table: &VoteTable) -> Row {
        let mut row = Row::new();
        row.insert(
            table.caption_id_column.clone(),
            Value::from(self.caption_id),
        );
        row.insert(table.score_column.clone(), self.score_value());
        row
    }
}

/// Store one vote as the signed-in user and return the stored row, if any came back.
pub async fn insert_vote(
    store: &dyn DataStore,
    table: &VoteTable,
    vote: &Vote,
    access_token: &str,
) -> Result<Option<Row>, Error> {
    debug!("Recording vote on caption {}", vote.caption_id);
    let rows = store
        .insert(&table.table, &[vote.to_row(table)], access_token)
        .await?;
    Ok(rows.into_iter().next())
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};
    use crate::gateway::data_store::Query;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    fn payload(value: Value) -> VotePayload {
        serde_json::from_value(value).unwrap()
    }

    fn invalid_message(payload: VotePayload) -> String {
        match payload.validate().unwrap_err().error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Invalid(message)) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_numbers_and_numeric_strings() {
        assert_eq!(
            payload(json!({"captionId": 12, "score": 5})).validate().unwrap(),
            Vote { caption_id: 12, score: 5.0 }
        );
        assert_eq!(
            payload(json!({"captionId": "12", "score": "2.5"}))
                .validate()
                .unwrap(),
            Vote { caption_id: 12, score: 2.5 }
        );
    }

    #[test]
    fn test_caption_id_must_be_positive_integer() {
        for bad in [json!(0), json!(-3), json!(1.5), json!("abc"), json!(""), json!(null)] {
            assert_eq!(
                invalid_message(payload(json!({"captionId": bad, "score": 3}))),
                INVALID_CAPTION_ID
            );
        }
        assert_eq!(invalid_message(payload(json!({"score": 3}))), INVALID_CAPTION_ID);
    }

    #[test]
    fn test_booleans_and_hex_strings_are_not_numbers() {
        for bad in [json!(true), json!("0x3"), json!([3])] {
            assert_eq!(
                invalid_message(payload(json!({"captionId": bad, "score": 3}))),
                INVALID_CAPTION_ID
            );
        }
        assert_eq!(
            invalid_message(payload(json!({"captionId": 1, "score": "0x3"}))),
            INVALID_SCORE
        );
    }

    #[test]
    fn test_score_bounds() {
        for good in [json!(1), json!(5), json!("3")] {
            assert!(payload(json!({"captionId": 1, "score": good})).validate().is_ok());
        }
        for bad in [json!(0.99), json!(5.01), json!(0), json!("nope"), json!(true)] {
            assert_eq!(
                invalid_message(payload(json!({"captionId": 1, "score": bad}))),
                INVALID_SCORE
            );
        }
    }

    #[test]
    fn test_caption_id_is_checked_before_score() {
        assert_eq!(
            invalid_message(payload(json!({"captionId": -1, "score": 99}))),
            INVALID_CAPTION_ID
        );
    }

    struct RecordingStore {
        inserted: Mutex<Vec<(String, Vec<Row>, String)>>,
        response: Vec<Row>,
    }

    #[async_trait]
    impl DataStore for RecordingStore {
        async fn select(&self, _: &str, _: &Query) -> Result<Vec<Row>, Error> {
            unreachable!("votes never read")
        }

        async fn insert(
            &self,
            table: &str,
            rows: &[Row],
            access_token: &str,
        ) -> Result<Vec<Row>, Error> {
            self.inserted.lock().unwrap().push((
                table.to_string(),
                rows.to_vec(),
                access_token.to_string(),
            ));
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn test_insert_vote_maps_configured_columns() {
        let store = RecordingStore {
            inserted: Mutex::new(Vec::new()),
            response: serde_json::from_value(json!([{"id": 1}, {"id": 2}])).unwrap(),
        };
        let table = VoteTable {
            score_column: "score".to_string(),
            ..VoteTable::default()
        };

        let row = insert_vote(&store, &table, &Vote { caption_id: 7, score: 4.0 }, "tok")
            .await
            .unwrap();

        assert_eq!(row.map(|r| r["id"].clone()), Some(json!(1)));
        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted[0].0, "caption_votes");
        assert_eq!(
            Value::Object(inserted[0].1[0].clone()),
            json!({"caption_id": 7, "score": 4})
        );
        assert_eq!(inserted[0].2, "tok");
    }

    #[tokio::test]
    async fn test_insert_vote_with_empty_representation_is_none() {
        let store = RecordingStore {
            inserted: Mutex::new(Vec::new()),
            response: Vec::new(),
        };

        let row = insert_vote(
            &store,
            &VoteTable::default(),
            &Vote { caption_id: 1, score: 1.5 },
            "tok",
        )
        .await
        .unwrap();

        assert!(row.is_none());
        assert_eq!(
            store.inserted.lock().unwrap()[0].1[0]["vote"],
            json!(1.5)
        );
    }
}
