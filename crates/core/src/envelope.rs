//! The uniform success/failure wire format for query execution.
//!
//! Every statement routed through the gateway produces exactly one
//! [`QueryEnvelope`], whether it succeeded or failed. The serialized
//! envelope is also what gets appended to the audit log, so the shape must
//! stay stable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One result row: column name to JSON value, in column order.
pub type RowMap = IndexMap<String, serde_json::Value>;

/// HTTP-style status carried inside the envelope: 200 or 400.
pub const STATUS_OK: u16 = 200;
/// Status for any failure, regardless of kind. The taxonomy is flattened at
/// the wire level; `error_message` carries the distinction.
pub const STATUS_ERROR: u16 = 400;

/// Uniform response for one executed (or rejected) statement.
///
/// `results` is populated for read statements, `last_inserted_id` for
/// INSERTs; `error_message` is set iff `status` is 400. The `query` field
/// echoes the client's statement text verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryEnvelope {
    pub status: u16,
    pub query: String,
    pub results: Option<Vec<RowMap>>,
    pub last_inserted_id: Option<i64>,
    pub error_message: Option<String>,
}

impl QueryEnvelope {
    /// Successful execution.
    pub fn good(
        query: impl Into<String>,
        results: Option<Vec<RowMap>>,
        last_inserted_id: Option<i64>,
    ) -> Self {
        Self {
            status: STATUS_OK,
            query: query.into(),
            results,
            last_inserted_id,
            error_message: None,
        }
    }

    /// Failed execution or rejected request.
    pub fn bad(query: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR,
            query: query.into(),
            results: None,
            last_inserted_id: None,
            error_message: Some(error_message.into()),
        }
    }

    /// Whether the envelope reports success.
    pub fn ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_good_envelope_shape() {
        let mut row = RowMap::new();
        row.insert("x".to_string(), serde_json::json!(1));
        let envelope = QueryEnvelope::good("SELECT * FROM t", Some(vec![row]), None);

        assert!(envelope.ok());
        assert_eq!(envelope.status, 200);
        assert_eq!(envelope.query, "SELECT * FROM t");
        assert!(envelope.error_message.is_none());

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&envelope).unwrap()).unwrap();
        assert_eq!(json["status"], 200);
        assert_eq!(json["results"][0]["x"], 1);
        assert_eq!(json["last_inserted_id"], serde_json::Value::Null);
    }

    #[test]
    fn test_bad_envelope_carries_message() {
        let envelope = QueryEnvelope::bad("SELEKT bad", "near \"SELEKT\": syntax error");

        assert!(!envelope.ok());
        assert_eq!(envelope.status, 400);
        assert_eq!(envelope.query, "SELEKT bad");
        assert_eq!(
            envelope.error_message.as_deref(),
            Some("near \"SELEKT\": syntax error")
        );
        assert!(envelope.results.is_none());
        assert!(envelope.last_inserted_id.is_none());
    }

    #[test]
    fn test_envelope_round_trips() {
        let envelope = QueryEnvelope::good("INSERT INTO t VALUES (1)", None, Some(1));
        let json = serde_json::to_string(&envelope).unwrap();
        let back: QueryEnvelope = serde_json::from_str(&json).unwrap();

        assert_eq!(back.status, 200);
        assert_eq!(back.last_inserted_id, Some(1));
        assert_eq!(back.query, envelope.query);
    }
}
