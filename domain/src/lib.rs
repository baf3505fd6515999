//! Caption voting domain: the caption feed, votes, the home page table, and
//! the gateways to the hosted data store and the captioning pipeline.
//!
//! Web handlers depend on the `DataStore` trait rather than the REST client so
//! that tests can substitute an in-memory store.

use serde_json::Value;

pub mod caption;
pub mod caption_vote;
pub mod error;
pub mod table_rows;

pub mod gateway;

pub use gateway::data_store::{DataStore, RestDataStore, Row};

/// Text form of a JSON scalar: strings unquoted, everything else as compact JSON.
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
