use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::crypto::hash_json;

/// A transaction submitted to the ledger.
///
/// The core imposes no schema beyond the identity of the submitting
/// user: every other field is carried as-is in `payload` and flattened
/// into the transaction's JSON representation. Two transactions are
/// considered identical when their content digests match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// Identifier of the user this transaction belongs to
    pub user_id: String,

    /// Arbitrary transaction payload, flattened into the JSON form
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub payload: Map<String, Value>,
}

impl Transaction {
    /// Creates a new transaction for a user with the given payload
    pub fn new(user_id: impl Into<String>, payload: Map<String, Value>) -> Self {
        Transaction {
            user_id: user_id.into(),
            payload,
        }
    }

    /// Computes the content digest of this transaction.
    ///
    /// The digest covers the full serialized form (user id and
    /// payload); any change to either changes the digest.
    pub fn digest(&self) -> String {
        hash_json(self)
    }
}
