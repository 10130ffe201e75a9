// Wire-facing record types shared by transactions, queries and the canonical
// hash preimage. Field names serialize in PascalCase to match the JSON the
// consensus side produces; missing fields decode to their zero values.

use serde::{Deserialize, Serialize};

/// A request for data, filed by the requiring party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Description {
    // account that requested the data
    pub requirer: String,
    pub name: String,
    pub domain: String,
    // quality threshold the requirer demands
    pub trust_level: i64,
    pub size: i64,
    pub access_price: i64,
    pub validation_fee: i64,
    pub bounty: i64,
}

/// A validator's verdict opening a version slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Validation {
    pub validator_addr: String,
    pub verdict: bool,
    pub proof: String,
}

/// A provider's payload submission for an open version slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Payload {
    pub provider_addr: String,
    // digest of the off-chain payload
    pub payload_hash: String,
    pub proof: String,
}

/// The requirer's acceptance of a submitted payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AcceptedPayload {
    pub acceptor_addr: String,
    pub verdict: bool,
    pub proof: String,
}

/// A plain token move between two user accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Transfer {
    pub sender: String,
    pub receiver: String,
    pub amount: i64,
}

/// A stake move between a user account and a validator.
/// A negative amount unstakes back to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Stake {
    pub user: String,
    pub validator: String,
    pub amount: i64,
}
