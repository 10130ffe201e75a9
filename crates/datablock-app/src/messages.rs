// Wire messages: the tagged transaction and query records, plus the outer
// decode step (base64, trailing-NUL strip, JSON parse) shared by the
// delivery and query paths.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use datablock_core::{AcceptedPayload, Description, Payload, Stake, StateError, Transfer, Validation};

/// Failures on the transaction path. Query decoding reuses `Malformed`
/// internally but the read path never surfaces it to the caller.
#[derive(Error, Debug)]
pub enum TxError {
    #[error("MalformedTx: {0}")]
    Malformed(String),
    #[error(transparent)]
    State(#[from] StateError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    TxAddData,
    TxAddValidation,
    TxAddPayload,
    TxAcceptPayload,
    TxTransfer,
    TxStake,
}

/// The flat wire form: a discriminator plus one nullable field per tag.
/// Only the field matching `TxType` is consulted; the rest are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Transaction {
    pub tx_type: Option<TransactionType>,
    pub description: Option<Description>,
    pub validation: Option<Validation>,
    pub payload: Option<Payload>,
    pub accepted_payload: Option<AcceptedPayload>,
    pub transfer: Option<Transfer>,
    pub stake: Option<Stake>,
    pub data_index: i64,
    pub version_index: i64,
}

/// The in-core form: one payload per tag, so a wrong-field-for-this-tag
/// mistake cannot be represented.
#[derive(Debug, Clone)]
pub enum TaggedTx {
    AddData(Description),
    AddValidation {
        validation: Validation,
        data_index: i64,
    },
    AddPayload {
        payload: Payload,
        data_index: i64,
        version_index: i64,
    },
    AcceptPayload {
        accepted: AcceptedPayload,
        data_index: i64,
        version_index: i64,
    },
    Transfer(Transfer),
    Stake(Stake),
}

impl TaggedTx {
    /// The account that pays the flat fee for this transaction.
    pub fn payer(&self) -> &str {
        match self {
            TaggedTx::AddData(description) => &description.requirer,
            TaggedTx::AddValidation { validation, .. } => &validation.validator_addr,
            TaggedTx::AddPayload { payload, .. } => &payload.provider_addr,
            TaggedTx::AcceptPayload { accepted, .. } => &accepted.acceptor_addr,
            TaggedTx::Transfer(transfer) => &transfer.sender,
            TaggedTx::Stake(stake) => &stake.user,
        }
    }
}

impl Transaction {
    /// Second step of the two-step parse: pick out only the payload the
    /// tag selects. A missing tag or missing selected payload is malformed.
    pub fn into_tagged(self) -> Result<TaggedTx, TxError> {
        let tag = self
            .tx_type
            .ok_or_else(|| TxError::Malformed("missing or unknown TxType".to_string()))?;
        let missing = |field: &str| TxError::Malformed(format!("missing {} for {:?}", field, tag));
        match tag {
            TransactionType::TxAddData => self
                .description
                .map(TaggedTx::AddData)
                .ok_or_else(|| missing("Description")),
            TransactionType::TxAddValidation => self
                .validation
                .map(|validation| TaggedTx::AddValidation {
                    validation,
                    data_index: self.data_index,
                })
                .ok_or_else(|| missing("Validation")),
            TransactionType::TxAddPayload => self
                .payload
                .map(|payload| TaggedTx::AddPayload {
                    payload,
                    data_index: self.data_index,
                    version_index: self.version_index,
                })
                .ok_or_else(|| missing("Payload")),
            TransactionType::TxAcceptPayload => self
                .accepted_payload
                .map(|accepted| TaggedTx::AcceptPayload {
                    accepted,
                    data_index: self.data_index,
                    version_index: self.version_index,
                })
                .ok_or_else(|| missing("AcceptedPayload")),
            TransactionType::TxTransfer => self
                .transfer
                .map(TaggedTx::Transfer)
                .ok_or_else(|| missing("Transfer")),
            TransactionType::TxStake => self
                .stake
                .map(TaggedTx::Stake)
                .ok_or_else(|| missing("Stake")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryType {
    QueryState,
    QueryData,
    QueryVersion,
    QueryDescription,
    QueryValidation,
    QueryPayload,
    QueryAcceptedPayload,
    QueryBalance,
    QueryStake,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Query {
    pub qr_type: QueryType,
    #[serde(default)]
    pub data_index: i64,
    #[serde(default)]
    pub version_index: i64,
}

/// The genesis document handed to InitChain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Genesis {
    pub users: BTreeMap<String, i64>,
    pub validators: BTreeMap<String, i64>,
}

/// Base64-decode an outer wire payload and strip the trailing NUL padding
/// the framing leaves behind.
pub fn decode_payload(raw: &[u8]) -> Result<Vec<u8>, TxError> {
    let mut decoded = BASE64
        .decode(raw)
        .map_err(|e| TxError::Malformed(format!("base64: {}", e)))?;
    while decoded.last() == Some(&0) {
        decoded.pop();
    }
    Ok(decoded)
}

/// Full decode: base64, NUL strip, then JSON parse.
pub fn decode_json<T: DeserializeOwned>(raw: &[u8]) -> Result<T, TxError> {
    let decoded = decode_payload(raw)?;
    serde_json::from_slice(&decoded).map_err(|e| TxError::Malformed(format!("json: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &serde_json::Value) -> Vec<u8> {
        BASE64.encode(value.to_string().as_bytes()).into_bytes()
    }

    #[test]
    fn test_decode_strips_trailing_nuls() {
        let mut padded = br#"{"QrType":"QueryState"}"#.to_vec();
        padded.extend_from_slice(&[0, 0, 0]);
        let raw = BASE64.encode(&padded).into_bytes();

        let query: Query = decode_json(&raw).unwrap();
        assert!(matches!(query.qr_type, QueryType::QueryState));
        assert_eq!(query.data_index, 0);
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let err = decode_payload(b"!!!not-base64!!!").unwrap_err();
        assert!(err.to_string().starts_with("MalformedTx"));
    }

    #[test]
    fn test_transaction_two_step_parse() {
        let raw = encode(&serde_json::json!({
            "TxType": "TxAddValidation",
            "Validation": {"ValidatorAddr": "bob", "Verdict": true},
            // wrong-tag fields are ignored
            "Payload": {"ProviderAddr": "carol"},
            "DataIndex": 2
        }));
        let wire: Transaction = decode_json(&raw).unwrap();
        let tagged = wire.into_tagged().unwrap();
        match tagged {
            TaggedTx::AddValidation {
                validation,
                data_index,
            } => {
                assert_eq!(validation.validator_addr, "bob");
                assert_eq!(data_index, 2);
            }
            other => panic!("wrong tag: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tx_type_is_malformed() {
        let raw = encode(&serde_json::json!({"TxType": "TxMintCoins"}));
        let err = decode_json::<Transaction>(&raw).unwrap_err();
        assert!(err.to_string().starts_with("MalformedTx"));
    }

    #[test]
    fn test_missing_selected_payload_is_malformed() {
        let raw = encode(&serde_json::json!({"TxType": "TxTransfer"}));
        let wire: Transaction = decode_json(&raw).unwrap();
        let err = wire.into_tagged().unwrap_err();
        assert!(err.to_string().contains("Transfer"));
    }

    #[test]
    fn test_payer_resolution_per_tag() {
        let cases = [
            (
                serde_json::json!({"TxType": "TxAddData", "Description": {"Requirer": "alice"}}),
                "alice",
            ),
            (
                serde_json::json!({"TxType": "TxAcceptPayload", "AcceptedPayload": {"AcceptorAddr": "dave"}}),
                "dave",
            ),
            (
                serde_json::json!({"TxType": "TxStake", "Stake": {"User": "erin", "Validator": "F0F0", "Amount": 3}}),
                "erin",
            ),
        ];
        for (json, payer) in cases {
            let wire: Transaction = decode_json(&encode(&json)).unwrap();
            assert_eq!(wire.into_tagged().unwrap().payer(), payer);
        }
    }
}
