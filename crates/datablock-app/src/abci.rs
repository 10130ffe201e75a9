// ABCI-shaped interface between the consensus engine and the application.
// Only the fields this application consumes or produces are modeled; the
// outer wire framing lives on the consensus side.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInfo {
    pub data: String,
    pub version: String,
    pub app_version: u64,
    pub last_block_height: i64,
    pub last_block_app_hash: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInitChain {
    pub chain_id: String,
    // genesis document: user balances and validator stakes, JSON-encoded
    pub app_state_bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInitChain {}

/// The block-header fields the application reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub height: i64,
    pub proposer_address: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBeginBlock {
    pub header: Header,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBeginBlock {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCheckTx {
    pub tx: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseCheckTx {
    pub code: u32,
    pub log: String,
    pub info: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDeliverTx {
    pub tx: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDeliverTx {
    pub code: u32,
    pub log: String,
    pub info: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEndBlock {
    pub height: i64,
}

/// Absolute-stake update for one validator; power 0 removes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorUpdate {
    // Ed25519 public key bytes
    pub pub_key: Vec<u8>,
    pub power: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEndBlock {
    pub validator_updates: Vec<ValidatorUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseCommit {
    pub data: Vec<u8>,
    pub retain_height: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestQuery {
    pub data: Vec<u8>,
    pub height: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseQuery {
    pub code: u32,
    pub log: String,
    pub info: String,
    pub index: i64,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub height: i64,
}

/// The method set the consensus engine drives, in the order it drives them:
/// InitChain once, then per block BeginBlock, N DeliverTx, EndBlock, Commit,
/// with Info/Query/CheckTx interleaved on the read side. Calls are serial;
/// the application never sees two of them concurrently.
pub trait Application {
    fn info(&self, request: RequestInfo) -> ResponseInfo;
    fn init_chain(&mut self, request: RequestInitChain) -> ResponseInitChain;
    fn query(&self, request: RequestQuery) -> ResponseQuery;
    fn check_tx(&self, request: RequestCheckTx) -> ResponseCheckTx;
    fn begin_block(&mut self, request: RequestBeginBlock) -> ResponseBeginBlock;
    fn deliver_tx(&mut self, request: RequestDeliverTx) -> ResponseDeliverTx;
    fn end_block(&mut self, request: RequestEndBlock) -> ResponseEndBlock;
    fn commit(&mut self) -> ResponseCommit;
}
