// The height controller: owns the triple-buffered state and implements the
// consensus-facing Application surface.
//
// Buffer discipline per block: DeliverTx mutates `new_state` only, Commit
// rotates new -> committed -> confirmed, and Query reads confirmed entries
// only. Confirmed states are immutable once appended.

use tracing::{debug, info, warn};

use crate::abci::*;
use crate::messages::{self, Genesis, Query, QueryType};
use crate::processor;
use datablock_core::{Balance, State};
use datablock_crypto::StateDigest;

/// The replicated dataset-catalog application.
pub struct DataChain {
    pub(crate) height: i64,
    // confirmed history: entry i is the state committed at height i + 1
    pub(crate) confirmed: Vec<State>,
    // most recent commit; None until the first commit
    pub(crate) committed: Option<State>,
    // working state mutated by DeliverTx
    pub(crate) new_state: State,
    // block proposer recorded at BeginBlock, hex form
    pub(crate) proposer: String,
}

impl DataChain {
    pub fn new() -> Self {
        Self {
            height: 0,
            confirmed: Vec::new(),
            committed: None,
            new_state: State::new(),
            proposer: String::new(),
        }
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    /// Digest of the last committed state; the zero sentinel before the
    /// first commit.
    pub fn app_hash(&self) -> StateDigest {
        self.committed
            .as_ref()
            .map(State::hash)
            .unwrap_or_default()
    }

    /// Resolve a query height to a confirmed state.
    ///
    /// Height 0 means "latest confirmed". Height 1 never resolves: the
    /// history only starts filling at the second commit, once a later
    /// block has attested to the earlier app-hash. From height 2 on, the
    /// state committed at height h lives at `confirmed[h - 2]`.
    fn state_at_height(&self, height: i64) -> Option<&State> {
        if self.confirmed.is_empty() {
            return None;
        }
        match height {
            0 => self.confirmed.last(),
            1 => None,
            _ => usize::try_from(height - 2)
                .ok()
                .and_then(|i| self.confirmed.get(i)),
        }
    }

    fn resolve_query(&self, query: Query, height: i64) -> Option<Vec<u8>> {
        let state = self.state_at_height(height)?;
        let data = || state.data_list.get(query.data_index);
        let version = || data().and_then(|d| d.version(query.version_index));
        match query.qr_type {
            QueryType::QueryState => serde_json::to_vec(state).ok(),
            QueryType::QueryData => data().and_then(|d| serde_json::to_vec(d).ok()),
            QueryType::QueryVersion => version().and_then(|v| serde_json::to_vec(v).ok()),
            QueryType::QueryDescription => {
                data().and_then(|d| serde_json::to_vec(&d.description).ok())
            }
            QueryType::QueryValidation => {
                version().and_then(|v| serde_json::to_vec(&v.validation).ok())
            }
            QueryType::QueryPayload => version().and_then(|v| serde_json::to_vec(&v.payload).ok()),
            QueryType::QueryAcceptedPayload => {
                version().and_then(|v| serde_json::to_vec(&v.accepted_payload).ok())
            }
            QueryType::QueryBalance => serde_json::to_vec(&state.balance.users).ok(),
            QueryType::QueryStake => serde_json::to_vec(&state.balance.validators).ok(),
        }
    }
}

impl Default for DataChain {
    fn default() -> Self {
        Self::new()
    }
}

impl Application for DataChain {
    fn info(&self, _request: RequestInfo) -> ResponseInfo {
        ResponseInfo {
            data: "datablock versioned dataset catalog".to_string(),
            version: "V1".to_string(),
            app_version: 1,
            last_block_height: self.height,
            last_block_app_hash: self.app_hash().to_vec(),
        }
    }

    fn init_chain(&mut self, request: RequestInitChain) -> ResponseInitChain {
        if !request.app_state_bytes.is_empty() {
            match serde_json::from_slice::<Genesis>(&request.app_state_bytes) {
                Ok(genesis) => {
                    info!(
                        chain_id = %request.chain_id,
                        users = genesis.users.len(),
                        validators = genesis.validators.len(),
                        "genesis loaded"
                    );
                    self.new_state =
                        State::with_balance(Balance::with_genesis(genesis.users, genesis.validators));
                }
                Err(e) => warn!(error = %e, "unparseable genesis state, starting empty"),
            }
        }
        ResponseInitChain::default()
    }

    fn query(&self, request: RequestQuery) -> ResponseQuery {
        // the read path is permissive: anything that does not resolve is an
        // empty value, never an error code
        let value = messages::decode_json::<Query>(&request.data)
            .ok()
            .and_then(|query| self.resolve_query(query, request.height))
            .unwrap_or_default();
        ResponseQuery {
            code: 0,
            index: -1,
            key: request.data,
            value,
            ..Default::default()
        }
    }

    fn check_tx(&self, _request: RequestCheckTx) -> ResponseCheckTx {
        // stateless accept; ordering and validity are settled at delivery
        ResponseCheckTx {
            code: 0,
            ..Default::default()
        }
    }

    fn begin_block(&mut self, request: RequestBeginBlock) -> ResponseBeginBlock {
        self.proposer = hex::encode_upper(&request.header.proposer_address);
        debug!(height = request.header.height, proposer = %self.proposer, "block started");
        ResponseBeginBlock::default()
    }

    fn deliver_tx(&mut self, request: RequestDeliverTx) -> ResponseDeliverTx {
        let result = messages::decode_payload(&request.tx)
            .and_then(|tx| processor::apply_transaction(&mut self.new_state, &self.proposer, &tx));
        match result {
            Ok(()) => ResponseDeliverTx {
                code: 0,
                ..Default::default()
            },
            Err(e) => {
                warn!(error = %e, "transaction rejected");
                ResponseDeliverTx {
                    code: 1,
                    log: e.to_string(),
                    info: e.to_string(),
                }
            }
        }
    }

    fn end_block(&mut self, _request: RequestEndBlock) -> ResponseEndBlock {
        let balance = &self.new_state.balance;
        let mut validator_updates = Vec::new();
        for key in balance.val_changes() {
            match hex::decode(key) {
                Ok(pub_key) => validator_updates.push(ValidatorUpdate {
                    pub_key,
                    power: balance.stake_of(key),
                }),
                // a non-hex key can never round-trip to a consensus pubkey
                Err(e) => warn!(validator = %key, error = %e, "skipping validator update"),
            }
        }
        if !validator_updates.is_empty() {
            info!(count = validator_updates.len(), "validator updates emitted");
        }
        ResponseEndBlock { validator_updates }
    }

    fn commit(&mut self) -> ResponseCommit {
        // the first commit has no committed state to confirm yet
        if let Some(previous) = self.committed.take() {
            self.confirmed.push(previous);
        }
        let committed = std::mem::take(&mut self.new_state);
        self.new_state = committed.fork();
        self.committed = Some(committed);
        self.height += 1;

        let app_hash = self.app_hash();
        info!(height = self.height, app_hash = %app_hash, "committed");
        ResponseCommit {
            data: app_hash.to_vec(),
            retain_height: 0,
        }
    }
}
