
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::abci::*;
use crate::{Application, DataChain};

/// Mint a real Ed25519 validator key and return it the way the ledger
/// stores it: uppercase hex of the public key bytes.
pub fn validator_key() -> String {
    let signing_key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
    hex::encode_upper(signing_key.verifying_key().to_bytes())
}

pub fn encode(value: &serde_json::Value) -> Vec<u8> {
    BASE64.encode(value.to_string().as_bytes()).into_bytes()
}

pub fn app_with_genesis(users: &[(&str, i64)], validator: &str, stake: i64) -> DataChain {
    let users: serde_json::Map<String, serde_json::Value> = users
        .iter()
        .map(|(name, tokens)| (name.to_string(), serde_json::json!(tokens)))
        .collect();
    let genesis = serde_json::json!({
        "Users": users,
        "Validators": { validator: stake }
    });

    let mut app = DataChain::new();
    app.init_chain(RequestInitChain {
        chain_id: "datablock-test".to_string(),
        app_state_bytes: genesis.to_string().into_bytes(),
    });
    app
}

pub fn begin_block(app: &mut DataChain, validator: &str) {
    app.begin_block(RequestBeginBlock {
        header: Header {
            height: app.height() + 1,
            proposer_address: hex::decode(validator).unwrap(),
        },
    });
}

pub fn deliver(app: &mut DataChain, tx: serde_json::Value) -> ResponseDeliverTx {
    app.deliver_tx(RequestDeliverTx { tx: encode(&tx) })
}

pub fn end_block(app: &mut DataChain) -> ResponseEndBlock {
    app.end_block(RequestEndBlock {
        height: app.height() + 1,
    })
}

/// EndBlock then Commit, returning the app-hash.
pub fn commit(app: &mut DataChain) -> Vec<u8> {
    end_block(app);
    app.commit().data
}

pub fn query(app: &DataChain, height: i64, query: serde_json::Value) -> ResponseQuery {
    app.query(RequestQuery {
        data: encode(&query),
        height,
    })
}
