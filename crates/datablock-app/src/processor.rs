// Transaction processor: resolves the payer, charges the flat fee to the
// block proposer, then dispatches the body to the registry or the ledger.

use tracing::debug;

use crate::messages::{TaggedTx, Transaction, TxError};
use datablock_core::State;
use datablock_crypto::sha256;

/// Apply one decoded transaction to the working state.
///
/// The fee is charged before the body runs: a fee failure leaves the
/// registry untouched, while a body failure keeps the fee debit. Both
/// orderings are consensus-visible, so they must match on every replica.
pub fn apply_transaction(state: &mut State, proposer: &str, tx_bytes: &[u8]) -> Result<(), TxError> {
    let wire: Transaction = serde_json::from_slice(tx_bytes)
        .map_err(|e| TxError::Malformed(format!("json: {}", e)))?;
    let tx = wire.into_tagged()?;

    let tx_hash = sha256(tx_bytes);
    state.balance.add_fee(tx.payer(), proposer, tx_hash)?;

    match tx {
        TaggedTx::AddData(description) => {
            let index = state.data_list.add_data(description);
            debug!(data_index = index, "data added");
        }
        TaggedTx::AddValidation {
            validation,
            data_index,
        } => {
            let slot = state.data_list.add_validation(validation, data_index)?;
            debug!(data_index, version_index = slot, "validation added");
        }
        TaggedTx::AddPayload {
            payload,
            data_index,
            version_index,
        } => {
            state
                .data_list
                .add_payload(payload, data_index, version_index)?;
            debug!(data_index, version_index, "payload added");
        }
        TaggedTx::AcceptPayload {
            accepted,
            data_index,
            version_index,
        } => {
            state
                .data_list
                .accept_payload(accepted, data_index, version_index)?;
            debug!(data_index, version_index, "payload accepted");
        }
        TaggedTx::Transfer(transfer) => {
            state
                .balance
                .add_transfer(&transfer.sender, &transfer.receiver, transfer.amount)?;
        }
        TaggedTx::Stake(stake) => {
            state
                .balance
                .add_stake(&stake.user, &stake.validator, stake.amount)?;
        }
    }
    Ok(())
}
