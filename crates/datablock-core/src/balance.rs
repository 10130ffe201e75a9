// Balance ledger: user token balances, validator stakes, and the per-block
// journal of validators whose stake moved. Sorted maps keep the canonical
// serialization deterministic without a sort at hash time.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StateError;
use crate::Result;
use datablock_crypto::{sha256, Hash256};

/// Flat per-transaction fee, debited from the payer and credited to the
/// block proposer's stake. Consensus-visible: changing it forks the chain.
pub const FLAT_FEE: i64 = 1;

/// Token balances and validator stakes.
///
/// `val_changes` is ephemeral per-block bookkeeping: it never serializes,
/// never hashes, and resets when the ledger is forked at commit.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Balance {
    pub users: BTreeMap<String, i64>,
    pub validators: BTreeMap<String, i64>,
    #[serde(skip)]
    val_changes: BTreeSet<String>,
}

impl Balance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a ledger from the genesis document's two mappings.
    pub fn with_genesis(users: BTreeMap<String, i64>, validators: BTreeMap<String, i64>) -> Self {
        Self {
            users,
            validators,
            val_changes: BTreeSet::new(),
        }
    }

    /// Debit the flat fee from `user` and credit it to `validator`'s stake.
    /// The registry must stay untouched when this fails.
    pub fn add_fee(&mut self, user: &str, validator: &str, tx_hash: Hash256) -> Result<()> {
        let funds = self
            .users
            .get_mut(user)
            .ok_or_else(|| StateError::UnknownUser {
                account: user.to_string(),
            })?;
        if *funds < FLAT_FEE {
            return Err(StateError::InsufficientFunds {
                account: user.to_string(),
                available: *funds,
                required: FLAT_FEE,
            });
        }
        *funds -= FLAT_FEE;
        *self.validators.entry(validator.to_string()).or_insert(0) += FLAT_FEE;
        self.val_changes.insert(validator.to_string());
        debug!(payer = user, proposer = validator, tx_hash = %tx_hash, "fee charged");
        Ok(())
    }

    /// Move `amount` tokens from `sender` to `receiver`.
    pub fn add_transfer(&mut self, sender: &str, receiver: &str, amount: i64) -> Result<()> {
        if amount <= 0 {
            return Err(StateError::NonPositiveAmount { amount });
        }
        let funds = self
            .users
            .get_mut(sender)
            .ok_or_else(|| StateError::UnknownUser {
                account: sender.to_string(),
            })?;
        if *funds < amount {
            return Err(StateError::InsufficientFunds {
                account: sender.to_string(),
                available: *funds,
                required: amount,
            });
        }
        *funds -= amount;
        *self.users.entry(receiver.to_string()).or_insert(0) += amount;
        Ok(())
    }

    /// Move `amount` between a user balance and a validator stake.
    /// A negative amount unstakes back to the user; the resulting stake
    /// must never go negative.
    pub fn add_stake(&mut self, user: &str, validator: &str, amount: i64) -> Result<()> {
        let funds = self
            .users
            .get_mut(user)
            .ok_or_else(|| StateError::UnknownUser {
                account: user.to_string(),
            })?;
        if amount > 0 && *funds < amount {
            return Err(StateError::InsufficientFunds {
                account: user.to_string(),
                available: *funds,
                required: amount,
            });
        }
        let target = self.validators.get(validator).copied().unwrap_or(0) + amount;
        if target < 0 {
            return Err(StateError::NonPositiveStakeTarget {
                validator: validator.to_string(),
                target,
            });
        }
        *funds -= amount;
        self.validators.insert(validator.to_string(), target);
        // a zero move leaves the stake untouched and emits no update
        if amount != 0 {
            self.val_changes.insert(validator.to_string());
        }
        Ok(())
    }

    /// Validators whose stake moved since the last fork.
    pub fn val_changes(&self) -> &BTreeSet<String> {
        &self.val_changes
    }

    pub fn stake_of(&self, validator: &str) -> i64 {
        self.validators.get(validator).copied().unwrap_or(0)
    }

    pub fn balance_of(&self, user: &str) -> Option<i64> {
        self.users.get(user).copied()
    }

    /// Digest of the canonical serialization: both maps in sorted key
    /// order, `val_changes` excluded.
    pub fn hash(&self) -> Hash256 {
        let encoded = serde_json::to_vec(self).expect("ledger serialization is infallible");
        sha256(&encoded)
    }

    /// Independent deep copy for forking the working state at commit.
    /// The change journal starts empty in the fork.
    pub fn fork(&self) -> Self {
        Self {
            users: self.users.clone(),
            validators: self.validators.clone(),
            val_changes: BTreeSet::new(),
        }
    }
}
