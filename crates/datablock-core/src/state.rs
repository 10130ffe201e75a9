// The composite application state: dataset registry plus balance ledger.
// Its digest fingerprints a committed block, so serialization here is
// consensus-critical.

use serde::{Deserialize, Serialize};

use crate::balance::Balance;
use crate::registry::Registry;
use datablock_crypto::StateDigest;

/// The full replicated state at one height.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct State {
    pub data_list: Registry,
    pub balance: Balance,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(balance: Balance) -> Self {
        Self {
            data_list: Registry::new(),
            balance,
        }
    }

    /// 64-byte digest: registry digest followed by ledger digest.
    pub fn hash(&self) -> StateDigest {
        StateDigest::from_parts(self.data_list.hash(), self.balance.hash())
    }

    /// Independent deep copy used to fork the next working state off the
    /// committed one. Mutating the fork never aliases into the original.
    pub fn fork(&self) -> Self {
        Self {
            data_list: self.data_list.clone(),
            balance: self.balance.fork(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Description;
    use std::collections::BTreeMap;

    fn seeded() -> State {
        State::with_balance(Balance::with_genesis(
            BTreeMap::from([("alice".to_string(), 100)]),
            BTreeMap::from([("F0F0".to_string(), 10)]),
        ))
    }

    #[test]
    fn test_hash_is_stable() {
        let state = seeded();
        let digest = state.hash();
        assert_eq!(state.hash(), digest);
        assert!(!digest.is_zero());
    }

    #[test]
    fn test_hash_covers_both_children() {
        let mut state = seeded();
        let initial = state.hash();

        state.data_list.add_data(Description {
            requirer: "alice".to_string(),
            ..Default::default()
        });
        let after_registry = state.hash();
        assert_ne!(after_registry, initial);
        // ledger half unchanged
        assert_eq!(&after_registry.as_bytes()[32..], &initial.as_bytes()[32..]);

        state.balance.add_transfer("alice", "bob", 1).unwrap();
        let after_ledger = state.hash();
        // registry half unchanged
        assert_eq!(
            &after_ledger.as_bytes()[..32],
            &after_registry.as_bytes()[..32]
        );
        assert_ne!(&after_ledger.as_bytes()[32..], &after_registry.as_bytes()[32..]);
    }

    #[test]
    fn test_fork_isolation() {
        let mut state = seeded();
        let fork = state.fork();
        assert_eq!(fork.hash(), state.hash());

        state.balance.add_transfer("alice", "bob", 7).unwrap();
        assert_ne!(fork.hash(), state.hash());
    }

    #[test]
    fn test_serialized_shape() {
        let state = seeded();
        let json = serde_json::to_value(&state).unwrap();
        assert!(json["DataList"].is_array());
        assert_eq!(json["Balance"]["Users"]["alice"], 100);
        assert_eq!(json["Balance"]["Validators"]["F0F0"], 10);
    }
}
