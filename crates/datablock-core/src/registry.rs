// Dataset registry: an append-only sequence of Data entries, each carrying
// a Description and an append-only sequence of Versions. Insertion order is
// part of consensus and is never rewritten.

use serde::{Deserialize, Serialize};

use crate::error::StateError;
use crate::types::{AcceptedPayload, Description, Payload, Validation};
use crate::Result;
use datablock_crypto::{sha256, Hash256};

/// One version slot of a dataset.
///
/// A slot is opened by a validation and then filled in one-shot steps:
/// empty sub-records are default-valued, and occupancy is judged by the
/// relevant address field being non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Version {
    pub validation: Validation,
    pub payload: Payload,
    pub accepted_payload: AcceptedPayload,
}

impl Version {
    /// Open a fresh slot holding only the validation.
    pub fn new(validation: Validation) -> Self {
        Self {
            validation,
            payload: Payload::default(),
            accepted_payload: AcceptedPayload::default(),
        }
    }

    /// Whether a provider has filled the payload slot.
    pub fn has_payload(&self) -> bool {
        !self.payload.provider_addr.is_empty()
    }

    /// Whether the requirer has recorded an acceptance.
    pub fn is_accepted(&self) -> bool {
        !self.accepted_payload.acceptor_addr.is_empty()
    }
}

/// A dataset entry: its description plus the ordered version history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Data {
    pub description: Description,
    pub version_list: Vec<Version>,
}

impl Data {
    pub fn new(description: Description) -> Self {
        Self {
            description,
            version_list: Vec::new(),
        }
    }

    /// Look up a version slot by wire index.
    pub fn version(&self, index: i64) -> Option<&Version> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.version_list.get(i))
    }

    fn version_at_mut(&mut self, index: i64) -> Result<&mut Version> {
        let len = self.version_list.len();
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| self.version_list.get_mut(i));
        slot.ok_or(StateError::IndexOutOfRange { index, len })
    }
}

/// The ordered dataset collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry(Vec<Data>);

impl Registry {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a Data entry by wire index.
    pub fn get(&self, index: i64) -> Option<&Data> {
        usize::try_from(index).ok().and_then(|i| self.0.get(i))
    }

    /// Append a new Data entry and return its assigned index.
    /// No version slot is opened here; that is the first validation's job.
    pub fn add_data(&mut self, description: Description) -> usize {
        self.0.push(Data::new(description));
        self.0.len() - 1
    }

    /// Open a new version slot on an existing Data entry.
    /// Returns the index of the slot it appended.
    pub fn add_validation(&mut self, validation: Validation, data_index: i64) -> Result<usize> {
        let data = self.data_at_mut(data_index)?;
        data.version_list.push(Version::new(validation));
        Ok(data.version_list.len() - 1)
    }

    /// Fill the payload slot of an existing version. One-shot.
    pub fn add_payload(
        &mut self,
        payload: Payload,
        data_index: i64,
        version_index: i64,
    ) -> Result<()> {
        let version = self.data_at_mut(data_index)?.version_at_mut(version_index)?;
        if version.has_payload() {
            return Err(StateError::PayloadAlreadySet {
                data_index,
                version_index,
            });
        }
        version.payload = payload;
        Ok(())
    }

    /// Record the requirer's acceptance of a filled version. One-shot,
    /// and only after a payload exists.
    pub fn accept_payload(
        &mut self,
        accepted: AcceptedPayload,
        data_index: i64,
        version_index: i64,
    ) -> Result<()> {
        let version = self.data_at_mut(data_index)?.version_at_mut(version_index)?;
        if !version.has_payload() {
            return Err(StateError::PayloadNotSet {
                data_index,
                version_index,
            });
        }
        if version.is_accepted() {
            return Err(StateError::AlreadyAccepted {
                data_index,
                version_index,
            });
        }
        version.accepted_payload = accepted;
        Ok(())
    }

    /// Digest of the canonical serialization: each Data in insertion order,
    /// each nested Version in insertion order, fields in declaration order.
    pub fn hash(&self) -> Hash256 {
        let encoded = serde_json::to_vec(&self.0).expect("registry serialization is infallible");
        sha256(&encoded)
    }

    fn data_at_mut(&mut self, index: i64) -> Result<&mut Data> {
        let len = self.0.len();
        let slot = usize::try_from(index).ok().and_then(|i| self.0.get_mut(i));
        slot.ok_or(StateError::IndexOutOfRange { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description(requirer: &str) -> Description {
        Description {
            requirer: requirer.to_string(),
            name: "weather-logs".to_string(),
            ..Default::default()
        }
    }

    fn validation(addr: &str) -> Validation {
        Validation {
            validator_addr: addr.to_string(),
            verdict: true,
            proof: "sig".to_string(),
        }
    }

    fn payload(addr: &str) -> Payload {
        Payload {
            provider_addr: addr.to_string(),
            payload_hash: "abcd".to_string(),
            proof: "sig".to_string(),
        }
    }

    fn accepted(addr: &str) -> AcceptedPayload {
        AcceptedPayload {
            acceptor_addr: addr.to_string(),
            verdict: true,
            proof: "sig".to_string(),
        }
    }

    #[test]
    fn test_add_data_assigns_sequential_indices() {
        let mut registry = Registry::new();
        assert_eq!(registry.add_data(description("alice")), 0);
        assert_eq!(registry.add_data(description("bob")), 1);
        // no version slot is opened by add_data
        assert!(registry.get(0).unwrap().version_list.is_empty());
    }

    #[test]
    fn test_add_validation_opens_slot() {
        let mut registry = Registry::new();
        registry.add_data(description("alice"));
        let slot = registry.add_validation(validation("bob"), 0).unwrap();
        assert_eq!(slot, 0);

        let version = &registry.get(0).unwrap().version_list[0];
        assert_eq!(version.validation.validator_addr, "bob");
        assert!(!version.has_payload());
        assert!(!version.is_accepted());
    }

    #[test]
    fn test_add_validation_rejects_bad_index() {
        let mut registry = Registry::new();
        let err = registry.add_validation(validation("bob"), 0).unwrap_err();
        assert_eq!(err, StateError::IndexOutOfRange { index: 0, len: 0 });

        registry.add_data(description("alice"));
        let err = registry.add_validation(validation("bob"), -1).unwrap_err();
        assert!(matches!(err, StateError::IndexOutOfRange { index: -1, .. }));
    }

    #[test]
    fn test_payload_lifecycle_is_one_shot() {
        let mut registry = Registry::new();
        registry.add_data(description("alice"));
        registry.add_validation(validation("bob"), 0).unwrap();

        // accepting before any payload is rejected
        let err = registry.accept_payload(accepted("alice"), 0, 0).unwrap_err();
        assert!(matches!(err, StateError::PayloadNotSet { .. }));

        registry.add_payload(payload("carol"), 0, 0).unwrap();
        let err = registry.add_payload(payload("dave"), 0, 0).unwrap_err();
        assert!(matches!(err, StateError::PayloadAlreadySet { .. }));

        registry.accept_payload(accepted("alice"), 0, 0).unwrap();
        let err = registry.accept_payload(accepted("alice"), 0, 0).unwrap_err();
        assert!(matches!(err, StateError::AlreadyAccepted { .. }));

        // the stored records survived the rejected re-applies
        let version = &registry.get(0).unwrap().version_list[0];
        assert_eq!(version.payload.provider_addr, "carol");
        assert_eq!(version.accepted_payload.acceptor_addr, "alice");
    }

    #[test]
    fn test_version_index_checked_within_selected_data() {
        let mut registry = Registry::new();
        registry.add_data(description("alice"));
        registry.add_validation(validation("bob"), 0).unwrap();

        let err = registry.add_payload(payload("carol"), 0, 1).unwrap_err();
        assert_eq!(err, StateError::IndexOutOfRange { index: 1, len: 1 });
    }

    #[test]
    fn test_hash_tracks_content() {
        let mut registry = Registry::new();
        let empty = registry.hash();
        assert_eq!(registry.hash(), empty);

        registry.add_data(description("alice"));
        let one = registry.hash();
        assert_ne!(one, empty);

        // re-hashing an unchanged registry is bit-identical
        assert_eq!(registry.hash(), one);
    }
}
