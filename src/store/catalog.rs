//! Versioned partition catalog
//!
//! The set of partitions a beacon node expects before it reads or writes.
//! A catalog is an immutable value handed to whoever provisions the store;
//! nothing else depends on its identity.

use super::errors::StoreResult;
use super::handle::ChainStore;
use crate::observability::ObservationScope;

/// Partitions holding chain objects.
pub mod partition {
    pub const ATTESTATIONS: &str = "attestations";
    pub const BLOCKS: &str = "blocks";
    pub const STATE: &str = "state";
    pub const STATE_SUMMARY: &str = "state-summary";
    pub const PROPOSER_SLASHINGS: &str = "proposer-slashings";
    pub const ATTESTER_SLASHINGS: &str = "attester-slashings";
    pub const VOLUNTARY_EXITS: &str = "voluntary-exits";
    pub const CHAIN_METADATA: &str = "chain-metadata";
    pub const CHECKPOINT: &str = "check-point";
    pub const POWCHAIN: &str = "powchain";

    // Indices
    pub const ATTESTATION_HEAD_BLOCK_ROOT_INDICES: &str = "attestation-head-block-root-indices";
    pub const ATTESTATION_SOURCE_ROOT_INDICES: &str = "attestation-source-root-indices";
    pub const ATTESTATION_SOURCE_EPOCH_INDICES: &str = "attestation-source-epoch-indices";
    pub const ATTESTATION_TARGET_ROOT_INDICES: &str = "attestation-target-root-indices";
    pub const ATTESTATION_TARGET_EPOCH_INDICES: &str = "attestation-target-epoch-indices";
    pub const BLOCK_SLOT_INDICES: &str = "block-slot-indices";
    pub const STATE_SLOT_INDICES: &str = "state-slot-indices";
    pub const BLOCK_PARENT_ROOT_INDICES: &str = "block-parent-root-indices";
    pub const FINALIZED_BLOCK_ROOTS_INDEX: &str = "finalized-block-roots-index";

    // Bookkeeping
    pub const NEW_STATE_COMPATIBLE: &str = "new-state-compatible";
    pub const MIGRATIONS: &str = "migrations";
}

/// Well-known item keys inside the metadata partitions.
pub mod item_key {
    use super::partition;

    pub const HEAD_BLOCK_ROOT: &[u8] = b"head-root";
    pub const GENESIS_BLOCK_ROOT: &[u8] = b"genesis-root";
    pub const DEPOSIT_CONTRACT_ADDRESS: &[u8] = b"deposit-contract";
    pub const JUSTIFIED_CHECKPOINT: &[u8] = b"justified-checkpoint";
    pub const FINALIZED_CHECKPOINT: &[u8] = b"finalized-checkpoint";
    pub const POWCHAIN_DATA: &[u8] = b"powchain-data";
    pub const LAST_ARCHIVED_INDEX: &[u8] = b"last-archived";
    pub const SAVED_STATE_SLOTS: &[u8] = b"saved-state-slots";

    /// Every well-known key with the partition that holds it.
    pub const ALL: [(&str, &[u8]); 8] = [
        (partition::BLOCKS, HEAD_BLOCK_ROOT),
        (partition::BLOCKS, GENESIS_BLOCK_ROOT),
        (partition::CHAIN_METADATA, DEPOSIT_CONTRACT_ADDRESS),
        (partition::CHECKPOINT, JUSTIFIED_CHECKPOINT),
        (partition::CHECKPOINT, FINALIZED_CHECKPOINT),
        (partition::POWCHAIN, POWCHAIN_DATA),
        (partition::CHAIN_METADATA, LAST_ARCHIVED_INDEX),
        (partition::STATE, SAVED_STATE_SLOTS),
    ];
}

const STANDARD_V1: &[&str] = &[
    partition::ATTESTATIONS,
    partition::BLOCKS,
    partition::STATE,
    partition::PROPOSER_SLASHINGS,
    partition::ATTESTER_SLASHINGS,
    partition::VOLUNTARY_EXITS,
    partition::CHAIN_METADATA,
    partition::CHECKPOINT,
    partition::POWCHAIN,
    partition::STATE_SUMMARY,
    partition::ATTESTATION_HEAD_BLOCK_ROOT_INDICES,
    partition::ATTESTATION_SOURCE_ROOT_INDICES,
    partition::ATTESTATION_SOURCE_EPOCH_INDICES,
    partition::ATTESTATION_TARGET_ROOT_INDICES,
    partition::ATTESTATION_TARGET_EPOCH_INDICES,
    partition::BLOCK_SLOT_INDICES,
    partition::STATE_SLOT_INDICES,
    partition::BLOCK_PARENT_ROOT_INDICES,
    partition::FINALIZED_BLOCK_ROOTS_INDEX,
    partition::NEW_STATE_COMPATIBLE,
    partition::MIGRATIONS,
];

/// A fixed, versioned list of partition names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionCatalog {
    version: u32,
    partitions: Vec<String>,
}

impl PartitionCatalog {
    pub fn new(version: u32, partitions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            version,
            partitions: partitions.into_iter().map(Into::into).collect(),
        }
    }

    /// The beacon-chain layout, version 1.
    pub fn standard() -> Self {
        Self::new(1, STANDARD_V1.iter().copied())
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn partitions(&self) -> &[String] {
        &self.partitions
    }

    pub fn contains(&self, name: &str) -> bool {
        self.partitions.iter().any(|p| p == name)
    }

    /// Create every partition that does not exist yet, in one write
    /// transaction. Returns how many were newly created.
    pub fn provision(&self, store: &ChainStore) -> StoreResult<usize> {
        let version = self.version.to_string();
        let scope = ObservationScope::begin("PROVISION", &[("version", version.as_str())]);

        let result = store.update(|w| {
            let mut created = 0;
            for name in &self.partitions {
                if w.create_partition(name)? {
                    created += 1;
                }
            }
            Ok(created)
        });

        match result {
            Ok(created) => {
                let created_str = created.to_string();
                scope.complete(&[("created", created_str.as_str())]);
                Ok(created)
            }
            Err(err) => {
                scope.fail(err.severity(), err.code(), &err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_standard_catalog() {
        let catalog = PartitionCatalog::standard();
        assert_eq!(catalog.version(), 1);
        assert_eq!(catalog.partitions().len(), 21);
        assert!(catalog.contains(partition::BLOCKS));
        assert!(catalog.contains(partition::MIGRATIONS));
        assert!(!catalog.contains("kwbkt"));
    }

    #[test]
    fn test_standard_names_are_unique() {
        let catalog = PartitionCatalog::standard();
        let mut names: Vec<&String> = catalog.partitions().iter().collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), catalog.partitions().len());
    }

    #[test]
    fn test_item_keys_live_in_catalog_partitions() {
        let catalog = PartitionCatalog::standard();
        for (home, key) in item_key::ALL {
            assert!(catalog.contains(home), "{} has no partition", String::from_utf8_lossy(key));
        }
    }

    #[test]
    fn test_provision_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = ChainStore::open(dir.path().join("beaconchain.db")).unwrap();
        let catalog = PartitionCatalog::new(7, ["blocks", "state"]);

        assert_eq!(catalog.provision(&store).unwrap(), 2);
        assert_eq!(catalog.provision(&store).unwrap(), 0);

        let mut listed = store.list_partitions().unwrap();
        listed.sort();
        assert_eq!(listed, vec!["blocks".to_string(), "state".to_string()]);
    }

    #[test]
    fn test_provision_keeps_existing_data() {
        let dir = TempDir::new().unwrap();
        let store = ChainStore::open(dir.path().join("beaconchain.db")).unwrap();
        store.put(partition::BLOCKS, &[1], b"block").unwrap();

        let created = PartitionCatalog::standard().provision(&store).unwrap();
        assert_eq!(created, 20);
        assert_eq!(store.raw_entries(partition::BLOCKS, 5).unwrap().len(), 1);
    }
}
