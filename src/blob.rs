//! Blob-gas schedule and versioned-hash derivation (EIP-4844/EIP-7691,
//! spec.md §6.3/§6.4, §8 S4/S5/S8).
//!
//! Has no teacher counterpart — `vm.rs` never modeled a second gas
//! dimension. Grounded directly on spec.md's seed scenarios (S4/S5),
//! which pin down the constants and the excess-gas formula exactly.

use crate::chain_rules::ChainRules;
use crate::primitives::Hash;

/// Gas charged per blob (`2**17`), fixed since EIP-4844.
const GAS_PER_BLOB: u64 = 131072;

/// Per-fork blob-count and blob-gas schedule (spec.md §8 S4). Pectra
/// (EIP-7691) raises both the target and max blob counts; everything
/// else about the schedule is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobParams {
    pub target_blobs: u64,
    pub max_blobs: u64,
    pub per_blob: u64,
    pub target_gas: u64,
    pub max_gas: u64,
}

impl BlobParams {
    const fn new(target_blobs: u64, max_blobs: u64) -> Self {
        Self {
            target_blobs,
            max_blobs,
            per_blob: GAS_PER_BLOB,
            target_gas: target_blobs * GAS_PER_BLOB,
            max_gas: max_blobs * GAS_PER_BLOB,
        }
    }

    const CANCUN: BlobParams = BlobParams::new(3, 6);
    const PRAGUE: BlobParams = BlobParams::new(6, 9);

    /// Selects the schedule active under `rules`. Prague/Pectra is the
    /// first fork to raise blob counts (spec.md §6.3); everything from
    /// Cancun up to (not including) Prague uses the original EIP-4844
    /// numbers.
    pub fn for_rules(rules: ChainRules) -> Self {
        if rules.is_prague() {
            Self::PRAGUE
        } else {
            Self::CANCUN
        }
    }
}

/// EIP-4844's excess-blob-gas update rule: the parent block's excess plus
/// blob gas it actually used, less the per-block target, floored at zero
/// (spec.md §8 S5).
pub fn calc_excess_blob_gas(parent_excess: u64, parent_used: u64, rules: ChainRules) -> u64 {
    let params = BlobParams::for_rules(rules);
    (parent_excess + parent_used).saturating_sub(params.target_gas)
}

/// `compute_blob_versioned_hash` (spec.md §6.3, §8 S8): a KZG commitment's
/// versioned hash is its sha2-256 digest with the leading byte overwritten
/// to the blob version marker `0x01`.
pub fn compute_blob_versioned_hash(commitment: &[u8]) -> Hash {
    use sha2::{Digest, Sha256};
    let mut hash: [u8; 32] = Sha256::digest(commitment).into();
    hash[0] = 0x01;
    Hash::from_slice(&hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_rules::Hardfork;

    #[test]
    fn blob_params_match_seed_scenario() {
        let cancun = BlobParams::for_rules(ChainRules::new(Hardfork::Cancun));
        assert_eq!(cancun, BlobParams { target_blobs: 3, max_blobs: 6, per_blob: 131072, target_gas: 393216, max_gas: 786432 });

        let prague = BlobParams::for_rules(ChainRules::new(Hardfork::Prague));
        assert_eq!(prague, BlobParams { target_blobs: 6, max_blobs: 9, per_blob: 131072, target_gas: 786432, max_gas: 1179648 });
    }

    #[test]
    fn excess_blob_gas_matches_seed_scenario() {
        let cancun = ChainRules::new(Hardfork::Cancun);
        let prague = ChainRules::new(Hardfork::Prague);
        assert_eq!(calc_excess_blob_gas(0, 500_000, cancun), 106_784);
        assert_eq!(calc_excess_blob_gas(0, 1_000_000, prague), 213_568);
    }

    #[test]
    fn excess_blob_gas_floors_at_zero() {
        let cancun = ChainRules::new(Hardfork::Cancun);
        assert_eq!(calc_excess_blob_gas(0, 0, cancun), 0);
    }

    #[test]
    fn versioned_hash_has_version_byte() {
        let hash = compute_blob_versioned_hash(&[0u8; 48]);
        assert_eq!(hash.as_bytes()[0], 0x01);
    }
}
