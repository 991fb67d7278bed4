//! Core value types shared by every other module.
//!
//! The teacher (`czzqaq-mylayer2`) already depends on `ethereum-types` for
//! its 256-bit words, addresses and hashes (`world_state.rs`,
//! `transaction.rs`); we keep that dependency rather than hand-roll a
//! fixed-width integer type.

pub mod delegation;
pub mod word;

use ethereum_types::{H160, H256};

/// 256-bit unsigned integer, the EVM's native value type (spec.md §3, §4.A).
pub use ethereum_types::U256 as Word;

/// 20-byte account identifier.
pub type Address = H160;

/// 32-byte value, typically a Keccak-256 digest.
pub type Hash = H256;

/// Byte buffer used for calldata, return data, memory snapshots and code.
pub type Bytes = bytes::Bytes;

/// Truncates a [`Word`] to its low 20 bytes to form an [`Address`].
///
/// Used wherever the stack holds an address-as-word (`CALL`'s target
/// operand, `CREATE`'s computed address, ...).
pub fn word_to_address(w: Word) -> Address {
    let bytes = w.to_big_endian();
    Address::from_slice(&bytes[12..])
}

/// Widens an [`Address`] to a [`Word`] by zero-extending on the left.
pub fn address_to_word(a: Address) -> Word {
    Word::from_big_endian(a.as_bytes())
}

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    use sha3::{Digest, Keccak256};
    Hash::from_slice(&Keccak256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak256_matches_seed_scenario_s2() {
        let digest = keccak256(b"Transfer(address,address,uint256)");
        assert_eq!(
            format!("{:#x}", digest),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3e"
        );
    }

    #[test]
    fn word_address_round_trip() {
        let addr = Address::from_low_u64_be(0xdead_beef);
        assert_eq!(word_to_address(address_to_word(addr)), addr);
    }
}
