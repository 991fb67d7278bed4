//! EIP-7702 delegation-designator code pattern (spec.md §3, §6.4, §8 S7).
//!
//! An account "delegates" to another address by publishing a 23-byte code
//! blob `0xEF 0x01 0x00 <address>`. The call/create engine (`call.rs`)
//! resolves this before constructing a contract frame; this module is the
//! pure byte-pattern layer underneath that.

use super::Address;

const MAGIC: [u8; 2] = [0xEF, 0x01];
const VERSION: u8 = 0x00;

/// Total length of a delegation designator.
pub const DELEGATION_LEN: usize = 23;

/// Builds the 23-byte delegation designator for `target`.
pub fn address_to_delegation(target: Address) -> [u8; DELEGATION_LEN] {
    let mut out = [0u8; DELEGATION_LEN];
    out[0] = MAGIC[0];
    out[1] = MAGIC[1];
    out[2] = VERSION;
    out[3..].copy_from_slice(target.as_bytes());
    out
}

/// True if `code` is exactly a delegation designator.
pub fn has_delegation(code: &[u8]) -> bool {
    code.len() == DELEGATION_LEN && code[0] == MAGIC[0] && code[1] == MAGIC[1] && code[2] == VERSION
}

/// Extracts the delegated-to address, if `code` is a delegation designator.
pub fn parse_delegation(code: &[u8]) -> Option<Address> {
    if has_delegation(code) {
        Some(Address::from_slice(&code[3..]))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_for_any_address() {
        let addr = Address::from_low_u64_be(0xabcdef01);
        let designator = address_to_delegation(addr);
        assert_eq!(designator.len(), DELEGATION_LEN);
        assert!(has_delegation(&designator));
        assert_eq!(parse_delegation(&designator), Some(addr));
    }

    #[test]
    fn matches_seed_scenario_s7() {
        let addr = Address::from_low_u64_be(0xabcd_ef01);
        let designator = address_to_delegation(addr);
        assert_eq!(designator[0], 0xEF);
        assert_eq!(designator[1], 0x01);
        assert_eq!(designator[2], 0x00);
        assert_eq!(&designator[3..], addr.as_bytes());
    }

    #[test]
    fn rejects_other_lengths_and_prefixes() {
        assert!(!has_delegation(&[0xEF, 0x01, 0x00]));
        assert!(parse_delegation(&[0xEF, 0x00, 0x01]).is_none());
        let mut wrong_version = address_to_delegation(Address::zero());
        wrong_version[2] = 0x01;
        assert!(!has_delegation(&wrong_version));
    }
}
