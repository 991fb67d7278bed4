//! Precompiled-contract registry (spec.md §4.L/§4.M).
//!
//! Has no direct teacher counterpart (the teacher never implements the
//! `0x01..0x09` address range); each submodule is grounded on the crate
//! the pack's `Cargo.toml` already carries for that algorithm family.

mod blake2f;
mod bls12_381;
mod bn254;
mod ecrecover;
mod hash;
mod kzg;
mod modexp;
mod p256;

use crate::chain_rules::{ChainRules, Hardfork};
use crate::error::EvmResult;
use crate::primitives::Address;

/// A precompiled contract: pure function of its input, gas-priced before
/// it runs (spec.md §4.L: `required_gas(input) -> u64`, `run(input) ->
/// Result<bytes, Error>`).
pub trait Precompile: Sync {
    fn required_gas(&self, input: &[u8]) -> u64;
    fn run(&self, input: &[u8]) -> EvmResult<bytes::Bytes>;
}

fn address_of(byte: u8) -> Address {
    Address::from_low_u64_be(byte as u64)
}

fn address_of_u16(value: u16) -> Address {
    Address::from_low_u64_be(value as u64)
}

/// Looks up the precompile active at `address` under `rules`, or `None` if
/// `address` isn't (yet) a precompile for this fork.
pub fn lookup(rules: ChainRules, address: Address) -> Option<&'static dyn Precompile> {
    if address == address_of(0x01) {
        return Some(&ecrecover::Ecrecover);
    }
    if address == address_of(0x02) {
        return Some(&hash::Sha256);
    }
    if address == address_of(0x03) {
        return Some(&hash::Ripemd160);
    }
    if address == address_of(0x04) {
        return Some(&hash::Identity);
    }
    if address == address_of(0x05) && rules.is_byzantium() {
        return Some(&modexp::Modexp { rules });
    }
    if address == address_of(0x06) && rules.is_byzantium() {
        return Some(&bn254::Bn254Add { rules });
    }
    if address == address_of(0x07) && rules.is_byzantium() {
        return Some(&bn254::Bn254Mul { rules });
    }
    if address == address_of(0x08) && rules.is_byzantium() {
        return Some(&bn254::Bn254Pairing { rules });
    }
    if address == address_of(0x09) && rules.is_istanbul() {
        return Some(&blake2f::Blake2F);
    }
    if address == address_of(0x0a) && rules.is_cancun() {
        return Some(&kzg::KzgPointEval);
    }
    if rules.is_active(Hardfork::Prague) && (0x0b..=0x12).contains(&address_low_byte(address)) && is_exact(address, 0x0b, 0x12) {
        return Some(bls12_381::lookup(address_low_byte(address)));
    }
    if rules.is_active(Hardfork::Prague) && address == address_of_u16(0x100) {
        return Some(&p256::P256Verify);
    }
    None
}

fn address_low_byte(address: Address) -> u8 {
    *address.as_bytes().last().unwrap()
}

/// `address` equals exactly `Address::from_low_u64_be(low)` with `low` in
/// `lo..=hi` — guards against a high-order collision (e.g. `0x0b` meaning
/// byte 11 vs. some unrelated 20-byte address whose last byte is 11).
fn is_exact(address: Address, lo: u8, hi: u8) -> bool {
    let low = address_low_byte(address);
    (lo..=hi).contains(&low) && address == address_of(low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_rules::Hardfork;

    #[test]
    fn identity_is_active_from_frontier() {
        let rules = ChainRules::new(Hardfork::Frontier);
        assert!(lookup(rules, address_of(0x04)).is_some());
    }

    #[test]
    fn modexp_inactive_before_byzantium() {
        let rules = ChainRules::new(Hardfork::Homestead);
        assert!(lookup(rules, address_of(0x05)).is_none());
    }

    #[test]
    fn bls_inactive_before_prague() {
        let rules = ChainRules::new(Hardfork::Cancun);
        assert!(lookup(rules, address_of(0x0b)).is_none());
    }

    #[test]
    fn p256_active_from_prague() {
        let rules = ChainRules::new(Hardfork::Prague);
        assert!(lookup(rules, address_of_u16(0x100)).is_some());
    }
}
