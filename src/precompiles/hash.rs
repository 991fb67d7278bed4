//! `0x02 sha2-256`, `0x03 ripemd-160`, `0x04 identity` (spec.md §4.L).

use super::Precompile;
use crate::error::EvmResult;
use bytes::Bytes;

const GAS_PER_WORD: u64 = 3;
const SHA256_BASE: u64 = 60;
const RIPEMD_BASE: u64 = 600;
const IDENTITY_BASE: u64 = 15;

fn words(len: usize) -> u64 {
    ((len as u64) + 31) / 32
}

pub struct Sha256;

impl Precompile for Sha256 {
    fn required_gas(&self, input: &[u8]) -> u64 {
        SHA256_BASE + GAS_PER_WORD * words(input.len())
    }
    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        use sha2::{Digest, Sha256 as Sha256Hasher};
        Ok(Bytes::copy_from_slice(&Sha256Hasher::digest(input)))
    }
}

pub struct Ripemd160;

impl Precompile for Ripemd160 {
    fn required_gas(&self, input: &[u8]) -> u64 {
        RIPEMD_BASE + GAS_PER_WORD * words(input.len())
    }
    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        use ripemd::{Digest, Ripemd160 as Ripemd160Hasher};
        let digest = Ripemd160Hasher::digest(input);
        let mut out = [0u8; 32];
        out[12..].copy_from_slice(&digest);
        Ok(Bytes::copy_from_slice(&out))
    }
}

pub struct Identity;

impl Precompile for Identity {
    fn required_gas(&self, input: &[u8]) -> u64 {
        IDENTITY_BASE + GAS_PER_WORD * words(input.len())
    }
    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        Ok(Bytes::copy_from_slice(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_echoes_input() {
        assert_eq!(Identity.run(b"hello").unwrap().as_ref(), b"hello");
    }

    #[test]
    fn sha256_gas_scales_with_word_count() {
        assert_eq!(Sha256.required_gas(&[0u8; 32]), SHA256_BASE + GAS_PER_WORD);
        assert_eq!(Sha256.required_gas(&[0u8; 33]), SHA256_BASE + 2 * GAS_PER_WORD);
    }

    #[test]
    fn ripemd_left_pads_to_32_bytes() {
        let out = Ripemd160.run(b"").unwrap();
        assert_eq!(out.len(), 32);
        assert_eq!(&out[..12], &[0u8; 12]);
    }
}
