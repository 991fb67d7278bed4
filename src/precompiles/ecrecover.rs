//! `0x01 ecrecover` (spec.md §4.L), via `k256`'s ECDSA recovery —
//! `Cargo.toml` already carries `k256` with the `ecdsa` feature for this.

use super::Precompile;
use crate::error::EvmResult;
use crate::primitives::keccak256;
use bytes::Bytes;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

const ECRECOVER_GAS: u64 = 3000;

pub struct Ecrecover;

impl Precompile for Ecrecover {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        ECRECOVER_GAS
    }

    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        let mut buf = [0u8; 128];
        let n = input.len().min(128);
        buf[..n].copy_from_slice(&input[..n]);

        let hash = &buf[0..32];
        let v_bytes = &buf[32..64];
        let r = &buf[64..96];
        let s = &buf[96..128];

        // `v` must fit in one byte and equal 27 or 28; the upper 31 bytes
        // must be zero (not a general `U256`, just this one encoding).
        if v_bytes[..31].iter().any(|b| *b != 0) {
            return Ok(Bytes::new());
        }
        let v = v_bytes[31];
        if v != 27 && v != 28 {
            return Ok(Bytes::new());
        }
        let recovery_id = match RecoveryId::from_byte(v - 27) {
            Some(id) => id,
            None => return Ok(Bytes::new()),
        };

        let mut sig_bytes = [0u8; 64];
        sig_bytes[..32].copy_from_slice(r);
        sig_bytes[32..].copy_from_slice(s);
        let signature = match Signature::from_slice(&sig_bytes) {
            Ok(sig) => sig,
            Err(_) => return Ok(Bytes::new()),
        };

        let recovered = match VerifyingKey::recover_from_prehash(hash, &signature, recovery_id) {
            Ok(key) => key,
            Err(_) => return Ok(Bytes::new()),
        };

        let uncompressed = recovered.to_encoded_point(false);
        let address_hash = keccak256(&uncompressed.as_bytes()[1..]);
        let mut out = [0u8; 32];
        out[12..].copy_from_slice(&address_hash.as_bytes()[12..]);
        Ok(Bytes::copy_from_slice(&out))
    }
}
