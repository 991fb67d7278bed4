//! `0x0a` KZG point-evaluation (EIP-4844, spec.md §4.L/§4.M), via
//! `kzg-rs` — the pack's pure-Rust KZG verifier.

use super::Precompile;
use crate::error::{Error, EvmResult};
use bytes::Bytes;
use kzg_rs::{Bytes32, Bytes48, KzgProof, KzgSettings};
use once_cell::sync::Lazy;

const POINT_EVAL_GAS: u64 = 50000;
const FIELD_ELEMENTS_PER_BLOB: u64 = 4096;
/// The BLS12-381 scalar field modulus (EIP-4844).
const BLS_MODULUS: [u8; 32] = [
    0x73, 0xed, 0xa7, 0x53, 0x29, 0x9d, 0x7d, 0x48, 0x33, 0x39, 0xd8, 0x08, 0x09, 0xa1, 0xd8, 0x05, 0x53, 0xbd, 0xa4,
    0x02, 0xff, 0xfe, 0x5b, 0xfe, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01,
];
const VERSIONED_HASH_VERSION_KZG: u8 = 0x01;

static TRUSTED_SETUP: Lazy<Option<KzgSettings>> = Lazy::new(|| KzgSettings::load_trusted_setup_file().ok());

pub struct KzgPointEval;

impl Precompile for KzgPointEval {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        POINT_EVAL_GAS
    }

    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        if input.len() != 192 {
            return Err(Error::PrecompileError("kzg point-eval input must be 192 bytes".into()));
        }
        let versioned_hash = &input[0..32];
        let z = &input[32..64];
        let y = &input[64..96];
        let commitment = &input[96..144];
        let proof = &input[144..192];

        if versioned_hash[0] != VERSIONED_HASH_VERSION_KZG {
            return Err(Error::PrecompileError("versioned hash has wrong version byte".into()));
        }
        let expected_hash = crate::blob::compute_blob_versioned_hash(commitment);
        if expected_hash.as_bytes() != versioned_hash {
            return Err(Error::PrecompileError("versioned hash does not match commitment".into()));
        }

        let settings = TRUSTED_SETUP
            .as_ref()
            .ok_or_else(|| Error::PrecompileError("no trusted setup loaded".into()))?;
        let commitment_bytes = Bytes48::from_slice(commitment)
            .map_err(|_| Error::PrecompileError("invalid commitment encoding".into()))?;
        let z_bytes =
            Bytes32::from_slice(z).map_err(|_| Error::PrecompileError("invalid z encoding".into()))?;
        let y_bytes =
            Bytes32::from_slice(y).map_err(|_| Error::PrecompileError("invalid y encoding".into()))?;
        let proof_bytes =
            Bytes48::from_slice(proof).map_err(|_| Error::PrecompileError("invalid proof encoding".into()))?;

        let valid = KzgProof::verify_kzg_proof(&commitment_bytes, &z_bytes, &y_bytes, &proof_bytes, settings)
            .map_err(|_| Error::PrecompileError("kzg proof verification failed".into()))?;
        if !valid {
            return Err(Error::PrecompileError("kzg proof is invalid".into()));
        }

        let mut out = [0u8; 64];
        out[24..32].copy_from_slice(&FIELD_ELEMENTS_PER_BLOB.to_be_bytes());
        out[32..64].copy_from_slice(&BLS_MODULUS);
        Ok(Bytes::copy_from_slice(&out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_input_length() {
        assert!(KzgPointEval.run(&[0u8; 100]).is_err());
    }

    #[test]
    fn rejects_wrong_version_byte() {
        let mut input = [0u8; 192];
        input[0] = 0x02; // not the KZG version byte
        assert!(KzgPointEval.run(&input).is_err());
    }

    #[test]
    fn rejects_versioned_hash_not_matching_commitment() {
        let commitment = [9u8; 48];
        let mut input = [0u8; 192];
        input[0] = VERSIONED_HASH_VERSION_KZG;
        // versioned_hash left as zeroes, which won't match sha256(commitment).
        input[96..144].copy_from_slice(&commitment);
        assert!(KzgPointEval.run(&input).is_err());
    }

    #[test]
    fn required_gas_is_constant() {
        assert_eq!(KzgPointEval.required_gas(&[]), POINT_EVAL_GAS);
    }
}
