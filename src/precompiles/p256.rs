//! `0x100 secp256r1 verify` (EIP-7212, spec.md §4.L/§4.M), via `p256`'s
//! ECDSA verifier.

use super::Precompile;
use crate::error::EvmResult;
use bytes::Bytes;
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::{Signature, VerifyingKey};
use p256::{EncodedPoint, FieldBytes};

const P256_VERIFY_GAS: u64 = 3450;

pub struct P256Verify;

impl Precompile for P256Verify {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        P256_VERIFY_GAS
    }

    /// Never errors: any malformed or invalid input simply verifies false
    /// and returns an empty output (spec.md §4.M).
    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        if input.len() != 160 {
            return Ok(Bytes::new());
        }
        let hash = &input[0..32];
        let r = &input[32..64];
        let s = &input[64..96];
        let qx = &input[96..128];
        let qy = &input[128..160];

        let signature = match Signature::from_scalars(
            <[u8; 32]>::try_from(r).unwrap(),
            <[u8; 32]>::try_from(s).unwrap(),
        ) {
            Ok(sig) => sig,
            Err(_) => return Ok(Bytes::new()),
        };

        let qx_bytes = FieldBytes::clone_from_slice(qx);
        let qy_bytes = FieldBytes::clone_from_slice(qy);
        let point = EncodedPoint::from_affine_coordinates(&qx_bytes, &qy_bytes, false);
        let verifying_key = match VerifyingKey::from_encoded_point(&point) {
            Ok(key) => key,
            Err(_) => return Ok(Bytes::new()),
        };

        match verifying_key.verify_prehash(hash, &signature) {
            Ok(()) => {
                let mut out = [0u8; 32];
                out[31] = 1;
                Ok(Bytes::copy_from_slice(&out))
            }
            Err(_) => Ok(Bytes::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_length_verifies_false() {
        let out = P256Verify.run(&[0u8; 10]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn all_zero_input_verifies_false() {
        let out = P256Verify.run(&[0u8; 160]).unwrap();
        assert!(out.is_empty());
    }
}
