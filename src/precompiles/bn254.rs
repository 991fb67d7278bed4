//! `0x06`/`0x07`/`0x08` bn254 (alt_bn128) add/mul/pairing (spec.md §4.L),
//! via `bn` (substrate-bn) — the pack's pairing-curve crate.

use super::Precompile;
use crate::chain_rules::ChainRules;
use crate::error::{Error, EvmResult};
use bn::{AffineG1, AffineG2, Fq, Fq2, Fr, Group, Gt, G1, G2};
use bytes::Bytes;

const ADD_GAS_ISTANBUL: u64 = 150;
const ADD_GAS_BYZANTIUM: u64 = 500;
const MUL_GAS_ISTANBUL: u64 = 6000;
const MUL_GAS_BYZANTIUM: u64 = 40000;
const PAIRING_BASE_ISTANBUL: u64 = 45000;
const PAIRING_PER_POINT_ISTANBUL: u64 = 34000;
const PAIRING_BASE_BYZANTIUM: u64 = 100000;
const PAIRING_PER_POINT_BYZANTIUM: u64 = 80000;

fn padded(input: &[u8], offset: usize, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    if offset >= input.len() {
        return out;
    }
    let avail = (input.len() - offset).min(len);
    out[..avail].copy_from_slice(&input[offset..offset + avail]);
    out
}

fn read_fq(input: &[u8], offset: usize) -> Result<Fq, Error> {
    Fq::from_slice(&padded(input, offset, 32)).map_err(|_| Error::PrecompileError("invalid field element".into()))
}

fn read_g1(input: &[u8], offset: usize) -> Result<G1, Error> {
    let x = read_fq(input, offset)?;
    let y = read_fq(input, offset + 32)?;
    if x.is_zero() && y.is_zero() {
        return Ok(G1::zero());
    }
    AffineG1::new(x, y).map(Into::into).map_err(|_| Error::PrecompileError("point not on curve".into()))
}

fn read_g2(input: &[u8], offset: usize) -> Result<G2, Error> {
    let x1 = read_fq(input, offset)?;
    let x0 = read_fq(input, offset + 32)?;
    let y1 = read_fq(input, offset + 64)?;
    let y0 = read_fq(input, offset + 96)?;
    let x = Fq2::new(x0, x1);
    let y = Fq2::new(y0, y1);
    if x.is_zero() && y.is_zero() {
        return Ok(G2::zero());
    }
    AffineG2::new(x, y).map(Into::into).map_err(|_| Error::PrecompileError("point not on curve".into()))
}

fn encode_g1(p: G1) -> Bytes {
    let mut out = vec![0u8; 64];
    if let Some(affine) = AffineG1::from_jacobian(p) {
        affine.x().to_big_endian(&mut out[0..32]).ok();
        affine.y().to_big_endian(&mut out[32..64]).ok();
    }
    Bytes::from(out)
}

pub struct Bn254Add {
    pub rules: ChainRules,
}

impl Precompile for Bn254Add {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        if self.rules.is_istanbul() {
            ADD_GAS_ISTANBUL
        } else {
            ADD_GAS_BYZANTIUM
        }
    }
    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        let a = read_g1(input, 0)?;
        let b = read_g1(input, 64)?;
        Ok(encode_g1(a + b))
    }
}

pub struct Bn254Mul {
    pub rules: ChainRules,
}

impl Precompile for Bn254Mul {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        if self.rules.is_istanbul() {
            MUL_GAS_ISTANBUL
        } else {
            MUL_GAS_BYZANTIUM
        }
    }
    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        let point = read_g1(input, 0)?;
        let scalar_bytes = padded(input, 64, 32);
        let scalar = Fr::from_slice(&scalar_bytes).map_err(|_| Error::PrecompileError("invalid scalar".into()))?;
        Ok(encode_g1(point * scalar))
    }
}

pub struct Bn254Pairing {
    pub rules: ChainRules,
}

impl Precompile for Bn254Pairing {
    fn required_gas(&self, input: &[u8]) -> u64 {
        let k = (input.len() / 192) as u64;
        if self.rules.is_istanbul() {
            PAIRING_BASE_ISTANBUL + PAIRING_PER_POINT_ISTANBUL * k
        } else {
            PAIRING_BASE_BYZANTIUM + PAIRING_PER_POINT_BYZANTIUM * k
        }
    }
    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        if input.len() % 192 != 0 {
            return Err(Error::PrecompileError("pairing input not a multiple of 192 bytes".into()));
        }
        let mut acc = Gt::one();
        for chunk in input.chunks(192) {
            let g1 = read_g1(chunk, 0)?;
            let g2 = read_g2(chunk, 64)?;
            acc = acc * bn::pairing(g1, g2);
        }
        let success = acc == Gt::one();
        let mut out = [0u8; 32];
        if success {
            out[31] = 1;
        }
        Ok(Bytes::copy_from_slice(&out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairing_of_empty_input_is_true_seed_scenario() {
        let p = Bn254Pairing { rules: ChainRules::latest() };
        let out = p.run(&[]).unwrap();
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(out.as_ref(), &expected);
    }

    #[test]
    fn add_identity_returns_same_point() {
        let p = Bn254Add { rules: ChainRules::latest() };
        // G1 generator (1, 2) plus the point at infinity (0, 0).
        let mut input = vec![0u8; 128];
        input[31] = 1;
        input[63] = 2;
        let out = p.run(&input).unwrap();
        assert_eq!(out.as_ref(), &input[0..64]);
    }

    #[test]
    fn pairing_rejects_non_multiple_of_192() {
        let p = Bn254Pairing { rules: ChainRules::latest() };
        assert!(p.run(&[0u8; 100]).is_err());
    }
}
