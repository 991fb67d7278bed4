//! `0x05 modexp` (spec.md §4.L), EIP-198's format with EIP-2565's
//! (Berlin+) cheaper gas schedule — via `num-bigint`, the pack's
//! arbitrary-precision integer crate.

use super::Precompile;
use crate::chain_rules::ChainRules;
use crate::error::EvmResult;
use bytes::Bytes;
use num_bigint::BigUint;
use num_traits::Zero;

pub struct Modexp {
    pub rules: ChainRules,
}

fn read_len(input: &[u8], offset: usize) -> usize {
    let mut buf = [0u8; 32];
    let available = input.len().saturating_sub(offset).min(32);
    if available > 0 {
        buf[32 - available..].copy_from_slice(&input[offset..offset + available]);
    }
    // Clamp to a sane usize; an input claiming a multi-exabyte length
    // cannot actually be backed by real input bytes.
    if buf[..24].iter().any(|b| *b != 0) {
        return usize::MAX;
    }
    u64::from_be_bytes(buf[24..32].try_into().unwrap()) as usize
}

fn read_slice(input: &[u8], offset: usize, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    if offset >= input.len() || len == 0 {
        return out;
    }
    let avail = (input.len() - offset).min(len);
    out[..avail].copy_from_slice(&input[offset..offset + avail]);
    out
}

fn mult_complexity(x: u64) -> u64 {
    if x <= 64 {
        x * x
    } else if x <= 1024 {
        x * x / 4 + 96 * x - 3072
    } else {
        x * x / 16 + 480 * x - 199680
    }
}

/// Iteration count for the exponent (EIP-198/EIP-2565): effectively
/// `bit_length(exp) - 1`, adjusted for exponents longer than 32 bytes.
fn adjusted_exponent_length(exp_len: usize, exp_head: &[u8]) -> u64 {
    let bit_length = |bytes: &[u8]| -> u64 {
        for (i, b) in bytes.iter().enumerate() {
            if *b != 0 {
                return ((bytes.len() - i - 1) * 8) as u64 + (8 - b.leading_zeros() as u64);
            }
        }
        0
    };
    if exp_len <= 32 {
        bit_length(exp_head).saturating_sub(1)
    } else {
        let head_bits = bit_length(exp_head);
        8 * (exp_len as u64 - 32) + head_bits.saturating_sub(1).max(0)
    }
}

struct Lengths {
    base_len: usize,
    exp_len: usize,
    mod_len: usize,
}

fn parse_lengths(input: &[u8]) -> Lengths {
    Lengths { base_len: read_len(input, 0), exp_len: read_len(input, 32), mod_len: read_len(input, 64) }
}

impl Precompile for Modexp {
    fn required_gas(&self, input: &[u8]) -> u64 {
        let lens = parse_lengths(input);
        if lens.base_len == usize::MAX || lens.exp_len == usize::MAX || lens.mod_len == usize::MAX {
            return u64::MAX;
        }
        let exp_head_len = lens.exp_len.min(32);
        let exp_head = read_slice(input, 96 + lens.base_len, exp_head_len);
        let iterations = adjusted_exponent_length(lens.exp_len, &exp_head).max(1);
        let complexity = mult_complexity(lens.base_len.max(lens.mod_len) as u64);
        if self.rules.is_berlin() {
            (complexity * iterations / 3).max(200)
        } else {
            complexity * iterations / 20
        }
    }

    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        let lens = parse_lengths(input);
        if lens.mod_len == usize::MAX || lens.base_len == usize::MAX || lens.exp_len == usize::MAX {
            return Err(crate::error::Error::PrecompileError("modexp length overflow".into()));
        }
        let base = read_slice(input, 96, lens.base_len);
        let exponent = read_slice(input, 96 + lens.base_len, lens.exp_len);
        let modulus = read_slice(input, 96 + lens.base_len + lens.exp_len, lens.mod_len);

        let modulus_int = BigUint::from_bytes_be(&modulus);
        let mut out = vec![0u8; lens.mod_len];
        if modulus_int.is_zero() {
            return Ok(Bytes::from(out));
        }
        let base_int = BigUint::from_bytes_be(&base);
        let exp_int = BigUint::from_bytes_be(&exponent);
        let result = base_int.modpow(&exp_int, &modulus_int);
        let result_bytes = result.to_bytes_be();
        let start = lens.mod_len.saturating_sub(result_bytes.len());
        out[start..].copy_from_slice(&result_bytes);
        Ok(Bytes::from(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn len_field(n: usize) -> [u8; 32] {
        let mut field = [0u8; 32];
        field[24..].copy_from_slice(&(n as u64).to_be_bytes());
        field
    }

    fn encode(base: &[u8], exp: &[u8], modulus: &[u8]) -> Vec<u8> {
        let mut result = Vec::new();
        result.extend_from_slice(&len_field(base.len()));
        result.extend_from_slice(&len_field(exp.len()));
        result.extend_from_slice(&len_field(modulus.len()));
        result.extend_from_slice(base);
        result.extend_from_slice(exp);
        result.extend_from_slice(modulus);
        result
    }

    #[test]
    fn matches_seed_scenario_s3() {
        let m = Modexp { rules: ChainRules::latest() };
        let out = m.run(&encode(&[2], &[3], &[5])).unwrap();
        assert_eq!(out.as_ref(), &[0x03]);
        let out = m.run(&encode(&[3], &[5], &[13])).unwrap();
        assert_eq!(out.as_ref(), &[0x09]);
    }

    #[test]
    fn zero_modulus_returns_zeroes() {
        let input = encode(&[3], &[2], &[0]);
        let m = Modexp { rules: ChainRules::latest() };
        let out = m.run(&input).unwrap();
        assert_eq!(out.as_ref(), &[0]);
    }
}
