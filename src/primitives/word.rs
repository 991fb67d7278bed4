//! 256-bit arithmetic, comparison, bitwise and shift helpers used by the
//! arithmetic/bitwise opcode handlers (spec.md §4.A, component A).
//!
//! `ethereum_types::U256` already gives us wrapping add/sub/mul; everything
//! here is the EVM-specific layer on top: signed division/modulo (two's
//! complement over 256 bits), sign-extension, byte selection, shifts that
//! saturate at a 256-bit shift amount, `addmod`/`mulmod` that never overflow
//! mid-computation, and `CLZ` (EIP-7939).

use ethereum_types::{U256, U512};

const SIGN_BIT: U256 = U256([0, 0, 0, 0x8000_0000_0000_0000]);

/// True if the two's-complement interpretation of `w` is negative.
pub fn is_negative(w: U256) -> bool {
    w & SIGN_BIT == SIGN_BIT
}

/// Two's-complement negation (`0 - w` wrapping, i.e. `!w + 1`).
fn two_complement(w: U256) -> U256 {
    (!w).overflowing_add(U256::one()).0
}

/// Signed division. Division by zero, and `i256::MIN / -1`, both yield the
/// EVM's defined-to-be-zero / overflow-wraps-to-MIN behaviour rather than a
/// panic.
pub fn sdiv(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let a_neg = is_negative(a);
    let b_neg = is_negative(b);
    let ua = if a_neg { two_complement(a) } else { a };
    let ub = if b_neg { two_complement(b) } else { b };
    let min = SIGN_BIT; // i256::MIN, whose two's complement is itself
    if ua == min && ub == U256::MAX {
        // MIN / -1 overflows back to MIN
        return min;
    }
    let uq = ua / ub;
    if a_neg != b_neg {
        two_complement(uq)
    } else {
        uq
    }
}

/// Signed modulo; sign follows the dividend. Modulo by zero yields zero.
pub fn smod(a: U256, b: U256) -> U256 {
    if b.is_zero() {
        return U256::zero();
    }
    let a_neg = is_negative(a);
    let b_neg = is_negative(b);
    let ua = if a_neg { two_complement(a) } else { a };
    let ub = if b_neg { two_complement(b) } else { b };
    let ur = ua % ub;
    if a_neg {
        two_complement(ur)
    } else {
        ur
    }
}

/// `(a + b) mod n`, computed in 512-bit intermediate precision so the
/// addition never wraps before the reduction. Zero modulus yields zero.
pub fn addmod(a: U256, b: U256, n: U256) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    let sum = U512::from(a) + U512::from(b);
    let n512 = U512::from(n);
    let r = sum % n512;
    U256::try_from(r).expect("reduced mod n fits in 256 bits")
}

/// `(a * b) mod n`, computed in 512-bit intermediate precision. Zero
/// modulus yields zero.
pub fn mulmod(a: U256, b: U256, n: U256) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    let prod = U512::from(a) * U512::from(b);
    let n512 = U512::from(n);
    let r = prod % n512;
    U256::try_from(r).expect("reduced mod n fits in 256 bits")
}

/// `base.pow(exponent)` wrapping at 2^256, by repeated squaring.
pub fn exp(mut base: U256, mut exponent: U256) -> U256 {
    let mut result = U256::one();
    while !exponent.is_zero() {
        if exponent & U256::one() == U256::one() {
            result = result.overflowing_mul(base).0;
        }
        base = base.overflowing_mul(base).0;
        exponent >>= 1;
    }
    result
}

/// Number of bytes needed to represent `exponent`, used for `EXP`'s dynamic
/// gas cost (50 gas/byte post-Spurious-Dragon, 10 before).
pub fn exponent_byte_len(exponent: U256) -> u64 {
    let bytes = exponent.to_big_endian();
    let leading_zero_bytes = bytes.iter().take_while(|b| **b == 0).count();
    (32 - leading_zero_bytes) as u64
}

/// Sign-extends `value`, treating byte `byte_num` (0 = least significant) as
/// the sign byte. `byte_num >= 32` returns `value` unchanged.
pub fn sign_extend(byte_num: U256, value: U256) -> U256 {
    if byte_num >= U256::from(32) {
        return value;
    }
    let byte_num = byte_num.as_u32();
    let bit = byte_num * 8 + 7;
    let mask = (U256::one() << bit) - U256::one();
    if value & (U256::one() << bit) != U256::zero() {
        value | !mask
    } else {
        value & mask
    }
}

/// `BYTE` opcode: byte `i` (0 = most significant) of the big-endian
/// representation of `value`. Out-of-range `i` yields zero.
pub fn byte(i: U256, value: U256) -> U256 {
    if i >= U256::from(32) {
        return U256::zero();
    }
    let i = i.as_usize();
    let be = value.to_big_endian();
    U256::from(be[i])
}

/// Logical shift left, saturating the shift amount at 256 (EVM `SHL`).
pub fn shl(shift: U256, value: U256) -> U256 {
    if shift >= U256::from(256) {
        U256::zero()
    } else {
        value << shift.as_u32()
    }
}

/// Logical shift right, saturating the shift amount at 256 (EVM `SHR`).
pub fn shr(shift: U256, value: U256) -> U256 {
    if shift >= U256::from(256) {
        U256::zero()
    } else {
        value >> shift.as_u32()
    }
}

/// Arithmetic shift right: sign-extends on overflow/saturation (EVM `SAR`).
pub fn sar(shift: U256, value: U256) -> U256 {
    let negative = is_negative(value);
    if shift >= U256::from(256) {
        return if negative { U256::MAX } else { U256::zero() };
    }
    let shift = shift.as_u32();
    if !negative {
        return value >> shift;
    }
    // Fill the vacated high bits with ones.
    let shifted = value >> shift;
    let mask = if shift == 0 {
        U256::zero()
    } else {
        !(U256::MAX >> shift)
    };
    shifted | mask
}

/// `CLZ` (EIP-7939): count of leading zero bits, 256 for zero input.
pub fn clz(value: U256) -> U256 {
    if value.is_zero() {
        return U256::from(256);
    }
    U256::from(value.leading_zeros())
}

/// Alternative CLZ decomposing the word into four 64-bit limbs, expected to
/// agree with [`clz`] for every input (fuzzed as an invariant, spec.md §9).
pub fn clz_fast(value: U256) -> U256 {
    let U256(limbs) = value;
    for (i, limb) in limbs.iter().enumerate().rev() {
        if *limb != 0 {
            let higher_bits = i as u32 * 64;
            return U256::from(higher_bits + limb.leading_zeros());
        }
    }
    U256::from(256)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdiv_and_smod_by_zero_are_zero() {
        assert_eq!(sdiv(U256::from(10), U256::zero()), U256::zero());
        assert_eq!(smod(U256::from(10), U256::zero()), U256::zero());
    }

    #[test]
    fn sdiv_matches_two_negatives() {
        let neg1 = two_complement(U256::one());
        assert_eq!(sdiv(U256::from(10), neg1), two_complement(U256::from(10)));
    }

    #[test]
    fn addmod_mulmod_overflow_safe() {
        let a = U256::MAX;
        let b = U256::MAX;
        let n = U256::from(7);
        // (MAX + MAX) mod 7 computed without truncation.
        let expected_add = (U512::from(a) + U512::from(b)) % U512::from(n);
        assert_eq!(addmod(a, b, n), U256::try_from(expected_add).unwrap());
        let expected_mul = (U512::from(a) * U512::from(b)) % U512::from(n);
        assert_eq!(mulmod(a, b, n), U256::try_from(expected_mul).unwrap());
        assert_eq!(addmod(a, b, U256::zero()), U256::zero());
        assert_eq!(mulmod(a, b, U256::zero()), U256::zero());
    }

    #[test]
    fn exp_wraps_mod_2_256() {
        assert_eq!(exp(U256::from(2), U256::from(3)), U256::from(8));
        assert_eq!(exp(U256::from(0), U256::from(0)), U256::one());
    }

    #[test]
    fn byte_selects_big_endian_index() {
        // value = 0x00AB_CD in the low 16 bits -> byte 30 is 0xAB, byte 31 is 0xCD.
        let value = U256::from(0xABCDu64);
        assert_eq!(byte(U256::from(30), value), U256::from(0xAB));
        assert_eq!(byte(U256::from(31), value), U256::from(0xCD));
        assert_eq!(byte(U256::from(32), value), U256::zero());
    }

    #[test]
    fn clz_matches_spec_vectors() {
        assert_eq!(clz(U256::zero()), U256::from(256));
        assert_eq!(clz(U256::one()), U256::from(255));
        assert_eq!(clz(U256::from(0xFFu64)), U256::from(248));
        assert_eq!(clz(U256::one() << 255), U256::zero());
        assert_eq!(clz(U256::MAX), U256::zero());
    }

    #[test]
    fn clz_fast_agrees_with_clz() {
        let samples = [
            U256::zero(),
            U256::one(),
            U256::from(0xFFu64),
            U256::one() << 255,
            U256::MAX,
            U256::from(123456789u64),
        ];
        for s in samples {
            assert_eq!(clz(s), clz_fast(s));
        }
    }

    #[test]
    fn sign_extend_matches_reference_bytes() {
        // 0x7F extended from byte 0 stays positive.
        assert_eq!(sign_extend(U256::zero(), U256::from(0x7Fu64)), U256::from(0x7Fu64));
        // 0xFF extended from byte 0 becomes all-ones.
        assert_eq!(sign_extend(U256::zero(), U256::from(0xFFu64)), U256::MAX);
    }

    #[test]
    fn shifts_saturate_at_256() {
        assert_eq!(shl(U256::from(256), U256::one()), U256::zero());
        assert_eq!(shr(U256::from(256), U256::MAX), U256::zero());
        assert_eq!(sar(U256::from(256), U256::one() << 255), U256::MAX);
        assert_eq!(sar(U256::from(256), U256::one()), U256::zero());
    }
}
