//! `0x0b`..`0x11` BLS12-381 operations (EIP-2537, spec.md §4.L/§4.M), via
//! `blst`'s raw point arithmetic — the pack's BLS12-381 crate.
//!
//! Field-element encoding follows EIP-2537: each `Fp` is a 64-byte
//! big-endian value with 16 leading zero padding bytes before the 48
//! significant ones; `Fp2` is two concatenated `Fp`s (`c0 || c1`).

use super::Precompile;
use crate::error::{Error, EvmResult};
use bytes::Bytes;

const G1_ADD_GAS: u64 = 375;
const G1_MSM_GAS_PER_PAIR: u64 = 12000;
const G2_ADD_GAS: u64 = 600;
const G2_MSM_GAS_PER_PAIR: u64 = 22500;
const PAIRING_BASE_GAS: u64 = 37700;
const PAIRING_PER_PAIR_GAS: u64 = 32600;
const MAP_FP_TO_G1_GAS: u64 = 5500;
const MAP_FP2_TO_G2_GAS: u64 = 23800;

const FP_LEN: usize = 64;
const FP2_LEN: usize = 2 * FP_LEN;
const G1_POINT_LEN: usize = 2 * FP_LEN;
const G2_POINT_LEN: usize = 2 * FP2_LEN;
const SCALAR_LEN: usize = 32;

pub fn lookup(low_byte: u8) -> &'static dyn Precompile {
    match low_byte {
        0x0b => &G1Add,
        0x0c => &G1Msm,
        0x0d => &G2Add,
        0x0e => &G2Msm,
        0x0f => &PairingCheck,
        0x10 => &MapFpToG1,
        0x11 => &MapFp2ToG2,
        _ => &Unsupported,
    }
}

/// Strips the mandatory 16-byte zero padding from a 64-byte `Fp` encoding,
/// returning the 48 significant big-endian bytes.
fn fp_to_48(encoded: &[u8]) -> Result<[u8; 48], Error> {
    if encoded.len() != FP_LEN || encoded[..16].iter().any(|b| *b != 0) {
        return Err(Error::PrecompileError("invalid Fp padding".into()));
    }
    let mut out = [0u8; 48];
    out.copy_from_slice(&encoded[16..]);
    Ok(out)
}

fn fp_from_48(bytes: &[u8; 48]) -> [u8; FP_LEN] {
    let mut out = [0u8; FP_LEN];
    out[16..].copy_from_slice(bytes);
    out
}

fn read_g1_affine(input: &[u8]) -> Result<blst::blst_p1_affine, Error> {
    if input.len() != G1_POINT_LEN {
        return Err(Error::PrecompileError("bad G1 point length".into()));
    }
    let x = fp_to_48(&input[0..FP_LEN])?;
    let y = fp_to_48(&input[FP_LEN..2 * FP_LEN])?;
    let mut affine = blst::blst_p1_affine::default();
    unsafe {
        blst::blst_fp_from_bendian(&mut affine.x, x.as_ptr());
        blst::blst_fp_from_bendian(&mut affine.y, y.as_ptr());
    }
    if x == [0u8; 48] && y == [0u8; 48] {
        return Ok(affine); // point at infinity, encoded as all-zero
    }
    let on_curve = unsafe { blst::blst_p1_affine_on_curve(&affine) };
    if !on_curve {
        return Err(Error::PrecompileError("G1 point not on curve".into()));
    }
    Ok(affine)
}

fn write_g1_affine(affine: &blst::blst_p1_affine) -> Bytes {
    let mut x = [0u8; 48];
    let mut y = [0u8; 48];
    unsafe {
        blst::blst_bendian_from_fp(x.as_mut_ptr(), &affine.x);
        blst::blst_bendian_from_fp(y.as_mut_ptr(), &affine.y);
    }
    let mut out = vec![0u8; G1_POINT_LEN];
    out[0..FP_LEN].copy_from_slice(&fp_from_48(&x));
    out[FP_LEN..2 * FP_LEN].copy_from_slice(&fp_from_48(&y));
    Bytes::from(out)
}

fn read_g2_affine(input: &[u8]) -> Result<blst::blst_p2_affine, Error> {
    if input.len() != G2_POINT_LEN {
        return Err(Error::PrecompileError("bad G2 point length".into()));
    }
    let x0 = fp_to_48(&input[0..FP_LEN])?;
    let x1 = fp_to_48(&input[FP_LEN..2 * FP_LEN])?;
    let y0 = fp_to_48(&input[2 * FP_LEN..3 * FP_LEN])?;
    let y1 = fp_to_48(&input[3 * FP_LEN..4 * FP_LEN])?;
    let mut affine = blst::blst_p2_affine::default();
    unsafe {
        blst::blst_fp_from_bendian(&mut affine.x.fp[0], x0.as_ptr());
        blst::blst_fp_from_bendian(&mut affine.x.fp[1], x1.as_ptr());
        blst::blst_fp_from_bendian(&mut affine.y.fp[0], y0.as_ptr());
        blst::blst_fp_from_bendian(&mut affine.y.fp[1], y1.as_ptr());
    }
    if [x0, x1, y0, y1].iter().all(|f| *f == [0u8; 48]) {
        return Ok(affine);
    }
    let on_curve = unsafe { blst::blst_p2_affine_on_curve(&affine) };
    if !on_curve {
        return Err(Error::PrecompileError("G2 point not on curve".into()));
    }
    Ok(affine)
}

fn write_g2_affine(affine: &blst::blst_p2_affine) -> Bytes {
    let mut x0 = [0u8; 48];
    let mut x1 = [0u8; 48];
    let mut y0 = [0u8; 48];
    let mut y1 = [0u8; 48];
    unsafe {
        blst::blst_bendian_from_fp(x0.as_mut_ptr(), &affine.x.fp[0]);
        blst::blst_bendian_from_fp(x1.as_mut_ptr(), &affine.x.fp[1]);
        blst::blst_bendian_from_fp(y0.as_mut_ptr(), &affine.y.fp[0]);
        blst::blst_bendian_from_fp(y1.as_mut_ptr(), &affine.y.fp[1]);
    }
    let mut out = vec![0u8; G2_POINT_LEN];
    out[0..FP_LEN].copy_from_slice(&fp_from_48(&x0));
    out[FP_LEN..2 * FP_LEN].copy_from_slice(&fp_from_48(&x1));
    out[2 * FP_LEN..3 * FP_LEN].copy_from_slice(&fp_from_48(&y0));
    out[3 * FP_LEN..4 * FP_LEN].copy_from_slice(&fp_from_48(&y1));
    Bytes::from(out)
}

pub struct G1Add;
impl Precompile for G1Add {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        G1_ADD_GAS
    }
    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        if input.len() != 2 * G1_POINT_LEN {
            return Err(Error::PrecompileError("G1ADD expects two points".into()));
        }
        let a = read_g1_affine(&input[..G1_POINT_LEN])?;
        let b = read_g1_affine(&input[G1_POINT_LEN..])?;
        let mut out = blst::blst_p1::default();
        unsafe { blst::blst_p1_add_or_double_affine(&mut out, &a, &b) };
        let mut out_affine = blst::blst_p1_affine::default();
        unsafe { blst::blst_p1_to_affine(&mut out_affine, &out) };
        Ok(write_g1_affine(&out_affine))
    }
}

pub struct G1Msm;
impl Precompile for G1Msm {
    fn required_gas(&self, input: &[u8]) -> u64 {
        let pairs = (input.len() / (G1_POINT_LEN + SCALAR_LEN)) as u64;
        pairs * G1_MSM_GAS_PER_PAIR
    }
    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        let stride = G1_POINT_LEN + SCALAR_LEN;
        if input.is_empty() || input.len() % stride != 0 {
            return Err(Error::PrecompileError("G1MSM input misaligned".into()));
        }
        let mut acc = blst::blst_p1::default();
        for chunk in input.chunks(stride) {
            let point = read_g1_affine(&chunk[..G1_POINT_LEN])?;
            let scalar = &chunk[G1_POINT_LEN..];
            let mut term = blst::blst_p1::default();
            unsafe { blst::blst_p1_mult(&mut term, &point_to_proj(&point), scalar.as_ptr(), 256) };
            acc = term_add(acc, term);
        }
        let mut out_affine = blst::blst_p1_affine::default();
        unsafe { blst::blst_p1_to_affine(&mut out_affine, &acc) };
        Ok(write_g1_affine(&out_affine))
    }
}

fn point_to_proj(affine: &blst::blst_p1_affine) -> blst::blst_p1 {
    let mut proj = blst::blst_p1::default();
    unsafe { blst::blst_p1_from_affine(&mut proj, affine) };
    proj
}

fn term_add(a: blst::blst_p1, b: blst::blst_p1) -> blst::blst_p1 {
    let mut out = blst::blst_p1::default();
    unsafe { blst::blst_p1_add_or_double(&mut out, &a, &b) };
    out
}

pub struct G2Add;
impl Precompile for G2Add {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        G2_ADD_GAS
    }
    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        if input.len() != 2 * G2_POINT_LEN {
            return Err(Error::PrecompileError("G2ADD expects two points".into()));
        }
        let a = read_g2_affine(&input[..G2_POINT_LEN])?;
        let b = read_g2_affine(&input[G2_POINT_LEN..])?;
        let mut out = blst::blst_p2::default();
        unsafe { blst::blst_p2_add_or_double_affine(&mut out, &a, &b) };
        let mut out_affine = blst::blst_p2_affine::default();
        unsafe { blst::blst_p2_to_affine(&mut out_affine, &out) };
        Ok(write_g2_affine(&out_affine))
    }
}

pub struct G2Msm;
impl Precompile for G2Msm {
    fn required_gas(&self, input: &[u8]) -> u64 {
        let pairs = (input.len() / (G2_POINT_LEN + SCALAR_LEN)) as u64;
        pairs * G2_MSM_GAS_PER_PAIR
    }
    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        let stride = G2_POINT_LEN + SCALAR_LEN;
        if input.is_empty() || input.len() % stride != 0 {
            return Err(Error::PrecompileError("G2MSM input misaligned".into()));
        }
        let mut acc = blst::blst_p2::default();
        for chunk in input.chunks(stride) {
            let point = read_g2_affine(&chunk[..G2_POINT_LEN])?;
            let scalar = &chunk[G2_POINT_LEN..];
            let mut proj = blst::blst_p2::default();
            unsafe { blst::blst_p2_from_affine(&mut proj, &point) };
            let mut term = blst::blst_p2::default();
            unsafe { blst::blst_p2_mult(&mut term, &proj, scalar.as_ptr(), 256) };
            let mut next = blst::blst_p2::default();
            unsafe { blst::blst_p2_add_or_double(&mut next, &acc, &term) };
            acc = next;
        }
        let mut out_affine = blst::blst_p2_affine::default();
        unsafe { blst::blst_p2_to_affine(&mut out_affine, &acc) };
        Ok(write_g2_affine(&out_affine))
    }
}

pub struct PairingCheck;
impl Precompile for PairingCheck {
    fn required_gas(&self, input: &[u8]) -> u64 {
        let pairs = (input.len() / (G1_POINT_LEN + G2_POINT_LEN)) as u64;
        PAIRING_BASE_GAS + PAIRING_PER_PAIR_GAS * pairs
    }
    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        let stride = G1_POINT_LEN + G2_POINT_LEN;
        if input.is_empty() || input.len() % stride != 0 {
            return Err(Error::PrecompileError("pairing input misaligned".into()));
        }
        let mut acc = blst::blst_fp12::default();
        unsafe { blst::blst_fp12_one(&mut acc) };
        for (i, chunk) in input.chunks(stride).enumerate() {
            let g1 = read_g1_affine(&chunk[..G1_POINT_LEN])?;
            let g2 = read_g2_affine(&chunk[G1_POINT_LEN..])?;
            let mut miller = blst::blst_fp12::default();
            unsafe { blst::blst_miller_loop(&mut miller, &g2, &g1) };
            if i == 0 {
                acc = miller;
            } else {
                let mut next = blst::blst_fp12::default();
                unsafe { blst::blst_fp12_mul(&mut next, &acc, &miller) };
                acc = next;
            }
        }
        let mut final_exp = blst::blst_fp12::default();
        unsafe { blst::blst_final_exp(&mut final_exp, &acc) };
        let success = unsafe { blst::blst_fp12_is_one(&final_exp) };
        let mut out = [0u8; 32];
        if success {
            out[31] = 1;
        }
        Ok(Bytes::copy_from_slice(&out))
    }
}

pub struct MapFpToG1;
impl Precompile for MapFpToG1 {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        MAP_FP_TO_G1_GAS
    }
    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        let fp_bytes = fp_to_48(input)?;
        let mut fp = blst::blst_fp::default();
        unsafe { blst::blst_fp_from_bendian(&mut fp, fp_bytes.as_ptr()) };
        let mut point = blst::blst_p1::default();
        unsafe { blst::blst_map_to_g1(&mut point, &fp, core::ptr::null()) };
        let mut affine = blst::blst_p1_affine::default();
        unsafe { blst::blst_p1_to_affine(&mut affine, &point) };
        Ok(write_g1_affine(&affine))
    }
}

pub struct MapFp2ToG2;
impl Precompile for MapFp2ToG2 {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        MAP_FP2_TO_G2_GAS
    }
    fn run(&self, input: &[u8]) -> EvmResult<Bytes> {
        if input.len() != FP2_LEN {
            return Err(Error::PrecompileError("MAP_FP2_TO_G2 expects one Fp2".into()));
        }
        let c0 = fp_to_48(&input[..FP_LEN])?;
        let c1 = fp_to_48(&input[FP_LEN..])?;
        let mut fp2 = blst::blst_fp2::default();
        unsafe {
            blst::blst_fp_from_bendian(&mut fp2.fp[0], c0.as_ptr());
            blst::blst_fp_from_bendian(&mut fp2.fp[1], c1.as_ptr());
        }
        let mut point = blst::blst_p2::default();
        unsafe { blst::blst_map_to_g2(&mut point, &fp2, core::ptr::null()) };
        let mut affine = blst::blst_p2_affine::default();
        unsafe { blst::blst_p2_to_affine(&mut affine, &point) };
        Ok(write_g2_affine(&affine))
    }
}

/// Placeholder for any reserved address in `0x0b..=0x12` this crate
/// doesn't assign to a real operation.
pub struct Unsupported;
impl Precompile for Unsupported {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        0
    }
    fn run(&self, _input: &[u8]) -> EvmResult<Bytes> {
        Err(Error::PrecompileError("unassigned BLS12-381 precompile address".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn g1_add_of_infinities_is_infinity() {
        let input = [0u8; 2 * G1_POINT_LEN];
        let out = G1Add.run(&input).unwrap();
        assert_eq!(out.as_ref(), &[0u8; G1_POINT_LEN]);
    }

    #[test]
    fn g2_add_of_infinities_is_infinity() {
        let input = [0u8; 2 * G2_POINT_LEN];
        let out = G2Add.run(&input).unwrap();
        assert_eq!(out.as_ref(), &[0u8; G2_POINT_LEN]);
    }

    #[test]
    fn g1_add_rejects_wrong_length() {
        assert!(G1Add.run(&[0u8; 10]).is_err());
    }

    #[test]
    fn pairing_of_empty_input_is_true() {
        let out = PairingCheck.run(&[]).unwrap();
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(out.as_ref(), &expected);
    }

    #[test]
    fn fp_padding_must_be_zero() {
        let mut bad = [0u8; FP_LEN];
        bad[0] = 1; // non-zero in the mandatory padding region
        assert!(fp_to_48(&bad).is_err());
    }

    #[test]
    fn lookup_rejects_unassigned_address() {
        assert!(lookup(0x12).run(&[]).is_err());
    }
}
