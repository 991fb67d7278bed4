//! Arithmetic handlers (spec.md §4.A/§4.G): `ADD`..`SIGNEXTEND`, `EXP`.
//!
//! Generalizes the teacher's lone `op_add` (`operations.rs`) — which reads
//! two `U256`s off `Machine.stack` and pushes their wrapping sum — into the
//! full arithmetic group, each following the same pop/pop/push shape.

use super::{binop, ternop};
use crate::call::CallEngine;
use crate::error::EvmResult;
use crate::interpreter::{Action, Interpreter};
use crate::primitives::word;

pub fn add(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, |a, b| a.overflowing_add(b).0)
}

pub fn mul(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, |a, b| a.overflowing_mul(b).0)
}

pub fn sub(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, |a, b| a.overflowing_sub(b).0)
}

pub fn div(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, |a, b| if b.is_zero() { b } else { a / b })
}

pub fn sdiv(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, word::sdiv)
}

pub fn rem(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, |a, b| if b.is_zero() { b } else { a % b })
}

pub fn smod(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, word::smod)
}

pub fn addmod(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    ternop(interp, word::addmod)
}

pub fn mulmod(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    ternop(interp, word::mulmod)
}

pub fn exp(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, word::exp)
}

pub fn exp_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let exponent = *interp.stack.back(1)?;
    let per_byte = if interp.rules.is_spurious_dragon() {
        crate::gas::constants::EXP_BYTE_SPURIOUS_DRAGON
    } else {
        crate::gas::constants::EXP_BYTE_FRONTIER
    };
    Ok(per_byte * word::exponent_byte_len(exponent))
}

pub fn signextend(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, word::sign_extend)
}
