//! Bitwise and shift handlers (spec.md §4.A/§4.G): `AND`..`BYTE`,
//! `SHL`/`SHR`/`SAR`, `CLZ`.

use super::{binop, unop};
use crate::call::CallEngine;
use crate::error::EvmResult;
use crate::interpreter::{Action, Interpreter};
use crate::primitives::word;

pub fn and(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, |a, b| a & b)
}

pub fn or(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, |a, b| a | b)
}

pub fn xor(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, |a, b| a ^ b)
}

pub fn not(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    unop(interp, |a| !a)
}

pub fn byte(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, word::byte)
}

pub fn shl(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, word::shl)
}

pub fn shr(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, word::shr)
}

pub fn sar(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, word::sar)
}

/// `CLZ` (EIP-7939, Prague+).
pub fn clz(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    unop(interp, word::clz)
}
