//! Memory handlers (spec.md §4.C/§4.G): `MLOAD`, `MSTORE`, `MSTORE8`,
//! `MSIZE`, `MCOPY`.
//!
//! Has no direct teacher counterpart (`Machine.memory` was a read-only
//! snapshot); built from spec.md's memory-expansion prose directly, reusing
//! [`crate::memory::Memory`]'s cached-cost accounting.

use super::word_to_usize;
use crate::call::CallEngine;
use crate::error::EvmResult;
use crate::gas::constants::COPY_WORD;
use crate::interpreter::{Action, Interpreter};
use crate::primitives::Word;

pub fn mload(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let offset = word_to_usize(interp.stack.pop()?)?;
    let bytes = interp.memory.get_copy(offset, 32);
    interp.stack.push(Word::from_big_endian(&bytes))?;
    Ok(Action::Continue)
}

pub fn mload_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let offset = word_to_usize(*interp.stack.back(0)?)?;
    interp.memory.expansion_cost(offset.saturating_add(32))
}

pub fn mstore(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let offset = word_to_usize(interp.stack.pop()?)?;
    let value = interp.stack.pop()?;
    interp.memory.set32(offset, value)?;
    Ok(Action::Continue)
}

pub fn mstore_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let offset = word_to_usize(*interp.stack.back(1)?)?;
    interp.memory.expansion_cost(offset.saturating_add(32))
}

pub fn mstore8(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let offset = word_to_usize(interp.stack.pop()?)?;
    let value = interp.stack.pop()?;
    let byte = value.byte(0);
    interp.memory.set(offset, &[byte])?;
    Ok(Action::Continue)
}

pub fn mstore8_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let offset = word_to_usize(*interp.stack.back(1)?)?;
    interp.memory.expansion_cost(offset.saturating_add(1))
}

pub fn msize(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(Word::from(interp.memory.len() as u64))?;
    Ok(Action::Continue)
}

/// `MCOPY` (EIP-5656, Cancun+): `dst`, `src`, `len` with `dst` the deepest
/// operand.
pub fn mcopy(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let dst = word_to_usize(interp.stack.pop()?)?;
    let src = word_to_usize(interp.stack.pop()?)?;
    let len = word_to_usize(interp.stack.pop()?)?;
    interp.memory.copy(dst, src, len)?;
    Ok(Action::Continue)
}

pub fn mcopy_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let dst = word_to_usize(*interp.stack.back(0)?)?;
    let src = word_to_usize(*interp.stack.back(1)?)?;
    let len = word_to_usize(*interp.stack.back(2)?)?;
    let expansion = interp.memory.expansion_cost(dst.max(src).saturating_add(len))?;
    let words = crate::memory::num_words(len);
    Ok(expansion + words * COPY_WORD)
}
