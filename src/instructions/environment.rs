//! Environment/account-introspection handlers (spec.md §4.G): `ADDRESS`,
//! `BALANCE`, `ORIGIN`, `CALLER`, `CALLVALUE`, `CALLDATA*`, `CODESIZE`,
//! `CODECOPY`, `GASPRICE`, `EXTCODE*`, `RETURNDATA*`, `CHAINID`,
//! `SELFBALANCE`, `GAS`, `KECCAK256`.
//!
//! Has no direct teacher counterpart (`Machine` carried a fixed `Context`
//! struct with no opcode-level accessors); built directly against
//! [`crate::frame::Contract`] and [`crate::host::Host`].

use super::word_to_usize;
use crate::call::CallEngine;
use crate::error::{Error, EvmResult};
use crate::gas::{self, constants::COPY_WORD};
use crate::interpreter::{Action, Interpreter};
use crate::memory::num_words;
use crate::primitives::{address_to_word, word_to_address, Word};

/// Copies `len` bytes starting at `src_offset` out of `source`, zero-padding
/// past its end — the shared semantics of `CALLDATACOPY`/`CODECOPY`/
/// `EXTCODECOPY` (spec.md §4.G, "reads past the end ... as zeroes").
fn padded_slice(source: &[u8], src_offset: usize, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    if src_offset >= source.len() {
        return out;
    }
    let avail = (source.len() - src_offset).min(len);
    out[..avail].copy_from_slice(&source[src_offset..src_offset + avail]);
    out
}

pub fn address(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(address_to_word(interp.contract.address))?;
    Ok(Action::Continue)
}

pub fn balance(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let addr = word_to_address(interp.stack.pop()?);
    let value = engine.host.balance(addr);
    interp.stack.push(value)?;
    Ok(Action::Continue)
}

pub fn balance_dynamic_gas(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<u64> {
    let addr = word_to_address(*interp.stack.back(0)?);
    let already_warm = engine.host.mark_address_warm(addr);
    Ok(gas::account_access_cost(interp.rules, already_warm))
}

pub fn origin(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let addr = engine.host.origin();
    interp.stack.push(address_to_word(addr))?;
    Ok(Action::Continue)
}

pub fn caller(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(address_to_word(interp.contract.caller))?;
    Ok(Action::Continue)
}

pub fn callvalue(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let value = interp.contract.value;
    interp.stack.push(value)?;
    Ok(Action::Continue)
}

pub fn calldataload(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let offset = word_to_usize(interp.stack.pop()?)?;
    let bytes = padded_slice(&interp.contract.input, offset, 32);
    interp.stack.push(Word::from_big_endian(&bytes))?;
    Ok(Action::Continue)
}

pub fn calldatasize(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(Word::from(interp.contract.input.len() as u64))?;
    Ok(Action::Continue)
}

pub fn calldatacopy(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let dst = word_to_usize(interp.stack.pop()?)?;
    let src = word_to_usize(interp.stack.pop()?)?;
    let len = word_to_usize(interp.stack.pop()?)?;
    let bytes = padded_slice(&interp.contract.input, src, len);
    interp.memory.set(dst, &bytes)?;
    Ok(Action::Continue)
}

pub fn calldatacopy_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let dst = word_to_usize(*interp.stack.back(0)?)?;
    let len = word_to_usize(*interp.stack.back(2)?)?;
    let expansion = interp.memory.expansion_cost(dst.saturating_add(len))?;
    Ok(expansion + num_words(len) * COPY_WORD)
}

pub fn codesize(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(Word::from(interp.contract.code.len() as u64))?;
    Ok(Action::Continue)
}

pub fn codecopy(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let dst = word_to_usize(interp.stack.pop()?)?;
    let src = word_to_usize(interp.stack.pop()?)?;
    let len = word_to_usize(interp.stack.pop()?)?;
    let bytes = padded_slice(&interp.contract.code, src, len);
    interp.memory.set(dst, &bytes)?;
    Ok(Action::Continue)
}

pub fn codecopy_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let dst = word_to_usize(*interp.stack.back(0)?)?;
    let len = word_to_usize(*interp.stack.back(2)?)?;
    let expansion = interp.memory.expansion_cost(dst.saturating_add(len))?;
    Ok(expansion + num_words(len) * COPY_WORD)
}

pub fn gasprice(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(engine.host.gas_price())?;
    Ok(Action::Continue)
}

pub fn extcodesize(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let addr = word_to_address(interp.stack.pop()?);
    let size = engine.host.code_size(addr);
    interp.stack.push(Word::from(size as u64))?;
    Ok(Action::Continue)
}

pub fn extcodesize_dynamic_gas(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<u64> {
    let addr = word_to_address(*interp.stack.back(0)?);
    let already_warm = engine.host.mark_address_warm(addr);
    Ok(gas::account_access_cost(interp.rules, already_warm))
}

pub fn extcodecopy(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let addr = word_to_address(interp.stack.pop()?);
    let dst = word_to_usize(interp.stack.pop()?)?;
    let src = word_to_usize(interp.stack.pop()?)?;
    let len = word_to_usize(interp.stack.pop()?)?;
    let code = engine.host.code(addr);
    let bytes = padded_slice(&code, src, len);
    interp.memory.set(dst, &bytes)?;
    Ok(Action::Continue)
}

pub fn extcodecopy_dynamic_gas(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<u64> {
    let addr = word_to_address(*interp.stack.back(0)?);
    let dst = word_to_usize(*interp.stack.back(1)?)?;
    let len = word_to_usize(*interp.stack.back(3)?)?;
    let already_warm = engine.host.mark_address_warm(addr);
    let access = gas::account_access_cost(interp.rules, already_warm);
    let expansion = interp.memory.expansion_cost(dst.saturating_add(len))?;
    Ok(access + expansion + num_words(len) * COPY_WORD)
}

pub fn returndatasize(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(Word::from(interp.return_data.len() as u64))?;
    Ok(Action::Continue)
}

pub fn returndatacopy(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let dst = word_to_usize(interp.stack.pop()?)?;
    let src = word_to_usize(interp.stack.pop()?)?;
    let len = word_to_usize(interp.stack.pop()?)?;
    let end = src.checked_add(len).ok_or(Error::ReturnDataOutOfBounds)?;
    if end > interp.return_data.len() {
        return Err(Error::ReturnDataOutOfBounds);
    }
    let bytes = interp.return_data[src..end].to_vec();
    interp.memory.set(dst, &bytes)?;
    Ok(Action::Continue)
}

pub fn returndatacopy_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let dst = word_to_usize(*interp.stack.back(0)?)?;
    let len = word_to_usize(*interp.stack.back(2)?)?;
    let expansion = interp.memory.expansion_cost(dst.saturating_add(len))?;
    Ok(expansion + num_words(len) * COPY_WORD)
}

pub fn extcodehash(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let addr = word_to_address(interp.stack.pop()?);
    let hash = if engine.host.account_exists(addr) && !engine.host.account_is_empty(addr) {
        engine.host.code_hash(addr)
    } else {
        crate::primitives::Hash::zero()
    };
    interp.stack.push(Word::from_big_endian(hash.as_bytes()))?;
    Ok(Action::Continue)
}

pub fn extcodehash_dynamic_gas(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<u64> {
    let addr = word_to_address(*interp.stack.back(0)?);
    let already_warm = engine.host.mark_address_warm(addr);
    Ok(gas::account_access_cost(interp.rules, already_warm))
}

pub fn chainid(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(Word::from(engine.host.chain_id()))?;
    Ok(Action::Continue)
}

pub fn selfbalance(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let value = engine.host.balance(interp.contract.address);
    interp.stack.push(value)?;
    Ok(Action::Continue)
}

pub fn gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(Word::from(interp.gas_remaining))?;
    Ok(Action::Continue)
}

/// `KECCAK256` (spec.md §4.G: "reads memory slice, charges `30 + 6*words`").
pub fn keccak256(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let offset = word_to_usize(interp.stack.pop()?)?;
    let len = word_to_usize(interp.stack.pop()?)?;
    let bytes = interp.memory.get_copy(offset, len);
    let digest = crate::primitives::keccak256(&bytes);
    interp.stack.push(Word::from_big_endian(digest.as_bytes()))?;
    Ok(Action::Continue)
}

pub fn keccak256_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let offset = word_to_usize(*interp.stack.back(0)?)?;
    let len = word_to_usize(*interp.stack.back(1)?)?;
    let expansion = interp.memory.expansion_cost(offset.saturating_add(len))?;
    Ok(expansion + num_words(len) * crate::gas::constants::KECCAK256_WORD)
}
