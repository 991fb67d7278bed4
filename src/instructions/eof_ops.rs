//! EOF-only data/sub-container opcodes (spec.md §4.G, §4.H): `DATALOAD`,
//! `DATALOADN`, `DATASIZE`, `DATACOPY`, `EOFCREATE`, `RETURNCONTRACT`,
//! `EXTCALL`, `EXTDELEGATECALL`, `EXTSTATICCALL`.
//!
//! Has no teacher counterpart; built against [`crate::eof::EofContainer`]
//! and reusing [`crate::call::CallEngine`]'s call/create protocol the same
//! way [`super::system`] does.

use super::system::apply_create_result;
use super::word_to_usize;
use crate::call::CallEngine;
use crate::error::{Error, EvmResult};
use crate::gas::{self, constants::COPY_WORD};
use crate::interpreter::{Action, Interpreter};
use crate::memory::num_words;
use crate::primitives::{word_to_address, Bytes, Word};

fn data_section(interp: &Interpreter) -> &[u8] {
    interp.contract.eof.as_ref().map(|eof| eof.data_section.as_ref()).unwrap_or(&[])
}

/// Shared zero-padded read, matching `CALLDATALOAD`/`CODECOPY`'s "reads
/// past the end are zeroes" convention (spec.md §4.G).
fn padded_slice(source: &[u8], offset: usize, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    if offset >= source.len() {
        return out;
    }
    let avail = (source.len() - offset).min(len);
    out[..avail].copy_from_slice(&source[offset..offset + avail]);
    out
}

pub fn dataload(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let offset = word_to_usize(interp.stack.pop()?)?;
    let bytes = padded_slice(data_section(interp), offset, 32);
    interp.stack.push(Word::from_big_endian(&bytes))?;
    Ok(Action::Continue)
}

/// `DATALOADN`'s offset is a validated immediate, not a popped operand
/// (spec.md §4.H step 4: "`DATALOADN` offset + 32 ≤ data size").
pub fn dataloadn(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let hi = interp.current_code()[interp.pc + 1];
    let lo = interp.current_code()[interp.pc + 2];
    let offset = u16::from_be_bytes([hi, lo]) as usize;
    let bytes = padded_slice(data_section(interp), offset, 32);
    interp.stack.push(Word::from_big_endian(&bytes))?;
    Ok(Action::Continue)
}

/// Declared data-section size (spec.md §3 "data_size_declared"), not the
/// length of bytes actually present — the two can differ for an
/// in-progress `EOFCREATE` init container whose aux data hasn't landed yet.
pub fn datasize(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let size = interp.contract.eof.as_ref().map(|eof| eof.data_size_declared).unwrap_or(0);
    interp.stack.push(Word::from(size as u64))?;
    Ok(Action::Continue)
}

pub fn datacopy(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let mem_offset = word_to_usize(interp.stack.pop()?)?;
    let data_offset = word_to_usize(interp.stack.pop()?)?;
    let len = word_to_usize(interp.stack.pop()?)?;
    let bytes = padded_slice(data_section(interp), data_offset, len);
    interp.memory.set(mem_offset, &bytes)?;
    Ok(Action::Continue)
}

/// `30 + 3*words`-style: memory expansion plus `3` gas per 32-byte word
/// copied (spec.md §4.G: "`DATACOPY` charge 3 gas per 32-byte word copied,
/// plus memory expansion").
pub fn datacopy_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let mem_offset = word_to_usize(*interp.stack.back(0)?)?;
    let len = word_to_usize(*interp.stack.back(2)?)?;
    let expansion = interp.memory.expansion_cost(mem_offset.saturating_add(len))?;
    Ok(expansion + num_words(len) * COPY_WORD)
}

/// `EOFCREATE` (EIP-7620): deploys the `container_index`-th sub-container,
/// addressed the same way as `CREATE2` but hashing the sub-container bytes
/// instead of caller-supplied init code (spec.md §4.K: "for EOFCREATE:
/// same as CREATE2 but over the sub-container bytes").
pub fn eofcreate(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    if interp.contract.read_only {
        return Err(Error::WriteProtection);
    }
    let container_index = interp.current_code()[interp.pc + 1] as usize;
    let value = interp.stack.pop()?;
    let salt = interp.stack.pop()?;
    let input_offset = word_to_usize(interp.stack.pop()?)?;
    let input_size = word_to_usize(interp.stack.pop()?)?;

    let sub_container = interp
        .contract
        .eof
        .as_ref()
        .and_then(|eof| eof.container_sections.get(container_index))
        .cloned()
        .ok_or_else(|| Error::UndefinedInstruction(interp.current_op()))?;

    let input = Bytes::copy_from_slice(&interp.memory.get_copy(input_offset, input_size));
    let mut init_code = sub_container.to_vec();
    init_code.extend_from_slice(&input);

    let gas_to_forward = gas::call_gas_forwarded(interp.gas_remaining, interp.gas_remaining);
    interp.gas_remaining -= gas_to_forward;

    let caller = interp.contract.address;
    let result = engine.create2(caller, Bytes::from(init_code), gas_to_forward, value, salt);
    apply_create_result(interp, result)
}

/// Mirrors `create2_dynamic_gas`: memory expansion for the popped input
/// range plus the keccak cost of hashing sub-container bytes + input.
pub fn eofcreate_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let input_offset = word_to_usize(*interp.stack.back(2)?)?;
    let input_size = word_to_usize(*interp.stack.back(3)?)?;
    let expansion = interp.memory.expansion_cost(input_offset.saturating_add(input_size))?;
    let container_index = interp.current_code()[interp.pc + 1] as usize;
    let container_len = interp
        .contract
        .eof
        .as_ref()
        .and_then(|eof| eof.container_sections.get(container_index))
        .map(|c| c.len())
        .unwrap_or(0);
    let hash_cost = num_words(container_len + input_size) * crate::gas::constants::KECCAK256_WORD;
    Ok(expansion + hash_cost)
}

/// `RETURNCONTRACT` (EIP-7620): halts the running init-container, deploying
/// the `deploy_container_index`-th sub-container with the popped auxiliary
/// data appended to its tail (spec.md §4.H "sub-containers for EOFCREATE").
pub fn returncontract(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let deploy_index = interp.current_code()[interp.pc + 1] as usize;
    let aux_offset = word_to_usize(interp.stack.pop()?)?;
    let aux_size = word_to_usize(interp.stack.pop()?)?;
    let aux_data = interp.memory.get_copy(aux_offset, aux_size);

    let sub_container = interp
        .contract
        .eof
        .as_ref()
        .and_then(|eof| eof.container_sections.get(deploy_index))
        .cloned()
        .ok_or_else(|| Error::UndefinedInstruction(interp.current_op()))?;

    let mut deployed = sub_container.to_vec();
    deployed.extend_from_slice(&aux_data);
    Ok(Action::Halt(Bytes::from(deployed)))
}

pub fn returncontract_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let aux_offset = word_to_usize(*interp.stack.back(0)?)?;
    let aux_size = word_to_usize(*interp.stack.back(1)?)?;
    interp.memory.expansion_cost(aux_offset.saturating_add(aux_size))
}

/// `EXTCALL` (EIP-7069): `CALL`'s EOF-only replacement — no gas operand
/// (the 63/64 rule always applies, there is no caller-chosen cap), and a
/// 3-way status code instead of a boolean (0 success, 1 revert, 2 failure).
pub fn extcall(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let target = word_to_address(interp.stack.pop()?);
    let input_offset = word_to_usize(interp.stack.pop()?)?;
    let input_size = word_to_usize(interp.stack.pop()?)?;
    let value = interp.stack.pop()?;

    if interp.contract.read_only && !value.is_zero() {
        return Err(Error::WriteProtection);
    }

    let input = Bytes::copy_from_slice(&interp.memory.get_copy(input_offset, input_size));
    let gas_to_forward = gas::call_gas_forwarded(interp.gas_remaining, interp.gas_remaining);
    interp.gas_remaining -= gas_to_forward;

    let caller = interp.contract.address;
    let result = engine.call(caller, target, input, gas_to_forward, value, interp.contract.read_only);
    apply_ext_call_result(interp, result)
}

pub fn extcall_dynamic_gas(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<u64> {
    let target = word_to_address(*interp.stack.back(0)?);
    let value = *interp.stack.back(3)?;
    let already_warm = engine.host.mark_address_warm(target);
    let mut cost = gas::access_cost(already_warm);
    if !value.is_zero() {
        cost += crate::gas::constants::CALL_VALUE_TRANSFER;
        if !engine.host.account_exists(target) {
            cost += crate::gas::constants::CALL_NEW_ACCOUNT;
        }
    }
    Ok(cost)
}

pub fn extdelegatecall(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let target = word_to_address(interp.stack.pop()?);
    let input_offset = word_to_usize(interp.stack.pop()?)?;
    let input_size = word_to_usize(interp.stack.pop()?)?;

    let input = Bytes::copy_from_slice(&interp.memory.get_copy(input_offset, input_size));
    let gas_to_forward = gas::call_gas_forwarded(interp.gas_remaining, interp.gas_remaining);
    interp.gas_remaining -= gas_to_forward;

    let result = engine.delegate_call(
        interp.contract.caller,
        interp.contract.address,
        interp.contract.value,
        target,
        input,
        gas_to_forward,
        interp.contract.read_only,
    );
    apply_ext_call_result(interp, result)
}

pub fn extdelegatecall_dynamic_gas(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<u64> {
    let target = word_to_address(*interp.stack.back(0)?);
    let already_warm = engine.host.mark_address_warm(target);
    Ok(gas::access_cost(already_warm))
}

pub fn extstaticcall(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let target = word_to_address(interp.stack.pop()?);
    let input_offset = word_to_usize(interp.stack.pop()?)?;
    let input_size = word_to_usize(interp.stack.pop()?)?;

    let input = Bytes::copy_from_slice(&interp.memory.get_copy(input_offset, input_size));
    let gas_to_forward = gas::call_gas_forwarded(interp.gas_remaining, interp.gas_remaining);
    interp.gas_remaining -= gas_to_forward;

    let caller = interp.contract.address;
    let result = engine.static_call(caller, target, input, gas_to_forward);
    apply_ext_call_result(interp, result)
}

pub fn extstaticcall_dynamic_gas(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<u64> {
    let target = word_to_address(*interp.stack.back(0)?);
    let already_warm = engine.host.mark_address_warm(target);
    Ok(gas::access_cost(already_warm))
}

/// Shared result handling for the `EXT*CALL` family's 3-way status code
/// (EIP-7069), in place of `CALL`-family's boolean success flag.
fn apply_ext_call_result(interp: &mut Interpreter, result: crate::call::CallResult) -> EvmResult<Action> {
    interp.gas_remaining = interp.gas_remaining.saturating_add(result.gas_left);
    let status = if result.error.is_some() {
        2u64
    } else if result.reverted {
        1u64
    } else {
        0u64
    };
    interp.return_data = result.output;
    interp.stack.push(Word::from(status))?;
    Ok(Action::Continue)
}
