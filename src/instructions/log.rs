//! `LOG0`..`LOG4` (spec.md §4.G, §6.1 "log emission").
//!
//! Has no direct teacher counterpart; built against
//! [`crate::host::WorldState::emit_log`].

use super::word_to_usize;
use crate::call::CallEngine;
use crate::error::{Error, EvmResult};
use crate::gas::constants::{LOG_DATA_BYTE, LOG_TOPIC};
use crate::host::Log;
use crate::interpreter::{Action, Interpreter};
use crate::primitives::Hash;

fn log_n(interp: &mut Interpreter, engine: &mut CallEngine<'_>, topic_count: usize) -> EvmResult<Action> {
    if interp.contract.read_only {
        return Err(Error::WriteProtection);
    }
    let offset = word_to_usize(interp.stack.pop()?)?;
    let len = word_to_usize(interp.stack.pop()?)?;
    let mut topics = Vec::with_capacity(topic_count);
    for _ in 0..topic_count {
        let t = interp.stack.pop()?;
        topics.push(Hash::from_slice(&t.to_big_endian()));
    }
    let data = interp.memory.get_copy(offset, len);
    engine.host.emit_log(Log { address: interp.contract.address, topics, data: data.into() });
    Ok(Action::Continue)
}

fn log_n_dynamic_gas(interp: &mut Interpreter, topic_count: u64) -> EvmResult<u64> {
    let offset = word_to_usize(*interp.stack.back(0)?)?;
    let len = word_to_usize(*interp.stack.back(1)?)?;
    let expansion = interp.memory.expansion_cost(offset.saturating_add(len))?;
    Ok(expansion + topic_count * LOG_TOPIC + len as u64 * LOG_DATA_BYTE)
}

pub fn log0(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    log_n(interp, engine, 0)
}
pub fn log0_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    log_n_dynamic_gas(interp, 0)
}

pub fn log1(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    log_n(interp, engine, 1)
}
pub fn log1_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    log_n_dynamic_gas(interp, 1)
}

pub fn log2(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    log_n(interp, engine, 2)
}
pub fn log2_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    log_n_dynamic_gas(interp, 2)
}

pub fn log3(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    log_n(interp, engine, 3)
}
pub fn log3_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    log_n_dynamic_gas(interp, 3)
}

pub fn log4(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    log_n(interp, engine, 4)
}
pub fn log4_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    log_n_dynamic_gas(interp, 4)
}
