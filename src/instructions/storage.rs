//! Storage handlers (spec.md §4.D/§4.E/§4.G): `SLOAD`, `SSTORE`, `TLOAD`,
//! `TSTORE`.
//!
//! Has no direct teacher counterpart (`WorldStateTrie` is a persistent
//! Merkle store, out of scope here); built directly against
//! [`crate::host::WorldState`] and [`crate::gas::sstore`].

use crate::call::CallEngine;
use crate::error::{Error, EvmResult};
use crate::gas::{self, sstore};
use crate::interpreter::{Action, Interpreter};

pub fn sload(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let key = interp.stack.pop()?;
    let address = interp.contract.address;
    let value = engine.host.storage(address, key);
    interp.stack.push(value)?;
    Ok(Action::Continue)
}

pub fn sload_dynamic_gas(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<u64> {
    let key = *interp.stack.back(0)?;
    let address = interp.contract.address;
    let already_warm = engine.host.mark_storage_warm(address, key);
    Ok(gas::storage_access_cost(interp.rules, already_warm))
}

pub fn sstore(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    if interp.contract.read_only {
        return Err(Error::WriteProtection);
    }
    let key = interp.stack.pop()?;
    let value = interp.stack.pop()?;
    let address = interp.contract.address;
    engine.host.set_storage(address, key, value);
    Ok(Action::Continue)
}

pub fn sstore_dynamic_gas(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<u64> {
    if !sstore::sstore_sentry_ok(interp.rules, interp.gas_remaining) {
        return Err(Error::OutOfGas);
    }
    let key = *interp.stack.back(0)?;
    let new = *interp.stack.back(1)?;
    let address = interp.contract.address;
    let already_warm = engine.host.mark_storage_warm(address, key);
    let current = engine.host.storage(address, key);
    let original = engine.host.storage_committed(address, key);
    let result = sstore::sstore_cost(interp.rules, already_warm, current, original, new);
    match result.refund {
        sstore::RefundDelta::Add(amount) => engine.host.add_refund(amount),
        sstore::RefundDelta::Sub(amount) => engine.host.sub_refund(amount),
        sstore::RefundDelta::None => {}
    }
    Ok(result.gas_cost)
}

pub fn tload(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let key = interp.stack.pop()?;
    let address = interp.contract.address;
    let value = engine.host.transient_storage(address, key);
    interp.stack.push(value)?;
    Ok(Action::Continue)
}

pub fn tstore(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    if interp.contract.read_only {
        return Err(Error::WriteProtection);
    }
    let key = interp.stack.pop()?;
    let value = interp.stack.pop()?;
    let address = interp.contract.address;
    engine.host.set_transient_storage(address, key, value);
    Ok(Action::Continue)
}
