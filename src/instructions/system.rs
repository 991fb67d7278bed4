//! `CALL`/`CALLCODE`/`DELEGATECALL`/`STATICCALL`/`CREATE`/`CREATE2`/
//! `SELFDESTRUCT` (spec.md §4.G, §4.K).
//!
//! The teacher's `vm.rs::Evm::evm_call` sketches the depth/snapshot shape
//! but stops at `todo!()` for the actual sub-call; these handlers are the
//! opcode-level callers of the completed protocol in
//! [`crate::call::CallEngine`].

use super::{bool_word, word_to_usize};
use crate::call::{CallEngine, CallResult};
use crate::error::{Error, EvmResult};
use crate::gas::{self, constants};
use crate::interpreter::{Action, Interpreter};
use crate::memory::num_words;
use crate::primitives::{word_to_address, Bytes, Word};

/// Stack-popped "gas" operands are full 256-bit words; anything beyond
/// `u64::MAX` is clamped rather than rejected (no real frame ever has that
/// much gas available, so the clamp is unobservable).
fn word_to_gas(w: Word) -> u64 {
    if w > Word::from(u64::MAX) {
        u64::MAX
    } else {
        w.as_u64()
    }
}

/// `BALANCE`-style access-list cost, but keyed to `CALL`'s own pre-Berlin
/// flat rate (`40`, distinct from `BALANCE`'s `20`/`700` — spec.md §4.E).
fn call_access_cost(rules: crate::chain_rules::ChainRules, already_warm: bool) -> u64 {
    if rules.is_berlin() {
        gas::access_cost(already_warm)
    } else if rules.is_tangerine_whistle() {
        constants::ACCOUNT_ACCESS_TANGERINE
    } else {
        constants::CALL_BASE
    }
}

fn memory_expansion_for_call(
    interp: &mut Interpreter,
    args_offset: usize,
    args_len: usize,
    ret_offset: usize,
    ret_len: usize,
) -> EvmResult<u64> {
    let args_end = args_offset.saturating_add(args_len);
    let ret_end = ret_offset.saturating_add(ret_len);
    interp.memory.expansion_cost(args_end.max(ret_end))
}

/// Writes the sub-call's output into the caller's return-data buffer and
/// requested memory range, and pushes the success flag (spec.md §4.K step 7).
fn apply_call_result(interp: &mut Interpreter, result: CallResult, ret_offset: usize, ret_len: usize) -> EvmResult<Action> {
    interp.gas_remaining = interp.gas_remaining.saturating_add(result.gas_left);
    let success = result.error.is_none();
    let copy_len = ret_len.min(result.output.len());
    interp.memory.set(ret_offset, &result.output[..copy_len])?;
    interp.return_data = result.output;
    interp.stack.push(bool_word(success))?;
    Ok(Action::Continue)
}

pub fn call(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let gas_requested = word_to_gas(interp.stack.pop()?);
    let target = word_to_address(interp.stack.pop()?);
    let value = interp.stack.pop()?;
    let args_offset = word_to_usize(interp.stack.pop()?)?;
    let args_len = word_to_usize(interp.stack.pop()?)?;
    let ret_offset = word_to_usize(interp.stack.pop()?)?;
    let ret_len = word_to_usize(interp.stack.pop()?)?;

    if interp.contract.read_only && !value.is_zero() {
        return Err(Error::WriteProtection);
    }

    let input = Bytes::copy_from_slice(&interp.memory.get_copy(args_offset, args_len));
    let capped = gas::call_gas_forwarded(gas_requested, interp.gas_remaining);
    interp.gas_remaining -= capped;
    let gas_to_callee = if value.is_zero() { capped } else { capped + constants::CALL_STIPEND };

    let caller = interp.contract.address;
    let result = engine.call(caller, target, input, gas_to_callee, value, interp.contract.read_only);
    apply_call_result(interp, result, ret_offset, ret_len)
}

pub fn call_dynamic_gas(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<u64> {
    let target = word_to_address(*interp.stack.back(1)?);
    let value = *interp.stack.back(2)?;
    let args_offset = word_to_usize(*interp.stack.back(3)?)?;
    let args_len = word_to_usize(*interp.stack.back(4)?)?;
    let ret_offset = word_to_usize(*interp.stack.back(5)?)?;
    let ret_len = word_to_usize(*interp.stack.back(6)?)?;

    let expansion = memory_expansion_for_call(interp, args_offset, args_len, ret_offset, ret_len)?;
    let already_warm = engine.host.mark_address_warm(target);
    let mut cost = expansion + call_access_cost(interp.rules, already_warm);
    if !value.is_zero() {
        cost += constants::CALL_VALUE_TRANSFER;
        if !engine.host.account_exists(target) {
            cost += constants::CALL_NEW_ACCOUNT;
        }
    }
    Ok(cost)
}

pub fn callcode(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let gas_requested = word_to_gas(interp.stack.pop()?);
    let target = word_to_address(interp.stack.pop()?);
    let value = interp.stack.pop()?;
    let args_offset = word_to_usize(interp.stack.pop()?)?;
    let args_len = word_to_usize(interp.stack.pop()?)?;
    let ret_offset = word_to_usize(interp.stack.pop()?)?;
    let ret_len = word_to_usize(interp.stack.pop()?)?;

    if interp.contract.read_only && !value.is_zero() {
        return Err(Error::WriteProtection);
    }

    let input = Bytes::copy_from_slice(&interp.memory.get_copy(args_offset, args_len));
    let capped = gas::call_gas_forwarded(gas_requested, interp.gas_remaining);
    interp.gas_remaining -= capped;
    let gas_to_callee = if value.is_zero() { capped } else { capped + constants::CALL_STIPEND };

    let caller = interp.contract.address;
    let result = engine.call_code(caller, target, input, gas_to_callee, value, interp.contract.read_only);
    apply_call_result(interp, result, ret_offset, ret_len)
}

pub fn callcode_dynamic_gas(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<u64> {
    let target = word_to_address(*interp.stack.back(1)?);
    let value = *interp.stack.back(2)?;
    let args_offset = word_to_usize(*interp.stack.back(3)?)?;
    let args_len = word_to_usize(*interp.stack.back(4)?)?;
    let ret_offset = word_to_usize(*interp.stack.back(5)?)?;
    let ret_len = word_to_usize(*interp.stack.back(6)?)?;

    let expansion = memory_expansion_for_call(interp, args_offset, args_len, ret_offset, ret_len)?;
    let already_warm = engine.host.mark_address_warm(target);
    let mut cost = expansion + call_access_cost(interp.rules, already_warm);
    if !value.is_zero() {
        cost += constants::CALL_VALUE_TRANSFER;
    }
    Ok(cost)
}

pub fn delegatecall(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let gas_requested = word_to_gas(interp.stack.pop()?);
    let target = word_to_address(interp.stack.pop()?);
    let args_offset = word_to_usize(interp.stack.pop()?)?;
    let args_len = word_to_usize(interp.stack.pop()?)?;
    let ret_offset = word_to_usize(interp.stack.pop()?)?;
    let ret_len = word_to_usize(interp.stack.pop()?)?;

    let input = Bytes::copy_from_slice(&interp.memory.get_copy(args_offset, args_len));
    let capped = gas::call_gas_forwarded(gas_requested, interp.gas_remaining);
    interp.gas_remaining -= capped;

    let result = engine.delegate_call(
        interp.contract.caller,
        interp.contract.address,
        interp.contract.value,
        target,
        input,
        capped,
        interp.contract.read_only,
    );
    apply_call_result(interp, result, ret_offset, ret_len)
}

pub fn delegatecall_dynamic_gas(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<u64> {
    let target = word_to_address(*interp.stack.back(1)?);
    let args_offset = word_to_usize(*interp.stack.back(2)?)?;
    let args_len = word_to_usize(*interp.stack.back(3)?)?;
    let ret_offset = word_to_usize(*interp.stack.back(4)?)?;
    let ret_len = word_to_usize(*interp.stack.back(5)?)?;

    let expansion = memory_expansion_for_call(interp, args_offset, args_len, ret_offset, ret_len)?;
    let already_warm = engine.host.mark_address_warm(target);
    Ok(expansion + call_access_cost(interp.rules, already_warm))
}

pub fn staticcall(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let gas_requested = word_to_gas(interp.stack.pop()?);
    let target = word_to_address(interp.stack.pop()?);
    let args_offset = word_to_usize(interp.stack.pop()?)?;
    let args_len = word_to_usize(interp.stack.pop()?)?;
    let ret_offset = word_to_usize(interp.stack.pop()?)?;
    let ret_len = word_to_usize(interp.stack.pop()?)?;

    let input = Bytes::copy_from_slice(&interp.memory.get_copy(args_offset, args_len));
    let capped = gas::call_gas_forwarded(gas_requested, interp.gas_remaining);
    interp.gas_remaining -= capped;

    let caller = interp.contract.address;
    let result = engine.static_call(caller, target, input, capped);
    apply_call_result(interp, result, ret_offset, ret_len)
}

pub fn staticcall_dynamic_gas(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<u64> {
    let target = word_to_address(*interp.stack.back(1)?);
    let args_offset = word_to_usize(*interp.stack.back(2)?)?;
    let args_len = word_to_usize(*interp.stack.back(3)?)?;
    let ret_offset = word_to_usize(*interp.stack.back(4)?)?;
    let ret_len = word_to_usize(*interp.stack.back(5)?)?;

    let expansion = memory_expansion_for_call(interp, args_offset, args_len, ret_offset, ret_len)?;
    let already_warm = engine.host.mark_address_warm(target);
    Ok(expansion + call_access_cost(interp.rules, already_warm))
}

pub(crate) fn apply_create_result(interp: &mut Interpreter, result: CallResult) -> EvmResult<Action> {
    interp.gas_remaining = interp.gas_remaining.saturating_add(result.gas_left);
    if result.reverted {
        interp.return_data = result.output;
        interp.stack.push(Word::zero())?;
        return Ok(Action::Continue);
    }
    interp.return_data = Bytes::new();
    let value = if result.error.is_none() { Word::from_big_endian(&result.output) } else { Word::zero() };
    interp.stack.push(value)?;
    Ok(Action::Continue)
}

pub fn create(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    if interp.contract.read_only {
        return Err(Error::WriteProtection);
    }
    let value = interp.stack.pop()?;
    let offset = word_to_usize(interp.stack.pop()?)?;
    let len = word_to_usize(interp.stack.pop()?)?;
    let init_code = Bytes::copy_from_slice(&interp.memory.get_copy(offset, len));

    let gas_to_forward = gas::call_gas_forwarded(interp.gas_remaining, interp.gas_remaining);
    interp.gas_remaining -= gas_to_forward;

    let caller = interp.contract.address;
    let result = engine.create(caller, init_code, gas_to_forward, value);
    apply_create_result(interp, result)
}

pub fn create_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let offset = word_to_usize(*interp.stack.back(1)?)?;
    let len = word_to_usize(*interp.stack.back(2)?)?;
    let expansion = interp.memory.expansion_cost(offset.saturating_add(len))?;
    let initcode_cost = if interp.rules.is_shanghai() { num_words(len) * constants::INITCODE_WORD_COST } else { 0 };
    Ok(expansion + initcode_cost)
}

pub fn create2(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    if interp.contract.read_only {
        return Err(Error::WriteProtection);
    }
    let value = interp.stack.pop()?;
    let offset = word_to_usize(interp.stack.pop()?)?;
    let len = word_to_usize(interp.stack.pop()?)?;
    let salt = interp.stack.pop()?;
    let init_code = Bytes::copy_from_slice(&interp.memory.get_copy(offset, len));

    let gas_to_forward = gas::call_gas_forwarded(interp.gas_remaining, interp.gas_remaining);
    interp.gas_remaining -= gas_to_forward;

    let caller = interp.contract.address;
    let result = engine.create2(caller, init_code, gas_to_forward, value, salt);
    apply_create_result(interp, result)
}

pub fn create2_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let offset = word_to_usize(*interp.stack.back(1)?)?;
    let len = word_to_usize(*interp.stack.back(2)?)?;
    let expansion = interp.memory.expansion_cost(offset.saturating_add(len))?;
    let words = num_words(len);
    let initcode_cost = if interp.rules.is_shanghai() { words * constants::INITCODE_WORD_COST } else { 0 };
    let hash_cost = words * constants::KECCAK256_WORD;
    Ok(expansion + initcode_cost + hash_cost)
}

/// `SELFDESTRUCT` (spec.md §4.G). Post-Cancun (EIP-6780), an account not
/// created earlier in the same transaction only has its balance swept to
/// the beneficiary; it keeps its code/storage and isn't scheduled for
/// deletion.
pub fn selfdestruct(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    if interp.contract.read_only {
        return Err(Error::WriteProtection);
    }
    let beneficiary = word_to_address(interp.stack.pop()?);
    let address = interp.contract.address;

    if interp.rules.is_cancun() && !engine.host.created_this_tx(address) {
        let balance = engine.host.balance(address);
        engine.host.sub_balance(address, balance);
        engine.host.add_balance(beneficiary, balance);
    } else {
        engine.host.mark_self_destructed(address, beneficiary);
    }
    Ok(Action::Halt(Bytes::new()))
}

pub fn selfdestruct_dynamic_gas(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<u64> {
    let beneficiary = word_to_address(*interp.stack.back(0)?);
    let mut cost = if interp.rules.is_tangerine_whistle() { constants::SELFDESTRUCT } else { 0 };

    if interp.rules.is_berlin() {
        let already_warm = engine.host.mark_address_warm(beneficiary);
        if !already_warm {
            cost += constants::COLD_ACCOUNT_ACCESS;
        }
    }

    if interp.rules.is_spurious_dragon() {
        let address = interp.contract.address;
        let balance = engine.host.balance(address);
        if !balance.is_zero() && !engine.host.account_exists(beneficiary) {
            cost += constants::SELFDESTRUCT_NEW_ACCOUNT;
        }
    }

    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_rules::{ChainRules, Hardfork};
    use crate::frame::Contract;
    use crate::host::tests::TestHost;
    use crate::primitives::Address;

    #[test]
    fn selfdestruct_pre_cancun_marks_destroyed_and_moves_balance() {
        let mut host = TestHost::default();
        let address = Address::from_low_u64_be(1);
        let beneficiary = Address::from_low_u64_be(2);
        host.world.balances.insert(address, Word::from(100));

        let rules = ChainRules::new(Hardfork::London);
        let cancelled = || false;
        let mut engine = CallEngine::new(&mut host, rules, &cancelled);
        let contract = Contract::new(Address::zero(), address, Word::zero(), Bytes::new(), 1_000_000, Bytes::new(), 0);
        let mut interp = Interpreter::new(contract, rules);
        interp.stack.push(crate::primitives::address_to_word(beneficiary)).unwrap();

        let action = selfdestruct(&mut interp, &mut engine).unwrap();
        assert!(matches!(action, Action::Halt(_)));
        assert!(engine.host.has_self_destructed(address));
        assert_eq!(engine.host.balance(beneficiary), Word::from(100));
    }

    #[test]
    fn selfdestruct_post_cancun_on_old_account_only_moves_balance() {
        let mut host = TestHost::default();
        let address = Address::from_low_u64_be(1);
        let beneficiary = Address::from_low_u64_be(2);
        host.world.balances.insert(address, Word::from(100));

        let rules = ChainRules::new(Hardfork::Cancun);
        let cancelled = || false;
        let mut engine = CallEngine::new(&mut host, rules, &cancelled);
        let contract = Contract::new(Address::zero(), address, Word::zero(), Bytes::new(), 1_000_000, Bytes::new(), 0);
        let mut interp = Interpreter::new(contract, rules);
        interp.stack.push(crate::primitives::address_to_word(beneficiary)).unwrap();

        selfdestruct(&mut interp, &mut engine).unwrap();
        assert!(!engine.host.has_self_destructed(address));
        assert_eq!(engine.host.balance(beneficiary), Word::from(100));
    }

    #[test]
    fn selfdestruct_post_cancun_on_freshly_created_account_is_destroyed() {
        let mut host = TestHost::default();
        let address = Address::from_low_u64_be(1);
        let beneficiary = Address::from_low_u64_be(2);
        host.world.created_this_tx.insert(address);

        let rules = ChainRules::new(Hardfork::Cancun);
        let cancelled = || false;
        let mut engine = CallEngine::new(&mut host, rules, &cancelled);
        let contract = Contract::new(Address::zero(), address, Word::zero(), Bytes::new(), 1_000_000, Bytes::new(), 0);
        let mut interp = Interpreter::new(contract, rules);
        interp.stack.push(crate::primitives::address_to_word(beneficiary)).unwrap();

        selfdestruct(&mut interp, &mut engine).unwrap();
        assert!(engine.host.has_self_destructed(address));
    }
}
