//! Control-flow handlers (spec.md §4.B/§4.H/§4.J): legacy `STOP`, `JUMP`,
//! `JUMPI`, `PC`, `JUMPDEST`, `RETURN`, `REVERT`, `INVALID`, and the EOF
//! static-jump family `RJUMP`/`RJUMPI`/`RJUMPV`/`CALLF`/`RETF`/`JUMPF`
//! (EIP-4200/EIP-4750/EIP-6206).
//!
//! Has no direct teacher counterpart — the teacher's `Machine` never had a
//! program counter to jump with. Built from spec.md's interpreter-loop
//! pseudocode and the EOF opcodes' immediate-operand layout in §3.

use super::word_to_usize;
use crate::call::CallEngine;
use crate::error::{Error, EvmResult};
use crate::interpreter::{Action, Interpreter};
use crate::primitives::{Bytes, Word};
use crate::return_stack::ReturnFrame;

pub fn stop(_interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    Ok(Action::Halt(Bytes::new()))
}

pub fn jump(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let dest = word_to_usize(interp.stack.pop()?)?;
    if !interp.contract.jumpdests().is_valid(dest as u32) {
        return Err(Error::InvalidJump);
    }
    Ok(Action::Jump(dest))
}

pub fn jumpi(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let dest = word_to_usize(interp.stack.pop()?)?;
    let cond = interp.stack.pop()?;
    if cond.is_zero() {
        return Ok(Action::Continue);
    }
    if !interp.contract.jumpdests().is_valid(dest as u32) {
        return Err(Error::InvalidJump);
    }
    Ok(Action::Jump(dest))
}

pub fn pc_op(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(Word::from(interp.pc as u64))?;
    Ok(Action::Continue)
}

pub fn jumpdest(_interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    Ok(Action::Continue)
}

pub fn return_op(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let offset = word_to_usize(interp.stack.pop()?)?;
    let len = word_to_usize(interp.stack.pop()?)?;
    let out = interp.memory.get_copy(offset, len);
    Ok(Action::Halt(Bytes::from(out)))
}

pub fn return_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let offset = word_to_usize(*interp.stack.back(0)?)?;
    let len = word_to_usize(*interp.stack.back(1)?)?;
    interp.memory.expansion_cost(offset.saturating_add(len))
}

pub fn revert(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let offset = word_to_usize(interp.stack.pop()?)?;
    let len = word_to_usize(interp.stack.pop()?)?;
    let out = interp.memory.get_copy(offset, len);
    Ok(Action::Revert(Bytes::from(out)))
}

pub fn revert_dynamic_gas(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<u64> {
    let offset = word_to_usize(*interp.stack.back(0)?)?;
    let len = word_to_usize(*interp.stack.back(1)?)?;
    interp.memory.expansion_cost(offset.saturating_add(len))
}

pub fn invalid(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    Err(Error::UndefinedInstruction(interp.current_op()))
}

fn read_i16(code: &[u8], at: usize) -> i16 {
    i16::from_be_bytes([code.get(at).copied().unwrap_or(0), code.get(at + 1).copied().unwrap_or(0)])
}

fn read_u16(code: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([code.get(at).copied().unwrap_or(0), code.get(at + 1).copied().unwrap_or(0)])
}

/// `RJUMP` (EIP-4200): unconditional relative jump, `target = pc + 3 + offset`.
pub fn rjump(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let code = interp.current_code();
    let offset = read_i16(code, interp.pc + 1);
    let target = (interp.pc as i64 + 3 + offset as i64) as usize;
    Ok(Action::Jump(target))
}

/// `RJUMPI` (EIP-4200): relative jump taken only if the popped condition is
/// non-zero; the offset is always relative to the instruction after the
/// immediate, whether or not the jump is taken.
pub fn rjumpi(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let cond = interp.stack.pop()?;
    let fallthrough = interp.pc + 3;
    if cond.is_zero() {
        return Ok(Action::Jump(fallthrough));
    }
    let code = interp.current_code();
    let offset = read_i16(code, interp.pc + 1);
    let target = (fallthrough as i64 + offset as i64) as usize;
    Ok(Action::Jump(target))
}

/// `RJUMPV` (EIP-4200): a jump table keyed by a popped case index. Immediate
/// layout is `max_index:u8, offset_0:i16, .., offset_max_index:i16`; `count =
/// max_index + 1`. Out-of-range cases fall through past the whole table.
pub fn rjumpv(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let case = word_to_usize(interp.stack.pop()?).unwrap_or(usize::MAX);
    let code = interp.current_code();
    let max_index = code.get(interp.pc + 1).copied().unwrap_or(0) as usize;
    let count = max_index + 1;
    let fallthrough = interp.pc + 2 + count * 2;
    if case >= count {
        return Ok(Action::Jump(fallthrough));
    }
    let offset = read_i16(code, interp.pc + 2 + case * 2);
    let target = (fallthrough as i64 + offset as i64) as usize;
    Ok(Action::Jump(target))
}

/// `CALLF` (EIP-4750): pushes a return frame for the current section/pc and
/// transfers control to the start of the target section.
pub fn callf(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let code = interp.current_code();
    let target_section = read_u16(code, interp.pc + 1);
    let return_pc = (interp.pc + 3) as u32;
    interp.return_stack.push(ReturnFrame { code_section: interp.contract.code_section, return_pc })?;
    interp.contract.code_section = target_section;
    Ok(Action::Jump(0))
}

/// `RETF` (EIP-4750): pops the return frame pushed by the matching `CALLF`
/// and resumes execution there.
pub fn retf(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let frame = interp.return_stack.pop()?;
    interp.contract.code_section = frame.code_section;
    Ok(Action::Jump(frame.return_pc as usize))
}

/// `JUMPF` (EIP-6206): tail-call variant of `CALLF` — transfers control to
/// the target section without pushing a return frame.
pub fn jumpf(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let code = interp.current_code();
    let target_section = read_u16(code, interp.pc + 1);
    interp.contract.code_section = target_section;
    Ok(Action::Jump(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_rules::{ChainRules, Hardfork};
    use crate::frame::Contract;
    use crate::host::tests::TestHost;
    use crate::primitives::Address;

    fn interp_with_code(code: &[u8]) -> Interpreter {
        let contract =
            Contract::new(Address::zero(), Address::zero(), Word::zero(), Bytes::new(), 1_000_000, Bytes::copy_from_slice(code), 0);
        Interpreter::new(contract, ChainRules::new(Hardfork::Cancun))
    }

    #[test]
    fn jump_to_jumpdest_succeeds() {
        let code = [crate::instructions::opcodes::JUMPDEST, crate::instructions::opcodes::STOP];
        let mut interp = interp_with_code(&code);
        let mut host = TestHost::default();
        let rules = ChainRules::new(Hardfork::Cancun);
        let mut engine = CallEngine::new(&mut host, rules, &|| false);
        interp.stack.push(Word::zero()).unwrap();
        let action = jump(&mut interp, &mut engine).unwrap();
        match action {
            Action::Jump(0) => {}
            _ => panic!("expected jump to 0"),
        }
    }

    #[test]
    fn jump_to_non_jumpdest_errors() {
        let code = [crate::instructions::opcodes::STOP, crate::instructions::opcodes::STOP];
        let mut interp = interp_with_code(&code);
        let mut host = TestHost::default();
        let rules = ChainRules::new(Hardfork::Cancun);
        let mut engine = CallEngine::new(&mut host, rules, &|| false);
        interp.stack.push(Word::zero()).unwrap();
        assert_eq!(jump(&mut interp, &mut engine), Err(Error::InvalidJump));
    }

    #[test]
    fn rjump_computes_relative_target() {
        // RJUMP, offset = 2 -> target = pc(0) + 3 + 2 = 5
        let code = [crate::instructions::opcodes::RJUMP, 0x00, 0x02, 0x00, 0x00, crate::instructions::opcodes::STOP];
        let mut interp = interp_with_code(&code);
        let mut host = TestHost::default();
        let rules = ChainRules::new(Hardfork::Cancun);
        let mut engine = CallEngine::new(&mut host, rules, &|| false);
        match rjump(&mut interp, &mut engine).unwrap() {
            Action::Jump(5) => {}
            other => panic!("unexpected action: {:?}", matches!(other, Action::Jump(_))),
        }
    }

    #[test]
    fn callf_then_retf_round_trips() {
        let code = [crate::instructions::opcodes::CALLF, 0x00, 0x01];
        let mut interp = interp_with_code(&code);
        let mut host = TestHost::default();
        let rules = ChainRules::new(Hardfork::Cancun);
        let mut engine = CallEngine::new(&mut host, rules, &|| false);
        callf(&mut interp, &mut engine).unwrap();
        assert_eq!(interp.contract.code_section, 1);
        assert_eq!(interp.return_stack.len(), 1);
        let action = retf(&mut interp, &mut engine).unwrap();
        assert_eq!(interp.contract.code_section, 0);
        match action {
            Action::Jump(3) => {}
            _ => panic!("expected return to pc 3"),
        }
    }
}
