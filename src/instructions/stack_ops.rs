//! Stack-manipulation handlers (spec.md §4.B/§4.G): `POP`, `PUSH0..32`,
//! `DUP1..16`, `SWAP1..16`, and the EOF `DUPN`/`SWAPN`/`EXCHANGE` variants.

use crate::call::CallEngine;
use crate::error::EvmResult;
use crate::instructions::opcodes::PUSH1;
use crate::interpreter::{Action, Interpreter};
use crate::primitives::Word;

pub fn pop(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.pop()?;
    Ok(Action::Continue)
}

pub fn push0(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(Word::zero())?;
    Ok(Action::Continue)
}

/// `PUSHn` reads `n` big-endian bytes immediately following the opcode,
/// zero-padding past the end of the code buffer (legal: bytecode may end
/// mid-`PUSH`).
pub fn push(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let op = interp.current_op();
    let n = (op - PUSH1 + 1) as usize;
    let code = interp.current_code();
    let start = interp.pc + 1;
    let mut buf = [0u8; 32];
    for i in 0..n {
        if let Some(b) = code.get(start + i) {
            buf[32 - n + i] = *b;
        }
    }
    interp.stack.push(Word::from_big_endian(&buf))?;
    Ok(Action::Continue)
}

pub fn dup(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let op = interp.current_op();
    let n = (op - crate::instructions::opcodes::DUP1 + 1) as usize;
    interp.stack.dup(n)?;
    Ok(Action::Continue)
}

pub fn swap(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let op = interp.current_op();
    let n = (op - crate::instructions::opcodes::SWAP1 + 1) as usize;
    interp.stack.swap(n)?;
    Ok(Action::Continue)
}

/// EOF `DUPN`: one immediate byte, duplicates depth `byte + 1`.
pub fn dupn(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let code = interp.current_code();
    let n = code[interp.pc + 1] as usize + 1;
    interp.stack.dup(n)?;
    Ok(Action::Continue)
}

/// EOF `SWAPN`: one immediate byte, swaps top with depth `byte + 1`.
pub fn swapn(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let code = interp.current_code();
    let n = code[interp.pc + 1] as usize + 1;
    interp.stack.swap(n)?;
    Ok(Action::Continue)
}

/// EOF `EXCHANGE`: one immediate byte encoding two 1-indexed depths as
/// nibbles, `(n1 << 4) | n2`, swapping depths `n1 + 1` and `n1 + n2 + 2`.
pub fn exchange(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    let code = interp.current_code();
    let imm = code[interp.pc + 1];
    let n1 = (imm >> 4) as usize + 1;
    let n2 = (imm & 0x0f) as usize + 1;
    interp.stack.exchange(n1, n1 + n2)?;
    Ok(Action::Continue)
}
