//! Comparison handlers (spec.md §4.A/§4.G): `LT`..`ISZERO`.

use super::{binop, bool_word, unop};
use crate::call::CallEngine;
use crate::error::EvmResult;
use crate::interpreter::{Action, Interpreter};
use crate::primitives::word::is_negative;
use crate::primitives::Word;

pub fn lt(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, |a, b| bool_word(a < b))
}

pub fn gt(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, |a, b| bool_word(a > b))
}

fn signed_cmp(a: Word, b: Word) -> std::cmp::Ordering {
    match (is_negative(a), is_negative(b)) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.cmp(&b),
    }
}

pub fn slt(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, |a, b| bool_word(signed_cmp(a, b) == std::cmp::Ordering::Less))
}

pub fn sgt(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, |a, b| bool_word(signed_cmp(a, b) == std::cmp::Ordering::Greater))
}

pub fn eq(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    binop(interp, |a, b| bool_word(a == b))
}

pub fn iszero(interp: &mut Interpreter, _e: &mut CallEngine<'_>) -> EvmResult<Action> {
    unop(interp, |a| bool_word(a.is_zero()))
}
