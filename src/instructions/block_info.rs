//! Block-context handlers (spec.md §4.G, §6.2): `BLOCKHASH`, `COINBASE`,
//! `TIMESTAMP`, `NUMBER`, `PREVRANDAO`, `GASLIMIT`, `BASEFEE`, `BLOBHASH`,
//! `BLOBBASEFEE`.
//!
//! Has no direct teacher counterpart (`Machine`'s `Context` struct carried
//! block fields but no opcode wiring); built against
//! [`crate::host::BlockContext`]/[`crate::host::TxContext`].

use crate::call::CallEngine;
use crate::error::EvmResult;
use crate::interpreter::{Action, Interpreter};
use crate::primitives::{address_to_word, Address, Word};

/// Serve window of the EIP-2935 history-storage contract (Prague+), beyond
/// which `BLOCKHASH` falls back to zero like every earlier fork.
const HISTORY_SERVE_WINDOW: u64 = 8191;

/// Well-known EIP-2935 history-storage contract address, queried for block
/// hashes older than the 256-block `BLOCKHASH` window (Prague+).
fn history_storage_address() -> Address {
    let bytes: [u8; 20] = [
        0x00, 0x00, 0xF9, 0x08, 0x27, 0xF1, 0xC5, 0x3a, 0x10, 0xcb, 0x7A, 0x02, 0x33, 0x5B, 0x17, 0x53, 0x20, 0x00,
        0x29, 0x35,
    ];
    Address::from_slice(&bytes)
}

pub fn blockhash(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let target = interp.stack.pop()?;
    let current = engine.host.number();

    if target >= Word::from(current) {
        interp.stack.push(Word::zero())?;
        return Ok(Action::Continue);
    }
    let distance = current - target.as_u64();
    if distance <= 256 {
        let hash = engine.host.get_hash(target.as_u64());
        let value = hash.map(|h| Word::from_big_endian(h.as_bytes())).unwrap_or_else(Word::zero);
        interp.stack.push(value)?;
        return Ok(Action::Continue);
    }

    // EIP-2935 (Prague+): blocks beyond the 256-block window but still
    // within the serve window are read from the history-storage contract.
    if interp.rules.is_prague() && distance <= HISTORY_SERVE_WINDOW {
        let slot = target.as_u64() % HISTORY_SERVE_WINDOW;
        let value = engine.host.storage(history_storage_address(), Word::from(slot));
        interp.stack.push(value)?;
        return Ok(Action::Continue);
    }

    interp.stack.push(Word::zero())?;
    Ok(Action::Continue)
}

pub fn coinbase(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(address_to_word(engine.host.coinbase()))?;
    Ok(Action::Continue)
}

pub fn timestamp(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(Word::from(engine.host.timestamp()))?;
    Ok(Action::Continue)
}

pub fn number(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(Word::from(engine.host.number()))?;
    Ok(Action::Continue)
}

/// `PREVRANDAO`, a.k.a. `DIFFICULTY` pre-Merge — the teacher's gas table
/// doesn't distinguish them since both read the same block-context field
/// (spec.md §4.F just renames the opcode at the Merge boundary).
pub fn prevrandao(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(Word::from_big_endian(engine.host.prev_randao().as_bytes()))?;
    Ok(Action::Continue)
}

pub fn gaslimit(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(Word::from(engine.host.gas_limit()))?;
    Ok(Action::Continue)
}

pub fn basefee(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(engine.host.base_fee())?;
    Ok(Action::Continue)
}

/// `BLOBHASH` (EIP-4844): indexes the transaction's versioned blob hashes,
/// zero on out-of-range (spec.md §4.G).
pub fn blobhash(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    let index = interp.stack.pop()?;
    let hashes = engine.host.blob_hashes();
    let value = if index < Word::from(hashes.len() as u64) {
        Word::from_big_endian(hashes[index.as_usize()].as_bytes())
    } else {
        Word::zero()
    };
    interp.stack.push(value)?;
    Ok(Action::Continue)
}

pub fn blobbasefee(interp: &mut Interpreter, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
    interp.stack.push(engine.host.blob_base_fee())?;
    Ok(Action::Continue)
}
