//! Per-fork instruction dispatch table (spec.md §4.F/§4.N).
//!
//! Construction is compositional: start from the Frontier table, then
//! apply each `enable_*` mutator in fork order, each installing or
//! replacing entries. Tables are immutable once built and cached per
//! ruleset, keyed by [`ChainRules::cache_key`]. The teacher has no
//! equivalent — `operations.rs` builds one fixed Berlin table — so this
//! generalizes that single snapshot into the fork-ordered sequence
//! spec.md names.

use once_cell::sync::Lazy;

use crate::chain_rules::{ChainRules, Hardfork};
use crate::error::EvmResult;
use crate::interpreter::{Action, Interpreter};
use crate::stack::STACK_LIMIT;
use crate::{call::CallEngine, gas::constants as g};

use super::{arithmetic, bitwise, block_info, comparison, control, environment, eof_ops, log, memory_ops, opcodes as op, stack_ops, storage, system};

pub type Handler = fn(&mut Interpreter, &mut CallEngine<'_>) -> EvmResult<Action>;
pub type DynamicGas = fn(&mut Interpreter, &mut CallEngine<'_>) -> EvmResult<u64>;

/// One opcode's dispatch metadata. `max_stack` is `1024 - num_push +
/// num_pop` (spec.md §4.F); the interpreter's own overflow check is
/// phrased directly in terms of `num_pop`/`num_push` instead, so this
/// field is carried for parity with the spec's stated table shape rather
/// than consulted by [`crate::interpreter::Interpreter::step`].
#[derive(Clone, Copy)]
pub struct Entry {
    pub execute: Handler,
    pub dynamic_gas: Option<DynamicGas>,
    pub constant_gas: u64,
    pub num_pop: u16,
    pub num_push: u16,
    pub immediate_size: usize,
    pub max_stack: u16,
}

#[derive(Clone, Copy)]
pub struct InstructionTable {
    pub entries: [Option<Entry>; 256],
}

impl InstructionTable {
    fn empty() -> Self {
        Self { entries: [None; 256] }
    }

    fn set(&mut self, opcode: u8, num_pop: u16, num_push: u16, constant_gas: u64, execute: Handler) {
        let immediate_size = op::immediate_size(opcode).unwrap_or(0);
        let max_stack = (STACK_LIMIT as u16).saturating_sub(num_push).saturating_add(num_pop);
        self.entries[opcode as usize] =
            Some(Entry { execute, dynamic_gas: None, constant_gas, num_pop, num_push, immediate_size, max_stack });
    }

    fn set_dyn(&mut self, opcode: u8, num_pop: u16, num_push: u16, constant_gas: u64, execute: Handler, dynamic_gas: DynamicGas) {
        self.set(opcode, num_pop, num_push, constant_gas, execute);
        self.entries[opcode as usize].as_mut().unwrap().dynamic_gas = Some(dynamic_gas);
    }
}

/// Frontier genesis table (spec.md §4.F). Every later mutator starts from
/// a clone of this.
fn frontier() -> InstructionTable {
    let mut t = InstructionTable::empty();

    t.set(op::STOP, 0, 0, g::ZERO, control::stop);
    t.set(op::ADD, 2, 1, g::VERY_LOW, arithmetic::add);
    t.set(op::MUL, 2, 1, g::LOW, arithmetic::mul);
    t.set(op::SUB, 2, 1, g::VERY_LOW, arithmetic::sub);
    t.set(op::DIV, 2, 1, g::LOW, arithmetic::div);
    t.set(op::SDIV, 2, 1, g::LOW, arithmetic::sdiv);
    t.set(op::MOD, 2, 1, g::LOW, arithmetic::rem);
    t.set(op::SMOD, 2, 1, g::LOW, arithmetic::smod);
    t.set(op::ADDMOD, 3, 1, g::MID, arithmetic::addmod);
    t.set(op::MULMOD, 3, 1, g::MID, arithmetic::mulmod);
    t.set_dyn(op::EXP, 2, 1, g::EXP, arithmetic::exp, arithmetic::exp_dynamic_gas);
    t.set(op::SIGNEXTEND, 2, 1, g::LOW, arithmetic::signextend);

    t.set(op::LT, 2, 1, g::VERY_LOW, comparison::lt);
    t.set(op::GT, 2, 1, g::VERY_LOW, comparison::gt);
    t.set(op::SLT, 2, 1, g::VERY_LOW, comparison::slt);
    t.set(op::SGT, 2, 1, g::VERY_LOW, comparison::sgt);
    t.set(op::EQ, 2, 1, g::VERY_LOW, comparison::eq);
    t.set(op::ISZERO, 1, 1, g::VERY_LOW, comparison::iszero);
    t.set(op::AND, 2, 1, g::VERY_LOW, bitwise::and);
    t.set(op::OR, 2, 1, g::VERY_LOW, bitwise::or);
    t.set(op::XOR, 2, 1, g::VERY_LOW, bitwise::xor);
    t.set(op::NOT, 1, 1, g::VERY_LOW, bitwise::not);
    t.set(op::BYTE, 2, 1, g::VERY_LOW, bitwise::byte);

    t.set_dyn(op::KECCAK256, 2, 1, g::KECCAK256, environment::keccak256, environment::keccak256_dynamic_gas);

    t.set(op::ADDRESS, 0, 1, g::BASE, environment::address);
    t.set_dyn(op::BALANCE, 1, 1, g::ZERO, environment::balance, environment::balance_dynamic_gas);
    t.set(op::ORIGIN, 0, 1, g::BASE, environment::origin);
    t.set(op::CALLER, 0, 1, g::BASE, environment::caller);
    t.set(op::CALLVALUE, 0, 1, g::BASE, environment::callvalue);
    t.set(op::CALLDATALOAD, 1, 1, g::VERY_LOW, environment::calldataload);
    t.set(op::CALLDATASIZE, 0, 1, g::BASE, environment::calldatasize);
    t.set_dyn(op::CALLDATACOPY, 3, 0, g::VERY_LOW, environment::calldatacopy, environment::calldatacopy_dynamic_gas);
    t.set(op::CODESIZE, 0, 1, g::BASE, environment::codesize);
    t.set_dyn(op::CODECOPY, 3, 0, g::VERY_LOW, environment::codecopy, environment::codecopy_dynamic_gas);
    t.set(op::GASPRICE, 0, 1, g::BASE, environment::gasprice);
    t.set_dyn(op::EXTCODESIZE, 1, 1, g::ZERO, environment::extcodesize, environment::extcodesize_dynamic_gas);
    t.set_dyn(op::EXTCODECOPY, 4, 0, g::ZERO, environment::extcodecopy, environment::extcodecopy_dynamic_gas);

    t.set(op::BLOCKHASH, 1, 1, g::BLOCKHASH, block_info::blockhash);
    t.set(op::COINBASE, 0, 1, g::BASE, block_info::coinbase);
    t.set(op::TIMESTAMP, 0, 1, g::BASE, block_info::timestamp);
    t.set(op::NUMBER, 0, 1, g::BASE, block_info::number);
    t.set(op::PREVRANDAO, 0, 1, g::BASE, block_info::prevrandao);
    t.set(op::GASLIMIT, 0, 1, g::BASE, block_info::gaslimit);

    t.set(op::POP, 1, 0, g::BASE, stack_ops::pop);
    t.set_dyn(op::MLOAD, 1, 1, g::VERY_LOW, memory_ops::mload, memory_ops::mload_dynamic_gas);
    t.set_dyn(op::MSTORE, 2, 0, g::VERY_LOW, memory_ops::mstore, memory_ops::mstore_dynamic_gas);
    t.set_dyn(op::MSTORE8, 2, 0, g::VERY_LOW, memory_ops::mstore8, memory_ops::mstore8_dynamic_gas);
    t.set_dyn(op::SLOAD, 1, 1, g::ZERO, storage::sload, storage::sload_dynamic_gas);
    t.set_dyn(op::SSTORE, 2, 0, g::ZERO, storage::sstore, storage::sstore_dynamic_gas);
    t.set(op::JUMP, 1, 0, g::MID, control::jump);
    t.set(op::JUMPI, 2, 0, g::HIGH, control::jumpi);
    t.set(op::PC, 0, 1, g::BASE, control::pc_op);
    t.set(op::MSIZE, 0, 1, g::BASE, memory_ops::msize);
    t.set(op::GAS, 0, 1, g::BASE, environment::gas);
    t.set(op::JUMPDEST, 0, 0, g::JUMPDEST, control::jumpdest);

    for opcode in op::PUSH1..=op::PUSH32 {
        t.set(opcode, 0, 1, g::VERY_LOW, stack_ops::push);
    }
    for opcode in op::DUP1..=op::DUP16 {
        let n = (opcode - op::DUP1 + 1) as u16;
        t.set(opcode, n, n + 1, g::VERY_LOW, stack_ops::dup);
    }
    for opcode in op::SWAP1..=op::SWAP16 {
        let n = (opcode - op::SWAP1 + 1) as u16;
        t.set(opcode, n + 1, n + 1, g::VERY_LOW, stack_ops::swap);
    }

    t.set_dyn(op::LOG0, 2, 0, g::LOG, log::log0, log::log0_dynamic_gas);
    t.set_dyn(op::LOG0 + 1, 3, 0, g::LOG, log::log1, log::log1_dynamic_gas);
    t.set_dyn(op::LOG0 + 2, 4, 0, g::LOG, log::log2, log::log2_dynamic_gas);
    t.set_dyn(op::LOG0 + 3, 5, 0, g::LOG, log::log3, log::log3_dynamic_gas);
    t.set_dyn(op::LOG0 + 4, 6, 0, g::LOG, log::log4, log::log4_dynamic_gas);

    t.set_dyn(op::CREATE, 3, 1, g::CREATE, system::create, system::create_dynamic_gas);
    t.set_dyn(op::CALL, 7, 1, g::ZERO, system::call, system::call_dynamic_gas);
    t.set_dyn(op::CALLCODE, 7, 1, g::ZERO, system::callcode, system::callcode_dynamic_gas);
    t.set_dyn(op::RETURN, 2, 0, g::ZERO, control::return_op, control::return_dynamic_gas);
    t.set_dyn(op::SELFDESTRUCT, 1, 0, g::ZERO, system::selfdestruct, system::selfdestruct_dynamic_gas);
    t.set(op::INVALID, 0, 0, g::ZERO, control::invalid);

    t
}

/// Homestead (spec.md §4.F): adds `DELEGATECALL`.
fn enable_homestead(t: &mut InstructionTable) {
    t.set_dyn(op::DELEGATECALL, 6, 1, g::ZERO, system::delegatecall, system::delegatecall_dynamic_gas);
}

/// Tangerine Whistle (EIP-150): repricing only — the affected opcodes'
/// `dynamic_gas` callbacks already fork-check `ChainRules::is_tangerine_whistle`.
/// No entries to add or replace.
fn enable_tangerine_whistle(_t: &mut InstructionTable) {}

/// Spurious Dragon (EIP-158/161): repricing only, same reasoning.
fn enable_spurious_dragon(_t: &mut InstructionTable) {}

/// Byzantium: adds `REVERT`, `RETURNDATASIZE`, `RETURNDATACOPY`, `STATICCALL`.
fn enable_byzantium(t: &mut InstructionTable) {
    t.set_dyn(op::REVERT, 2, 0, g::ZERO, control::revert, control::revert_dynamic_gas);
    t.set(op::RETURNDATASIZE, 0, 1, g::BASE, environment::returndatasize);
    t.set_dyn(op::RETURNDATACOPY, 3, 0, g::VERY_LOW, environment::returndatacopy, environment::returndatacopy_dynamic_gas);
    t.set_dyn(op::STATICCALL, 6, 1, g::ZERO, system::staticcall, system::staticcall_dynamic_gas);
}

/// Constantinople: adds `CREATE2`, `EXTCODEHASH`, `SHL`/`SHR`/`SAR`.
fn enable_constantinople(t: &mut InstructionTable) {
    t.set_dyn(op::CREATE2, 4, 1, g::CREATE, system::create2, system::create2_dynamic_gas);
    t.set_dyn(op::EXTCODEHASH, 1, 1, g::ZERO, environment::extcodehash, environment::extcodehash_dynamic_gas);
    t.set(op::SHL, 2, 1, g::VERY_LOW, bitwise::shl);
    t.set(op::SHR, 2, 1, g::VERY_LOW, bitwise::shr);
    t.set(op::SAR, 2, 1, g::VERY_LOW, bitwise::sar);
}

/// Petersburg: reinstates the Constantinople table verbatim (the `SSTORE`
/// net-gas repricing it reverted lives in [`crate::gas::sstore`], keyed off
/// `ChainRules` directly rather than the table). No entries to add.
fn enable_petersburg(_t: &mut InstructionTable) {}

/// Istanbul: adds `CHAINID`, `SELFBALANCE`.
fn enable_istanbul(t: &mut InstructionTable) {
    t.set(op::CHAINID, 0, 1, g::BASE, environment::chainid);
    t.set(op::SELFBALANCE, 0, 1, g::LOW, environment::selfbalance);
}

/// Berlin (EIP-2929/2930): access-list repricing only, same reasoning as
/// Tangerine Whistle — every affected `dynamic_gas` callback already
/// fork-checks `ChainRules::is_berlin`.
fn enable_berlin(_t: &mut InstructionTable) {}

/// London: adds `BASEFEE`.
fn enable_london(t: &mut InstructionTable) {
    t.set(op::BASEFEE, 0, 1, g::BASE, block_info::basefee);
}

/// Shanghai (EIP-3855): adds `PUSH0`.
fn enable_shanghai(t: &mut InstructionTable) {
    t.set(op::PUSH0, 0, 1, g::BASE, stack_ops::push0);
}

/// Cancun: adds `MCOPY`, `TLOAD`/`TSTORE`, `BLOBHASH`, `BLOBBASEFEE`.
fn enable_cancun(t: &mut InstructionTable) {
    t.set_dyn(op::MCOPY, 3, 0, g::VERY_LOW, memory_ops::mcopy, memory_ops::mcopy_dynamic_gas);
    t.set(op::TLOAD, 1, 1, g::WARM_STORAGE_READ, storage::tload);
    t.set(op::TSTORE, 2, 0, g::WARM_STORAGE_READ, storage::tstore);
    t.set(op::BLOBHASH, 1, 1, g::VERY_LOW, block_info::blobhash);
    t.set(op::BLOBBASEFEE, 0, 1, g::BASE, block_info::blobbasefee);
}

/// Prague (EIP-7939): adds `CLZ`.
fn enable_prague(t: &mut InstructionTable) {
    t.set(op::CLZ, 1, 1, g::VERY_LOW, bitwise::clz);
}

/// Osaka/EOF (spec.md §4.H): the EOF-only data/sub-container opcodes, the
/// static-jump family, the EOF stack-manipulation variants, and the
/// `EXT*CALL` family (EIP-7069). Legacy opcodes `is_disabled_in_eof` lists
/// stay present in the table for non-EOF code running under this same
/// ruleset; the EOF validator (§4.H) is what actually rejects them inside
/// EOF containers.
fn enable_eof(t: &mut InstructionTable) {
    t.set(op::DATALOAD, 1, 1, g::DATALOAD, eof_ops::dataload);
    t.set(op::DATALOADN, 0, 1, g::DATALOADN, eof_ops::dataloadn);
    t.set(op::DATASIZE, 0, 1, g::DATASIZE, eof_ops::datasize);
    t.set_dyn(op::DATACOPY, 3, 0, g::DATACOPY, eof_ops::datacopy, eof_ops::datacopy_dynamic_gas);

    t.set(op::RJUMP, 0, 0, g::RJUMP, control::rjump);
    t.set(op::RJUMPI, 1, 0, g::RJUMPI, control::rjumpi);
    t.set(op::RJUMPV, 1, 0, g::RJUMPV, control::rjumpv);
    t.set(op::CALLF, 0, 0, g::CALLF, control::callf);
    t.set(op::RETF, 0, 0, g::RETF, control::retf);
    t.set(op::JUMPF, 0, 0, g::JUMPF, control::jumpf);

    t.set(op::DUPN, 0, 1, g::DUPN, stack_ops::dupn);
    t.set(op::SWAPN, 0, 0, g::SWAPN, stack_ops::swapn);
    t.set(op::EXCHANGE, 0, 0, g::EXCHANGE, stack_ops::exchange);

    t.set_dyn(op::EOFCREATE, 4, 1, g::CREATE, eof_ops::eofcreate, eof_ops::eofcreate_dynamic_gas);
    t.set_dyn(op::RETURNCONTRACT, 2, 0, g::ZERO, eof_ops::returncontract, eof_ops::returncontract_dynamic_gas);

    t.set_dyn(op::EXTCALL, 4, 1, g::ZERO, eof_ops::extcall, eof_ops::extcall_dynamic_gas);
    t.set_dyn(op::EXTDELEGATECALL, 3, 1, g::ZERO, eof_ops::extdelegatecall, eof_ops::extdelegatecall_dynamic_gas);
    t.set_dyn(op::EXTSTATICCALL, 3, 1, g::ZERO, eof_ops::extstaticcall, eof_ops::extstaticcall_dynamic_gas);
}

fn build(fork: Hardfork) -> InstructionTable {
    let mut t = frontier();
    for f in Hardfork::ALL {
        if f > fork {
            break;
        }
        match f {
            Hardfork::Frontier => {}
            Hardfork::Homestead => enable_homestead(&mut t),
            Hardfork::TangerineWhistle => enable_tangerine_whistle(&mut t),
            Hardfork::SpuriousDragon => enable_spurious_dragon(&mut t),
            Hardfork::Byzantium => enable_byzantium(&mut t),
            Hardfork::Constantinople => enable_constantinople(&mut t),
            Hardfork::Petersburg => enable_petersburg(&mut t),
            Hardfork::Istanbul => enable_istanbul(&mut t),
            Hardfork::Berlin => enable_berlin(&mut t),
            Hardfork::London => enable_london(&mut t),
            Hardfork::Shanghai => enable_shanghai(&mut t),
            Hardfork::Cancun => enable_cancun(&mut t),
            Hardfork::Prague => enable_prague(&mut t),
            Hardfork::Osaka => enable_eof(&mut t),
        }
    }
    t
}

const TABLE_COUNT: usize = Hardfork::ALL.len();

static TABLES: Lazy<[InstructionTable; TABLE_COUNT]> = Lazy::new(|| Hardfork::ALL.map(build));

/// Returns the cached, process-lifetime table for `rules`'s active fork
/// (spec.md §4.F: "cached per-ruleset").
pub fn for_rules(rules: ChainRules) -> &'static InstructionTable {
    &TABLES[rules.cache_key() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontier_table_has_add_but_not_delegatecall() {
        let t = build(Hardfork::Frontier);
        assert!(t.entries[op::ADD as usize].is_some());
        assert!(t.entries[op::DELEGATECALL as usize].is_none());
    }

    #[test]
    fn homestead_onward_has_delegatecall() {
        let t = build(Hardfork::Homestead);
        assert!(t.entries[op::DELEGATECALL as usize].is_some());
    }

    #[test]
    fn shanghai_adds_push0_cancun_adds_mcopy() {
        let shanghai = build(Hardfork::Shanghai);
        assert!(shanghai.entries[op::PUSH0 as usize].is_some());
        assert!(shanghai.entries[op::MCOPY as usize].is_none());

        let cancun = build(Hardfork::Cancun);
        assert!(cancun.entries[op::MCOPY as usize].is_some());
    }

    #[test]
    fn only_osaka_enables_eof_opcodes() {
        let prague = build(Hardfork::Prague);
        assert!(prague.entries[op::DATALOAD as usize].is_none());

        let osaka = build(Hardfork::Osaka);
        assert!(osaka.entries[op::DATALOAD as usize].is_some());
        assert!(osaka.entries[op::EXTCALL as usize].is_some());
    }

    #[test]
    fn for_rules_returns_matching_fork_table() {
        let rules = ChainRules::new(Hardfork::London);
        let t = for_rules(rules);
        assert!(t.entries[op::BASEFEE as usize].is_some());
        assert!(t.entries[op::PUSH0 as usize].is_none());
    }

    #[test]
    fn entry_max_stack_matches_pop_push() {
        let t = build(Hardfork::Cancun);
        let add = t.entries[op::ADD as usize].unwrap();
        assert_eq!(add.max_stack, STACK_LIMIT as u16 - 1 + 2);
    }
}
