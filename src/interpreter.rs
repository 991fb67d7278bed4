//! The interpreter loop (spec.md §4.J): fetch, validate stack/gas,
//! dispatch, advance PC, propagate halt/revert.
//!
//! Has no direct teacher counterpart — `vm.rs::Evm::evm_call` never got
//! past `todo!()` — so this follows spec.md's pseudocode directly, in the
//! same `loop { match ... }` shape the teacher uses elsewhere (e.g.
//! `WorldStateTrie`'s recursive node walk).

use crate::call::CallEngine;
use crate::chain_rules::ChainRules;
use crate::error::{Error, EvmResult};
use crate::frame::Contract;
use crate::instructions::table::{self, InstructionTable};
use crate::memory::Memory;
use crate::primitives::Bytes;
use crate::return_stack::ReturnStack;
use crate::stack::Stack;

/// What a single instruction did to control flow.
pub enum Action {
    Continue,
    Jump(usize),
    Halt(Bytes),
    Revert(Bytes),
}

/// How a frame's execution ended (spec.md §4.J's three loop outcomes).
pub enum Outcome {
    Halt { output: Bytes, gas_remaining: u64 },
    Revert { output: Bytes, gas_remaining: u64 },
    Error(Error),
}

pub struct Interpreter {
    pub contract: Contract,
    pub stack: Stack,
    pub memory: Memory,
    pub return_stack: ReturnStack,
    pub pc: usize,
    pub gas_remaining: u64,
    pub return_data: Bytes,
    pub rules: ChainRules,
}

impl Interpreter {
    pub fn new(contract: Contract, rules: ChainRules) -> Self {
        let gas_remaining = contract.gas_limit;
        Self {
            contract,
            stack: Stack::new(),
            memory: Memory::new(),
            return_stack: ReturnStack::new(),
            pc: 0,
            gas_remaining,
            return_data: Bytes::new(),
            rules,
        }
    }

    fn code(&self) -> &[u8] {
        if self.contract.is_eof {
            self.contract
                .eof_code_section(self.contract.code_section)
                .unwrap_or(&[])
        } else {
            &self.contract.code
        }
    }

    /// The currently executing code section, for handlers that need to
    /// read immediate operand bytes (`PUSHn`, `DUPN`/`SWAPN`/`EXCHANGE`, ...).
    pub fn current_code(&self) -> &[u8] {
        self.code()
    }

    /// The opcode byte at `self.pc` (handlers are only ever invoked with a
    /// valid in-bounds `pc`, checked by [`Interpreter::step`]).
    pub fn current_op(&self) -> u8 {
        self.code()[self.pc]
    }

    fn charge(&mut self, amount: u64) -> EvmResult<()> {
        if self.gas_remaining < amount {
            return Err(Error::OutOfGas);
        }
        self.gas_remaining -= amount;
        Ok(())
    }

    /// Runs until the frame halts, reverts, or errors (spec.md §4.J).
    /// `cancelled` is polled at the top of every iteration to support
    /// cooperative external termination.
    pub fn run(&mut self, engine: &mut CallEngine<'_>, cancelled: &dyn Fn() -> bool) -> Outcome {
        let table = table::for_rules(self.rules);
        loop {
            if cancelled() {
                return Outcome::Error(Error::Cancelled);
            }
            match self.step(table, engine) {
                Ok(Action::Continue) => {}
                Ok(Action::Jump(target)) => self.pc = target,
                Ok(Action::Halt(out)) => {
                    return Outcome::Halt { output: out, gas_remaining: self.gas_remaining }
                }
                Ok(Action::Revert(out)) => {
                    return Outcome::Revert { output: out, gas_remaining: self.gas_remaining }
                }
                Err(err) => return Outcome::Error(err),
            }
        }
    }

    fn step(&mut self, table: &'static InstructionTable, engine: &mut CallEngine<'_>) -> EvmResult<Action> {
        let code = self.code();
        if self.pc >= code.len() {
            return Ok(Action::Halt(Bytes::new()));
        }
        let op = code[self.pc];
        let entry = table.entries[op as usize].as_ref().ok_or(Error::UndefinedInstruction(op))?;

        let stack_len = self.stack.len() as u16;
        if stack_len < entry.num_pop {
            return Err(Error::StackUnderflow);
        }
        if stack_len - entry.num_pop + entry.num_push > crate::stack::STACK_LIMIT as u16 {
            return Err(Error::StackOverflow);
        }

        self.charge(entry.constant_gas)?;
        if let Some(dynamic) = entry.dynamic_gas {
            let extra = dynamic(self, engine)?;
            self.charge(extra)?;
        }

        let pc_before = self.pc;
        let action = (entry.execute)(self, engine)?;
        if let Action::Continue = action {
            if self.pc == pc_before {
                self.pc += 1 + entry.immediate_size;
            }
        }
        Ok(action)
    }
}
