//! Contract frame (spec.md §3 "Contract frame", §4.I).
//!
//! The teacher's `vm.rs::Context`/`Substate` carry a similar but
//! transaction-flavoured set of fields (`contract_addr`, `origin_sender`,
//! `allow_writes`, ...); this generalizes that shape into the frame
//! spec.md describes: one per call/create, holding everything the
//! interpreter needs without reaching outside itself except through
//! [`crate::host`].

use crate::primitives::{Address, Bytes, Hash, Word};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

/// Jump-destination analysis for legacy (non-EOF) code: the set of byte
/// offsets that are valid `JUMP`/`JUMPI` targets (a `JUMPDEST` not itself
/// inside a `PUSH` immediate). Shared by code-hash between frames that
/// re-enter the same code (spec.md §4.I, "inherited by reference ... if
/// the callee's code equals the caller's code").
#[derive(Debug, Clone)]
pub struct JumpdestAnalysis {
    pub code_hash: Hash,
    pub valid: Arc<HashSet<u32>>,
}

impl JumpdestAnalysis {
    pub fn analyze(code: &[u8], code_hash: Hash) -> Self {
        let mut valid = HashSet::new();
        let mut pc = 0usize;
        while pc < code.len() {
            let op = code[pc];
            if op == crate::instructions::opcodes::JUMPDEST {
                valid.insert(pc as u32);
                pc += 1;
            } else if (crate::instructions::opcodes::PUSH1..=crate::instructions::opcodes::PUSH32)
                .contains(&op)
            {
                let n = (op - crate::instructions::opcodes::PUSH1 + 1) as usize;
                pc += 1 + n;
            } else {
                pc += 1;
            }
        }
        Self { code_hash, valid: Arc::new(valid) }
    }

    pub fn is_valid(&self, pc: u32) -> bool {
        self.valid.contains(&pc)
    }
}

/// Where the frame's executable code came from (spec.md §4.I "optional
/// code-source address, distinct from executing address for
/// DELEGATECALL/CALLCODE").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSource {
    /// Code belongs to the executing address itself.
    SelfOwned,
    /// Code was borrowed from another address (CALLCODE/DELEGATECALL, or
    /// an EIP-7702 delegation resolution).
    Delegated(Address),
}

/// One call/create activation record (spec.md §3 "Contract frame").
#[derive(Debug, Clone)]
pub struct Contract {
    pub caller: Address,
    pub address: Address,
    pub code_source: CodeSource,
    pub code: Bytes,
    pub code_hash: Hash,
    pub value: Word,
    pub input: Bytes,
    pub gas_limit: u64,
    pub jumpdests: Option<Rc<JumpdestAnalysis>>,
    pub skip_analysis: bool,
    pub read_only: bool,
    pub is_eof: bool,
    pub code_section: u16,
    pub depth: u32,
    pub eof: Option<crate::eof::EofContainer>,
}

impl Contract {
    pub fn new(
        caller: Address,
        address: Address,
        value: Word,
        input: Bytes,
        gas_limit: u64,
        code: Bytes,
        depth: u32,
    ) -> Self {
        let code_hash = crate::primitives::keccak256(&code);
        let is_eof = crate::eof::is_eof(&code);
        let eof = if is_eof { crate::eof::parse_and_validate(&code).ok() } else { None };
        Self {
            caller,
            address,
            code_source: CodeSource::SelfOwned,
            code,
            code_hash,
            value,
            input,
            gas_limit,
            jumpdests: None,
            skip_analysis: false,
            read_only: false,
            is_eof,
            code_section: 0,
            depth,
            eof,
        }
    }

    /// Bytes of `self.eof`'s `section`-th code section, if this frame is
    /// running EOF code (spec.md §4.I "current `code_section` index for
    /// EOF functions").
    pub fn eof_code_section(&self, section: u16) -> Option<&[u8]> {
        self.eof.as_ref()?.code_sections.get(section as usize).map(|b| b.as_ref())
    }

    /// Lazily performs (or reuses) jump-destination analysis, keyed by
    /// code hash (spec.md §4.I).
    pub fn jumpdests(&mut self) -> Rc<JumpdestAnalysis> {
        if let Some(existing) = &self.jumpdests {
            if existing.code_hash == self.code_hash {
                return existing.clone();
            }
        }
        let analysis = Rc::new(JumpdestAnalysis::analyze(&self.code, self.code_hash));
        self.jumpdests = Some(analysis.clone());
        analysis
    }

    /// `as_delegate(parent)` (spec.md §4.I): rewrites `caller`/`value` to
    /// the parent frame's, so `CALLER`/`CALLVALUE` report the outer
    /// semantics while this frame still executes the delegate's code —
    /// used for `DELEGATECALL` and EIP-7702 delegation resolution.
    pub fn as_delegate(&mut self, parent: &Contract) {
        self.caller = parent.caller;
        self.value = parent.value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_delegate_matches_seed_scenario_s10() {
        let parent = Contract::new(
            Address::from_low_u64_be(0x11),
            Address::from_low_u64_be(0x22),
            Word::from(100),
            Bytes::new(),
            1_000_000,
            Bytes::new(),
            0,
        );
        let mut child = Contract::new(
            Address::from_low_u64_be(0x22),
            Address::from_low_u64_be(0x33),
            Word::zero(),
            Bytes::new(),
            1_000_000,
            Bytes::new(),
            1,
        );
        child.as_delegate(&parent);
        assert_eq!(child.caller, Address::from_low_u64_be(0x11));
        assert_eq!(child.value, Word::from(100));
    }

    #[test]
    fn jumpdest_analysis_skips_push_immediates() {
        use crate::instructions::opcodes::{JUMPDEST, PUSH2};
        // PUSH2 0x5B 0x00, then a real JUMPDEST at offset 3.
        let code = [PUSH2, 0x5B, 0x00, JUMPDEST];
        let hash = crate::primitives::keccak256(&code);
        let analysis = JumpdestAnalysis::analyze(&code, hash);
        assert!(!analysis.is_valid(1)); // inside the PUSH2 immediate
        assert!(analysis.is_valid(3));
    }
}
