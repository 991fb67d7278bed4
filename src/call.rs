//! Call/Create engine (spec.md §4.K): the seven-step protocol around a
//! [`crate::interpreter::Interpreter`] run — snapshotting, depth limiting,
//! balance checks, delegation-designator resolution, precompile
//! short-circuiting, and commit/revert/gas-consumption on exit.
//!
//! The teacher's `vm.rs::Evm::evm_call` sketches the same shape (snapshot,
//! depth check, `todo!()` for the actual interpreter hookup) but never
//! completes it; this fills in the full protocol spec.md describes.

use crate::chain_rules::ChainRules;
use crate::error::{Error, EvmResult};
use crate::frame::{CodeSource, Contract};
use crate::gas::{self, constants};
use crate::host::Host;
use crate::interpreter::{Interpreter, Outcome};
use crate::primitives::{keccak256, Address, Bytes, Word};

/// Maximum call-stack depth (spec.md §4.K).
pub const MAX_CALL_DEPTH: u32 = 1024;

/// Outcome of a `call`/`create` entry point: output bytes, gas left, and an
/// error if the frame didn't complete normally (`Revert` is reported as
/// `Ok` with `reverted = true`, since its gas/output are still meaningful).
#[derive(Debug, Clone)]
pub struct CallResult {
    pub output: Bytes,
    pub gas_left: u64,
    pub reverted: bool,
    pub error: Option<Error>,
}

impl CallResult {
    fn halt(output: Bytes, gas_left: u64) -> Self {
        Self { output, gas_left, reverted: false, error: None }
    }
    fn revert(output: Bytes, gas_left: u64) -> Self {
        Self { output, gas_left, reverted: true, error: None }
    }
    fn failed(error: Error) -> Self {
        Self { output: Bytes::new(), gas_left: 0, reverted: false, error: Some(error) }
    }
}

/// What kind of frame a call enters — drives `CALLER`/`CALLVALUE`/
/// storage-context rewriting (spec.md §4.K).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
}

/// Owns the host reference, active fork, and recursion depth threaded
/// through every nested call/create (spec.md §4.K, §6.1).
pub struct CallEngine<'a> {
    pub host: &'a mut dyn Host,
    pub rules: ChainRules,
    pub depth: u32,
    cancelled: &'a dyn Fn() -> bool,
}

impl<'a> CallEngine<'a> {
    pub fn new(host: &'a mut dyn Host, rules: ChainRules, cancelled: &'a dyn Fn() -> bool) -> Self {
        Self { host, rules, depth: 0, cancelled }
    }

    pub fn call(
        &mut self,
        caller: Address,
        target: Address,
        input: Bytes,
        gas: u64,
        value: Word,
        read_only: bool,
    ) -> CallResult {
        self.enter(CallKind::Call, caller, target, target, input, gas, value, read_only)
    }

    pub fn call_code(
        &mut self,
        caller: Address,
        target: Address,
        input: Bytes,
        gas: u64,
        value: Word,
        read_only: bool,
    ) -> CallResult {
        self.enter(CallKind::CallCode, caller, caller, target, input, gas, value, read_only)
    }

    /// `DELEGATECALL`: runs `target`'s code against the *current* frame's
    /// own storage/balance (`frame_address`), preserving the current
    /// frame's `msg.sender`/`msg.value` (`frame_caller`/`frame_value`)
    /// rather than rewriting them to the immediate caller (spec.md §4.K).
    /// `read_only` is the *calling* frame's write-protection flag, which
    /// must propagate into the child frame even though `DELEGATECALL`
    /// itself carries no value operand to gate here (EIP-214's recursive
    /// propagation requirement).
    #[allow(clippy::too_many_arguments)]
    pub fn delegate_call(
        &mut self,
        frame_caller: Address,
        frame_address: Address,
        frame_value: Word,
        target: Address,
        input: Bytes,
        gas: u64,
        read_only: bool,
    ) -> CallResult {
        self.enter(CallKind::DelegateCall, frame_caller, frame_address, target, input, gas, frame_value, read_only)
    }

    pub fn static_call(&mut self, caller: Address, target: Address, input: Bytes, gas: u64) -> CallResult {
        self.enter(CallKind::StaticCall, caller, target, target, input, gas, Word::zero(), true)
    }

    /// Shared implementation of `call`/`call_code`/`delegate_call`/
    /// `static_call` (spec.md §4.K protocol steps 1-7). `frame_caller`/
    /// `frame_value` become the new frame's `CALLER`/`CALLVALUE`;
    /// `exec_address` is the address whose storage/balance the frame
    /// operates against; `code_address` is the address code is fetched
    /// from (all three differ for `CALLCODE`/`DELEGATECALL`).
    #[allow(clippy::too_many_arguments)]
    fn enter(
        &mut self,
        kind: CallKind,
        frame_caller: Address,
        exec_address: Address,
        code_address: Address,
        input: Bytes,
        gas: u64,
        frame_value: Word,
        read_only: bool,
    ) -> CallResult {
        tracing::debug!(?kind, depth = self.depth, %exec_address, "entering call frame");
        let caller = frame_caller;
        let value = frame_value;
        if self.depth >= MAX_CALL_DEPTH {
            return CallResult::failed(Error::InvalidCallDepth);
        }
        let snapshot = self.host.snapshot();

        if !value.is_zero() && matches!(kind, CallKind::Call | CallKind::CallCode) {
            if self.host.balance(caller) < value {
                self.host.revert_to(snapshot);
                return CallResult::revert(Bytes::new(), gas);
            }
            self.host.sub_balance(caller, value);
            self.host.add_balance(exec_address, value);
        }

        let (resolved_code_address, delegation_surcharge) = self.resolve_delegation(code_address);

        if let Some(precompile) = crate::precompiles::lookup(self.rules, resolved_code_address) {
            let required = precompile.required_gas(&input);
            let total_gas = required.saturating_add(delegation_surcharge);
            if total_gas > gas {
                self.host.revert_to(snapshot);
                return CallResult::failed(Error::OutOfGas);
            }
            return match precompile.run(&input) {
                Ok(output) => CallResult::halt(output, gas - total_gas),
                Err(err) => {
                    self.host.revert_to(snapshot);
                    CallResult::failed(err)
                }
            };
        }

        let code = self.host.code(resolved_code_address);
        let code_gas = gas.saturating_sub(delegation_surcharge);
        let mut contract = Contract::new(caller, exec_address, value, input, code_gas, code, self.depth + 1);
        if resolved_code_address != exec_address {
            contract.code_source = CodeSource::Delegated(resolved_code_address);
        }
        contract.read_only = read_only;

        self.depth += 1;
        let mut interp = Interpreter::new(contract, self.rules);
        let outcome = interp.run(self, self.cancelled);
        self.depth -= 1;

        match outcome {
            Outcome::Halt { output, gas_remaining } => CallResult::halt(output, gas_remaining),
            Outcome::Revert { output, gas_remaining } => {
                self.host.revert_to(snapshot);
                CallResult::revert(output, gas_remaining)
            }
            Outcome::Error(err) => {
                self.host.revert_to(snapshot);
                if err.consumes_all_gas() {
                    CallResult::failed(err)
                } else {
                    CallResult { output: Bytes::new(), gas_left: 0, reverted: false, error: Some(err) }
                }
            }
        }
    }

    /// Resolves the EIP-7702 delegation designator, if any, warming the
    /// delegated address and returning the cold-access surcharge to charge
    /// on top of the call's own access cost (spec.md §4.K step 4).
    fn resolve_delegation(&mut self, code_address: Address) -> (Address, u64) {
        let code = self.host.code(code_address);
        match crate::primitives::delegation::parse_delegation(&code) {
            Some(delegated) => {
                let already_warm = self.host.mark_address_warm(delegated);
                let surcharge = if already_warm { 0 } else { constants::COLD_ACCOUNT_ACCESS };
                (delegated, surcharge)
            }
            None => (code_address, 0),
        }
    }

    pub fn create(&mut self, caller: Address, init_code: Bytes, gas: u64, endowment: Word) -> CallResult {
        let nonce = self.host.nonce(caller);
        let address = create_address(caller, nonce);
        self.enter_create(caller, address, init_code, gas, endowment)
    }

    pub fn create2(&mut self, caller: Address, init_code: Bytes, gas: u64, endowment: Word, salt: Word) -> CallResult {
        let address = create2_address(caller, salt, &init_code);
        self.enter_create(caller, address, init_code, gas, endowment)
    }

    fn enter_create(&mut self, caller: Address, address: Address, init_code: Bytes, gas: u64, endowment: Word) -> CallResult {
        if self.depth >= MAX_CALL_DEPTH {
            return CallResult::failed(Error::InvalidCallDepth);
        }
        if init_code.len() > constants::MAX_INITCODE_SIZE {
            return CallResult::failed(Error::MaxCodeSizeExceeded);
        }
        let snapshot = self.host.snapshot();

        if self.host.balance(caller) < endowment {
            self.host.revert_to(snapshot);
            return CallResult::revert(Bytes::new(), gas);
        }
        self.host.sub_balance(caller, endowment);
        self.host.add_balance(address, endowment);
        self.host.set_nonce(caller, self.host.nonce(caller) + 1);

        let contract = Contract::new(caller, address, endowment, Bytes::new(), gas, init_code, self.depth + 1);
        self.depth += 1;
        let mut interp = Interpreter::new(contract, self.rules);
        let outcome = interp.run(self, self.cancelled);
        self.depth -= 1;

        match outcome {
            Outcome::Halt { output, gas_remaining } => {
                if output.len() > constants::MAX_CODE_SIZE {
                    self.host.revert_to(snapshot);
                    return CallResult::failed(Error::MaxCodeSizeExceeded);
                }
                let deploy_cost = constants::CREATE_DATA_BYTE * output.len() as u64;
                if deploy_cost > gas_remaining {
                    self.host.revert_to(snapshot);
                    return CallResult::failed(Error::OutOfGas);
                }
                self.host.set_code(address, output.clone());
                CallResult::halt(address_to_output(address), gas_remaining - deploy_cost)
            }
            Outcome::Revert { output, gas_remaining } => {
                self.host.revert_to(snapshot);
                CallResult::revert(output, gas_remaining)
            }
            Outcome::Error(err) => {
                self.host.revert_to(snapshot);
                CallResult::failed(err)
            }
        }
    }
}

fn address_to_output(address: Address) -> Bytes {
    Bytes::copy_from_slice(address.as_bytes())
}

/// RLP-encodes `(sender, nonce)` just enough to compute `CREATE`'s address;
/// not a general-purpose RLP encoder (out of scope — spec.md §1 excludes
/// wire-format/serialization concerns beyond this one formula).
fn rlp_sender_nonce(sender: Address, nonce: u64) -> Vec<u8> {
    fn rlp_bytes(bytes: &[u8]) -> Vec<u8> {
        if bytes.len() == 1 && bytes[0] < 0x80 {
            return bytes.to_vec();
        }
        let mut out = vec![0x80 + bytes.len() as u8];
        out.extend_from_slice(bytes);
        out
    }
    let nonce_bytes = if nonce == 0 {
        vec![]
    } else {
        nonce.to_be_bytes().into_iter().skip_while(|b| *b == 0).collect::<Vec<_>>()
    };
    let sender_rlp = {
        let mut out = vec![0x80 + 20u8];
        out.extend_from_slice(sender.as_bytes());
        out
    };
    let nonce_rlp = rlp_bytes(&nonce_bytes);
    let mut payload = sender_rlp;
    payload.extend_from_slice(&nonce_rlp);
    let mut out = vec![0xc0 + payload.len() as u8];
    out.extend_from_slice(&payload);
    out
}

/// `CREATE`'s deployed address: `keccak256(rlp(sender, nonce))[12:]`.
pub fn create_address(sender: Address, nonce: u64) -> Address {
    let encoded = rlp_sender_nonce(sender, nonce);
    let hash = keccak256(&encoded);
    Address::from_slice(&hash.as_bytes()[12..])
}

/// `CREATE2`'s deployed address: `keccak256(0xff || sender || salt ||
/// keccak256(init_code))[12:]`.
pub fn create2_address(sender: Address, salt: Word, init_code: &[u8]) -> Address {
    let mut buf = Vec::with_capacity(1 + 20 + 32 + 32);
    buf.push(0xff);
    buf.extend_from_slice(sender.as_bytes());
    buf.extend_from_slice(&salt.to_big_endian());
    buf.extend_from_slice(keccak256(init_code).as_bytes());
    let hash = keccak256(&buf);
    Address::from_slice(&hash.as_bytes()[12..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_address_is_deterministic_and_nonce_sensitive() {
        let sender = Address::from_low_u64_be(1);
        let a = create_address(sender, 0);
        let b = create_address(sender, 0);
        let c = create_address(sender, 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn create2_address_is_salt_sensitive() {
        let sender = Address::from_low_u64_be(1);
        let init = b"\x60\x00\x60\x00\xf3";
        let a = create2_address(sender, Word::from(1), init);
        let b = create2_address(sender, Word::from(2), init);
        assert_ne!(a, b);
    }
}
