//! Hard-fork-versioned EVM bytecode interpreter, gas model, EOF container
//! validator, and precompile registry (spec.md §1 OVERVIEW).
//!
//! This crate has no persistent world-state, consensus, networking, or
//! transaction-pool layer (spec.md §1 Non-goals) — callers supply those
//! through [`host::Host`] and drive execution through [`execute`].

pub mod blob;
pub mod call;
pub mod chain_rules;
pub mod eof;
pub mod error;
pub mod frame;
pub mod gas;
pub mod host;
pub mod instructions;
pub mod interpreter;
pub mod memory;
pub mod precompiles;
pub mod primitives;
pub mod return_stack;
pub mod stack;

pub use blob::compute_blob_versioned_hash;
pub use chain_rules::{ChainRules, Hardfork};
pub use error::{Error, EvmResult};
pub use eof::EofError;
pub use gas::intrinsic::intrinsic_gas;
pub use host::Host;
pub use precompiles::{lookup as lookup_precompile, Precompile};

use crate::call::CallEngine;
use crate::primitives::{Address, Bytes, Word};

/// The message-call or contract-creation request driving one [`execute`]
/// invocation (spec.md §6.3 `call_or_create_args`).
#[derive(Debug, Clone)]
pub enum CallOrCreate {
    Call { caller: Address, target: Address, input: Bytes, gas_limit: u64, value: Word },
    StaticCall { caller: Address, target: Address, input: Bytes, gas_limit: u64 },
    Create { caller: Address, init_code: Bytes, gas_limit: u64, value: Word },
    Create2 { caller: Address, init_code: Bytes, gas_limit: u64, value: Word, salt: Word },
}

/// Output of a completed top-level call or creation (spec.md §6.3
/// `(result, remaining_gas, error?)`, split into a struct plus the two
/// trailing values for named-field access).
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub output: Bytes,
    pub reverted: bool,
}

/// `execute(block_ctx, tx_ctx, rules, state, call_or_create_args)` (spec.md
/// §6.3). `host` bundles the world-state, block, and transaction
/// capabilities the interpreter needs (spec.md §6.1/§6.2); `cancelled` is
/// polled once per instruction to support cooperative termination (spec.md
/// §5 "Timeouts").
pub fn execute(
    host: &mut dyn Host,
    rules: ChainRules,
    args: CallOrCreate,
    cancelled: &dyn Fn() -> bool,
) -> (ExecutionResult, u64, Option<Error>) {
    tracing::debug!(?rules, "executing call/create");
    let mut engine = CallEngine::new(host, rules, cancelled);
    let result = match args {
        CallOrCreate::Call { caller, target, input, gas_limit, value } => {
            engine.call(caller, target, input, gas_limit, value, false)
        }
        CallOrCreate::StaticCall { caller, target, input, gas_limit } => {
            engine.static_call(caller, target, input, gas_limit)
        }
        CallOrCreate::Create { caller, init_code, gas_limit, value } => {
            engine.create(caller, init_code, gas_limit, value)
        }
        CallOrCreate::Create2 { caller, init_code, gas_limit, value, salt } => {
            engine.create2(caller, init_code, gas_limit, value, salt)
        }
    };
    let execution = ExecutionResult { output: result.output, reverted: result.reverted };
    (execution, result.gas_left, result.error)
}

/// `validate_eof(bytes) -> Result<(), EofError>` (spec.md §6.3): parses and
/// validates without handing back the parsed container, for callers that
/// only need a deploy-time accept/reject decision.
pub fn validate_eof(bytes: &[u8]) -> Result<(), EofError> {
    eof::parse_and_validate(bytes).map(|_| ())
}
