//! Execution error taxonomy (spec.md §7).
//!
//! The teacher (`operations.rs`) references an `EvmError` enum
//! (`EvmError::CallDepthExceeded`, `::InsufficientBalance`, ...) without a
//! definition in the retrieved sources; `vm.rs` otherwise returns
//! `anyhow::Result`. A library whose callers need to match
//! `ExecutionReverted` (gas kept) against `OutOfGas` (gas consumed) needs a
//! concrete enum rather than an opaque `anyhow::Error`, so this crate
//! generalizes the teacher's implied `EvmError` into a `thiserror`-derived
//! type — `thiserror` is already part of the pack's idiom (see DESIGN.md).

use thiserror::Error;

/// Every way a contract frame's execution can end abnormally.
///
/// See spec.md §7 for the gas-disposition table; [`Error::consumes_all_gas`]
/// encodes the same rule in code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("stack underflow")]
    StackUnderflow,
    #[error("stack overflow")]
    StackOverflow,
    #[error("undefined instruction 0x{0:02x}")]
    UndefinedInstruction(u8),
    #[error("out of gas")]
    OutOfGas,
    #[error("gas calculation overflowed")]
    GasUintOverflow,
    #[error("write protection: state-mutating op under STATICCALL")]
    WriteProtection,
    #[error("invalid jump destination")]
    InvalidJump,
    #[error("return data access out of bounds")]
    ReturnDataOutOfBounds,
    #[error("deployed code size exceeds the maximum")]
    MaxCodeSizeExceeded,
    #[error("invalid EOF container: {0}")]
    InvalidCode(#[from] crate::eof::EofError),
    #[error("call depth exceeds the maximum of 1024")]
    InvalidCallDepth,
    #[error("execution reverted")]
    ExecutionReverted,
    #[error("execution cancelled")]
    Cancelled,
    #[error("precompile input malformed: {0}")]
    PrecompileError(String),
    #[error("memory or offset/length overflowed a usize")]
    MemoryOutOfBounds,
    #[error("insufficient balance for value transfer")]
    InsufficientBalance,
}

impl Error {
    /// Whether this error burns all gas remaining in the frame (spec.md §7).
    /// Only `ExecutionReverted` and `Cancelled` are exempt.
    pub fn consumes_all_gas(&self) -> bool {
        !matches!(self, Error::ExecutionReverted | Error::Cancelled)
    }
}

/// Result type used throughout the interpreter and call engine.
pub type EvmResult<T> = Result<T, Error>;
