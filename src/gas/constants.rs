//! Named gas constants (spec.md §4.E). Grounded on the literal constants
//! the teacher already hardcodes inline in `operations.rs`
//! (`table.insert(0x01, Operation::new(..., 3, ...))` for `ADD`,
//! `32000` for `CREATE`, `100`/`2600` warm/cold split referenced in prose)
//! and `vm.rs` (`53000`/`21000` tx base costs, `2400`/`1900` access-list
//! costs) — collected here instead of scattered as magic numbers.

pub const ZERO: u64 = 0;
pub const BASE: u64 = 2;
pub const VERY_LOW: u64 = 3;
pub const LOW: u64 = 5;
pub const MID: u64 = 8;
pub const HIGH: u64 = 10;
pub const JUMPDEST: u64 = 1;

pub const EXP: u64 = 10;
pub const EXP_BYTE_FRONTIER: u64 = 10;
pub const EXP_BYTE_SPURIOUS_DRAGON: u64 = 50;

pub const KECCAK256: u64 = 30;
pub const KECCAK256_WORD: u64 = 6;

pub const SLOAD_FRONTIER: u64 = 50;
pub const SLOAD_WARM: u64 = 100;
pub const COLD_ACCOUNT_ACCESS: u64 = 2600;
pub const COLD_SLOAD: u64 = 2100;
pub const WARM_STORAGE_READ: u64 = 100;

/// Flat `BALANCE`/`EXTCODE*` cost before EIP-150 (Tangerine Whistle).
pub const ACCOUNT_ACCESS_FRONTIER: u64 = 20;
/// Flat `BALANCE`/`EXTCODE*` cost from EIP-150 through pre-Berlin.
pub const ACCOUNT_ACCESS_TANGERINE: u64 = 700;

pub const SSTORE_SET: u64 = 20000;
pub const SSTORE_RESET: u64 = 5000;
pub const SSTORE_CLEARS_REFUND: u64 = 4800; // post-London (EIP-3529)
pub const SSTORE_CLEARS_REFUND_PRE_LONDON: u64 = 15000;
pub const SSTORE_SENTRY_GAS: u64 = 2300;

pub const SELFDESTRUCT: u64 = 5000;
pub const SELFDESTRUCT_NEW_ACCOUNT: u64 = 25000;
pub const SELFDESTRUCT_REFUND_PRE_LONDON: u64 = 24000;

pub const CALL_BASE: u64 = 40;
pub const CALL_STIPEND: u64 = 2300;
pub const CALL_VALUE_TRANSFER: u64 = 9000;
pub const CALL_NEW_ACCOUNT: u64 = 25000;
pub const WARM_CALL: u64 = 100;

pub const CREATE: u64 = 32000;
pub const CREATE_DATA_BYTE: u64 = 200;
pub const INITCODE_WORD_COST: u64 = 2;
pub const MAX_INITCODE_SIZE: usize = 2 * 24576;
pub const MAX_CODE_SIZE: usize = 24576;

pub const LOG: u64 = 375;
pub const LOG_DATA_BYTE: u64 = 8;
pub const LOG_TOPIC: u64 = 375;

pub const COPY_WORD: u64 = 3;

pub const TX_BASE: u64 = 21000;
pub const TX_CREATE: u64 = 53000;
pub const TX_DATA_ZERO: u64 = 4;
pub const TX_DATA_NON_ZERO: u64 = 16;
pub const TX_DATA_NON_ZERO_FRONTIER: u64 = 68;
pub const TX_ACCESS_LIST_ADDRESS: u64 = 2400;
pub const TX_ACCESS_LIST_STORAGE_KEY: u64 = 1900;

/// EIP-7623 (Pectra): per-token floor costs and the size of a calldata
/// "token" (one non-zero byte, or 4 zero bytes).
pub const TOTAL_COST_FLOOR_PER_TOKEN: u64 = 10;
pub const STANDARD_TOKEN_COST: u64 = 4;

/// Maximum fraction of gas used refundable post-London (EIP-3529): `1/5`.
pub const MAX_REFUND_QUOTIENT_LONDON: u64 = 5;
/// Pre-London quotient was `1/2`.
pub const MAX_REFUND_QUOTIENT_PRE_LONDON: u64 = 2;

/// The `63/64` rule divisor for gas forwarded on calls (EIP-150).
pub const CALL_GAS_RETENTION_DIVISOR: u64 = 64;

pub const BLOCKHASH: u64 = 20;

/// EOF-only opcode base costs (spec.md §4.H), keyed to their own EIPs
/// (4200, 4750, 6206, 7480, 7069) since the teacher's table predates EOF.
pub const RJUMP: u64 = 2;
pub const RJUMPI: u64 = 4;
pub const RJUMPV: u64 = 4;
pub const CALLF: u64 = 5;
pub const RETF: u64 = 3;
pub const JUMPF: u64 = 5;
pub const DUPN: u64 = 3;
pub const SWAPN: u64 = 3;
pub const EXCHANGE: u64 = 3;
pub const DATALOAD: u64 = 4;
pub const DATALOADN: u64 = 3;
pub const DATASIZE: u64 = 2;
pub const DATACOPY: u64 = 3;
