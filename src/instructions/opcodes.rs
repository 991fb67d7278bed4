//! Opcode byte values (spec.md §4.F/§4.G/§4.H). One flat list shared by the
//! instruction table, the interpreter's fetch/dispatch step, and the EOF
//! validator's instruction walk.
//!
//! The teacher's `operations.rs` only ever names `ADD` (`0x01`) inline;
//! this enumerates the full set spec.md's opcode handlers and EOF
//! invariants reference.

#![allow(dead_code)]

pub const STOP: u8 = 0x00;
pub const ADD: u8 = 0x01;
pub const MUL: u8 = 0x02;
pub const SUB: u8 = 0x03;
pub const DIV: u8 = 0x04;
pub const SDIV: u8 = 0x05;
pub const MOD: u8 = 0x06;
pub const SMOD: u8 = 0x07;
pub const ADDMOD: u8 = 0x08;
pub const MULMOD: u8 = 0x09;
pub const EXP: u8 = 0x0a;
pub const SIGNEXTEND: u8 = 0x0b;

pub const LT: u8 = 0x10;
pub const GT: u8 = 0x11;
pub const SLT: u8 = 0x12;
pub const SGT: u8 = 0x13;
pub const EQ: u8 = 0x14;
pub const ISZERO: u8 = 0x15;
pub const AND: u8 = 0x16;
pub const OR: u8 = 0x17;
pub const XOR: u8 = 0x18;
pub const NOT: u8 = 0x19;
pub const BYTE: u8 = 0x1a;
pub const SHL: u8 = 0x1b;
pub const SHR: u8 = 0x1c;
pub const SAR: u8 = 0x1d;
pub const CLZ: u8 = 0x1e; // EIP-7939, Prague+

pub const KECCAK256: u8 = 0x20;

pub const ADDRESS: u8 = 0x30;
pub const BALANCE: u8 = 0x31;
pub const ORIGIN: u8 = 0x32;
pub const CALLER: u8 = 0x33;
pub const CALLVALUE: u8 = 0x34;
pub const CALLDATALOAD: u8 = 0x35;
pub const CALLDATASIZE: u8 = 0x36;
pub const CALLDATACOPY: u8 = 0x37;
pub const CODESIZE: u8 = 0x38;
pub const CODECOPY: u8 = 0x39;
pub const GASPRICE: u8 = 0x3a;
pub const EXTCODESIZE: u8 = 0x3b;
pub const EXTCODECOPY: u8 = 0x3c;
pub const RETURNDATASIZE: u8 = 0x3d;
pub const RETURNDATACOPY: u8 = 0x3e;
pub const EXTCODEHASH: u8 = 0x3f;

pub const BLOCKHASH: u8 = 0x40;
pub const COINBASE: u8 = 0x41;
pub const TIMESTAMP: u8 = 0x42;
pub const NUMBER: u8 = 0x43;
pub const PREVRANDAO: u8 = 0x44; // a.k.a. DIFFICULTY pre-Merge
pub const GASLIMIT: u8 = 0x45;
pub const CHAINID: u8 = 0x46;
pub const SELFBALANCE: u8 = 0x47;
pub const BASEFEE: u8 = 0x48;
pub const BLOBHASH: u8 = 0x49;
pub const BLOBBASEFEE: u8 = 0x4a;

pub const POP: u8 = 0x50;
pub const MLOAD: u8 = 0x51;
pub const MSTORE: u8 = 0x52;
pub const MSTORE8: u8 = 0x53;
pub const SLOAD: u8 = 0x54;
pub const SSTORE: u8 = 0x55;
pub const JUMP: u8 = 0x56;
pub const JUMPI: u8 = 0x57;
pub const PC: u8 = 0x58;
pub const MSIZE: u8 = 0x59;
pub const GAS: u8 = 0x5a;
pub const JUMPDEST: u8 = 0x5b;
pub const TLOAD: u8 = 0x5c;
pub const TSTORE: u8 = 0x5d;
pub const MCOPY: u8 = 0x5e;
pub const PUSH0: u8 = 0x5f;

pub const PUSH1: u8 = 0x60;
pub const PUSH32: u8 = 0x7f;

pub const DUP1: u8 = 0x80;
pub const DUP16: u8 = 0x8f;

pub const SWAP1: u8 = 0x90;
pub const SWAP16: u8 = 0x9f;

pub const LOG0: u8 = 0xa0;
pub const LOG4: u8 = 0xa4;

// EOF-only (spec.md §4.H).
pub const DATALOAD: u8 = 0xd0;
pub const DATALOADN: u8 = 0xd1;
pub const DATASIZE: u8 = 0xd2;
pub const DATACOPY: u8 = 0xd3;
pub const RJUMP: u8 = 0xe0;
pub const RJUMPI: u8 = 0xe1;
pub const RJUMPV: u8 = 0xe2;
pub const CALLF: u8 = 0xe3;
pub const RETF: u8 = 0xe4;
pub const JUMPF: u8 = 0xe5;
pub const DUPN: u8 = 0xe6;
pub const SWAPN: u8 = 0xe7;
pub const EXCHANGE: u8 = 0xe8;
pub const EOFCREATE: u8 = 0xec;
pub const RETURNCONTRACT: u8 = 0xee;

pub const CREATE: u8 = 0xf0;
pub const CALL: u8 = 0xf1;
pub const CALLCODE: u8 = 0xf2;
pub const RETURN: u8 = 0xf3;
pub const DELEGATECALL: u8 = 0xf4;
pub const CREATE2: u8 = 0xf5;
pub const RETURNDATALOAD: u8 = 0xf7;
pub const EXTCALL: u8 = 0xf8;
pub const EXTDELEGATECALL: u8 = 0xf9;
pub const STATICCALL: u8 = 0xfa;
pub const EXTSTATICCALL: u8 = 0xfb;
pub const REVERT: u8 = 0xfd;
pub const INVALID: u8 = 0xfe;
pub const SELFDESTRUCT: u8 = 0xff;

/// Opcodes legacy code is allowed to use but EOF containers reject
/// outright (spec.md §3 EOF invariants: "Legacy jump opcodes ..., code
/// introspection ..., `CALL`-variants disabled in EOF, deprecated
/// `SELFDESTRUCT`, `CALLCODE`, and legacy `CREATE`/`CREATE2`/`GAS`").
pub fn is_disabled_in_eof(op: u8) -> bool {
    matches!(
        op,
        JUMP | JUMPI
            | PC
            | JUMPDEST
            | CODESIZE
            | CODECOPY
            | EXTCODESIZE
            | EXTCODECOPY
            | EXTCODEHASH
            | CALL
            | CALLCODE
            | DELEGATECALL
            | STATICCALL
            | CREATE
            | CREATE2
            | SELFDESTRUCT
            | GAS
    )
}

/// Immediate operand length in bytes following the opcode, where
/// statically known. `RJUMPV`'s immediate length depends on its first
/// immediate byte and is handled specially by callers.
pub fn immediate_size(op: u8) -> Option<usize> {
    match op {
        PUSH1..=PUSH32 => Some((op - PUSH1 + 1) as usize),
        RJUMP | RJUMPI => Some(2),
        CALLF | JUMPF | DATALOADN => Some(2),
        DUPN | SWAPN | EXCHANGE => Some(1),
        EOFCREATE | RETURNCONTRACT => Some(1),
        _ => None,
    }
}

/// `true` for opcodes after which control never falls through to the next
/// byte (spec.md §4.H code-section validation, "every byte is either the
/// start of a valid opcode").
pub fn is_terminator(op: u8) -> bool {
    matches!(op, STOP | RETURN | REVERT | INVALID | RETF | JUMPF | RJUMP | RETURNCONTRACT)
}

/// Static `(pop, push)` stack effect for opcodes whose effect doesn't
/// depend on call-site context (immediate bytes, a called section's type
/// entry, ...). `None` for opcodes the caller must special-case: `DUPN`/
/// `SWAPN`/`RJUMPV` (effect depends on immediate bytes), `CALLF`/`JUMPF`/
/// `RETF` (depends on the target section's type entry), and the
/// call/create family (depends on whether EOF or legacy dispatch applies).
pub fn stack_effect(op: u8) -> Option<(u16, u16)> {
    match op {
        STOP => Some((0, 0)),
        ADD | MUL | SUB | DIV | SDIV | MOD | SMOD | SIGNEXTEND => Some((2, 1)),
        ADDMOD | MULMOD => Some((3, 1)),
        EXP => Some((2, 1)),
        LT | GT | SLT | SGT | EQ | AND | OR | XOR | BYTE | SHL | SHR | SAR => Some((2, 1)),
        ISZERO | NOT | CLZ => Some((1, 1)),
        KECCAK256 => Some((2, 1)),
        ADDRESS | ORIGIN | CALLER | CALLVALUE | CALLDATASIZE | CODESIZE | GASPRICE
        | RETURNDATASIZE | COINBASE | TIMESTAMP | NUMBER | PREVRANDAO | GASLIMIT | CHAINID
        | SELFBALANCE | BASEFEE | BLOBBASEFEE | MSIZE | GAS | PC | DATASIZE => Some((0, 1)),
        BALANCE | CALLDATALOAD | EXTCODESIZE | EXTCODEHASH | BLOCKHASH | MLOAD | SLOAD
        | TLOAD | DATALOAD | RETURNDATALOAD => Some((1, 1)),
        BLOBHASH => Some((1, 1)),
        CALLDATACOPY | CODECOPY | RETURNDATACOPY | MCOPY | DATACOPY => Some((3, 0)),
        EXTCODECOPY => Some((4, 0)),
        POP => Some((1, 0)),
        MSTORE | MSTORE8 | SSTORE | TSTORE => Some((2, 0)),
        JUMP => Some((1, 0)),
        JUMPI => Some((2, 0)),
        JUMPDEST => Some((0, 0)),
        PUSH0 => Some((0, 1)),
        PUSH1..=PUSH32 => Some((0, 1)),
        DUP1..=DUP16 => {
            let n = (op - DUP1 + 1) as u16;
            Some((n, n + 1))
        }
        SWAP1..=SWAP16 => {
            let n = (op - SWAP1 + 1) as u16;
            Some((n + 1, n + 1))
        }
        LOG0..=LOG4 => {
            let n = (op - LOG0) as u16;
            Some((2 + n, 0))
        }
        DATALOADN => Some((0, 1)),
        RJUMP => Some((0, 0)),
        RJUMPI => Some((1, 0)),
        CREATE => Some((3, 1)),
        CREATE2 => Some((4, 1)),
        CALL => Some((7, 1)),
        CALLCODE => Some((7, 1)),
        DELEGATECALL => Some((6, 1)),
        STATICCALL => Some((6, 1)),
        EXTCALL => Some((4, 1)),
        EXTDELEGATECALL | EXTSTATICCALL => Some((3, 1)),
        RETURN | REVERT => Some((2, 0)),
        SELFDESTRUCT => Some((1, 0)),
        INVALID => Some((0, 0)),
        EOFCREATE => Some((4, 1)),
        RETURNCONTRACT => Some((2, 0)),
        _ => None,
    }
}
