//! EOF container round-trip (spec.md §8 property 9: `parse(bytes)` succeeds
//! iff `validate(bytes)` succeeds iff the bytes are a strictly conforming
//! v1 container), exercised through the public [`evm_core::validate_eof`]
//! boundary rather than the internal `eof::parse_and_validate`.

use evm_core::{validate_eof, EofError};

/// A minimal single-section container whose code is just `STOP`.
fn minimal_container(code: &[u8]) -> Vec<u8> {
    let mut out = vec![0xEF, 0x00, 0x01];
    out.push(0x01);
    out.extend_from_slice(&4u16.to_be_bytes());
    out.push(0x02);
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&(code.len() as u16).to_be_bytes());
    out.push(0x04);
    out.extend_from_slice(&0u16.to_be_bytes());
    out.push(0x00);
    out.extend_from_slice(&[0u8, 0u8, 0u8, 0u8]); // inputs=0 outputs=0 max_stack=0
    out.extend_from_slice(code);
    out
}

#[test]
fn minimal_stop_only_container_round_trips() {
    let bytes = minimal_container(&[0x00]);
    assert_eq!(validate_eof(&bytes), Ok(()));
}

#[test]
fn truncated_header_is_rejected() {
    let bytes = minimal_container(&[0x00]);
    let truncated = &bytes[..bytes.len() - 3];
    assert!(validate_eof(truncated).is_err());
}

#[test]
fn bad_magic_is_rejected() {
    let mut bytes = minimal_container(&[0x00]);
    bytes[1] = 0x01;
    assert_eq!(validate_eof(&bytes), Err(EofError::InvalidMagic));
}

#[test]
fn legacy_bytecode_is_not_mistaken_for_eof() {
    // Ordinary PUSH1 1 PUSH1 1 ADD STOP legacy code.
    let legacy = [0x60, 0x01, 0x60, 0x01, 0x01, 0x00];
    assert!(validate_eof(&legacy).is_err());
}
