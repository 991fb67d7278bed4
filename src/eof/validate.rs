//! EOF code-section validation (spec.md §4.H items 1-5: instruction walk,
//! static-jump-target check, function-index check, data-offset check,
//! EIP-5450 stack validation).

use super::container::EofContainer;
use super::error::EofError;
use crate::instructions::opcodes::{self, *};
use std::collections::VecDeque;

/// Validates every code section of `container` (spec.md §4.H). Structural
/// parsing already happened in [`super::container::parse`]; this is the
/// semantic pass.
pub fn validate(container: &EofContainer) -> Result<(), EofError> {
    for (section_index, code) in container.code_sections.iter().enumerate() {
        let instruction_starts = walk_instructions(code, section_index, container)?;
        check_static_jumps(code, section_index, &instruction_starts)?;
        validate_stack_heights(code, section_index, container, &instruction_starts)?;
    }
    Ok(())
}

/// Instruction-walk pass (spec.md §4.H item 1): every byte is either the
/// start of a valid, in-bounds opcode or an immediate operand byte.
/// Returns the set of valid instruction-start offsets.
fn walk_instructions(
    code: &[u8],
    section_index: usize,
    container: &EofContainer,
) -> Result<Vec<bool>, EofError> {
    let mut starts = vec![false; code.len()];
    let mut pc = 0usize;
    let mut last_was_terminator = false;

    while pc < code.len() {
        let op = code[pc];
        starts[pc] = true;
        last_was_terminator = opcodes::is_terminator(op);

        if opcodes::is_disabled_in_eof(op) {
            return Err(EofError::UndefinedInstruction(op, section_index));
        }

        let imm_len = match op {
            RJUMPV => {
                let count_pos = pc + 1;
                if count_pos >= code.len() {
                    return Err(EofError::TruncatedImmediate(op, section_index));
                }
                let n = code[count_pos] as usize + 1;
                1 + n * 2
            }
            DATALOADN => {
                let n = opcodes::immediate_size(op).unwrap();
                let offset_pos = pc + 1;
                if offset_pos + 2 > code.len() {
                    return Err(EofError::TruncatedImmediate(op, section_index));
                }
                let offset = u16::from_be_bytes([code[offset_pos], code[offset_pos + 1]]) as usize;
                if offset + 32 > container.data_size_declared {
                    return Err(EofError::InvalidDataLoadNOffset(section_index));
                }
                n
            }
            CALLF | JUMPF => {
                let n = opcodes::immediate_size(op).unwrap();
                let idx_pos = pc + 1;
                if idx_pos + 2 > code.len() {
                    return Err(EofError::TruncatedImmediate(op, section_index));
                }
                let idx = u16::from_be_bytes([code[idx_pos], code[idx_pos + 1]]);
                if idx as usize >= container.code_sections.len() {
                    return Err(EofError::InvalidCodeSectionIndex(idx, section_index));
                }
                n
            }
            EOFCREATE | RETURNCONTRACT => {
                let n = opcodes::immediate_size(op).unwrap();
                let idx_pos = pc + 1;
                if idx_pos >= code.len() {
                    return Err(EofError::TruncatedImmediate(op, section_index));
                }
                let idx = code[idx_pos] as usize;
                if idx >= container.container_sections.len() {
                    return Err(EofError::InvalidJumpTarget(section_index));
                }
                n
            }
            _ => match opcodes::immediate_size(op) {
                Some(n) => n,
                None => {
                    if !is_known_opcode(op) {
                        return Err(EofError::UndefinedInstruction(op, section_index));
                    }
                    0
                }
            },
        };

        if pc + 1 + imm_len > code.len() {
            return Err(EofError::TruncatedImmediate(op, section_index));
        }
        pc += 1 + imm_len;
    }

    if pc != code.len() {
        return Err(EofError::MisalignedEnd(section_index));
    }
    if !last_was_terminator {
        return Err(EofError::MissingTerminatingInstruction(section_index));
    }
    Ok(starts)
}

/// Whether `op` is any opcode the instruction table can ever dispatch
/// (spec.md §4.F's table is the ground truth; here we only need to reject
/// genuinely undefined bytes left out of both the legacy and EOF sets).
fn is_known_opcode(op: u8) -> bool {
    opcodes::stack_effect(op).is_some()
        || matches!(
            op,
            DUPN | SWAPN | EXCHANGE | RJUMPV | RJUMP | RJUMPI | CALLF | JUMPF | RETF | DATALOADN
        )
}

/// Static-jump-target and function-index checks (spec.md §4.H items 2-3).
/// Function-index bounds were already checked inline during the
/// instruction walk; this only re-walks for `RJUMP`/`RJUMPI`/`RJUMPV`
/// target bounds, since those need the full `starts` bitmap which isn't
/// available until the walk finishes.
fn check_static_jumps(code: &[u8], section_index: usize, starts: &[bool]) -> Result<(), EofError> {
    let mut pc = 0usize;
    while pc < code.len() {
        let op = code[pc];
        let imm_len = match op {
            RJUMPV => code[pc + 1] as usize * 2 + 3,
            _ => opcodes::immediate_size(op).unwrap_or(0),
        };

        match op {
            RJUMP | RJUMPI => {
                let off = i16::from_be_bytes([code[pc + 1], code[pc + 2]]);
                let next = pc + 1 + imm_len;
                check_relative_target(code.len(), section_index, next, off, starts)?;
            }
            RJUMPV => {
                let n = code[pc + 1] as usize + 1;
                let next = pc + 1 + imm_len;
                for i in 0..n {
                    let base = pc + 2 + i * 2;
                    let off = i16::from_be_bytes([code[base], code[base + 1]]);
                    check_relative_target(code.len(), section_index, next, off, starts)?;
                }
            }
            _ => {}
        }
        pc += 1 + imm_len;
    }
    Ok(())
}

fn check_relative_target(
    code_len: usize,
    section_index: usize,
    from: usize,
    offset: i16,
    starts: &[bool],
) -> Result<(), EofError> {
    let target = from as i64 + offset as i64;
    if target < 0 || target as usize >= code_len || !starts[target as usize] {
        return Err(EofError::InvalidJumpTarget(section_index));
    }
    Ok(())
}

/// EIP-5450 stack-height validation (spec.md §4.H item 5): simulates the
/// stack-height lattice across the control-flow graph; the declared
/// `max_stack_height` must equal the simulated maximum, and no path may
/// underflow.
fn validate_stack_heights(
    code: &[u8],
    section_index: usize,
    container: &EofContainer,
    starts: &[bool],
) -> Result<(), EofError> {
    let declared = container.types[section_index];
    let mut height_at: Vec<Option<u16>> = vec![None; code.len()];
    let mut queue = VecDeque::new();
    queue.push_back((0usize, declared.inputs as u16));
    height_at[0] = Some(declared.inputs as u16);
    let mut max_height = declared.inputs as u16;

    while let Some((pc, height)) = queue.pop_front() {
        let op = code[pc];
        let (pop, push, terminates, next_pcs) =
            instruction_effect(code, pc, op, section_index, container, starts)?;

        if height < pop {
            return Err(EofError::StackUnderflow(section_index));
        }
        let new_height = height - pop + push;
        if new_height > 1024 {
            return Err(EofError::StackOverflow(section_index));
        }
        max_height = max_height.max(new_height);

        if terminates {
            continue;
        }
        for next in next_pcs {
            match height_at[next] {
                Some(existing) if existing != new_height => {
                    return Err(EofError::StackHeightMismatch {
                        section: section_index,
                        declared: existing,
                        computed: new_height,
                    });
                }
                Some(_) => {}
                None => {
                    height_at[next] = Some(new_height);
                    queue.push_back((next, new_height));
                }
            }
        }
    }

    if max_height != declared.max_stack_height {
        return Err(EofError::StackHeightMismatch {
            section: section_index,
            declared: declared.max_stack_height,
            computed: max_height,
        });
    }
    Ok(())
}

/// Returns `(pop, push, terminates, successor_offsets)` for the
/// instruction at `pc`.
fn instruction_effect(
    code: &[u8],
    pc: usize,
    op: u8,
    section_index: usize,
    container: &EofContainer,
    starts: &[bool],
) -> Result<(u16, u16, bool, Vec<usize>), EofError> {
    let next_linear = |imm_len: usize| pc + 1 + imm_len;

    match op {
        RJUMP => {
            let off = i16::from_be_bytes([code[pc + 1], code[pc + 2]]);
            let target = (next_linear(2) as i64 + off as i64) as usize;
            Ok((0, 0, true, vec![target]))
        }
        RJUMPI => {
            let off = i16::from_be_bytes([code[pc + 1], code[pc + 2]]);
            let target = (next_linear(2) as i64 + off as i64) as usize;
            Ok((1, 0, false, vec![next_linear(2), target]))
        }
        RJUMPV => {
            let n = code[pc + 1] as usize + 1;
            let base = next_linear(1 + n * 2);
            let mut targets = vec![base];
            for i in 0..n {
                let off_pos = pc + 2 + i * 2;
                let off = i16::from_be_bytes([code[off_pos], code[off_pos + 1]]);
                targets.push((base as i64 + off as i64) as usize);
            }
            Ok((1, 0, false, targets))
        }
        CALLF => {
            let idx = u16::from_be_bytes([code[pc + 1], code[pc + 2]]) as usize;
            let target = container.types[idx];
            Ok((target.inputs as u16, target.outputs as u16, false, vec![next_linear(2)]))
        }
        JUMPF => {
            let idx = u16::from_be_bytes([code[pc + 1], code[pc + 2]]) as usize;
            let target = container.types[idx];
            Ok((target.inputs as u16, 0, true, Vec::new()))
        }
        RETF => Ok((container.types[section_index].outputs as u16, 0, true, Vec::new())),
        DUPN => {
            let n = code[pc + 1] as u16 + 1;
            Ok((n, n + 1, false, vec![next_linear(1)]))
        }
        SWAPN => {
            let n = code[pc + 1] as u16 + 1;
            Ok((n + 1, n + 1, false, vec![next_linear(1)]))
        }
        EXCHANGE => {
            let imm = code[pc + 1];
            let n1 = (imm >> 4) as u16 + 1;
            let n2 = (imm & 0x0f) as u16 + 1;
            Ok((n1 + n2, 0, false, vec![next_linear(1)]))
        }
        _ => {
            let imm_len = opcodes::immediate_size(op).unwrap_or(0);
            let (pop, push) = opcodes::stack_effect(op).unwrap_or((0, 0));
            let terminates = opcodes::is_terminator(op);
            let next = next_linear(imm_len);
            let successors = if terminates || next >= code.len() { Vec::new() } else { vec![next] };
            // Any successor must be an instruction boundary; the walk pass
            // already guarantees this for fallthrough.
            let _ = starts;
            Ok((pop, push, terminates, successors))
        }
    }
}
