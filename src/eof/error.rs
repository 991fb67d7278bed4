//! EOF-specific validation failures (spec.md §4.H), folded into
//! [`crate::error::Error::InvalidCode`] via `#[from]`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EofError {
    #[error("container too short for a header")]
    Truncated,
    #[error("bad magic bytes, expected 0xEF00")]
    InvalidMagic,
    #[error("unsupported EOF version {0}")]
    InvalidVersion(u8),
    #[error("section header kind mismatch: expected {expected:#04x}, found {found:#04x}")]
    UnexpectedSectionKind { expected: u8, found: u8 },
    #[error("zero code sections")]
    NoCodeSections,
    #[error("too many code sections ({0}, max 1024)")]
    TooManyCodeSections(usize),
    #[error("a declared section has size 0")]
    ZeroSectionSize,
    #[error("header/body length mismatch")]
    IncompleteContainer,
    #[error("missing terminator byte after header")]
    MissingTerminator,
    #[error("type section length {0} is not a multiple of 4")]
    InvalidTypeSectionSize(usize),
    #[error("first code section must have 0 inputs and be returning")]
    InvalidFirstSectionType,
    #[error("undefined opcode 0x{0:02x} in code section {1}")]
    UndefinedInstruction(u8, usize),
    #[error("truncated immediate operand for opcode 0x{0:02x} in code section {1}")]
    TruncatedImmediate(u8, usize),
    #[error("code section {0} does not end on an instruction boundary")]
    MisalignedEnd(usize),
    #[error("RJUMP*/CALLF/JUMPF target out of bounds in code section {0}")]
    InvalidJumpTarget(usize),
    #[error("CALLF/JUMPF function index {0} out of range in code section {1}")]
    InvalidCodeSectionIndex(u16, usize),
    #[error("DATALOADN offset out of bounds in code section {0}")]
    InvalidDataLoadNOffset(usize),
    #[error("stack height underflows below zero in code section {0}")]
    StackUnderflow(usize),
    #[error("stack height overflows 1024 in code section {0}")]
    StackOverflow(usize),
    #[error("declared max_stack_height {declared} does not match computed {computed} in code section {section}")]
    StackHeightMismatch { section: usize, declared: u16, computed: u16 },
    #[error("code section {0} is unreachable from section 0")]
    UnreachableCodeSection(usize),
    #[error("code section {0} falls off the end without a terminating instruction")]
    MissingTerminatingInstruction(usize),
    #[error("container section nesting too deep")]
    ContainerNestingTooDeep,
}
