//! EOF structural parsing (spec.md §4.H, §3 "EOF container" table).
//!
//! The teacher never implemented EOF (Cancun/Prague post-dates its
//! retrieved snapshot); this is built fresh, following the same
//! header-then-body layout the spec lays out byte-for-byte.

use super::error::EofError;
use bytes::Bytes;

pub const MAGIC: [u8; 2] = [0xEF, 0x00];
pub const VERSION: u8 = 0x01;

const KIND_TYPE: u8 = 0x01;
const KIND_CODE: u8 = 0x02;
const KIND_CONTAINER: u8 = 0x03;
const KIND_DATA: u8 = 0x04;
const TERMINATOR: u8 = 0x00;

pub const MAX_CODE_SECTIONS: usize = 1024;
pub const MAX_CONTAINER_SECTIONS: usize = 256;

/// One entry of the type section: a code section's input/output arity and
/// its declared maximum stack height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeEntry {
    pub inputs: u8,
    pub outputs: u8,
    pub max_stack_height: u16,
}

/// Whether this type entry marks its section as non-returning
/// (`outputs == 0x80`, spec.md §4.H invariant on the first section).
impl TypeEntry {
    pub fn is_non_returning(&self) -> bool {
        self.outputs == 0x80
    }
}

/// A fully parsed (but not yet semantically validated) EOF container.
#[derive(Debug, Clone)]
pub struct EofContainer {
    pub types: Vec<TypeEntry>,
    pub code_sections: Vec<Bytes>,
    pub container_sections: Vec<Bytes>,
    /// Data actually present in this container's bytes. In a deploy
    /// container the declared data size (`data_size_declared`) may exceed
    /// `data_section.len()` — the remainder is appended by `RETURNCONTRACT`
    /// at deploy time (spec.md §3, "may be truncated in deploy
    /// containers").
    pub data_section: Bytes,
    pub data_size_declared: usize,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], EofError> {
        let end = self.pos + n;
        if end > self.bytes.len() {
            return Err(EofError::Truncated);
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, EofError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, EofError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }
}

/// Parses the header and slices out every section body (spec.md §3).
/// Performs only *structural* checks (lengths, magic, section kinds); the
/// deeper per-code-section analysis lives in [`super::validate`].
pub fn parse(input: &[u8]) -> Result<EofContainer, EofError> {
    let mut c = Cursor::new(input);

    let magic = c.take(2)?;
    if magic != MAGIC {
        return Err(EofError::InvalidMagic);
    }
    let version = c.u8()?;
    if version != VERSION {
        return Err(EofError::InvalidVersion(version));
    }

    let kind = c.u8()?;
    if kind != KIND_TYPE {
        return Err(EofError::UnexpectedSectionKind { expected: KIND_TYPE, found: kind });
    }
    let type_section_size = c.u16()? as usize;
    if type_section_size == 0 || type_section_size % 4 != 0 {
        return Err(EofError::InvalidTypeSectionSize(type_section_size));
    }

    let kind = c.u8()?;
    if kind != KIND_CODE {
        return Err(EofError::UnexpectedSectionKind { expected: KIND_CODE, found: kind });
    }
    let num_code_sections = c.u16()? as usize;
    if num_code_sections == 0 {
        return Err(EofError::NoCodeSections);
    }
    if num_code_sections > MAX_CODE_SECTIONS {
        return Err(EofError::TooManyCodeSections(num_code_sections));
    }
    if type_section_size / 4 != num_code_sections {
        return Err(EofError::InvalidTypeSectionSize(type_section_size));
    }
    let mut code_section_sizes = Vec::with_capacity(num_code_sections);
    for _ in 0..num_code_sections {
        let size = c.u16()? as usize;
        if size == 0 {
            return Err(EofError::ZeroSectionSize);
        }
        code_section_sizes.push(size);
    }

    // Optional container section (present only if the next header byte is
    // the container-section kind rather than the data-section kind).
    let mut container_section_sizes = Vec::new();
    let next_kind = c.u8()?;
    let data_kind = if next_kind == KIND_CONTAINER {
        let num_containers = c.u16()? as usize;
        if num_containers > MAX_CONTAINER_SECTIONS {
            return Err(EofError::ContainerNestingTooDeep);
        }
        for _ in 0..num_containers {
            let size = c.u16()? as usize;
            if size == 0 {
                return Err(EofError::ZeroSectionSize);
            }
            container_section_sizes.push(size);
        }
        c.u8()?
    } else {
        next_kind
    };

    if data_kind != KIND_DATA {
        return Err(EofError::UnexpectedSectionKind { expected: KIND_DATA, found: data_kind });
    }
    let data_size_declared = c.u16()? as usize;

    let terminator = c.u8()?;
    if terminator != TERMINATOR {
        return Err(EofError::MissingTerminator);
    }

    // Body: type entries, then code bodies, then container bodies, then
    // whatever data bytes are actually present.
    let mut types = Vec::with_capacity(num_code_sections);
    for _ in 0..num_code_sections {
        let inputs = c.u8()?;
        let outputs = c.u8()?;
        let max_stack_height = c.u16()?;
        types.push(TypeEntry { inputs, outputs, max_stack_height });
    }
    if types[0].inputs != 0 || types[0].is_non_returning() {
        return Err(EofError::InvalidFirstSectionType);
    }

    let mut code_sections = Vec::with_capacity(num_code_sections);
    for size in code_section_sizes {
        code_sections.push(Bytes::copy_from_slice(c.take(size)?));
    }

    let mut container_sections = Vec::with_capacity(container_section_sizes.len());
    for size in container_section_sizes {
        container_sections.push(Bytes::copy_from_slice(c.take(size)?));
    }

    let remaining = &input[c.pos..];
    if remaining.len() > data_size_declared {
        return Err(EofError::IncompleteContainer);
    }
    let data_section = Bytes::copy_from_slice(remaining);

    Ok(EofContainer {
        types,
        code_sections,
        container_sections,
        data_section,
        data_size_declared,
    })
}

/// `true` if `code` starts with the EOF magic — used by the frame/call
/// layer to decide whether to route through the EOF path at all (spec.md
/// §4.I, "whether the executing code is an EOF container").
pub fn is_eof(code: &[u8]) -> bool {
    code.len() >= 2 && code[0] == MAGIC[0] && code[1] == MAGIC[1]
}
