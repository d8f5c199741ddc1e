// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Decoding of SPIR-V binaries into instructions.
//!
//! Only the structure of the binary is checked here: the header, the word counts of the
//! instructions, and that every opcode is known. The meaning of the instructions is checked by
//! the [`validation`](crate::validation) module.

pub use self::{enums::*, instruction::Instruction, op::Op};
use crate::Version;
use std::{
    error::Error,
    fmt::{Display, Error as FmtError, Formatter},
};

mod enums;
mod instruction;
mod op;
pub(crate) mod reqs;

pub use self::reqs::{implied_capabilities, operand_name, required_capabilities, OperandKind};

const MAGIC: u32 = 0x07230203;

/// A decoded SPIR-V module.
#[derive(Clone, Debug)]
pub struct Spirv {
    version: Version,
    bound: u32,
    instructions: Vec<Instruction>,
}

impl Spirv {
    /// Decodes a SPIR-V module from its words.
    ///
    /// The words may be in either byte order; the magic number of the header decides.
    pub fn new(words: &[u32]) -> Result<Self, SpirvError> {
        if words.len() < 5 {
            return Err(SpirvError::MissingHeader);
        }

        if words[0] == MAGIC {
            Self::decode(words)
        } else if words[0].swap_bytes() == MAGIC {
            let words: Vec<u32> = words.iter().map(|word| word.swap_bytes()).collect();
            Self::decode(&words)
        } else {
            Err(SpirvError::WrongHeader)
        }
    }

    /// Decodes a SPIR-V module from its bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SpirvError> {
        if bytes.len() % 4 != 0 {
            return Err(SpirvError::IncompleteWord);
        }

        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned)
            .collect();

        Self::new(&words)
    }

    fn decode(words: &[u32]) -> Result<Self, SpirvError> {
        let version = Version::from_spirv_word(words[1]);
        let bound = words[3];

        let mut instructions = Vec::new();
        let mut rest = &words[5..];

        while let Some(&first) = rest.first() {
            let word_count = (first >> 16) as usize;
            let opcode = (first & 0xffff) as u16;

            if word_count == 0 {
                return Err(SpirvError::InvalidWordCount {
                    offset: words.len() - rest.len(),
                });
            }

            if rest.len() < word_count {
                return Err(SpirvError::IncompleteInstruction);
            }

            instructions.push(Instruction::decode(opcode, &rest[1..word_count])?);
            rest = &rest[word_count..];
        }

        Ok(Spirv {
            version,
            bound,
            instructions,
        })
    }

    /// Returns the SPIR-V version declared in the header.
    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the upper bound of the ids used in the module.
    #[inline]
    pub fn bound(&self) -> u32 {
        self.bound
    }

    /// Returns the instructions of the module, in module order.
    #[inline]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

/// The id of a result, as it appears in an operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Id(pub u32);

impl From<Id> for u32 {
    #[inline]
    fn from(id: Id) -> u32 {
        id.0
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "%{}", self.0)
    }
}

/// Error that can happen when decoding a SPIR-V binary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpirvError {
    /// The binary is shorter than the header.
    MissingHeader,
    /// The first word is not the SPIR-V magic number in either byte order.
    WrongHeader,
    /// The length in bytes is not a multiple of 4.
    IncompleteWord,
    /// An instruction declares a word count of zero.
    InvalidWordCount { offset: usize },
    /// The last instruction extends past the end of the binary.
    IncompleteInstruction,
    /// An instruction has an opcode that is not known.
    UnknownOpcode(u16),
    /// An instruction has fewer operands than its opcode requires.
    MissingOperand(Op),
    /// A literal string is not terminated or is not valid UTF-8.
    InvalidString,
}

impl Error for SpirvError {}

impl Display for SpirvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Self::MissingHeader => write!(f, "the SPIR-V binary is too short to contain a header"),
            Self::WrongHeader => write!(f, "the SPIR-V binary does not start with the magic number"),
            Self::IncompleteWord => {
                write!(f, "the length of the SPIR-V binary is not a multiple of 4 bytes")
            }
            Self::InvalidWordCount { offset } => write!(
                f,
                "the instruction at word {} has a word count of zero",
                offset,
            ),
            Self::IncompleteInstruction => {
                write!(f, "the last instruction extends past the end of the binary")
            }
            Self::UnknownOpcode(opcode) => write!(f, "the opcode {} is not known", opcode),
            Self::MissingOperand(opcode) => {
                write!(f, "an Op{} instruction is missing operands", opcode)
            }
            Self::InvalidString => write!(f, "a literal string is malformed"),
        }
    }
}

/// Decodes a nul-terminated UTF-8 string packed into words, and returns it together with the
/// words that follow it.
fn parse_string(words: &[u32]) -> Result<(String, &[u32]), SpirvError> {
    let bytes: Vec<u8> = words
        .iter()
        .flat_map(|word| word.to_le_bytes())
        .take_while(|&byte| byte != 0)
        .collect();

    let consumed = bytes.len() / 4 + 1;

    if consumed > words.len() {
        return Err(SpirvError::InvalidString);
    }

    let string = String::from_utf8(bytes).map_err(|_| SpirvError::InvalidString)?;

    Ok((string, &words[consumed..]))
}
