// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use super::{parse_string, Id, Op, SpirvError};
use smallvec::SmallVec;

/// A single decoded instruction.
///
/// The result type and result ids, when the opcode has them, are split off from the other
/// operands. Operand indices always count the words that follow them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Op,
    pub result_type_id: Option<Id>,
    pub result_id: Option<Id>,
    pub operands: SmallVec<[u32; 8]>,
}

impl Instruction {
    /// Decodes an instruction from its opcode and the words that follow the first word.
    pub(super) fn decode(opcode: u16, words: &[u32]) -> Result<Self, SpirvError> {
        let opcode = Op::try_from(opcode).map_err(|_| SpirvError::UnknownOpcode(opcode))?;
        let mut words = words;

        let mut take_id = |present: bool| -> Result<Option<Id>, SpirvError> {
            if !present {
                return Ok(None);
            }

            let (&first, rest) = words
                .split_first()
                .ok_or(SpirvError::MissingOperand(opcode))?;
            words = rest;

            Ok(Some(Id(first)))
        };

        let result_type_id = take_id(opcode.has_result_type())?;
        let result_id = take_id(opcode.has_result())?;

        Ok(Instruction {
            opcode,
            result_type_id,
            result_id,
            operands: SmallVec::from_slice(words),
        })
    }

    /// Returns the operand word at `index`, or `None` if the instruction has fewer operands.
    #[inline]
    pub fn operand_word(&self, index: usize) -> Option<u32> {
        self.operands.get(index).copied()
    }

    /// Returns the operand at `index` as an id.
    #[inline]
    pub fn operand_id(&self, index: usize) -> Option<Id> {
        self.operand_word(index).map(Id)
    }

    /// Decodes the literal string that starts at operand `index`.
    pub fn operand_string(&self, index: usize) -> Result<String, SpirvError> {
        let words = self
            .operands
            .get(index..)
            .ok_or(SpirvError::MissingOperand(self.opcode))?;

        parse_string(words).map(|(string, _)| string)
    }

    /// Returns the operand word at `index`, or an error if the instruction has fewer operands.
    pub(crate) fn required_word(&self, index: usize) -> Result<u32, SpirvError> {
        self.operand_word(index)
            .ok_or(SpirvError::MissingOperand(self.opcode))
    }
}
