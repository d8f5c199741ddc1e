// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Validation of the atomic instructions.
//!
//! All atomic instructions start with the same three operands after the result: `Pointer`,
//! `Memory` (the memory scope) and `Semantics`. The compare-exchange instructions have two
//! semantics operands, `Equal` and `Unequal`, in place of the single one.

use super::{
    memory_semantics::validate_memory_semantics, missing_operand, scopes::validate_memory_scope,
    TypeInfo, ValidationState,
};
use crate::{
    spirv::{Capability, Id, Instruction, Op},
    RequiresOneOf, ValidationError, ValidationErrorKind,
};

const POINTER_OPERAND: usize = 0;
const SCOPE_OPERAND: usize = 1;
const SEMANTICS_OPERAND: usize = 2;
pub(crate) const EQUAL_SEMANTICS_OPERAND: usize = 2;
pub(crate) const UNEQUAL_SEMANTICS_OPERAND: usize = 3;

/// The kind of scalar that an atomic instruction operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DataType {
    Int,
    Float,
    IntOrFloat,
    Bool,
}

impl DataType {
    fn of(opcode: Op) -> Option<Self> {
        Some(match opcode {
            Op::AtomicLoad | Op::AtomicStore | Op::AtomicExchange => DataType::IntOrFloat,
            Op::AtomicCompareExchange
            | Op::AtomicCompareExchangeWeak
            | Op::AtomicIIncrement
            | Op::AtomicIDecrement
            | Op::AtomicIAdd
            | Op::AtomicISub
            | Op::AtomicSMin
            | Op::AtomicUMin
            | Op::AtomicSMax
            | Op::AtomicUMax
            | Op::AtomicAnd
            | Op::AtomicOr
            | Op::AtomicXor => DataType::Int,
            Op::AtomicFMinEXT | Op::AtomicFMaxEXT | Op::AtomicFAddEXT => DataType::Float,
            Op::AtomicFlagTestAndSet => DataType::Bool,
            // Operates on an implementation-defined flag type.
            _ => return None,
        })
    }

    fn matches(self, ty: TypeInfo) -> bool {
        match self {
            DataType::Int => matches!(ty, TypeInfo::Int { .. }),
            DataType::Float => matches!(ty, TypeInfo::Float { .. }),
            DataType::IntOrFloat => matches!(ty, TypeInfo::Int { .. } | TypeInfo::Float { .. }),
            DataType::Bool => matches!(ty, TypeInfo::Bool),
        }
    }

    fn description(self) -> &'static str {
        match self {
            DataType::Int => "an int scalar type",
            DataType::Float => "a float scalar type",
            DataType::IntOrFloat => "an int or float scalar type",
            DataType::Bool => "a bool scalar type",
        }
    }
}

/// Validates an atomic instruction.
///
/// The data type and the pointer are checked first, then the memory scope, then each
/// memory-semantics operand.
pub fn validate_atomic(
    state: &ValidationState,
    inst: &Instruction,
) -> Result<(), Box<ValidationError>> {
    let pointer_type = validate_pointer(state, inst)?;

    if let Some(data_type) = DataType::of(inst.opcode) {
        validate_data_type(state, inst, data_type, pointer_type)?;
    }

    validate_memory_scope(state, inst, SCOPE_OPERAND)?;

    match inst.opcode {
        Op::AtomicCompareExchange | Op::AtomicCompareExchangeWeak => {
            validate_memory_semantics(state, inst, EQUAL_SEMANTICS_OPERAND, SCOPE_OPERAND)?;
            validate_memory_semantics(state, inst, UNEQUAL_SEMANTICS_OPERAND, SCOPE_OPERAND)
        }
        _ => validate_memory_semantics(state, inst, SEMANTICS_OPERAND, SCOPE_OPERAND),
    }
}

/// Checks that the `Pointer` operand is a pointer, and returns the id of the type it points to.
fn validate_pointer(
    state: &ValidationState,
    inst: &Instruction,
) -> Result<Id, Box<ValidationError>> {
    let pointer = inst
        .operand_id(POINTER_OPERAND)
        .ok_or_else(|| missing_operand(inst, "Pointer"))?;

    match state.value_type(pointer) {
        Some(TypeInfo::Pointer { pointee, .. }) => Ok(pointee),
        _ => Err(Box::new(ValidationError {
            kind: ValidationErrorKind::MalformedOperand,
            opcode: Some(inst.opcode),
            context: "Pointer".into(),
            problem: "is not a value of an OpTypePointer type".into(),
            rule: "SPIRV-Atomic-Pointer",
            ..Default::default()
        })),
    }
}

fn validate_data_type(
    state: &ValidationState,
    inst: &Instruction,
    data_type: DataType,
    pointee: Id,
) -> Result<(), Box<ValidationError>> {
    // Instructions without a result are checked on the pointed-to type.
    let (context, type_id) = match inst.result_type_id {
        Some(result_type_id) => ("Result Type", result_type_id),
        None => ("Pointer", pointee),
    };

    let ty = state.type_info(type_id);

    if !ty.is_some_and(|ty| data_type.matches(ty)) {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::MalformedOperand,
            opcode: Some(inst.opcode),
            context: context.into(),
            problem: format!("is not {}", data_type.description()).into(),
            rule: "SPIRV-Atomic-DataType",
            ..Default::default()
        }));
    }

    if inst.result_type_id.is_some() && data_type != DataType::Bool && type_id != pointee {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::InvalidCombination,
            opcode: Some(inst.opcode),
            context: "Pointer".into(),
            problem: "does not point to a value of the Result Type".into(),
            rule: "SPIRV-Atomic-PointeeType",
            ..Default::default()
        }));
    }

    if matches!(ty, Some(TypeInfo::Int { width: 64, .. }))
        && !state.has_capability(Capability::Int64Atomics)
    {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::MissingCapability,
            opcode: Some(inst.opcode),
            context: context.into(),
            problem: "is a 64-bit int, which requires capability Int64Atomics".into(),
            requires_one_of: RequiresOneOf(&[Capability::Int64Atomics]),
            rule: "SPIRV-Atomic-Int64",
        }));
    }

    Ok(())
}
