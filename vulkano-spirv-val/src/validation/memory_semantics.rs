// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Validation of the memory-semantics operands of atomic and barrier instructions.

use super::{
    atomics::{EQUAL_SEMANTICS_OPERAND, UNEQUAL_SEMANTICS_OPERAND},
    missing_operand, Int32Eval, ValidationState,
};
use crate::{
    spirv::{Capability, Instruction, MemorySemantics, Op, OperandKind, Scope},
    RequiresOneOf, ValidationError, ValidationErrorKind,
};

/// Validates the memory-semantics operand at `operand_index` of `inst`.
///
/// `scope_operand_index` is the index of the memory-scope operand that the semantics apply to.
/// The checks run in a fixed order, and the first one that fails is returned. Checks of the
/// bit pattern only happen when the operand is a constant.
pub fn validate_memory_semantics(
    state: &ValidationState,
    inst: &Instruction,
    operand_index: usize,
    scope_operand_index: usize,
) -> Result<(), Box<ValidationError>> {
    let opcode = inst.opcode;
    let is_compare_exchange = matches!(
        opcode,
        Op::AtomicCompareExchange | Op::AtomicCompareExchangeWeak
    );
    let context = match operand_index {
        EQUAL_SEMANTICS_OPERAND if is_compare_exchange => "Equal Memory Semantics",
        UNEQUAL_SEMANTICS_OPERAND if is_compare_exchange => "Unequal Memory Semantics",
        _ => "Memory Semantics",
    };
    let id = inst
        .operand_id(operand_index)
        .ok_or_else(|| missing_operand(inst, context))?;

    let value = match state.eval_int32_if_const(id) {
        Int32Eval::NotInt32 => {
            return Err(Box::new(ValidationError {
                kind: ValidationErrorKind::MalformedOperand,
                opcode: Some(opcode),
                context: context.into(),
                problem: "is not a 32-bit int".into(),
                rule: "SPIRV-MemorySemantics-Type",
                ..Default::default()
            }));
        }
        Int32Eval::Runtime => {
            if state.has_capability(Capability::Shader) {
                if !state.has_capability(Capability::CooperativeMatrixNV) {
                    return Err(Box::new(ValidationError {
                        kind: ValidationErrorKind::MalformedOperand,
                        opcode: Some(opcode),
                        context: context.into(),
                        problem: "is not the result of an OpConstant instruction, but the \
                            Shader capability is present"
                            .into(),
                        rule: "SPIRV-MemorySemantics-NotConstant",
                        ..Default::default()
                    }));
                }

                if !state.id_opcode(id).is_some_and(Op::is_constant) {
                    return Err(Box::new(ValidationError {
                        kind: ValidationErrorKind::MalformedOperand,
                        opcode: Some(opcode),
                        context: context.into(),
                        problem: "is not the result of a constant instruction, but the \
                            CooperativeMatrixNV capability is present"
                            .into(),
                        rule: "SPIRV-MemorySemantics-NotConstantInstruction",
                        ..Default::default()
                    }));
                }
            }

            return Ok(());
        }
        Int32Eval::Constant(value) => MemorySemantics::from_raw(value),
    };

    let has_vulkan_memory_model = state.has_capability(Capability::VulkanMemoryModel);
    let validate_vulkan = state.validates_vulkan();

    if value.intersects(MemorySemantics::UNIFORM_MEMORY)
        && !state.has_capability(Capability::Shader)
    {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::MissingCapability,
            opcode: Some(opcode),
            context: context.into(),
            problem: "UniformMemory requires capability Shader".into(),
            requires_one_of: requires_one_of(MemorySemantics::UNIFORM_MEMORY),
            rule: "SPIRV-MemorySemantics-UniformMemory",
        }));
    }

    if value.intersects(MemorySemantics::OUTPUT_MEMORY) && !has_vulkan_memory_model {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::MissingCapability,
            opcode: Some(opcode),
            context: context.into(),
            problem: "OutputMemory requires capability VulkanMemoryModel".into(),
            requires_one_of: requires_one_of(MemorySemantics::OUTPUT_MEMORY),
            rule: "SPIRV-MemorySemantics-OutputMemory",
        }));
    }

    let memory_order_count = value.memory_order_count();

    if memory_order_count > 1 {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::InvalidCombination,
            opcode: Some(opcode),
            context: context.into(),
            problem: "must have at most one non-relaxed memory order bit set".into(),
            rule: state.vuid(10001),
            ..Default::default()
        }));
    }

    if opcode == Op::AtomicLoad
        && value.intersects(MemorySemantics::RELEASE | MemorySemantics::ACQUIRE_RELEASE)
    {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::InvalidCombination,
            opcode: Some(opcode),
            context: context.into(),
            problem: "must not use Release or AcquireRelease memory order".into(),
            rule: state.vuid(10002),
            ..Default::default()
        }));
    }

    if matches!(opcode, Op::AtomicStore | Op::AtomicFlagClear)
        && value.intersects(MemorySemantics::ACQUIRE | MemorySemantics::ACQUIRE_RELEASE)
    {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::InvalidCombination,
            opcode: Some(opcode),
            context: context.into(),
            problem: "must not use Acquire or AcquireRelease memory order".into(),
            rule: state.vuid(10003),
            ..Default::default()
        }));
    }

    // A relaxed fence has no effect in OpenCL, but is not forbidden there.
    if validate_vulkan && opcode == Op::MemoryBarrier && memory_order_count == 0 {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::InvalidCombination,
            opcode: Some(opcode),
            context: context.into(),
            problem: "must not use Relaxed memory order".into(),
            rule: state.vuid(10004),
            ..Default::default()
        }));
    }

    if validate_vulkan && value.intersects(MemorySemantics::SEQUENTIALLY_CONSISTENT) {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::InvalidCombination,
            opcode: Some(opcode),
            context: context.into(),
            problem: "must not use SequentiallyConsistent memory order in the Vulkan \
                environment"
                .into(),
            rule: state.vuid(10005),
            ..Default::default()
        }));
    }

    if validate_vulkan {
        let includes_storage_class = value.intersects(MemorySemantics::VULKAN_STORAGE_CLASSES);

        if memory_order_count == 0 && includes_storage_class {
            return Err(Box::new(ValidationError {
                kind: ValidationErrorKind::InvalidCombination,
                opcode: Some(opcode),
                context: context.into(),
                problem: "has at least one Vulkan-supported storage class semantics flag \
                    (UniformMemory, WorkgroupMemory, ImageMemory, or OutputMemory), but does not \
                    use a non-relaxed memory order"
                    .into(),
                rule: state.vuid(10006),
                ..Default::default()
            }));
        }

        if memory_order_count != 0 && !includes_storage_class {
            return Err(Box::new(ValidationError {
                kind: ValidationErrorKind::InvalidCombination,
                opcode: Some(opcode),
                context: context.into(),
                problem: "uses a non-relaxed memory order, but does not have at least one \
                    Vulkan-supported storage class semantics flag (UniformMemory, \
                    WorkgroupMemory, ImageMemory, or OutputMemory)"
                    .into(),
                rule: state.vuid(10007),
                ..Default::default()
            }));
        }
    }

    if value.intersects(MemorySemantics::MAKE_AVAILABLE) {
        if !has_vulkan_memory_model {
            return Err(Box::new(ValidationError {
                kind: ValidationErrorKind::MissingCapability,
                opcode: Some(opcode),
                context: context.into(),
                problem: "MakeAvailable requires capability VulkanMemoryModel".into(),
                requires_one_of: requires_one_of(MemorySemantics::MAKE_AVAILABLE),
                rule: "SPIRV-MemorySemantics-MakeAvailable",
            }));
        }

        if !value.intersects(MemorySemantics::RELEASE | MemorySemantics::ACQUIRE_RELEASE) {
            return Err(Box::new(ValidationError {
                kind: ValidationErrorKind::InvalidCombination,
                opcode: Some(opcode),
                context: context.into(),
                problem: "has the MakeAvailable flag, but does not use Release or \
                    AcquireRelease memory order"
                    .into(),
                rule: state.vuid(10008),
                ..Default::default()
            }));
        }
    }

    if value.intersects(MemorySemantics::MAKE_VISIBLE) {
        if !has_vulkan_memory_model {
            return Err(Box::new(ValidationError {
                kind: ValidationErrorKind::MissingCapability,
                opcode: Some(opcode),
                context: context.into(),
                problem: "MakeVisible requires capability VulkanMemoryModel".into(),
                requires_one_of: requires_one_of(MemorySemantics::MAKE_VISIBLE),
                rule: "SPIRV-MemorySemantics-MakeVisible",
            }));
        }

        if !value.intersects(MemorySemantics::ACQUIRE | MemorySemantics::ACQUIRE_RELEASE) {
            return Err(Box::new(ValidationError {
                kind: ValidationErrorKind::InvalidCombination,
                opcode: Some(opcode),
                context: context.into(),
                problem: "has the MakeVisible flag, but does not use Acquire or \
                    AcquireRelease memory order"
                    .into(),
                rule: state.vuid(10009),
                ..Default::default()
            }));
        }
    }

    if value.intersects(MemorySemantics::VOLATILE) {
        if !has_vulkan_memory_model {
            return Err(Box::new(ValidationError {
                kind: ValidationErrorKind::MissingCapability,
                opcode: Some(opcode),
                context: context.into(),
                problem: "Volatile requires capability VulkanMemoryModel".into(),
                requires_one_of: requires_one_of(MemorySemantics::VOLATILE),
                rule: "SPIRV-MemorySemantics-Volatile",
            }));
        }

        if !opcode.is_atomic() {
            return Err(Box::new(ValidationError {
                kind: ValidationErrorKind::InvalidCombination,
                opcode: Some(opcode),
                context: context.into(),
                problem: "has the Volatile flag, which must not be used with barrier \
                    instructions (MemoryBarrier or ControlBarrier)"
                    .into(),
                rule: state.vuid(10010),
                ..Default::default()
            }));
        }
    }

    if is_compare_exchange && operand_index == UNEQUAL_SEMANTICS_OPERAND {
        validate_unequal_semantics(state, inst, value, validate_vulkan)?;
    }

    if validate_vulkan && memory_order_count != 0 {
        let scope = inst
            .operand_id(scope_operand_index)
            .map(|id| state.eval_int32_if_const(id));

        if let Some(scope) = scope {
            if scope.is_int32() && scope.value() == Scope::Invocation as u32 {
                return Err(Box::new(ValidationError {
                    kind: ValidationErrorKind::InvalidCombination,
                    opcode: Some(opcode),
                    context: context.into(),
                    problem: "must be Relaxed when used with the Invocation memory scope".into(),
                    rule: state.vuid(4641),
                    ..Default::default()
                }));
            }
        }
    }

    Ok(())
}

/// Checks the Unequal operand of a compare-exchange against its Equal operand.
fn validate_unequal_semantics(
    state: &ValidationState,
    inst: &Instruction,
    unequal: MemorySemantics,
    validate_vulkan: bool,
) -> Result<(), Box<ValidationError>> {
    let opcode = inst.opcode;

    if unequal.intersects(MemorySemantics::RELEASE | MemorySemantics::ACQUIRE_RELEASE) {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::InvalidCombination,
            opcode: Some(opcode),
            context: "Unequal Memory Semantics".into(),
            problem: "must not use Release or AcquireRelease memory order".into(),
            rule: state.vuid(10011),
            ..Default::default()
        }));
    }

    // A runtime Equal operand counts as relaxed.
    let equal = MemorySemantics::from_raw(
        inst.operand_id(EQUAL_SEMANTICS_OPERAND)
            .map_or(0, |id| state.eval_int32_if_const(id).value()),
    );

    let stronger_than_equal = (unequal.intersects(MemorySemantics::SEQUENTIALLY_CONSISTENT)
        && !equal.intersects(MemorySemantics::SEQUENTIALLY_CONSISTENT))
        || (unequal.intersects(MemorySemantics::ACQUIRE)
            && !equal.intersects(
                MemorySemantics::SEQUENTIALLY_CONSISTENT
                    | MemorySemantics::ACQUIRE_RELEASE
                    | MemorySemantics::ACQUIRE,
            ));

    if stronger_than_equal {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::InvalidCombination,
            opcode: Some(opcode),
            context: "Unequal Memory Semantics".into(),
            problem: "must not use a memory order stronger than the Equal Memory Semantics"
                .into(),
            rule: state.vuid(10012),
            ..Default::default()
        }));
    }

    if validate_vulkan {
        let must_match_equal =
            MemorySemantics::VULKAN_STORAGE_CLASSES | MemorySemantics::MAKE_VISIBLE;

        if must_match_equal.intersects(unequal - equal) {
            return Err(Box::new(ValidationError {
                kind: ValidationErrorKind::InvalidCombination,
                opcode: Some(opcode),
                context: "Unequal Memory Semantics".into(),
                problem: "must not use any Vulkan-supported storage class semantics flag \
                    (UniformMemory, WorkgroupMemory, ImageMemory, or OutputMemory) or \
                    MakeVisible flag, unless this flag is also present in the Equal Memory \
                    Semantics"
                    .into(),
                rule: state.vuid(10013),
                ..Default::default()
            }));
        }

        if (unequal ^ equal).intersects(MemorySemantics::VOLATILE) {
            return Err(Box::new(ValidationError {
                kind: ValidationErrorKind::InvalidCombination,
                opcode: Some(opcode),
                context: "Unequal Memory Semantics".into(),
                problem: "Volatile flag must match the Equal Memory Semantics flag".into(),
                rule: state.vuid(10014),
                ..Default::default()
            }));
        }
    }

    Ok(())
}

fn requires_one_of(bit: MemorySemantics) -> RequiresOneOf {
    RequiresOneOf(
        crate::spirv::required_capabilities(OperandKind::MemorySemantics, bit.as_raw())
            .unwrap_or(&[]),
    )
}
