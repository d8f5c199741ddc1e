// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Validation of the scope operands of atomic and barrier instructions.

use super::{missing_operand, Int32Eval, ValidationState};
use crate::{
    spirv::{Capability, Instruction, Op, Scope},
    RequiresOneOf, ValidationError, ValidationErrorKind,
};

/// Validates the execution-scope operand at `operand_index` of `inst`.
pub fn validate_execution_scope(
    state: &ValidationState,
    inst: &Instruction,
    operand_index: usize,
) -> Result<(), Box<ValidationError>> {
    let Some(scope) = eval_scope(state, inst, operand_index, "Execution Scope")? else {
        return Ok(());
    };

    if state.is_vulkan_env() && !matches!(scope, Scope::Workgroup | Scope::Subgroup) {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::InvalidCombination,
            opcode: Some(inst.opcode),
            context: "Execution Scope".into(),
            problem: format!(
                "is {}, but the Vulkan environment limits it to Workgroup and Subgroup",
                scope.name(),
            )
            .into(),
            rule: state.vuid(4636),
            ..Default::default()
        }));
    }

    Ok(())
}

/// Validates the memory-scope operand at `operand_index` of `inst`.
pub fn validate_memory_scope(
    state: &ValidationState,
    inst: &Instruction,
    operand_index: usize,
) -> Result<(), Box<ValidationError>> {
    let Some(scope) = eval_scope(state, inst, operand_index, "Memory Scope")? else {
        return Ok(());
    };

    if scope == Scope::QueueFamily && !state.has_capability(Capability::VulkanMemoryModel) {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::MissingCapability,
            opcode: Some(inst.opcode),
            context: "Memory Scope".into(),
            problem: "QueueFamily requires capability VulkanMemoryModel".into(),
            requires_one_of: RequiresOneOf(&[Capability::VulkanMemoryModel]),
            rule: "SPIRV-MemoryScope-QueueFamily",
        }));
    }

    if scope == Scope::Device
        && state.has_capability(Capability::VulkanMemoryModel)
        && !state.has_capability(Capability::VulkanMemoryModelDeviceScope)
    {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::MissingCapability,
            opcode: Some(inst.opcode),
            context: "Memory Scope".into(),
            problem: "Device with the VulkanMemoryModel capability requires capability \
                VulkanMemoryModelDeviceScope"
                .into(),
            requires_one_of: RequiresOneOf(&[Capability::VulkanMemoryModelDeviceScope]),
            rule: "SPIRV-MemoryScope-DeviceScope",
        }));
    }

    if state.is_vulkan_env() && scope == Scope::CrossDevice {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::InvalidCombination,
            opcode: Some(inst.opcode),
            context: "Memory Scope".into(),
            problem: "is CrossDevice, but the Vulkan environment limits it to Device, \
                QueueFamily, Workgroup, ShaderCallKHR, Subgroup, or Invocation"
                .into(),
            rule: state.vuid(4638),
            ..Default::default()
        }));
    }

    Ok(())
}

/// Checks the parts that execution and memory scopes have in common. Returns the scope if it is
/// a constant.
fn eval_scope(
    state: &ValidationState,
    inst: &Instruction,
    operand_index: usize,
    context: &'static str,
) -> Result<Option<Scope>, Box<ValidationError>> {
    let id = inst
        .operand_id(operand_index)
        .ok_or_else(|| missing_operand(inst, context))?;

    let value = match state.eval_int32_if_const(id) {
        Int32Eval::NotInt32 => {
            return Err(Box::new(ValidationError {
                kind: ValidationErrorKind::MalformedOperand,
                opcode: Some(inst.opcode),
                context: context.into(),
                problem: "is not a 32-bit int".into(),
                rule: "SPIRV-Scope-Type",
                ..Default::default()
            }));
        }
        Int32Eval::Runtime => {
            if state.has_capability(Capability::Shader) {
                if !state.has_capability(Capability::CooperativeMatrixNV) {
                    return Err(Box::new(ValidationError {
                        kind: ValidationErrorKind::MalformedOperand,
                        opcode: Some(inst.opcode),
                        context: context.into(),
                        problem: "is not the result of an OpConstant instruction, but the \
                            Shader capability is present"
                            .into(),
                        rule: "SPIRV-Scope-NotConstant",
                        ..Default::default()
                    }));
                }

                if !state.id_opcode(id).is_some_and(Op::is_constant) {
                    return Err(Box::new(ValidationError {
                        kind: ValidationErrorKind::MalformedOperand,
                        opcode: Some(inst.opcode),
                        context: context.into(),
                        problem: "is not the result of a constant instruction, but the \
                            CooperativeMatrixNV capability is present"
                            .into(),
                        rule: "SPIRV-Scope-NotConstantInstruction",
                        ..Default::default()
                    }));
                }
            }

            return Ok(None);
        }
        Int32Eval::Constant(value) => value,
    };

    let Ok(scope) = Scope::try_from(value) else {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::MalformedOperand,
            opcode: Some(inst.opcode),
            context: context.into(),
            problem: format!("has the unknown value {}", value).into(),
            rule: "SPIRV-Scope-Unknown",
            ..Default::default()
        }));
    };

    let required = scope.required_capabilities();

    if !required.is_empty() && !state.has_any_capability(required) {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::MissingCapability,
            opcode: Some(inst.opcode),
            context: context.into(),
            problem: format!("{} requires a capability that is not declared", scope.name())
                .into(),
            requires_one_of: RequiresOneOf(required),
            rule: "SPIRV-Scope-Capability",
        }));
    }

    Ok(Some(scope))
}
