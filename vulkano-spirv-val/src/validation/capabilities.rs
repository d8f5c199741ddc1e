// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Checks that opcodes and enumerated operands are enabled by the declared capabilities.

use super::{missing_operand, ValidationState};
use crate::{
    spirv::{operand_name, required_capabilities, Capability, Instruction, OperandKind},
    RequiresOneOf, ValidationError, ValidationErrorKind,
};

/// Checks the capabilities required by the opcode of `inst` itself.
pub fn validate_opcode(
    state: &ValidationState,
    inst: &Instruction,
) -> Result<(), Box<ValidationError>> {
    let required = inst.opcode.required_capabilities();

    if !required.is_empty() && !state.has_any_capability(required) {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::MissingCapability,
            opcode: Some(inst.opcode),
            problem: "the opcode requires a capability that is not declared".into(),
            requires_one_of: RequiresOneOf(required),
            rule: "SPIRV-Capability-Opcode",
            ..Default::default()
        }));
    }

    Ok(())
}

/// Validates `OpCapability`. Only the value itself is checked: capabilities never need other
/// capabilities to be declared.
pub fn validate_capability(
    _state: &ValidationState,
    inst: &Instruction,
) -> Result<(), Box<ValidationError>> {
    operand_value(inst, OperandKind::Capability, 0, "Capability").map(|_| ())
}

/// Validates `OpMemoryModel`.
pub fn validate_memory_model(
    state: &ValidationState,
    inst: &Instruction,
) -> Result<(), Box<ValidationError>> {
    validate_operand(state, inst, OperandKind::AddressingModel, 0, "Addressing Model")?;
    validate_operand(state, inst, OperandKind::MemoryModel, 1, "Memory Model")
}

/// Validates `OpEntryPoint`.
pub fn validate_entry_point(
    state: &ValidationState,
    inst: &Instruction,
) -> Result<(), Box<ValidationError>> {
    validate_operand(state, inst, OperandKind::ExecutionModel, 0, "Execution Model")
}

/// Validates `OpExecutionMode` and `OpExecutionModeId`.
pub fn validate_execution_mode(
    state: &ValidationState,
    inst: &Instruction,
) -> Result<(), Box<ValidationError>> {
    validate_operand(state, inst, OperandKind::ExecutionMode, 1, "Mode")
}

/// Validates the `Storage Class` operand of `OpTypePointer` and `OpVariable`.
pub fn validate_storage_class(
    state: &ValidationState,
    inst: &Instruction,
) -> Result<(), Box<ValidationError>> {
    validate_operand(state, inst, OperandKind::StorageClass, 0, "Storage Class")
}

/// Validates `OpTypeImage`.
pub fn validate_type_image(
    state: &ValidationState,
    inst: &Instruction,
) -> Result<(), Box<ValidationError>> {
    validate_operand(state, inst, OperandKind::Dim, 1, "Dim")
}

/// Validates the `Decoration` operand of `OpDecorate`, `OpDecorateId` and `OpMemberDecorate`.
pub fn validate_decoration(
    state: &ValidationState,
    inst: &Instruction,
    operand_index: usize,
) -> Result<(), Box<ValidationError>> {
    validate_operand(state, inst, OperandKind::Decoration, operand_index, "Decoration")
}

fn validate_operand(
    state: &ValidationState,
    inst: &Instruction,
    kind: OperandKind,
    operand_index: usize,
    context: &'static str,
) -> Result<(), Box<ValidationError>> {
    let (value, required) = operand_value(inst, kind, operand_index, context)?;

    if !required.is_empty() && !state.has_any_capability(required) {
        let name = operand_name(kind, value).unwrap_or_default();

        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::MissingCapability,
            opcode: Some(inst.opcode),
            context: context.into(),
            problem: format!("{} requires a capability that is not declared", name).into(),
            requires_one_of: RequiresOneOf(required),
            rule: "SPIRV-Capability-Operand",
        }));
    }

    Ok(())
}

/// Reads an enumerated operand and looks up its requirements, failing if the value is unknown.
fn operand_value(
    inst: &Instruction,
    kind: OperandKind,
    operand_index: usize,
    context: &'static str,
) -> Result<(u32, &'static [Capability]), Box<ValidationError>> {
    let value = inst
        .required_word(operand_index)
        .map_err(|_| missing_operand(inst, context))?;

    match required_capabilities(kind, value) {
        Some(required) => Ok((value, required)),
        None => Err(Box::new(ValidationError {
            kind: ValidationErrorKind::MalformedOperand,
            opcode: Some(inst.opcode),
            context: context.into(),
            problem: format!("has the unknown value {}", value).into(),
            rule: "SPIRV-Capability-UnknownOperand",
            ..Default::default()
        })),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        spirv::{Capability, ExecutionModel, MemoryModel, Op},
        tests::{validate, ModuleBuilder},
        validation::TargetEnv,
        ValidationErrorKind,
    };

    #[test]
    fn unknown_capability() {
        let mut builder = ModuleBuilder::new();
        builder.global(Op::Capability, None, &[16]);
        let err = validate(&builder, TargetEnv::Universal1_3).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MalformedOperand);
        assert_eq!(err.rule, "SPIRV-Capability-UnknownOperand");
    }

    #[test]
    fn storage_class_requires_capability() {
        // Generic needs Kernel.
        let mut builder = ModuleBuilder::new();
        let uint = builder.uint;
        builder.global(Op::TypePointer, None, &[8, uint.0]);
        let err = validate(&builder, TargetEnv::Universal1_3).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingCapability);
        assert_eq!(err.opcode, Some(Op::TypePointer));
        assert_eq!(err.requires_one_of.0, &[Capability::Kernel]);
        assert!(err.problem.starts_with("Generic"));
    }

    #[test]
    fn storage_class_implied_capability() {
        // AtomicCounter needs AtomicStorage, which is not implied by Shader.
        let mut builder = ModuleBuilder::new();
        let uint = builder.uint;
        builder.global(Op::TypePointer, None, &[10, uint.0]);
        assert_eq!(
            validate(&builder, TargetEnv::Universal1_3).unwrap_err().requires_one_of.0,
            &[Capability::AtomicStorage],
        );

        // Private needs Shader, which Geometry implies.
        let mut builder = ModuleBuilder::new().capabilities(&[
            Capability::Geometry,
            Capability::VulkanMemoryModel,
        ]);
        let uint = builder.uint;
        builder.global(Op::TypePointer, None, &[6, uint.0]);
        assert!(validate(&builder, TargetEnv::Universal1_3).is_ok());
    }

    #[test]
    fn unknown_storage_class() {
        let mut builder = ModuleBuilder::new();
        let uint = builder.uint;
        builder.global(Op::TypePointer, None, &[13, uint.0]);
        assert_eq!(
            validate(&builder, TargetEnv::Universal1_3).unwrap_err().rule,
            "SPIRV-Capability-UnknownOperand",
        );
    }

    #[test]
    fn execution_model_requires_capability() {
        let builder = ModuleBuilder::new().execution_model(ExecutionModel::Geometry);
        let err = validate(&builder, TargetEnv::Universal1_3).unwrap_err();
        assert_eq!(err.opcode, Some(Op::EntryPoint));
        assert_eq!(err.requires_one_of.0, &[Capability::Geometry]);
    }

    #[test]
    fn memory_model_requires_capability() {
        let builder = ModuleBuilder::new()
            .capabilities(&[Capability::Shader])
            .memory_model(MemoryModel::OpenCL);
        let err = validate(&builder, TargetEnv::Universal1_3).unwrap_err();
        assert_eq!(err.opcode, Some(Op::MemoryModel));
        assert_eq!(err.requires_one_of.0, &[Capability::Kernel]);
    }

    #[test]
    fn execution_mode_alternatives() {
        let mut builder = ModuleBuilder::new();
        let main = builder.main;
        // Triangles
        builder.global(Op::ExecutionMode, None, &[main.0, 22]);
        let err = validate(&builder, TargetEnv::Universal1_3).unwrap_err();
        assert_eq!(
            err.requires_one_of.0,
            &[Capability::Geometry, Capability::Tessellation],
        );

        let mut builder = ModuleBuilder::new().capabilities(&[
            Capability::Tessellation,
            Capability::VulkanMemoryModel,
        ]);
        let main = builder.main;
        builder.global(Op::ExecutionMode, None, &[main.0, 22]);
        assert!(validate(&builder, TargetEnv::Universal1_3).is_ok());
    }

    #[test]
    fn decorations() {
        let mut builder = ModuleBuilder::new();
        let var = builder.u32_var;
        // Alignment
        builder.global(Op::Decorate, None, &[var.0, 44, 4]);
        assert_eq!(
            validate(&builder, TargetEnv::Universal1_3).unwrap_err().requires_one_of.0,
            &[Capability::Kernel],
        );

        let mut builder = ModuleBuilder::new();
        let var = builder.u32_var;
        // BuiltIn
        builder.global(Op::Decorate, None, &[var.0, 11, 28]);
        assert!(validate(&builder, TargetEnv::Universal1_3).is_ok());
    }

    #[test]
    fn member_decoration() {
        let mut builder = ModuleBuilder::new();
        let uint = builder.uint;
        let block = builder.global(Op::TypeStruct, None, &[uint.0]).unwrap();
        // CPacked
        builder.global(Op::MemberDecorate, None, &[block.0, 0, 10]);
        assert_eq!(
            validate(&builder, TargetEnv::Universal1_3).unwrap_err().opcode,
            Some(Op::MemberDecorate),
        );
    }

    #[test]
    fn image_dim() {
        let mut builder = ModuleBuilder::new();
        let float = builder.float;
        // OpTypeImage %float Buffer 0 0 0 1 Unknown
        builder.global(Op::TypeImage, None, &[float.0, 5, 0, 0, 0, 1, 0]);
        let err = validate(&builder, TargetEnv::Universal1_3).unwrap_err();
        assert_eq!(err.requires_one_of.0, &[Capability::SampledBuffer]);
        assert_eq!(err.context, "Dim");
    }

    #[test]
    fn opcode_requires_capability() {
        let mut builder = ModuleBuilder::new();
        let uint = builder.uint;
        builder.global(Op::TypeOpaque, None, &[uint.0]);
        let err = validate(&builder, TargetEnv::Universal1_3).unwrap_err();
        assert_eq!(err.rule, "SPIRV-Capability-Opcode");
        assert_eq!(err.requires_one_of.0, &[Capability::Kernel]);
    }
}
