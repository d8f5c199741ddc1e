// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use super::{
    memory_semantics::validate_memory_semantics,
    missing_operand,
    scopes::{validate_execution_scope, validate_memory_scope},
    ValidationState,
};
use crate::{spirv::Instruction, ValidationError, ValidationErrorKind};

/// Validates `OpControlBarrier`: `Execution`, `Memory`, `Semantics`.
pub fn validate_control_barrier(
    state: &ValidationState,
    inst: &Instruction,
) -> Result<(), Box<ValidationError>> {
    validate_execution_scope(state, inst, 0)?;
    validate_memory_scope(state, inst, 1)?;
    validate_memory_semantics(state, inst, 2, 1)
}

/// Validates `OpMemoryBarrier`: `Memory`, `Semantics`.
pub fn validate_memory_barrier(
    state: &ValidationState,
    inst: &Instruction,
) -> Result<(), Box<ValidationError>> {
    validate_memory_scope(state, inst, 0)?;
    validate_memory_semantics(state, inst, 1, 0)
}

/// Validates `OpMemoryNamedBarrier`: `Named Barrier`, `Memory`, `Semantics`.
pub fn validate_memory_named_barrier(
    state: &ValidationState,
    inst: &Instruction,
) -> Result<(), Box<ValidationError>> {
    let named_barrier = inst
        .operand_id(0)
        .ok_or_else(|| missing_operand(inst, "Named Barrier"))?;

    if state.find_def(named_barrier).is_none() {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::MalformedOperand,
            opcode: Some(inst.opcode),
            context: "Named Barrier".into(),
            problem: format!("{} is not defined", named_barrier).into(),
            rule: "SPIRV-Barrier-NamedBarrier",
            ..Default::default()
        }));
    }

    validate_memory_scope(state, inst, 1)?;
    validate_memory_semantics(state, inst, 2, 1)
}

#[cfg(test)]
mod tests {
    use crate::{
        spirv::{Capability, MemoryModel, Op},
        tests::{validate, ModuleBuilder},
        validation::TargetEnv,
        ValidationErrorKind,
    };

    #[test]
    fn control_barrier() {
        let mut builder = ModuleBuilder::new();
        let execution = builder.constant_u32(2);
        let scope = builder.constant_u32(5);
        let semantics = builder.constant_u32(0x8 | 0x100);
        builder.control_barrier(execution, scope, semantics);
        assert!(validate(&builder, TargetEnv::Vulkan1_1).is_ok());
    }

    #[test]
    fn memory_barrier_checks_scope_first() {
        let mut builder = ModuleBuilder::new();
        let scope = builder.constant_u32(42);
        let semantics = builder.constant_u32(0x2 | 0x4);
        builder.memory_barrier(scope, semantics);
        assert_eq!(
            validate(&builder, TargetEnv::Universal1_3).unwrap_err().rule,
            "SPIRV-Scope-Unknown",
        );
    }

    #[test]
    fn named_barrier_requires_capability() {
        let mut builder = ModuleBuilder::kernel();
        let barrier = builder.constant_u32(0);
        let scope = builder.constant_u32(2);
        let semantics = builder.constant_u32(0x8 | 0x100);
        builder.body(Op::MemoryNamedBarrier, None, &[barrier.0, scope.0, semantics.0]);
        let err = validate(&builder, TargetEnv::Universal1_3).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingCapability);
        assert_eq!(err.requires_one_of.0, &[Capability::NamedBarrier]);
    }

    #[test]
    fn named_barrier() {
        let mut builder = ModuleBuilder::kernel()
            .capabilities(&[Capability::Kernel, Capability::NamedBarrier])
            .memory_model(MemoryModel::OpenCL);
        let barrier = builder.constant_u32(0);
        let scope = builder.constant_u32(2);
        let semantics = builder.constant_u32(0x8 | 0x100);
        builder.body(Op::MemoryNamedBarrier, None, &[barrier.0, scope.0, semantics.0]);
        assert!(validate(&builder, TargetEnv::Universal1_3).is_ok());

        let mut builder = ModuleBuilder::kernel()
            .capabilities(&[Capability::Kernel, Capability::NamedBarrier]);
        let scope = builder.constant_u32(2);
        let semantics = builder.constant_u32(0x8 | 0x100);
        builder.body(Op::MemoryNamedBarrier, None, &[999, scope.0, semantics.0]);
        assert_eq!(
            validate(&builder, TargetEnv::Universal1_3).unwrap_err().rule,
            "SPIRV-Barrier-NamedBarrier",
        );
    }
}
