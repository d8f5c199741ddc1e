// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use super::{TargetEnv, ValidationState};
use crate::{
    spirv::{Capability, Instruction, MemoryModel},
    ValidationError, ValidationErrorKind, Version,
};

/// Checks that the version in the header is supported by `target_env`.
pub(super) fn validate_version(
    target_env: TargetEnv,
    version: Version,
) -> Result<(), Box<ValidationError>> {
    let max_version = target_env.max_spirv_version();

    if version > max_version {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::MalformedOperand,
            context: "the SPIR-V version".into(),
            problem: format!(
                "is {}, but the target environment supports at most {}",
                version, max_version,
            )
            .into(),
            rule: "SPIRV-Layout-Version",
            ..Default::default()
        }));
    }

    Ok(())
}

/// Checks that an `OpMemoryModel` instruction is the only one.
///
/// The state already includes `inst`.
pub(super) fn validate_memory_model(
    state: &ValidationState,
    inst: &Instruction,
) -> Result<(), Box<ValidationError>> {
    if state.memory_model_declarations() > 1 {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::InvalidCombination,
            opcode: Some(inst.opcode),
            problem: "the module already has an OpMemoryModel instruction".into(),
            rule: "SPIRV-Layout-MemoryModelDuplicate",
            ..Default::default()
        }));
    }

    Ok(())
}

/// Checks what must have been declared once the whole module has been seen.
pub(super) fn validate_end_of_module(state: &ValidationState) -> Result<(), Box<ValidationError>> {
    if state.memory_model_declarations() == 0 {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::InvalidCombination,
            problem: "the module has no OpMemoryModel instruction".into(),
            rule: "SPIRV-Layout-MemoryModelMissing",
            ..Default::default()
        }));
    }

    // Capabilities may be declared after the memory model.
    if state.has_capability(Capability::VulkanMemoryModel)
        && state.memory_model() != Some(MemoryModel::Vulkan)
    {
        return Err(Box::new(ValidationError {
            kind: ValidationErrorKind::InvalidCombination,
            context: "the memory model".into(),
            problem: "is not Vulkan, but the VulkanMemoryModel capability is declared".into(),
            rule: "SPIRV-Layout-VulkanMemoryModelCapability",
            ..Default::default()
        }));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_version;
    use crate::{
        spirv::{Capability, MemoryModel, Op},
        tests::{validate, ModuleBuilder},
        validation::TargetEnv,
        ValidationErrorKind, Version,
    };

    #[test]
    fn versions() {
        assert!(validate_version(TargetEnv::Vulkan1_1, Version::V1_3).is_ok());
        assert!(validate_version(TargetEnv::Universal1_6, Version::V1_0).is_ok());

        let err = validate_version(TargetEnv::Vulkan1_0, Version::V1_1).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MalformedOperand);
        assert_eq!(err.rule, "SPIRV-Layout-Version");
        assert_eq!(
            err.to_string(),
            "the SPIR-V version is 1.1, but the target environment supports at most 1.0 \
            (SPIRV-Layout-Version)",
        );
    }

    #[test]
    fn missing_memory_model() {
        let builder = ModuleBuilder::new().no_memory_model();
        let err = validate(&builder, TargetEnv::Universal1_3).unwrap_err();
        assert_eq!(err.rule, "SPIRV-Layout-MemoryModelMissing");
        assert_eq!(err.opcode, None);
    }

    #[test]
    fn duplicate_memory_model() {
        let mut builder = ModuleBuilder::new();
        builder.global(Op::MemoryModel, None, &[0, 3]);
        let err = validate(&builder, TargetEnv::Universal1_3).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidCombination);
        assert_eq!(err.rule, "SPIRV-Layout-MemoryModelDuplicate");
    }

    #[test]
    fn vulkan_memory_model_capability_needs_vulkan_model() {
        let builder = ModuleBuilder::new().memory_model(MemoryModel::GLSL450);
        assert_eq!(
            validate(&builder, TargetEnv::Universal1_3).unwrap_err().rule,
            "SPIRV-Layout-VulkanMemoryModelCapability",
        );

        let builder = ModuleBuilder::new()
            .capabilities(&[Capability::Shader])
            .memory_model(MemoryModel::GLSL450);
        assert!(validate(&builder, TargetEnv::Universal1_3).is_ok());
    }

    #[test]
    fn vulkan_memory_model_capability_after_memory_model() {
        let mut builder = ModuleBuilder::new()
            .capabilities(&[Capability::Shader])
            .memory_model(MemoryModel::GLSL450);
        builder.global(
            Op::Capability,
            None,
            &[Capability::VulkanMemoryModel as u32],
        );
        let err = validate(&builder, TargetEnv::Universal1_3).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidCombination);
        assert_eq!(err.rule, "SPIRV-Layout-VulkanMemoryModelCapability");
        assert_eq!(err.opcode, None);
    }
}
