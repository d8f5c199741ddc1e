// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use super::{missing_operand, TargetEnv};
use crate::{
    spirv::{
        implied_capabilities, AddressingModel, Capability, Id, Instruction, MemoryModel, Op,
    },
    ValidationError, ValidationErrorKind,
};
use foldhash::{HashMap, HashSet};
use smallvec::SmallVec;

/// What the validator knows about a module at the current point of the walk.
///
/// The state only grows: every declaration and every result id is recorded when its
/// instruction is reached, and is visible to the rules from then on.
#[derive(Debug)]
pub struct ValidationState {
    target_env: TargetEnv,
    capabilities: HashSet<Capability>,
    extensions: HashSet<String>,
    addressing_model: Option<AddressingModel>,
    memory_model: Option<MemoryModel>,
    memory_model_declarations: u32,
    defs: HashMap<Id, IdDef>,
}

/// The definition of a result id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdDef {
    /// The opcode of the defining instruction.
    pub opcode: Op,
    /// The result type of the defining instruction, if it has one.
    pub result_type_id: Option<Id>,
    /// The literal words of a constant. Empty for other instructions.
    pub literals: SmallVec<[u32; 2]>,
    /// The type that the instruction declares, if it is a type declaration.
    pub type_info: Option<TypeInfo>,
}

/// A type declared by one of the `OpType*` instructions that the rules look into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeInfo {
    Void,
    Bool,
    Int { width: u32, signed: bool },
    Float { width: u32 },
    Pointer { storage_class: u32, pointee: Id },
    Other,
}

/// The result of trying to fold an id to a 32-bit integer constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Int32Eval {
    /// The id is not defined, or its type is not a 32-bit integer.
    NotInt32,
    /// The id is a 32-bit integer whose value is only known at runtime, or after
    /// specialization.
    Runtime,
    /// The id is a 32-bit integer constant with this value.
    Constant(u32),
}

impl Int32Eval {
    /// Returns whether the id is a 32-bit integer.
    #[inline]
    pub fn is_int32(self) -> bool {
        !matches!(self, Self::NotInt32)
    }

    /// Returns whether the value of the id is known.
    #[inline]
    pub fn is_constant(self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// Returns the value of the id, or 0 if it is not known.
    #[inline]
    pub fn value(self) -> u32 {
        match self {
            Self::Constant(value) => value,
            Self::NotInt32 | Self::Runtime => 0,
        }
    }
}

impl ValidationState {
    pub(crate) fn new(target_env: TargetEnv) -> Self {
        ValidationState {
            target_env,
            capabilities: HashSet::default(),
            extensions: HashSet::default(),
            addressing_model: None,
            memory_model: None,
            memory_model_declarations: 0,
            defs: HashMap::default(),
        }
    }

    /// Records the declarations and the result id of `inst`.
    ///
    /// Unknown enumerant values are not recorded. They are reported by the capability rules,
    /// which run on the same instruction afterwards.
    pub(crate) fn register_instruction(
        &mut self,
        inst: &Instruction,
    ) -> Result<(), Box<ValidationError>> {
        match inst.opcode {
            Op::Capability => {
                let raw = inst
                    .operand_word(0)
                    .ok_or_else(|| missing_operand(inst, "Capability"))?;

                if let Ok(capability) = Capability::try_from(raw) {
                    tracing::debug!(?capability, "declared capability");
                    self.capabilities
                        .extend(implied_capabilities(capability).iter().copied());
                }
            }
            Op::Extension => {
                let name = inst.operand_string(0).map_err(|_| {
                    Box::new(ValidationError {
                        kind: ValidationErrorKind::MalformedOperand,
                        opcode: Some(inst.opcode),
                        context: "Name".into(),
                        problem: "is not a valid literal string".into(),
                        rule: "SPIRV-Instruction-InvalidString",
                        ..Default::default()
                    })
                })?;

                tracing::debug!(extension = %name, "declared extension");
                self.extensions.insert(name);
            }
            Op::MemoryModel => {
                let addressing_model = inst
                    .operand_word(0)
                    .ok_or_else(|| missing_operand(inst, "Addressing Model"))?;
                let memory_model = inst
                    .operand_word(1)
                    .ok_or_else(|| missing_operand(inst, "Memory Model"))?;

                self.addressing_model = AddressingModel::try_from(addressing_model).ok();
                self.memory_model = MemoryModel::try_from(memory_model).ok();
                self.memory_model_declarations += 1;

                tracing::debug!(
                    addressing_model = ?self.addressing_model,
                    memory_model = ?self.memory_model,
                    "declared memory model",
                );
            }
            _ => (),
        }

        if let Some(result_id) = inst.result_id {
            let def = IdDef {
                opcode: inst.opcode,
                result_type_id: inst.result_type_id,
                literals: if inst.opcode.is_constant() {
                    SmallVec::from_slice(&inst.operands)
                } else {
                    SmallVec::new()
                },
                type_info: type_info(inst),
            };

            self.defs.entry(result_id).or_insert(def);
        }

        Ok(())
    }

    /// Returns the target environment.
    #[inline]
    pub fn target_env(&self) -> TargetEnv {
        self.target_env
    }

    /// Returns whether the target environment is one of the Vulkan environments.
    #[inline]
    pub fn is_vulkan_env(&self) -> bool {
        self.target_env.is_vulkan()
    }

    /// Returns whether the Vulkan rules apply: either the target environment is Vulkan, or the
    /// module declares the Vulkan memory model.
    #[inline]
    pub fn validates_vulkan(&self) -> bool {
        self.is_vulkan_env() || self.memory_model == Some(MemoryModel::Vulkan)
    }

    /// Returns whether the module has declared `capability`, directly or implicitly.
    #[inline]
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Returns whether the module has declared at least one of `capabilities`.
    #[inline]
    pub fn has_any_capability(&self, capabilities: &[Capability]) -> bool {
        capabilities
            .iter()
            .any(|&capability| self.has_capability(capability))
    }

    /// Returns whether the module has declared the extension `name`.
    #[inline]
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    /// Returns the declared addressing model.
    #[inline]
    pub fn addressing_model(&self) -> Option<AddressingModel> {
        self.addressing_model
    }

    /// Returns the declared memory model.
    #[inline]
    pub fn memory_model(&self) -> Option<MemoryModel> {
        self.memory_model
    }

    /// Returns how many `OpMemoryModel` instructions have been seen.
    #[inline]
    pub(crate) fn memory_model_declarations(&self) -> u32 {
        self.memory_model_declarations
    }

    /// Returns the definition of `id`.
    #[inline]
    pub fn find_def(&self, id: Id) -> Option<&IdDef> {
        self.defs.get(&id)
    }

    /// Returns the opcode of the instruction that defines `id`.
    #[inline]
    pub fn id_opcode(&self, id: Id) -> Option<Op> {
        self.find_def(id).map(|def| def.opcode)
    }

    /// Returns the type declared by `id`, if `id` is a type declaration.
    #[inline]
    pub fn type_info(&self, id: Id) -> Option<TypeInfo> {
        self.find_def(id).and_then(|def| def.type_info)
    }

    /// Returns the type of the value `id`.
    #[inline]
    pub fn value_type(&self, id: Id) -> Option<TypeInfo> {
        self.find_def(id)
            .and_then(|def| def.result_type_id)
            .and_then(|type_id| self.type_info(type_id))
    }

    /// Folds `id` to a 32-bit integer constant, if it is one.
    pub fn eval_int32_if_const(&self, id: Id) -> Int32Eval {
        let Some(def) = self.find_def(id) else {
            return Int32Eval::NotInt32;
        };

        if !matches!(self.value_type(id), Some(TypeInfo::Int { width: 32, .. })) {
            return Int32Eval::NotInt32;
        }

        if !def.opcode.is_constant() || def.opcode.is_spec_constant() {
            return Int32Eval::Runtime;
        }

        if def.opcode == Op::ConstantNull {
            return Int32Eval::Constant(0);
        }

        match def.literals.first() {
            Some(&value) => Int32Eval::Constant(value),
            None => Int32Eval::Runtime,
        }
    }

    /// Returns the VUID of the Vulkan rule with the given number.
    ///
    /// # Panics
    ///
    /// - Panics if `number` does not belong to a rule that this crate checks.
    pub fn vuid(&self, number: u32) -> &'static str {
        match number {
            4636 => "VUID-StandaloneSpirv-None-04636",
            4638 => "VUID-StandaloneSpirv-None-04638",
            4641 => "VUID-StandaloneSpirv-None-04641",
            10001 => "VUID-StandaloneSpirv-MemorySemantics-10001",
            10002 => "VUID-StandaloneSpirv-MemorySemantics-10002",
            10003 => "VUID-StandaloneSpirv-MemorySemantics-10003",
            10004 => "VUID-StandaloneSpirv-MemorySemantics-10004",
            10005 => "VUID-StandaloneSpirv-MemorySemantics-10005",
            10006 => "VUID-StandaloneSpirv-MemorySemantics-10006",
            10007 => "VUID-StandaloneSpirv-MemorySemantics-10007",
            10008 => "VUID-StandaloneSpirv-MemorySemantics-10008",
            10009 => "VUID-StandaloneSpirv-MemorySemantics-10009",
            10010 => "VUID-StandaloneSpirv-MemorySemantics-10010",
            10011 => "VUID-StandaloneSpirv-MemorySemantics-10011",
            10012 => "VUID-StandaloneSpirv-MemorySemantics-10012",
            10013 => "VUID-StandaloneSpirv-MemorySemantics-10013",
            10014 => "VUID-StandaloneSpirv-MemorySemantics-10014",
            _ => unreachable!("no VUID is known for rule {}", number),
        }
    }
}

fn type_info(inst: &Instruction) -> Option<TypeInfo> {
    Some(match inst.opcode {
        Op::TypeVoid => TypeInfo::Void,
        Op::TypeBool => TypeInfo::Bool,
        Op::TypeInt => TypeInfo::Int {
            width: inst.operand_word(0)?,
            signed: inst.operand_word(1)? != 0,
        },
        Op::TypeFloat => TypeInfo::Float {
            width: inst.operand_word(0)?,
        },
        Op::TypePointer => TypeInfo::Pointer {
            storage_class: inst.operand_word(0)?,
            pointee: inst.operand_id(1)?,
        },
        Op::TypeVector
        | Op::TypeMatrix
        | Op::TypeImage
        | Op::TypeSampler
        | Op::TypeSampledImage
        | Op::TypeArray
        | Op::TypeRuntimeArray
        | Op::TypeStruct
        | Op::TypeOpaque
        | Op::TypeFunction => TypeInfo::Other,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{spirv::Spirv, tests::ModuleBuilder};

    fn state_for(builder: ModuleBuilder) -> (ValidationState, ModuleBuilder) {
        let spirv = Spirv::new(&builder.build()).unwrap();
        let mut state = ValidationState::new(TargetEnv::Universal1_3);

        for inst in spirv.instructions() {
            state.register_instruction(inst).unwrap();
        }

        (state, builder)
    }

    #[test]
    fn capabilities_are_closed() {
        let (state, _) = state_for(ModuleBuilder::new());
        assert!(state.has_capability(Capability::Shader));
        assert!(state.has_capability(Capability::Matrix));
        assert!(state.has_capability(Capability::VulkanMemoryModel));
        assert!(!state.has_capability(Capability::Kernel));
    }

    #[test]
    fn declarations() {
        let (state, _) = state_for(ModuleBuilder::new());
        assert!(state.has_extension("SPV_KHR_vulkan_memory_model"));
        assert!(!state.has_extension("SPV_KHR_storage_buffer_storage_class"));
        assert_eq!(state.memory_model(), Some(MemoryModel::Vulkan));
        assert_eq!(state.addressing_model(), Some(AddressingModel::Logical));
        assert_eq!(state.memory_model_declarations(), 1);
        assert!(state.validates_vulkan());
        assert!(!state.is_vulkan_env());
    }

    #[test]
    fn fold_constants() {
        let mut builder = ModuleBuilder::new();
        let five = builder.constant_u32(5);
        let null = builder.constant_null_u32();
        let spec = builder.spec_constant_u32(7);
        let flag = builder.constant_true();
        let (state, builder) = state_for(builder);

        assert_eq!(state.eval_int32_if_const(five), Int32Eval::Constant(5));
        assert_eq!(state.eval_int32_if_const(null), Int32Eval::Constant(0));
        assert_eq!(state.eval_int32_if_const(spec), Int32Eval::Runtime);
        assert_eq!(state.eval_int32_if_const(flag), Int32Eval::NotInt32);
        assert_eq!(state.eval_int32_if_const(Id(9999)), Int32Eval::NotInt32);

        // A load from a variable is a runtime value.
        assert_eq!(state.eval_int32_if_const(builder.u32_var), Int32Eval::NotInt32);
        assert_eq!(state.id_opcode(five), Some(Op::Constant));
    }

    #[test]
    fn fold_64_bit_is_not_int32() {
        let mut builder = ModuleBuilder::new();
        let wide = builder.constant_u64(1);
        let (state, _) = state_for(builder);
        assert_eq!(state.eval_int32_if_const(wide), Int32Eval::NotInt32);
    }

    #[test]
    fn fold_runtime_value() {
        let mut builder = ModuleBuilder::new();
        let loaded = builder.load_u32();
        let (state, _) = state_for(builder);

        let eval = state.eval_int32_if_const(loaded);
        assert_eq!(eval, Int32Eval::Runtime);
        assert!(eval.is_int32());
        assert!(!eval.is_constant());
        assert_eq!(eval.value(), 0);
    }

    #[test]
    fn vuids() {
        let state = ValidationState::new(TargetEnv::Vulkan1_1);
        assert_eq!(state.vuid(10001), "VUID-StandaloneSpirv-MemorySemantics-10001");
        assert_eq!(state.vuid(4641), "VUID-StandaloneSpirv-None-04641");
    }

    #[test]
    #[should_panic]
    fn unknown_vuid() {
        ValidationState::new(TargetEnv::Vulkan1_1).vuid(42);
    }
}
