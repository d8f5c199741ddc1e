// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Validation of decoded SPIR-V modules.
//!
//! A [`Validator`] walks the instructions of a module in order. Before the rules for an
//! instruction run, its declarations and its result id are recorded in a [`ValidationState`],
//! so that rules only ever see what the module has declared up to and including the current
//! instruction.
//!
//! The rules are grouped by the kind of instruction they apply to:
//!
//! - the capability rules apply to every opcode and to the enumerated operands of the
//!   module-level instructions,
//! - the layout rules check the version and the memory model of the module,
//! - the barrier and atomic rules check the scope and memory-semantics operands.

pub use self::{
    atomics::validate_atomic,
    barriers::{validate_control_barrier, validate_memory_barrier, validate_memory_named_barrier},
    env::TargetEnv,
    memory_semantics::validate_memory_semantics,
    scopes::{validate_execution_scope, validate_memory_scope},
    state::{IdDef, Int32Eval, TypeInfo, ValidationState},
};
use crate::{
    spirv::{Instruction, Op, Spirv, SpirvError},
    NonExhaustive, Validated, ValidationError, ValidationErrorKind,
};

mod atomics;
mod barriers;
mod capabilities;
mod env;
mod layout;
mod memory_semantics;
mod scopes;
mod state;

/// Validates SPIR-V modules for a target environment.
///
/// A validator holds no state of its own between modules, and can be shared between threads.
#[derive(Clone, Debug)]
pub struct Validator {
    target_env: TargetEnv,
}

impl Validator {
    /// Creates a new `Validator`.
    #[inline]
    pub fn new(create_info: ValidatorCreateInfo) -> Self {
        let ValidatorCreateInfo {
            target_env,
            _ne: _,
        } = create_info;

        Validator { target_env }
    }

    /// Returns the environment that modules are validated for.
    #[inline]
    pub fn target_env(&self) -> TargetEnv {
        self.target_env
    }

    /// Decodes and validates a module given as words.
    pub fn validate_words(&self, words: &[u32]) -> Result<(), Validated<SpirvError>> {
        let spirv = Spirv::new(words).map_err(Validated::Error)?;
        self.validate(&spirv)?;

        Ok(())
    }

    /// Decodes and validates a module given as bytes.
    pub fn validate_bytes(&self, bytes: &[u8]) -> Result<(), Validated<SpirvError>> {
        let spirv = Spirv::from_bytes(bytes).map_err(Validated::Error)?;
        self.validate(&spirv)?;

        Ok(())
    }

    /// Validates a decoded module.
    ///
    /// Returns the first rule that the module violates, in module order.
    pub fn validate(&self, spirv: &Spirv) -> Result<(), Box<ValidationError>> {
        let _span = tracing::debug_span!("validate", target_env = ?self.target_env).entered();

        self.validate_module(spirv).inspect_err(|err| {
            tracing::debug!(rule = err.rule, opcode = ?err.opcode, "module rejected");
        })
    }

    fn validate_module(&self, spirv: &Spirv) -> Result<(), Box<ValidationError>> {
        layout::validate_version(self.target_env, spirv.version())?;

        let mut state = ValidationState::new(self.target_env);

        for inst in spirv.instructions() {
            tracing::trace!(opcode = ?inst.opcode, result_id = ?inst.result_id, "instruction");

            state.register_instruction(inst)?;
            validate_instruction(&state, inst)?;
        }

        layout::validate_end_of_module(&state)?;
        tracing::debug!(instructions = spirv.instructions().len(), "module is valid");

        Ok(())
    }
}

impl Default for Validator {
    #[inline]
    fn default() -> Self {
        Validator::new(ValidatorCreateInfo::default())
    }
}

/// Parameters to create a new `Validator`.
#[derive(Clone, Debug)]
pub struct ValidatorCreateInfo {
    /// The environment that modules are validated for.
    ///
    /// The default value is [`TargetEnv::Universal1_6`].
    pub target_env: TargetEnv,

    pub _ne: NonExhaustive,
}

impl Default for ValidatorCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            target_env: TargetEnv::default(),
            _ne: NonExhaustive(()),
        }
    }
}

fn validate_instruction(
    state: &ValidationState,
    inst: &Instruction,
) -> Result<(), Box<ValidationError>> {
    capabilities::validate_opcode(state, inst)?;

    match inst.opcode {
        Op::Capability => capabilities::validate_capability(state, inst),
        Op::MemoryModel => {
            capabilities::validate_memory_model(state, inst)?;
            layout::validate_memory_model(state, inst)
        }
        Op::EntryPoint => capabilities::validate_entry_point(state, inst),
        Op::ExecutionMode | Op::ExecutionModeId => {
            capabilities::validate_execution_mode(state, inst)
        }
        Op::TypePointer | Op::Variable => capabilities::validate_storage_class(state, inst),
        Op::TypeImage => capabilities::validate_type_image(state, inst),
        Op::Decorate | Op::DecorateId => capabilities::validate_decoration(state, inst, 1),
        Op::MemberDecorate => capabilities::validate_decoration(state, inst, 2),
        Op::ControlBarrier => validate_control_barrier(state, inst),
        Op::MemoryBarrier => validate_memory_barrier(state, inst),
        Op::MemoryNamedBarrier => validate_memory_named_barrier(state, inst),
        Op::AtomicLoad
        | Op::AtomicStore
        | Op::AtomicExchange
        | Op::AtomicCompareExchange
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
        | Op::AtomicXor
        | Op::AtomicFlagTestAndSet
        | Op::AtomicFlagClear
        | Op::AtomicFMinEXT
        | Op::AtomicFMaxEXT
        | Op::AtomicFAddEXT => validate_atomic(state, inst),
        Op::Nop
        | Op::Undef
        | Op::SourceContinued
        | Op::Source
        | Op::SourceExtension
        | Op::Name
        | Op::MemberName
        | Op::String
        | Op::Line
        | Op::Extension
        | Op::ExtInstImport
        | Op::ExtInst
        | Op::TypeVoid
        | Op::TypeBool
        | Op::TypeInt
        | Op::TypeFloat
        | Op::TypeVector
        | Op::TypeMatrix
        | Op::TypeSampler
        | Op::TypeSampledImage
        | Op::TypeArray
        | Op::TypeRuntimeArray
        | Op::TypeStruct
        | Op::TypeOpaque
        | Op::TypeFunction
        | Op::ConstantTrue
        | Op::ConstantFalse
        | Op::Constant
        | Op::ConstantComposite
        | Op::ConstantSampler
        | Op::ConstantNull
        | Op::SpecConstantTrue
        | Op::SpecConstantFalse
        | Op::SpecConstant
        | Op::SpecConstantComposite
        | Op::SpecConstantOp
        | Op::Function
        | Op::FunctionParameter
        | Op::FunctionEnd
        | Op::FunctionCall
        | Op::Load
        | Op::Store
        | Op::CopyMemory
        | Op::AccessChain
        | Op::InBoundsAccessChain
        | Op::PtrAccessChain
        | Op::VectorShuffle
        | Op::CompositeConstruct
        | Op::CompositeExtract
        | Op::CompositeInsert
        | Op::ConvertFToU
        | Op::ConvertFToS
        | Op::ConvertSToF
        | Op::ConvertUToF
        | Op::Bitcast
        | Op::IAdd
        | Op::FAdd
        | Op::ISub
        | Op::FSub
        | Op::IMul
        | Op::FMul
        | Op::UDiv
        | Op::SDiv
        | Op::FDiv
        | Op::LogicalNot
        | Op::Select
        | Op::IEqual
        | Op::INotEqual
        | Op::UGreaterThan
        | Op::SGreaterThan
        | Op::ULessThan
        | Op::SLessThan
        | Op::ShiftLeftLogical
        | Op::BitwiseOr
        | Op::BitwiseAnd
        | Op::Phi
        | Op::LoopMerge
        | Op::SelectionMerge
        | Op::Label
        | Op::Branch
        | Op::BranchConditional
        | Op::Switch
        | Op::Kill
        | Op::Return
        | Op::ReturnValue
        | Op::Unreachable
        | Op::NoLine
        | Op::ModuleProcessed => Ok(()),
    }
}

/// Returns the error for an instruction that ends before the operand named `context`.
pub(crate) fn missing_operand(inst: &Instruction, context: &'static str) -> Box<ValidationError> {
    Box::new(ValidationError {
        kind: ValidationErrorKind::MalformedOperand,
        opcode: Some(inst.opcode),
        context: context.into(),
        problem: "is missing".into(),
        rule: "SPIRV-Instruction-MissingOperand",
        ..Default::default()
    })
}
