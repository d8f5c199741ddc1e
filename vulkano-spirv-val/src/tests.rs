// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

#![cfg(test)]

//! Helpers to assemble small SPIR-V modules in tests, and tests of the crate-root error types.

use crate::{
    spirv::{AddressingModel, Capability, ExecutionModel, Id, MemoryModel, Op, Spirv},
    validation::{TargetEnv, Validator, ValidatorCreateInfo},
    RequiresOneOf, ValidationError, ValidationErrorKind, Version,
};

const MAGIC: u32 = 0x07230203;
const WORKGROUP: u32 = 4;

/// Packs `string` into nul-terminated words.
pub(crate) fn string_words(string: &str) -> Vec<u32> {
    let mut bytes = string.as_bytes().to_vec();
    bytes.push(0);
    bytes.resize(bytes.len().next_multiple_of(4), 0);

    bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Assembles and validates the module of `builder` for `target_env`.
pub(crate) fn validate(
    builder: &ModuleBuilder,
    target_env: TargetEnv,
) -> Result<(), Box<ValidationError>> {
    let spirv = Spirv::new(&builder.build()).unwrap();

    Validator::new(ValidatorCreateInfo {
        target_env,
        ..Default::default()
    })
    .validate(&spirv)
}

/// Assembles a module with a single compute entry point.
///
/// The module-level declarations are set with the builder methods that take `self`. Types,
/// constants and variables go into the global section, and other instructions into the body of
/// the entry point. A few common types and two `Workgroup` variables are always declared.
pub(crate) struct ModuleBuilder {
    version: Version,
    capabilities: Vec<Capability>,
    extensions: Vec<String>,
    addressing_model: AddressingModel,
    memory_model: Option<MemoryModel>,
    execution_model: ExecutionModel,
    next_id: u32,
    globals: Vec<u32>,
    body: Vec<u32>,

    pub void: Id,
    pub function_type: Id,
    pub bool: Id,
    pub uint: Id,
    pub uint_ptr: Id,
    pub u32_var: Id,
    pub float: Id,
    pub float_ptr: Id,
    pub float_var: Id,
    pub main: Id,
    ulong: Option<Id>,
}

impl ModuleBuilder {
    /// A shader module for the Vulkan memory model.
    pub(crate) fn new() -> Self {
        let mut builder = ModuleBuilder {
            version: Version::V1_3,
            capabilities: vec![Capability::Shader, Capability::VulkanMemoryModel],
            extensions: vec!["SPV_KHR_vulkan_memory_model".to_owned()],
            addressing_model: AddressingModel::Logical,
            memory_model: Some(MemoryModel::Vulkan),
            execution_model: ExecutionModel::GLCompute,
            next_id: 1,
            globals: Vec::new(),
            body: Vec::new(),
            void: Id(0),
            function_type: Id(0),
            bool: Id(0),
            uint: Id(0),
            uint_ptr: Id(0),
            u32_var: Id(0),
            float: Id(0),
            float_ptr: Id(0),
            float_var: Id(0),
            main: Id(0),
            ulong: None,
        };

        builder.main = builder.alloc();
        builder.void = builder.type_global(Op::TypeVoid, &[]);
        builder.function_type = builder.type_global(Op::TypeFunction, &[builder.void.0]);
        builder.bool = builder.type_global(Op::TypeBool, &[]);
        builder.uint = builder.type_global(Op::TypeInt, &[32, 0]);
        builder.uint_ptr = builder.type_global(Op::TypePointer, &[WORKGROUP, builder.uint.0]);
        builder.u32_var = builder.variable(builder.uint_ptr);
        builder.float = builder.type_global(Op::TypeFloat, &[32]);
        builder.float_ptr = builder.type_global(Op::TypePointer, &[WORKGROUP, builder.float.0]);
        builder.float_var = builder.variable(builder.float_ptr);

        builder
    }

    /// An OpenCL kernel module.
    pub(crate) fn kernel() -> Self {
        ModuleBuilder::new()
            .version(Version::V1_0)
            .capabilities(&[Capability::Kernel])
            .extensions(&[])
            .memory_model(MemoryModel::OpenCL)
            .execution_model(ExecutionModel::Kernel)
    }

    pub(crate) fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub(crate) fn capabilities(mut self, capabilities: &[Capability]) -> Self {
        self.capabilities = capabilities.to_vec();
        self
    }

    pub(crate) fn extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|&name| name.to_owned()).collect();
        self
    }

    pub(crate) fn memory_model(mut self, memory_model: MemoryModel) -> Self {
        self.memory_model = Some(memory_model);
        self
    }

    pub(crate) fn no_memory_model(mut self) -> Self {
        self.memory_model = None;
        self
    }

    pub(crate) fn execution_model(mut self, execution_model: ExecutionModel) -> Self {
        self.execution_model = execution_model;
        self
    }

    fn alloc(&mut self) -> Id {
        let id = Id(self.next_id);
        self.next_id += 1;
        id
    }

    fn type_global(&mut self, opcode: Op, operands: &[u32]) -> Id {
        self.global(opcode, None, operands).unwrap()
    }

    fn variable(&mut self, pointer_type: Id) -> Id {
        self.global(Op::Variable, Some(pointer_type), &[WORKGROUP])
            .unwrap()
    }

    /// Adds an instruction to the global section, and returns its result id if it has one.
    pub(crate) fn global(
        &mut self,
        opcode: Op,
        result_type_id: Option<Id>,
        operands: &[u32],
    ) -> Option<Id> {
        let result_id = opcode.has_result().then(|| self.alloc());
        push_instruction(&mut self.globals, opcode, result_type_id, result_id, operands);
        result_id
    }

    /// Adds an instruction to the body of the entry point, and returns its result id if it has
    /// one.
    pub(crate) fn body(
        &mut self,
        opcode: Op,
        result_type_id: Option<Id>,
        operands: &[u32],
    ) -> Option<Id> {
        let result_id = opcode.has_result().then(|| self.alloc());
        push_instruction(&mut self.body, opcode, result_type_id, result_id, operands);
        result_id
    }

    pub(crate) fn constant_u32(&mut self, value: u32) -> Id {
        let uint = self.uint;
        self.global(Op::Constant, Some(uint), &[value]).unwrap()
    }

    pub(crate) fn constant_null_u32(&mut self) -> Id {
        let uint = self.uint;
        self.global(Op::ConstantNull, Some(uint), &[]).unwrap()
    }

    pub(crate) fn spec_constant_u32(&mut self, value: u32) -> Id {
        let uint = self.uint;
        self.global(Op::SpecConstant, Some(uint), &[value]).unwrap()
    }

    pub(crate) fn constant_true(&mut self) -> Id {
        let bool = self.bool;
        self.global(Op::ConstantTrue, Some(bool), &[]).unwrap()
    }

    pub(crate) fn constant_f32(&mut self, value: f32) -> Id {
        let float = self.float;
        self.global(Op::Constant, Some(float), &[value.to_bits()])
            .unwrap()
    }

    pub(crate) fn constant_u64(&mut self, value: u64) -> Id {
        let ulong = self.ulong();
        self.global(Op::Constant, Some(ulong), &[value as u32, (value >> 32) as u32])
            .unwrap()
    }

    fn ulong(&mut self) -> Id {
        match self.ulong {
            Some(ulong) => ulong,
            None => {
                let ulong = self.type_global(Op::TypeInt, &[64, 0]);
                self.ulong = Some(ulong);
                ulong
            }
        }
    }

    /// Declares a `Workgroup` variable of a 64-bit int, and returns the int type and the
    /// variable.
    pub(crate) fn u64_var(&mut self) -> (Id, Id) {
        let ulong = self.ulong();
        let pointer = self.type_global(Op::TypePointer, &[WORKGROUP, ulong.0]);
        (ulong, self.variable(pointer))
    }

    /// Declares a `Workgroup` variable of a bool.
    pub(crate) fn bool_var(&mut self) -> Id {
        let pointer = self.type_global(Op::TypePointer, &[WORKGROUP, self.bool.0]);
        self.variable(pointer)
    }

    /// Loads the value of `u32_var`, giving an int whose value is only known at runtime.
    pub(crate) fn load_u32(&mut self) -> Id {
        let (uint, u32_var) = (self.uint, self.u32_var);
        self.body(Op::Load, Some(uint), &[u32_var.0]).unwrap()
    }

    /// Adds an atomic instruction on `u32_var`, or on `float_var` for the float atomics.
    ///
    /// The value operand is added for the opcodes that take one.
    pub(crate) fn atomic(&mut self, opcode: Op, scope: Id, semantics: &[Id]) -> Option<Id> {
        let is_float = matches!(
            opcode,
            Op::AtomicFMinEXT | Op::AtomicFMaxEXT | Op::AtomicFAddEXT
        );
        let (pointer, data_type) = if is_float {
            (self.float_var, self.float)
        } else {
            (self.u32_var, self.uint)
        };
        let result_type_id = match opcode {
            Op::AtomicFlagTestAndSet => Some(self.bool),
            _ if opcode.has_result_type() => Some(data_type),
            _ => None,
        };

        let mut operands = vec![pointer.0, scope.0];
        operands.extend(semantics.iter().map(|id| id.0));

        if matches!(
            opcode,
            Op::AtomicStore
                | Op::AtomicExchange
                | Op::AtomicIAdd
                | Op::AtomicISub
                | Op::AtomicSMin
                | Op::AtomicUMin
                | Op::AtomicSMax
                | Op::AtomicUMax
                | Op::AtomicAnd
                | Op::AtomicOr
                | Op::AtomicXor
        ) || is_float
        {
            let value = if is_float {
                self.constant_f32(1.0)
            } else {
                self.constant_u32(1)
            };
            operands.push(value.0);
        }

        self.body(opcode, result_type_id, &operands)
    }

    /// Adds a compare-exchange on `u32_var`.
    pub(crate) fn compare_exchange(
        &mut self,
        opcode: Op,
        scope: Id,
        equal: Id,
        unequal: Id,
    ) -> Option<Id> {
        let value = self.constant_u32(1);
        let comparator = self.constant_u32(0);
        let (uint, u32_var) = (self.uint, self.u32_var);

        self.body(
            opcode,
            Some(uint),
            &[u32_var.0, scope.0, equal.0, unequal.0, value.0, comparator.0],
        )
    }

    pub(crate) fn memory_barrier(&mut self, scope: Id, semantics: Id) {
        self.body(Op::MemoryBarrier, None, &[scope.0, semantics.0]);
    }

    pub(crate) fn control_barrier(&mut self, execution: Id, scope: Id, semantics: Id) {
        self.body(
            Op::ControlBarrier,
            None,
            &[execution.0, scope.0, semantics.0],
        );
    }

    /// Returns the words of the module.
    pub(crate) fn build(&self) -> Vec<u32> {
        let mut words = vec![MAGIC, self.version.into_spirv_word(), 0, 0, 0];

        for &capability in &self.capabilities {
            push_instruction(&mut words, Op::Capability, None, None, &[capability as u32]);
        }

        for extension in &self.extensions {
            push_instruction(&mut words, Op::Extension, None, None, &string_words(extension));
        }

        if let Some(memory_model) = self.memory_model {
            push_instruction(
                &mut words,
                Op::MemoryModel,
                None,
                None,
                &[self.addressing_model as u32, memory_model as u32],
            );
        }

        let mut entry_point = vec![self.execution_model as u32, self.main.0];
        entry_point.extend(string_words("main"));
        push_instruction(&mut words, Op::EntryPoint, None, None, &entry_point);
        push_instruction(
            &mut words,
            Op::ExecutionMode,
            None,
            None,
            &[self.main.0, 17, 1, 1, 1],
        );

        words.extend_from_slice(&self.globals);

        let label = Id(self.next_id);
        push_instruction(
            &mut words,
            Op::Function,
            Some(self.void),
            Some(self.main),
            &[0, self.function_type.0],
        );
        push_instruction(&mut words, Op::Label, None, Some(label), &[]);
        words.extend_from_slice(&self.body);
        push_instruction(&mut words, Op::Return, None, None, &[]);
        push_instruction(&mut words, Op::FunctionEnd, None, None, &[]);

        words[3] = label.0 + 1;

        words
    }
}

fn push_instruction(
    words: &mut Vec<u32>,
    opcode: Op,
    result_type_id: Option<Id>,
    result_id: Option<Id>,
    operands: &[u32],
) {
    let word_count = 1
        + result_type_id.is_some() as usize
        + result_id.is_some() as usize
        + operands.len();

    words.push((word_count as u32) << 16 | u32::from(u16::from(opcode)));
    words.extend(result_type_id.map(u32::from));
    words.extend(result_id.map(u32::from));
    words.extend_from_slice(operands);
}

#[test]
fn display_with_requirements() {
    let err = ValidationError {
        kind: ValidationErrorKind::MissingCapability,
        opcode: Some(Op::AtomicLoad),
        context: "Memory Semantics".into(),
        problem: "UniformMemory requires capability Shader".into(),
        requires_one_of: RequiresOneOf(&[Capability::Shader]),
        rule: "SPIRV-MemorySemantics-Capability",
    };

    assert_eq!(
        err.to_string(),
        "AtomicLoad: Memory Semantics UniformMemory requires capability Shader \
        -- requires capability `Shader` (SPIRV-MemorySemantics-Capability)",
    );
}

#[test]
fn display_without_opcode() {
    let err = ValidationError {
        kind: ValidationErrorKind::InvalidCombination,
        problem: "the module has no OpMemoryModel instruction".into(),
        rule: "SPIRV-Layout-MemoryModelMissing",
        ..Default::default()
    };

    assert_eq!(
        err.to_string(),
        "the module has no OpMemoryModel instruction (SPIRV-Layout-MemoryModelMissing)",
    );
}

#[test]
fn requires_one_of_alternatives() {
    let requires = RequiresOneOf(&[Capability::Geometry, Capability::Tessellation]);
    assert_eq!(
        requires.to_string(),
        "requires one of: capability `Geometry` or capability `Tessellation`",
    );
}
