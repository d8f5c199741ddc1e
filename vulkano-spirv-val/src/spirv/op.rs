// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use std::fmt::{Display, Error as FmtError, Formatter};

macro_rules! spirv_ops {
    {
        $(
            $(#[doc = $doc:literal])*
            $name:ident = $value:literal ($result_type:literal, $result:literal)
            $(RequiresOneOf([
                $($capability:ident),+ $(,)?
            ]))?
            ,
        )+
    } => {
        /// The opcodes of the instructions that the validator understands.
        ///
        /// The `Display` impl prints the name without its `Op` prefix, as diagnostics do.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u16)]
        pub enum Op {
            $(
                $(#[doc = $doc])*
                $name = $value,
            )+
        }

        impl Op {
            /// Returns whether instructions with this opcode have a result type id operand.
            #[inline]
            pub const fn has_result_type(self) -> bool {
                match self {
                    $(Self::$name => $result_type,)+
                }
            }

            /// Returns whether instructions with this opcode have a result id operand.
            #[inline]
            pub const fn has_result(self) -> bool {
                match self {
                    $(Self::$name => $result,)+
                }
            }

            /// Returns the capabilities of which at least one must be declared to use this
            /// opcode. An empty slice means that the opcode can be used unconditionally.
            pub const fn required_capabilities(self) -> &'static [crate::spirv::Capability] {
                match self {
                    $(
                        Self::$name => &[
                            $($(crate::spirv::Capability::$capability),+)?
                        ],
                    )+
                }
            }
        }

        impl TryFrom<u16> for Op {
            type Error = ();

            #[inline]
            fn try_from(val: u16) -> Result<Self, Self::Error> {
                Ok(match val {
                    $($value => Self::$name,)+
                    _ => return Err(()),
                })
            }
        }
    };
}

spirv_ops! {
    Nop = 0 (false, false),
    Undef = 1 (true, true),
    SourceContinued = 2 (false, false),
    Source = 3 (false, false),
    SourceExtension = 4 (false, false),
    Name = 5 (false, false),
    MemberName = 6 (false, false),
    String = 7 (false, true),
    Line = 8 (false, false),
    Extension = 10 (false, false),
    ExtInstImport = 11 (false, true),
    ExtInst = 12 (true, true),
    MemoryModel = 14 (false, false),
    EntryPoint = 15 (false, false),
    ExecutionMode = 16 (false, false),
    Capability = 17 (false, false),
    TypeVoid = 19 (false, true),
    TypeBool = 20 (false, true),
    TypeInt = 21 (false, true),
    TypeFloat = 22 (false, true),
    TypeVector = 23 (false, true),
    TypeMatrix = 24 (false, true) RequiresOneOf([Matrix]),
    TypeImage = 25 (false, true),
    TypeSampler = 26 (false, true),
    TypeSampledImage = 27 (false, true),
    TypeArray = 28 (false, true),
    TypeRuntimeArray = 29 (false, true) RequiresOneOf([Shader]),
    TypeStruct = 30 (false, true),
    TypeOpaque = 31 (false, true) RequiresOneOf([Kernel]),
    TypePointer = 32 (false, true),
    TypeFunction = 33 (false, true),
    ConstantTrue = 41 (true, true),
    ConstantFalse = 42 (true, true),
    Constant = 43 (true, true),
    ConstantComposite = 44 (true, true),
    ConstantSampler = 45 (true, true) RequiresOneOf([LiteralSampler]),
    ConstantNull = 46 (true, true),
    SpecConstantTrue = 48 (true, true),
    SpecConstantFalse = 49 (true, true),
    SpecConstant = 50 (true, true),
    SpecConstantComposite = 51 (true, true),
    SpecConstantOp = 52 (true, true),
    Function = 54 (true, true),
    FunctionParameter = 55 (true, true),
    FunctionEnd = 56 (false, false),
    FunctionCall = 57 (true, true),
    Variable = 59 (true, true),
    Load = 61 (true, true),
    Store = 62 (false, false),
    CopyMemory = 63 (false, false),
    AccessChain = 65 (true, true),
    InBoundsAccessChain = 66 (true, true),
    PtrAccessChain = 67 (true, true) RequiresOneOf([Addresses]),
    Decorate = 71 (false, false),
    MemberDecorate = 72 (false, false),
    VectorShuffle = 79 (true, true),
    CompositeConstruct = 80 (true, true),
    CompositeExtract = 81 (true, true),
    CompositeInsert = 82 (true, true),
    ConvertFToU = 109 (true, true),
    ConvertFToS = 110 (true, true),
    ConvertSToF = 111 (true, true),
    ConvertUToF = 112 (true, true),
    Bitcast = 124 (true, true),
    IAdd = 128 (true, true),
    FAdd = 129 (true, true),
    ISub = 130 (true, true),
    FSub = 131 (true, true),
    IMul = 132 (true, true),
    FMul = 133 (true, true),
    UDiv = 134 (true, true),
    SDiv = 135 (true, true),
    FDiv = 136 (true, true),
    LogicalNot = 168 (true, true),
    Select = 169 (true, true),
    IEqual = 170 (true, true),
    INotEqual = 171 (true, true),
    UGreaterThan = 172 (true, true),
    SGreaterThan = 173 (true, true),
    ULessThan = 176 (true, true),
    SLessThan = 177 (true, true),
    ShiftLeftLogical = 196 (true, true),
    BitwiseOr = 197 (true, true),
    BitwiseAnd = 199 (true, true),
    ControlBarrier = 224 (false, false),
    MemoryBarrier = 225 (false, false),
    AtomicLoad = 227 (true, true),
    AtomicStore = 228 (false, false),
    AtomicExchange = 229 (true, true),
    AtomicCompareExchange = 230 (true, true),
    AtomicCompareExchangeWeak = 231 (true, true) RequiresOneOf([Kernel]),
    AtomicIIncrement = 232 (true, true),
    AtomicIDecrement = 233 (true, true),
    AtomicIAdd = 234 (true, true),
    AtomicISub = 235 (true, true),
    AtomicSMin = 236 (true, true),
    AtomicUMin = 237 (true, true),
    AtomicSMax = 238 (true, true),
    AtomicUMax = 239 (true, true),
    AtomicAnd = 240 (true, true),
    AtomicOr = 241 (true, true),
    AtomicXor = 242 (true, true),
    Phi = 245 (true, true),
    LoopMerge = 246 (false, false),
    SelectionMerge = 247 (false, false),
    Label = 248 (false, true),
    Branch = 249 (false, false),
    BranchConditional = 250 (false, false),
    Switch = 251 (false, false),
    Kill = 252 (false, false) RequiresOneOf([Shader]),
    Return = 253 (false, false),
    ReturnValue = 254 (false, false),
    Unreachable = 255 (false, false),
    NoLine = 317 (false, false),
    AtomicFlagTestAndSet = 318 (true, true) RequiresOneOf([Kernel]),
    AtomicFlagClear = 319 (false, false) RequiresOneOf([Kernel]),
    MemoryNamedBarrier = 329 (false, false) RequiresOneOf([NamedBarrier]),
    ModuleProcessed = 330 (false, false),
    ExecutionModeId = 331 (false, false),
    DecorateId = 332 (false, false),
    AtomicFMinEXT = 5614 (true, true) RequiresOneOf([AtomicFloat32MinMaxEXT]),
    AtomicFMaxEXT = 5615 (true, true) RequiresOneOf([AtomicFloat32MinMaxEXT]),
    AtomicFAddEXT = 6035 (true, true) RequiresOneOf([AtomicFloat32AddEXT]),
}

impl Op {
    /// Returns whether this is one of the atomic instructions.
    pub const fn is_atomic(self) -> bool {
        matches!(
            self,
            Self::AtomicLoad
                | Self::AtomicStore
                | Self::AtomicExchange
                | Self::AtomicCompareExchange
                | Self::AtomicCompareExchangeWeak
                | Self::AtomicIIncrement
                | Self::AtomicIDecrement
                | Self::AtomicIAdd
                | Self::AtomicISub
                | Self::AtomicSMin
                | Self::AtomicUMin
                | Self::AtomicSMax
                | Self::AtomicUMax
                | Self::AtomicAnd
                | Self::AtomicOr
                | Self::AtomicXor
                | Self::AtomicFlagTestAndSet
                | Self::AtomicFlagClear
                | Self::AtomicFMinEXT
                | Self::AtomicFMaxEXT
                | Self::AtomicFAddEXT
        )
    }

    /// Returns whether this is one of the barrier instructions.
    pub const fn is_barrier(self) -> bool {
        matches!(
            self,
            Self::ControlBarrier | Self::MemoryBarrier | Self::MemoryNamedBarrier
        )
    }

    /// Returns whether this opcode defines a constant, including specialization constants.
    pub const fn is_constant(self) -> bool {
        matches!(
            self,
            Self::ConstantTrue
                | Self::ConstantFalse
                | Self::Constant
                | Self::ConstantComposite
                | Self::ConstantSampler
                | Self::ConstantNull
        ) || self.is_spec_constant()
    }

    /// Returns whether this opcode defines a specialization constant.
    pub const fn is_spec_constant(self) -> bool {
        matches!(
            self,
            Self::SpecConstantTrue
                | Self::SpecConstantFalse
                | Self::SpecConstant
                | Self::SpecConstantComposite
                | Self::SpecConstantOp
        )
    }
}

impl From<Op> for u16 {
    #[inline]
    fn from(val: Op) -> Self {
        val as u16
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        std::fmt::Debug::fmt(self, f)
    }
}
