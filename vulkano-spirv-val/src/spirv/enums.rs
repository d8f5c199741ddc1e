// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The SPIR-V operand enumerations that the validator inspects.
//!
//! Each enumerant lists the capabilities of which at least one must be declared for the
//! enumerant to be used. For `Capability` itself, the list is the set of capabilities that
//! declaring it implicitly declares as well.

use crate::macros::{spirv_bitflags, spirv_enum};

spirv_enum! {
    /// A feature that a module must declare with `OpCapability` before using it.
    Capability = u32;

    Matrix = 0,
    Shader = 1 RequiresOneOf([Matrix]),
    Geometry = 2 RequiresOneOf([Shader]),
    Tessellation = 3 RequiresOneOf([Shader]),
    Addresses = 4,
    Linkage = 5,
    Kernel = 6,
    Vector16 = 7 RequiresOneOf([Kernel]),
    Float16Buffer = 8 RequiresOneOf([Kernel]),
    Float16 = 9 RequiresOneOf([Float16Buffer]),
    Float64 = 10,
    Int64 = 11,
    Int64Atomics = 12 RequiresOneOf([Int64]),
    ImageBasic = 13 RequiresOneOf([Kernel]),
    ImageReadWrite = 14 RequiresOneOf([Kernel]),
    ImageMipmap = 15 RequiresOneOf([Kernel]),
    Pipes = 17 RequiresOneOf([Kernel]),
    Groups = 18,
    DeviceEnqueue = 19 RequiresOneOf([Kernel]),
    LiteralSampler = 20 RequiresOneOf([Kernel]),
    AtomicStorage = 21 RequiresOneOf([Shader]),
    Int16 = 22,
    TessellationPointSize = 23 RequiresOneOf([Tessellation]),
    GeometryPointSize = 24 RequiresOneOf([Geometry]),
    ImageGatherExtended = 25 RequiresOneOf([Shader]),
    StorageImageMultisample = 27 RequiresOneOf([Shader]),
    UniformBufferArrayDynamicIndexing = 28 RequiresOneOf([Shader]),
    SampledImageArrayDynamicIndexing = 29 RequiresOneOf([Shader]),
    StorageBufferArrayDynamicIndexing = 30 RequiresOneOf([Shader]),
    StorageImageArrayDynamicIndexing = 31 RequiresOneOf([Shader]),
    ClipDistance = 32 RequiresOneOf([Shader]),
    CullDistance = 33 RequiresOneOf([Shader]),
    ImageCubeArray = 34 RequiresOneOf([SampledCubeArray]),
    SampleRateShading = 35 RequiresOneOf([Shader]),
    ImageRect = 36 RequiresOneOf([SampledRect]),
    SampledRect = 37 RequiresOneOf([Shader]),
    GenericPointer = 38 RequiresOneOf([Addresses]),
    Int8 = 39 RequiresOneOf([Kernel]),
    InputAttachment = 40 RequiresOneOf([Shader]),
    SparseResidency = 41 RequiresOneOf([Shader]),
    MinLod = 42 RequiresOneOf([Shader]),
    Sampled1D = 43 RequiresOneOf([Shader]),
    Image1D = 44 RequiresOneOf([Sampled1D]),
    SampledCubeArray = 45 RequiresOneOf([Shader]),
    SampledBuffer = 46 RequiresOneOf([Shader]),
    ImageBuffer = 47 RequiresOneOf([SampledBuffer]),
    ImageMSArray = 48 RequiresOneOf([Shader]),
    StorageImageExtendedFormats = 49 RequiresOneOf([Shader]),
    ImageQuery = 50 RequiresOneOf([Shader]),
    DerivativeControl = 51 RequiresOneOf([Shader]),
    InterpolationFunction = 52 RequiresOneOf([Shader]),
    TransformFeedback = 53 RequiresOneOf([Shader]),
    GeometryStreams = 54 RequiresOneOf([Geometry]),
    StorageImageReadWithoutFormat = 55 RequiresOneOf([Shader]),
    StorageImageWriteWithoutFormat = 56 RequiresOneOf([Shader]),
    MultiViewport = 57 RequiresOneOf([Geometry]),
    SubgroupDispatch = 58 RequiresOneOf([DeviceEnqueue]),
    NamedBarrier = 59 RequiresOneOf([Kernel]),
    PipeStorage = 60 RequiresOneOf([Pipes]),
    GroupNonUniform = 61,
    RayTracingKHR = 4479 RequiresOneOf([Shader]),
    VulkanMemoryModel = 5345,
    VulkanMemoryModelDeviceScope = 5346,
    PhysicalStorageBufferAddresses = 5347 RequiresOneOf([Shader]),
    CooperativeMatrixNV = 5357 RequiresOneOf([Shader]),
    AtomicFloat32MinMaxEXT = 5612,
    AtomicFloat32AddEXT = 6033,
    CooperativeMatrixKHR = 6022,
}

spirv_enum! {
    /// The addressing model declared by `OpMemoryModel`.
    AddressingModel = u32;

    Logical = 0,
    Physical32 = 1 RequiresOneOf([Addresses]),
    Physical64 = 2 RequiresOneOf([Addresses]),
    PhysicalStorageBuffer64 = 5348 RequiresOneOf([PhysicalStorageBufferAddresses]),
}

spirv_enum! {
    /// The memory model declared by `OpMemoryModel`.
    MemoryModel = u32;

    Simple = 0 RequiresOneOf([Shader]),
    GLSL450 = 1 RequiresOneOf([Shader]),
    OpenCL = 2 RequiresOneOf([Kernel]),
    Vulkan = 3 RequiresOneOf([VulkanMemoryModel]),
}

spirv_enum! {
    /// The execution model of an entry point.
    ExecutionModel = u32;

    Vertex = 0 RequiresOneOf([Shader]),
    TessellationControl = 1 RequiresOneOf([Tessellation]),
    TessellationEvaluation = 2 RequiresOneOf([Tessellation]),
    Geometry = 3 RequiresOneOf([Geometry]),
    Fragment = 4 RequiresOneOf([Shader]),
    GLCompute = 5 RequiresOneOf([Shader]),
    Kernel = 6 RequiresOneOf([Kernel]),
}

spirv_enum! {
    /// A mode declared for an entry point with `OpExecutionMode`.
    ExecutionMode = u32;

    Invocations = 0 RequiresOneOf([Geometry]),
    SpacingEqual = 1 RequiresOneOf([Tessellation]),
    SpacingFractionalEven = 2 RequiresOneOf([Tessellation]),
    SpacingFractionalOdd = 3 RequiresOneOf([Tessellation]),
    VertexOrderCw = 4 RequiresOneOf([Tessellation]),
    VertexOrderCcw = 5 RequiresOneOf([Tessellation]),
    PixelCenterInteger = 6 RequiresOneOf([Shader]),
    OriginUpperLeft = 7 RequiresOneOf([Shader]),
    OriginLowerLeft = 8 RequiresOneOf([Shader]),
    EarlyFragmentTests = 9 RequiresOneOf([Shader]),
    PointMode = 10 RequiresOneOf([Tessellation]),
    Xfb = 11 RequiresOneOf([TransformFeedback]),
    DepthReplacing = 12 RequiresOneOf([Shader]),
    DepthGreater = 14 RequiresOneOf([Shader]),
    DepthLess = 15 RequiresOneOf([Shader]),
    DepthUnchanged = 16 RequiresOneOf([Shader]),
    LocalSize = 17,
    LocalSizeHint = 18 RequiresOneOf([Kernel]),
    InputPoints = 19 RequiresOneOf([Geometry]),
    InputLines = 20 RequiresOneOf([Geometry]),
    InputLinesAdjacency = 21 RequiresOneOf([Geometry]),
    Triangles = 22 RequiresOneOf([Geometry, Tessellation]),
    InputTrianglesAdjacency = 23 RequiresOneOf([Geometry]),
    Quads = 24 RequiresOneOf([Tessellation]),
    Isolines = 25 RequiresOneOf([Tessellation]),
    OutputVertices = 26 RequiresOneOf([Geometry, Tessellation]),
    OutputPoints = 27 RequiresOneOf([Geometry]),
    OutputLineStrip = 28 RequiresOneOf([Geometry]),
    OutputTriangleStrip = 29 RequiresOneOf([Geometry]),
    VecTypeHint = 30 RequiresOneOf([Kernel]),
    ContractionOff = 31 RequiresOneOf([Kernel]),
}

spirv_enum! {
    /// The storage class of a pointer type or a variable.
    StorageClass = u32;

    UniformConstant = 0,
    Input = 1 RequiresOneOf([Shader]),
    Uniform = 2 RequiresOneOf([Shader]),
    Output = 3 RequiresOneOf([Shader]),
    Workgroup = 4,
    CrossWorkgroup = 5,
    Private = 6 RequiresOneOf([Shader]),
    Function = 7,
    Generic = 8 RequiresOneOf([Kernel]),
    PushConstant = 9 RequiresOneOf([Shader]),
    AtomicCounter = 10 RequiresOneOf([AtomicStorage]),
    Image = 11,
    StorageBuffer = 12 RequiresOneOf([Shader]),
    PhysicalStorageBuffer = 5349 RequiresOneOf([PhysicalStorageBufferAddresses]),
}

spirv_enum! {
    /// The dimensionality of an image type.
    Dim = u32;

    Dim1D = 0 RequiresOneOf([Sampled1D]),
    Dim2D = 1,
    Dim3D = 2,
    Cube = 3 RequiresOneOf([Shader]),
    Rect = 4 RequiresOneOf([SampledRect]),
    Buffer = 5 RequiresOneOf([SampledBuffer]),
    SubpassData = 6 RequiresOneOf([InputAttachment]),
}

spirv_enum! {
    /// A decoration applied with `OpDecorate` or `OpMemberDecorate`.
    Decoration = u32;

    RelaxedPrecision = 0 RequiresOneOf([Shader]),
    SpecId = 1 RequiresOneOf([Shader]),
    Block = 2 RequiresOneOf([Shader]),
    BufferBlock = 3 RequiresOneOf([Shader]),
    RowMajor = 4 RequiresOneOf([Matrix]),
    ColMajor = 5 RequiresOneOf([Matrix]),
    ArrayStride = 6 RequiresOneOf([Shader]),
    MatrixStride = 7 RequiresOneOf([Shader]),
    GLSLShared = 8 RequiresOneOf([Shader]),
    GLSLPacked = 9 RequiresOneOf([Shader]),
    CPacked = 10 RequiresOneOf([Kernel]),
    // Kernels decorate their builtins too.
    BuiltIn = 11,
    NoPerspective = 13 RequiresOneOf([Shader]),
    Flat = 14 RequiresOneOf([Shader]),
    Patch = 15 RequiresOneOf([Tessellation]),
    Centroid = 16 RequiresOneOf([Shader]),
    Sample = 17 RequiresOneOf([Shader]),
    Invariant = 18 RequiresOneOf([Shader]),
    Restrict = 19,
    Aliased = 20,
    Volatile = 21,
    Constant = 22 RequiresOneOf([Kernel]),
    Coherent = 23,
    NonWritable = 24,
    NonReadable = 25,
    Uniform = 26 RequiresOneOf([Shader]),
    SaturatedConversion = 28 RequiresOneOf([Kernel]),
    Stream = 29 RequiresOneOf([GeometryStreams]),
    Location = 30 RequiresOneOf([Shader]),
    Component = 31 RequiresOneOf([Shader]),
    Index = 32 RequiresOneOf([Shader]),
    Binding = 33 RequiresOneOf([Shader]),
    DescriptorSet = 34 RequiresOneOf([Shader]),
    Offset = 35,
    XfbBuffer = 36 RequiresOneOf([TransformFeedback]),
    XfbStride = 37 RequiresOneOf([TransformFeedback]),
    FuncParamAttr = 38 RequiresOneOf([Kernel]),
    FPRoundingMode = 39 RequiresOneOf([Kernel]),
    FPFastMathMode = 40 RequiresOneOf([Kernel]),
    LinkageAttributes = 41 RequiresOneOf([Linkage]),
    NoContraction = 42 RequiresOneOf([Shader]),
    InputAttachmentIndex = 43 RequiresOneOf([InputAttachment]),
    Alignment = 44 RequiresOneOf([Kernel]),
}

spirv_enum! {
    /// The set of invocations that an execution or memory-ordering guarantee applies across.
    Scope = u32;

    /// Crosses multiple devices.
    CrossDevice = 0,
    /// The current device.
    Device = 1,
    /// The current workgroup.
    Workgroup = 2,
    /// The current subgroup.
    Subgroup = 3,
    /// The current invocation only.
    Invocation = 4,
    /// The current queue family.
    QueueFamily = 5,
    /// The invocations of a ray tracing shader call.
    ShaderCallKHR = 6 RequiresOneOf([RayTracingKHR]),
}

spirv_bitflags! {
    /// The memory-semantics operand of atomic and barrier instructions.
    ///
    /// The flags fall into three groups: the memory order (at most one of `ACQUIRE`, `RELEASE`,
    /// `ACQUIRE_RELEASE` and `SEQUENTIALLY_CONSISTENT`, none meaning relaxed), the storage
    /// classes the ordering applies to, and the Vulkan memory model modifiers.
    MemorySemantics impl {
        /// The memory-order flags. At most one of them may be set.
        pub const MEMORY_ORDER: Self = Self::ACQUIRE
            .union(Self::RELEASE)
            .union(Self::ACQUIRE_RELEASE)
            .union(Self::SEQUENTIALLY_CONSISTENT);

        /// The storage-class flags that the Vulkan memory model honors. `SUBGROUP_MEMORY`,
        /// `CROSS_WORKGROUP_MEMORY` and `ATOMIC_COUNTER_MEMORY` are ignored by Vulkan.
        pub const VULKAN_STORAGE_CLASSES: Self = Self::UNIFORM_MEMORY
            .union(Self::WORKGROUP_MEMORY)
            .union(Self::IMAGE_MEMORY)
            .union(Self::OUTPUT_MEMORY);

        /// Returns the number of memory-order flags set in `self`.
        #[inline]
        pub const fn memory_order_count(self) -> u32 {
            self.intersection(Self::MEMORY_ORDER).count()
        }
    } = u32;

    ACQUIRE = 0x2,
    RELEASE = 0x4,
    ACQUIRE_RELEASE = 0x8,
    SEQUENTIALLY_CONSISTENT = 0x10,
    UNIFORM_MEMORY = 0x40 RequiresOneOf([Shader]),
    SUBGROUP_MEMORY = 0x80,
    WORKGROUP_MEMORY = 0x100,
    CROSS_WORKGROUP_MEMORY = 0x200,
    ATOMIC_COUNTER_MEMORY = 0x400 RequiresOneOf([Shader]),
    IMAGE_MEMORY = 0x800,
    OUTPUT_MEMORY = 0x1000 RequiresOneOf([VulkanMemoryModel]),
    MAKE_AVAILABLE = 0x2000 RequiresOneOf([VulkanMemoryModel]),
    MAKE_VISIBLE = 0x4000 RequiresOneOf([VulkanMemoryModel]),
    VOLATILE = 0x8000 RequiresOneOf([VulkanMemoryModel]),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_round_trip_through_raw() {
        assert_eq!(Capability::try_from(5345), Ok(Capability::VulkanMemoryModel));
        assert_eq!(u32::from(Scope::Invocation), 4);
        assert_eq!(StorageClass::try_from(13), Err(()));
    }

    #[test]
    fn memory_order_count() {
        let semantics = MemorySemantics::ACQUIRE | MemorySemantics::RELEASE;
        assert_eq!(semantics.memory_order_count(), 2);
        assert_eq!(MemorySemantics::UNIFORM_MEMORY.memory_order_count(), 0);
        assert_eq!(
            (MemorySemantics::SEQUENTIALLY_CONSISTENT | MemorySemantics::VOLATILE)
                .memory_order_count(),
            1,
        );
    }

    #[test]
    fn memory_semantics_debug_keeps_unknown_bits() {
        let semantics = MemorySemantics::from_raw(0x2 | 0x1);
        assert_eq!(format!("{:?}", semantics), "ACQUIRE | 0x1");
        assert_eq!(format!("{:?}", MemorySemantics::empty()), "empty()");
    }
}
