// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use crate::Version;

/// The environment that a module is validated for.
///
/// The Vulkan environments enable the additional rules that the Vulkan specification places on
/// SPIR-V modules. The universal environments only apply the rules of SPIR-V itself, for the
/// given SPIR-V version.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum TargetEnv {
    Universal1_0,
    Universal1_1,
    Universal1_2,
    Universal1_3,
    Universal1_4,
    Universal1_5,
    #[default]
    Universal1_6,
    Vulkan1_0,
    Vulkan1_1,
    Vulkan1_2,
    Vulkan1_3,
    Vulkan1_4,
    OpenCl1_2,
    OpenCl2_0,
    OpenGl4_5,
}

impl TargetEnv {
    /// Returns whether this is one of the Vulkan environments.
    #[inline]
    pub const fn is_vulkan(self) -> bool {
        matches!(
            self,
            Self::Vulkan1_0 | Self::Vulkan1_1 | Self::Vulkan1_2 | Self::Vulkan1_3 | Self::Vulkan1_4
        )
    }

    /// Returns the highest SPIR-V version that modules may declare in this environment.
    pub const fn max_spirv_version(self) -> Version {
        match self {
            Self::Universal1_0 | Self::Vulkan1_0 | Self::OpenCl1_2 | Self::OpenGl4_5 => {
                Version::V1_0
            }
            Self::Universal1_1 => Version::V1_1,
            Self::Universal1_2 | Self::OpenCl2_0 => Version::V1_2,
            Self::Universal1_3 | Self::Vulkan1_1 => Version::V1_3,
            Self::Universal1_4 => Version::V1_4,
            Self::Universal1_5 | Self::Vulkan1_2 => Version::V1_5,
            Self::Universal1_6 | Self::Vulkan1_3 | Self::Vulkan1_4 => Version::V1_6,
        }
    }
}
