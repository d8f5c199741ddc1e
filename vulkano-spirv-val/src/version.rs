// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use std::{cmp::Ordering, fmt};

/// Represents a version of the SPIR-V specification, as declared in the header of a module.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version {
    /// Major version number.
    pub major: u8,
    /// Minor version number.
    pub minor: u8,
}

impl Version {
    pub const V1_0: Version = Version::major_minor(1, 0);
    pub const V1_1: Version = Version::major_minor(1, 1);
    pub const V1_2: Version = Version::major_minor(1, 2);
    pub const V1_3: Version = Version::major_minor(1, 3);
    pub const V1_4: Version = Version::major_minor(1, 4);
    pub const V1_5: Version = Version::major_minor(1, 5);
    pub const V1_6: Version = Version::major_minor(1, 6);

    /// Constructs a `Version` from the given major and minor version numbers.
    #[inline]
    pub const fn major_minor(major: u8, minor: u8) -> Version {
        Version { major, minor }
    }

    /// Turns the version word of a SPIR-V header into a `Version` struct.
    ///
    /// The word is laid out as `0 | major | minor | 0`, one byte each, high to low.
    #[inline]
    pub const fn from_spirv_word(value: u32) -> Version {
        Version {
            major: ((value & 0x00ff0000) >> 16) as u8,
            minor: ((value & 0x0000ff00) >> 8) as u8,
        }
    }

    /// Turns a `Version` into the version word of a SPIR-V header.
    #[inline]
    pub const fn into_spirv_word(self) -> u32 {
        (self.major as u32) << 16 | (self.minor as u32) << 8
    }
}

impl Default for Version {
    #[inline]
    fn default() -> Self {
        Self::V1_0
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, formatter)
    }
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Version) -> Ordering {
        match self.major.cmp(&other.major) {
            Ordering::Equal => (),
            o => return o,
        };

        self.minor.cmp(&other.minor)
    }
}
