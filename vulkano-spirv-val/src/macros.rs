// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

macro_rules! spirv_bitflags {
    {
        $(#[doc = $ty_doc:literal])*
        $ty:ident
        $( impl { $($impls:item)* } )?
        = $repr:ty;

        $(
            $(#[doc = $flag_doc:literal])*
            $flag_name:ident = $flag_value:literal
            $(RequiresOneOf([
                $($capability:ident),+ $(,)?
            ]))?
            ,
        )+
    } => {
        $(#[doc = $ty_doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $ty($repr);

        impl $ty {
            $(
                $(#[doc = $flag_doc])*
                pub const $flag_name: Self = Self($flag_value);
            )*

            #[doc = concat!("Returns a `", stringify!($ty), "` with none of the flags set.")]
            #[inline]
            pub const fn empty() -> Self {
                Self(0)
            }

            #[doc = concat!("Returns a `", stringify!($ty), "` with all of the flags set.")]
            #[inline]
            pub const fn all() -> Self {
                Self(Self::all_raw())
            }

            const fn all_raw() -> $repr {
                0
                $(
                    | $flag_value
                )*
            }

            /// Wraps a raw value as it appears in a SPIR-V module. Unknown bits are kept, so that
            /// they can be reported.
            #[inline]
            pub const fn from_raw(raw: $repr) -> Self {
                Self(raw)
            }

            /// Returns the raw value.
            #[inline]
            pub const fn as_raw(self) -> $repr {
                self.0
            }

            /// Returns the number of flags set in `self`.
            #[inline]
            pub const fn count(self) -> u32 {
                self.0.count_ones()
            }

            /// Returns whether no flags are set in `self`.
            #[inline]
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Returns whether any flags are set in both `self` and `other`.
            #[inline]
            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            /// Returns whether all flags in `other` are set in `self`.
            #[inline]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Returns the union of `self` and `other`.
            #[inline]
            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// Returns the intersection of `self` and `other`.
            #[inline]
            pub const fn intersection(self, other: Self) -> Self {
                Self(self.0 & other.0)
            }

            /// Returns `self` without the flags set in `other`.
            #[inline]
            pub const fn difference(self, other: Self) -> Self {
                Self(self.0 & !other.0)
            }

            /// Returns the flags that are set in `self` or `other`, but not in both.
            #[inline]
            pub const fn symmetric_difference(self, other: Self) -> Self {
                Self(self.0 ^ other.0)
            }

            /// Returns the flags not in `self`.
            #[inline]
            pub const fn complement(self) -> Self {
                Self(!self.0 & Self::all_raw())
            }

            /// Returns the capabilities of which at least one must be declared to use the single
            /// flag `bit`, or `None` if `bit` is not a known flag.
            pub(crate) const fn bit_required_capabilities(
                bit: $repr,
            ) -> Option<&'static [crate::spirv::Capability]> {
                match bit {
                    $(
                        $flag_value => Some(&[
                            $($(crate::spirv::Capability::$capability),+)?
                        ]),
                    )+
                    _ => None,
                }
            }

            $( $($impls)* )?
        }

        impl Default for $ty {
            #[inline]
            fn default() -> Self {
                Self::empty()
            }
        }

        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
                #[allow(unused_mut)]
                let mut written = false;

                $(
                    if self.intersects(Self::$flag_name) {
                        if written {
                            write!(f, " | ")?;
                        }

                        write!(f, stringify!($flag_name))?;
                        written = true;
                    }
                )*

                let unknown = self.0 & !Self::all_raw();

                if unknown != 0 {
                    if written {
                        write!(f, " | ")?;
                    }

                    write!(f, "{:#x}", unknown)?;
                    written = true;
                }

                if !written {
                    write!(f, "empty()")?;
                }

                Ok(())
            }
        }

        impl From<$repr> for $ty {
            #[inline]
            fn from(val: $repr) -> Self {
                Self::from_raw(val)
            }
        }

        impl From<$ty> for $repr {
            #[inline]
            fn from(val: $ty) -> Self {
                val.0
            }
        }

        impl std::ops::BitAnd for $ty {
            type Output = Self;

            #[inline]
            fn bitand(self, rhs: Self) -> Self {
                self.intersection(rhs)
            }
        }

        impl std::ops::BitAndAssign for $ty {
            #[inline]
            fn bitand_assign(&mut self, rhs: Self) {
                *self = self.intersection(rhs);
            }
        }

        impl std::ops::BitOr for $ty {
            type Output = Self;

            #[inline]
            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }

        impl std::ops::BitOrAssign for $ty {
            #[inline]
            fn bitor_assign(&mut self, rhs: Self) {
                *self = self.union(rhs);
            }
        }

        impl std::ops::BitXor for $ty {
            type Output = Self;

            #[inline]
            fn bitxor(self, rhs: Self) -> Self {
                self.symmetric_difference(rhs)
            }
        }

        impl std::ops::Sub for $ty {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                self.difference(rhs)
            }
        }

        impl std::ops::Not for $ty {
            type Output = Self;

            #[inline]
            fn not(self) -> Self {
                self.complement()
            }
        }
    };
}

macro_rules! spirv_enum {
    {
        $(#[doc = $ty_doc:literal])*
        $ty:ident
        $( impl { $($impls:item)* } )?
        = $repr:ty;

        $(
            $(#[doc = $flag_doc:literal])*
            $flag_name:ident = $flag_value:literal
            $(RequiresOneOf([
                $($capability:ident),+ $(,)?
            ]))?
            ,
        )+
    } => {
        $(#[doc = $ty_doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr($repr)]
        pub enum $ty {
            $(
                $(#[doc = $flag_doc])*
                $flag_name = $flag_value,
            )+
        }

        impl $ty {
            #[allow(dead_code)]
            pub(crate) const COUNT: usize = [
                $($flag_value),+
            ].len();

            #[allow(dead_code)]
            pub(crate) const ALL: [Self; Self::COUNT] = [
                $(Self::$flag_name),+
            ];

            /// Returns the name of the value, as written in the SPIR-V grammar.
            pub const fn name(self) -> &'static str {
                match self {
                    $(
                        Self::$flag_name => stringify!($flag_name),
                    )+
                }
            }

            /// Returns the capabilities of which at least one must be declared to use this value.
            /// An empty slice means that the value can be used unconditionally.
            pub const fn required_capabilities(self) -> &'static [crate::spirv::Capability] {
                match self {
                    $(
                        Self::$flag_name => &[
                            $($(crate::spirv::Capability::$capability),+)?
                        ],
                    )+
                }
            }

            $(
                $($impls)*
            )?
        }

        impl From<$ty> for $repr {
            #[inline]
            fn from(val: $ty) -> Self {
                val as $repr
            }
        }

        impl TryFrom<$repr> for $ty {
            type Error = ();

            #[inline]
            fn try_from(val: $repr) -> Result<Self, Self::Error> {
                Ok(match val {
                    $(
                        $flag_value => Self::$flag_name,
                    )+
                    _ => return Err(()),
                })
            }
        }
    };
}

pub(crate) use {spirv_bitflags, spirv_enum};
