// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

#![doc(html_logo_url = "https://raw.githubusercontent.com/vulkano-rs/vulkano/master/logo.png")]
//! Rule-based validation of SPIR-V modules.
//!
//! The validator walks the instructions of a decoded module once, in module order. It collects
//! the declarations that later instructions depend on (capabilities, the memory model, and the
//! definitions of ids), and checks each instruction against the rules that apply to its opcode.
//! The first violation stops the walk and is returned as a [`ValidationError`].
//!
//! The most detailed rules are those for the memory-semantics operand of atomic and barrier
//! instructions, including the extra restrictions of the Vulkan environment and of the Vulkan
//! memory model.
//!
//! # Examples
//!
//! ```no_run
//! use vulkano_spirv_val::{
//!     validation::{TargetEnv, Validator, ValidatorCreateInfo},
//!     Validated,
//! };
//!
//! # let words: Vec<u32> = Vec::new();
//! let validator = Validator::new(ValidatorCreateInfo {
//!     target_env: TargetEnv::Vulkan1_3,
//!     ..Default::default()
//! });
//!
//! match validator.validate_words(&words) {
//!     Ok(()) => println!("module is valid"),
//!     Err(Validated::ValidationError(err)) => println!("{}", err),
//!     Err(Validated::Error(err)) => println!("could not decode module: {}", err),
//! }
//! ```

pub use crate::version::Version;
use crate::spirv::{Capability, Op};
use std::{
    borrow::Cow,
    error::Error,
    fmt::{Display, Error as FmtError, Formatter},
};

mod macros;
pub mod spirv;
#[cfg(test)]
mod tests;
pub mod validation;
mod version;

/// A helper type for non-exhaustive structs.
///
/// This type cannot be constructed outside this crate. Structs that contain it must be created
/// with struct update syntax and `Default::default()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NonExhaustive(pub(crate) ());

/// An error that can happen while validating a module, or the error `E` of a runtime failure.
#[derive(Clone)]
pub enum Validated<E> {
    /// A non-validation error occurred.
    Error(E),

    /// A validation error occurred.
    ValidationError(Box<ValidationError>),
}

impl<E> Validated<E> {
    /// Maps the inner `Error` value using the provided function, or does nothing if the value
    /// is `ValidationError`.
    #[inline]
    pub fn map<F>(self, f: impl FnOnce(E) -> F) -> Validated<F> {
        match self {
            Self::Error(err) => Validated::Error(f(err)),
            Self::ValidationError(err) => Validated::ValidationError(err),
        }
    }

    /// Returns the inner `ValidationError`, or `None` if the value is `Error`.
    #[inline]
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            Self::Error(_) => None,
            Self::ValidationError(err) => Some(err),
        }
    }
}

impl<E> std::fmt::Debug for Validated<E>
where
    E: std::fmt::Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Self::Error(err) => write!(f, "a non-validation error occurred: {:?}", err),
            Self::ValidationError(err) => {
                write!(f, "a validation error occurred\n\nCaused by:\n    {:?}", err)
            }
        }
    }
}

impl<E> Display for Validated<E>
where
    E: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Self::Error(err) => write!(f, "a non-validation error occurred: {}", err),
            Self::ValidationError(err) => write!(f, "a validation error occurred: {}", err),
        }
    }
}

impl<E> Error for Validated<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Error(err) => Some(err),
            Self::ValidationError(err) => Some(err),
        }
    }
}

impl<E> From<Box<ValidationError>> for Validated<E> {
    #[inline]
    fn from(err: Box<ValidationError>) -> Self {
        Self::ValidationError(err)
    }
}

/// The category of a [`ValidationError`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationErrorKind {
    /// An operand has the wrong type or an unknown value.
    #[default]
    MalformedOperand,

    /// An operand value or an opcode needs a capability that the module did not declare.
    MissingCapability,

    /// Individually valid values are used in a combination that is not allowed.
    InvalidCombination,
}

/// The single diagnostic that rejects a module.
#[derive(Clone, Default)]
pub struct ValidationError {
    /// The category of the error.
    pub kind: ValidationErrorKind,

    /// The opcode of the rejected instruction, or `None` if the error concerns the module as a
    /// whole.
    pub opcode: Option<Op>,

    /// The operand or declaration that the error is about, for example `Memory Semantics`.
    pub context: Cow<'static, str>,

    /// A description of what the problem is.
    pub problem: Cow<'static, str>,

    /// If applicable, the capabilities of which at least one would have allowed the rejected
    /// value.
    pub requires_one_of: RequiresOneOf,

    /// The stable identity of the violated rule.
    ///
    /// This is a VUID such as `VUID-StandaloneSpirv-MemorySemantics-10001` where the Vulkan
    /// specification assigns one, and a token of the form `SPIRV-<Area>-<Rule>` otherwise. It
    /// does not change when the wording of `problem` does.
    pub rule: &'static str,
}

impl std::fmt::Debug for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        if let Some(opcode) = self.opcode {
            write!(f, "{}: ", opcode)?;
        }

        if self.context.is_empty() {
            write!(f, "{}", self.problem)?;
        } else {
            write!(f, "{} {}", self.context, self.problem)?;
        }

        if !self.requires_one_of.is_empty() {
            write!(f, "\n\nRequires one of:\n    {}", self.requires_one_of)?;
        }

        if !self.rule.is_empty() {
            write!(f, "\n\nRule: {}", self.rule)?;
        }

        Ok(())
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        if let Some(opcode) = self.opcode {
            write!(f, "{}: ", opcode)?;
        }

        if self.context.is_empty() {
            write!(f, "{}", self.problem)?;
        } else {
            write!(f, "{} {}", self.context, self.problem)?;
        }

        if !self.requires_one_of.is_empty() {
            write!(f, " -- {}", self.requires_one_of)?;
        }

        if !self.rule.is_empty() {
            write!(f, " ({})", self.rule)?;
        }

        Ok(())
    }
}

impl Error for ValidationError {}

/// Capabilities of which at least one must be declared for something to be allowed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RequiresOneOf(pub &'static [Capability]);

impl RequiresOneOf {
    /// Returns whether there are no requirements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of alternatives.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Display for RequiresOneOf {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        if let Some((first, rest)) = self.0.split_first() {
            if rest.is_empty() {
                write!(f, "requires capability `{:?}`", first)?;
            } else {
                write!(f, "requires one of: capability `{:?}`", first)?;

                for capability in rest {
                    write!(f, " or capability `{:?}`", capability)?;
                }
            }
        }

        Ok(())
    }
}

