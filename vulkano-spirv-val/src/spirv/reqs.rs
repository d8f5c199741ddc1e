// Copyright (c) 2024 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The capability table: which capabilities enable which operand values.

use super::{
    AddressingModel, Capability, Decoration, Dim, ExecutionMode, ExecutionModel, MemoryModel,
    MemorySemantics, Scope, StorageClass,
};
use foldhash::HashMap;
use smallvec::SmallVec;
use std::sync::LazyLock;

/// The kinds of enumerated operands that have capability requirements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Capability,
    AddressingModel,
    MemoryModel,
    ExecutionModel,
    ExecutionMode,
    StorageClass,
    Dim,
    Decoration,
    Scope,
    /// Looked up one bit at a time.
    MemorySemantics,
}

/// Returns the capabilities of which at least one must be declared to use `value` as an operand
/// of kind `kind`.
///
/// An empty slice means that the value is always allowed, and `None` that the value is not
/// known for `kind`. For `OperandKind::Capability`, the capabilities that declaring `value`
/// directly implies are returned instead.
pub fn required_capabilities(kind: OperandKind, value: u32) -> Option<&'static [Capability]> {
    if kind == OperandKind::MemorySemantics {
        return match value.count_ones() {
            0 => Some(&[]),
            1 => MemorySemantics::bit_required_capabilities(value),
            _ => None,
        };
    }

    lookup(kind, value).map(|(_, capabilities)| capabilities)
}

/// Returns the grammar name of `value` as an operand of kind `kind`, or `None` if the value is
/// not known. Memory-semantics values have no single name.
pub fn operand_name(kind: OperandKind, value: u32) -> Option<&'static str> {
    lookup(kind, value).map(|(name, _)| name)
}

fn lookup(kind: OperandKind, value: u32) -> Option<(&'static str, &'static [Capability])> {
    macro_rules! lookup {
        ($ty:ident) => {
            $ty::try_from(value)
                .ok()
                .map(|value| (value.name(), value.required_capabilities()))
        };
    }

    match kind {
        OperandKind::Capability => lookup!(Capability),
        OperandKind::AddressingModel => lookup!(AddressingModel),
        OperandKind::MemoryModel => lookup!(MemoryModel),
        OperandKind::ExecutionModel => lookup!(ExecutionModel),
        OperandKind::ExecutionMode => lookup!(ExecutionMode),
        OperandKind::StorageClass => lookup!(StorageClass),
        OperandKind::Dim => lookup!(Dim),
        OperandKind::Decoration => lookup!(Decoration),
        OperandKind::Scope => lookup!(Scope),
        OperandKind::MemorySemantics => None,
    }
}

static IMPLIED_CAPABILITIES: LazyLock<HashMap<Capability, SmallVec<[Capability; 4]>>> =
    LazyLock::new(|| {
        Capability::ALL
            .into_iter()
            .map(|capability| {
                let mut closure: SmallVec<[Capability; 4]> = SmallVec::new();
                let mut stack = vec![capability];

                while let Some(next) = stack.pop() {
                    if !closure.contains(&next) {
                        closure.push(next);
                        stack.extend_from_slice(next.required_capabilities());
                    }
                }

                (capability, closure)
            })
            .collect()
    });

/// Returns `capability` together with every capability that declaring it implicitly declares,
/// transitively.
pub fn implied_capabilities(capability: Capability) -> &'static [Capability] {
    IMPLIED_CAPABILITIES
        .get(&capability)
        .map(|closure| closure.as_slice())
        .unwrap_or(&[])
}
