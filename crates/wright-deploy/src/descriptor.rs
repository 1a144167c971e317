//! Deployable unit descriptors.
//!
//! A [`UnitDescriptor`] is the static definition of one deployable unit: a
//! unique name and an ordered list of constructor arguments. Arguments are
//! either literal scalar values or references to other units, resolved to
//! the referenced unit's deployed address at execution time.
//!
//! Descriptors are immutable once constructed; the orchestration pipeline
//! only ever reads them.

use serde::{Deserialize, Serialize};
use std::fmt;

use wright_core::Address;

/// A resolved scalar constructor argument.
///
/// The value domain is deliberately closed: every variant has a total,
/// deterministic calldata encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ArgValue {
    /// An on-chain address.
    Address(Address),
    /// An unsigned integer.
    Uint(u64),
    /// A boolean flag.
    Bool(bool),
    /// A UTF-8 string.
    String(String),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(addr) => write!(f, "{addr}"),
            Self::Uint(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value:?}"),
        }
    }
}

/// A constructor argument specification: a literal value, or a reference to
/// another unit's future address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgSpec {
    /// A reference to another unit in the same descriptor set, resolved to
    /// that unit's deployed address.
    Reference {
        /// Name of the referenced unit.
        #[serde(rename = "ref")]
        unit: String,
    },
    /// A literal value passed through unchanged.
    Literal {
        /// The literal value.
        value: ArgValue,
    },
}

impl ArgSpec {
    /// Creates a reference argument.
    #[must_use]
    pub fn reference(unit: impl Into<String>) -> Self {
        Self::Reference { unit: unit.into() }
    }

    /// Creates a literal argument.
    #[must_use]
    pub const fn literal(value: ArgValue) -> Self {
        Self::Literal { value }
    }

    /// Returns the referenced unit name, if this is a reference.
    #[must_use]
    pub fn reference_target(&self) -> Option<&str> {
        match self {
            Self::Reference { unit } => Some(unit),
            Self::Literal { .. } => None,
        }
    }
}

/// Static definition of a deployable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDescriptor {
    /// Unit name, unique within a descriptor set.
    pub name: String,
    /// Ordered constructor arguments.
    #[serde(default)]
    pub args: Vec<ArgSpec>,
}

impl UnitDescriptor {
    /// Creates a descriptor with no constructor arguments.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Appends a constructor argument.
    #[must_use]
    pub fn with_arg(mut self, arg: ArgSpec) -> Self {
        self.args.push(arg);
        self
    }

    /// Returns the unit names this descriptor depends on, deduplicated,
    /// in first-mention order.
    #[must_use]
    pub fn dependencies(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for target in self.args.iter().filter_map(ArgSpec::reference_target) {
            if !seen.contains(&target) {
                seen.push(target);
            }
        }
        seen
    }
}
