//! EVM bytecode generator for analyzed contracts
//!
//! This crate lowers a [`ContractModel`] into two bytecode segments: an init
//! segment that writes initial storage and returns the runtime, and the
//! runtime segment itself (selector dispatcher followed by function bodies).
//! The implementation is specifically designed for the Ethereum Virtual
//! Machine and makes use of EVM-specific constraints:
//!
//! ## Memory Layout
//! - `0x00-0x1F`: return word, and the key word when hashing mapping slots
//! - `0x20-0x3F`: base slot word when hashing mapping slots
//!
//! No other memory is used; function arguments are read from calldata in
//! place and nothing is kept in locals.
//!
//! ## Jumps
//! Every jump target is a 2-byte `PUSH2` immediate emitted before the target
//! is known and patched when the target label is bound.
//!
//! [`ContractModel`]: pyevm_data::ContractModel

pub mod buffer;
pub mod disasm;
mod error;
pub mod gas;
pub mod marks;
pub mod selector;
mod translator;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// Public exports
pub use error::{CodegenError, Result};
pub use translator::{Assembled, Translator, assemble};

/// Storage addressing for `self.<mapping>[key]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingLayout {
    /// `base_slot + key`. Distinct entries may collide.
    #[default]
    Additive,
    /// `keccak256(key . base_slot)`, the layout Solidity uses.
    Keccak,
}

impl FromStr for MappingLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "additive" => Ok(MappingLayout::Additive),
            "keccak" => Ok(MappingLayout::Keccak),
            other => Err(format!("unknown mapping layout `{other}`, expected `additive` or `keccak`")),
        }
    }
}

impl fmt::Display for MappingLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MappingLayout::Additive => "additive",
            MappingLayout::Keccak => "keccak",
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mapping_layout: MappingLayout,
}
