//! Contract model produced by the analyzer and consumed by code generation.
//!
//! A [`ContractModel`] is built once per compilation and is read-only
//! afterwards. Every map preserves insertion order, which is also the textual
//! order of the source, so iterating the model is deterministic.

pub mod builtins;
mod display;

use alloy_primitives::U256;
use indexmap::IndexMap;
use pyevm_parser::ast::{Span, Stmt, StmtKind};
use std::fmt;

/// Storage slot index.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct Slot(u32);

impl Slot {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub fn to_u256(self) -> U256 {
        U256::from(self.0)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SemanticType {
    Uint256,
    Address,
    Bytes32,
    Mapping,
}

impl SemanticType {
    pub fn as_str(self) -> &'static str {
        match self {
            SemanticType::Uint256 => "uint256",
            SemanticType::Address => "address",
            SemanticType::Bytes32 => "bytes32",
            SemanticType::Mapping => "mapping",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computed once from decorator markers. A function marked both public and
/// view is `View`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Visibility {
    Public,
    View,
    Internal,
}

impl Visibility {
    pub fn from_markers(public: bool, view: bool) -> Self {
        match (public, view) {
            (_, true) => Visibility::View,
            (true, false) => Visibility::Public,
            (false, false) => Visibility::Internal,
        }
    }

    /// Whether the function gets a dispatcher entry and an ABI descriptor.
    pub fn is_external(self) -> bool {
        matches!(self, Visibility::Public | Visibility::View)
    }

    pub fn state_mutability(self) -> &'static str {
        match self {
            Visibility::View => "view",
            Visibility::Public | Visibility::Internal => "nonpayable",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::View => "view",
            Visibility::Internal => "internal",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InitialValue {
    Word(U256),
    EmptyMapping,
}

impl InitialValue {
    /// Word written to the slot during deployment.
    pub fn word(self) -> U256 {
        match self {
            InitialValue::Word(value) => value,
            InitialValue::EmptyMapping => U256::ZERO,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MappingInfo {
    pub key: SemanticType,
    pub value: SemanticType,
    pub base_slot: Slot,
}

impl MappingInfo {
    /// Key and value types are fixed regardless of the source declaration.
    pub fn with_base(base_slot: Slot) -> Self {
        Self { key: SemanticType::Address, value: SemanticType::Uint256, base_slot }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Parameter {
    pub name: String,
    pub ty: SemanticType,
}

#[derive(Clone, PartialEq, Debug)]
pub struct FunctionInfo {
    pub name: String,
    pub visibility: Visibility,
    pub params: Vec<Parameter>,
    pub body: Vec<Stmt>,
    /// Some top-level `return` carries a value.
    pub has_return: bool,
    pub return_type: SemanticType,
    pub span: Span,
}

impl FunctionInfo {
    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> String {
        let types: Vec<_> = self.params.iter().map(|p| p.ty.as_str()).collect();
        format!("{}({})", self.name, types.join(","))
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    /// Any top-level `return`, with or without a value.
    pub fn has_top_level_return(&self) -> bool {
        self.body.iter().any(|stmt| matches!(stmt.kind, StmtKind::Return(_)))
    }

    /// Gets an output in the interface descriptor.
    pub fn has_output(&self) -> bool {
        self.has_return || self.visibility == Visibility::View
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EventInfo {
    pub name: String,
    pub params: Vec<SemanticType>,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct ContractModel {
    pub name: String,
    pub storage_slots: IndexMap<String, Slot>,
    pub variable_types: IndexMap<String, SemanticType>,
    pub initial_values: IndexMap<String, InitialValue>,
    pub mappings: IndexMap<String, MappingInfo>,
    pub functions: IndexMap<String, FunctionInfo>,
    pub events: IndexMap<String, EventInfo>,
}

impl ContractModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Allocates the next slot for `name`, or returns `None` if the name
    /// already owns one. Type and initial value are recorded only on first
    /// allocation.
    pub fn declare_state_variable(
        &mut self,
        name: &str,
        ty: SemanticType,
        initial: InitialValue,
    ) -> Option<Slot> {
        if self.storage_slots.contains_key(name) {
            return None;
        }
        let index = u32::try_from(self.storage_slots.len()).ok()?;
        let slot = Slot::new(index);
        self.storage_slots.insert(name.to_owned(), slot);
        self.variable_types.insert(name.to_owned(), ty);
        self.initial_values.insert(name.to_owned(), initial);
        if ty == SemanticType::Mapping {
            self.mappings.insert(name.to_owned(), MappingInfo::with_base(slot));
        }
        Some(slot)
    }

    pub fn slot(&self, name: &str) -> Option<Slot> {
        self.storage_slots.get(name).copied()
    }

    pub fn variable_type(&self, name: &str) -> Option<SemanticType> {
        self.variable_types.get(name).copied()
    }

    pub fn mapping(&self, name: &str) -> Option<&MappingInfo> {
        self.mappings.get(name)
    }

    pub fn initial_value(&self, name: &str) -> InitialValue {
        self.initial_values.get(name).copied().unwrap_or(InitialValue::Word(U256::ZERO))
    }

    /// Public and view functions in declaration order.
    pub fn external_functions(&self) -> impl Iterator<Item = &FunctionInfo> {
        self.functions.values().filter(|func| func.visibility.is_external())
    }
}
