use crate::abi::AbiEntry;
use alloy_primitives::hex;
use indexmap::IndexMap;
use pyevm_codegen::{
    Assembled,
    selector::{selector_hex, selector_of},
};
use pyevm_data::ContractModel;
use serde::{Deserialize, Serialize};

pub const COMPILER_NAME: &str = "python-evm-transpiler";
pub const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything a deployer needs: code, interface and metadata.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Artifact {
    /// `0x`-prefixed init segment followed by the runtime segment
    pub bytecode: String,
    /// `0x`-prefixed runtime segment
    pub deployed_bytecode: String,
    pub abi: Vec<AbiEntry>,
    pub metadata: Metadata,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Metadata {
    pub compiler: String,
    pub version: String,
    /// Sum of the static opcode costs over both segments
    pub gas_estimate: u64,
    pub state_variables: IndexMap<String, u32>,
    /// Every analyzed function, dispatchable or not
    pub functions: Vec<String>,
    /// Canonical signature to `0x`-prefixed selector, dispatchable functions only
    pub selectors: IndexMap<String, String>,
}

impl Metadata {
    pub fn new(model: &ContractModel, gas_estimate: u64) -> Self {
        Self {
            compiler: COMPILER_NAME.to_owned(),
            version: COMPILER_VERSION.to_owned(),
            gas_estimate,
            state_variables: model
                .storage_slots
                .iter()
                .map(|(name, slot)| (name.clone(), slot.get()))
                .collect(),
            functions: model.functions.keys().cloned().collect(),
            selectors: model
                .external_functions()
                .map(|func| {
                    let signature = func.signature();
                    let selector = format!("0x{}", selector_hex(selector_of(&signature)));
                    (signature, selector)
                })
                .collect(),
        }
    }
}

impl Artifact {
    pub fn new(model: &ContractModel, assembled: &Assembled, abi: Vec<AbiEntry>) -> Self {
        Self {
            bytecode: hex::encode_prefixed(assembled.bytecode()),
            deployed_bytecode: hex::encode_prefixed(&assembled.runtime),
            abi,
            metadata: Metadata::new(model, assembled.gas_estimate),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
