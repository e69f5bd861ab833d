//! Interface descriptor (ABI) generation.

use pyevm_data::{ContractModel, FunctionInfo, Visibility};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    View,
    Nonpayable,
}

impl From<Visibility> for StateMutability {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::View => StateMutability::View,
            Visibility::Public | Visibility::Internal => StateMutability::Nonpayable,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct EventParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub indexed: bool,
}

/// One ABI entry. Serializes in the standard JSON ABI shape.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AbiEntry {
    Constructor {
        inputs: Vec<Param>,
        #[serde(rename = "stateMutability")]
        state_mutability: StateMutability,
    },
    Function {
        name: String,
        inputs: Vec<Param>,
        outputs: Vec<Param>,
        #[serde(rename = "stateMutability")]
        state_mutability: StateMutability,
    },
    Event {
        name: String,
        inputs: Vec<EventParam>,
    },
}

impl AbiEntry {
    pub fn name(&self) -> Option<&str> {
        match self {
            AbiEntry::Constructor { .. } => None,
            AbiEntry::Function { name, .. } | AbiEntry::Event { name, .. } => Some(name),
        }
    }

    fn function(func: &FunctionInfo) -> Self {
        let inputs = func
            .params
            .iter()
            .map(|param| Param { name: param.name.clone(), ty: param.ty.to_string() })
            .collect();
        let outputs = if func.has_output() {
            vec![Param { name: String::new(), ty: func.return_type.to_string() }]
        } else {
            Vec::new()
        };
        AbiEntry::Function {
            name: func.name.clone(),
            inputs,
            outputs,
            state_mutability: func.visibility.into(),
        }
    }
}

/// Constructor first, then dispatchable functions and events in declaration
/// order.
pub fn build_abi(model: &ContractModel) -> Vec<AbiEntry> {
    let mut abi = vec![AbiEntry::Constructor {
        inputs: Vec::new(),
        state_mutability: StateMutability::Nonpayable,
    }];
    abi.extend(model.external_functions().map(AbiEntry::function));
    abi.extend(model.events.values().map(|event| AbiEntry::Event {
        name: event.name.clone(),
        inputs: event
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| EventParam { name: format!("param{i}"), ty: ty.to_string(), indexed: false })
            .collect(),
    }));
    abi
}
