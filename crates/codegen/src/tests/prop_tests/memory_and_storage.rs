//! Property tests for storage layout and mapping access

use crate::tests::helpers::{
    DeployedContract, SIMPLE_STORAGE, TOKEN, compile, count_opcode, keccak_config, model_for,
    word_strategy,
};
use alloy_primitives::U256;
use proptest::prelude::*;
use revm::interpreter::opcode::SSTORE;
use std::collections::HashSet;

fn counters_contract(initial: &[u64]) -> String {
    let mut source = String::from("class Counters(PySmartContract):\n    def __init__(self):\n");
    for (i, value) in initial.iter().enumerate() {
        source.push_str(&format!("        self.v{i} = {value}\n"));
    }
    for i in 0..initial.len() {
        source.push_str(&format!("\n    @view\n    def get{i}(self) -> int:\n        return self.v{i}\n"));
    }
    source
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_storage_round_trip(values in prop::collection::vec(word_strategy(), 1..5)) {
        let mut contract = DeployedContract::deploy(SIMPLE_STORAGE);
        for value in values {
            prop_assert!(contract.call("set", &[value]).is_success());
            prop_assert_eq!(contract.call_word("get", &[]), value);
        }
    }

    #[test]
    fn test_slots_are_unique_and_initialized(initial in prop::collection::vec(any::<u64>(), 1..10)) {
        let source = counters_contract(&initial);
        let model = model_for(&source);

        let slots: HashSet<u32> = model.storage_slots.values().map(|slot| slot.get()).collect();
        prop_assert_eq!(slots.len(), initial.len());
        prop_assert!(slots.iter().all(|&slot| (slot as usize) < initial.len()));

        let assembled = compile(&source);
        prop_assert_eq!(count_opcode(&assembled.init, SSTORE), initial.len());

        let mut contract = DeployedContract::deploy(&source);
        for (i, value) in initial.iter().enumerate() {
            prop_assert_eq!(contract.call_word(&format!("get{i}"), &[]), U256::from(*value));
        }
    }

    #[test]
    fn test_mapping_keys_are_isolated(
        keys in prop::collection::hash_set(any::<u64>(), 1..6),
        keccak in any::<bool>(),
    ) {
        let mut contract = if keccak {
            DeployedContract::deploy_with(TOKEN, keccak_config())
        } else {
            DeployedContract::deploy(TOKEN)
        };
        // Additive addressing aliases neighbouring keys, so spread them out
        let keys: Vec<U256> = keys.into_iter().map(|key| U256::from(key) << 64).collect();

        for (amount, key) in (1u64..).zip(&keys) {
            prop_assert!(contract.call("mint", &[*key, U256::from(amount)]).is_success());
        }
        for (amount, key) in (1u64..).zip(&keys) {
            prop_assert_eq!(contract.call_word("balanceOf", &[*key]), U256::from(amount));
        }
    }
}
