//! Property tests for branching and whole-contract translation

use crate::{
    Translator,
    gas::GasReport,
    tests::helpers::{
        BRANCHES, DeployedContract, assert_jump_targets_valid, compile, compile_with,
        keccak_config, model_for, word_strategy,
    },
};
use alloy_primitives::U256;
use proptest::prelude::*;

/// One function per threshold, each an if/else ladder over its argument
fn ladder_contract(thresholds: &[u64]) -> String {
    let mut source = String::from("class Ladder(PySmartContract):\n    def __init__(self):\n        self.hits = 0\n");
    for (i, threshold) in thresholds.iter().enumerate() {
        source.push_str(&format!(
            "\n    @public\n    def step{i}(self, x: int) -> int:\n        if x > {threshold}:\n            self.hits += 1\n            return x - {threshold}\n        else:\n            self.require(x != {threshold})\n        return 0\n"
        ));
    }
    source
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_classify_matches_reference(x in word_strategy()) {
        let mut contract = DeployedContract::deploy(BRANCHES);
        let expected = if x < U256::from(10) {
            1
        } else if x < U256::from(100) {
            2
        } else {
            3
        };
        prop_assert_eq!(contract.call_word("classify", &[x]), U256::from(expected));
    }

    #[test]
    fn test_fallthrough_default(x in any::<u64>()) {
        let mut contract = DeployedContract::deploy(BRANCHES);
        let expected = if x > 5 { x } else { 0 };
        prop_assert_eq!(contract.call_word("above_five", &[U256::from(x)]), U256::from(expected));
    }

    #[test]
    fn test_ladder_semantics(thresholds in prop::collection::vec(0u64..1000, 1..6), x in 0u64..1200) {
        let mut contract = DeployedContract::deploy(&ladder_contract(&thresholds));
        for (i, &threshold) in thresholds.iter().enumerate() {
            let outcome = contract.call(&format!("step{i}"), &[U256::from(x)]);
            if x > threshold {
                prop_assert_eq!(outcome.word(), Some(U256::from(x - threshold)));
            } else if x == threshold {
                prop_assert!(outcome.is_revert());
            } else {
                prop_assert_eq!(outcome.word(), Some(U256::ZERO));
            }
        }
    }

    #[test]
    fn test_translation_invariants(thresholds in prop::collection::vec(0u64..1000, 0..12)) {
        let source = ladder_contract(&thresholds);
        let model = model_for(&source);

        let first = Translator::new(&model).translate().unwrap();
        let second = Translator::new(&model).translate().unwrap();
        prop_assert_eq!(&first, &second);

        assert_jump_targets_valid(&first.runtime);
        assert_jump_targets_valid(&compile_with(&source, keccak_config()).runtime);

        let report = GasReport::from_bytecode(&first.bytecode());
        prop_assert_eq!(first.gas_estimate, report.total_gas);
    }
}

#[test]
fn test_gas_estimate_covers_both_segments() {
    let assembled = compile(BRANCHES);
    let init = GasReport::from_bytecode(&assembled.init).total_gas;
    let runtime = GasReport::from_bytecode(&assembled.runtime).total_gas;
    assert_eq!(assembled.gas_estimate, init + runtime);
}
