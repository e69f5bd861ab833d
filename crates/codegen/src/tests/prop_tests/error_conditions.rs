//! Property tests for calls the dispatcher must reject

use crate::{
    selector::selector_of,
    tests::helpers::{DeployedContract, TOKEN, short_calldata_strategy, word_strategy},
};
use alloy_primitives::U256;
use proptest::prelude::*;

fn dispatched_selectors(contract: &DeployedContract) -> Vec<[u8; 4]> {
    contract.model.external_functions().map(|func| selector_of(&func.signature())).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_short_calldata_reverts(data in short_calldata_strategy()) {
        let mut contract = DeployedContract::deploy(TOKEN);
        let outcome = contract.call_raw(data);
        prop_assert!(outcome.is_revert(), "{:?}", outcome);
        prop_assert!(outcome.output().is_empty());
    }

    #[test]
    fn test_unknown_selector_reverts(
        selector in any::<[u8; 4]>(),
        tail in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut contract = DeployedContract::deploy(TOKEN);
        prop_assume!(!dispatched_selectors(&contract).contains(&selector));

        let mut data = selector.to_vec();
        data.extend(tail);
        let outcome = contract.call_raw(data);
        prop_assert!(outcome.is_revert(), "{:?}", outcome);
        prop_assert!(outcome.output().is_empty());
    }

    #[test]
    fn test_zero_mint_always_reverts(who in word_strategy()) {
        let mut contract = DeployedContract::deploy(TOKEN);
        prop_assert!(contract.call("mint", &[who, U256::ZERO]).is_revert());
    }
}
