//! Tests for the dispatcher and overall segment layout

use crate::{
    Translator,
    selector::selector_of,
    tests::helpers::{
        SIMPLE_STORAGE, TOKEN, assert_jump_targets_valid, compile, contains_sequence,
        count_opcode, model_for,
    },
};
use alloy_primitives::hex;
use revm::interpreter::opcode::{CODECOPY, DUP1, JUMPI};

#[test]
fn simple_storage_exact_bytes() {
    let assembled = compile(SIMPLE_STORAGE);

    let runtime = concat!(
        // calldatasize < 4 -> revert pad at 0x24
        "6004361061002457",
        // selector
        "60003560e01c",
        // set(uint256) -> 0x2a
        "806360fe47b11461002a57",
        // get() -> 0x36
        "80636d4ce63c1461003657",
        // revert pad
        "5b60006000fd",
        // set: SSTORE(0, calldata[4]), return empty
        "5b60043560005560006000f3",
        // get: return SLOAD(0)
        "5b60005460005260206000f3",
    );
    assert_eq!(hex::encode(&assembled.runtime), runtime);

    let init = concat!(
        // value = 0
        "6000600055",
        // CODECOPY(0, 0x12, 0x42)
        "60426100126000",
        "39",
        // RETURN(0, 0x42)
        "60426000f3",
    );
    assert_eq!(hex::encode(&assembled.init), init);
    assert_eq!(assembled.bytecode().len(), 0x12 + 0x42);
}

#[test]
fn dispatch_entries_follow_declaration_order() {
    let assembled = compile(TOKEN);
    let runtime = hex::encode(&assembled.runtime);

    let signatures =
        ["mint(address,uint256)", "transfer(address,uint256)", "balanceOf(address)", "totalSupply()"];
    let selectors: Vec<usize> = signatures
        .iter()
        .map(|signature| {
            let needle = format!("63{}", hex::encode(selector_of(signature)));
            runtime.find(&needle).expect("selector should be dispatched")
        })
        .collect();
    assert!(selectors.windows(2).all(|pair| pair[0] < pair[1]), "{selectors:?}");
}

#[test]
fn only_external_functions_are_dispatched() {
    let source = r#"
class C(PySmartContract):
    @public
    def a(self):
        pass

    def hidden(self):
        pass

    def _private(self):
        pass

    @view
    def b(self) -> int:
        return 1
"#;
    let assembled = compile(source);
    // One DUP1 per dispatch entry
    assert_eq!(count_opcode(&assembled.runtime, DUP1), 2);
    // Guard, two entries
    assert_eq!(count_opcode(&assembled.runtime, JUMPI), 3);
    assert_jump_targets_valid(&assembled.runtime);
}

#[test]
fn empty_contract_still_compiles() {
    let assembled = compile("x = 1\n");
    let runtime = hex::encode(&assembled.runtime);
    assert_eq!(runtime, "6004361061000e5760003560e01c5b60006000fd");
    assert!(contains_sequence(&assembled.init, &[CODECOPY]));
}

#[test]
fn translation_is_deterministic() {
    let model = model_for(TOKEN);
    let first = Translator::new(&model).translate().unwrap();
    let second = Translator::new(&model).translate().unwrap();
    assert_eq!(first, second);
    assert_eq!(compile(TOKEN), first);
}
