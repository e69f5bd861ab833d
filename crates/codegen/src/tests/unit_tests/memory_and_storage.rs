//! Tests for storage layout, initialization and mapping addressing

use crate::{
    disasm::disassemble,
    tests::helpers::{
        TOKEN, assert_opcode_sequence, compile, compile_with, contains_sequence, count_opcode,
        keccak_config,
    },
};
use alloy_primitives::hex;
use revm::interpreter::{OpCode, opcode::*};

const MAPPING: &str = r#"
class Ledger(PySmartContract):
    def __init__(self):
        self.count = 0
        self.balances = {}

    @public
    def credit(self, who: str, amount: int):
        self.balances[who] = amount

    @public
    def debit(self, who: str, amount: int):
        self.balances[who] -= amount
        self.count += 1

    @view
    def balance(self, who: str) -> int:
        return self.balances[who]
"#;

#[test]
fn init_writes_every_slot_in_order() {
    let init = hex::encode(compile(TOKEN).init);
    let symbol = format!("7f{}{}", hex::encode("TOK"), "00".repeat(29));
    let expected = [
        // owner: caller placeholder
        "6000600055".to_string(),
        // total_supply
        "6103e8600155".to_string(),
        // balances
        "6000600255".to_string(),
        // symbol as bytes32
        format!("{symbol}600355"),
    ]
    .concat();
    assert!(init.starts_with(&expected), "{init}");
}

#[test]
fn runtime_offset_equals_init_length() {
    let assembled = compile(TOKEN);
    let instructions = disassemble(&assembled.init);
    let copy = instructions
        .iter()
        .position(|instruction| instruction.opcode == Some(OpCode::CODECOPY))
        .expect("init should copy the runtime");

    let offset = &instructions[copy - 2];
    assert_eq!(offset.opcode, Some(OpCode::PUSH2));
    let offset = usize::from(u16::from_be_bytes([offset.immediate[0], offset.immediate[1]]));
    assert_eq!(offset, assembled.init.len());

    assert_opcode_sequence(&assembled.init, &[PUSH2, PUSH1, CODECOPY]);
    assert_eq!(count_opcode(&assembled.init, SSTORE), 4);
}

#[test]
fn additive_mapping_addressing() {
    let runtime = compile(MAPPING).runtime;
    // balances[who] = amount
    assert_opcode_sequence(
        &runtime,
        &[PUSH1, CALLDATALOAD, PUSH1, CALLDATALOAD, PUSH1, ADD, SSTORE],
    );
    // balances[who] -= amount
    assert_opcode_sequence(
        &runtime,
        &[ADD, DUP1, SLOAD, PUSH1, CALLDATALOAD, SWAP1, SUB, SWAP1, SSTORE],
    );
    // count += 1
    assert_opcode_sequence(&runtime, &[PUSH1, SLOAD, PUSH1, ADD, PUSH1, SSTORE]);
    // return balances[who]
    assert_opcode_sequence(&runtime, &[PUSH1, CALLDATALOAD, PUSH1, ADD, SLOAD, PUSH1, MSTORE]);
    assert_eq!(count_opcode(&runtime, KECCAK256), 0);
}

#[test]
fn keccak_mapping_addressing() {
    let runtime = compile_with(MAPPING, keccak_config()).runtime;
    let hash = [CALLDATALOAD, PUSH1, MSTORE, PUSH1, PUSH1, MSTORE, PUSH1, PUSH1, KECCAK256];
    assert_opcode_sequence(&runtime, &hash);
    assert_eq!(count_opcode(&runtime, KECCAK256), 3);
    assert!(!contains_sequence(&runtime, &[PUSH1, ADD, SSTORE]));
}

#[test]
fn large_slot_values_use_wide_pushes() {
    let source = r#"
class C(PySmartContract):
    def __init__(self):
        self.big = 0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff
        self.owner = "0x00000000000000000000000000000000000000ff"
"#;
    let init = compile(source).init;
    assert_opcode_sequence(&init, &[PUSH32, PUSH1, SSTORE, PUSH1, PUSH1, SSTORE]);
    assert!(hex::encode(&init).contains("60ff600155"));
}
