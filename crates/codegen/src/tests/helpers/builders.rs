use crate::{Assembled, Config, MappingLayout, assemble, disasm::disassemble, selector::selector_of};
use alloy_primitives::U256;
use pyevm_analyses::analyze;
use pyevm_data::ContractModel;
use revm::{interpreter::OpCode, primitives::Address};
use std::collections::HashSet;
use test_utils::{CallOutcome, TestChain, calldata};

/// Parse and analyze `source`, panicking with the rendered error on a
/// syntax error.
pub fn model_for(source: &str) -> ContractModel {
    let module =
        pyevm_parser::parse(source).unwrap_or_else(|err| panic!("{}", err.render(source)));
    analyze(&module).model
}

pub fn compile(source: &str) -> Assembled {
    compile_with(source, Config::default())
}

pub fn compile_with(source: &str, config: Config) -> Assembled {
    assemble(&model_for(source), config).expect("Assembly should succeed")
}

pub fn keccak_config() -> Config {
    Config { mapping_layout: MappingLayout::Keccak }
}

/// A compiled contract deployed on its own test chain
pub struct DeployedContract {
    pub chain: TestChain,
    pub address: Address,
    pub model: ContractModel,
    pub assembled: Assembled,
    /// Code the init segment returned
    pub deployed_runtime: Vec<u8>,
}

impl DeployedContract {
    pub fn deploy(source: &str) -> Self {
        Self::deploy_with(source, Config::default())
    }

    pub fn deploy_with(source: &str, config: Config) -> Self {
        let model = model_for(source);
        let assembled = assemble(&model, config).expect("Assembly should succeed");
        let mut chain = TestChain::new();
        let deployment = chain.deploy(&assembled.bytecode()).expect("Deployment should succeed");
        Self {
            chain,
            address: deployment.address,
            model,
            assembled,
            deployed_runtime: deployment.runtime,
        }
    }

    pub fn calldata_for(&self, name: &str, args: &[U256]) -> Vec<u8> {
        let func = self
            .model
            .functions
            .get(name)
            .unwrap_or_else(|| panic!("Contract has no function `{name}`"));
        calldata(selector_of(&func.signature()), args)
    }

    pub fn call(&mut self, name: &str, args: &[U256]) -> CallOutcome {
        let data = self.calldata_for(name, args);
        self.call_raw(data)
    }

    pub fn call_with_value(&mut self, name: &str, args: &[U256], value: U256) -> CallOutcome {
        let data = self.calldata_for(name, args);
        self.chain.call_with_value(self.address, data, value).expect("Transaction should execute")
    }

    pub fn call_raw(&mut self, data: Vec<u8>) -> CallOutcome {
        self.chain.call(self.address, data).expect("Transaction should execute")
    }

    /// Call and return the first word of the output
    pub fn call_word(&mut self, name: &str, args: &[U256]) -> U256 {
        let outcome = self.call(name, args);
        outcome.word().unwrap_or_else(|| panic!("`{name}` returned no word: {outcome:?}"))
    }
}

/// Contract with one view function `f(a, b)` returning `expression`
pub fn binary_expression_contract(expression: &str) -> String {
    format!(
        r#"
class Expr(PySmartContract):
    @view
    def f(self, a: int, b: int) -> int:
        return {expression}
"#
    )
}

/// Evaluate `expression` over `a` and `b` on the EVM
pub fn eval_binary(expression: &str, a: U256, b: U256) -> U256 {
    let mut contract = DeployedContract::deploy(&binary_expression_contract(expression));
    contract.call_word("f", &[a, b])
}

/// Evaluate `expression` over `a` on the EVM
pub fn eval_unary(expression: &str, a: U256) -> U256 {
    eval_binary(expression, a, U256::ZERO)
}

/// Opcode bytes of every instruction, immediates skipped
pub fn opcodes(code: &[u8]) -> Vec<u8> {
    disassemble(code).into_iter().filter_map(|instruction| Some(instruction.opcode?.get())).collect()
}

pub fn count_opcode(code: &[u8], op: u8) -> usize {
    opcodes(code).into_iter().filter(|&candidate| candidate == op).count()
}

pub fn assert_opcode_counts(code: &[u8], expected: &[(u8, usize)]) {
    for &(op, count) in expected {
        assert_eq!(count_opcode(code, op), count, "Unexpected number of {}", OpCode::name_by_op(op));
    }
}

pub fn contains_sequence(code: &[u8], sequence: &[u8]) -> bool {
    opcodes(code).windows(sequence.len()).any(|window| window == sequence)
}

pub fn assert_opcode_sequence(code: &[u8], sequence: &[u8]) {
    let names: Vec<_> = sequence.iter().map(|&op| OpCode::name_by_op(op)).collect();
    assert!(
        contains_sequence(code, sequence),
        "Sequence {names:?} not found in:\n{}",
        crate::disasm::format_listing(code)
    );
}

/// Every `PUSH2 <target>` that feeds a `JUMP`/`JUMPI` lands on a `JUMPDEST`
/// of the same segment.
pub fn assert_jump_targets_valid(code: &[u8]) {
    let instructions = disassemble(code);
    let jumpdests: HashSet<usize> = instructions
        .iter()
        .filter(|instruction| instruction.opcode == Some(OpCode::JUMPDEST))
        .map(|instruction| instruction.offset)
        .collect();

    for pair in instructions.windows(2) {
        let [push, jump] = pair else { unreachable!() };
        if push.opcode == Some(OpCode::PUSH2)
            && matches!(jump.opcode, Some(OpCode::JUMP | OpCode::JUMPI))
        {
            let target = usize::from(u16::from_be_bytes([push.immediate[0], push.immediate[1]]));
            assert!(
                jumpdests.contains(&target),
                "Jump at {:#06x} targets {target:#06x}, which is not a JUMPDEST",
                jump.offset
            );
        }
    }
}
