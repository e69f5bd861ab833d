//! Static gas estimation for emitted bytecode
//!
//! Costs are the fixed base cost of each opcode. Memory expansion, cold/warm
//! storage access and copy sizes are not modeled, so the total is an
//! indicative figure rather than a bound.

use crate::disasm::disassemble;
use revm::interpreter::{OpCode, opcode};
use std::collections::BTreeMap;

/// Base cost of `op`.
pub fn static_cost(op: OpCode) -> u64 {
    use opcode::*;
    match op.get() {
        STOP | INVALID | RETURN | REVERT => 0,

        ADD | SUB | NOT | LT | GT | SLT | SGT | EQ | ISZERO | AND | OR | XOR | BYTE | SHL | SHR
        | SAR | POP => 3,

        MUL | DIV | SDIV | MOD | SMOD | SIGNEXTEND => 5,
        ADDMOD | MULMOD | JUMP => 8,
        // Base cost; the exponent size adds 50 gas per byte at runtime
        EXP => 10,
        KECCAK256 => 30,

        ADDRESS | ORIGIN | CALLER | CALLVALUE | CALLDATASIZE | CODESIZE | GASPRICE
        | RETURNDATASIZE | COINBASE | TIMESTAMP | NUMBER | DIFFICULTY | GASLIMIT | CHAINID
        | BASEFEE | BLOBBASEFEE | PC | MSIZE | GAS | PUSH0 => 2,
        SELFBALANCE => 5,

        BALANCE | EXTCODESIZE | EXTCODECOPY | EXTCODEHASH => 2600,
        CALLDATALOAD | CALLDATACOPY | CODECOPY | RETURNDATACOPY | BLOBHASH => 3,
        BLOCKHASH => 20,

        // Cold slot; a fresh non-zero write for SSTORE
        SLOAD => 2100,
        SSTORE => 20000,
        TLOAD | TSTORE => 100,

        MLOAD | MSTORE | MSTORE8 | MCOPY => 3,

        JUMPI => 10,
        JUMPDEST => 1,

        LOG0 => 375,
        LOG1 => 750,
        LOG2 => 1125,
        LOG3 => 1500,
        LOG4 => 1875,

        CREATE | CREATE2 => 32000,
        CALL | CALLCODE | DELEGATECALL | STATICCALL => 2600,
        SELFDESTRUCT => 5000,

        // PUSH1..PUSH32, DUP1..DUP16 and SWAP1..SWAP16
        _ => 3,
    }
}

/// Per-opcode breakdown of the static cost of a bytecode image.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GasReport {
    pub total_gas: u64,
    /// Opcode name to (count, total gas)
    pub opcode_counts: BTreeMap<&'static str, (u32, u64)>,
}

impl GasReport {
    /// Walk `code` linearly; bytes outside the instruction set cost nothing.
    pub fn from_bytecode(code: &[u8]) -> Self {
        let mut report = Self::default();
        for op in disassemble(code).into_iter().filter_map(|instruction| instruction.opcode) {
            report.add_opcode(op);
        }
        report
    }

    fn add_opcode(&mut self, op: OpCode) {
        let gas = static_cost(op);
        let entry = self.opcode_counts.entry(op.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += gas;
        self.total_gas += gas;
    }

    /// Generate a human-readable report
    pub fn format_report(&self) -> String {
        let mut report = format!("Total Estimated Gas: {}\n\nOpcode Breakdown:\n", self.total_gas);

        let mut sorted_ops: Vec<_> = self.opcode_counts.iter().collect();
        sorted_ops.sort_by(|(a_name, (_, a_gas)), (b_name, (_, b_gas))| {
            b_gas.cmp(a_gas).then(a_name.cmp(b_name))
        });

        for (opcode, (count, gas)) in sorted_ops {
            report.push_str(&format!("  {opcode:20} {count:5} calls = {gas:7} gas\n"));
        }
        report
    }
}
