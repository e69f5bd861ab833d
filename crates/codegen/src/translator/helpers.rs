//! Helper methods for runtime code generation

use super::{Translator, constants};
use crate::{error::Result, marks::Label};
use alloy_primitives::U256;
use revm::interpreter::OpCode;

impl Translator<'_> {
    pub(super) fn push_zero(&mut self) {
        self.runtime.push_value(U256::ZERO);
    }

    /// Load argument `index` from calldata, past the selector
    pub(super) fn load_argument(&mut self, index: usize) {
        let offset = constants::SELECTOR_SIZE + index as u64 * constants::EVM_WORD_SIZE;
        self.runtime.push_u64(offset);
        self.runtime.op(OpCode::CALLDATALOAD);
    }

    /// Emit an unconditional jump
    pub(super) fn emit_jump(&mut self, label: Label) -> Result<()> {
        self.runtime.push_label(label)?;
        self.runtime.op(OpCode::JUMP);
        Ok(())
    }

    /// Emit a conditional jump (non-zero = jump)
    pub(super) fn emit_jumpi(&mut self, label: Label) -> Result<()> {
        // Stack: [condition]
        self.runtime.push_label(label)?;
        // Stack: [condition, destination]
        self.runtime.op(OpCode::JUMPI);
        Ok(())
    }

    /// Revert with empty return data
    pub(super) fn emit_revert(&mut self) {
        self.runtime.push_u64(0);
        self.runtime.push_u64(0);
        self.runtime.op(OpCode::REVERT);
    }

    /// Return the word on top of the stack
    pub(super) fn emit_return_word(&mut self) {
        self.runtime.push_u64(constants::RETURN_OFFSET);
        self.runtime.op(OpCode::MSTORE);
        self.runtime.push_u64(constants::EVM_WORD_SIZE);
        self.runtime.push_u64(constants::RETURN_OFFSET);
        self.runtime.op(OpCode::RETURN);
    }

    /// Return empty data
    pub(super) fn emit_return_empty(&mut self) {
        self.runtime.push_u64(0);
        self.runtime.push_u64(0);
        self.runtime.op(OpCode::RETURN);
    }
}
