//! Runtime segment: selector dispatcher followed by function bodies

use super::{Translator, constants};
use crate::{
    error::Result,
    selector::{selector_hex, selector_of},
};
use pyevm_data::{FunctionInfo, Visibility};
use revm::interpreter::OpCode;

impl Translator<'_> {
    /// Generate runtime code
    ///
    /// Calldata shorter than a selector and unknown selectors both land on
    /// a shared revert pad. The selector stays on the stack for the whole
    /// call.
    pub(super) fn generate_runtime_code(&mut self) -> Result<()> {
        let model = self.model;
        let revert_label = self.labels.allocate();

        // if calldatasize < 4: revert
        self.runtime.push_u64(constants::SELECTOR_SIZE);
        self.runtime.op(OpCode::CALLDATASIZE);
        self.runtime.op(OpCode::LT);
        self.emit_jumpi(revert_label)?;

        self.runtime.push_u64(0);
        self.runtime.op(OpCode::CALLDATALOAD);
        self.runtime.push_u64(constants::SELECTOR_SHIFT);
        self.runtime.op(OpCode::SHR);

        for func in model.external_functions() {
            let signature = func.signature();
            let selector = selector_of(&signature);
            tracing::debug!(
                target: "codegen",
                %signature,
                selector = %selector_hex(selector),
                "dispatch entry"
            );

            let label = self.labels.function_label(&func.name);
            self.runtime.op(OpCode::DUP1);
            self.runtime.push_bytes(&selector)?;
            self.runtime.op(OpCode::EQ);
            self.emit_jumpi(label)?;
        }

        self.runtime.jumpdest(revert_label)?;
        self.emit_revert();

        for func in model.external_functions() {
            self.translate_function(func)?;
        }
        Ok(())
    }

    fn translate_function(&mut self, func: &FunctionInfo) -> Result<()> {
        let label = self.labels.function_label(&func.name);
        self.runtime.jumpdest(label)?;
        self.lower_block(func, &func.body)?;

        if !func.has_top_level_return() {
            if func.visibility == Visibility::View {
                self.push_zero();
                self.emit_return_word();
            } else {
                self.emit_return_empty();
            }
        }
        Ok(())
    }
}
