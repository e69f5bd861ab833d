//! Initialization and deployment code generation

use super::Translator;
use crate::error::Result;
use alloy_primitives::U256;
use revm::interpreter::OpCode;

impl Translator<'_> {
    /// Generate init code
    ///
    /// Writes every initial value, then copies the runtime segment, which
    /// is appended directly after this one, into memory and returns it.
    pub(super) fn generate_init_code(&mut self, runtime_len: usize) -> Result<()> {
        let model = self.model;
        for (name, slot) in &model.storage_slots {
            self.init.push_value(model.initial_value(name).word());
            self.init.push_value(slot.to_u256());
            self.init.op(OpCode::SSTORE);
        }

        // The runtime starts where this segment ends, which is only known
        // once the copy sequence itself has been emitted.
        let runtime_start = self.labels.allocate();
        let runtime_len = U256::from(runtime_len);

        self.init.push_value(runtime_len);
        self.init.push_label(runtime_start)?;
        self.init.push_u64(0);
        self.init.op(OpCode::CODECOPY);

        self.init.push_value(runtime_len);
        self.init.push_u64(0);
        self.init.op(OpCode::RETURN);

        self.init.set_label(runtime_start, self.init.offset())
    }
}
