//! Append-only byte buffer with fixed-width jump fields patched in place.

use crate::{
    error::{CodegenError, Result},
    gas,
    marks::Label,
};
use alloy_primitives::U256;
use revm::interpreter::OpCode;
use std::collections::HashMap;

/// Width of every jump address field.
pub const JUMP_FIELD_WIDTH: usize = 2;

/// A jump field whose target was unknown when it was emitted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Placeholder {
    /// Offset of the first immediate byte
    pub offset: usize,
    pub width: usize,
    pub label: Label,
}

/// One bytecode segment under construction.
///
/// Jump fields are emitted as `PUSH2 0x0000` and recorded as [`Placeholder`]s.
/// Binding a label patches every pending field that references it; fields
/// emitted after the label is bound are written directly.
#[derive(Debug, Default)]
pub struct CodeBuffer {
    bytes: Vec<u8>,
    pending: Vec<Placeholder>,
    bound: HashMap<Label, usize>,
    gas: u64,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { bytes: Vec::with_capacity(capacity), ..Self::default() }
    }

    /// Current length, which is also the offset of the next byte.
    pub fn offset(&self) -> usize {
        self.bytes.len()
    }

    /// Running sum of the static cost of every emitted opcode.
    pub fn gas(&self) -> u64 {
        self.gas
    }

    pub fn op(&mut self, op: OpCode) {
        self.gas += gas::static_cost(op);
        self.bytes.push(op.get());
    }

    pub fn ops(&mut self, ops: &[OpCode]) {
        for &op in ops {
            self.op(op);
        }
    }

    /// Push a constant using the smallest PUSH opcode. Zero is `PUSH1 0x00`.
    pub fn push_value(&mut self, value: U256) {
        if value.is_zero() {
            self.op(OpCode::PUSH1);
            self.bytes.push(0);
            return;
        }
        let trimmed = value.to_be_bytes_trimmed_vec();
        // At most 32 bytes, so always representable.
        let op = push_opcode(trimmed.len()).unwrap_or(OpCode::PUSH32);
        self.op(op);
        self.bytes.extend_from_slice(&trimmed);
    }

    pub fn push_u64(&mut self, value: u64) {
        self.push_value(U256::from(value));
    }

    /// Push `bytes` verbatim, leading zeros included.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let op = push_opcode(bytes.len())
            .filter(|_| !bytes.is_empty())
            .ok_or(CodegenError::PushTooWide { width: bytes.len() })?;
        self.op(op);
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    /// Emit `PUSH2 <label>`, patched once the label is bound.
    pub fn push_label(&mut self, label: Label) -> Result<()> {
        self.op(OpCode::PUSH2);
        let offset = self.offset();
        self.bytes.extend_from_slice(&[0; JUMP_FIELD_WIDTH]);
        let placeholder = Placeholder { offset, width: JUMP_FIELD_WIDTH, label };
        match self.bound.get(&label) {
            Some(&target) => self.patch(placeholder, target),
            None => {
                self.pending.push(placeholder);
                Ok(())
            }
        }
    }

    /// Bind `label` to `target` and patch every pending field referencing it.
    pub fn set_label(&mut self, label: Label, target: usize) -> Result<()> {
        check_target(target)?;
        self.bound.insert(label, target);
        let (matching, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|placeholder| placeholder.label == label);
        self.pending = rest;
        for placeholder in matching {
            self.patch(placeholder, target)?;
        }
        Ok(())
    }

    /// Bind `label` to the current offset and emit `JUMPDEST` there.
    pub fn jumpdest(&mut self, label: Label) -> Result<()> {
        self.set_label(label, self.offset())?;
        self.op(OpCode::JUMPDEST);
        Ok(())
    }

    pub fn pending(&self) -> &[Placeholder] {
        &self.pending
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Freeze the segment. Any pending placeholder is an internal error.
    pub fn finish(self) -> Result<Vec<u8>> {
        if let Some(placeholder) = self.pending.first() {
            return Err(CodegenError::UnresolvedPlaceholder {
                label: placeholder.label,
                offset: placeholder.offset,
            });
        }
        Ok(self.bytes)
    }

    fn patch(&mut self, placeholder: Placeholder, target: usize) -> Result<()> {
        check_target(target)?;
        let Placeholder { offset, width, .. } = placeholder;
        let encoded = target.to_be_bytes();
        self.bytes[offset..offset + width].copy_from_slice(&encoded[encoded.len() - width..]);
        Ok(())
    }
}

/// `PUSH<width>` for widths up to 32 bytes.
pub fn push_opcode(width: usize) -> Option<OpCode> {
    let width = u8::try_from(width).ok().filter(|&width| width <= 32)?;
    OpCode::new(OpCode::PUSH0.get() + width)
}

fn check_target(target: usize) -> Result<()> {
    if target >> (8 * JUMP_FIELD_WIDTH) != 0 {
        return Err(CodegenError::JumpTargetOutOfRange { target, width: JUMP_FIELD_WIDTH });
    }
    Ok(())
}
