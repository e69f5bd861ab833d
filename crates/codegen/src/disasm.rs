//! Linear disassembly of emitted bytecode.

use revm::interpreter::OpCode;
use std::fmt;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub offset: usize,
    pub byte: u8,
    /// `None` for bytes outside the instruction set.
    pub opcode: Option<OpCode>,
    /// May be shorter than the opcode requires if the code is truncated.
    pub immediate: Vec<u8>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}: ", self.offset)?;
        match self.opcode {
            Some(op) => f.write_str(op.as_str())?,
            None => write!(f, "INVALID(0x{:02x})", self.byte)?,
        }
        if !self.immediate.is_empty() {
            f.write_str(" 0x")?;
            for byte in &self.immediate {
                write!(f, "{byte:02x}")?;
            }
        }
        Ok(())
    }
}

pub fn disassemble(code: &[u8]) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    let mut offset = 0;
    while let Some(&byte) = code.get(offset) {
        let opcode = OpCode::new(byte);
        let size = opcode.map_or(0, |op| usize::from(op.info().immediate_size()));
        let end = (offset + 1 + size).min(code.len());
        instructions.push(Instruction { offset, byte, opcode, immediate: code[offset + 1..end].to_vec() });
        offset += 1 + size;
    }
    instructions
}

/// One instruction per line.
pub fn format_listing(code: &[u8]) -> String {
    let mut out = String::new();
    for instruction in disassemble(code) {
        out.push_str(&instruction.to_string());
        out.push('\n');
    }
    out
}
