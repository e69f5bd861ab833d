//! Expression lowering
//!
//! Every expression leaves exactly one word on the stack. Anything the
//! compiler does not understand pushes zero.

use super::{Translator, constants};
use crate::{MappingLayout, error::Result};
use alloy_primitives::U256;
use pyevm_data::{
    FunctionInfo, Slot,
    builtins::{EnvironmentRead, MAPPING_GET_METHOD, string_word},
};
use pyevm_parser::ast::{BinOp, BoolOp, CmpOp, Constant, Expr, ExprKind, UnaryOp};
use revm::interpreter::OpCode;

impl Translator<'_> {
    pub(super) fn lower_expr(&mut self, func: &FunctionInfo, expr: &Expr) -> Result<()> {
        match &expr.kind {
            ExprKind::Constant(constant) => self.push_constant(constant),
            ExprKind::Name(name) => match func.param_index(name) {
                Some(index) => self.load_argument(index),
                None => self.push_zero(),
            },
            ExprKind::Attribute { .. } => match self.state_slot(expr) {
                Some(slot) => {
                    self.runtime.push_value(slot.to_u256());
                    self.runtime.op(OpCode::SLOAD);
                }
                None => self.push_zero(),
            },
            ExprKind::Subscript { value, index } => self.load_mapping_entry(func, value, index)?,
            ExprKind::Call { .. } => self.lower_call(func, expr)?,
            ExprKind::BinOp { left, op, right } => match binary_opcodes(*op) {
                Some(ops) => {
                    self.lower_expr(func, left)?;
                    self.lower_expr(func, right)?;
                    self.runtime.ops(ops);
                }
                None => self.push_zero(),
            },
            ExprKind::UnaryOp { op, operand } => {
                self.lower_expr(func, operand)?;
                match op {
                    UnaryOp::Not => self.runtime.op(OpCode::ISZERO),
                    // 0 - x
                    UnaryOp::USub => {
                        self.runtime.push_u64(0);
                        self.runtime.op(OpCode::SUB);
                    }
                    UnaryOp::Invert => self.runtime.op(OpCode::NOT),
                    UnaryOp::UAdd => {}
                }
            }
            ExprKind::BoolOp { op, values } => self.lower_bool_op(func, *op, values)?,
            ExprKind::Compare { left, ops, comparators } => {
                let lowered = match (ops.as_slice(), comparators.as_slice()) {
                    ([op], [right]) => comparison_opcodes(*op).map(|ops| (right, ops)),
                    _ => None,
                };
                match lowered {
                    Some((right, ops)) => {
                        self.lower_expr(func, left)?;
                        self.lower_expr(func, right)?;
                        self.runtime.ops(ops);
                    }
                    None => self.push_zero(),
                }
            }
            _ => self.push_zero(),
        }
        Ok(())
    }

    fn push_constant(&mut self, constant: &Constant) {
        let value = match constant {
            Constant::Int(value) => *value,
            Constant::Bool(flag) => U256::from(u8::from(*flag)),
            Constant::Str(text) => string_word(text).1,
            _ => U256::ZERO,
        };
        self.runtime.push_value(value);
    }

    /// Slot of `self.<name>` if `name` is a state variable.
    pub(super) fn state_slot(&self, expr: &Expr) -> Option<Slot> {
        expr.self_attribute().and_then(|name| self.model.slot(name))
    }

    fn load_mapping_entry(&mut self, func: &FunctionInfo, container: &Expr, key: &Expr) -> Result<()> {
        match self.state_slot(container) {
            Some(base) => {
                self.emit_mapping_address(func, base, key)?;
                self.runtime.op(OpCode::SLOAD);
            }
            None => self.push_zero(),
        }
        Ok(())
    }

    /// Leaves the storage slot of `self.<mapping>[key]` on the stack
    pub(super) fn emit_mapping_address(&mut self, func: &FunctionInfo, base: Slot, key: &Expr) -> Result<()> {
        self.lower_expr(func, key)?;
        match self.config.mapping_layout {
            MappingLayout::Additive => {
                self.runtime.push_value(base.to_u256());
                self.runtime.op(OpCode::ADD);
            }
            MappingLayout::Keccak => {
                self.runtime.push_u64(constants::MAPPING_KEY_OFFSET);
                self.runtime.op(OpCode::MSTORE);
                self.runtime.push_value(base.to_u256());
                self.runtime.push_u64(constants::MAPPING_SLOT_OFFSET);
                self.runtime.op(OpCode::MSTORE);
                self.runtime.push_u64(2 * constants::EVM_WORD_SIZE);
                self.runtime.push_u64(constants::MAPPING_KEY_OFFSET);
                self.runtime.op(OpCode::KECCAK256);
            }
        }
        Ok(())
    }

    fn lower_call(&mut self, func: &FunctionInfo, expr: &Expr) -> Result<()> {
        if let Some((method, [])) = expr.self_call() {
            if let Some(read) = EnvironmentRead::from_method(method) {
                self.runtime.op(environment_opcode(read));
                return Ok(());
            }
        }
        if let Some((member, MAPPING_GET_METHOD, [key] | [key, _])) = expr.self_member_call() {
            if let Some(base) = self.model.slot(member) {
                self.emit_mapping_address(func, base, key)?;
                self.runtime.op(OpCode::SLOAD);
                return Ok(());
            }
        }
        self.push_zero();
        Ok(())
    }

    /// Operands are normalized to 0/1 before combining.
    fn lower_bool_op(&mut self, func: &FunctionInfo, op: BoolOp, values: &[Expr]) -> Result<()> {
        let combine = match op {
            BoolOp::And => OpCode::AND,
            BoolOp::Or => OpCode::OR,
        };
        for (i, value) in values.iter().enumerate() {
            self.lower_expr(func, value)?;
            self.runtime.ops(&[OpCode::ISZERO, OpCode::ISZERO]);
            if i > 0 {
                self.runtime.op(combine);
            }
        }
        if values.is_empty() {
            self.push_zero();
        }
        Ok(())
    }
}

/// Opcodes applied to `[.., left, right]`. `SUB`, `DIV`, `MOD` and `EXP`
/// take their first operand from the top, so the operands are swapped first.
/// `SHL` and `SHR` take the shift amount from the top, which is `right`.
pub(super) fn binary_opcodes(op: BinOp) -> Option<&'static [OpCode]> {
    let ops: &'static [OpCode] = match op {
        BinOp::Add => &[OpCode::ADD],
        BinOp::Mult => &[OpCode::MUL],
        BinOp::Sub => &[OpCode::SWAP1, OpCode::SUB],
        BinOp::Div | BinOp::FloorDiv => &[OpCode::SWAP1, OpCode::DIV],
        BinOp::Mod => &[OpCode::SWAP1, OpCode::MOD],
        BinOp::Pow => &[OpCode::SWAP1, OpCode::EXP],
        BinOp::LShift => &[OpCode::SHL],
        BinOp::RShift => &[OpCode::SHR],
        BinOp::BitAnd => &[OpCode::AND],
        BinOp::BitOr => &[OpCode::OR],
        BinOp::BitXor => &[OpCode::XOR],
        BinOp::MatMult => return None,
    };
    Some(ops)
}

fn comparison_opcodes(op: CmpOp) -> Option<&'static [OpCode]> {
    let ops: &'static [OpCode] = match op {
        CmpOp::Eq => &[OpCode::EQ],
        CmpOp::NotEq => &[OpCode::EQ, OpCode::ISZERO],
        CmpOp::Lt => &[OpCode::SWAP1, OpCode::LT],
        CmpOp::Gt => &[OpCode::SWAP1, OpCode::GT],
        CmpOp::LtE => &[OpCode::SWAP1, OpCode::GT, OpCode::ISZERO],
        CmpOp::GtE => &[OpCode::SWAP1, OpCode::LT, OpCode::ISZERO],
        CmpOp::Is | CmpOp::IsNot | CmpOp::In | CmpOp::NotIn => return None,
    };
    Some(ops)
}

fn environment_opcode(read: EnvironmentRead) -> OpCode {
    match read {
        EnvironmentRead::Caller => OpCode::CALLER,
        EnvironmentRead::BlockNumber => OpCode::NUMBER,
        EnvironmentRead::Timestamp => OpCode::TIMESTAMP,
        EnvironmentRead::CallValue => OpCode::CALLVALUE,
    }
}
