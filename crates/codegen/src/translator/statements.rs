//! Statement lowering

use super::{Translator, expressions::binary_opcodes};
use crate::error::Result;
use pyevm_data::{FunctionInfo, builtins::REQUIRE_METHOD};
use pyevm_parser::ast::{BinOp, Expr, ExprKind, Stmt, StmtKind};
use revm::interpreter::OpCode;

impl Translator<'_> {
    pub(super) fn lower_block(&mut self, func: &FunctionInfo, body: &[Stmt]) -> Result<()> {
        for stmt in body {
            self.lower_stmt(func, stmt)?;
        }
        Ok(())
    }

    /// Statements without a lowering (locals, loops, events, bare
    /// expressions) emit nothing.
    fn lower_stmt(&mut self, func: &FunctionInfo, stmt: &Stmt) -> Result<()> {
        match &stmt.kind {
            StmtKind::Assign { targets, value } => {
                for target in targets {
                    self.lower_store(func, target, value)?;
                }
            }
            StmtKind::AnnAssign { target, value: Some(value), .. } => {
                self.lower_store(func, target, value)?
            }
            StmtKind::AugAssign { target, op, value } => {
                self.lower_aug_assign(func, target, *op, value)?
            }
            StmtKind::Return(Some(value)) => {
                self.lower_expr(func, value)?;
                self.emit_return_word();
            }
            StmtKind::Return(None) => self.emit_return_empty(),
            StmtKind::If { test, body, orelse } => self.lower_if(func, test, body, orelse)?,
            StmtKind::Raise(_) => self.emit_revert(),
            StmtKind::Expr(expr) => {
                if let Some((REQUIRE_METHOD, [condition] | [condition, _])) = expr.self_call() {
                    self.lower_require(func, condition)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn lower_store(&mut self, func: &FunctionInfo, target: &Expr, value: &Expr) -> Result<()> {
        if let Some(slot) = self.state_slot(target) {
            self.lower_expr(func, value)?;
            // Stack: [value, slot]
            self.runtime.push_value(slot.to_u256());
            self.runtime.op(OpCode::SSTORE);
            return Ok(());
        }
        if let ExprKind::Subscript { value: container, index } = &target.kind {
            if let Some(base) = self.state_slot(container) {
                self.lower_expr(func, value)?;
                self.emit_mapping_address(func, base, index)?;
                self.runtime.op(OpCode::SSTORE);
            }
        }
        Ok(())
    }

    /// `target op= value` with the operand order of `target op value`. An
    /// unsupported operator stores zero.
    fn lower_aug_assign(
        &mut self,
        func: &FunctionInfo,
        target: &Expr,
        op: BinOp,
        value: &Expr,
    ) -> Result<()> {
        let ops = binary_opcodes(op);

        if let Some(slot) = self.state_slot(target) {
            match ops {
                Some(ops) => {
                    self.runtime.push_value(slot.to_u256());
                    self.runtime.op(OpCode::SLOAD);
                    self.lower_expr(func, value)?;
                    self.runtime.ops(ops);
                }
                None => self.push_zero(),
            }
            self.runtime.push_value(slot.to_u256());
            self.runtime.op(OpCode::SSTORE);
            return Ok(());
        }

        if let ExprKind::Subscript { value: container, index } = &target.kind {
            if let Some(base) = self.state_slot(container) {
                self.emit_mapping_address(func, base, index)?;
                // Stack: [address]
                match ops {
                    Some(ops) => {
                        self.runtime.op(OpCode::DUP1);
                        self.runtime.op(OpCode::SLOAD);
                        self.lower_expr(func, value)?;
                        self.runtime.ops(ops);
                    }
                    None => self.push_zero(),
                }
                // Stack: [address, result]
                self.runtime.op(OpCode::SWAP1);
                self.runtime.op(OpCode::SSTORE);
            }
        }
        Ok(())
    }
}
