//! Control flow translation
//!
//! Only forward jumps are emitted. Each construct allocates its labels,
//! references them through placeholders and binds them before returning, so
//! no placeholder outlives the construct that created it.

use super::Translator;
use crate::error::Result;
use pyevm_data::FunctionInfo;
use pyevm_parser::ast::{Expr, Stmt};
use revm::interpreter::OpCode;

impl Translator<'_> {
    /// ```text
    ///     <test> ISZERO PUSH2 else JUMPI
    ///     <body> PUSH2 end JUMP
    /// else:
    ///     JUMPDEST <orelse>
    /// end:
    ///     JUMPDEST
    /// ```
    pub(super) fn lower_if(
        &mut self,
        func: &FunctionInfo,
        test: &Expr,
        body: &[Stmt],
        orelse: &[Stmt],
    ) -> Result<()> {
        let else_label = self.labels.allocate();
        let end_label = self.labels.allocate();

        self.lower_expr(func, test)?;
        self.runtime.op(OpCode::ISZERO);
        self.emit_jumpi(else_label)?;

        self.lower_block(func, body)?;
        self.emit_jump(end_label)?;

        self.runtime.jumpdest(else_label)?;
        self.lower_block(func, orelse)?;
        self.runtime.jumpdest(end_label)
    }

    /// Reverts with empty data when `condition` is zero.
    pub(super) fn lower_require(&mut self, func: &FunctionInfo, condition: &Expr) -> Result<()> {
        let ok_label = self.labels.allocate();

        self.lower_expr(func, condition)?;
        self.emit_jumpi(ok_label)?;
        self.emit_revert();
        self.runtime.jumpdest(ok_label)
    }
}
