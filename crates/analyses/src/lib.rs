//! Semantic analysis of contract sources.
//!
//! [`analyze`] builds the contract model; [`validate`] is the opt-in strict
//! pass that reports every construct the permissive compiler would default.

mod contract;
mod diagnostics;
mod validate;

pub use contract::{Analysis, analyze};
pub use diagnostics::Diagnostic;
pub use validate::validate;

use pyevm_parser::ast::{Stmt, StmtKind};

/// Pre-order walk over a statement list and every nested block.
pub fn for_each_stmt(body: &[Stmt], visit: &mut impl FnMut(&Stmt)) {
    for stmt in body {
        visit(stmt);
        match &stmt.kind {
            StmtKind::If { body, orelse, .. }
            | StmtKind::While { body, orelse, .. }
            | StmtKind::For { body, orelse, .. } => {
                for_each_stmt(body, visit);
                for_each_stmt(orelse, visit);
            }
            StmtKind::Try { body, handlers, orelse, finalbody } => {
                for_each_stmt(body, visit);
                for handler in handlers {
                    for_each_stmt(&handler.body, visit);
                }
                for_each_stmt(orelse, visit);
                for_each_stmt(finalbody, visit);
            }
            StmtKind::With { body, .. } => for_each_stmt(body, visit),
            _ => {}
        }
    }
}
