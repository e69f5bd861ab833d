//! Strict-mode checks over function bodies.
//!
//! Code generation lowers anything it does not understand to a harmless
//! default (a zero word, or no code at all). This pass reports each of those
//! places so a strict build can refuse them instead.

use crate::Diagnostic;
use pyevm_data::{
    ContractModel, FunctionInfo, Visibility,
    builtins::{EVENT_METHOD, EnvironmentRead, MAPPING_GET_METHOD, REQUIRE_METHOD},
};
use pyevm_parser::ast::{BinOp, CmpOp, Constant, Expr, ExprKind, Span, Stmt, StmtKind};

pub fn validate(model: &ContractModel) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for func in model.functions.values() {
        if func.visibility == Visibility::Internal {
            diagnostics.push(Diagnostic::new(
                format!("function `{}` has no `@public` or `@view` marker and is not callable", func.name),
                func.span,
            ));
            continue;
        }
        let mut validator = Validator { model, func, diagnostics: &mut diagnostics };
        validator.block(&func.body);
    }
    diagnostics
}

struct Validator<'a> {
    model: &'a ContractModel,
    func: &'a FunctionInfo,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl Validator<'_> {
    fn note(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::new(message, span));
    }

    fn block(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(expr) => self.expression_statement(expr),
            StmtKind::Assign { targets, value } => {
                for target in targets {
                    self.store_target(target);
                }
                self.expr(value);
            }
            StmtKind::AnnAssign { target, value: Some(value), .. } => {
                self.store_target(target);
                self.expr(value);
            }
            StmtKind::AugAssign { target, op, value } => {
                if *op == BinOp::MatMult {
                    self.note("operator `@` is not supported", stmt.span);
                }
                self.store_target(target);
                self.expr(value);
            }
            StmtKind::Return(Some(value)) => self.expr(value),
            StmtKind::If { test, body, orelse } => {
                self.expr(test);
                self.block(body);
                self.block(orelse);
            }
            StmtKind::Return(None) | StmtKind::Raise(_) | StmtKind::Pass => {}
            other => self.note(format!("{} is not compiled", statement_name(other)), stmt.span),
        }
    }

    fn expression_statement(&mut self, expr: &Expr) {
        match expr.self_call() {
            Some((EVENT_METHOD, _)) => {}
            Some((REQUIRE_METHOD, [condition])) | Some((REQUIRE_METHOD, [condition, _])) => {
                self.expr(condition);
            }
            Some((REQUIRE_METHOD, _)) => {
                self.note("`require` takes a condition and an optional message", expr.span)
            }
            _ => self.note("expression statement has no effect", expr.span),
        }
    }

    fn store_target(&mut self, target: &Expr) {
        if let Some(name) = target.self_attribute() {
            self.state_variable(name, target);
            return;
        }
        match &target.kind {
            ExprKind::Subscript { value, index } => match value.self_attribute() {
                Some(name) => {
                    self.state_variable(name, value);
                    self.expr(index);
                }
                None => self.note("unsupported assignment target", target.span),
            },
            ExprKind::Name(name) => {
                self.note(format!("assignment to local `{name}` is not compiled"), target.span)
            }
            _ => self.note("unsupported assignment target", target.span),
        }
    }

    fn state_variable(&mut self, name: &str, at: &Expr) {
        if self.model.slot(name).is_none() {
            self.note(
                format!("unknown state variable `{name}`; state is declared in the constructor"),
                at.span,
            );
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Constant(Constant::Int(_) | Constant::Bool(_) | Constant::Str(_)) => {}
            ExprKind::Constant(_) => self.note("unsupported literal evaluates to zero", expr.span),
            ExprKind::Name(name) => {
                if self.func.param_index(name).is_none() {
                    self.note(format!("unknown name `{name}` evaluates to zero"), expr.span);
                }
            }
            ExprKind::Attribute { .. } => match expr.self_attribute() {
                Some(name) => self.state_variable(name, expr),
                None => self.note("attribute access evaluates to zero", expr.span),
            },
            ExprKind::Subscript { value, index } => match value.self_attribute() {
                Some(name) => {
                    self.state_variable(name, value);
                    self.expr(index);
                }
                None => self.note("subscript of a non-state value evaluates to zero", expr.span),
            },
            ExprKind::Call { .. } => self.call(expr),
            ExprKind::BinOp { left, op, right } => {
                if *op == BinOp::MatMult {
                    self.note("operator `@` evaluates to zero", expr.span);
                }
                self.expr(left);
                self.expr(right);
            }
            ExprKind::UnaryOp { operand, .. } => self.expr(operand),
            ExprKind::BoolOp { values, .. } => values.iter().for_each(|value| self.expr(value)),
            ExprKind::Compare { left, ops, comparators } => match (ops.as_slice(), comparators.as_slice()) {
                (
                    [CmpOp::Eq | CmpOp::NotEq | CmpOp::Lt | CmpOp::LtE | CmpOp::Gt | CmpOp::GtE],
                    [right],
                ) => {
                    self.expr(left);
                    self.expr(right);
                }
                _ => self.note("chained or membership comparison evaluates to zero", expr.span),
            },
            _ => self.note("unsupported expression evaluates to zero", expr.span),
        }
    }

    fn call(&mut self, expr: &Expr) {
        if let Some((method, [])) = expr.self_call() {
            if EnvironmentRead::from_method(method).is_some() {
                return;
            }
        }
        match expr.self_member_call() {
            Some((member, MAPPING_GET_METHOD, args @ ([_] | [_, _]))) => {
                if self.model.slot(member).is_none() {
                    self.note(format!("unknown state variable `{member}`"), expr.span);
                }
                self.expr(&args[0]);
                if let Some(default) = args.get(1) {
                    let is_zero = matches!(
                        &default.kind,
                        ExprKind::Constant(Constant::Int(value)) if value.is_zero()
                    );
                    if !is_zero {
                        self.note("mapping default other than 0 is ignored", default.span);
                    }
                }
            }
            _ => self.note("call evaluates to zero", expr.span),
        }
    }
}

fn statement_name(kind: &StmtKind) -> &'static str {
    match kind {
        StmtKind::While { .. } => "`while` loop",
        StmtKind::For { .. } => "`for` loop",
        StmtKind::Break => "`break`",
        StmtKind::Continue => "`continue`",
        StmtKind::Assert { .. } => "`assert`",
        StmtKind::Import(_) | StmtKind::ImportFrom { .. } => "import",
        StmtKind::FunctionDef(_) => "nested function",
        StmtKind::ClassDef(_) => "nested class",
        StmtKind::AnnAssign { .. } => "bare annotation",
        StmtKind::Delete(_) => "`del`",
        StmtKind::Try { .. } => "`try` statement",
        StmtKind::With { .. } => "`with` statement",
        StmtKind::Global(_) => "`global` declaration",
        StmtKind::Nonlocal(_) => "`nonlocal` declaration",
        _ => "statement",
    }
}
