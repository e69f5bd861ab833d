//! Builds the [`ContractModel`] from the syntax tree of a contract class.

use crate::{Diagnostic, for_each_stmt};
use alloy_primitives::U256;
use pyevm_data::{
    ContractModel, EventInfo, FunctionInfo, InitialValue, Parameter, SemanticType, Visibility,
    builtins::{
        CONSTRUCTOR, CONTRACT_BASE, EVENT_METHOD, EnvironmentRead, MAPPING_GET_METHOD,
        PUBLIC_MARKERS, RECEIVER, STATE_VAR_METHOD, VIEW_MARKERS, string_word,
    },
};
use pyevm_parser::ast::{
    ClassDef, Constant, Expr, ExprKind, FunctionDef, Module, Param, ParamKind, Span, Stmt, StmtKind,
};

/// Result of analysis: the model plus every place where a default was
/// substituted for something the compiler does not understand.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub model: ContractModel,
    pub diagnostics: Vec<Diagnostic>,
}

/// Analyzes the first class deriving from the contract base.
pub fn analyze(module: &Module) -> Analysis {
    let mut diagnostics = Vec::new();
    let mut classes = module.classes().filter(|class| derives_contract_base(class));

    let Some(class) = classes.next() else {
        diagnostics.push(Diagnostic::new(
            format!("no class deriving from `{CONTRACT_BASE}` found"),
            Span::default(),
        ));
        return Analysis { model: ContractModel::default(), diagnostics };
    };
    for ignored in classes {
        diagnostics.push(Diagnostic::new(
            format!("contract class `{}` ignored; only the first contract is compiled", ignored.name),
            ignored.span,
        ));
    }

    let mut builder = ModelBuilder { model: ContractModel::new(&class.name), diagnostics };
    builder.visit_class(class);
    tracing::debug!(
        target: "analyzer",
        contract = %builder.model.name,
        state_variables = builder.model.storage_slots.len(),
        functions = builder.model.functions.len(),
        events = builder.model.events.len(),
        "analyzed contract"
    );
    Analysis { model: builder.model, diagnostics: builder.diagnostics }
}

fn derives_contract_base(class: &ClassDef) -> bool {
    class.bases.iter().any(|base| base.trailing_name() == Some(CONTRACT_BASE))
}

struct ModelBuilder {
    model: ContractModel,
    diagnostics: Vec<Diagnostic>,
}

impl ModelBuilder {
    fn note(&mut self, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::new(message, span));
    }

    fn visit_class(&mut self, class: &ClassDef) {
        // The constructor fixes the storage layout that return-type inference
        // depends on, so it goes first wherever it appears.
        if let Some(ctor) = class.methods().find(|m| m.name == CONSTRUCTOR) {
            tracing::debug!(target: "analyzer", "visiting constructor");
            self.collect_state_variables(&ctor.body);
        }

        for method in class.methods() {
            self.collect_events(&method.body);
            if method.name == CONSTRUCTOR {
                continue;
            }
            if method.name.starts_with('_') {
                tracing::debug!(target: "analyzer", name = %method.name, "skipping private function");
                continue;
            }
            self.visit_function(method);
        }
    }

    fn collect_state_variables(&mut self, body: &[Stmt]) {
        for_each_stmt(body, &mut |stmt: &Stmt| match &stmt.kind {
            StmtKind::Assign { targets, value } => {
                for target in targets {
                    if let Some(name) = target.self_attribute() {
                        self.declare(name, value);
                    }
                }
            }
            StmtKind::AnnAssign { target, value: Some(value), .. } => {
                if let Some(name) = target.self_attribute() {
                    self.declare(name, value);
                }
            }
            _ => {}
        });
    }

    fn declare(&mut self, name: &str, value: &Expr) {
        if self.model.slot(name).is_some() {
            return;
        }
        let (ty, initial) = self.classify_initializer(name, value);
        if let Some(slot) = self.model.declare_state_variable(name, ty, initial) {
            tracing::debug!(target: "analyzer", %name, %slot, %ty, "state variable");
        }
    }

    fn classify_initializer(&mut self, name: &str, value: &Expr) -> (SemanticType, InitialValue) {
        let zero = InitialValue::Word(U256::ZERO);
        match &value.kind {
            ExprKind::Dict { .. } => (SemanticType::Mapping, InitialValue::EmptyMapping),
            ExprKind::Constant(Constant::Int(int)) => (SemanticType::Uint256, InitialValue::Word(*int)),
            ExprKind::Constant(Constant::Bool(flag)) => {
                (SemanticType::Uint256, InitialValue::Word(U256::from(u8::from(*flag))))
            }
            ExprKind::Constant(Constant::Str(text)) => {
                let (ty, word) = string_word(text);
                (ty, InitialValue::Word(word))
            }
            ExprKind::Call { .. } => match value.self_call() {
                Some((STATE_VAR_METHOD, [_, initial, ..])) => self.classify_initializer(name, initial),
                Some((method, [])) if EnvironmentRead::from_method(method) == Some(EnvironmentRead::Caller) => {
                    self.note(
                        format!("`{name}` is initialized from the caller, which is stored as the zero address"),
                        value.span,
                    );
                    (SemanticType::Address, zero)
                }
                _ => {
                    self.note(
                        format!("call initializing `{name}` is not evaluated; the slot starts at zero"),
                        value.span,
                    );
                    (SemanticType::Uint256, zero)
                }
            },
            _ => {
                self.note(
                    format!("unsupported initializer for `{name}`; the slot starts at zero"),
                    value.span,
                );
                (SemanticType::Uint256, zero)
            }
        }
    }

    fn collect_events(&mut self, body: &[Stmt]) {
        for_each_stmt(body, &mut |stmt: &Stmt| {
            let StmtKind::Expr(expr) = &stmt.kind else {
                return;
            };
            let Some((EVENT_METHOD, args)) = expr.self_call() else {
                return;
            };
            let Some((name, rest)) =
                args.split_first().and_then(|(first, rest)| Some((first.as_str()?, rest)))
            else {
                self.note("event name must be a string literal", expr.span);
                return;
            };
            if !self.model.events.contains_key(name) {
                let params = vec![SemanticType::Uint256; rest.len()];
                tracing::debug!(target: "analyzer", %name, params = params.len(), "event");
                self.model.events.insert(name.to_owned(), EventInfo { name: name.to_owned(), params });
            }
        });
    }

    fn visit_function(&mut self, method: &FunctionDef) {
        let visibility = self.visibility(method);

        let mut params = Vec::new();
        for param in &method.params {
            if param.name == RECEIVER {
                continue;
            }
            if param.kind != ParamKind::Normal {
                self.note(format!("variadic parameter `{}` is ignored", param.name), param.span);
                continue;
            }
            params.push(Parameter { name: param.name.clone(), ty: self.param_type(param) });
        }

        let mut has_return = false;
        let mut return_type = SemanticType::Uint256;
        for stmt in &method.body {
            if let StmtKind::Return(Some(value)) = &stmt.kind {
                has_return = true;
                return_type = self.infer_type(value);
            }
        }

        let info = FunctionInfo {
            name: method.name.clone(),
            visibility,
            params,
            body: method.body.clone(),
            has_return,
            return_type,
            span: method.span,
        };
        tracing::debug!(
            target: "analyzer",
            signature = %info.signature(),
            visibility = visibility.as_str(),
            "function"
        );
        if self.model.functions.insert(method.name.clone(), info).is_some() {
            self.note(format!("function `{}` is redefined; the last definition wins", method.name), method.span);
        }
    }

    fn visibility(&mut self, method: &FunctionDef) -> Visibility {
        let mut public = false;
        let mut view = false;
        for decorator in &method.decorators {
            let marker = match &decorator.kind {
                ExprKind::Call { func, .. } => func.trailing_name(),
                _ => decorator.trailing_name(),
            };
            match marker {
                Some(name) if PUBLIC_MARKERS.contains(&name) => public = true,
                Some(name) if VIEW_MARKERS.contains(&name) => view = true,
                _ => self.note("unrecognized decorator is ignored", decorator.span),
            }
        }
        Visibility::from_markers(public, view)
    }

    fn param_type(&mut self, param: &Param) -> SemanticType {
        let Some(annotation) = &param.annotation else {
            return SemanticType::Uint256;
        };
        match annotation.as_name() {
            Some("int") => SemanticType::Uint256,
            Some("str") => SemanticType::Address,
            _ => {
                self.note(
                    format!("unsupported annotation on `{}`; treated as uint256", param.name),
                    annotation.span,
                );
                SemanticType::Uint256
            }
        }
    }

    /// Type of a returned expression.
    fn infer_type(&self, value: &Expr) -> SemanticType {
        if let Some(name) = value.self_attribute() {
            return self.model.variable_type(name).unwrap_or(SemanticType::Uint256);
        }
        let mapping = match &value.kind {
            ExprKind::Subscript { value, .. } => value.self_attribute(),
            ExprKind::Call { .. } => match value.self_member_call() {
                Some((member, MAPPING_GET_METHOD, _)) => Some(member),
                _ => None,
            },
            _ => None,
        };
        mapping
            .and_then(|name| self.model.mapping(name))
            .map_or(SemanticType::Uint256, |mapping| mapping.value)
    }
}
