//! Source-to-artifact driver.
//!
//! [`transpile`] runs the whole pipeline: parse, analyze, optionally reject
//! defaulted constructs in strict mode, assemble both code segments and
//! describe the result.

pub mod abi;
mod artifact;
mod config;

pub use abi::{AbiEntry, build_abi};
pub use artifact::{Artifact, COMPILER_NAME, COMPILER_VERSION, Metadata};
pub use config::CompilerConfig;
pub use pyevm_analyses::Diagnostic;
pub use pyevm_codegen::MappingLayout;

use pyevm_analyses::{analyze, validate};
use pyevm_codegen::{Assembled, CodegenError, assemble};
use pyevm_data::ContractModel;
use pyevm_parser::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("syntax error at {0}")]
    Syntax(#[from] ParseError),

    #[error("strict mode rejected the contract with {} diagnostics", .0.len())]
    Strict(Vec<Diagnostic>),

    #[error("internal compiler error: {0}")]
    Internal(#[from] CodegenError),
}

impl CompileError {
    /// Human-readable report with source excerpts where available.
    pub fn render(&self, source: &str) -> String {
        match self {
            CompileError::Syntax(err) => err.render(source),
            CompileError::Strict(diagnostics) => {
                let mut out = format!("error: {self}\n");
                for diagnostic in diagnostics {
                    out.push_str(&diagnostic.render(source));
                }
                out
            }
            CompileError::Internal(_) => format!("error: {self}\n"),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// Intermediate products of one compilation alongside the artifact.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub model: ContractModel,
    pub assembled: Assembled,
    pub artifact: Artifact,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Transpiler {
    config: CompilerConfig,
}

impl Transpiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> CompilerConfig {
        self.config
    }

    pub fn compile(&self, source: &str) -> Result<Compilation> {
        let module = pyevm_parser::parse(source)?;

        let analysis = analyze(&module);
        let mut diagnostics = analysis.diagnostics;
        let model = analysis.model;
        diagnostics.extend(validate(&model));

        if self.config.strict && !diagnostics.is_empty() {
            return Err(CompileError::Strict(diagnostics));
        }
        for diagnostic in &diagnostics {
            let (line, column) = pyevm_parser::line_col(source, diagnostic.span.start);
            tracing::warn!(target: "compiler", line, column, "{}", diagnostic.message);
        }

        let assembled = assemble(&model, self.config.codegen())?;
        let artifact = Artifact::new(&model, &assembled, build_abi(&model));

        tracing::info!(
            target: "compiler",
            contract = %model.name,
            bytecode_size = assembled.init.len() + assembled.runtime.len(),
            gas_estimate = assembled.gas_estimate,
            "compiled"
        );

        Ok(Compilation { model, assembled, artifact })
    }

    pub fn transpile(&self, source: &str) -> Result<Artifact> {
        self.compile(source).map(|compilation| compilation.artifact)
    }
}

/// Compiles with the default, permissive configuration.
pub fn transpile(source: &str) -> Result<Artifact> {
    Transpiler::default().transpile(source)
}
