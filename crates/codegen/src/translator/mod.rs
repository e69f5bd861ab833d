//! Translator from the contract model to EVM bytecode

mod control_flow;
mod dispatch;
mod expressions;
mod helpers;
mod initialization;
mod statements;

/// Common constants used throughout the translator
mod constants {
    /// Initial capacity estimate for the runtime segment per function
    pub const BYTES_PER_FUNCTION: usize = 64;

    /// Dispatcher and revert pad overhead
    pub const RUNTIME_OVERHEAD: usize = 32;

    /// EVM word size in bytes
    pub const EVM_WORD_SIZE: u64 = 32;

    /// Calldata bytes taken by the selector
    pub const SELECTOR_SIZE: u64 = 4;

    /// Moves the selector from the top four bytes of a word to the bottom
    pub const SELECTOR_SHIFT: u64 = 224;

    /// Memory offset of the returned word
    pub const RETURN_OFFSET: u64 = 0x00;

    /// Scratch words hashed to address a mapping entry
    pub const MAPPING_KEY_OFFSET: u64 = 0x00;
    pub const MAPPING_SLOT_OFFSET: u64 = 0x20;
}

use crate::{Config, buffer::CodeBuffer, error::Result, marks::LabelAllocator};
use pyevm_data::ContractModel;

/// Both segments of a compiled contract.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Assembled {
    pub init: Vec<u8>,
    pub runtime: Vec<u8>,
    /// Static cost of every opcode in both segments
    pub gas_estimate: u64,
}

impl Assembled {
    /// Deployment image: init followed by runtime.
    pub fn bytecode(&self) -> Vec<u8> {
        [self.init.as_slice(), self.runtime.as_slice()].concat()
    }
}

/// Main translator from the contract model to bytecode
pub struct Translator<'a> {
    pub(crate) model: &'a ContractModel,
    pub(crate) config: Config,
    pub(crate) labels: LabelAllocator,
    pub(crate) init: CodeBuffer,
    pub(crate) runtime: CodeBuffer,
}

impl<'a> Translator<'a> {
    /// Create a new translator for the given model with default configuration
    pub fn new(model: &'a ContractModel) -> Self {
        Self::with_config(model, Config::default())
    }

    /// Create a new translator for the given model with custom configuration
    pub fn with_config(model: &'a ContractModel, config: Config) -> Self {
        let estimated_runtime_size = model.functions.len() * constants::BYTES_PER_FUNCTION
            + constants::RUNTIME_OVERHEAD;

        Self {
            model,
            config,
            labels: LabelAllocator::new(),
            init: CodeBuffer::new(),
            runtime: CodeBuffer::with_capacity(estimated_runtime_size),
        }
    }

    /// Emit the runtime segment, then the init segment that deploys it.
    pub fn translate(mut self) -> Result<Assembled> {
        self.generate_runtime_code()?;
        let runtime_gas = self.runtime.gas();
        let runtime = std::mem::take(&mut self.runtime).finish()?;

        self.generate_init_code(runtime.len())?;
        let init_gas = self.init.gas();
        let init = std::mem::take(&mut self.init).finish()?;

        let gas_estimate = init_gas + runtime_gas;
        tracing::debug!(
            target: "codegen",
            init = init.len(),
            runtime = runtime.len(),
            gas_estimate,
            "assembled segments"
        );
        Ok(Assembled { init, runtime, gas_estimate })
    }
}

/// High-level function to translate a contract model to bytecode
pub fn assemble(model: &ContractModel, config: Config) -> Result<Assembled> {
    Translator::with_config(model, config).translate()
}
