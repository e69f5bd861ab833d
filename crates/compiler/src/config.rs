use pyevm_codegen::{Config, MappingLayout};
use serde::{Deserialize, Serialize};

/// Options for one compilation. Missing fields deserialize to their
/// defaults: permissive, additive mappings.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Reject the contract instead of defaulting unsupported constructs
    pub strict: bool,
    pub mapping_layout: MappingLayout,
}

impl CompilerConfig {
    pub fn strict() -> Self {
        Self { strict: true, ..Self::default() }
    }

    pub fn with_mapping_layout(mut self, mapping_layout: MappingLayout) -> Self {
        self.mapping_layout = mapping_layout;
        self
    }

    pub(crate) fn codegen(&self) -> Config {
        Config { mapping_layout: self.mapping_layout }
    }
}
