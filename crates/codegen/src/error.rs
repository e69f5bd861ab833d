//! Error types for code generation

use crate::marks::Label;
use thiserror::Error;

/// Internal compiler defects detected while emitting bytecode. User input
/// never produces these; they indicate a bug in lowering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// A jump field was emitted for a label that was never bound
    #[error("jump placeholder at offset {offset:#06x} references unbound label {label}")]
    UnresolvedPlaceholder { label: Label, offset: usize },

    /// A label was bound past what a jump field can address
    #[error("jump target {target:#x} does not fit in a {width}-byte address field")]
    JumpTargetOutOfRange { target: usize, width: usize },

    #[error("push immediate of {width} bytes exceeds 32")]
    PushTooWide { width: usize },
}

/// Result type for code generation operations
pub type Result<T> = std::result::Result<T, CodegenError>;
