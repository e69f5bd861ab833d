pub mod builders;
pub mod constants;
pub mod strategies;

// Re-export commonly used items for convenience
pub use builders::{
    DeployedContract, assert_jump_targets_valid, assert_opcode_counts, assert_opcode_sequence,
    binary_expression_contract, compile, compile_with, contains_sequence, count_opcode,
    eval_binary, eval_unary, keccak_config, model_for, opcodes,
};
pub use constants::*;
pub use strategies::{short_calldata_strategy, word_strategy};
