//! Tests for branch, require, raise and default-return lowering

use crate::tests::helpers::{
    BRANCHES, TOKEN, assert_jump_targets_valid, assert_opcode_counts, assert_opcode_sequence,
    compile, count_opcode, opcodes,
};
use revm::interpreter::opcode::*;

fn single_function(decorator: &str, signature: &str, body: &str) -> Vec<u8> {
    let source = format!(
        r#"
class C(PySmartContract):
    def __init__(self):
        self.v = 0

    @{decorator}
    def {signature}:
{body}
"#
    );
    compile(&source).runtime
}

/// Runtime bytes after the revert pad, i.e. the function bodies
fn bodies(runtime: &[u8]) -> &[u8] {
    let pad = [JUMPDEST, PUSH1, 0, PUSH1, 0, REVERT];
    let start = runtime
        .windows(pad.len())
        .position(|window| window == pad)
        .expect("runtime should contain the revert pad");
    &runtime[start + pad.len()..]
}

#[test]
fn if_else_shape() {
    let runtime = single_function(
        "public",
        "f(self, x: int)",
        "        if x:\n            self.v = 1\n        else:\n            self.v = 2",
    );

    assert_opcode_sequence(
        bodies(&runtime),
        &[
            JUMPDEST, PUSH1, CALLDATALOAD, ISZERO, PUSH2, JUMPI, // test
            PUSH1, PUSH1, SSTORE, PUSH2, JUMP, // body
            JUMPDEST, PUSH1, PUSH1, SSTORE, // orelse
            JUMPDEST, PUSH1, PUSH1, RETURN,
        ],
    );
    assert_jump_targets_valid(&runtime);
}

#[test]
fn if_without_else_still_jumps_to_end() {
    let runtime = single_function(
        "public",
        "f(self, x: int)",
        "        if x:\n            self.v = 1",
    );
    assert_opcode_sequence(bodies(&runtime), &[SSTORE, PUSH2, JUMP, JUMPDEST, JUMPDEST]);
    assert_jump_targets_valid(&runtime);
}

#[test]
fn require_shape() {
    let runtime = single_function(
        "public",
        "f(self, x: int)",
        "        self.require(x, \"x must be set\")\n        self.v = x",
    );
    assert_opcode_sequence(
        bodies(&runtime),
        &[CALLDATALOAD, PUSH2, JUMPI, PUSH1, PUSH1, REVERT, JUMPDEST, PUSH1, CALLDATALOAD],
    );
    assert_jump_targets_valid(&runtime);
}

#[test]
fn raise_reverts() {
    let runtime = single_function("public", "f(self)", "        raise ValueError(\"no\")");
    // Revert pad plus the raise
    assert_eq!(count_opcode(&runtime, REVERT), 2);
    assert_opcode_sequence(bodies(&runtime), &[JUMPDEST, PUSH1, PUSH1, REVERT]);
}

#[test]
fn default_returns() {
    let view = single_function("view", "f(self) -> int", "        self.require(1)");
    assert!(bodies(&view).ends_with(&[PUSH1, 0, PUSH1, 0, MSTORE, PUSH1, 32, PUSH1, 0, RETURN]));

    let public = single_function("public", "f(self)", "        self.v = 1");
    assert!(bodies(&public).ends_with(&[PUSH1, 0, PUSH1, 0, RETURN]));

    // An explicit top-level return suppresses the default
    let explicit = single_function("view", "f(self) -> int", "        return 7");
    assert_opcode_counts(&explicit, &[(RETURN, 1)]);
    let bare = single_function("public", "f(self)", "        self.v = 1\n        return");
    assert_opcode_counts(&bare, &[(RETURN, 1)]);

    // A nested return does not
    let nested = single_function("view", "f(self, x: int) -> int", "        if x:\n            return 7");
    assert_opcode_counts(&nested, &[(RETURN, 2)]);
}

#[test]
fn unsupported_statements_emit_nothing() {
    let reference = single_function("public", "f(self, x: int)", "        pass");
    let ignored = single_function(
        "public",
        "f(self, x: int)",
        "        y = x\n        while x:\n            self.v = 1\n        for i in x:\n            self.v = 2\n        self.event(\"E\", x)\n        x + 1",
    );
    assert_eq!(reference, ignored);
}

#[test]
fn all_jumps_resolve() {
    for source in [BRANCHES, TOKEN] {
        let assembled = compile(source);
        assert_jump_targets_valid(&assembled.runtime);
        assert!(!opcodes(&assembled.runtime).is_empty());
    }
}
