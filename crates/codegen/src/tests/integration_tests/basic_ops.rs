//! Arithmetic, bitwise and logical operators executed on the EVM

use crate::tests::helpers::{
    BINARY_OP_TEST_CASES, TEST_OPERAND_A, TEST_OPERAND_B, eval_binary, eval_unary,
};
use alloy_primitives::U256;

fn u(value: u64) -> U256 {
    U256::from(value)
}

#[test]
fn test_arithmetic_ops() {
    let (a, b) = (u(TEST_OPERAND_A), u(TEST_OPERAND_B));
    let cases = [
        ("a + b", 13),
        ("a - b", 7),
        ("a * b", 30),
        ("a / b", 3),
        ("a // b", 3),
        ("a % b", 1),
        ("a ** b", 1000),
    ];
    for (expression, expected) in cases {
        assert_eq!(eval_binary(expression, a, b), u(expected), "{expression}");
    }
}

#[test]
fn test_arithmetic_wraps() {
    assert_eq!(eval_binary("a - b", u(3), u(10)), U256::ZERO - u(7));
    assert_eq!(eval_binary("a + b", U256::MAX, u(1)), U256::ZERO);
    assert_eq!(eval_binary("a * b", U256::MAX, u(2)), U256::MAX - u(1));
}

#[test]
fn test_division_by_zero_is_zero() {
    assert_eq!(eval_binary("a / b", u(10), U256::ZERO), U256::ZERO);
    assert_eq!(eval_binary("a % b", u(10), U256::ZERO), U256::ZERO);
}

#[test]
fn test_addition_cases() {
    for (a, b) in BINARY_OP_TEST_CASES {
        let expected = u(a) + u(b);
        assert_eq!(eval_binary("a + b", u(a), u(b)), expected, "{a} + {b}");
    }
}

#[test]
fn test_bitwise_ops() {
    let (a, b) = (u(0b1100), u(0b1010));
    assert_eq!(eval_binary("a & b", a, b), u(0b1000));
    assert_eq!(eval_binary("a | b", a, b), u(0b1110));
    assert_eq!(eval_binary("a ^ b", a, b), u(0b0110));
    assert_eq!(eval_unary("~a", U256::ZERO), U256::MAX);
}

#[test]
fn test_shift_ops() {
    // Right operand is the shift amount, as in Python
    assert_eq!(eval_binary("a << b", u(1), u(4)), u(16));
    assert_eq!(eval_binary("a >> b", u(256), u(4)), u(16));
    assert_eq!(eval_binary("a << b", u(4), u(1)), u(8));
    assert_eq!(eval_binary("a >> b", u(4), u(256)), U256::ZERO);
}

#[test]
fn test_comparison_ops() {
    let cases = [
        ("a == b", 5, 5, 1),
        ("a == b", 5, 3, 0),
        ("a != b", 5, 3, 1),
        ("a < b", 3, 5, 1),
        ("a < b", 5, 3, 0),
        ("a > b", 5, 3, 1),
        ("a > b", 3, 5, 0),
        ("a <= b", 5, 5, 1),
        ("a <= b", 6, 5, 0),
        ("a >= b", 5, 5, 1),
        ("a >= b", 4, 5, 0),
    ];
    for (expression, a, b, expected) in cases {
        assert_eq!(eval_binary(expression, u(a), u(b)), u(expected), "{expression} with {a}, {b}");
    }
}

#[test]
fn test_unary_ops() {
    assert_eq!(eval_unary("-a", u(1)), U256::MAX);
    assert_eq!(eval_unary("+a", u(9)), u(9));
    assert_eq!(eval_unary("not a", U256::ZERO), u(1));
    assert_eq!(eval_unary("not a", u(7)), U256::ZERO);
}

#[test]
fn test_bool_ops_normalize() {
    assert_eq!(eval_binary("a and b", u(7), u(9)), u(1));
    assert_eq!(eval_binary("a and b", u(7), U256::ZERO), U256::ZERO);
    assert_eq!(eval_binary("a or b", U256::ZERO, u(9)), u(1));
    assert_eq!(eval_binary("a or b", U256::ZERO, U256::ZERO), U256::ZERO);
}

#[test]
fn test_unsupported_expressions_are_zero() {
    assert_eq!(eval_binary("a @ b", u(2), u(3)), U256::ZERO);
    assert_eq!(eval_binary("a < b < 10", u(2), u(3)), U256::ZERO);
    assert_eq!(eval_binary("a is b", u(2), u(2)), U256::ZERO);
    assert_eq!(eval_binary("undefined_name", u(2), u(3)), U256::ZERO);
}

#[test]
fn test_constants() {
    assert_eq!(eval_binary("True", U256::ZERO, U256::ZERO), u(1));
    assert_eq!(eval_binary("False", U256::ZERO, U256::ZERO), U256::ZERO);
    assert_eq!(eval_binary("0x1234", U256::ZERO, U256::ZERO), u(0x1234));
    let mut word = [0u8; 32];
    word[..2].copy_from_slice(b"hi");
    assert_eq!(eval_binary("\"hi\"", U256::ZERO, U256::ZERO), U256::from_be_bytes(word));
}
