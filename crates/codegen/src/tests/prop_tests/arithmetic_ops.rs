//! Property tests for arithmetic and comparison lowering

use crate::tests::helpers::{DeployedContract, word_strategy};
use alloy_primitives::U256;
use proptest::prelude::*;

const ARITHMETIC: &str = r#"
class Arithmetic(PySmartContract):
    @view
    def add(self, a: int, b: int) -> int:
        return a + b

    @view
    def sub(self, a: int, b: int) -> int:
        return a - b

    @view
    def mul(self, a: int, b: int) -> int:
        return a * b

    @view
    def div(self, a: int, b: int) -> int:
        return a // b

    @view
    def rem(self, a: int, b: int) -> int:
        return a % b

    @view
    def band(self, a: int, b: int) -> int:
        return a & b

    @view
    def bxor(self, a: int, b: int) -> int:
        return a ^ b

    @view
    def neg(self, a: int, b: int) -> int:
        return -a
"#;

const COMPARISON: &str = r#"
class Comparison(PySmartContract):
    @view
    def lt(self, a: int, b: int) -> int:
        return a < b

    @view
    def gt(self, a: int, b: int) -> int:
        return a > b

    @view
    def le(self, a: int, b: int) -> int:
        return a <= b

    @view
    def ge(self, a: int, b: int) -> int:
        return a >= b

    @view
    def eq(self, a: int, b: int) -> int:
        return a == b

    @view
    def ne(self, a: int, b: int) -> int:
        return a != b
"#;

fn flag(value: bool) -> U256 {
    U256::from(u8::from(value))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_wrapping_arithmetic(a in word_strategy(), b in word_strategy()) {
        let mut contract = DeployedContract::deploy(ARITHMETIC);
        let args = [a, b];

        prop_assert_eq!(contract.call_word("add", &args), a.wrapping_add(b));
        prop_assert_eq!(contract.call_word("sub", &args), a.wrapping_sub(b));
        prop_assert_eq!(contract.call_word("mul", &args), a.wrapping_mul(b));
        prop_assert_eq!(contract.call_word("band", &args), a & b);
        prop_assert_eq!(contract.call_word("bxor", &args), a ^ b);
        prop_assert_eq!(contract.call_word("neg", &args), U256::ZERO.wrapping_sub(a));

        // Division by zero yields zero
        let (quotient, remainder) = if b.is_zero() { (U256::ZERO, U256::ZERO) } else { (a / b, a % b) };
        prop_assert_eq!(contract.call_word("div", &args), quotient);
        prop_assert_eq!(contract.call_word("rem", &args), remainder);
    }

    #[test]
    fn test_comparisons(a in word_strategy(), b in word_strategy()) {
        let mut contract = DeployedContract::deploy(COMPARISON);
        let args = [a, b];

        prop_assert_eq!(contract.call_word("lt", &args), flag(a < b));
        prop_assert_eq!(contract.call_word("gt", &args), flag(a > b));
        prop_assert_eq!(contract.call_word("le", &args), flag(a <= b));
        prop_assert_eq!(contract.call_word("ge", &args), flag(a >= b));
        prop_assert_eq!(contract.call_word("eq", &args), flag(a == b));
        prop_assert_eq!(contract.call_word("ne", &args), flag(a != b));
    }

    #[test]
    fn test_small_operands_match_u64(a in any::<u32>(), b in 1u32..) {
        let mut contract = DeployedContract::deploy(ARITHMETIC);
        let args = [U256::from(a), U256::from(b)];
        prop_assert_eq!(contract.call_word("add", &args), U256::from(u64::from(a) + u64::from(b)));
        prop_assert_eq!(contract.call_word("div", &args), U256::from(a / b));
        prop_assert_eq!(contract.call_word("rem", &args), U256::from(a % b));
    }
}

#[test]
fn test_ordering_fixed_points() {
    let mut contract = DeployedContract::deploy(COMPARISON);
    let (five, three) = (U256::from(5), U256::from(3));
    assert_eq!(contract.call_word("gt", &[five, three]), U256::from(1));
    assert_eq!(contract.call_word("gt", &[three, five]), U256::ZERO);
    assert_eq!(contract.call_word("lt", &[three, five]), U256::from(1));
    assert_eq!(contract.call_word("lt", &[five, three]), U256::ZERO);
}
