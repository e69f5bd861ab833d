/// Common test values
pub const TEST_VALUE_SMALL: u64 = 42;
pub const TEST_VALUE_MEDIUM: u64 = 100;
/// 2^8, crosses the one-byte push boundary
pub const TEST_VALUE_LARGE: u64 = 256;
pub const TEST_STORAGE_VALUE: u64 = 1337;

/// Common arithmetic test operands
pub const TEST_OPERAND_A: u64 = 10;
pub const TEST_OPERAND_B: u64 = 3;

/// Standard test values for binary operations
pub const BINARY_OP_TEST_CASES: [(u64, u64); 5] =
    [(10, 20), (0, 0), (u64::MAX, 1), (100, 0), (0, 100)];

pub const SIMPLE_STORAGE: &str = r#"
class SimpleStorage(PySmartContract):
    def __init__(self):
        self.value = 0

    @public
    def set(self, new_value: int):
        self.value = new_value

    @view
    def get(self) -> int:
        return self.value
"#;

pub const TOKEN: &str = r#"
class Token(PySmartContract):
    def __init__(self):
        self.owner = self.msg_sender()
        self.total_supply = 1000
        self.balances = {}
        self.symbol = "TOK"

    @public
    def mint(self, to: str, amount: int):
        self.require(amount > 0, "amount must be positive")
        self.balances[to] += amount
        self.total_supply += amount
        self.event("Mint", to, amount)

    @public
    def transfer(self, to: str, amount: int) -> int:
        self.require(self.balances[self.msg_sender()] >= amount)
        self.balances[self.msg_sender()] -= amount
        self.balances[to] += amount
        return 1

    @view
    def balanceOf(self, who: str) -> int:
        return self.balances.get(who, 0)

    @view
    def totalSupply(self) -> int:
        return self.total_supply

    @view
    def getSymbol(self) -> int:
        return self.symbol
"#;

pub const BRANCHES: &str = r#"
class Branches(PySmartContract):
    def __init__(self):
        self.last = 0

    @view
    def classify(self, x: int) -> int:
        if x < 10:
            return 1
        elif x < 100:
            return 2
        else:
            return 3

    @public
    def record(self, x: int):
        if x == 0:
            raise ValueError("zero")
        self.last = x

    @view
    def last_value(self) -> int:
        return self.last

    @view
    def above_five(self, x: int) -> int:
        if x > 5:
            return x
"#;

pub const ENVIRONMENT: &str = r#"
class Environment(PySmartContract):
    @view
    def sender(self) -> int:
        return self.msg_sender()

    @view
    def height(self) -> int:
        return self.block_number()

    @view
    def now(self) -> int:
        return self.block_timestamp()

    @public
    def paid(self) -> int:
        return self.msg_value()
"#;
