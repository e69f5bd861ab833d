//! In-memory revm chain for deploying compiled contracts and calling them.

use revm::{
    Evm, InMemoryDB,
    primitives::{
        AccountInfo, Address, Bytes, ExecutionResult, KECCAK_EMPTY, Output, TransactTo, U256,
        address,
    },
};

/// Default gas limit for tests
pub const TEST_GAS_LIMIT: u64 = 1_000_000;

/// Default ETH balance for the caller (1 ETH in wei)
pub const TEST_ETH_BALANCE: u64 = 1_000_000_000_000_000_000;

pub const TEST_CALLER: Address = address!("9000000000000000000000000000000000000000");

/// Result of a call that reached the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Success { output: Vec<u8>, gas_used: u64 },
    Revert { output: Vec<u8> },
    Halt { reason: String },
}

impl CallOutcome {
    /// The first returned word, if the call succeeded with at least 32 bytes.
    pub fn word(&self) -> Option<U256> {
        match self {
            CallOutcome::Success { output, .. } if output.len() >= 32 => {
                Some(U256::from_be_slice(&output[..32]))
            }
            _ => None,
        }
    }

    /// Returned or revert data; empty for a halt.
    pub fn output(&self) -> &[u8] {
        match self {
            CallOutcome::Success { output, .. } | CallOutcome::Revert { output } => output,
            CallOutcome::Halt { .. } => &[],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success { .. })
    }

    pub fn is_revert(&self) -> bool {
        matches!(self, CallOutcome::Revert { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    /// Code returned by the init segment
    pub runtime: Vec<u8>,
}

/// Selector followed by one 32-byte word per argument.
pub fn calldata(selector: [u8; 4], args: &[U256]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 32 * args.len());
    data.extend_from_slice(&selector);
    for arg in args {
        data.extend_from_slice(&arg.to_be_bytes::<32>());
    }
    data
}

/// An address as a left-padded word.
pub fn address_word(address: Address) -> U256 {
    U256::from_be_slice(address.as_slice())
}

/// A single funded caller on an otherwise empty chain. State persists
/// across deployments and calls.
pub struct TestChain {
    evm: Evm<'static, (), InMemoryDB>,
}

impl Default for TestChain {
    fn default() -> Self {
        Self::new()
    }
}

impl TestChain {
    pub fn new() -> Self {
        let mut db = InMemoryDB::default();
        db.insert_account_info(
            TEST_CALLER,
            AccountInfo {
                balance: U256::from(TEST_ETH_BALANCE),
                nonce: 0,
                code_hash: KECCAK_EMPTY,
                code: None,
            },
        );

        let evm = Evm::builder()
            .with_db(db)
            .modify_tx_env(|tx| {
                tx.caller = TEST_CALLER;
                tx.gas_limit = TEST_GAS_LIMIT;
                tx.gas_price = U256::from(1);
                tx.value = U256::ZERO;
            })
            .build();
        Self { evm }
    }

    pub fn caller(&self) -> Address {
        TEST_CALLER
    }

    /// Run `bytecode` as init code and return the created account.
    pub fn deploy(&mut self, bytecode: &[u8]) -> Result<Deployment, String> {
        let tx = self.evm.tx_mut();
        tx.transact_to = TransactTo::Create;
        tx.data = Bytes::copy_from_slice(bytecode);
        tx.value = U256::ZERO;

        let result = self.evm.transact_commit().map_err(|e| format!("Execution error: {e:?}"))?;
        match result {
            ExecutionResult::Success { output: Output::Create(runtime, Some(address)), .. } => {
                Ok(Deployment { address, runtime: runtime.to_vec() })
            }
            other => Err(format!("Deployment failed: {other:?}")),
        }
    }

    pub fn call(&mut self, to: Address, data: Vec<u8>) -> Result<CallOutcome, String> {
        self.call_with_value(to, data, U256::ZERO)
    }

    pub fn call_with_value(
        &mut self,
        to: Address,
        data: Vec<u8>,
        value: U256,
    ) -> Result<CallOutcome, String> {
        let tx = self.evm.tx_mut();
        tx.transact_to = TransactTo::Call(to);
        tx.data = data.into();
        tx.value = value;

        let result = self.evm.transact_commit().map_err(|e| format!("Execution error: {e:?}"))?;
        Ok(match result {
            ExecutionResult::Success { output, gas_used, .. } => {
                CallOutcome::Success { output: output.into_data().to_vec(), gas_used }
            }
            ExecutionResult::Revert { output, .. } => CallOutcome::Revert { output: output.to_vec() },
            ExecutionResult::Halt { reason, .. } => CallOutcome::Halt { reason: format!("{reason:?}") },
        })
    }

    pub fn set_block_number(&mut self, number: u64) {
        self.evm.block_mut().number = U256::from(number);
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.evm.block_mut().timestamp = U256::from(timestamp);
    }
}
