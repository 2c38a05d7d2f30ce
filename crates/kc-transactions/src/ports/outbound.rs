//! Outbound (Driven) ports for the transaction core.
//!
//! The state store and the virtual machine live outside this crate; variants
//! reach them only through these traits.

use crate::domain::{AccountKey, TxResult, VmError};
use crate::params::CodeFormat;
use shared_types::{Address, U256};

/// Read-only access to installed account keys.
pub trait AccountKeyPicker: Send + Sync {
    /// The key installed on `address`; accounts that do not exist yet carry
    /// a legacy key.
    fn get_key(&self, address: &Address) -> AccountKey;

    fn exist(&self, address: &Address) -> bool;
}

/// Account state consulted by validation and mutated by execution.
pub trait StateDb: AccountKeyPicker {
    fn inc_nonce(&mut self, address: &Address);

    /// Creates an externally owned account with `key` installed.
    fn create_eoa(&mut self, address: &Address, human_readable: bool, key: AccountKey);

    /// Replaces the key of `address`; the new key was already checked with
    /// [`crate::domain::check_replaceable`].
    fn update_key(&mut self, address: &Address, key: &AccountKey, block_number: u64) -> TxResult<()>;

    /// Accounts that hold code, deployed or not.
    fn is_program_account(&self, address: &Address) -> bool;

    /// Program accounts whose code can currently be executed.
    fn is_contract_available(&self, address: &Address) -> bool;
}

/// Who pays for and signs an execution.
pub trait ContractRef {
    fn address(&self) -> Address;

    /// Account charged for gas; the sender unless delegated.
    fn fee_payer(&self) -> Address {
        self.address()
    }
}

/// Sender reference built from validated sender and fee payer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountRef {
    pub sender: Address,
    pub fee_payer: Address,
}

impl AccountRef {
    pub fn new(sender: Address) -> Self {
        Self {
            sender,
            fee_payer: sender,
        }
    }

    pub fn with_fee_payer(sender: Address, fee_payer: Address) -> Self {
        Self { sender, fee_payer }
    }
}

impl ContractRef for AccountRef {
    fn address(&self) -> Address {
        self.sender
    }

    fn fee_payer(&self) -> Address {
        self.fee_payer
    }
}

/// Result of a message call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallOutput {
    pub ret: Vec<u8>,
    pub left_over_gas: u64,
}

/// Result of a contract creation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateOutput {
    pub ret: Vec<u8>,
    pub address: Address,
    pub left_over_gas: u64,
}

/// The EVM as seen from transaction execution.
pub trait Vm {
    fn call(
        &mut self,
        caller: &dyn ContractRef,
        to: &Address,
        input: &[u8],
        gas: u64,
        value: U256,
    ) -> Result<CallOutput, VmError>;

    fn create(
        &mut self,
        caller: &dyn ContractRef,
        code: &[u8],
        gas: u64,
        value: U256,
        code_format: CodeFormat,
    ) -> Result<CreateOutput, VmError>;

    #[allow(clippy::too_many_arguments)]
    fn create_with_address(
        &mut self,
        caller: &dyn ContractRef,
        code: &[u8],
        gas: u64,
        value: U256,
        address: &Address,
        human_readable: bool,
        code_format: CodeFormat,
    ) -> Result<CreateOutput, VmError>;
}
