use ethers::types::{Address, H256};
use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ContractDeployment {
    /// Fully qualified contract name.
    pub contract: String,
    pub address: Address,
    pub transaction_hash: H256,
}

/// A confirmed state-changing call.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct TransactionRecord {
    /// `Contract.function`
    pub call: String,
    pub to: Address,
    pub transaction_hash: H256,
    #[serde(default)]
    pub block_number: Option<u64>,
}
