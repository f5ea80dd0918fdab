use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::{Address, Bytes, H256};

use crate::artifacts::ContractArtifact;
use crate::config::NetworkConfig;
use crate::ethers_utils::ContractCall;
use crate::forge_utils::ContractSpec;
use crate::types::{Chain, SignerRole};

pub mod evm;
pub mod zksync;

pub use self::evm::EvmChain;
pub use self::zksync::ZkSyncChain;

/// What the deployment pipeline needs from a chain.
///
/// Submissions return as soon as the transaction is accepted by the node,
/// callers are expected to [`ChainAdapter::await_finality`] before
/// submitting the next transaction from the same identity.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    fn chain(&self) -> Chain;

    fn signer_address(&self, role: SignerRole) -> eyre::Result<Address>;

    async fn deploy_contract(
        &self,
        role: SignerRole,
        artifact: &ContractArtifact,
        args: &[Token],
    ) -> eyre::Result<H256>;

    async fn call_contract(
        &self,
        role: SignerRole,
        call: &ContractCall,
    ) -> eyre::Result<H256>;

    /// Read-only call, nothing is submitted.
    async fn query_contract(&self, call: &ContractCall) -> eyre::Result<Vec<Token>>;

    /// Waits for the transaction to be mined. Fails if it reverted or was
    /// dropped.
    async fn await_finality(&self, tx_hash: H256) -> eyre::Result<FinalizedTx>;

    /// Never fails, a verifier problem is reported as
    /// [`VerificationOutcome::Failed`].
    async fn verify_source(
        &self,
        request: &VerificationRequest,
    ) -> VerificationOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizedTx {
    pub tx_hash: H256,
    pub block_number: Option<u64>,
    pub contract_address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    pub address: Address,
    pub contract: ContractSpec,
    pub constructor_args: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    AlreadyVerified,
    Failed(String),
}

impl VerificationOutcome {
    /// Classifies the result of a verifier run by its exit status and
    /// output.
    pub fn classify(success: bool, output: &str) -> Self {
        if output.to_lowercase().contains("already verified") {
            return VerificationOutcome::AlreadyVerified;
        }

        if success {
            VerificationOutcome::Verified
        } else {
            VerificationOutcome::Failed(output.trim().to_string())
        }
    }
}

/// Run-wide settings of the chain adapters.
#[derive(Debug, Clone)]
pub struct ChainOptions {
    pub confirmations: usize,
    pub contracts_root: PathBuf,
}

pub async fn connect(
    config: &NetworkConfig,
    options: &ChainOptions,
) -> eyre::Result<Arc<dyn ChainAdapter>> {
    let evm = EvmChain::connect(config, options).await?;

    let adapter: Arc<dyn ChainAdapter> = match config.chain {
        Chain::Base => Arc::new(evm),
        Chain::ZkSync => Arc::new(ZkSyncChain::new(evm, config, options)),
    };

    Ok(adapter)
}
