use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::{Address, H256};
use eyre::ContextCompat;
use tokio::sync::Mutex;
use tracing::info;

use super::{
    ChainAdapter, ChainOptions, EvmChain, FinalizedTx, VerificationOutcome,
    VerificationRequest,
};
use crate::artifacts::ContractArtifact;
use crate::cli::PrivateKey;
use crate::config::{NetworkConfig, PROXY_ADMIN_WALLET_PK};
use crate::ethers_utils::ContractCall;
use crate::forge_utils::ForgeCreate;
use crate::types::{Chain, SignerRole};

/// zkSync Era. Contract creation needs the zk compiler and the
/// `ContractDeployer` system contract, so it goes through
/// `forge create --zksync`. Everything else is plain JSON-RPC.
pub struct ZkSyncChain {
    inner: EvmChain,
    network: NetworkConfig,
    contracts_root: PathBuf,
    created: Mutex<HashMap<H256, Address>>,
}

impl ZkSyncChain {
    pub fn new(
        inner: EvmChain,
        config: &NetworkConfig,
        options: &ChainOptions,
    ) -> Self {
        Self {
            inner,
            network: config.clone(),
            contracts_root: options.contracts_root.clone(),
            created: Mutex::new(HashMap::new()),
        }
    }

    fn key(&self, role: SignerRole) -> eyre::Result<&PrivateKey> {
        self.network
            .key(role)
            .with_context(|| format!("{PROXY_ADMIN_WALLET_PK} is not configured"))
    }
}

#[async_trait]
impl ChainAdapter for ZkSyncChain {
    fn chain(&self) -> Chain {
        Chain::ZkSync
    }

    fn signer_address(&self, role: SignerRole) -> eyre::Result<Address> {
        self.inner.signer_address(role)
    }

    async fn deploy_contract(
        &self,
        role: SignerRole,
        artifact: &ContractArtifact,
        args: &[Token],
    ) -> eyre::Result<H256> {
        let mut create = ForgeCreate::new(artifact.spec())
            .with_root(&self.contracts_root)
            .with_rpc_url(&self.network.rpc_url)
            .with_private_key(self.key(role)?.clone())
            .with_zksync(true);

        for arg in args {
            create = create.with_constructor_arg(cli_arg(arg));
        }

        let output = create.run().await?;

        info!(
            contract = %artifact.contract_name,
            address = ?output.deployed_to,
            "Created through forge"
        );

        self.created
            .lock()
            .await
            .insert(output.transaction_hash, output.deployed_to);

        Ok(output.transaction_hash)
    }

    async fn call_contract(
        &self,
        role: SignerRole,
        call: &ContractCall,
    ) -> eyre::Result<H256> {
        self.inner.call_contract(role, call).await
    }

    async fn query_contract(&self, call: &ContractCall) -> eyre::Result<Vec<Token>> {
        self.inner.query_contract(call).await
    }

    async fn await_finality(&self, tx_hash: H256) -> eyre::Result<FinalizedTx> {
        let mut finalized = self.inner.await_finality(tx_hash).await?;

        if let Some(address) = self.created.lock().await.get(&tx_hash) {
            finalized.contract_address = Some(*address);
        }

        Ok(finalized)
    }

    async fn verify_source(
        &self,
        request: &VerificationRequest,
    ) -> VerificationOutcome {
        self.inner.verify_source(request).await
    }
}

/// Renders an ABI value the way `forge --constructor-args` parses it.
pub fn cli_arg(token: &Token) -> String {
    match token {
        Token::Address(address) => format!("{address:?}"),
        Token::Uint(value) | Token::Int(value) => value.to_string(),
        Token::Bool(value) => value.to_string(),
        Token::String(value) => value.clone(),
        Token::Bytes(bytes) | Token::FixedBytes(bytes) => {
            format!("0x{}", hex::encode(bytes))
        }
        Token::Array(items) | Token::FixedArray(items) | Token::Tuple(items) => {
            let items: Vec<_> = items.iter().map(cli_arg).collect();
            let (open, close) = if matches!(token, Token::Tuple(_)) {
                ("(", ")")
            } else {
                ("[", "]")
            };

            format!("{open}{}{close}", items.join(","))
        }
    }
}
