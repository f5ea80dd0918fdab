use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::prelude::SignerMiddleware;
use ethers::providers::{Http, Middleware, PendingTransaction, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Eip1559TransactionRequest, H256};
use eyre::{bail, Context, ContextCompat};
use tracing::{info, instrument};

use super::{
    ChainAdapter, ChainOptions, FinalizedTx, VerificationOutcome,
    VerificationRequest,
};
use crate::artifacts::ContractArtifact;
use crate::config::{NetworkConfig, VerifierConfig, PROXY_ADMIN_WALLET_PK};
use crate::ethers_utils::ContractCall;
use crate::forge_utils::ForgeVerify;
use crate::types::{Chain, SignerRole};

pub type RpcSigner = SignerMiddleware<Arc<Provider<Http>>, LocalWallet>;

/// A chain reached over plain JSON-RPC with locally signed EIP-1559
/// transactions.
pub struct EvmChain {
    chain: Chain,
    chain_id: u64,
    provider: Arc<Provider<Http>>,
    contract_admin: RpcSigner,
    proxy_admin: Option<RpcSigner>,
    confirmations: usize,
    verifier: Option<SourceVerifier>,
}

impl EvmChain {
    pub async fn connect(
        config: &NetworkConfig,
        options: &ChainOptions,
    ) -> eyre::Result<Self> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .with_context(|| format!("Connecting to {}", config.rpc_url))?;
        let provider = Arc::new(provider);

        let chain_id = provider
            .get_chainid()
            .await
            .context("Fetching chain id")?
            .as_u64();

        info!(chain = %config.chain, chain_id, "Connected");

        let signer = |wallet: LocalWallet| {
            SignerMiddleware::new(provider.clone(), wallet.with_chain_id(chain_id))
        };

        let contract_admin = signer(config.contract_admin_key.wallet());
        let proxy_admin = config
            .proxy_admin_key
            .as_ref()
            .map(|key| signer(key.wallet()));

        let verifier = config.verifier.clone().map(|verifier| SourceVerifier {
            root: options.contracts_root.clone(),
            chain_id,
            config: verifier,
            zksync: config.chain == Chain::ZkSync,
        });

        Ok(Self {
            chain: config.chain,
            chain_id,
            provider,
            contract_admin,
            proxy_admin,
            confirmations: options.confirmations,
            verifier,
        })
    }

    fn signer(&self, role: SignerRole) -> eyre::Result<&RpcSigner> {
        match role {
            SignerRole::ContractAdmin => Ok(&self.contract_admin),
            SignerRole::ProxyAdmin => self
                .proxy_admin
                .as_ref()
                .with_context(|| format!("{PROXY_ADMIN_WALLET_PK} is not configured")),
        }
    }

    async fn send(
        &self,
        role: SignerRole,
        tx: Eip1559TransactionRequest,
    ) -> eyre::Result<H256> {
        let signer = self.signer(role)?;

        let mut tx = TypedTransaction::Eip1559(tx);

        signer.fill_transaction(&mut tx, None).await?;

        let pending = signer
            .send_transaction(tx, None)
            .await
            .context("Send transaction")?;

        Ok(pending.tx_hash())
    }
}

#[async_trait]
impl ChainAdapter for EvmChain {
    fn chain(&self) -> Chain {
        self.chain
    }

    fn signer_address(&self, role: SignerRole) -> eyre::Result<Address> {
        Ok(self.signer(role)?.address())
    }

    #[instrument(skip_all, fields(contract = %artifact.contract_name, role = %role))]
    async fn deploy_contract(
        &self,
        role: SignerRole,
        artifact: &ContractArtifact,
        args: &[Token],
    ) -> eyre::Result<H256> {
        let data = artifact.deployment_data(args)?;

        self.send(role, Eip1559TransactionRequest::new().data(data))
            .await
            .with_context(|| format!("Deploying {}", artifact.contract_name))
    }

    #[instrument(skip_all, fields(contract = %call.contract_name, function = %call.function_name(), role = %role))]
    async fn call_contract(
        &self,
        role: SignerRole,
        call: &ContractCall,
    ) -> eyre::Result<H256> {
        let data = call.calldata()?;

        self.send(role, Eip1559TransactionRequest::new().to(call.to).data(data))
            .await
            .with_context(|| {
                format!("Calling {}.{}", call.contract_name, call.function_name())
            })
    }

    async fn query_contract(&self, call: &ContractCall) -> eyre::Result<Vec<Token>> {
        let tx = TypedTransaction::Eip1559(
            Eip1559TransactionRequest::new()
                .to(call.to)
                .data(call.calldata()?),
        );

        let output = self.provider.call(&tx, None).await.with_context(|| {
            format!("Querying {}.{}", call.contract_name, call.function_name())
        })?;

        call.decode_output(&output)
    }

    async fn await_finality(&self, tx_hash: H256) -> eyre::Result<FinalizedTx> {
        let receipt = PendingTransaction::new(tx_hash, self.provider.as_ref())
            .confirmations(self.confirmations)
            .await
            .context("Awaiting receipt")?
            .with_context(|| format!("Transaction {tx_hash:?} was dropped"))?;

        if receipt.status != Some(1.into()) {
            bail!("Transaction {tx_hash:?} reverted");
        }

        Ok(FinalizedTx {
            tx_hash,
            block_number: receipt.block_number.map(|block| block.as_u64()),
            contract_address: receipt.contract_address,
        })
    }

    async fn verify_source(
        &self,
        request: &VerificationRequest,
    ) -> VerificationOutcome {
        match &self.verifier {
            Some(verifier) => verifier.verify(request).await,
            None => VerificationOutcome::Failed(format!(
                "no source verifier configured for {}",
                self.chain
            )),
        }
    }
}

/// Source verification through `forge verify-contract`.
#[derive(Debug, Clone)]
pub struct SourceVerifier {
    root: PathBuf,
    chain_id: u64,
    config: VerifierConfig,
    zksync: bool,
}

impl SourceVerifier {
    pub async fn verify(&self, request: &VerificationRequest) -> VerificationOutcome {
        let result = ForgeVerify::new(request.contract.clone(), request.address)
            .with_root(&self.root)
            .with_chain(self.chain_id)
            .with_etherscan_api_key(self.config.api_key.as_ref())
            .with_verifier_url(self.config.verifier_url.as_ref())
            .with_constructor_args(request.constructor_args.clone())
            .with_zksync(self.zksync)
            .run()
            .await;

        match result {
            Ok(output) => VerificationOutcome::classify(output.success, &output.output),
            Err(err) => VerificationOutcome::Failed(format!("{err:#}")),
        }
    }
}
