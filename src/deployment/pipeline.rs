use ethers::abi::Token;
use ethers::types::Address;
use eyre::ContextCompat;
use tracing::{error, info, instrument, warn};

use super::DeploymentContext;
use crate::artifacts::ContractArtifact;
use crate::chain::{VerificationOutcome, VerificationRequest};
use crate::contracts;
use crate::ethers_utils::{ContractCall, ProxyBinding};
use crate::forge_utils::ContractSpec;
use crate::report::contract_deployment::{ContractDeployment, TransactionRecord};
use crate::report::{UpgradeRecord, UpgradeableDeployment};
use crate::types::SignerRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PipelineStage {
    Unstarted,
    Validating,
    DeployingImplementation,
    VerifyingImplementation,
    DeployingProxy,
    VerifyingProxy,
    Upgrading,
    Initializing,
    Done,
    Failed,
}

/// A call of an `initialize`-style function through a proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct Initializer {
    pub function: String,
    pub args: Vec<Token>,
}

impl Initializer {
    pub fn new(function: impl ToString, args: Vec<Token>) -> Self {
        Self {
            function: function.to_string(),
            args,
        }
    }
}

/// A fresh implementation behind a fresh transparent proxy.
#[derive(Debug, Clone)]
pub struct UpgradeableContract {
    pub name: String,
    pub implementation: ContractSpec,
    pub constructor_args: Vec<Token>,
    pub initializer: Initializer,
    pub proxy_admin: Address,
    pub proxy_signer: SignerRole,
}

/// A new implementation for an existing proxy.
#[derive(Debug, Clone)]
pub struct ContractUpgrade {
    pub name: String,
    pub proxy: Address,
    pub proxy_admin: Address,
    pub implementation: ContractSpec,
    pub constructor_args: Vec<Token>,
    pub reinitializer: Option<Initializer>,
}

/// One run of the deploy, verify, initialize sequence.
///
/// Verification stages never fail the run. Any other failure moves the
/// pipeline to [`PipelineStage::Failed`] and aborts it.
pub struct Pipeline<'a> {
    context: &'a DeploymentContext,
    name: String,
    stage: PipelineStage,
}

impl<'a> Pipeline<'a> {
    pub fn new(context: &'a DeploymentContext, name: impl ToString) -> Self {
        Self {
            context,
            name: name.to_string(),
            stage: PipelineStage::Unstarted,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    fn enter(&mut self, stage: PipelineStage) {
        info!(contract = %self.name, %stage, "Pipeline stage");
        self.stage = stage;
    }

    fn finish<T>(&mut self, result: eyre::Result<T>) -> eyre::Result<T> {
        match result {
            Ok(value) => {
                self.enter(PipelineStage::Done);
                Ok(value)
            }
            Err(err) => {
                let stage = self.stage;
                self.stage = PipelineStage::Failed;

                error!(contract = %self.name, %stage, "Pipeline failed");

                Err(err.wrap_err(format!("{} failed at stage {stage}", self.name)))
            }
        }
    }

    #[instrument(name = "deploy_upgradeable", skip_all, fields(contract = %contract.name))]
    pub async fn deploy_upgradeable(
        &mut self,
        contract: &UpgradeableContract,
    ) -> eyre::Result<UpgradeableDeployment> {
        let result = self.run_deploy_upgradeable(contract).await;
        self.finish(result)
    }

    async fn run_deploy_upgradeable(
        &mut self,
        contract: &UpgradeableContract,
    ) -> eyre::Result<UpgradeableDeployment> {
        self.enter(PipelineStage::Validating);

        let implementation = self.context.load_artifact(&contract.implementation).await?;
        let proxy = self
            .context
            .load_artifact(&contracts::transparent_proxy())
            .await?;

        // Fails early on a missing or mismatched initializer
        ProxyBinding::new(Address::zero(), implementation.clone())
            .call(&contract.initializer.function, contract.initializer.args.clone())?;

        self.enter(PipelineStage::DeployingImplementation);

        let implementation_deployment = self
            .deploy(SignerRole::ContractAdmin, &implementation, &contract.constructor_args)
            .await?;

        self.enter(PipelineStage::VerifyingImplementation);

        self.verify(
            &implementation,
            implementation_deployment.address,
            &contract.constructor_args,
        )
        .await;

        self.enter(PipelineStage::DeployingProxy);

        if contract.proxy_signer == SignerRole::ContractAdmin {
            warn!(
                contract = %contract.name,
                "Proxy is deployed by the contract admin identity instead of the proxy admin"
            );
        }

        let proxy_args = vec![
            Token::Address(implementation_deployment.address),
            Token::Address(contract.proxy_admin),
            Token::Bytes(vec![]),
        ];

        let proxy_deployment = self
            .deploy(contract.proxy_signer, &proxy, &proxy_args)
            .await?;

        self.enter(PipelineStage::VerifyingProxy);

        self.verify(&proxy, proxy_deployment.address, &proxy_args).await;

        self.enter(PipelineStage::Initializing);

        let binding = ProxyBinding::new(proxy_deployment.address, implementation);
        let call = binding.call(
            &contract.initializer.function,
            contract.initializer.args.clone(),
        )?;

        let initializer =
            send_and_confirm(self.context, SignerRole::ContractAdmin, &call).await?;

        Ok(UpgradeableDeployment {
            implementation: implementation_deployment,
            proxy: proxy_deployment,
            proxy_admin: contract.proxy_admin,
            initializer: Some(initializer),
        })
    }

    #[instrument(name = "upgrade", skip_all, fields(contract = %upgrade.name))]
    pub async fn upgrade(
        &mut self,
        upgrade: &ContractUpgrade,
    ) -> eyre::Result<UpgradeRecord> {
        let result = self.run_upgrade(upgrade).await;
        self.finish(result)
    }

    async fn run_upgrade(
        &mut self,
        upgrade: &ContractUpgrade,
    ) -> eyre::Result<UpgradeRecord> {
        self.enter(PipelineStage::Validating);

        let implementation = self.context.load_artifact(&upgrade.implementation).await?;
        let proxy_admin = self.context.load_artifact(&contracts::proxy_admin()).await?;

        if let Some(reinitializer) = &upgrade.reinitializer {
            ProxyBinding::new(upgrade.proxy, implementation.clone())
                .call(&reinitializer.function, reinitializer.args.clone())?;
        }

        self.enter(PipelineStage::DeployingImplementation);

        let implementation_deployment = self
            .deploy(SignerRole::ContractAdmin, &implementation, &upgrade.constructor_args)
            .await?;

        self.enter(PipelineStage::VerifyingImplementation);

        self.verify(
            &implementation,
            implementation_deployment.address,
            &upgrade.constructor_args,
        )
        .await;

        self.enter(PipelineStage::Upgrading);

        let upgrade_call = ContractCall::builder()
            .artifact(&proxy_admin)
            .function_name("upgrade")
            .args(vec![
                Token::Address(upgrade.proxy),
                Token::Address(implementation_deployment.address),
            ])
            .to(upgrade.proxy_admin)
            .build()?;

        let upgrade_tx =
            send_and_confirm(self.context, SignerRole::ProxyAdmin, &upgrade_call).await?;

        self.enter(PipelineStage::Initializing);

        let reinitializer = match &upgrade.reinitializer {
            Some(reinitializer) => {
                let binding = ProxyBinding::new(upgrade.proxy, implementation);
                let call = binding
                    .call(&reinitializer.function, reinitializer.args.clone())?;

                Some(send_and_confirm(self.context, SignerRole::ContractAdmin, &call).await?)
            }
            None => None,
        };

        Ok(UpgradeRecord {
            target: upgrade.name.clone(),
            proxy: upgrade.proxy,
            implementation: implementation_deployment,
            upgrade: upgrade_tx,
            reinitializer,
        })
    }

    /// Deploys a contract that lives without a proxy.
    #[instrument(name = "deploy_standalone", skip_all, fields(contract = %self.name))]
    pub async fn deploy_standalone(
        &mut self,
        spec: &ContractSpec,
        args: &[Token],
        signer: SignerRole,
    ) -> eyre::Result<ContractDeployment> {
        let result = self.run_deploy_standalone(spec, args, signer).await;
        self.finish(result)
    }

    async fn run_deploy_standalone(
        &mut self,
        spec: &ContractSpec,
        args: &[Token],
        signer: SignerRole,
    ) -> eyre::Result<ContractDeployment> {
        self.enter(PipelineStage::Validating);

        let artifact = self.context.load_artifact(spec).await?;
        artifact.deployment_data(args)?;

        self.enter(PipelineStage::DeployingImplementation);

        let deployment = self.deploy(signer, &artifact, args).await?;

        self.enter(PipelineStage::VerifyingImplementation);

        self.verify(&artifact, deployment.address, args).await;

        Ok(deployment)
    }

    async fn deploy(
        &self,
        signer: SignerRole,
        artifact: &ContractArtifact,
        args: &[Token],
    ) -> eyre::Result<ContractDeployment> {
        let chain = &self.context.chain;

        let tx_hash = chain.deploy_contract(signer, artifact, args).await?;
        let finalized = chain.await_finality(tx_hash).await?;

        let address = finalized.contract_address.with_context(|| {
            format!("No contract address in the receipt of {tx_hash:?}")
        })?;

        info!(
            contract = %artifact.contract_name,
            address = ?address,
            tx_hash = ?tx_hash,
            "Deployed"
        );

        Ok(ContractDeployment {
            contract: artifact.spec().to_string(),
            address,
            transaction_hash: tx_hash,
        })
    }

    async fn verify(
        &self,
        artifact: &ContractArtifact,
        address: Address,
        args: &[Token],
    ) {
        if !self.context.verify_sources {
            info!(contract = %artifact.contract_name, "Source verification disabled");
            return;
        }

        let request = VerificationRequest {
            address,
            contract: artifact.spec(),
            constructor_args: artifact.constructor_args(args),
        };

        match self.context.chain.verify_source(&request).await {
            VerificationOutcome::Verified => {
                info!(contract = %artifact.contract_name, address = ?address, "Verified");
            }
            VerificationOutcome::AlreadyVerified => {
                warn!(
                    contract = %artifact.contract_name,
                    address = ?address,
                    "Contract already verified"
                );
            }
            VerificationOutcome::Failed(reason) => {
                error!(
                    contract = %artifact.contract_name,
                    address = ?address,
                    "Unexpected error during verification: {reason}"
                );
            }
        }
    }
}

/// Submits a call and waits for it to be mined.
pub async fn send_and_confirm(
    context: &DeploymentContext,
    signer: SignerRole,
    call: &ContractCall,
) -> eyre::Result<TransactionRecord> {
    let tx_hash = context.chain.call_contract(signer, call).await?;
    let finalized = context.chain.await_finality(tx_hash).await?;

    let name = format!("{}.{}", call.contract_name, call.function_name());

    info!(call = %name, to = ?call.to, tx_hash = ?tx_hash, "Confirmed");

    Ok(TransactionRecord {
        call: name,
        to: call.to,
        transaction_hash: tx_hash,
        block_number: finalized.block_number,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ethers::types::{H256, U256};

    use super::*;
    use crate::testing::{self, ArtifactFixture, ChainEvent, MockChain};
    use crate::types::Chain;

    fn vesting_wallet(proxy_signer: SignerRole) -> UpgradeableContract {
        UpgradeableContract {
            name: "multi-vesting-wallet".into(),
            implementation: contracts::multi_vesting_wallet(),
            constructor_args: vec![],
            initializer: Initializer::new(
                "initialize",
                vec![Token::Address(Address::from_low_u64_be(0x70c))],
            ),
            proxy_admin: Address::from_low_u64_be(0xad),
            proxy_signer,
        }
    }

    #[tokio::test]
    async fn initializer_targets_the_proxy() {
        let fixture = ArtifactFixture::new();
        let mock = Arc::new(MockChain::new(Chain::Base));
        let context = testing::context(mock.clone(), &fixture);

        let mut pipeline = Pipeline::new(&context, "multi-vesting-wallet");
        let deployment = pipeline
            .deploy_upgradeable(&vesting_wallet(SignerRole::ProxyAdmin))
            .await
            .unwrap();

        assert_eq!(pipeline.stage(), PipelineStage::Done);

        let implementation = mock.deployed_address("MultiVestingWalletCliffV1").unwrap();
        let proxy = mock.deployed_address("TransparentUpgradeableProxy").unwrap();

        assert_eq!(deployment.implementation.address, implementation);
        assert_eq!(deployment.proxy.address, proxy);
        assert_ne!(implementation, proxy);

        let events = mock.events();

        assert_eq!(
            events,
            vec![
                ChainEvent::Deploy {
                    role: SignerRole::ContractAdmin,
                    contract: "MultiVestingWalletCliffV1".into(),
                    args: vec![],
                    tx_hash: H256::from_low_u64_be(1),
                },
                ChainEvent::AwaitFinality {
                    tx_hash: H256::from_low_u64_be(1)
                },
                ChainEvent::Verify {
                    address: implementation,
                    contract: "MultiVestingWalletCliffV1".into(),
                },
                ChainEvent::Deploy {
                    role: SignerRole::ProxyAdmin,
                    contract: "TransparentUpgradeableProxy".into(),
                    args: vec![
                        Token::Address(implementation),
                        Token::Address(Address::from_low_u64_be(0xad)),
                        Token::Bytes(vec![]),
                    ],
                    tx_hash: H256::from_low_u64_be(2),
                },
                ChainEvent::AwaitFinality {
                    tx_hash: H256::from_low_u64_be(2)
                },
                ChainEvent::Verify {
                    address: proxy,
                    contract: "TransparentUpgradeableProxy".into(),
                },
                ChainEvent::Call {
                    role: SignerRole::ContractAdmin,
                    to: proxy,
                    contract: "MultiVestingWalletCliffV1".into(),
                    function: "initialize".into(),
                    args: vec![Token::Address(Address::from_low_u64_be(0x70c))],
                    tx_hash: H256::from_low_u64_be(3),
                },
                ChainEvent::AwaitFinality {
                    tx_hash: H256::from_low_u64_be(3)
                },
            ]
        );

        assert_eq!(
            deployment.initializer.unwrap().call,
            "MultiVestingWalletCliffV1.initialize"
        );
    }

    #[tokio::test]
    async fn already_verified_still_initializes() {
        let fixture = ArtifactFixture::new();
        let mock = Arc::new(
            MockChain::new(Chain::Base)
                .with_verification(VerificationOutcome::AlreadyVerified),
        );
        let context = testing::context(mock.clone(), &fixture);

        let mut pipeline = Pipeline::new(&context, "multi-vesting-wallet");
        pipeline
            .deploy_upgradeable(&vesting_wallet(SignerRole::ProxyAdmin))
            .await
            .unwrap();

        assert_eq!(pipeline.stage(), PipelineStage::Done);
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn failed_verification_still_initializes() {
        let fixture = ArtifactFixture::new();
        let mock = Arc::new(MockChain::new(Chain::ZkSync).with_verification(
            VerificationOutcome::Failed("explorer unavailable".into()),
        ));
        let context = testing::context(mock.clone(), &fixture);

        let mut pipeline = Pipeline::new(&context, "multi-vesting-wallet");
        pipeline
            .deploy_upgradeable(&vesting_wallet(SignerRole::ContractAdmin))
            .await
            .unwrap();

        assert_eq!(pipeline.stage(), PipelineStage::Done);
        assert!(matches!(
            mock.calls().as_slice(),
            [ChainEvent::Call { function, .. }] if function == "initialize"
        ));
    }

    #[tokio::test]
    async fn disabled_verification_is_skipped() {
        let fixture = ArtifactFixture::new();
        let mock = Arc::new(MockChain::new(Chain::Base));
        let context = DeploymentContext::new(
            mock.clone(),
            fixture.store(),
            false,
            crate::report::Report::new(Chain::Base),
        );

        Pipeline::new(&context, "multi-vesting-wallet")
            .deploy_upgradeable(&vesting_wallet(SignerRole::ProxyAdmin))
            .await
            .unwrap();

        assert!(!mock
            .events()
            .iter()
            .any(|event| matches!(event, ChainEvent::Verify { .. })));
    }

    #[tokio::test]
    async fn reverted_implementation_deploy_fails_before_initializing() {
        let fixture = ArtifactFixture::new();
        let mock = Arc::new(
            MockChain::new(Chain::Base).reverting_deploy("MultiVestingWalletCliffV1"),
        );
        let context = testing::context(mock.clone(), &fixture);

        let mut pipeline = Pipeline::new(&context, "multi-vesting-wallet");
        let err = pipeline
            .deploy_upgradeable(&vesting_wallet(SignerRole::ProxyAdmin))
            .await
            .unwrap_err();

        assert_eq!(pipeline.stage(), PipelineStage::Failed);
        assert!(err
            .to_string()
            .contains("failed at stage deploying-implementation"));
        assert_eq!(mock.submissions(), 1);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn reverted_initializer_fails_the_run() {
        let fixture = ArtifactFixture::new();
        let mock = Arc::new(MockChain::new(Chain::Base).reverting_call("initialize"));
        let context = testing::context(mock.clone(), &fixture);

        let mut pipeline = Pipeline::new(&context, "multi-vesting-wallet");
        let err = pipeline
            .deploy_upgradeable(&vesting_wallet(SignerRole::ProxyAdmin))
            .await
            .unwrap_err();

        assert_eq!(pipeline.stage(), PipelineStage::Failed);
        assert!(err.to_string().contains("initializing"));
    }

    #[tokio::test]
    async fn unknown_initializer_fails_before_any_transaction() {
        let fixture = ArtifactFixture::new();
        let mock = Arc::new(MockChain::new(Chain::Base));
        let context = testing::context(mock.clone(), &fixture);

        let mut contract = vesting_wallet(SignerRole::ProxyAdmin);
        contract.initializer = Initializer::new("initializeV9", vec![]);

        let mut pipeline = Pipeline::new(&context, "multi-vesting-wallet");
        let err = pipeline.deploy_upgradeable(&contract).await.unwrap_err();

        assert!(err.to_string().contains("validating"));
        assert!(mock.events().is_empty());
    }

    #[tokio::test]
    async fn upgrade_reinitializes_through_the_existing_proxy() {
        let fixture = ArtifactFixture::new();
        let mock = Arc::new(MockChain::new(Chain::ZkSync));
        let context = testing::context(mock.clone(), &fixture);

        let old_proxy = Address::from_low_u64_be(0x0bad);
        let proxy_admin = Address::from_low_u64_be(0xad);

        let upgrade = ContractUpgrade {
            name: "governor-v2".into(),
            proxy: old_proxy,
            proxy_admin,
            implementation: contracts::governor_v2(),
            constructor_args: vec![],
            reinitializer: Some(Initializer::new(
                "initializeV2",
                vec![
                    Token::Uint(U256::from(1)),
                    Token::Uint(U256::from(50_400)),
                    Token::Uint(U256::exp10(21)),
                    Token::Uint(U256::from(4)),
                ],
            )),
        };

        let record = Pipeline::new(&context, "governor-v2")
            .upgrade(&upgrade)
            .await
            .unwrap();

        let new_implementation = mock.deployed_address("TevaGovernorV2").unwrap();

        assert_eq!(record.proxy, old_proxy);
        assert_eq!(record.implementation.address, new_implementation);

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);

        match &calls[0] {
            ChainEvent::Call {
                role,
                to,
                function,
                args,
                ..
            } => {
                assert_eq!(*role, SignerRole::ProxyAdmin);
                assert_eq!(*to, proxy_admin);
                assert_eq!(function, "upgrade");
                assert_eq!(
                    args,
                    &vec![
                        Token::Address(old_proxy),
                        Token::Address(new_implementation)
                    ]
                );
            }
            other => panic!("unexpected event {other:?}"),
        }

        match &calls[1] {
            ChainEvent::Call {
                role, to, function, ..
            } => {
                assert_eq!(*role, SignerRole::ContractAdmin);
                assert_eq!(*to, old_proxy);
                assert_ne!(*to, new_implementation);
                assert_eq!(function, "initializeV2");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn standalone_deploy() {
        let fixture = ArtifactFixture::new();
        let mock = Arc::new(MockChain::new(Chain::Base));
        let context = testing::context(mock.clone(), &fixture);

        let owner = testing::proxy_admin();

        let mut pipeline = Pipeline::new(&context, "proxy-admin");
        let deployment = pipeline
            .deploy_standalone(
                &contracts::proxy_admin(),
                &[Token::Address(owner)],
                SignerRole::ProxyAdmin,
            )
            .await
            .unwrap();

        assert_eq!(pipeline.stage(), PipelineStage::Done);
        assert_eq!(deployment.contract, "contracts/proxy/ProxyAdmin.sol:ProxyAdmin");
        assert_eq!(deployment.address, MockChain::address_of(1));
        assert!(mock.calls().is_empty());
    }
}
