use ethers::abi::Token;
use ethers::types::{Address, H256, U256};
use tracing::instrument;

use super::TEVA_TOKEN_CONTRACT;
use crate::config::{ConfigError, EnvReader};
use crate::contracts;
use crate::deployment::pipeline::{Initializer, UpgradeableContract};
use crate::deployment::DeploymentContext;
use crate::forge_utils::ContractSpec;
use crate::report::UpgradeableDeployment;
use crate::types::{Chain, SignerRole, UnixTimestamp};

pub const CLAIM_START_TIME: &str = "CLAIM_START_TIME";
pub const CLAIM_END_TIME: &str = "CLAIM_END_TIME";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum DistributorKind {
    Community,
    Investor,
}

impl DistributorKind {
    pub fn merkle_root_key(self) -> &'static str {
        match self {
            DistributorKind::Community => "COMMUNITY_MERKEL_ROOT",
            DistributorKind::Investor => "INVESTOR_MERKEL_ROOT",
        }
    }

    pub fn max_claimable_key(self) -> &'static str {
        match self {
            DistributorKind::Community => "COMMUNITY_MAX_CLAIMABLE_LIMIT",
            DistributorKind::Investor => "INVESTOR_MAX_CLAIMABLE_LIMIT",
        }
    }

    /// Key of the proxy address, used when upgrading.
    pub fn contract_address_key(self) -> &'static str {
        match self {
            DistributorKind::Community => {
                "TEVA_COMMUNITY_MERKLE_DISTRIBUTOR_CONTRACT_ADDRESS"
            }
            DistributorKind::Investor => {
                "TEVA_INVESTOR_MERKLE_DISTRIBUTOR_CONTRACT_ADDRESS"
            }
        }
    }

    pub fn implementation(self) -> ContractSpec {
        match self {
            DistributorKind::Community => contracts::merkle_distributor_v1(),
            DistributorKind::Investor => contracts::merkle_distributor_v2(),
        }
    }

    pub fn report_name(self) -> String {
        format!("{self}-merkle-distributor")
    }

    /// Base deploys these proxies from the contract admin.
    pub fn default_proxy_signer(chain: Chain) -> SignerRole {
        match chain {
            Chain::Base => SignerRole::ContractAdmin,
            Chain::ZkSync => SignerRole::ProxyAdmin,
        }
    }
}

/// The claim parameters shared by `initialize` and `initializeV2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSettings {
    pub merkle_root: H256,
    /// Smallest units
    pub max_claimable: U256,
    pub claim_start: UnixTimestamp,
    pub claim_end: UnixTimestamp,
}

impl ClaimSettings {
    pub fn from_env(
        env: &EnvReader,
        kind: DistributorKind,
    ) -> Result<Self, ConfigError> {
        let merkle_root = env.bytes32(kind.merkle_root_key())?;
        let max_claimable = env.token_amount(kind.max_claimable_key())?;
        let claim_start = env.unix_timestamp(CLAIM_START_TIME)?;
        let claim_end = env.unix_timestamp(CLAIM_END_TIME)?;

        if claim_start >= claim_end {
            return Err(ConfigError::Invalid {
                key: CLAIM_END_TIME.to_string(),
                reason: format!(
                    "claim window ends at {claim_end}, not after its start {claim_start}"
                ),
            });
        }

        Ok(Self {
            merkle_root,
            max_claimable,
            claim_start,
            claim_end,
        })
    }

    pub fn tokens(&self) -> Vec<Token> {
        vec![
            Token::FixedBytes(self.merkle_root.as_bytes().to_vec()),
            Token::Uint(self.max_claimable),
            Token::Uint(self.claim_start.0.into()),
            Token::Uint(self.claim_end.0.into()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleDistributorParams {
    pub kind: DistributorKind,
    pub proxy_admin: Address,
    pub token: Address,
    pub claim: ClaimSettings,
}

impl MerkleDistributorParams {
    pub fn from_env(
        env: &EnvReader,
        chain: Chain,
        kind: DistributorKind,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            kind,
            proxy_admin: super::proxy_admin_contract(env, chain)?,
            token: env.address(TEVA_TOKEN_CONTRACT)?,
            claim: ClaimSettings::from_env(env, kind)?,
        })
    }
}

#[instrument(skip_all, fields(kind = %params.kind))]
pub async fn deploy(
    context: &DeploymentContext,
    params: &MerkleDistributorParams,
    proxy_signer: Option<SignerRole>,
) -> eyre::Result<UpgradeableDeployment> {
    let chain = context.chain.chain();

    let mut args = vec![Token::Address(params.token)];
    args.extend(params.claim.tokens());

    let contract = UpgradeableContract {
        name: params.kind.report_name(),
        implementation: params.kind.implementation(),
        constructor_args: vec![],
        initializer: Initializer::new("initialize", args),
        proxy_admin: params.proxy_admin,
        proxy_signer: proxy_signer
            .unwrap_or_else(|| DistributorKind::default_proxy_signer(chain)),
    };

    super::deploy_upgradeable(context, contract).await
}
