use ethers::abi::Token;
use ethers::types::{Address, U256};
use tracing::instrument;

use super::TEVA_TOKEN_CONTRACT;
use crate::config::{ConfigError, EnvReader};
use crate::contracts;
use crate::deployment::pipeline::{Initializer, UpgradeableContract};
use crate::deployment::DeploymentContext;
use crate::report::UpgradeableDeployment;
use crate::types::{Chain, SignerRole};

pub const TEVA_TIMELOCK_CONTRACT_ADDRESS: &str = "TEVA_TIMELOCK_CONTRACT_ADDRESS";
pub const TEVA_VOTING_DELAY: &str = "TEVA_VOTING_DELAY";
pub const TEVA_VOTING_PERIOD: &str = "TEVA_VOTING_PERIOD";
pub const TEVA_PROPOSAL_THRESHOLD: &str = "TEVA_PROPOSAL_THRESHOLD";
pub const TEVA_QUORUM_PERCENTAGE: &str = "TEVA_QUORUM_PERCENTAGE";

/// Voting parameters shared by `initialize` and `initializeV2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernorSettings {
    /// In blocks
    pub voting_delay: u64,
    /// In blocks
    pub voting_period: u64,
    /// Smallest units
    pub proposal_threshold: U256,
    pub quorum_percentage: u64,
}

impl GovernorSettings {
    pub fn from_env(env: &EnvReader) -> Result<Self, ConfigError> {
        let voting_delay = env.u64(TEVA_VOTING_DELAY)?;
        let voting_period = env.u64(TEVA_VOTING_PERIOD)?;
        let proposal_threshold = env.token_amount(TEVA_PROPOSAL_THRESHOLD)?;
        let quorum_percentage = env.u64(TEVA_QUORUM_PERCENTAGE)?;

        if quorum_percentage > 100 {
            return Err(ConfigError::Invalid {
                key: TEVA_QUORUM_PERCENTAGE.to_string(),
                reason: format!("{quorum_percentage} is not a percentage"),
            });
        }

        Ok(Self {
            voting_delay,
            voting_period,
            proposal_threshold,
            quorum_percentage,
        })
    }

    pub fn tokens(&self) -> Vec<Token> {
        vec![
            Token::Uint(self.voting_delay.into()),
            Token::Uint(self.voting_period.into()),
            Token::Uint(self.proposal_threshold),
            Token::Uint(self.quorum_percentage.into()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernorParams {
    pub proxy_admin: Address,
    pub token: Address,
    pub timelock: Address,
    pub settings: GovernorSettings,
}

impl GovernorParams {
    pub fn from_env(env: &EnvReader, chain: Chain) -> Result<Self, ConfigError> {
        Ok(Self {
            proxy_admin: super::proxy_admin_contract(env, chain)?,
            token: env.address(TEVA_TOKEN_CONTRACT)?,
            timelock: env.address(TEVA_TIMELOCK_CONTRACT_ADDRESS)?,
            settings: GovernorSettings::from_env(env)?,
        })
    }
}

#[instrument(skip_all)]
pub async fn deploy(
    context: &DeploymentContext,
    params: &GovernorParams,
    proxy_signer: Option<SignerRole>,
) -> eyre::Result<UpgradeableDeployment> {
    let mut args = vec![Token::Address(params.token), Token::Address(params.timelock)];
    args.extend(params.settings.tokens());

    let contract = UpgradeableContract {
        name: "governor".to_string(),
        implementation: contracts::governor_v1(),
        constructor_args: vec![],
        initializer: Initializer::new("initialize", args),
        proxy_admin: params.proxy_admin,
        proxy_signer: proxy_signer.unwrap_or(SignerRole::ProxyAdmin),
    };

    super::deploy_upgradeable(context, contract).await
}
