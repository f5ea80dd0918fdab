use ethers::abi::Token;
use ethers::types::Address;
use tracing::instrument;

use crate::config::{ConfigError, EnvReader};
use crate::contracts;
use crate::deployment::pipeline::{Initializer, UpgradeableContract};
use crate::deployment::DeploymentContext;
use crate::report::UpgradeableDeployment;
use crate::types::{Chain, SignerRole};

pub const TEVA_TIMELOCK_EXECUTION_DELAY: &str = "TEVA_TIMELOCK_EXECUTION_DELAY";
pub const PROPOSERS_ADDRESS_ARRAY: &str = "PROPOSERS_ADDRESS_ARRAY";
pub const EXECUTORS_ADDRESS_ARRAY: &str = "EXECUTORS_ADDRESS_ARRAY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelockParams {
    pub proxy_admin: Address,
    /// Seconds
    pub min_delay: u64,
    pub proposers: Vec<Address>,
    pub executors: Vec<Address>,
}

impl TimelockParams {
    pub fn from_env(env: &EnvReader, chain: Chain) -> Result<Self, ConfigError> {
        Ok(Self {
            proxy_admin: super::proxy_admin_contract(env, chain)?,
            min_delay: env.u64(TEVA_TIMELOCK_EXECUTION_DELAY)?,
            proposers: env.address_list(PROPOSERS_ADDRESS_ARRAY)?,
            executors: env.address_list(EXECUTORS_ADDRESS_ARRAY)?,
        })
    }
}

fn address_array(addresses: &[Address]) -> Token {
    Token::Array(addresses.iter().copied().map(Token::Address).collect())
}

#[instrument(skip_all)]
pub async fn deploy(
    context: &DeploymentContext,
    params: &TimelockParams,
    proxy_signer: Option<SignerRole>,
) -> eyre::Result<UpgradeableDeployment> {
    let contract = UpgradeableContract {
        name: "timelock".to_string(),
        implementation: contracts::timelock(),
        constructor_args: vec![],
        initializer: Initializer::new(
            "initialize",
            vec![
                Token::Uint(params.min_delay.into()),
                address_array(&params.proposers),
                address_array(&params.executors),
            ],
        ),
        proxy_admin: params.proxy_admin,
        proxy_signer: proxy_signer.unwrap_or(SignerRole::ProxyAdmin),
    };

    super::deploy_upgradeable(context, contract).await
}
