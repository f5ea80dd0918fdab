use ethers::abi::Token;
use ethers::types::Address;
use tracing::instrument;

use super::TEVA_TOKEN_CONTRACT;
use crate::config::{ConfigError, EnvReader};
use crate::contracts;
use crate::deployment::pipeline::{Initializer, UpgradeableContract};
use crate::deployment::DeploymentContext;
use crate::report::UpgradeableDeployment;
use crate::types::{Chain, SignerRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiVestingWalletParams {
    pub proxy_admin: Address,
    pub token: Address,
}

impl MultiVestingWalletParams {
    pub fn from_env(env: &EnvReader, chain: Chain) -> Result<Self, ConfigError> {
        Ok(Self {
            proxy_admin: super::proxy_admin_contract(env, chain)?,
            token: env.address(TEVA_TOKEN_CONTRACT)?,
        })
    }
}

#[instrument(skip_all)]
pub async fn deploy(
    context: &DeploymentContext,
    params: &MultiVestingWalletParams,
    proxy_signer: Option<SignerRole>,
) -> eyre::Result<UpgradeableDeployment> {
    let contract = UpgradeableContract {
        name: "multi-vesting-wallet".to_string(),
        implementation: contracts::multi_vesting_wallet(),
        constructor_args: vec![],
        initializer: Initializer::new("initialize", vec![Token::Address(params.token)]),
        proxy_admin: params.proxy_admin,
        proxy_signer: proxy_signer.unwrap_or(SignerRole::ProxyAdmin),
    };

    super::deploy_upgradeable(context, contract).await
}
