use ethers::abi::Token;
use ethers::types::Address;
use tracing::{info, instrument};

use super::proxy_admin;
use crate::config::{ConfigError, EnvReader};
use crate::contracts;
use crate::deployment::pipeline::{Initializer, UpgradeableContract};
use crate::deployment::DeploymentContext;
use crate::report::UpgradeableDeployment;
use crate::types::{Chain, SignerRole};

pub const LAYERZERO_BASE_ENDPOINT_V2: &str = "LAYERZERO_BASE_ENDPOINT_V2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParams {
    /// LayerZero endpoint, the constructor argument of the base token.
    pub endpoint: Option<Address>,
    /// A fresh `ProxyAdmin` is deployed first when unset.
    pub proxy_admin: Option<Address>,
}

impl TokenParams {
    pub fn from_env(env: &EnvReader, chain: Chain) -> Result<Self, ConfigError> {
        let proxy_admin = env.optional_address(chain.proxy_admin_contract_key())?;

        let endpoint = match chain {
            Chain::Base => Some(env.address(LAYERZERO_BASE_ENDPOINT_V2)?),
            Chain::ZkSync => None,
        };

        Ok(Self {
            endpoint,
            proxy_admin,
        })
    }
}

#[instrument(skip_all)]
pub async fn deploy(
    context: &DeploymentContext,
    params: &TokenParams,
    proxy_signer: Option<SignerRole>,
) -> eyre::Result<UpgradeableDeployment> {
    let chain = context.chain.chain();

    let proxy_admin = match params.proxy_admin {
        Some(proxy_admin) => proxy_admin,
        None => {
            info!("No ProxyAdmin configured, deploying one");
            proxy_admin::deploy(context).await?.address
        }
    };

    // The OApp delegate of the base token is the contract admin
    let (constructor_args, initializer) = match params.endpoint {
        Some(endpoint) => {
            let delegate = context.chain.signer_address(SignerRole::ContractAdmin)?;

            (
                vec![Token::Address(endpoint)],
                Initializer::new("initialize", vec![Token::Address(delegate)]),
            )
        }
        None => (vec![], Initializer::new("initialize", vec![])),
    };

    let contract = UpgradeableContract {
        name: "token".to_string(),
        implementation: contracts::token(chain),
        constructor_args,
        initializer,
        proxy_admin,
        proxy_signer: proxy_signer.unwrap_or(SignerRole::ProxyAdmin),
    };

    super::deploy_upgradeable(context, contract).await
}
