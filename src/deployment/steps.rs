use ethers::types::Address;

use super::pipeline::{ContractUpgrade, Pipeline, UpgradeableContract};
use super::DeploymentContext;
use crate::config::{ConfigError, EnvReader};
use crate::report::{UpgradeRecord, UpgradeableDeployment};
use crate::types::Chain;

pub mod assemble_report;
pub mod governor;
pub mod merkle_distributor;
pub mod proxy_admin;
pub mod timelock;
pub mod token;
pub mod upgrades;
pub mod vesting_wallet;

pub const TEVA_TOKEN_CONTRACT: &str = "TEVA_TOKEN_CONTRACT";

/// The address of the already deployed `ProxyAdmin` of `chain`.
pub fn proxy_admin_contract(
    env: &EnvReader,
    chain: Chain,
) -> Result<Address, ConfigError> {
    env.address(chain.proxy_admin_contract_key())
}

/// Runs the upgradeable pipeline and records the result.
pub async fn deploy_upgradeable(
    context: &DeploymentContext,
    contract: UpgradeableContract,
) -> eyre::Result<UpgradeableDeployment> {
    let deployment = Pipeline::new(context, &contract.name)
        .deploy_upgradeable(&contract)
        .await?;

    assemble_report::record_upgradeable(context, &contract.name, &deployment)
        .await?;

    Ok(deployment)
}

pub async fn upgrade(
    context: &DeploymentContext,
    upgrade: ContractUpgrade,
) -> eyre::Result<UpgradeRecord> {
    let record = Pipeline::new(context, &upgrade.name)
        .upgrade(&upgrade)
        .await?;

    assemble_report::record_upgrade(context, &record).await?;

    Ok(record)
}
