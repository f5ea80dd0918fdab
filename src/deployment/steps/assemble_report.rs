use tracing::{info, instrument};

use crate::deployment::DeploymentContext;
use crate::report::contract_deployment::{ContractDeployment, TransactionRecord};
use crate::report::{UpgradeRecord, UpgradeableDeployment};

#[instrument(skip_all)]
pub async fn record_proxy_admin(
    context: &DeploymentContext,
    deployment: &ContractDeployment,
) -> eyre::Result<()> {
    info!(address = ?deployment.address, "ProxyAdmin deployed");

    context
        .record(|report| report.proxy_admin = Some(deployment.clone()))
        .await
}

#[instrument(skip_all, fields(contract = %name))]
pub async fn record_upgradeable(
    context: &DeploymentContext,
    name: &str,
    deployment: &UpgradeableDeployment,
) -> eyre::Result<()> {
    info!(
        implementation = ?deployment.implementation.address,
        proxy = ?deployment.proxy.address,
        "Upgradeable contract deployed"
    );

    context
        .record(|report| {
            report
                .contracts
                .insert(name.to_string(), deployment.clone());
        })
        .await
}

#[instrument(skip_all, fields(contract = %record.target))]
pub async fn record_upgrade(
    context: &DeploymentContext,
    record: &UpgradeRecord,
) -> eyre::Result<()> {
    info!(
        proxy = ?record.proxy,
        implementation = ?record.implementation.address,
        "Proxy upgraded"
    );

    context
        .record(|report| report.upgrades.push(record.clone()))
        .await
}

pub async fn record_transaction(
    context: &DeploymentContext,
    transaction: &TransactionRecord,
) -> eyre::Result<()> {
    context
        .record(|report| report.transactions.push(transaction.clone()))
        .await
}
