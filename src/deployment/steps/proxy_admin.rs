use ethers::abi::Token;
use tracing::instrument;

use super::assemble_report;
use crate::contracts;
use crate::deployment::pipeline::Pipeline;
use crate::deployment::DeploymentContext;
use crate::report::contract_deployment::ContractDeployment;
use crate::types::SignerRole;

/// Deploys a `ProxyAdmin` owned by, and deployed from, the proxy admin
/// identity.
#[instrument(skip_all)]
pub async fn deploy(context: &DeploymentContext) -> eyre::Result<ContractDeployment> {
    let owner = context.chain.signer_address(SignerRole::ProxyAdmin)?;

    let deployment = Pipeline::new(context, "proxy-admin")
        .deploy_standalone(
            &contracts::proxy_admin(),
            &[Token::Address(owner)],
            SignerRole::ProxyAdmin,
        )
        .await?;

    assemble_report::record_proxy_admin(context, &deployment).await?;

    Ok(deployment)
}
