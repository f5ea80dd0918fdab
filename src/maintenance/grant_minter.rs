use ethers::abi::Token;
use ethers::types::Address;
use eyre::ContextCompat;
use tracing::{info, instrument};

use super::MULTI_VESTING_CONTRACT_ADDRESS;
use crate::config::{ConfigError, EnvReader};
use crate::contracts;
use crate::deployment::steps::TEVA_TOKEN_CONTRACT;
use crate::deployment::DeploymentContext;
use crate::report::contract_deployment::TransactionRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantMinterParams {
    pub token: Address,
    pub account: Address,
}

impl GrantMinterParams {
    pub fn from_env(env: &EnvReader) -> Result<Self, ConfigError> {
        Ok(Self {
            token: env.address(TEVA_TOKEN_CONTRACT)?,
            account: env.address(MULTI_VESTING_CONTRACT_ADDRESS)?,
        })
    }
}

/// Reads `MINTER_ROLE()` from the token.
pub async fn minter_role(
    context: &DeploymentContext,
    token: Address,
) -> eyre::Result<Token> {
    let query = super::bind(
        context,
        &contracts::token(context.chain.chain()),
        token,
        "MINTER_ROLE",
        vec![],
    )
    .await?;

    context
        .chain
        .query_contract(&query)
        .await?
        .into_iter()
        .next()
        .context("MINTER_ROLE returned nothing")
}

/// Grants `MINTER_ROLE` on the token to `account`.
pub async fn grant_minter_role(
    context: &DeploymentContext,
    token: Address,
    account: Address,
) -> eyre::Result<TransactionRecord> {
    let role = minter_role(context, token).await?;

    let call = super::bind(
        context,
        &contracts::token(context.chain.chain()),
        token,
        "grantRole",
        vec![role, Token::Address(account)],
    )
    .await?;

    let record = super::submit(context, &call).await?;

    info!(account = ?account, "MINTER_ROLE granted");

    Ok(record)
}

#[instrument(skip_all, fields(account = ?params.account))]
pub async fn run(
    context: &DeploymentContext,
    params: &GrantMinterParams,
) -> eyre::Result<TransactionRecord> {
    grant_minter_role(context, params.token, params.account).await
}
