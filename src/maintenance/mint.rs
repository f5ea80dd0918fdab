use ethers::abi::Token;
use ethers::types::{Address, U256};
use eyre::WrapErr;
use tracing::instrument;

use crate::config::EnvReader;
use crate::contracts;
use crate::deployment::steps::TEVA_TOKEN_CONTRACT;
use crate::deployment::DeploymentContext;
use crate::report::contract_deployment::TransactionRecord;
use crate::types::parse_token_amount;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintParams {
    pub token: Address,
    pub receiver: Address,
    /// Smallest units
    pub amount: U256,
}

impl MintParams {
    /// `amount` is a decimal whole-token amount.
    pub fn new(env: &EnvReader, receiver: Address, amount: &str) -> eyre::Result<Self> {
        let token = env.address(TEVA_TOKEN_CONTRACT)?;
        let amount = parse_token_amount(amount)
            .wrap_err_with(|| format!("Invalid mint amount {amount:?}"))?;

        Ok(Self {
            token,
            receiver,
            amount,
        })
    }
}

#[instrument(skip_all, fields(receiver = ?params.receiver, amount = %params.amount))]
pub async fn run(
    context: &DeploymentContext,
    params: &MintParams,
) -> eyre::Result<TransactionRecord> {
    let call = super::bind(
        context,
        &contracts::token(context.chain.chain()),
        params.token,
        "mint",
        vec![Token::Address(params.receiver), Token::Uint(params.amount)],
    )
    .await?;

    super::submit(context, &call).await
}
