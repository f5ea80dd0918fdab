use ethers::abi::Token;
use ethers::types::{Address, U256};
use tracing::{info, instrument};

use super::{
    DEX_CONTRACT_ADDRESS, MULTI_VESTING_CONTRACT_ADDRESS,
    TEVA_INITIAL_TOKEN_MINT_AMOUNT,
};
use crate::config::{ConfigError, EnvReader};
use crate::contracts;
use crate::deployment::steps::TEVA_TOKEN_CONTRACT;
use crate::deployment::DeploymentContext;
use crate::report::contract_deployment::TransactionRecord;
use crate::types::{AmountUnit, Chain, SignerRole};

pub const TEVA_MERKLE_DISTRIBUTOR_CONTRACT_ADDRESS: &str =
    "TEVA_MERKLE_DISTRIBUTOR_CONTRACT_ADDRESS";

/// The contracts that mint on their own once the token is live. Only the
/// zksync TGE grants them `MINTER_ROLE` and performs the initial mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TgeDistribution {
    pub multi_vesting: Address,
    pub merkle_distributor: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TgeParams {
    pub token: Address,
    pub dex: Address,
    /// Smallest units
    pub initial_mint_amount: U256,
    pub distribution: Option<TgeDistribution>,
}

impl TgeParams {
    /// `unit` defaults to whole tokens on base and smallest units on zksync.
    pub fn from_env(
        env: &EnvReader,
        chain: Chain,
        unit: Option<AmountUnit>,
    ) -> Result<Self, ConfigError> {
        let unit = unit.unwrap_or(match chain {
            Chain::Base => AmountUnit::Token,
            Chain::ZkSync => AmountUnit::Wei,
        });

        let token = env.address(TEVA_TOKEN_CONTRACT)?;
        let dex = env.address(DEX_CONTRACT_ADDRESS)?;
        let initial_mint_amount = env.amount(TEVA_INITIAL_TOKEN_MINT_AMOUNT, unit)?;

        let distribution = match chain {
            Chain::Base => None,
            Chain::ZkSync => Some(TgeDistribution {
                multi_vesting: env.address(MULTI_VESTING_CONTRACT_ADDRESS)?,
                merkle_distributor: env
                    .address(TEVA_MERKLE_DISTRIBUTOR_CONTRACT_ADDRESS)?,
            }),
        };

        Ok(Self {
            token,
            dex,
            initial_mint_amount,
            distribution,
        })
    }
}

/// Makes the contract admin a minter and lets the DEX spend the initial
/// mint. With a [`TgeDistribution`] the vesting and distributor contracts
/// become minters first and the initial amount is minted to the contract
/// admin before the approval.
#[instrument(skip_all)]
pub async fn run(
    context: &DeploymentContext,
    params: &TgeParams,
) -> eyre::Result<Vec<TransactionRecord>> {
    let token_spec = contracts::token(context.chain.chain());
    let contract_admin = context.chain.signer_address(SignerRole::ContractAdmin)?;

    let mut records = vec![];

    let mut minters = vec![];
    if let Some(distribution) = &params.distribution {
        minters.push(distribution.multi_vesting);
        minters.push(distribution.merkle_distributor);
    }
    minters.push(contract_admin);

    for minter in minters {
        records.push(
            super::grant_minter::grant_minter_role(context, params.token, minter)
                .await?,
        );
    }

    if params.distribution.is_some() {
        let mint = super::bind(
            context,
            &token_spec,
            params.token,
            "mint",
            vec![
                Token::Address(contract_admin),
                Token::Uint(params.initial_mint_amount),
            ],
        )
        .await?;

        records.push(super::submit(context, &mint).await?);

        info!(amount = %params.initial_mint_amount, "Initial supply minted");
    }

    let approve = super::bind(
        context,
        &token_spec,
        params.token,
        "approve",
        vec![
            Token::Address(params.dex),
            Token::Uint(params.initial_mint_amount),
        ],
    )
    .await?;

    records.push(super::submit(context, &approve).await?);

    info!(dex = ?params.dex, amount = %params.initial_mint_amount, "DEX approved");

    Ok(records)
}
