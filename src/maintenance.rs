//! Single-call and small-loop operations against already deployed
//! contracts. Every call is signed by the contract admin and awaited to
//! finality before the next one is submitted.

use ethers::abi::Token;
use ethers::types::Address;

use crate::deployment::pipeline::send_and_confirm;
use crate::deployment::steps::assemble_report;
use crate::deployment::DeploymentContext;
use crate::ethers_utils::ContractCall;
use crate::forge_utils::ContractSpec;
use crate::report::contract_deployment::TransactionRecord;
use crate::types::SignerRole;

pub mod grant_minter;
pub mod mint;
pub mod tge;
pub mod vesting_schedules;

pub const MULTI_VESTING_CONTRACT_ADDRESS: &str = "MULTI_VESTING_CONTRACT_ADDRESS";
pub const DEX_CONTRACT_ADDRESS: &str = "DEX_CONTRACT_ADDRESS";
pub const TEVA_INITIAL_TOKEN_MINT_AMOUNT: &str = "TEVA_INITIAL_TOKEN_MINT_AMOUNT";

/// Binds `function` of the contract at `to` using the ABI of `spec`.
async fn bind(
    context: &DeploymentContext,
    spec: &ContractSpec,
    to: Address,
    function: &str,
    args: Vec<Token>,
) -> eyre::Result<ContractCall> {
    let artifact = context.load_artifact(spec).await?;

    ContractCall::builder()
        .artifact(&artifact)
        .function_name(function)
        .args(args)
        .to(to)
        .build()
}

/// Sends `call` from the contract admin and records it in the report.
async fn submit(
    context: &DeploymentContext,
    call: &ContractCall,
) -> eyre::Result<TransactionRecord> {
    let record = send_and_confirm(context, SignerRole::ContractAdmin, call).await?;

    assemble_report::record_transaction(context, &record).await?;

    Ok(record)
}
