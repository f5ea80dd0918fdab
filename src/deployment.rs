use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use self::steps::governor::GovernorParams;
use self::steps::merkle_distributor::{DistributorKind, MerkleDistributorParams};
use self::steps::timelock::TimelockParams;
use self::steps::token::TokenParams;
use self::steps::upgrades::UpgradeParams;
use self::steps::vesting_wallet::MultiVestingWalletParams;
use self::steps::{
    governor, merkle_distributor, proxy_admin, timelock, token, upgrades,
    vesting_wallet,
};
use crate::artifacts::ArtifactStore;
use crate::chain::{self, ChainOptions};
use crate::cli::{Args, Command, DeployTarget};
use crate::config::{EnvReader, NetworkConfig, ProcessEnv};
use crate::maintenance::grant_minter::{self, GrantMinterParams};
use crate::maintenance::mint::{self, MintParams};
use crate::maintenance::tge::{self, TgeParams};
use crate::maintenance::vesting_schedules::{self, VestingWalletsParams};
use crate::report::{Report, REPORT_PATH};
use crate::serde_utils;
use crate::types::{Chain, SignerRole};

pub mod deployment_context;
pub mod pipeline;
pub mod steps;

pub use self::deployment_context::DeploymentContext;

/// Validated parameters of a deploy command.
#[derive(Debug, Clone)]
pub enum DeployParams {
    ProxyAdmin,
    Token(TokenParams),
    Governor(GovernorParams),
    Timelock(TimelockParams),
    MultiVestingWallet(MultiVestingWalletParams),
    MerkleDistributor(MerkleDistributorParams),
}

/// A command with all of its configuration read and checked.
#[derive(Debug, Clone)]
pub enum Task {
    Deploy {
        params: DeployParams,
        proxy_signer: Option<SignerRole>,
    },
    Upgrade(UpgradeParams),
    Mint(MintParams),
    GrantVestingMinter(GrantMinterParams),
    TgeConfigure(TgeParams),
    CreateVestingWallets(VestingWalletsParams),
}

/// Reads everything `command` needs. Nothing touches the network here.
pub async fn prepare(
    command: &Command,
    env: &EnvReader<'_>,
    chain: Chain,
) -> eyre::Result<Task> {
    let task = match command {
        Command::Deploy {
            target,
            proxy_signer,
        } => {
            let params = match target {
                DeployTarget::ProxyAdmin => {
                    if proxy_signer.is_some() {
                        warn!("--proxy-signer has no effect, the ProxyAdmin has no proxy");
                    }

                    DeployParams::ProxyAdmin
                }
                DeployTarget::Token => {
                    DeployParams::Token(TokenParams::from_env(env, chain)?)
                }
                DeployTarget::Governor => {
                    DeployParams::Governor(GovernorParams::from_env(env, chain)?)
                }
                DeployTarget::Timelock => {
                    DeployParams::Timelock(TimelockParams::from_env(env, chain)?)
                }
                DeployTarget::MultiVestingWallet => DeployParams::MultiVestingWallet(
                    MultiVestingWalletParams::from_env(env, chain)?,
                ),
                DeployTarget::CommunityMerkleDistributor => {
                    DeployParams::MerkleDistributor(MerkleDistributorParams::from_env(
                        env,
                        chain,
                        DistributorKind::Community,
                    )?)
                }
                DeployTarget::InvestorMerkleDistributor => {
                    DeployParams::MerkleDistributor(MerkleDistributorParams::from_env(
                        env,
                        chain,
                        DistributorKind::Investor,
                    )?)
                }
            };

            Task::Deploy {
                params,
                proxy_signer: *proxy_signer,
            }
        }
        Command::Upgrade { target } => {
            Task::Upgrade(UpgradeParams::from_env(env, chain, *target)?)
        }
        Command::Mint { receiver, amount } => {
            Task::Mint(MintParams::new(env, *receiver, amount)?)
        }
        Command::GrantVestingMinter => {
            Task::GrantVestingMinter(GrantMinterParams::from_env(env)?)
        }
        Command::TgeConfigure { amount_unit } => {
            Task::TgeConfigure(TgeParams::from_env(env, chain, *amount_unit)?)
        }
        Command::CreateVestingWallets {
            schedules,
            amount_unit,
        } => {
            let multi_vesting = VestingWalletsParams::new(env, vec![])?;
            let schedules =
                vesting_schedules::read_schedules(schedules, *amount_unit).await?;

            info!(count = schedules.len(), "Vesting schedules parsed");

            Task::CreateVestingWallets(VestingWalletsParams {
                schedules,
                ..multi_vesting
            })
        }
    };

    Ok(task)
}

#[instrument(skip_all)]
pub async fn execute(task: &Task, context: &DeploymentContext) -> eyre::Result<()> {
    match task {
        Task::Deploy {
            params,
            proxy_signer,
        } => {
            let proxy_signer = *proxy_signer;

            match params {
                DeployParams::ProxyAdmin => {
                    proxy_admin::deploy(context).await?;
                }
                DeployParams::Token(params) => {
                    token::deploy(context, params, proxy_signer).await?;
                }
                DeployParams::Governor(params) => {
                    governor::deploy(context, params, proxy_signer).await?;
                }
                DeployParams::Timelock(params) => {
                    timelock::deploy(context, params, proxy_signer).await?;
                }
                DeployParams::MultiVestingWallet(params) => {
                    vesting_wallet::deploy(context, params, proxy_signer).await?;
                }
                DeployParams::MerkleDistributor(params) => {
                    merkle_distributor::deploy(context, params, proxy_signer).await?;
                }
            }
        }
        Task::Upgrade(params) => {
            upgrades::run(context, params).await?;
        }
        Task::Mint(params) => {
            mint::run(context, params).await?;
        }
        Task::GrantVestingMinter(params) => {
            grant_minter::run(context, params).await?;
        }
        Task::TgeConfigure(params) => {
            tge::run(context, params).await?;
        }
        Task::CreateVestingWallets(params) => {
            vesting_schedules::run(context, params).await?;
        }
    }

    Ok(())
}

/// Loads the report of a previous run, or starts a new one.
pub async fn load_report(path: &Path, chain: Chain) -> eyre::Result<Report> {
    if !path.exists() {
        return Ok(Report::new(chain));
    }

    let report: Report = serde_utils::read_deserialize(path).await?;

    if report.chain != chain {
        eyre::bail!(
            "{} belongs to a {} deployment, not {chain}",
            path.display(),
            report.chain
        );
    }

    Ok(report)
}

pub async fn run_deployment(args: Args) -> eyre::Result<()> {
    let process_env = ProcessEnv;
    let env = EnvReader::new(&process_env);

    let network =
        NetworkConfig::from_env(&env, args.chain, args.command.needs_proxy_admin())?;
    let task = prepare(&args.command, &env, args.chain).await?;

    let deployment_dir = PathBuf::from(&args.deployment_name);
    tokio::fs::create_dir_all(&deployment_dir).await?;

    let report_path = deployment_dir.join(REPORT_PATH);
    let report = load_report(&report_path, args.chain).await?;

    let options = ChainOptions {
        confirmations: args.confirmations,
        contracts_root: args.contracts_root.clone(),
    };

    info!(
        chain = %args.chain,
        contract_admin = ?network.contract_admin_address(),
        "Signing as contract admin"
    );

    let chain = chain::connect(&network, &options).await?;

    let verify_sources = !args.no_verify && network.verifier.is_some();
    if !verify_sources {
        info!("Source verification disabled");
    }

    let context = DeploymentContext::new(
        chain,
        ArtifactStore::new(args.artifacts_dir()),
        verify_sources,
        report,
    )
    .with_report_path(report_path);

    execute(&task, &context).await?;

    info!(deployment = %args.deployment_name, "Done");

    Ok(())
}
