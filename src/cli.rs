use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ethers::types::Address;

pub mod private_key;

pub use private_key::PrivateKey;

use crate::types::{AmountUnit, Chain, SignerRole};

#[derive(Debug, Clone, Parser)]
#[clap(rename_all = "kebab-case")]
pub struct Args {
    /// The chain to run against
    #[clap(long, env, default_value = "base")]
    pub chain: Chain,

    /// The name of the deployment
    ///
    /// Should be something meaningful like 'base-mainnet-2024-06-01'.
    /// The run report is written to `<deployment-name>/report.yml`.
    #[clap(short, long, env)]
    pub deployment_name: String,

    /// Root of the compiled contract artifacts
    ///
    /// Defaults to `artifacts` on base and `artifacts-zk` on zksync
    #[clap(long, env)]
    pub artifacts_dir: Option<PathBuf>,

    /// The contracts project used by forge
    #[clap(long, env, default_value = ".")]
    pub contracts_root: PathBuf,

    /// Skip source verification even if a verifier is configured
    #[clap(long)]
    pub no_verify: bool,

    /// Confirmations to await for every transaction
    #[clap(long, env, default_value_t = 1)]
    pub confirmations: usize,

    #[clap(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn artifacts_dir(&self) -> PathBuf {
        self.artifacts_dir
            .clone()
            .unwrap_or_else(|| self.chain.default_artifacts_dir())
    }
}

#[derive(Debug, Clone, Subcommand)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Deploy a contract behind a fresh transparent proxy
    Deploy {
        target: DeployTarget,

        /// Identity that signs the proxy deployment
        ///
        /// Defaults to the per-contract choice
        #[clap(long)]
        proxy_signer: Option<SignerRole>,
    },
    /// Point an existing proxy at a new implementation
    Upgrade { target: UpgradeTarget },
    /// Mint tokens to a receiver
    Mint {
        #[clap(long)]
        receiver: Address,

        /// Decimal amount of whole tokens
        #[clap(long)]
        amount: String,
    },
    /// Grant MINTER_ROLE on the token to the multi-vesting contract
    GrantVestingMinter,
    /// Token generation event setup
    ///
    /// Grants MINTER_ROLE to the contract admin and approves the DEX for the
    /// initial mint. On zksync the multi-vesting contract and the merkle
    /// distributor are granted MINTER_ROLE too and the initial amount is
    /// minted to the contract admin before the approval.
    TgeConfigure {
        /// Unit of TEVA_INITIAL_TOKEN_MINT_AMOUNT
        ///
        /// Defaults to `token` on base and `wei` on zksync
        #[clap(long, value_enum)]
        amount_unit: Option<AmountUnit>,
    },
    /// Create vesting wallets from a schedule file, one at a time
    CreateVestingWallets {
        /// JSON file with the vesting schedules
        #[clap(long)]
        schedules: PathBuf,

        #[clap(long, value_enum, default_value_t = AmountUnit::Wei)]
        amount_unit: AmountUnit,
    },
}

impl Command {
    /// Whether the command needs the proxy admin identity.
    pub fn needs_proxy_admin(&self) -> bool {
        matches!(self, Command::Deploy { .. } | Command::Upgrade { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DeployTarget {
    ProxyAdmin,
    Token,
    Governor,
    Timelock,
    MultiVestingWallet,
    CommunityMerkleDistributor,
    InvestorMerkleDistributor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum::Display)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum UpgradeTarget {
    Token,
    TokenV3,
    GovernorV2,
    CommunityMerkleDistributorV2,
    InvestorMerkleDistributorV2,
}
