use std::path::PathBuf;

use clap::ValueEnum;
use ethers::types::U256;
use ethers::utils::parse_units;
use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;

/// Decimals of the Teva token, used to scale whole-token amounts.
pub const TOKEN_DECIMALS: u32 = 18;

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

macro_rules! impl_primitive_num {
    (pub struct $outer:ident($tname:ty)) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            Serialize,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Deserialize,
            Shrinkwrap,
        )]
        pub struct $outer(pub $tname);

        impl std::fmt::Display for $outer {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

impl_primitive_num!(pub struct UnixTimestamp(u64));

/// The chain a command runs against.
///
/// Each variant has its own environment key names and artifact layout, and
/// is served by its own [`crate::chain::ChainAdapter`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Chain {
    Base,
    #[value(name = "zksync")]
    #[serde(rename = "zksync")]
    #[strum(serialize = "zksync")]
    ZkSync,
}

impl Chain {
    pub fn rpc_url_key(self) -> &'static str {
        match self {
            Chain::Base => "BASE_RPC_PROVIDER_URI",
            Chain::ZkSync => "ZKSYNC_PROVIDER_URI",
        }
    }

    pub fn proxy_admin_contract_key(self) -> &'static str {
        match self {
            Chain::Base => "BASE_PROXY_ADMIN_CONTRACT_ADDRESS",
            Chain::ZkSync => "PROXY_ADMIN_CONTRACT_ADDRESS",
        }
    }

    pub fn explorer_api_key_key(self) -> &'static str {
        match self {
            Chain::Base => "BASE_SCAN_VERIFICATION_KEY",
            Chain::ZkSync => "ZKSYNC_VERIFICATION_KEY",
        }
    }

    pub fn verifier_url_key(self) -> &'static str {
        match self {
            Chain::Base => "BASE_VERIFIER_URL",
            Chain::ZkSync => "ZKSYNC_VERIFIER_URL",
        }
    }

    pub fn default_artifacts_dir(self) -> PathBuf {
        match self {
            Chain::Base => PathBuf::from("artifacts"),
            Chain::ZkSync => PathBuf::from("artifacts-zk"),
        }
    }
}

/// One of the two signing identities of a run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum::Display,
)]
#[clap(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SignerRole {
    /// Controls the `ProxyAdmin` contract and therefore upgrades.
    ProxyAdmin,
    /// Holds the admin roles of the contract logic.
    ContractAdmin,
}

/// How a raw amount string maps to on-chain smallest units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[clap(rename_all = "kebab-case")]
pub enum AmountUnit {
    /// The value already is in smallest units and is passed through.
    #[default]
    Wei,
    /// The value is a decimal whole-token amount, scaled by 10^18.
    Token,
}

impl AmountUnit {
    pub fn to_smallest_unit(self, value: &str) -> eyre::Result<U256> {
        match self {
            AmountUnit::Wei => parse_wei_amount(value),
            AmountUnit::Token => parse_token_amount(value),
        }
    }
}

/// Parses a decimal token amount (e.g. `"1000"` or `"12.5"`) into its
/// 18-decimal smallest-unit representation.
pub fn parse_token_amount(value: &str) -> eyre::Result<U256> {
    let value = value.trim();

    if value.is_empty() || value.starts_with('-') {
        eyre::bail!("invalid token amount {value:?}");
    }

    let parsed = parse_units(value, TOKEN_DECIMALS)
        .map_err(|e| eyre::eyre!("invalid token amount {value:?}: {e}"))?;

    Ok(parsed.into())
}

pub fn parse_wei_amount(value: &str) -> eyre::Result<U256> {
    let value = value.trim();

    U256::from_dec_str(value)
        .map_err(|e| eyre::eyre!("invalid integer amount {value:?}: {e}"))
}
