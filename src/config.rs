use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use ethers::types::{Address, H256, U256};
use reqwest::Url;
use tracing::warn;

use crate::cli::PrivateKey;
use crate::types::{parse_token_amount, AmountUnit, Chain, SignerRole, UnixTimestamp};

pub const CONTRACT_ADMIN_WALLET_PK: &str = "CONTRACT_ADMIN_WALLET_PK";
pub const PROXY_ADMIN_WALLET_PK: &str = "PROXY_ADMIN_WALLET_PK";

/// A key/value source of configuration, the process environment in
/// production.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).map(|value| value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ConfigError {
    #[display(fmt = "missing required configuration value `{}`", key)]
    Missing { key: String },
    #[display(fmt = "invalid configuration value `{}`: {}", key, reason)]
    Invalid { key: String, reason: String },
}

impl std::error::Error for ConfigError {}

impl ConfigError {
    pub fn key(&self) -> &str {
        match self {
            ConfigError::Missing { key } | ConfigError::Invalid { key, .. } => {
                key
            }
        }
    }

    fn invalid(key: &str, reason: impl Display) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Typed, fail-fast reads over an [`EnvSource`].
///
/// Values are trimmed and an empty value counts as missing.
pub struct EnvReader<'a> {
    source: &'a dyn EnvSource,
}

impl<'a> EnvReader<'a> {
    pub fn new(source: &'a dyn EnvSource) -> Self {
        Self { source }
    }

    pub fn optional(&self, key: &str) -> Option<String> {
        self.source
            .get(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key).ok_or_else(|| ConfigError::Missing {
            key: key.to_string(),
        })
    }

    pub fn parsed<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.required(key)?
            .parse()
            .map_err(|e| ConfigError::invalid(key, e))
    }

    pub fn optional_parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(key)
            .map(|value| value.parse().map_err(|e| ConfigError::invalid(key, e)))
            .transpose()
    }

    pub fn address(&self, key: &str) -> Result<Address, ConfigError> {
        self.parsed(key)
    }

    pub fn optional_address(
        &self,
        key: &str,
    ) -> Result<Option<Address>, ConfigError> {
        self.optional_parsed(key)
    }

    pub fn bytes32(&self, key: &str) -> Result<H256, ConfigError> {
        self.parsed(key)
    }

    pub fn u64(&self, key: &str) -> Result<u64, ConfigError> {
        self.parsed(key)
    }

    pub fn unix_timestamp(
        &self,
        key: &str,
    ) -> Result<UnixTimestamp, ConfigError> {
        self.u64(key).map(UnixTimestamp)
    }

    /// A decimal whole-token amount, scaled to 18 decimals.
    pub fn token_amount(&self, key: &str) -> Result<U256, ConfigError> {
        let value = self.required(key)?;

        parse_token_amount(&value).map_err(|e| ConfigError::invalid(key, e))
    }

    /// An amount in `unit`, see [`AmountUnit`].
    pub fn amount(&self, key: &str, unit: AmountUnit) -> Result<U256, ConfigError> {
        let value = self.required(key)?;

        unit.to_smallest_unit(&value)
            .map_err(|e| ConfigError::invalid(key, e))
    }

    /// A JSON-encoded array of addresses, e.g. `["0xabc…", "0xdef…"]`.
    pub fn address_list(&self, key: &str) -> Result<Vec<Address>, ConfigError> {
        let value = self.required(key)?;

        serde_json::from_str(&value).map_err(|e| ConfigError::invalid(key, e))
    }

    pub fn private_key(&self, key: &str) -> Result<PrivateKey, ConfigError> {
        self.parsed(key)
    }

    pub fn url(&self, key: &str) -> Result<Url, ConfigError> {
        self.parsed(key)
    }
}

/// Source verification settings, present when a verifier is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    pub api_key: Option<String>,
    pub verifier_url: Option<String>,
}

/// Everything needed to reach a chain and sign on it.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub chain: Chain,
    pub rpc_url: Url,
    pub contract_admin_key: PrivateKey,
    pub proxy_admin_key: Option<PrivateKey>,
    pub verifier: Option<VerifierConfig>,
}

impl NetworkConfig {
    /// Reads the network settings of `chain`.
    ///
    /// The proxy admin key is only read, and then required, when
    /// `with_proxy_admin` is set.
    pub fn from_env(
        env: &EnvReader,
        chain: Chain,
        with_proxy_admin: bool,
    ) -> Result<Self, ConfigError> {
        let rpc_url = env.url(chain.rpc_url_key())?;

        let proxy_admin_key = if with_proxy_admin {
            Some(env.private_key(PROXY_ADMIN_WALLET_PK)?)
        } else {
            None
        };

        let contract_admin_key = env.private_key(CONTRACT_ADMIN_WALLET_PK)?;

        let api_key = env.optional(chain.explorer_api_key_key());
        let verifier_url = env.optional(chain.verifier_url_key());

        let verifier = if api_key.is_some() || verifier_url.is_some() {
            Some(VerifierConfig {
                api_key,
                verifier_url,
            })
        } else {
            None
        };

        let config = Self {
            chain,
            rpc_url,
            contract_admin_key,
            proxy_admin_key,
            verifier,
        };

        if config.identities_coincide() {
            warn!(
                "{PROXY_ADMIN_WALLET_PK} and {CONTRACT_ADMIN_WALLET_PK} are the same key, \
                 upgrade authority and contract administration are not separated"
            );
        }

        Ok(config)
    }

    pub fn identities_coincide(&self) -> bool {
        self.proxy_admin_key.as_ref() == Some(&self.contract_admin_key)
    }

    pub fn key(&self, role: SignerRole) -> Option<&PrivateKey> {
        match role {
            SignerRole::ContractAdmin => Some(&self.contract_admin_key),
            SignerRole::ProxyAdmin => self.proxy_admin_key.as_ref(),
        }
    }

    pub fn contract_admin_address(&self) -> Address {
        self.contract_admin_key.address()
    }
}
