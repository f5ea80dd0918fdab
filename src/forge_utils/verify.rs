use std::path::PathBuf;

use ethers::types::{Address, Bytes};
use eyre::ContextCompat;
use tracing::{info, instrument};

use super::ContractSpec;

pub struct ForgeVerify {
    spec: ContractSpec,
    address: Address,
    root: Option<PathBuf>,
    chain: Option<u64>,
    etherscan_api_key: Option<String>,
    verifier_url: Option<String>,
    constructor_args: Option<Bytes>,
    zksync: bool,
}

/// Exit status and combined output of a `forge verify-contract` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeVerifyOutput {
    pub success: bool,
    pub output: String,
}

impl ForgeVerify {
    pub fn new(spec: ContractSpec, address: Address) -> Self {
        Self {
            spec,
            address,
            root: None,
            chain: None,
            etherscan_api_key: None,
            verifier_url: None,
            constructor_args: None,
            zksync: false,
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_chain(mut self, chain: u64) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn with_etherscan_api_key(
        mut self,
        etherscan_api_key: Option<impl ToString>,
    ) -> Self {
        self.etherscan_api_key = etherscan_api_key.map(|key| key.to_string());
        self
    }

    pub fn with_verifier_url(mut self, verifier_url: Option<impl ToString>) -> Self {
        self.verifier_url = verifier_url.map(|url| url.to_string());
        self
    }

    pub fn with_constructor_args(mut self, constructor_args: Bytes) -> Self {
        if !constructor_args.is_empty() {
            self.constructor_args = Some(constructor_args);
        }
        self
    }

    pub fn with_zksync(mut self, zksync: bool) -> Self {
        self.zksync = zksync;
        self
    }

    fn args(&self) -> eyre::Result<Vec<String>> {
        let mut args = vec!["verify-contract".to_string(), "--watch".to_string()];

        let root = self.root.as_ref().context("Missing root")?;

        args.push("--root".to_string());
        args.push(root.display().to_string());

        let chain = self.chain.as_ref().context("Missing chain")?;

        args.push("--chain".to_string());
        args.push(chain.to_string());

        if let Some(etherscan_api_key) = &self.etherscan_api_key {
            args.push("--etherscan-api-key".to_string());
            args.push(etherscan_api_key.clone());
        }

        if let Some(verifier_url) = &self.verifier_url {
            args.push("--verifier-url".to_string());
            args.push(verifier_url.clone());
        }

        if let Some(constructor_args) = &self.constructor_args {
            args.push("--constructor-args".to_string());
            args.push(format!("{constructor_args}"));
        }

        if self.zksync {
            args.push("--zksync".to_string());
        }

        args.push(format!("{:?}", self.address));
        args.push(self.spec.to_string());

        Ok(args)
    }

    /// Runs the verification. Only a failure to launch forge is an error,
    /// a rejected verification is reported through [`ForgeVerifyOutput`].
    #[instrument(name = "forge_verify", skip_all, fields(contract = %self.spec))]
    pub async fn run(&self) -> eyre::Result<ForgeVerifyOutput> {
        let args = self.args()?;

        info!("Verifying contract with forge {}", args.join(" "));

        let output = tokio::process::Command::new("forge")
            .args(&args)
            .output()
            .await?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ForgeVerifyOutput {
            success: output.status.success(),
            output: combined,
        })
    }
}
