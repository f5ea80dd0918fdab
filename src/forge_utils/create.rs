use std::path::{Path, PathBuf};

use ethers::types::{Address, H256};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::common::ContractSpec;
use crate::cli::PrivateKey;

/// `forge create`, used where contract creation cannot go through a plain
/// JSON-RPC `eth_sendTransaction` (zksync).
#[derive(Debug)]
pub struct ForgeCreate {
    root: Option<PathBuf>,
    contract_spec: ContractSpec,
    private_key: Option<PrivateKey>,
    rpc_url: Option<String>,
    constructor_args: Vec<String>,
    zksync: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeOutput {
    pub deployer: Address,
    pub deployed_to: Address,
    pub transaction_hash: H256,
}

impl ForgeCreate {
    pub fn new(contract_spec: ContractSpec) -> Self {
        Self {
            root: None,
            contract_spec,
            private_key: None,
            rpc_url: None,
            constructor_args: vec![],
            zksync: false,
        }
    }

    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = Some(root.as_ref().to_owned());
        self
    }

    pub fn with_private_key(mut self, private_key: PrivateKey) -> Self {
        self.private_key = Some(private_key);
        self
    }

    pub fn with_rpc_url(mut self, rpc_url: impl ToString) -> Self {
        self.rpc_url = Some(rpc_url.to_string());
        self
    }

    pub fn with_constructor_arg(mut self, arg: impl ToString) -> Self {
        self.constructor_args.push(arg.to_string());
        self
    }

    pub fn with_zksync(mut self, zksync: bool) -> Self {
        self.zksync = zksync;
        self
    }

    /// Arguments passed to `forge`, without the private key.
    fn args(&self) -> Vec<String> {
        let mut args = vec!["create".to_string(), self.contract_spec.to_string()];

        if let Some(root) = &self.root {
            args.push("--root".to_string());
            args.push(root.display().to_string());
        }

        if let Some(rpc_url) = &self.rpc_url {
            args.push("--rpc-url".to_string());
            args.push(rpc_url.clone());
        }

        if self.zksync {
            args.push("--zksync".to_string());
        }

        args.push("--broadcast".to_string());
        args.push("--json".to_string());

        if !self.constructor_args.is_empty() {
            args.push("--constructor-args".to_string());
            args.extend(self.constructor_args.iter().cloned());
        }

        args
    }

    #[instrument(name = "forge_create", skip_all, fields(contract = %self.contract_spec))]
    pub async fn run(&self) -> eyre::Result<ForgeOutput> {
        let args = self.args();

        info!("Creating contract with forge {}", args.join(" "));

        let mut cmd = tokio::process::Command::new("forge");
        cmd.args(&args);

        if let Some(private_key) = &self.private_key {
            cmd.arg("--private-key");
            cmd.arg(format!("{private_key:#}"));
        }

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            eyre::bail!("forge create failed: {}", stderr);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let s = strip_non_json(&stdout);

        let output: ForgeOutput = serde_json::from_str(s)?;

        info!("Created: {output:?}");

        Ok(output)
    }
}

fn strip_non_json(s: &str) -> &str {
    let start = s.find('{').unwrap_or(0);

    if let Some(last_closing_brace) = s.rfind('}') {
        &s[start..=last_closing_brace]
    } else {
        s
    }
}
