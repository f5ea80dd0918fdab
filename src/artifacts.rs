use std::path::{Path, PathBuf};

use ethers::abi::{Abi, Function, Token};
use ethers::types::Bytes;
use eyre::{Context, ContextCompat};
use serde::Deserialize;

use crate::forge_utils::ContractSpec;

/// A compiled contract as emitted by hardhat.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    pub fn spec(&self) -> ContractSpec {
        ContractSpec::path_name(&self.source_name, &self.contract_name)
    }

    pub fn function(&self, name: &str) -> eyre::Result<&Function> {
        self.abi.function(name).with_context(|| {
            format!("{} has no function `{name}`", self.contract_name)
        })
    }

    /// ABI encoding of the constructor arguments, as expected by explorers.
    pub fn constructor_args(&self, args: &[Token]) -> Bytes {
        ethers::abi::encode(args).into()
    }

    /// Creation bytecode followed by the encoded constructor arguments.
    pub fn deployment_data(&self, args: &[Token]) -> eyre::Result<Bytes> {
        match self.abi.constructor() {
            Some(constructor) => {
                let data = constructor
                    .encode_input(self.bytecode.to_vec(), args)
                    .with_context(|| {
                        format!(
                            "Encoding constructor arguments of {}",
                            self.contract_name
                        )
                    })?;

                Ok(data.into())
            }
            None if args.is_empty() => Ok(self.bytecode.clone()),
            None => eyre::bail!(
                "{} has no constructor but {} arguments were given",
                self.contract_name,
                args.len()
            ),
        }
    }
}

/// Read-only access to a directory of hardhat artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn load(&self, spec: &ContractSpec) -> eyre::Result<ContractArtifact> {
        let path = spec.artifact_path(&self.root);

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Reading artifact of {spec} from {}", path.display()))?;

        let artifact: ContractArtifact = serde_json::from_str(&content)
            .with_context(|| format!("Parsing artifact {}", path.display()))?;

        if artifact.contract_name != spec.name {
            eyre::bail!(
                "Artifact {} holds {} instead of {}",
                path.display(),
                artifact.contract_name,
                spec.name
            );
        }

        Ok(artifact)
    }
}
