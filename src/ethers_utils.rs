use ethers::abi::{Function, Token};
use ethers::types::{Address, Bytes};
use eyre::{Context, ContextCompat};

use crate::artifacts::ContractArtifact;

/// A fully resolved call of one contract function.
#[derive(Debug, Clone)]
pub struct ContractCall {
    pub contract_name: String,
    pub to: Address,
    pub function: Function,
    pub args: Vec<Token>,
}

impl ContractCall {
    pub fn builder() -> ContractCallBuilder {
        ContractCallBuilder::default()
    }

    pub fn function_name(&self) -> &str {
        &self.function.name
    }

    pub fn calldata(&self) -> eyre::Result<Bytes> {
        let data = self.function.encode_input(&self.args).with_context(|| {
            format!("Encoding {}.{}", self.contract_name, self.function.name)
        })?;

        Ok(data.into())
    }

    pub fn decode_output(&self, data: &[u8]) -> eyre::Result<Vec<Token>> {
        self.function.decode_output(data).with_context(|| {
            format!(
                "Decoding output of {}.{}",
                self.contract_name, self.function.name
            )
        })
    }
}

#[derive(Default, Clone, Debug)]
pub struct ContractCallBuilder {
    artifact: Option<ContractArtifact>,
    function_name: Option<String>,
    args: Option<Vec<Token>>,
    to: Option<Address>,
}

impl ContractCallBuilder {
    pub fn artifact(mut self, artifact: &ContractArtifact) -> Self {
        self.artifact = Some(artifact.clone());
        self
    }

    pub fn function_name(mut self, function_name: impl ToString) -> Self {
        self.function_name = Some(function_name.to_string());
        self
    }

    pub fn args(mut self, args: Vec<Token>) -> Self {
        self.args = Some(args);
        self
    }

    pub fn to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    pub fn build(self) -> eyre::Result<ContractCall> {
        let artifact = self
            .artifact
            .context("ContractCallBuilder missing artifact")?;
        let function_name = self
            .function_name
            .context("ContractCallBuilder missing function_name")?;
        let to = self.to.context("ContractCallBuilder missing to")?;

        let function = artifact.function(&function_name)?.clone();

        let args = self.args.unwrap_or_default();

        if function.inputs.len() != args.len() {
            eyre::bail!(
                "{}.{} takes {} arguments, {} given",
                artifact.contract_name,
                function_name,
                function.inputs.len(),
                args.len()
            );
        }

        Ok(ContractCall {
            contract_name: artifact.contract_name,
            to,
            function,
            args,
        })
    }
}

/// A proxy address paired with the interface of its implementation.
///
/// Calls built through the binding target the proxy, never the
/// implementation contract itself.
#[derive(Debug, Clone)]
pub struct ProxyBinding {
    pub proxy: Address,
    pub implementation: ContractArtifact,
}

impl ProxyBinding {
    pub fn new(proxy: Address, implementation: ContractArtifact) -> Self {
        Self {
            proxy,
            implementation,
        }
    }

    pub fn call(
        &self,
        function_name: &str,
        args: Vec<Token>,
    ) -> eyre::Result<ContractCall> {
        ContractCall::builder()
            .artifact(&self.implementation)
            .function_name(function_name)
            .args(args)
            .to(self.proxy)
            .build()
    }
}
