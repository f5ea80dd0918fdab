use std::collections::BTreeMap;

use ethers::types::Address;
use serde::{Deserialize, Serialize};

use self::contract_deployment::{ContractDeployment, TransactionRecord};
use crate::types::Chain;

pub mod contract_deployment;

pub const REPORT_PATH: &str = "report.yml";

/// Everything a deployment produced, persisted after every step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub chain: Chain,

    #[serde(default)]
    pub proxy_admin: Option<ContractDeployment>,

    #[serde(default)]
    pub contracts: BTreeMap<String, UpgradeableDeployment>,

    #[serde(default)]
    pub upgrades: Vec<UpgradeRecord>,

    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

/// An implementation and the proxy in front of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeableDeployment {
    pub implementation: ContractDeployment,
    pub proxy: ContractDeployment,
    pub proxy_admin: Address,
    #[serde(default)]
    pub initializer: Option<TransactionRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeRecord {
    pub target: String,
    pub proxy: Address,
    pub implementation: ContractDeployment,
    pub upgrade: TransactionRecord,
    #[serde(default)]
    pub reinitializer: Option<TransactionRecord>,
}

impl Report {
    pub fn new(chain: Chain) -> Self {
        Self {
            chain,
            proxy_admin: None,
            contracts: BTreeMap::new(),
            upgrades: vec![],
            transactions: vec![],
        }
    }
}
