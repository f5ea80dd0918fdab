//! Test doubles: a recording [`ChainAdapter`] and hardhat artifact
//! fixtures.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ethers::abi::{Abi, Token};
use ethers::types::{Address, Bytes, H256};
use ethers::utils::keccak256;
use tempfile::TempDir;

use crate::artifacts::{ArtifactStore, ContractArtifact};
use crate::chain::{
    ChainAdapter, FinalizedTx, VerificationOutcome, VerificationRequest,
};
use crate::contracts;
use crate::deployment::DeploymentContext;
use crate::ethers_utils::ContractCall;
use crate::forge_utils::ContractSpec;
use crate::report::Report;
use crate::types::{Chain, SignerRole};

// Well known development keys
pub const CONTRACT_ADMIN_PK: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const PROXY_ADMIN_PK: &str =
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub fn contract_admin() -> Address {
    Address::repeat_byte(0xcc)
}

pub fn proxy_admin() -> Address {
    Address::repeat_byte(0xaa)
}

const TOKEN_FUNCTIONS: &[&str] = &[
    "function mint(address to, uint256 amount)",
    "function approve(address spender, uint256 value) returns (bool)",
    "function grantRole(bytes32 role, address account)",
    "function MINTER_ROLE() view returns (bytes32)",
];

fn abi_source(name: &str) -> Vec<&'static str> {
    let own: &[&str] = match name {
        "ProxyAdmin" => &[
            "constructor(address initialOwner)",
            "function upgrade(address proxy, address implementation)",
            "function owner() view returns (address)",
        ],
        "TransparentUpgradeableProxy" => {
            &["constructor(address _logic, address initialOwner, bytes _data)"]
        }
        "TevaTokenV1" => &["function initialize()"],
        "TevaTokenV2" => &[
            "constructor(address endpoint)",
            "function initialize(address delegate)",
        ],
        "TevaTokenV3" => &["function initializeV3()"],
        "TevaGovernorV1" => &[
            "function initialize(address token, address timelock, uint48 votingDelay, uint32 votingPeriod, uint256 proposalThreshold, uint256 quorumPercentage)",
        ],
        "TevaGovernorV2" => &[
            "function initializeV2(uint48 votingDelay, uint32 votingPeriod, uint256 proposalThreshold, uint256 quorumPercentage)",
        ],
        "TeveTimelockControllerV1" => &[
            "function initialize(uint256 minDelay, address[] proposers, address[] executors)",
        ],
        "MultiVestingWalletCliffV1" => &[
            "function initialize(address token)",
            "function createVestingWallet(address beneficiary, uint64 startTimestamp, uint64 durationSeconds, uint64 cliffTimestamp, uint256 allocation)",
        ],
        "TevaMerkleDistributorV1" => &[
            "function initialize(address token, bytes32 merkleRoot, uint256 maxClaimable, uint256 claimStart, uint256 claimEnd)",
        ],
        "TevaMerkleDistributorV2" => &[
            "function initialize(address token, bytes32 merkleRoot, uint256 maxClaimable, uint256 claimStart, uint256 claimEnd)",
            "function initializeV2(bytes32 merkleRoot, uint256 maxClaimable, uint256 claimStart, uint256 claimEnd)",
        ],
        other => panic!("no fixture abi for {other}"),
    };

    let mut source = own.to_vec();

    if name.starts_with("TevaToken") {
        source.extend_from_slice(TOKEN_FUNCTIONS);
    }

    source
}

fn fixture_abi(name: &str) -> Abi {
    ethers::abi::parse_abi(&abi_source(name)).unwrap()
}

fn fixture_bytecode(name: &str) -> Bytes {
    let mut bytecode = vec![0x60, 0x80, 0x60, 0x40];
    bytecode.extend_from_slice(&keccak256(name.as_bytes())[..8]);
    bytecode.into()
}

/// An in-memory artifact for `spec`.
pub fn artifact(spec: &ContractSpec) -> ContractArtifact {
    ContractArtifact {
        contract_name: spec.name.clone(),
        source_name: spec.source_path().display().to_string(),
        abi: fixture_abi(&spec.name),
        bytecode: fixture_bytecode(&spec.name),
    }
}

pub fn all_contracts() -> Vec<ContractSpec> {
    vec![
        contracts::proxy_admin(),
        contracts::transparent_proxy(),
        contracts::token(Chain::Base),
        contracts::token(Chain::ZkSync),
        contracts::token_upgrade(Chain::ZkSync),
        contracts::token_v3(),
        contracts::governor_v1(),
        contracts::governor_v2(),
        contracts::timelock(),
        contracts::multi_vesting_wallet(),
        contracts::merkle_distributor_v1(),
        contracts::merkle_distributor_v2(),
    ]
}

/// A temporary hardhat artifacts directory holding every known contract.
pub struct ArtifactFixture {
    dir: TempDir,
}

impl ArtifactFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();

        for spec in all_contracts() {
            let artifact = artifact(&spec);
            let path = spec.artifact_path(dir.path());

            std::fs::create_dir_all(path.parent().unwrap()).unwrap();

            let json = serde_json::json!({
                "_format": "hh-sol-artifact-1",
                "contractName": artifact.contract_name,
                "sourceName": artifact.source_name,
                "abi": artifact.abi,
                "bytecode": format!("0x{}", hex::encode(&artifact.bytecode)),
                "deployedBytecode": "0x",
                "linkReferences": {},
                "deployedLinkReferences": {},
            });

            std::fs::write(path, serde_json::to_string_pretty(&json).unwrap())
                .unwrap();
        }

        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn store(&self) -> ArtifactStore {
        ArtifactStore::new(self.root())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChainEvent {
    Deploy {
        role: SignerRole,
        contract: String,
        args: Vec<Token>,
        tx_hash: H256,
    },
    Call {
        role: SignerRole,
        to: Address,
        contract: String,
        function: String,
        args: Vec<Token>,
        tx_hash: H256,
    },
    Query {
        to: Address,
        function: String,
    },
    AwaitFinality {
        tx_hash: H256,
    },
    Verify {
        address: Address,
        contract: String,
    },
}

#[derive(Default)]
struct MockState {
    events: Vec<ChainEvent>,
    nonce: u64,
    created: HashMap<H256, Address>,
    reverting: HashSet<H256>,
    in_flight: usize,
    max_in_flight: usize,
}

/// A [`ChainAdapter`] that records everything and talks to no one.
///
/// The n-th submission gets the hash `n` and, for deployments, the address
/// `0x1000 + n`.
pub struct MockChain {
    chain: Chain,
    verification: VerificationOutcome,
    reverting_function: Option<String>,
    reverting_deploy: Option<String>,
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn new(chain: Chain) -> Self {
        Self {
            chain,
            verification: VerificationOutcome::Verified,
            reverting_function: None,
            reverting_deploy: None,
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn with_verification(mut self, outcome: VerificationOutcome) -> Self {
        self.verification = outcome;
        self
    }

    /// Calls of `function` are accepted but revert on finality.
    pub fn reverting_call(mut self, function: &str) -> Self {
        self.reverting_function = Some(function.to_string());
        self
    }

    /// Deployments of `contract` are accepted but revert on finality.
    pub fn reverting_deploy(mut self, contract: &str) -> Self {
        self.reverting_deploy = Some(contract.to_string());
        self
    }

    pub fn events(&self) -> Vec<ChainEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }

    pub fn address_of(n: u64) -> Address {
        Address::from_low_u64_be(0x1000 + n)
    }

    pub fn deployed(&self) -> Vec<(String, Address)> {
        let state = self.state.lock().unwrap();

        state
            .events
            .iter()
            .filter_map(|event| match event {
                ChainEvent::Deploy {
                    contract, tx_hash, ..
                } => Some((contract.clone(), state.created[tx_hash])),
                _ => None,
            })
            .collect()
    }

    pub fn deployed_address(&self, contract: &str) -> Option<Address> {
        self.deployed()
            .into_iter()
            .find(|(name, _)| name == contract)
            .map(|(_, address)| address)
    }

    pub fn calls(&self) -> Vec<ChainEvent> {
        self.events()
            .into_iter()
            .filter(|event| matches!(event, ChainEvent::Call { .. }))
            .collect()
    }

    pub fn submissions(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| {
                matches!(event, ChainEvent::Deploy { .. } | ChainEvent::Call { .. })
            })
            .count()
    }

    fn submit(&self, reverts: bool, event: impl FnOnce(H256) -> ChainEvent) -> H256 {
        let mut state = self.state.lock().unwrap();

        state.nonce += 1;
        let tx_hash = H256::from_low_u64_be(state.nonce);

        if reverts {
            state.reverting.insert(tx_hash);
        }

        state.in_flight += 1;
        state.max_in_flight = state.max_in_flight.max(state.in_flight);

        let event = event(tx_hash);
        if matches!(event, ChainEvent::Deploy { .. }) {
            let address = Self::address_of(state.nonce);
            state.created.insert(tx_hash, address);
        }
        state.events.push(event);

        tx_hash
    }
}

#[async_trait]
impl ChainAdapter for MockChain {
    fn chain(&self) -> Chain {
        self.chain
    }

    fn signer_address(&self, role: SignerRole) -> eyre::Result<Address> {
        Ok(match role {
            SignerRole::ProxyAdmin => proxy_admin(),
            SignerRole::ContractAdmin => contract_admin(),
        })
    }

    async fn deploy_contract(
        &self,
        role: SignerRole,
        artifact: &ContractArtifact,
        args: &[Token],
    ) -> eyre::Result<H256> {
        artifact.deployment_data(args)?;

        let reverts =
            self.reverting_deploy.as_deref() == Some(artifact.contract_name.as_str());

        Ok(self.submit(reverts, |tx_hash| ChainEvent::Deploy {
            role,
            contract: artifact.contract_name.clone(),
            args: args.to_vec(),
            tx_hash,
        }))
    }

    async fn call_contract(
        &self,
        role: SignerRole,
        call: &ContractCall,
    ) -> eyre::Result<H256> {
        call.calldata()?;

        let reverts =
            self.reverting_function.as_deref() == Some(call.function_name());

        Ok(self.submit(reverts, |tx_hash| ChainEvent::Call {
            role,
            to: call.to,
            contract: call.contract_name.clone(),
            function: call.function_name().to_string(),
            args: call.args.clone(),
            tx_hash,
        }))
    }

    async fn query_contract(&self, call: &ContractCall) -> eyre::Result<Vec<Token>> {
        self.state.lock().unwrap().events.push(ChainEvent::Query {
            to: call.to,
            function: call.function_name().to_string(),
        });

        let output = match call.function_name() {
            "MINTER_ROLE" => vec![minter_role()],
            _ => vec![],
        };

        Ok(output)
    }

    async fn await_finality(&self, tx_hash: H256) -> eyre::Result<FinalizedTx> {
        let mut state = self.state.lock().unwrap();

        state.events.push(ChainEvent::AwaitFinality { tx_hash });
        state.in_flight = state.in_flight.saturating_sub(1);

        if state.reverting.contains(&tx_hash) {
            eyre::bail!("Transaction {tx_hash:?} reverted");
        }

        Ok(FinalizedTx {
            tx_hash,
            block_number: Some(tx_hash.to_low_u64_be()),
            contract_address: state.created.get(&tx_hash).copied(),
        })
    }

    async fn verify_source(
        &self,
        request: &VerificationRequest,
    ) -> VerificationOutcome {
        self.state.lock().unwrap().events.push(ChainEvent::Verify {
            address: request.address,
            contract: request.contract.name.clone(),
        });

        self.verification.clone()
    }
}

pub fn minter_role() -> Token {
    Token::FixedBytes(keccak256("MINTER_ROLE").to_vec())
}

pub fn context(chain: Arc<MockChain>, fixture: &ArtifactFixture) -> DeploymentContext {
    let chain_id = chain.chain();

    DeploymentContext::new(chain, fixture.store(), true, Report::new(chain_id))
}
