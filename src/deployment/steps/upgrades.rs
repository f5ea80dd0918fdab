use ethers::abi::Token;
use ethers::types::Address;
use tracing::instrument;

use super::governor::GovernorSettings;
use super::merkle_distributor::{ClaimSettings, DistributorKind};
use super::token::LAYERZERO_BASE_ENDPOINT_V2;
use super::TEVA_TOKEN_CONTRACT;
use crate::cli::UpgradeTarget;
use crate::config::{ConfigError, EnvReader};
use crate::contracts;
use crate::deployment::pipeline::{ContractUpgrade, Initializer};
use crate::deployment::DeploymentContext;
use crate::report::UpgradeRecord;
use crate::types::Chain;

pub const TEVA_GOVERNOR_CONTRACT_ADDRESS: &str = "TEVA_GOVERNOR_CONTRACT_ADDRESS";

/// Everything an upgrade needs, read before anything is sent.
#[derive(Debug, Clone)]
pub struct UpgradeParams {
    pub target: UpgradeTarget,
    pub upgrade: ContractUpgrade,
}

impl UpgradeParams {
    pub fn from_env(
        env: &EnvReader,
        chain: Chain,
        target: UpgradeTarget,
    ) -> Result<Self, ConfigError> {
        let (proxy_key, implementation, constructor_args, reinitializer) =
            match target {
                UpgradeTarget::Token => {
                    let constructor_args = match chain {
                        Chain::Base => vec![Token::Address(
                            env.address(LAYERZERO_BASE_ENDPOINT_V2)?,
                        )],
                        Chain::ZkSync => vec![],
                    };

                    (
                        TEVA_TOKEN_CONTRACT,
                        contracts::token_upgrade(chain),
                        constructor_args,
                        None,
                    )
                }
                UpgradeTarget::TokenV3 => (
                    TEVA_TOKEN_CONTRACT,
                    contracts::token_v3(),
                    vec![],
                    Some(Initializer::new("initializeV3", vec![])),
                ),
                UpgradeTarget::GovernorV2 => {
                    let settings = GovernorSettings::from_env(env)?;

                    (
                        TEVA_GOVERNOR_CONTRACT_ADDRESS,
                        contracts::governor_v2(),
                        vec![],
                        Some(Initializer::new("initializeV2", settings.tokens())),
                    )
                }
                UpgradeTarget::CommunityMerkleDistributorV2
                | UpgradeTarget::InvestorMerkleDistributorV2 => {
                    let kind = match target {
                        UpgradeTarget::CommunityMerkleDistributorV2 => {
                            DistributorKind::Community
                        }
                        _ => DistributorKind::Investor,
                    };
                    let claim = ClaimSettings::from_env(env, kind)?;

                    (
                        kind.contract_address_key(),
                        contracts::merkle_distributor_v2(),
                        vec![],
                        Some(Initializer::new("initializeV2", claim.tokens())),
                    )
                }
            };

        let proxy = env.address(proxy_key)?;
        let proxy_admin: Address = super::proxy_admin_contract(env, chain)?;

        Ok(Self {
            target,
            upgrade: ContractUpgrade {
                name: target.to_string(),
                proxy,
                proxy_admin,
                implementation,
                constructor_args,
                reinitializer,
            },
        })
    }
}

#[instrument(skip_all, fields(target = %params.target))]
pub async fn run(
    context: &DeploymentContext,
    params: &UpgradeParams,
) -> eyre::Result<UpgradeRecord> {
    super::upgrade(context, params.upgrade.clone()).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use ethers::types::U256;
    use maplit::hashmap;

    use super::*;
    use crate::forge_utils::ContractSpec;
    use crate::testing::{self, ArtifactFixture, ChainEvent, MockChain};
    use crate::types::SignerRole;

    fn env() -> HashMap<&'static str, &'static str> {
        hashmap! {
            "BASE_PROXY_ADMIN_CONTRACT_ADDRESS" => "0x00000000000000000000000000000000000000ad",
            "LAYERZERO_BASE_ENDPOINT_V2" => "0x0000000000000000000000000000000000001a7e",
            "TEVA_TOKEN_CONTRACT" => "0x0000000000000000000000000000000000000070",
            "TEVA_GOVERNOR_CONTRACT_ADDRESS" => "0x0000000000000000000000000000000000000090",
            "TEVA_VOTING_DELAY" => "1",
            "TEVA_VOTING_PERIOD" => "50400",
            "TEVA_PROPOSAL_THRESHOLD" => "1000",
            "TEVA_QUORUM_PERCENTAGE" => "4",
            "TEVA_INVESTOR_MERKLE_DISTRIBUTOR_CONTRACT_ADDRESS" => "0x0000000000000000000000000000000000000091",
            "INVESTOR_MERKEL_ROOT" => "0x0101010101010101010101010101010101010101010101010101010101010101",
            "INVESTOR_MAX_CLAIMABLE_LIMIT" => "5",
            "CLAIM_START_TIME" => "1700000000",
            "CLAIM_END_TIME" => "1800000000",
        }
    }

    fn params(target: UpgradeTarget) -> UpgradeParams {
        let env = env();
        UpgradeParams::from_env(&EnvReader::new(&env), Chain::Base, target).unwrap()
    }

    #[test]
    fn base_token_upgrade_keeps_the_endpoint() {
        let params = params(UpgradeTarget::Token);

        assert_eq!(params.upgrade.proxy, Address::from_low_u64_be(0x70));
        assert_eq!(
            params.upgrade.constructor_args,
            vec![Token::Address(Address::from_low_u64_be(0x1a7e))]
        );
        assert!(params.upgrade.reinitializer.is_none());
    }

    #[test]
    fn governor_upgrade_needs_the_governor_address() {
        let mut env = env();
        env.remove(TEVA_GOVERNOR_CONTRACT_ADDRESS);

        let err = UpgradeParams::from_env(
            &EnvReader::new(&env),
            Chain::Base,
            UpgradeTarget::GovernorV2,
        )
        .unwrap_err();

        assert_eq!(err.key(), TEVA_GOVERNOR_CONTRACT_ADDRESS);
    }

    #[test]
    fn every_key_of_a_target_is_required() {
        let targets = [
            (
                UpgradeTarget::Token,
                vec![
                    "BASE_PROXY_ADMIN_CONTRACT_ADDRESS",
                    "LAYERZERO_BASE_ENDPOINT_V2",
                    "TEVA_TOKEN_CONTRACT",
                ],
            ),
            (
                UpgradeTarget::TokenV3,
                vec!["BASE_PROXY_ADMIN_CONTRACT_ADDRESS", "TEVA_TOKEN_CONTRACT"],
            ),
            (
                UpgradeTarget::GovernorV2,
                vec![
                    "BASE_PROXY_ADMIN_CONTRACT_ADDRESS",
                    "TEVA_GOVERNOR_CONTRACT_ADDRESS",
                    "TEVA_VOTING_DELAY",
                    "TEVA_VOTING_PERIOD",
                    "TEVA_PROPOSAL_THRESHOLD",
                    "TEVA_QUORUM_PERCENTAGE",
                ],
            ),
            (
                UpgradeTarget::InvestorMerkleDistributorV2,
                vec![
                    "BASE_PROXY_ADMIN_CONTRACT_ADDRESS",
                    "TEVA_INVESTOR_MERKLE_DISTRIBUTOR_CONTRACT_ADDRESS",
                    "INVESTOR_MERKEL_ROOT",
                    "INVESTOR_MAX_CLAIMABLE_LIMIT",
                    "CLAIM_START_TIME",
                    "CLAIM_END_TIME",
                ],
            ),
        ];

        for (target, keys) in targets {
            let full = env();
            let target_env: HashMap<_, _> =
                keys.iter().map(|key| (*key, full[key])).collect();

            UpgradeParams::from_env(
                &EnvReader::new(&target_env),
                Chain::Base,
                target,
            )
            .unwrap();

            for key in &keys {
                let mut env = target_env.clone();
                env.remove(key);

                let err =
                    UpgradeParams::from_env(&EnvReader::new(&env), Chain::Base, target)
                        .unwrap_err();

                assert_eq!(err.key(), *key, "{target}");
            }
        }
    }

    #[tokio::test]
    async fn zksync_token_upgrade_builds_the_root_token_source() {
        let env = hashmap! {
            "PROXY_ADMIN_CONTRACT_ADDRESS" => "0x00000000000000000000000000000000000000ad",
            "TEVA_TOKEN_CONTRACT" => "0x0000000000000000000000000000000000000070",
        };

        let params = UpgradeParams::from_env(
            &EnvReader::new(&env),
            Chain::ZkSync,
            UpgradeTarget::Token,
        )
        .unwrap();

        assert_eq!(
            params.upgrade.implementation,
            ContractSpec::path_name("contracts/TevaTokenV1.sol", "TevaTokenV1")
        );
        assert!(params.upgrade.constructor_args.is_empty());

        let fixture = ArtifactFixture::new();
        let mock = Arc::new(MockChain::new(Chain::ZkSync));
        let context = testing::context(mock.clone(), &fixture);

        let record = run(&context, &params).await.unwrap();

        let implementation = mock.deployed_address("TevaTokenV1").unwrap();
        assert_eq!(record.proxy, Address::from_low_u64_be(0x70));

        match mock.calls().as_slice() {
            [ChainEvent::Call { to, function, args, .. }] => {
                assert_eq!(*to, Address::from_low_u64_be(0xad));
                assert_eq!(function, "upgrade");
                assert_eq!(
                    args,
                    &vec![
                        Token::Address(Address::from_low_u64_be(0x70)),
                        Token::Address(implementation),
                    ]
                );
            }
            other => panic!("unexpected calls {other:?}"),
        }
    }

    #[tokio::test]
    async fn reinitializer_targets_the_existing_proxy() {
        let fixture = ArtifactFixture::new();
        let mock = Arc::new(MockChain::new(Chain::Base));
        let context = testing::context(mock.clone(), &fixture);

        let params = params(UpgradeTarget::InvestorMerkleDistributorV2);
        let proxy = Address::from_low_u64_be(0x91);

        let record = run(&context, &params).await.unwrap();

        assert_eq!(record.proxy, proxy);

        let implementation = mock.deployed_address("TevaMerkleDistributorV2").unwrap();

        match mock.calls().as_slice() {
            [ChainEvent::Call {
                role: upgrade_role,
                to: upgrade_to,
                function: upgrade_fn,
                args: upgrade_args,
                ..
            }, ChainEvent::Call {
                role: reinit_role,
                to: reinit_to,
                function: reinit_fn,
                args: reinit_args,
                ..
            }] => {
                assert_eq!(*upgrade_role, SignerRole::ProxyAdmin);
                assert_eq!(*upgrade_to, Address::from_low_u64_be(0xad));
                assert_eq!(upgrade_fn, "upgrade");
                assert_eq!(
                    upgrade_args,
                    &vec![Token::Address(proxy), Token::Address(implementation)]
                );

                assert_eq!(*reinit_role, SignerRole::ContractAdmin);
                assert_eq!(*reinit_to, proxy);
                assert_eq!(reinit_fn, "initializeV2");
                assert_eq!(reinit_args.len(), 4);
                assert_eq!(reinit_args[1], Token::Uint(U256::from(5u64) * U256::exp10(18)));
            }
            other => panic!("unexpected calls {other:?}"),
        }

        assert_eq!(context.report().await.upgrades, vec![record]);
    }

    #[tokio::test]
    async fn token_v3_calls_its_reinitializer_once() {
        let fixture = ArtifactFixture::new();
        let mock = Arc::new(MockChain::new(Chain::Base));
        let context = testing::context(mock.clone(), &fixture);

        run(&context, &params(UpgradeTarget::TokenV3)).await.unwrap();

        let reinitializations = mock
            .calls()
            .into_iter()
            .filter(|event| {
                matches!(event, ChainEvent::Call { function, .. } if function == "initializeV3")
            })
            .count();

        assert_eq!(reinitializations, 1);
    }
}
