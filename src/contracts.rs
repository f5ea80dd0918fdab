//! Fully qualified names of the contracts this tool deploys.

use crate::forge_utils::ContractSpec;
use crate::types::Chain;

pub fn proxy_admin() -> ContractSpec {
    ContractSpec::path_name("contracts/proxy/ProxyAdmin.sol", "ProxyAdmin")
}

pub fn transparent_proxy() -> ContractSpec {
    ContractSpec::path_name(
        "contracts/proxy/TransparentUpgradeableProxy.sol",
        "TransparentUpgradeableProxy",
    )
}

/// The token implementation of a chain. Base carries the LayerZero OFT
/// variant.
pub fn token(chain: Chain) -> ContractSpec {
    match chain {
        Chain::Base => ContractSpec::path_name(
            "contracts/token/TevaTokenV2.sol",
            "TevaTokenV2",
        ),
        Chain::ZkSync => ContractSpec::path_name(
            "contracts/token/TevaTokenV1.sol",
            "TevaTokenV1",
        ),
    }
}

/// The implementation a `token` upgrade deploys. On zksync the upgraded
/// `TevaTokenV1` is built from `contracts/TevaTokenV1.sol`, not from the
/// source of the first deployment.
pub fn token_upgrade(chain: Chain) -> ContractSpec {
    match chain {
        Chain::Base => token(Chain::Base),
        Chain::ZkSync => {
            ContractSpec::path_name("contracts/TevaTokenV1.sol", "TevaTokenV1")
        }
    }
}

pub fn token_v3() -> ContractSpec {
    ContractSpec::path_name("contracts/TevaTokenV3.sol", "TevaTokenV3")
}

pub fn governor_v1() -> ContractSpec {
    ContractSpec::path_name("contracts/TevaGovernorV1.sol", "TevaGovernorV1")
}

pub fn governor_v2() -> ContractSpec {
    ContractSpec::path_name("contracts/TevaGovernorV2.sol", "TevaGovernorV2")
}

pub fn timelock() -> ContractSpec {
    ContractSpec::path_name(
        "contracts/TeveTimelockControllerV1.sol",
        "TeveTimelockControllerV1",
    )
}

pub fn multi_vesting_wallet() -> ContractSpec {
    ContractSpec::path_name(
        "contracts/MultiVestingWalletCliffV1.sol",
        "MultiVestingWalletCliffV1",
    )
}

pub fn merkle_distributor_v1() -> ContractSpec {
    ContractSpec::path_name(
        "contracts/TevaMerkleDistributorV1.sol",
        "TevaMerkleDistributorV1",
    )
}

pub fn merkle_distributor_v2() -> ContractSpec {
    ContractSpec::path_name(
        "contracts/TevaMerkleDistributorV2.sol",
        "TevaMerkleDistributorV2",
    )
}
