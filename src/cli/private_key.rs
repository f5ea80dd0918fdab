use std::fmt;
use std::str::FromStr;

use ethers::prelude::k256::SecretKey;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;

/// A secp256k1 signing key read from configuration.
///
/// `{}` prints a redacted placeholder so keys never end up in logs; `{:#}`
/// prints the `0x`-prefixed hex form for handing over to `forge`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    pub key: SecretKey,
}

impl PrivateKey {
    pub fn address(&self) -> Address {
        self.wallet().address()
    }

    pub fn wallet(&self) -> LocalWallet {
        LocalWallet::from(self.key.clone())
    }
}

impl FromStr for PrivateKey {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches("0x");

        let bytes = hex::decode(s)?;

        let key = SecretKey::from_slice(&bytes)?;

        Ok(Self { key })
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x{}", hex::encode(self.key.to_bytes()))
        } else {
            write!(f, "0x****")
        }
    }
}
