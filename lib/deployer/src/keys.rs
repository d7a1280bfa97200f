//! Key derivation helpers.
//!
//! A [`PrivateKey`] is derived from a BIP-39 mnemonic along the standard
//! Ethereum path `m/44'/60'/0'/0/{index}`, and maps to a single [`Address`].
use std::str::FromStr;

use alloy::{
    primitives::{Address, B256},
    signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner},
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Error, Result};

/// A validated secp256k1 private key.
#[derive(Clone, Debug)]
pub struct PrivateKey(PrivateKeySigner);

impl PrivateKey {
    /// Wrap raw key material.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidPrivateKey`] - If `bytes` is zero or not below the
    ///   curve order.
    pub fn from_bytes(bytes: &B256) -> Result<Self> {
        PrivateKeySigner::from_bytes(bytes)
            .map(Self)
            .map_err(|e| Error::InvalidPrivateKey(e.to_string()))
    }

    /// Parse a hex encoded key, with or without the `0x` prefix.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidPrivateKey`] - If `hex` is not 32 bytes of hex, or
    ///   not a valid key.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = B256::from_str(hex.trim())
            .map_err(|e| Error::InvalidPrivateKey(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Raw key material.
    #[must_use]
    pub fn to_bytes(&self) -> B256 {
        self.0.to_bytes()
    }

    /// Address controlled by this key.
    #[must_use]
    pub fn address(&self) -> Address {
        self.0.address()
    }

    /// Local signer backed by this key.
    #[must_use]
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.0
    }
}

impl FromStr for PrivateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

/// Derive the first account key (`m/44'/60'/0'/0/0`) of `mnemonic`.
///
/// # Errors
///
/// * [`Error::InvalidMnemonic`] - If the phrase has unknown words, a wrong
///   word count or a bad checksum.
pub fn get_private_key(mnemonic: &str) -> Result<PrivateKey> {
    get_private_key_at(mnemonic, 0)
}

/// Derive the key of account `index` (`m/44'/60'/0'/0/{index}`).
///
/// # Errors
///
/// * [`Error::InvalidMnemonic`] - If the phrase cannot be decoded.
pub fn get_private_key_at(mnemonic: &str, index: u32) -> Result<PrivateKey> {
    let invalid = |e: alloy::signers::local::LocalSignerError| {
        Error::InvalidMnemonic(e.to_string())
    };

    let signer = MnemonicBuilder::<English>::default()
        .phrase(mnemonic.trim())
        .index(index)
        .map_err(invalid)?
        .build()
        .map_err(invalid)?;

    Ok(PrivateKey(signer))
}

/// Address controlled by `private_key`.
///
/// The [`std::fmt::Display`] form of the returned [`Address`] is checksummed
/// (EIP-55).
#[must_use]
pub fn private_key_to_address(private_key: &PrivateKey) -> Address {
    private_key.address()
}

/// Whether `candidate` is a well-formed address.
///
/// Accepts 40 hex digits with an optional `0x` prefix. All-lowercase and
/// all-uppercase forms are accepted as is, mixed case must carry a valid
/// EIP-55 checksum.
#[must_use]
pub fn is_address(candidate: &str) -> bool {
    static ADDRESS_REGEX: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?:0[xX])?([0-9a-fA-F]{40})$")
            .expect("address regex should compile")
    });

    let Some(digits) = ADDRESS_REGEX
        .captures(candidate)
        .and_then(|captures| captures.get(1))
        .map(|digits| digits.as_str())
    else {
        return false;
    };

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }

    Address::parse_checksummed(format!("0x{digits}"), None).is_ok()
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, b256};

    use super::*;

    const MNEMONIC: &str =
        "test test test test test test test test test test test junk";

    #[test]
    fn derives_first_account() {
        let key = get_private_key(MNEMONIC).expect("should derive key");

        assert_eq!(
            key.to_bytes(),
            b256!(
                "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
            )
        );
        assert_eq!(
            private_key_to_address(&key),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn derives_indexed_account() {
        let key = get_private_key_at(MNEMONIC, 1).expect("should derive key");

        assert_eq!(
            private_key_to_address(&key),
            address!("70997970C51812dc3A010C7d01b50e0d17dc79C8")
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let first = get_private_key(MNEMONIC).expect("should derive key");
        let second = get_private_key(&format!("  {MNEMONIC}\n"))
            .expect("should derive key");

        assert_eq!(first.to_bytes(), second.to_bytes());
    }

    #[test]
    fn rejects_malformed_mnemonic() {
        let err = get_private_key("definitely not a mnemonic phrase")
            .expect_err("should reject unknown words");

        assert!(matches!(err, Error::InvalidMnemonic(_)));
    }

    #[test]
    fn address_is_checksummed() {
        let key = get_private_key(MNEMONIC).expect("should derive key");
        let address = private_key_to_address(&key).to_string();

        assert_eq!(address, "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert!(is_address(&address));
    }

    #[test]
    fn parses_hex_private_key() {
        let key = PrivateKey::from_hex(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .expect("should parse key");

        assert_eq!(
            key.address(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn rejects_zero_private_key() {
        let err = PrivateKey::from_bytes(&B256::ZERO)
            .expect_err("zero is not a valid key");

        assert!(matches!(err, Error::InvalidPrivateKey(_)));
    }

    #[test]
    fn rejects_short_private_key() {
        let err = "0x1234".parse::<PrivateKey>().expect_err("too short");

        assert!(matches!(err, Error::InvalidPrivateKey(_)));
    }

    #[test]
    fn validates_addresses() {
        assert!(is_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
        assert!(is_address("0xF39FD6E51AAD88F6F4CE6AB8827279CFFFB92266"));
        assert!(is_address("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
        assert!(is_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));

        // Bad checksum.
        assert!(!is_address("0xF39fd6e51aad88F6F4ce6aB8827279cffFb92266"));
        assert!(!is_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb9226"));
        assert!(!is_address("0xg39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
        assert!(!is_address(""));
    }
}
