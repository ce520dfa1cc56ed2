//! Address - Public account address on the ledger
//!
//! Format: lowercase hex encoding of the 32-byte ed25519 verifying key.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing addresses or checking signatures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid address hex: {0}")]
    InvalidHex(String),

    #[error("Address must be 32 bytes, got {0}")]
    InvalidLength(usize),

    #[error("Address is not a valid ed25519 public key: {0}")]
    InvalidKey(String),

    #[error("Signature verification failed: {0}")]
    BadSignature(String),
}

/// Public address of a ledger account
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Build an address from a verifying key
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(hex::encode(key.to_bytes()))
    }

    /// Hex form of the address
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the verifying key behind this address
    pub fn verifying_key(&self) -> Result<VerifyingKey, AddressError> {
        let bytes = hex::decode(&self.0).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| AddressError::InvalidLength(b.len()))?;
        VerifyingKey::from_bytes(&array).map_err(|e| AddressError::InvalidKey(e.to_string()))
    }

    /// Verify a hex-encoded signature over `payload` made by this account
    pub fn verify(&self, payload: &[u8], signature_hex: &str) -> Result<(), AddressError> {
        let key = self.verifying_key()?;

        let sig_bytes =
            hex::decode(signature_hex).map_err(|e| AddressError::BadSignature(e.to_string()))?;
        let sig_array: [u8; 64] = sig_bytes
            .try_into()
            .map_err(|_| AddressError::BadSignature("Signature must be 64 bytes".to_string()))?;

        key.verify(payload, &Signature::from_bytes(&sig_array))
            .map_err(|e| AddressError::BadSignature(e.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let address = Address(normalized);
        address.verifying_key()?;
        Ok(address)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Keypair;

    #[test]
    fn test_parse_roundtrip() {
        let keypair = Keypair::generate();
        let address = keypair.address();
        let parsed: Address = address.to_string().parse().unwrap();
        assert_eq!(parsed, address);
    }

    #[test]
    fn test_parse_normalizes_case() {
        let address = Keypair::generate().address();
        let upper = address.as_str().to_uppercase();
        assert_eq!(upper.parse::<Address>().unwrap(), address);
    }

    #[test]
    fn test_invalid_hex() {
        let result: Result<Address, _> = "not-hex".parse();
        assert!(matches!(result, Err(AddressError::InvalidHex(_))));
    }

    #[test]
    fn test_invalid_length() {
        let result: Result<Address, _> = "abcd".parse();
        assert!(matches!(result, Err(AddressError::InvalidLength(2))));
    }

    #[test]
    fn test_verify_signature() {
        let keypair = Keypair::generate();
        let signature = keypair.sign(b"payload");

        assert!(keypair.address().verify(b"payload", &signature).is_ok());
        assert!(matches!(
            keypair.address().verify(b"tampered", &signature),
            Err(AddressError::BadSignature(_))
        ));
    }

    #[test]
    fn test_serde_rejects_garbage() {
        let parsed: Result<Address, _> = serde_json::from_str("\"zz\"");
        assert!(parsed.is_err());
    }
}
