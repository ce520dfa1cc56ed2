//! Keypair - Ed25519 key material controlling a ledger account
//!
//! Key material is created once (generated or recovered from a seed) and is
//! never mutated afterwards.

use crate::address::Address;
use ed25519_dalek::{Signer as DalekSigner, SigningKey};
use std::fmt;
use thiserror::Error;

/// Errors from loading key material
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid key hex: {0}")]
    InvalidHex(String),

    #[error("Key must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Ed25519 keypair for a single account
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Recover from a 32-byte seed (hex-encoded)
    pub fn from_seed_hex(hex_seed: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_seed.trim()).map_err(|e| KeyError::InvalidHex(e.to_string()))?;

        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| KeyError::InvalidLength(b.len()))?;

        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    /// Export the seed as hex (for storage)
    pub fn seed_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Public address of this account
    pub fn address(&self) -> Address {
        Address::from_verifying_key(&self.signing_key.verifying_key())
    }

    /// Sign a payload, returning the hex-encoded signature
    pub fn sign(&self, payload: &[u8]) -> String {
        hex::encode(self.signing_key.sign(payload).to_bytes())
    }
}

// Never print the seed.
impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
