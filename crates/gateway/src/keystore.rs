//! Keystores - persistence of account key material
//!
//! The wallet holds a single account. A keystore returns the first stored
//! key, or `None` when no account has been created yet.

use async_trait::async_trait;
use relaypay_core::Keypair;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::{GatewayError, GatewayResult};

/// Storage for account keys
#[async_trait]
pub trait Keystore: Send + Sync {
    /// Load the stored account, if any
    async fn load(&self) -> GatewayResult<Option<Keypair>>;

    /// Persist a newly created account
    async fn store(&self, keypair: &Keypair) -> GatewayResult<()>;

    /// Remove every stored account
    async fn clear(&self) -> GatewayResult<()>;
}

/// Keystore kept in process memory
#[derive(Default)]
pub struct MemoryKeystore {
    accounts: Mutex<Vec<Keypair>>,
}

impl MemoryKeystore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Keystore for MemoryKeystore {
    async fn load(&self) -> GatewayResult<Option<Keypair>> {
        let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(accounts.first().cloned())
    }

    async fn store(&self, keypair: &Keypair) -> GatewayResult<()> {
        let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        accounts.push(keypair.clone());
        Ok(())
    }

    async fn clear(&self) -> GatewayResult<()> {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}

/// On-disk keystore document
#[derive(Debug, Default, Serialize, Deserialize)]
struct KeystoreFile {
    accounts: Vec<StoredAccount>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredAccount {
    /// Hex-encoded 32-byte seed
    seed: String,
}

/// JSON file keystore
///
/// Format: `{"accounts": [{"seed": "<hex>"}]}`
pub struct FileKeystore {
    path: PathBuf,
}

impl FileKeystore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> GatewayResult<KeystoreFile> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                GatewayError::Keystore(format!("{} is corrupt: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(KeystoreFile::default()),
            Err(e) => Err(GatewayError::Keystore(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn write(&self, file: &KeystoreFile) -> GatewayResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| GatewayError::Keystore(e.to_string()))?;
            }
        }

        let bytes = serde_json::to_vec_pretty(file)
            .map_err(|e| GatewayError::Keystore(e.to_string()))?;
        tokio::fs::write(&self.path, bytes).await.map_err(|e| {
            GatewayError::Keystore(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl Keystore for FileKeystore {
    async fn load(&self) -> GatewayResult<Option<Keypair>> {
        let file = self.read().await?;
        file.accounts
            .first()
            .map(|stored| {
                Keypair::from_seed_hex(&stored.seed)
                    .map_err(|e| GatewayError::Keystore(format!("Stored key is invalid: {}", e)))
            })
            .transpose()
    }

    async fn store(&self, keypair: &Keypair) -> GatewayResult<()> {
        let mut file = self.read().await?;
        file.accounts.push(StoredAccount {
            seed: keypair.seed_hex(),
        });
        self.write(&file).await?;

        tracing::debug!(
            path = %self.path.display(),
            address = %keypair.address(),
            "Stored account key"
        );
        Ok(())
    }

    async fn clear(&self) -> GatewayResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GatewayError::Keystore(e.to_string())),
        }
    }
}
