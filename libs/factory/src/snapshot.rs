//! Registry snapshots
//!
//! A snapshot is plain JSON: the salt, the fee settings and every pair in
//! creation order. Loading never trusts the stored addresses. Each one is
//! re-derived from its tokens and the configured salt, and any disagreement
//! rejects the whole file.

use crate::derive::derive_for_key;
use crate::error::FactoryError;
use crate::pair::PairInstance;
use crate::registry::{FeeSettings, PairRegistry};
use factory_config::DeploymentConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use types::{AccountAddress, PairAddress, PairKey, PairSalt, TokenAddress};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRecord {
    pub token0: TokenAddress,
    pub token1: TokenAddress,
    pub address: PairAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub version: u32,
    pub salt: PairSalt,
    pub fee_to: Option<AccountAddress>,
    pub fee_to_setter: AccountAddress,
    /// Creation order
    pub pairs: Vec<PairRecord>,
}

impl PairRegistry {
    /// Point-in-time copy of the registry
    pub fn snapshot(&self) -> RegistrySnapshot {
        let fees = self.fee_settings();
        let pairs = self
            .all_pairs()
            .iter()
            .map(|pair| PairRecord {
                token0: pair.token0(),
                token1: pair.token1(),
                address: pair.address(),
            })
            .collect();
        RegistrySnapshot {
            version: SNAPSHOT_VERSION,
            salt: *self.salt(),
            fee_to: fees.fee_to,
            fee_to_setter: fees.fee_to_setter,
            pairs,
        }
    }

    /// Write a snapshot as JSON, replacing `path` atomically
    ///
    /// Each call stages into its own temporary file next to `path`, so
    /// concurrent saves never share a staging file.
    pub fn save_to(&self, path: &Path) -> Result<(), FactoryError> {
        let snapshot = self.snapshot();
        let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };
        let mut staging = NamedTempFile::new_in(parent)?;
        staging.write_all(&serde_json::to_vec_pretty(&snapshot)?)?;
        staging.as_file().sync_all()?;
        staging.persist(path).map_err(|err| err.error)?;
        info!(path = %path.display(), pairs = snapshot.pairs.len(), "registry snapshot saved");
        Ok(())
    }

    /// Rebuild a registry from a snapshot taken under `expected_salt`
    pub fn restore(
        snapshot: RegistrySnapshot,
        expected_salt: &PairSalt,
    ) -> Result<Self, FactoryError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(FactoryError::CorruptSnapshot(format!(
                "unsupported version {}",
                snapshot.version
            )));
        }
        if snapshot.salt != *expected_salt {
            return Err(FactoryError::SaltMismatch {
                expected: *expected_salt,
                found: snapshot.salt,
            });
        }

        let mut seen = HashSet::with_capacity(snapshot.pairs.len());
        let mut instances = Vec::with_capacity(snapshot.pairs.len());
        for (index, record) in snapshot.pairs.into_iter().enumerate() {
            let key = PairKey::new(record.token0, record.token1).map_err(|err| {
                FactoryError::CorruptSnapshot(format!("pair #{index}: {err}"))
            })?;
            if key.token0() != record.token0 {
                return Err(FactoryError::CorruptSnapshot(format!(
                    "pair #{index}: tokens not in canonical order"
                )));
            }
            if !seen.insert(key) {
                return Err(FactoryError::CorruptSnapshot(format!(
                    "pair #{index}: duplicate of an earlier pair"
                )));
            }
            let derived = derive_for_key(&key, expected_salt);
            if derived != record.address {
                return Err(FactoryError::CorruptSnapshot(format!(
                    "pair #{index}: stored address {} but tokens derive {derived}",
                    record.address
                )));
            }
            instances.push(Arc::new(PairInstance::new(derived, key, index)));
        }

        debug!(pairs = instances.len(), "registry restored from snapshot");
        Ok(Self::with_state(
            *expected_salt,
            FeeSettings {
                fee_to: snapshot.fee_to,
                fee_to_setter: snapshot.fee_to_setter,
            },
            instances,
        ))
    }

    /// Read and restore a snapshot file
    pub fn load_from(path: &Path, expected_salt: &PairSalt) -> Result<Self, FactoryError> {
        let bytes = fs::read(path)?;
        let snapshot: RegistrySnapshot = serde_json::from_slice(&bytes)?;
        let registry = Self::restore(snapshot, expected_salt)?;
        info!(path = %path.display(), pairs = registry.len(), "registry snapshot loaded");
        Ok(registry)
    }

    /// Load `path` if it exists, otherwise start an empty registry
    pub fn open(
        path: &Path,
        salt: PairSalt,
        fee_to_setter: AccountAddress,
    ) -> Result<Self, FactoryError> {
        if path.exists() {
            Self::load_from(path, &salt)
        } else {
            debug!(path = %path.display(), "no snapshot yet, starting empty");
            Ok(Self::new(salt, fee_to_setter))
        }
    }

    /// Build the registry a deployment describes, resuming from its snapshot if configured
    pub fn from_deployment(config: &DeploymentConfig) -> Result<Self, FactoryError> {
        match &config.persistence.snapshot_path {
            Some(path) => Self::open(path, config.factory.salt(), config.factory.fee_to_setter),
            None => Ok(Self::from_config(&config.factory)),
        }
    }
}
