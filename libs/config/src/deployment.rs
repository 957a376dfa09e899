//! Deployment Configuration Module
//!
//! Loads factory, migration, persistence and logging settings from TOML files
//! with environment-specific overlays and `PAIRS__`-prefixed environment
//! variable overrides.

use crate::defaults::{
    DEFAULT_CONFIG_PATH, DEFAULT_LOG_LEVEL, ENVIRONMENTS_DIR, ENV_PREFIX, ENV_SEPARATOR,
};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use types::{AccountAddress, InitCodeHash, PairSalt, TokenAddress};

/// Main deployment configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeploymentConfig {
    /// Pair factory settings
    pub factory: FactoryConfig,

    /// Legacy migration settings
    pub migration: MigrationConfig,

    /// Registry persistence
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Factory settings; `deployer` and `init_code_hash` form the derivation salt
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct FactoryConfig {
    pub deployer: AccountAddress,
    pub init_code_hash: InitCodeHash,
    pub fee_to_setter: AccountAddress,
}

impl FactoryConfig {
    /// The registry-wide derivation constant
    pub fn salt(&self) -> PairSalt {
        PairSalt::new(self.deployer, self.init_code_hash)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Wrapped native asset; every legacy exchange pairs its token with it
    pub wrapped_native: TokenAddress,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct PersistenceConfig {
    /// Registry snapshot file (None = in-memory only)
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json: false,
        }
    }
}

impl DeploymentConfig {
    /// Load configuration from files with environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));

        let mut builder = Config::builder().add_source(File::from(base).required(true));

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_dir = base
                .parent()
                .map(|dir| dir.join("environments"))
                .unwrap_or_else(|| PathBuf::from(ENVIRONMENTS_DIR));
            let env_file = env_dir.join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (PAIRS__ prefix)
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let deployment: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        deployment.validate()?;
        Ok(deployment)
    }

    /// Parse a configuration document without file or environment layering
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let deployment: Self =
            toml::from_str(content).context("Failed to parse configuration TOML")?;
        deployment.validate()?;
        Ok(deployment)
    }

    /// Render the configuration back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Reject settings that would produce an unusable registry
    pub fn validate(&self) -> Result<()> {
        if self.factory.deployer.is_zero() {
            bail!("factory.deployer must not be the zero address");
        }
        if self.factory.init_code_hash.is_zero() {
            bail!("factory.init_code_hash must not be zero");
        }
        if self.migration.wrapped_native.is_zero() {
            bail!("migration.wrapped_native must not be the zero address");
        }
        Ok(())
    }
}

/// Convenience function to load configuration from the default location
pub fn load_config(environment: Option<&str>) -> Result<DeploymentConfig> {
    DeploymentConfig::load(None, environment)
}
