//! # Pair Factory Configuration
//!
//! Centralized deployment configuration for the pair factory workspace.
//!
//! ## Features
//!
//! - **Factory Settings**: deployer address and init-code hash forming the
//!   write-once [`PairSalt`](types::PairSalt), plus the fee setter
//! - **Migration Settings**: the wrapped native asset that legacy positions pair with
//! - **Persistence**: optional registry snapshot location
//! - **Logging**: `tracing-subscriber` bootstrap
//!
//! ## Usage
//!
//! ```no_run
//! use factory_config::{load_config, logging};
//!
//! let config = load_config(None).unwrap();
//! logging::init_logging(&config.logging);
//! let salt = config.factory.salt();
//! ```

pub mod defaults;
pub mod deployment;
pub mod logging;

pub use deployment::{
    load_config, DeploymentConfig, FactoryConfig, LoggingConfig, MigrationConfig,
    PersistenceConfig,
};
