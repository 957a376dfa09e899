//! Default locations and names used when loading configuration

/// Base configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/factory.toml";

/// Directory holding `<environment>.toml` overlays
pub const ENVIRONMENTS_DIR: &str = "config/environments";

/// Prefix for environment variable overrides, e.g. `PAIRS__FACTORY__DEPLOYER`
pub const ENV_PREFIX: &str = "PAIRS";

/// Separator between prefix and nested keys in environment overrides
pub const ENV_SEPARATOR: &str = "__";

/// Log level used when neither the config nor `RUST_LOG` set one
pub const DEFAULT_LOG_LEVEL: &str = "info";
