//! Deployment fixture

use amm::InMemoryAmm;
use anyhow::{Context, Result};
use factory_config::{
    DeploymentConfig, FactoryConfig, LoggingConfig, MigrationConfig, PersistenceConfig,
};
use pair_factory::{PairInstance, PairRegistry};
use periphery::{InMemoryLegacyExchange, LegacyFactory, MigrationCoordinator, Router};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;
use types::{keccak256, AccountAddress, InitCodeHash, TokenAddress};

/// Deterministic token address for a label
pub fn token(label: &str) -> TokenAddress {
    TokenAddress::from_word(&keccak256(&[b"token:", label.as_bytes()]))
}

/// Deterministic account address for a label
pub fn account(label: &str) -> AccountAddress {
    AccountAddress::from_word(&keccak256(&[b"account:", label.as_bytes()]))
}

/// Configuration the fixture deploys with
pub fn deployment_config() -> DeploymentConfig {
    DeploymentConfig {
        factory: FactoryConfig {
            deployer: account("factory"),
            init_code_hash: InitCodeHash::of_code(b"pair creation code"),
            fee_to_setter: account("wallet"),
        },
        migration: MigrationConfig {
            wrapped_native: token("WETH"),
        },
        persistence: PersistenceConfig::default(),
        logging: LoggingConfig::default(),
    }
}

/// A pair's tokens in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddPairResult {
    pub token0: TokenAddress,
    pub token1: TokenAddress,
}

/// Create the pair unless it exists and report its canonical token order
pub fn add_pair(
    registry: &PairRegistry,
    token_a: TokenAddress,
    token_b: TokenAddress,
) -> Result<AddPairResult> {
    let pair = match registry.get_pair(token_a, token_b) {
        Some(existing) => existing,
        None => registry
            .create_pair(token_a, token_b)
            .with_context(|| format!("creating pair {token_a}/{token_b}"))?,
    };
    Ok(AddPairResult {
        token0: pair.token0(),
        token1: pair.token1(),
    })
}

pub struct V2Fixture {
    pub config: DeploymentConfig,
    pub wallet: AccountAddress,
    pub token0: TokenAddress,
    pub token1: TokenAddress,
    pub weth: TokenAddress,
    pub weth_partner: TokenAddress,
    pub factory_v1: Arc<LegacyFactory>,
    pub factory_v2: Arc<PairRegistry>,
    pub amm: Arc<InMemoryAmm>,
    pub router: Arc<Router>,
    pub migrator: MigrationCoordinator,
    pub weth_exchange_v1: Arc<InMemoryLegacyExchange>,
    pub pair: Arc<PairInstance>,
    pub weth_pair: Arc<PairInstance>,
}

impl V2Fixture {
    pub fn deploy() -> Result<Self> {
        Self::deploy_with(deployment_config())
    }

    pub fn deploy_with(config: DeploymentConfig) -> Result<Self> {
        config.validate()?;
        let wallet = config.factory.fee_to_setter;
        let token_a = token("tokenA");
        let token_b = token("tokenB");
        let weth = config.migration.wrapped_native;
        let weth_partner = token("WETHPartner");

        let factory_v1 = Arc::new(LegacyFactory::new());
        let factory_v2 = Arc::new(
            PairRegistry::from_deployment(&config).context("opening pair registry")?,
        );
        let amm = Arc::new(InMemoryAmm::new());
        let router = Arc::new(Router::new(Arc::clone(&factory_v2), amm.clone(), weth));
        let migrator = MigrationCoordinator::new(Arc::clone(&router));

        let weth_exchange_v1 = factory_v1
            .create_exchange(weth_partner)
            .context("creating legacy WETH partner exchange")?;

        let pair = factory_v2.create_pair(token_a, token_b)?;
        let (token0, token1) = (pair.token0(), pair.token1());
        let weth_pair = factory_v2.create_pair(weth, weth_partner)?;

        debug!(
            init_code_hash = %config.factory.init_code_hash,
            pair = %pair.address(),
            weth_pair = %weth_pair.address(),
            "fixture deployed"
        );

        Ok(Self {
            config,
            wallet,
            token0,
            token1,
            weth,
            weth_partner,
            factory_v1,
            factory_v2,
            amm,
            router,
            migrator,
            weth_exchange_v1,
            pair,
            weth_pair,
        })
    }

    /// Give `holder` a position in the legacy WETH partner exchange
    pub fn seed_legacy_position(
        &self,
        holder: AccountAddress,
        base: Decimal,
        paired: Decimal,
    ) -> Result<Decimal> {
        self.weth_exchange_v1
            .add_liquidity(holder, base, paired)
            .context("seeding legacy position")
    }
}
