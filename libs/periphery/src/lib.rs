//! # Periphery
//!
//! Everything that sits around the pair registry rather than inside it:
//!
//! - [`router`]: creates pairs on demand and deposits at the pool's price
//! - [`legacy`]: the legacy exchange contract plus an in-memory exchange and factory
//! - [`migrator`]: moves a holder's legacy position into the matching pair
//!
//! Pool reserves are owned by an [`amm::AmmCollaborator`]; legacy positions by a
//! [`LegacyExchange`]. Both are async and treated as remote.

pub mod legacy;
pub mod migrator;
pub mod router;

pub use legacy::{
    InMemoryLegacyExchange, LegacyError, LegacyExchange, LegacyFactory, LegacyPosition,
};
pub use migrator::{
    MigratedAmounts, MigrationCoordinator, MigrationError, MigrationLimits, MigrationStep,
};
pub use router::{AddLiquidity, LiquidityReceipt, Router, RouterError};
