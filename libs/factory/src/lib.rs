//! # Pair Factory
//!
//! Registry of constant-product pairs keyed by an unordered token pair.
//!
//! - [`derive`]: CREATE2-style address derivation from the sorted tokens and
//!   the registry's [`PairSalt`](types::PairSalt)
//! - [`registry`]: idempotent, thread-safe `create_pair` with creation-order
//!   enumeration and fee administration
//! - [`events`]: `PairCreated` notifications over crossbeam channels
//! - [`snapshot`]: JSON persistence with address re-derivation on load
//!
//! ```
//! use pair_factory::PairRegistry;
//! use types::{AccountAddress, InitCodeHash, PairSalt, TokenAddress};
//!
//! let salt = PairSalt::new(AccountAddress::from_bytes([1; 20]), InitCodeHash::of_code(b"pair"));
//! let registry = PairRegistry::new(salt, AccountAddress::from_bytes([2; 20]));
//!
//! let a = TokenAddress::from_bytes([0xaa; 20]);
//! let b = TokenAddress::from_bytes([0xbb; 20]);
//! let pair = registry.create_pair(b, a).unwrap();
//! assert_eq!(pair.token0(), a);
//! assert_eq!(Some(pair.address()), registry.pair_for(a, b).ok());
//! ```

pub mod derive;
pub mod error;
pub mod events;
pub mod pair;
pub mod registry;
pub mod snapshot;

pub use derive::{derive_for_key, derive_pair_address};
pub use error::FactoryError;
pub use events::PairCreated;
pub use pair::PairInstance;
pub use registry::{PairCreation, PairRegistry};
pub use snapshot::{PairRecord, RegistrySnapshot, SNAPSHOT_VERSION};
