//! # Pouch Core
//!
//! Fixed-capacity, slot-indexed item packages with transactional mutation.
//!
//! A [`Package`](inventory::Package) is only ever mutated through a
//! [`Transaction`](inventory::Transaction), which journals the pre-image of
//! every slot it touches and can roll the package back to the state it had
//! when the transaction was opened (or last committed).

pub mod config;
pub mod error;
pub mod inventory;
pub mod item;
pub mod owner;

pub use config::{CapacityConfig, PouchConfig};
pub use error::{ConfigError, PackageError};
pub use item::{CatalogId, ItemHandle};
pub use owner::OwnerId;
