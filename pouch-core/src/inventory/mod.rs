//! This module contains the package system.

mod catalog_index;
mod operation;
mod package;
mod slot;
mod transaction;

pub use catalog_index::CatalogIndex;
pub use operation::{Operation, OperationKind, OperationListener};
pub use package::{MAX_CAPACITY, Package, PackageKind};
pub use slot::{Slot, SlotId};
pub use transaction::{Placement, Transaction, TransactionState};
