//! Elementary operation records produced by transactions.

use super::{PackageKind, SlotId};
use crate::item::ItemHandle;
use crate::owner::OwnerId;

/// Direction of an elementary quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Items were placed into the slot.
    Add,
    /// Items were taken out of the slot.
    Sub,
}

/// One quantity change applied to one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// The slot that changed.
    pub slot: SlotId,
    /// Whether items were added or removed.
    pub kind: OperationKind,
    /// How many items moved.
    pub amount: u32,
    /// The item involved.
    pub item: ItemHandle,
    /// The slot's quantity after the change.
    pub count_after: u32,
}

/// Receives the operation log drained by [`Transaction::notify`].
///
/// [`Transaction::notify`]: super::Transaction::notify
pub trait OperationListener {
    /// Called once per drain with the operations in the order they happened.
    fn on_operations(&mut self, owner: OwnerId, kind: PackageKind, operations: Vec<Operation>);
}

impl OperationListener for Vec<Operation> {
    fn on_operations(&mut self, _owner: OwnerId, _kind: PackageKind, operations: Vec<Operation>) {
        self.extend(operations);
    }
}
