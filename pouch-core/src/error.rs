//! Error types for packages, transactions and configuration.

use std::io;

use thiserror::Error;

use crate::inventory::{PackageKind, SlotId};
use crate::owner::OwnerId;

/// Contract violations raised by packages and transactions.
///
/// Running out of space or stock is not an error: those outcomes are reported
/// through the returned amounts and flags.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackageError {
    /// The package is already held by another transaction.
    #[error("{kind} package of {owner} already has an open transaction")]
    TransactionOpen {
        /// Owner of the package.
        owner: OwnerId,
        /// Kind of the package.
        kind: PackageKind,
    },

    /// A caller-supplied slot lies outside the live range.
    #[error("slot {slot} is outside the live range 0..{capacity}")]
    SlotOutOfRange {
        /// The rejected slot.
        slot: SlotId,
        /// The current capacity of the package.
        capacity: u32,
    },

    /// Compaction was requested while the transaction had uncommitted changes.
    #[error("compaction must be the only pending operation of its transaction")]
    PendingOperations,

    /// The requested capacities cannot describe a package.
    #[error("invalid capacity: current {current}, max {max}")]
    InvalidCapacity {
        /// Requested current capacity.
        current: u32,
        /// Requested maximum capacity.
        max: u32,
    },
}

/// Errors raised while loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid JSON5 for the expected layout.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json5::Error),

    /// The file parsed but holds values out of range.
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}
