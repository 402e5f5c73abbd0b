//! Owner identity.

use std::fmt;

use uuid::Uuid;

/// Identity of whatever owns a package.
///
/// Packages only store this for association and never look anything up
/// through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(pub Uuid);

impl OwnerId {
    /// Creates a new random owner id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner {}", self.0)
    }
}
