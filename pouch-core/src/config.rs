//! Capacity and logging configuration loaded from a JSON5 file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::inventory::{MAX_CAPACITY, PackageKind};

/// The configuration written on first start.
pub const DEFAULT_CONFIG: &str = include_str!("../../package-content/pouch_config.json5");

/// Slot counts for one package kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CapacityConfig {
    /// Slots allocated at creation.
    pub max: u32,
    /// Slots unlocked at creation.
    pub initial: u32,
}

impl CapacityConfig {
    const fn new(max: u32, initial: u32) -> Self {
        Self { max, initial }
    }
}

/// The pouch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PouchConfig {
    /// Filter directives used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Capacities of the main bag.
    pub normal: CapacityConfig,
    /// Capacities of the storage package.
    pub store: CapacityConfig,
    /// Capacities of the equipment package.
    pub equip: CapacityConfig,
    /// Capacities of the pet package.
    pub pet: CapacityConfig,
}

impl PouchConfig {
    /// Reads the config at `path`, or writes the default there and returns it.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let config_str = fs::read_to_string(path)?;
            let config: PouchConfig = serde_json5::from_str(&config_str)?;
            config.validate()?;
            return Ok(config);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG)?;
        log::info!("Wrote default config to {}", path.display());
        Ok(Self::default())
    }

    /// Checks that every capacity pair can describe a package.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in PackageKind::ALL {
            let capacity = self.capacity(kind);
            if !(1..=MAX_CAPACITY).contains(&capacity.max) {
                return Err(ConfigError::Invalid("Package max capacity must be in range 1..65535"));
            }
            if capacity.initial > capacity.max {
                return Err(ConfigError::Invalid(
                    "Package initial capacity must not exceed its max capacity",
                ));
            }
        }
        Ok(())
    }

    /// Returns the capacities configured for `kind`.
    #[must_use]
    pub fn capacity(&self, kind: PackageKind) -> CapacityConfig {
        match kind {
            PackageKind::Normal => self.normal,
            PackageKind::Store => self.store,
            PackageKind::Equip => self.equip,
            PackageKind::Pet => self.pet,
        }
    }
}

impl Default for PouchConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            normal: CapacityConfig::new(100, 10),
            store: CapacityConfig::new(100, 100),
            equip: CapacityConfig::new(16, 16),
            pet: CapacityConfig::new(10, 3),
        }
    }
}
