//! In-memory settings storage.

use super::SettingsStore;
use crate::error::{StorageError, StorageResult};
use crate::settings::BoardSettings;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemorySettings {
    settings: RwLock<Option<BoardSettings>>,
}

impl MemorySettings {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn load(&self) -> StorageResult<BoardSettings> {
        let settings = self
            .settings
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        Ok(settings.clone().unwrap_or_default())
    }

    fn save(&self, settings: &BoardSettings) -> StorageResult<()> {
        let mut stored = self
            .settings
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        *stored = Some(settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_loads_defaults() {
        let store = MemorySettings::new();
        assert_eq!(store.load().unwrap(), BoardSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let store = MemorySettings::new();
        let settings = BoardSettings::default().with_calibrated_size(812.5);
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }
}
