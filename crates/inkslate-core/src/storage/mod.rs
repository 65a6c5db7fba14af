//! Storage abstraction for settings persistence.

mod file;
mod memory;

pub use file::FileSettings;
pub use memory::MemorySettings;

use crate::error::StorageResult;
use crate::settings::BoardSettings;

/// Trait for settings storage backends.
pub trait SettingsStore: Send + Sync {
    /// Load settings. A store that holds nothing yields the defaults.
    fn load(&self) -> StorageResult<BoardSettings>;

    /// Save settings.
    fn save(&self, settings: &BoardSettings) -> StorageResult<()>;
}
