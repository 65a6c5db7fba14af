//! File-based settings storage.

use super::SettingsStore;
use crate::error::{StorageError, StorageResult};
use crate::settings::BoardSettings;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings stored as a JSON file.
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    /// Store settings at the given file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.config/inkslate/settings.json`
    /// On Windows: `%APPDATA%\inkslate\settings.json`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Ok(Self::new(base.join("inkslate").join("settings.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettings {
    fn load(&self) -> StorageResult<BoardSettings> {
        if !self.path.exists() {
            log::info!("No settings at {}, using defaults", self.path.display());
            return Ok(BoardSettings::default());
        }

        let json = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", self.path.display(), e)))?;

        let settings = match serde_json::from_str::<BoardSettings>(&json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to parse {}: {}, using defaults", self.path.display(), e);
                return Ok(BoardSettings::default());
            }
        };
        if let Err(e) = settings.validate() {
            log::warn!("Ignoring {}: {}", self.path.display(), e);
            return Ok(BoardSettings::default());
        }
        log::info!("Loaded settings from {}", self.path.display());
        Ok(settings)
    }

    fn save(&self, settings: &BoardSettings) -> StorageResult<()> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| StorageError::Io(format!("Failed to create settings directory: {}", e)))?;
        }
        let json = serde_json::to_string_pretty(settings).map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&self.path, json)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", self.path.display(), e)))?;
        log::info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{PenColor, SerializableColor};
    use tempfile::tempdir;

    #[test]
    fn test_file_settings_save_load() {
        let dir = tempdir().unwrap();
        let store = FileSettings::new(dir.path().join("nested").join("settings.json"));

        let settings = BoardSettings {
            pen_color: PenColor::Fixed(SerializableColor::rgb(255, 0, 0)),
            pen_width: 20.0,
            dark_mode: true,
            ..Default::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileSettings::new(dir.path().join("settings.json"));
        assert_eq!(store.load().unwrap(), BoardSettings::default());
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let store = FileSettings::new(path);
        assert_eq!(store.load().unwrap(), BoardSettings::default());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"pen_width": -1.0}"#).unwrap();
        let store = FileSettings::new(path);
        assert_eq!(store.load().unwrap(), BoardSettings::default());
    }
}
