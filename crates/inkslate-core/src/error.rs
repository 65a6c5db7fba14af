//! Error types for the canvas engine.

use crate::item::ItemId;
use thiserror::Error;

/// Errors raised by the canvas and its collaborators.
#[derive(Debug, Error, PartialEq)]
pub enum CanvasError {
    /// A status/tool tag that does not name any known mode.
    /// Callers are expected to treat this as a programming error.
    #[error("Unknown status: {0}")]
    UnknownStatus(String),
    #[error("Unknown color: {0}")]
    UnknownColor(String),
    /// The item cannot be duplicated (e.g. an imported element without copy support).
    #[error("Item {0} cannot be cloned")]
    NotClonable(ItemId),
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
