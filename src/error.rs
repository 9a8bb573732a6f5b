//! Error types for Wayfinder
//!
//! Provides standardized error handling across the engine.

use thiserror::Error;

/// Errors that can occur in Wayfinder
#[derive(Debug, Error)]
pub enum PaletteError {
    /// Catalog construction errors (duplicate ids, bad hierarchy)
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Clipboard operation errors reported by the host
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Malformed shortcut strings
    #[error("Shortcut error: {0}")]
    Shortcut(String),

    /// A global shortcut is already owned by another palette instance
    #[error("Shortcut {combo} is already owned by instance {owner}")]
    ShortcutConflict { combo: String, owner: u64 },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("Config serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Wayfinder operations
pub type PaletteResult<T> = Result<T, PaletteError>;
