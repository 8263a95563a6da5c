// src/settings/mod.rs
pub mod store;
pub mod value;
pub mod watcher;

pub use store::SettingsStore;
pub use value::{ColorEntry, Key, SettingValue, ValueKind};
pub use watcher::SettingsWatcher;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown settings key '{0}'")]
    UnknownKey(String),

    #[error("'{key}' holds a {expected}, refusing to store a {found}")]
    TypeMismatch {
        key: Key,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("'{key}' can't be '{value}'")]
    InvalidChoice { key: Key, value: String },

    #[error("foreground colors can't be empty")]
    EmptyForeground,

    #[error("bar count must be even and within 6..=50, got {0}")]
    InvalidBars(i64),

    #[error("failed to access settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to watch settings file: {0}")]
    Watch(#[from] notify::Error),
}
