//! Unified error types for the quickprov toolkit.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur during quickprov operations.
#[derive(Error, Debug)]
pub enum ProvisionError {
    // --- Configuration ---

    /// The configuration file (`quickprov.config.json`) or extension directory was not found.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file exists but contains invalid JSON.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // --- Template store ---

    /// No driver document is stored for the requested model.
    #[error("template not found for model {0}")]
    TemplateNotFound(String),

    /// The stored (or imported) driver document is not valid JSON.
    #[error("invalid template JSON for model {model}")]
    TemplateInvalidJson {
        model: String,
        #[source]
        source: serde_json::Error,
    },

    /// A model id contains characters outside `[A-Za-z0-9_-]`, or is empty.
    #[error("invalid model name: {0:?} (allowed: letters, digits, '_' and '-')")]
    InvalidModel(String),

    /// A driver was stored under a model id other than the one it declares.
    #[error("driver declares model {declared:?} but was stored as {model:?}")]
    ModelMismatch { model: String, declared: String },

    /// Writing or deleting a driver document failed. Nothing was partially written.
    #[error("failed to write template store entry at {path}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Devices ---

    /// No device record exists for the requested MAC.
    #[error("device not found for MAC {0}")]
    DeviceNotFound(String),

    /// A device record exists but could not be decoded.
    #[error("failed to parse device record at {path}")]
    DeviceParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The MAC does not normalize to at least 12 hex digits.
    #[error("invalid MAC address: {0:?}")]
    InvalidMac(String),

    /// A device record failed validation (PIN, wallpaper, wallpaper mode).
    #[error("invalid device record: {0}")]
    InvalidDevice(String),

    // --- Rendering ---

    /// The data source of a generic loop is not an array. Recovered locally:
    /// the loop expands to nothing and the rest of the template renders.
    #[error("loop data for {name}_loop is malformed: {reason}")]
    MalformedLoopData { name: String, reason: String },

    // --- Project ---

    /// Attempted to scaffold a provisioning root in a directory that already exists.
    #[error("project directory already exists: {0}")]
    ProjectExists(PathBuf),

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Alias for `Result<T, ProvisionError>`.
pub type Result<T> = std::result::Result<T, ProvisionError>;
