//! Error types for GATT session operations

use thiserror::Error;

use super::ident::Ident;

/// Result type for backend primitive operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type for settings assembly
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors related to identifier normalization
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentError {
    #[error("Not a UUID or hexadecimal alias: {0:?}")]
    Malformed(String),
}

/// Errors related to platform GATT primitives
#[derive(Error, Debug, Clone)]
pub enum BackendError {
    #[error("No matching device: {0}")]
    DeviceUnavailable(String),

    #[error("Link establishment failed: {0}")]
    LinkFailed(String),

    #[error("Service {0} not found")]
    ServiceNotFound(Ident),

    #[error("Characteristic {0} not found")]
    CharacteristicNotFound(Ident),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Bluetooth error: {0}")]
    Bluetooth(String),
}

/// Errors related to session operations
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Not connected")]
    NotConnected,

    #[error("Device selection failed: {0}")]
    SelectionFailed(#[source] BackendError),

    #[error("Link establishment failed: {0}")]
    LinkFailed(#[source] BackendError),

    #[error("Discovery failed: {0}")]
    DiscoveryFailed(#[source] BackendError),

    #[error("Characteristic does not support reads")]
    ReadUnsupported,

    #[error("Read failed: {0}")]
    ReadFailed(#[source] BackendError),

    #[error("Write failed: {0}")]
    WriteFailed(#[source] BackendError),
}

/// Errors related to settings and profile loading
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot read profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed profile: {0}")]
    Profile(#[from] serde_json::Error),
}

/// Errors related to value format selection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown value format {0:?}, expected raw, text or bytes")]
pub struct FormatError(pub String);
