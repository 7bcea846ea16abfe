//! Error types for mousecfg-core.

use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No device with the requested ids is attached (or simulated).
    #[error("device not found: {vendor_id:04X}:{product_id:04X}")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// The interface is already claimed by another process or driver.
    #[error("device busy: {0}")]
    DeviceBusy(String),

    /// The profile declares no command with this name.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The command's value type has no registered encoder.
    #[error("unsupported value type '{value_type}' for command '{command}'")]
    UnsupportedValueType { command: String, value_type: String },

    /// A value failed its type, range, or choice constraint.
    #[error("invalid argument for {field}: expected {expected}")]
    InvalidArgument { field: String, expected: String },

    /// USB I/O failure while writing to or releasing the device.
    #[error("transport error: {0}")]
    Transport(String),

    /// Write attempted on a handle that is not open.
    #[error("device handle is closed")]
    DeviceClosed,

    /// Malformed profile or command description.
    #[error("profile error: {0}")]
    Profile(String),
}

impl Error {
    pub(crate) fn invalid(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            expected: expected.into(),
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
