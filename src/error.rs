//! Error taxonomy for the Broadlink wire protocol.
//!
//! Every failure that can be attributed to a specific cause becomes a
//! [`BroadlinkError`] variant; anything reaching the socket layer from the
//! OS is wrapped transparently via `#[from] std::io::Error`.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BroadlinkError>;

/// Everything that can go wrong talking to a device.
#[derive(Debug, Error)]
pub enum BroadlinkError {
    #[error("no response within the overall deadline")]
    NetworkTimeout,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("connection closed, the handle must be re-authenticated")]
    ConnectionClosed,

    #[error("device is offline")]
    DeviceOffline,

    #[error("command not supported by this device")]
    CommandNotSupported,

    #[error("device storage is full")]
    StorageFull,

    #[error("data validation failed: {0}")]
    DataValidation(&'static str),

    #[error("control key expired or connection id mismatch")]
    Authorization,

    #[error("send error")]
    SendError,

    #[error("write error")]
    WriteError,

    #[error("read error")]
    ReadError,

    #[error("SSID could not be found in AP configuration")]
    SsidNotFound,

    #[error("unknown device status code 0x{0:04x}")]
    Unknown(u16),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Map a response's status code (offset 0x22, little-endian) to an error
/// kind. Zero must be checked by the caller before invoking this — it has
/// no "success" variant.
pub fn status_to_error(code: u16) -> BroadlinkError {
    match code {
        0xFFFF => BroadlinkError::AuthenticationFailed,
        0xFFFE => BroadlinkError::ConnectionClosed,
        0xFFFD => BroadlinkError::DeviceOffline,
        0xFFFC => BroadlinkError::CommandNotSupported,
        0xFFFB => BroadlinkError::StorageFull,
        0xFFFA => BroadlinkError::DataValidation("device reported abnormal structure"),
        0xFFF9 => BroadlinkError::Authorization,
        0xFFF8 => BroadlinkError::SendError,
        0xFFF7 => BroadlinkError::WriteError,
        0xFFF6 => BroadlinkError::ReadError,
        0xFFF5 => BroadlinkError::SsidNotFound,
        other => BroadlinkError::Unknown(other),
    }
}
