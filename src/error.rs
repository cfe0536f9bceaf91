//! # EMS Error Handling
//!
//! This module defines the EmsError enum, which represents the different error
//! types that can occur in the ems-rs crate.

use thiserror::Error;

/// Represents the different error types that can occur in the EMS crate.
#[derive(Debug, Error)]
pub enum EmsError {
    /// Indicates a telegram shorter than the minimum structured length.
    #[error("Telegram too short: {0} bytes")]
    TelegramTooShort(usize),

    /// Indicates an invalid hexadecimal string was provided.
    #[error("Invalid hexadecimal string")]
    InvalidHexString,

    /// Indicates the Tx queue has reached its fixed capacity.
    #[error("Tx queue full ({0} entries)")]
    TxQueueFull(usize),

    /// Indicates a command was issued before the target device was bound.
    #[error("No {0} device has been detected on the bus")]
    DeviceNotBound(&'static str),

    /// Indicates the bound thermostat model does not accept writes.
    #[error("Write not supported for this thermostat model")]
    WriteNotSupported,

    /// Indicates a command parameter outside the accepted range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
