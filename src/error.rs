//! # Error Types
//!
//! This module defines error types used throughout the zebconf library.
//!
//! Every failure is raised to the immediate caller without retry. The kinds
//! are kept distinct so that a front end can map them to messages and exit
//! codes.

use thiserror::Error;

/// Main error type for zebconf operations
#[derive(Debug, Error)]
pub enum ZebraError {
    /// No bytes at all arrived from the device before the read timeout
    #[error("Timed out waiting for response")]
    Timeout,

    /// The device answered `"?"` to a getvar
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// Write attempted on a read-only configuration variable
    #[error("{0}: read-only variable")]
    ReadOnlyVariable(String),

    /// Value failed conversion to or from its on-wire form
    #[error("Invalid value: {0}")]
    Value(String),

    /// WiFi authentication scheme not implemented
    #[error("Unsupported authentication scheme: {0}")]
    UnsupportedAuth(String),

    /// Firmware archive is missing its payload or has more than one
    #[error("Bad firmware: {0}")]
    BadFirmware(String),

    /// Transport could not be opened (device missing, bad address, ...)
    #[error("Cannot open transport: {0}")]
    TransportOpen(String),

    /// Transport-level errors on an open (or unexpectedly closed) connection
    #[error("Transport error: {0}")]
    Transport(String),

    /// Command argument that cannot be framed on the wire
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
