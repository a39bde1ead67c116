//! Console-specific error types.
//!
//! Defines error types for UART console operations, separate from board-level
//! errors to maintain clean separation of concerns.

use thiserror::Error;

/// Errors that can occur while operating a board's UART console.
#[derive(Debug, Error)]
pub enum PortError {
    /// The tty device was not found on the system.
    #[error("Serial device not found: {0}")]
    NotFound(String),

    /// An I/O error occurred during console operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a device path.
    pub fn not_found(device: impl Into<String>) -> Self {
        Self::NotFound(device.into())
    }

    /// Whether this error marks the end of a quiet period rather than a fault.
    ///
    /// Bounded reads surface an empty line as `TimedOut` (blocking ports) or
    /// `WouldBlock` (non-blocking descriptors); both mean the UART has gone
    /// quiet and the capture loop should stop.
    pub fn is_quiet_period(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}
