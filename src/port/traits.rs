//! Core traits for UART console access.
//!
//! Defines the `SerialConsole` trait that allows both real tty devices and
//! mock implementations to be used interchangeably, plus the `ConsoleOpener`
//! seam through which consoles are acquired.

use super::error::PortError;
use std::path::Path;
use std::time::Duration;

/// Trait for reading a board's UART console.
///
/// Firmware under test writes its result table to the UART unprompted, so the
/// console is read-only: there is no write side.
pub trait SerialConsole: Send + std::fmt::Debug {
    /// Read bytes from the console into the provided buffer.
    ///
    /// Returns the number of bytes actually read. An exhausted read window
    /// surfaces as an `Io` error of kind `TimedOut` or `WouldBlock`.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the device path or identifier of this console.
    fn name(&self) -> &str;

    /// Read everything the UART has produced, stopping at the first quiet
    /// period.
    ///
    /// Bytes are pulled one at a time under the configured read timeout; the
    /// first timed-out read ends the capture. An empty capture is valid, so
    /// this can also be used to discard stale boot chatter before a run.
    fn read_available(&mut self) -> Result<String, PortError> {
        let mut collected = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.read_bytes(&mut byte) {
                Ok(0) => break,
                Ok(_) => collected.push(byte[0]),
                Err(e) if e.is_quiet_period() => break,
                Err(e) => return Err(e),
            }
        }
        Ok(String::from_utf8_lossy(&collected).into_owned())
    }
}

/// Seam for acquiring consoles, so board plumbing can be exercised against
/// mock consoles in tests.
pub trait ConsoleOpener: std::fmt::Debug {
    /// Open the console behind a tty device path.
    fn open(
        &self,
        device: &Path,
        baud: u32,
        timeout: Duration,
    ) -> Result<Box<dyn SerialConsole>, PortError>;
}
