//! Real tty console implementation.
//!
//! Wraps the `serialport` crate behind the `SerialConsole` trait so board
//! capture logic can also run against mocks.

use super::error::PortError;
use super::traits::{ConsoleOpener, SerialConsole};
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Console over a real tty device.
///
/// EC consoles run 115200 8N1 without flow control; only the baud rate and
/// read timeout vary, so they are the only knobs exposed here.
pub struct TtyConsole {
    port: Box<dyn serialport::SerialPort>,
    name: String,
}

impl TtyConsole {
    /// Open the tty device behind `device` at `baud`, 8N1, with the given
    /// per-read timeout.
    pub fn open(device: &Path, baud: u32, timeout: Duration) -> Result<Self, PortError> {
        let name = device.to_string_lossy().into_owned();
        let port = serialport::new(name.as_str(), baud)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => PortError::not_found(name.as_str()),
                _ => PortError::Serial(e),
            })?;

        Ok(Self { port, name })
    }
}

impl SerialConsole for TtyConsole {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        self.port.read(buffer).map_err(PortError::Io)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for TtyConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtyConsole")
            .field("name", &self.name)
            .field("baud_rate", &self.port.baud_rate())
            .finish()
    }
}

/// Opener handing out real `TtyConsole` instances.
#[derive(Debug, Default, Clone, Copy)]
pub struct TtyOpener;

impl ConsoleOpener for TtyOpener {
    fn open(
        &self,
        device: &Path,
        baud: u32,
        timeout: Duration,
    ) -> Result<Box<dyn SerialConsole>, PortError> {
        Ok(Box::new(TtyConsole::open(device, baud, timeout)?))
    }
}
