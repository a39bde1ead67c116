//! UART console layer.
//!
//! Provides the capture-side abstraction over board consoles, enabling
//! dependency injection and testing via mocks.

pub mod error;
pub mod mock;
pub mod traits;
pub mod tty;

pub use error::PortError;
pub use mock::{MockConsole, MockOpener};
pub use traits::{ConsoleOpener, SerialConsole};
pub use tty::{TtyConsole, TtyOpener};
