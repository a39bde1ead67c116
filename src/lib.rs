//! EC Compliance Test Suite Runner Library
//!
//! This library drives a two-board compliance test bench: a fixed test
//! harness board and a device under test, wired pin to pin, each running
//! the same test module image. The host builds and flashes both images,
//! restarts the boards in lockstep, captures their UART verdicts and
//! reconciles the two streams into one result table.
//!
//! # Modules
//!
//! - `config`: Configuration management with TOML support
//! - `error`: Unified error handling
//! - `exec`: External tool execution seam (`make`, `openocd`, `lsusb`, `udevadm`)
//! - `port`: Console abstraction layer for UART capture
//! - `usb`: Tool output parsing for adapter discovery
//! - `identity`: Harness enrollment and device-by-elimination resolution
//! - `ocd`: openocd invocation assembly
//! - `board`: Board state and per-board operations
//! - `catalog`: Test list and return code name extraction
//! - `results`: Dual-stream verdict reconciliation
//! - `report`: Result table rendering and persistence
//! - `suite`: Whole-run orchestration

pub mod board;
pub mod catalog;
pub mod config;
pub mod error;
pub mod exec;
pub mod identity;
pub mod ocd;
pub mod port;
pub mod report;
pub mod results;
pub mod suite;
pub mod usb;

// Re-export commonly used types for convenience
pub use board::{Board, BoardError, DeviceUnderTest, HostTools, TestHarness};
pub use catalog::{CatalogError, ReturnCodes, TestCatalog};
pub use error::{Error, Result};
pub use exec::{CommandRunner, MockRunner, SystemRunner, ToolError};
pub use identity::IdentityError;
pub use port::{
    ConsoleOpener, MockConsole, MockOpener, PortError, SerialConsole, TtyConsole, TtyOpener,
};
pub use results::{ResultSet, CONFLICT_CODE, SUCCESS_CODE};
pub use suite::Suite;

// Re-export config types
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
