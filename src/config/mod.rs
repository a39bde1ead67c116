//! Configuration module for the CTS runner.
//!
//! This module provides TOML-based configuration with environment variable
//! overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of
//! priority):
//!
//! 1. `CTS_CONFIG` environment variable (explicit path)
//! 2. `./cts.toml` (current directory)
//! 3. The platform config directory (`~/.config/cts/cts.toml` on Linux)
//! 4. Built-in defaults (no file required)
//!
//! The defaults describe the stock bench: an stm32l476g-eval harness, a
//! nucleo-f072rb device under test, ST-Link v2.1 adapters and the standard
//! openocd install location, so most setups run without any file at all.
//!
//! # Environment Overrides
//!
//! The values that change between checkouts and benches can be overridden
//! via environment variables:
//! - `CTS_EC_DIR`
//! - `CTS_RESULTS_DIR`
//! - `CTS_OCD_SCRIPT_DIR`
//! - `CTS_SUITE_TIME_SECS`

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{resolve_config_path, ConfigLoader};
pub use schema::{
    BoardsConfig, Config, PathsConfig, RetryPolicy, SerialConfig, SuiteConfig, UsbConfig,
};
