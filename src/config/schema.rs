//! Configuration schema definitions.
//!
//! This module defines the structure of the configuration file using serde.
//! All sections default to the values the stock two-board bench uses, so a
//! config file is only needed to depart from them.

use super::error::ConfigError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Board types the stock bench knows, with their debug probe config files
/// relative to the openocd scripts directory.
static DEFAULT_BOARD_CONFIGS: Lazy<HashMap<String, String>> = Lazy::new(|| {
    HashMap::from([
        (
            "stm32l476g-eval".to_string(),
            "board/stm32l4discovery.cfg".to_string(),
        ),
        (
            "nucleo-f072rb".to_string(),
            "board/st_nucleo_f0.cfg".to_string(),
        ),
    ])
});

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host filesystem layout
    pub paths: PathsConfig,
    /// Board roles and debug probe configs
    pub boards: BoardsConfig,
    /// UART console configuration
    pub serial: SerialConfig,
    /// Debug adapter USB identity
    pub usb: UsbConfig,
    /// Suite execution configuration
    pub suite: SuiteConfig,
    /// Recovery policy for flaky hardware
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            boards: BoardsConfig::default(),
            serial: SerialConfig::default(),
            usb: UsbConfig::default(),
            suite: SuiteConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Record file holding the enrolled harness adapter serial.
    pub fn harness_serial_path(&self) -> PathBuf {
        self.paths
            .ec_dir
            .join("build")
            .join(&self.boards.harness)
            .join("th_hla_serial")
    }

    /// Test declarations for the configured module.
    pub fn testlist_path(&self) -> PathBuf {
        self.paths
            .ec_dir
            .join("cts")
            .join(&self.suite.module)
            .join("cts.testlist")
    }

    /// Return code listing shared by all modules.
    pub fn return_codes_path(&self) -> PathBuf {
        self.paths.ec_dir.join("cts").join("common").join("cts.rc")
    }

    /// Destination of the rendered results table.
    pub fn results_path(&self) -> PathBuf {
        self.paths
            .results_dir
            .join(&self.boards.dut)
            .join(format!("{}.txt", self.suite.module))
    }

    /// Most recent firmware image built for `board`.
    pub fn image_path(&self, board: &str) -> PathBuf {
        self.paths.ec_dir.join("build").join(board).join("ec.bin")
    }
}

/// Host filesystem layout section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// EC source tree the firmware is built in
    pub ec_dir: PathBuf,
    /// Directory results tables are written under
    pub results_dir: PathBuf,
    /// openocd scripts directory (`-s` flag)
    pub ocd_script_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            ec_dir: PathBuf::from("."),
            results_dir: PathBuf::from("/tmp/cts_results"),
            ocd_script_dir: PathBuf::from("/usr/local/share/openocd/scripts"),
        }
    }
}

/// Board roles section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardsConfig {
    /// Board type of the fixed test harness
    pub harness: String,
    /// Board type of the device under test
    pub dut: String,
    /// Flash base address passed to the probe
    pub flash_offset: String,
    /// Board type to probe config file. A file that spells this table out
    /// replaces the stock map wholesale.
    pub configs: HashMap<String, String>,
}

impl Default for BoardsConfig {
    fn default() -> Self {
        Self {
            harness: "stm32l476g-eval".to_string(),
            dut: "nucleo-f072rb".to_string(),
            flash_offset: "0x08000000".to_string(),
            configs: DEFAULT_BOARD_CONFIGS.clone(),
        }
    }
}

impl BoardsConfig {
    /// Probe config file for a board type.
    pub fn config_for(&self, board: &str) -> Result<&str, ConfigError> {
        self.configs
            .get(board)
            .map(String::as_str)
            .ok_or_else(|| {
                let mut known: Vec<&str> = self.configs.keys().map(String::as_str).collect();
                known.sort_unstable();
                ConfigError::UnknownBoard {
                    board: board.to_string(),
                    known: known.join(", "),
                }
            })
    }
}

/// UART console section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Directory scanned for tty devices
    pub dev_dir: PathBuf,
    /// Device name prefix of candidate ttys
    pub tty_prefix: String,
    /// Console baud rate
    pub baud: u32,
    /// Quiet period that ends a capture, in seconds
    pub poll_timeout_secs: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            dev_dir: PathBuf::from("/dev"),
            tty_prefix: "ttyACM".to_string(),
            baud: 115_200,
            poll_timeout_secs: 1,
        }
    }
}

impl SerialConfig {
    /// Get the capture quiet period as Duration.
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}

/// Debug adapter USB identity section. The stock bench uses ST-Link v2.1
/// onboard adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UsbConfig {
    /// USB vendor id, hex without prefix
    pub vendor_id: String,
    /// USB product id, hex without prefix
    pub product_id: String,
}

impl Default for UsbConfig {
    fn default() -> Self {
        Self {
            vendor_id: "0483".to_string(),
            product_id: "374b".to_string(),
        }
    }
}

impl UsbConfig {
    /// Device filter in the form `lsusb -d` expects.
    pub fn lsusb_filter(&self) -> String {
        format!("0x{}:0x{}", self.vendor_id, self.product_id)
    }
}

/// Suite execution section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Test module to build and run
    pub module: String,
    /// Window the firmware gets to run the whole suite, in seconds
    pub max_suite_time_secs: u64,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            module: "gpio".to_string(),
            max_suite_time_secs: 3,
        }
    }
}

impl SuiteConfig {
    /// Get the suite execution window as Duration.
    pub fn max_suite_time(&self) -> Duration {
        Duration::from_secs(self.max_suite_time_secs)
    }
}

/// Recovery policy for operations that fail while a board re-enumerates.
///
/// Applies to tty discovery and console acquisition: one initial attempt,
/// then up to `attempts` retries, each preceded by a board reset and a
/// `delay_secs` wait. In testing 3 retries and 10 seconds were enough for a
/// board to reconnect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the initial attempt
    pub attempts: u32,
    /// Wait between recovery and re-attempt, in seconds
    pub delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_secs: 10,
        }
    }
}

impl RetryPolicy {
    /// Get the re-attempt delay as Duration.
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}
