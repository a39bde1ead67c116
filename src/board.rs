//! Board control.
//!
//! A `Board` bundles everything the runner knows about one physical board:
//! its type, its debug adapter serial once resolved, and its UART console
//! once acquired. `TestHarness` and `DeviceUnderTest` wrap the shared core
//! with their role-specific serial resolution.

use crate::config::{Config, ConfigError, UsbConfig};
use crate::exec::{CommandRunner, ToolError};
use crate::identity::{self, IdentityError};
use crate::ocd;
use crate::port::{ConsoleOpener, PortError, SerialConsole};
use crate::usb;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Host-side collaborators board operations run through.
#[derive(Debug, Clone, Copy)]
pub struct HostTools<'a> {
    pub runner: &'a dyn CommandRunner,
    pub opener: &'a dyn ConsoleOpener,
    pub config: &'a Config,
}

/// Errors raised by board operations.
#[derive(Debug, Error)]
pub enum BoardError {
    /// No scanned tty device belongs to this board's adapter.
    #[error(
        "No tty device found for the {board} board.\n\
         Check its console USB cabling, then try again."
    )]
    PortNotFound { board: String },

    /// The tty device exists but could not be opened for reading.
    #[error(
        "Unable to read the {board} console at '{device}'.\n\
         If you are running cat on a ttyACMx file,\n\
         please kill that process and try again."
    )]
    ConsoleUnavailable { board: String, device: PathBuf },

    /// A capture returned nothing when output was required.
    #[error(
        "No output captured from the {board} board.\n\
         If you are running cat on a ttyACMx file,\n\
         please kill that process and try again."
    )]
    NoOutput { board: String },

    /// A read was attempted before the console was set up.
    #[error("The {board} console has not been set up for reading")]
    NotReady { board: String },

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Port(#[from] PortError),
}

/// State and operations shared by both board roles.
#[derive(Debug)]
pub struct Board {
    kind: String,
    ocd_config: String,
    serial: Option<String>,
    flash_offset: String,
    tty_port: Option<PathBuf>,
    console: Option<Box<dyn SerialConsole>>,
}

impl Board {
    /// Create a board of the given type, resolving its probe config file.
    pub fn new(kind: &str, config: &Config) -> Result<Self, ConfigError> {
        let ocd_config = config.boards.config_for(kind)?.to_string();
        Ok(Self {
            kind: kind.to_string(),
            ocd_config,
            serial: None,
            flash_offset: config.boards.flash_offset.clone(),
            tty_port: None,
            console: None,
        })
    }

    /// Board type name, e.g. `nucleo-f072rb`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Adapter serial, once resolved.
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// Identified console tty device, once discovered.
    pub fn tty_port(&self) -> Option<&PathBuf> {
        self.tty_port.as_ref()
    }

    /// Run one openocd command script against this board.
    pub fn send_ocd_commands(
        &self,
        tools: &HostTools<'_>,
        commands: &[impl AsRef<str>],
    ) -> Result<(), ToolError> {
        ocd::send_commands(
            tools.runner,
            &tools.config.paths.ocd_script_dir,
            &self.ocd_config,
            self.serial.as_deref(),
            commands,
        )
    }

    /// Build the test module image for this board.
    pub fn build(&self, tools: &HostTools<'_>, module: &str) -> Result<(), ToolError> {
        let ec_dir = &tools.config.paths.ec_dir;
        info!(
            board = %self.kind,
            module = %module,
            ec_dir = %ec_dir.display(),
            "building test module"
        );
        let args = vec![
            format!("--directory={}", ec_dir.display()),
            format!("BOARD={}", self.kind),
            format!("CTS_MODULE={module}"),
            "-j".to_string(),
            "-B".to_string(),
        ];
        tools.runner.run("make", &args)
    }

    /// Flash the most recently built image onto this board.
    pub fn flash(&self, tools: &HostTools<'_>) -> Result<(), ToolError> {
        let image = tools.config.image_path(&self.kind);
        info!(board = %self.kind, image = %image.display(), "flashing firmware image");
        self.send_ocd_commands(tools, &ocd::flash_commands(&image, &self.flash_offset))
    }

    /// Reset the board into free-running execution.
    pub fn reset(&self, tools: &HostTools<'_>) -> Result<(), ToolError> {
        debug!(board = %self.kind, "resetting board");
        self.send_ocd_commands(tools, ocd::RESET)
    }

    /// Halt the board at its reset vector.
    pub fn reset_halt(&self, tools: &HostTools<'_>) -> Result<(), ToolError> {
        debug!(board = %self.kind, "halting board at reset");
        self.send_ocd_commands(tools, ocd::RESET_HALT)
    }

    /// Release a halted board.
    pub fn resume(&self, tools: &HostTools<'_>) -> Result<(), ToolError> {
        debug!(board = %self.kind, "resuming board");
        self.send_ocd_commands(tools, ocd::RESUME)
    }

    /// Find the tty device whose adapter serial matches this board's.
    ///
    /// A board that just reset may still be re-enumerating, so a fruitless
    /// scan is retried after another reset and a settling delay.
    pub fn identify_tty_port(&mut self, tools: &HostTools<'_>) -> Result<(), BoardError> {
        let retry = tools.config.retry;
        for attempt in 0..=retry.attempts {
            if attempt > 0 {
                warn!(
                    board = %self.kind,
                    attempt,
                    "tty device not found; resetting board and rescanning"
                );
                self.reset(tools)?;
                std::thread::sleep(retry.delay());
            }
            if let Some(port) = self.scan_for_port(tools)? {
                debug!(board = %self.kind, device = %port.display(), "console tty identified");
                self.tty_port = Some(port);
                return Ok(());
            }
        }
        Err(BoardError::PortNotFound {
            board: self.kind.clone(),
        })
    }

    fn scan_for_port(&self, tools: &HostTools<'_>) -> Result<Option<PathBuf>, BoardError> {
        let serial_cfg = &tools.config.serial;
        let mut candidates = Vec::new();
        if let Ok(entries) = std::fs::read_dir(&serial_cfg.dev_dir) {
            for entry in entries.flatten() {
                if entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with(&serial_cfg.tty_prefix)
                {
                    candidates.push(entry.path());
                }
            }
        }
        // Scan order is not defined by the filesystem; sort for determinism.
        candidates.sort();

        for candidate in candidates {
            let args = vec![
                "info".to_string(),
                "-a".to_string(),
                "-n".to_string(),
                candidate.to_string_lossy().into_owned(),
                "--query=property".to_string(),
            ];
            let properties = tools.runner.capture("udevadm", &args)?;
            let found = usb::serial_from_udevadm(&properties);
            debug!(device = %candidate.display(), serial = ?found, "probed tty candidate");
            if let Some(found) = found {
                if self.serial.as_deref() == Some(found.as_str()) {
                    return Ok(Some(candidate));
                }
            }
        }
        Ok(None)
    }

    /// Open the console behind the identified tty device.
    ///
    /// Right after a reset the device node can exist but refuse to open;
    /// the open is retried after another reset and a settling delay.
    pub fn acquire_console(&mut self, tools: &HostTools<'_>) -> Result<(), BoardError> {
        let device = self.tty_port.clone().ok_or_else(|| BoardError::PortNotFound {
            board: self.kind.clone(),
        })?;
        let serial_cfg = &tools.config.serial;
        let retry = tools.config.retry;

        for attempt in 0..=retry.attempts {
            if attempt > 0 {
                self.reset(tools)?;
                std::thread::sleep(retry.delay());
            }
            match tools
                .opener
                .open(&device, serial_cfg.baud, serial_cfg.poll_timeout())
            {
                Ok(console) => {
                    self.console = Some(console);
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        board = %self.kind,
                        device = %device.display(),
                        error = %e,
                        "console open failed"
                    );
                }
            }
        }
        Err(BoardError::ConsoleUnavailable {
            board: self.kind.clone(),
            device,
        })
    }

    /// Reset the board and bring its console up for reading.
    pub fn prepare_console(&mut self, tools: &HostTools<'_>) -> Result<(), BoardError> {
        self.reset(tools)?;
        self.identify_tty_port(tools)?;
        self.acquire_console(tools)
    }

    /// Read everything the console has produced since the last read.
    pub fn read_available(&mut self) -> Result<String, BoardError> {
        let console = self.console.as_mut().ok_or_else(|| BoardError::NotReady {
            board: self.kind.clone(),
        })?;
        Ok(console.read_available()?)
    }

    /// Discard buffered console output left over from before the run.
    pub fn drain(&mut self) -> Result<(), BoardError> {
        let discarded = self.read_available()?;
        if !discarded.is_empty() {
            debug!(
                board = %self.kind,
                bytes = discarded.len(),
                "discarded stale console output"
            );
        }
        Ok(())
    }
}

/// The fixed test harness board.
///
/// Its adapter serial is read back from the record file written by
/// enrollment.
#[derive(Debug)]
pub struct TestHarness {
    pub board: Board,
    serial_path: PathBuf,
}

impl TestHarness {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            board: Board::new(&config.boards.harness, config)?,
            serial_path: config.harness_serial_path(),
        })
    }

    /// Load the harness serial from its record, once, and return it.
    pub fn update_serial(&mut self) -> Result<&str, IdentityError> {
        match &mut self.board.serial {
            Some(serial) => Ok(serial),
            slot => {
                let serial = identity::stored_harness_serial(&self.serial_path)?;
                debug!(serial = %serial, "harness serial loaded from record");
                Ok(slot.insert(serial))
            }
        }
    }

    /// Resolve identity and bring the console up for reading.
    pub fn setup_for_output(&mut self, tools: &HostTools<'_>) -> crate::Result<()> {
        self.update_serial()?;
        self.board.prepare_console(tools)?;
        Ok(())
    }
}

/// The board the suite is exercising.
///
/// Its serial is whatever adapter remains once the harness serial is
/// eliminated; a device without its own adapter keeps no serial at all.
#[derive(Debug)]
pub struct DeviceUnderTest {
    pub board: Board,
}

impl DeviceUnderTest {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            board: Board::new(&config.boards.dut, config)?,
        })
    }

    /// Resolve the serial by eliminating the harness adapter, once.
    ///
    /// The harness serial must already be resolved.
    pub fn update_serial(
        &mut self,
        runner: &dyn CommandRunner,
        usb_cfg: &UsbConfig,
        harness_serial: &str,
    ) -> Result<(), IdentityError> {
        if self.board.serial.is_some() {
            return Ok(());
        }
        if let Some(serial) = identity::resolve_dut_serial(runner, usb_cfg, harness_serial)? {
            debug!(serial = %serial, "device under test serial resolved");
            self.board.serial = Some(serial);
        }
        Ok(())
    }

    /// Resolve identity and bring the console up for reading.
    pub fn setup_for_output(
        &mut self,
        tools: &HostTools<'_>,
        harness_serial: &str,
    ) -> crate::Result<()> {
        self.update_serial(tools.runner, &tools.config.usb, harness_serial)?;
        self.board.prepare_console(tools)?;
        Ok(())
    }
}
