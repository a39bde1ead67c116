//! Board identity resolution.
//!
//! Both boards carry the same model of debug adapter, so roles cannot be
//! told apart by USB identity alone. The harness adapter serial is enrolled
//! once into a record file while it is the only adapter attached; afterwards
//! the device under test is whichever attached adapter the record does not
//! name.

use crate::config::UsbConfig;
use crate::exec::{CommandRunner, ToolError};
use crate::usb;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while resolving board identities.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The enrollment record has not been created yet.
    #[error(
        "Harness serial record not found at '{path}'.\n\
         Connect only the test harness and run 'cts --setup', then try again."
    )]
    RecordMissing { path: PathBuf },

    /// The enrollment record could not be written.
    #[error("Failed to save harness serial to '{path}': {source}")]
    RecordWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No debug adapter is attached.
    #[error(
        "No ST-Link adapter attached.\n\
         Connect the board and check its USB cabling."
    )]
    NoAdapter,

    /// More adapters than the operation can tell apart.
    #[error(
        "Found {count} ST-Link adapters where one was expected.\n\
         Remove extra adapters, or re-run 'cts --setup' if the stored \
         harness serial is stale."
    )]
    AmbiguousAdapters { count: usize },

    /// The adapter reported an empty serial string.
    #[error("The attached adapter reported an empty serial number")]
    EmptySerial,

    /// An enumeration tool could not be launched.
    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Serial numbers of every matching debug adapter currently attached.
pub fn attached_probe_serials(
    runner: &dyn CommandRunner,
    usb_cfg: &UsbConfig,
) -> Result<Vec<String>, IdentityError> {
    let args = vec![
        "-v".to_string(),
        "-d".to_string(),
        usb_cfg.lsusb_filter(),
    ];
    let output = runner.capture("lsusb", &args)?;
    let serials = usb::serials_from_lsusb(&output);
    debug!(count = serials.len(), "enumerated attached adapters");
    Ok(serials)
}

/// Enroll the harness adapter by recording its serial.
///
/// Requires the harness to be the only matching adapter attached; the serial
/// is persisted to `record_path` for every later run. Enrollment is a
/// deliberate one-time operator step and is not retried.
pub fn enroll_harness(
    runner: &dyn CommandRunner,
    usb_cfg: &UsbConfig,
    record_path: &Path,
) -> Result<String, IdentityError> {
    let serials = attached_probe_serials(runner, usb_cfg)?;
    let serial = match serials.as_slice() {
        [] => return Err(IdentityError::NoAdapter),
        [serial] => serial.clone(),
        many => {
            return Err(IdentityError::AmbiguousAdapters { count: many.len() });
        }
    };
    if serial.is_empty() {
        return Err(IdentityError::EmptySerial);
    }

    if let Some(parent) = record_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| IdentityError::RecordWrite {
            path: record_path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(record_path, &serial).map_err(|source| IdentityError::RecordWrite {
        path: record_path.to_path_buf(),
        source,
    })?;

    info!(serial = %serial, path = %record_path.display(), "harness serial enrolled");
    Ok(serial)
}

/// Read the enrolled harness serial back from its record file.
pub fn stored_harness_serial(record_path: &Path) -> Result<String, IdentityError> {
    let recorded =
        std::fs::read_to_string(record_path).map_err(|_| IdentityError::RecordMissing {
            path: record_path.to_path_buf(),
        })?;
    Ok(recorded.trim_end().to_string())
}

/// Resolve the serial of the device under test by elimination.
///
/// Every attached adapter whose serial differs from the harness serial is a
/// candidate. Exactly one candidate names the device under test; none at all
/// means the device runs without a debug adapter, which is valid.
pub fn resolve_dut_serial(
    runner: &dyn CommandRunner,
    usb_cfg: &UsbConfig,
    harness_serial: &str,
) -> Result<Option<String>, IdentityError> {
    let mut candidates: Vec<String> = attached_probe_serials(runner, usb_cfg)?
        .into_iter()
        .filter(|s| s != harness_serial)
        .collect();

    match candidates.len() {
        0 => {
            debug!("no adapter left after eliminating the harness");
            Ok(None)
        }
        1 => Ok(Some(candidates.remove(0))),
        count => Err(IdentityError::AmbiguousAdapters { count }),
    }
}
