//! Debug probe invocations.
//!
//! Every board operation that touches the hardware goes through one-shot
//! `openocd` runs: a board config is selected with `-f`, the target adapter
//! is pinned with an `hla_serial` command, and the operation itself is a
//! short command script ending in `shutdown`.

use crate::exec::{CommandRunner, ToolError};
use std::path::Path;

/// Put the board back into free-running execution.
pub const RESET: &[&str] = &["init", "reset init", "resume"];

/// Halt the board at its reset vector.
pub const RESET_HALT: &[&str] = &["init", "reset halt"];

/// Release a halted board.
pub const RESUME: &[&str] = &["init", "resume"];

/// Command script that writes `image` at `offset` and restarts the board.
///
/// The probe keeps the board under reset while connecting so flashing works
/// even when the running firmware has wedged the core.
pub fn flash_commands(image: &Path, offset: &str) -> Vec<String> {
    vec![
        "reset_config connect_assert_srst".to_string(),
        "init".to_string(),
        "reset init".to_string(),
        format!(
            "flash write_image erase {} {}",
            image.to_string_lossy(),
            offset
        ),
        "reset".to_string(),
    ]
}

/// Run one openocd command script against a board.
///
/// `serial` pins the probe when the board's adapter is known; without it
/// openocd picks whichever matching adapter it finds first, which is only
/// acceptable for a board that has no adapter of its own.
pub fn send_commands(
    runner: &dyn CommandRunner,
    script_dir: &Path,
    board_config: &str,
    serial: Option<&str>,
    commands: &[impl AsRef<str>],
) -> Result<(), ToolError> {
    let mut args = vec![
        "-s".to_string(),
        script_dir.to_string_lossy().into_owned(),
        "-f".to_string(),
        board_config.to_string(),
    ];
    if let Some(serial) = serial {
        args.push("-c".to_string());
        args.push(format!("hla_serial {serial}"));
    }
    for command in commands {
        args.push("-c".to_string());
        args.push(command.as_ref().to_string());
    }
    args.push("-c".to_string());
    args.push("shutdown".to_string());

    runner.run("openocd", &args)
}
