//! Parsers for USB enumeration tool output.
//!
//! Board identity rests on two host tools: `lsusb -v` for the serial numbers
//! of attached ST-Link adapters, and `udevadm info` for the adapter serial
//! behind a tty device. Both are scraped from their plain-text output.

/// Property prefix carrying the adapter serial in `udevadm` output.
const ID_SERIAL_PREFIX: &str = "ID_SERIAL_SHORT=";

/// Extract adapter serial numbers from `lsusb -v` output.
///
/// Each attached adapter contributes one `iSerial` descriptor line whose
/// third token is the serial string. Lines with fewer tokens (an adapter
/// without a string descriptor reports `iSerial 0`) are skipped.
pub fn serials_from_lsusb(output: &str) -> Vec<String> {
    let mut serials = Vec::new();
    for line in output.lines() {
        if !line.contains("iSerial") {
            continue;
        }
        if let Some(serial) = line.split_whitespace().nth(2) {
            serials.push(serial.to_string());
        }
    }
    serials
}

/// Extract the adapter serial from `udevadm info --query=property` output.
///
/// Returns the value of the first `ID_SERIAL_SHORT` property, or `None` for
/// devices without one (including empty output from a tty that vanished
/// between scan and probe).
pub fn serial_from_udevadm(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(ID_SERIAL_PREFIX))
        .map(str::to_string)
}
