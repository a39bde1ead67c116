//! Shared test utilities for suite runner tests.
//!
//! This module provides common test infrastructure including:
//! - EC tree fixtures (test lists and return code headers)
//! - Bench configurations rooted in temp directories with waits zeroed
//! - Builders for lsusb and udevadm output
//! - Helpers wiring fake tty devices and scripted consoles together

#![allow(dead_code)]

use cts_runner::config::Config;
use cts_runner::exec::MockRunner;
use cts_runner::port::{MockConsole, MockOpener};
use std::path::{Path, PathBuf};

pub const TH_SERIAL: &str = "066DFF303435554157255130";
pub const DUT_SERIAL: &str = "0671FF535155878281233710";

/// Lay down the parts of the EC tree the runner reads: the module's test
/// list and the shared return code names.
pub fn write_ec_fixture(ec_dir: &Path, module: &str, tests: &[&str], codes: &[&str]) {
    let module_dir = ec_dir.join("cts").join(module);
    std::fs::create_dir_all(&module_dir).unwrap();
    let mut testlist = String::new();
    for test in tests {
        testlist.push_str(&format!("CTS_TEST({test})\n"));
    }
    std::fs::write(module_dir.join("cts.testlist"), testlist).unwrap();

    let common_dir = ec_dir.join("cts").join("common");
    std::fs::create_dir_all(&common_dir).unwrap();
    let mut rc = String::from("enum cts_rc {\n");
    for code in codes {
        rc.push_str(&format!("\tCTS_RC_{code},\n"));
    }
    rc.push_str("};\n");
    std::fs::write(common_dir.join("cts.rc"), rc).unwrap();
}

/// A bench configuration rooted in temp directories, with every retry
/// delay and suite wait zeroed so tests run instantly.
pub fn bench_config(ec_dir: &Path, dev_dir: &Path, results_dir: &Path) -> Config {
    let mut config = Config::default();
    config.paths.ec_dir = ec_dir.to_path_buf();
    config.paths.results_dir = results_dir.to_path_buf();
    config.serial.dev_dir = dev_dir.to_path_buf();
    config.retry.delay_secs = 0;
    config.suite.max_suite_time_secs = 0;
    config
}

/// Write the harness serial record the way enrollment would.
pub fn enroll_harness(config: &Config, serial: &str) {
    let record = config.harness_serial_path();
    std::fs::create_dir_all(record.parent().unwrap()).unwrap();
    std::fs::write(record, serial).unwrap();
}

/// `lsusb -v` output advertising one ST-Link per serial.
pub fn lsusb_output(serials: &[&str]) -> String {
    let mut out = String::new();
    for serial in serials {
        out.push_str("Bus 001 Device 004: ID 0483:374b STMicroelectronics ST-LINK/V2.1\n");
        out.push_str("Device Descriptor:\n");
        out.push_str(&format!("  iSerial                 3 {serial}\n"));
        out.push('\n');
    }
    out
}

/// `udevadm info` property output for a tty belonging to `serial`.
pub fn udevadm_output(serial: &str) -> String {
    format!("ID_MODEL=STM32_STLink\nID_SERIAL_SHORT={serial}\nID_VENDOR=STMicroelectronics\n")
}

/// Create a fake tty entry under `dev_dir` and stub its udevadm identity.
pub fn attach_tty(runner: &MockRunner, dev_dir: &Path, name: &str, serial: &str) -> PathBuf {
    let path = dev_dir.join(name);
    std::fs::write(&path, "").unwrap();
    runner.stub_capture("udevadm", name, &udevadm_output(serial));
    path
}

/// Register a console for `device`, preloaded with one output burst per
/// capture pass the test expects to make.
pub fn attach_console(opener: &MockOpener, device: &Path, bursts: &[&[u8]]) -> MockConsole {
    let console = MockConsole::new(device.to_string_lossy().into_owned());
    for burst in bursts {
        console.push_burst(burst);
    }
    opener.register(device, console.clone());
    console
}
