//! Enrollment E2E tests: recorded harness identity feeding later phases.
//!
//! These tests verify that the serial captured by `--setup` is what every
//! later run uses to tell the harness from the device under test. The
//! identity set laws (one-adapter enrollment, elimination of every entry
//! matching the harness) are checked over generated adapter sets.

use crate::common;
use cts_runner::config::UsbConfig;
use cts_runner::exec::MockRunner;
use cts_runner::identity::{self, IdentityError};
use cts_runner::port::MockOpener;
use cts_runner::suite::Suite;
use cts_runner::Error;
use proptest::prelude::*;

fn bare_suite(ec_dir: &std::path::Path, runner: &MockRunner) -> Suite {
    common::write_ec_fixture(ec_dir, "gpio", &["test_a"], &["SUCCESS"]);
    let config = common::bench_config(ec_dir, ec_dir, ec_dir);
    Suite::new(
        config,
        Box::new(runner.clone()),
        Box::new(MockOpener::new()),
    )
    .unwrap()
}

#[test]
fn test_enrolled_serial_drives_elimination() {
    let ec_dir = tempfile::tempdir().unwrap();
    let runner = MockRunner::new();
    let mut suite = bare_suite(ec_dir.path(), &runner);

    // Enrollment happens with only the harness plugged in.
    runner.stub_capture("lsusb", "", &common::lsusb_output(&[common::TH_SERIAL]));
    let enrolled = suite.enroll().unwrap();
    assert_eq!(enrolled, common::TH_SERIAL);

    // The device under test is attached afterwards; flashing must aim the
    // right probe at the right board.
    runner.stub_capture(
        "lsusb",
        "",
        &common::lsusb_output(&[common::TH_SERIAL, common::DUT_SERIAL]),
    );
    suite.flash_boards().unwrap();

    let flashes = runner.calls_to("openocd");
    assert_eq!(flashes.len(), 2);
    assert!(flashes[0].contains(&format!("hla_serial {}", common::DUT_SERIAL)));
    assert!(flashes[1].contains(&format!("hla_serial {}", common::TH_SERIAL)));
}

#[test]
fn test_enrollment_refuses_a_crowded_bench() {
    let ec_dir = tempfile::tempdir().unwrap();
    let runner = MockRunner::new();
    let suite = bare_suite(ec_dir.path(), &runner);
    runner.stub_capture(
        "lsusb",
        "",
        &common::lsusb_output(&[common::TH_SERIAL, common::DUT_SERIAL]),
    );

    let result = suite.enroll();
    assert!(matches!(result, Err(Error::Identity(_))));
    // Enrollment must not leave a record behind on failure.
    assert!(!suite.config().harness_serial_path().exists());
}

#[test]
fn test_record_survives_suite_reconstruction() {
    let ec_dir = tempfile::tempdir().unwrap();
    let runner = MockRunner::new();
    let suite = bare_suite(ec_dir.path(), &runner);
    runner.stub_capture("lsusb", "", &common::lsusb_output(&[common::TH_SERIAL]));
    suite.enroll().unwrap();
    drop(suite);

    // A fresh process reads the record back instead of re-enrolling.
    runner.stub_capture(
        "lsusb",
        "",
        &common::lsusb_output(&[common::TH_SERIAL, common::DUT_SERIAL]),
    );
    let mut fresh = bare_suite(ec_dir.path(), &runner);
    fresh.sync_reset().unwrap();

    assert_eq!(fresh.harness().board.serial(), Some(common::TH_SERIAL));
    assert_eq!(fresh.dut().board.serial(), Some(common::DUT_SERIAL));
}

/// Advertise `attached` over a mocked `lsusb`.
fn runner_with_adapters(attached: &[String]) -> MockRunner {
    let runner = MockRunner::new();
    let refs: Vec<&str> = attached.iter().map(String::as_str).collect();
    runner.stub_capture("lsusb", "", &common::lsusb_output(&refs));
    runner
}

proptest! {
    // Elimination over a bench holding `dup` copies of the harness adapter
    // plus arbitrary other adapters: no remainder is a device without a
    // debug adapter, one remainder names it, more is ambiguous.
    #[test]
    fn dut_resolution_partitions_the_attached_set(
        harness in "[0-9A-F]{24}",
        dup in 0usize..3,
        others in prop::collection::vec("[0-9A-F]{24}", 0..4),
    ) {
        let mut attached = vec![harness.clone(); dup];
        attached.extend(others);
        let runner = runner_with_adapters(&attached);

        let remaining: Vec<&str> = attached
            .iter()
            .filter(|s| **s != harness)
            .map(String::as_str)
            .collect();
        let resolved = identity::resolve_dut_serial(&runner, &UsbConfig::default(), &harness);
        match remaining.len() {
            0 => prop_assert!(matches!(resolved, Ok(None))),
            1 => {
                let dut = resolved.unwrap();
                prop_assert_eq!(dut.as_deref(), Some(remaining[0]));
            }
            expected => prop_assert!(
                matches!(
                    resolved,
                    Err(IdentityError::AmbiguousAdapters { count }) if count == expected
                ),
                "expected AmbiguousAdapters with count {}",
                expected
            ),
        }
    }

    #[test]
    fn resolution_never_yields_the_harness_serial(
        harness in "[0-9A-F]{24}",
        dup in 0usize..3,
        others in prop::collection::vec("[0-9A-F]{24}", 0..4),
    ) {
        let mut attached = vec![harness.clone(); dup];
        attached.extend(others);
        let runner = runner_with_adapters(&attached);

        let resolved = identity::resolve_dut_serial(&runner, &UsbConfig::default(), &harness);
        if let Ok(Some(dut)) = resolved {
            prop_assert_ne!(&dut, &harness);
            prop_assert!(attached.contains(&dut));
        }
    }

    #[test]
    fn enrollment_accepts_exactly_one_adapter(
        attached in prop::collection::vec("[0-9A-F]{24}", 0..4),
    ) {
        let runner = runner_with_adapters(&attached);
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join("th_hla_serial");

        let enrolled = identity::enroll_harness(&runner, &UsbConfig::default(), &record);
        if attached.len() == 1 {
            let serial = enrolled.unwrap();
            prop_assert_eq!(serial.as_str(), attached[0].as_str());
            let written = std::fs::read_to_string(&record).unwrap();
            prop_assert_eq!(written.as_str(), attached[0].as_str());
        } else {
            prop_assert!(enrolled.is_err());
            prop_assert!(!record.exists());
        }
    }
}
