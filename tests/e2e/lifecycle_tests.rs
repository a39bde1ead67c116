//! Complete lifecycle E2E tests: build -> flash -> synchronized run -> report.
//!
//! These tests verify full end-to-end flows including:
//! - Result capture with conflict reconciliation and table persistence
//! - Silent console detection
//! - Tool launch failures surfacing mid-flow

use crate::common;
use cts_runner::board::BoardError;
use cts_runner::exec::MockRunner;
use cts_runner::port::{MockConsole, MockOpener};
use cts_runner::suite::Suite;
use cts_runner::Error;
use pretty_assertions::assert_eq;

struct Bench {
    runner: MockRunner,
    th_console: MockConsole,
    dut_console: MockConsole,
    suite: Suite,
}

/// A fully wired bench: enrolled harness, two adapters on USB, one tty and
/// one scripted console per board. Each console holds a stale burst for the
/// drain pass and a verdict burst for the capture pass.
fn wired_bench(
    ec_dir: &std::path::Path,
    dev_dir: &std::path::Path,
    results_dir: &std::path::Path,
    harness_verdicts: &[u8],
    dut_verdicts: &[u8],
) -> Bench {
    common::write_ec_fixture(
        ec_dir,
        "gpio",
        &["test_a", "test_b", "test_c"],
        &["SUCCESS", "FAILURE", "BAD_SYNC"],
    );
    let config = common::bench_config(ec_dir, dev_dir, results_dir);
    common::enroll_harness(&config, common::TH_SERIAL);

    let runner = MockRunner::new();
    runner.stub_capture(
        "lsusb",
        "",
        &common::lsusb_output(&[common::TH_SERIAL, common::DUT_SERIAL]),
    );
    let opener = MockOpener::new();

    let th_tty = common::attach_tty(&runner, dev_dir, "ttyACM0", common::TH_SERIAL);
    let dut_tty = common::attach_tty(&runner, dev_dir, "ttyACM1", common::DUT_SERIAL);
    let th_console =
        common::attach_console(&opener, &th_tty, &[b"harness boot chatter", harness_verdicts]);
    let dut_console =
        common::attach_console(&opener, &dut_tty, &[b"dut boot chatter", dut_verdicts]);

    let suite = Suite::new(config, Box::new(runner.clone()), Box::new(opener.clone()))
        .unwrap();
    Bench {
        runner,
        th_console,
        dut_console,
        suite,
    }
}

#[test]
fn test_full_run_reconciles_and_persists_table() {
    let ec_dir = tempfile::tempdir().unwrap();
    let dev_dir = tempfile::tempdir().unwrap();
    let results_dir = tempfile::tempdir().unwrap();
    // The boards disagree on test_b and agree everywhere else.
    let mut bench = wired_bench(
        ec_dir.path(),
        dev_dir.path(),
        results_dir.path(),
        b"test_a 0\ntest_b 1\ntest_c 2\n",
        b"test_a 0\ntest_b 2\ntest_c 2\n",
    );

    bench.suite.build().unwrap();
    bench.suite.flash_boards().unwrap();
    let table = bench.suite.record_results().unwrap();

    let expected = [
        "CTS Test Results for gpio module:",
        "test_a          SUCCESS",
        "test_b RESULTS CONFLICT",
        "test_c         BAD_SYNC",
    ]
    .join("\n");
    assert_eq!(table, expected);

    // The table lands under <results>/<dut board>/<module>.txt verbatim.
    let results_path = bench.suite.config().results_path();
    assert_eq!(
        results_path,
        results_dir.path().join("nucleo-f072rb").join("gpio.txt")
    );
    assert_eq!(std::fs::read_to_string(results_path).unwrap(), table);

    // Two images built, two flashed, device before harness.
    assert_eq!(bench.runner.calls_to("make").len(), 2);
    let probes = bench.runner.calls_to("openocd");
    assert_eq!(probes.len(), 8);
    assert!(probes[0].contains(&"board/st_nucleo_f0.cfg".to_string()));
    assert!(probes[1].contains(&"board/stm32l4discovery.cfg".to_string()));

    // One elimination scan serves the whole run.
    assert_eq!(bench.runner.calls_to("lsusb").len(), 1);

    // Each console saw exactly a drain pass and a capture pass.
    assert_eq!(bench.th_console.captures(), 2);
    assert_eq!(bench.dut_console.captures(), 2);
    assert_eq!(bench.th_console.pending_bursts(), 0);
    assert_eq!(bench.dut_console.pending_bursts(), 0);
}

#[test]
fn test_reset_run_records_without_rebuilding() {
    let ec_dir = tempfile::tempdir().unwrap();
    let dev_dir = tempfile::tempdir().unwrap();
    let results_dir = tempfile::tempdir().unwrap();
    let mut bench = wired_bench(
        ec_dir.path(),
        dev_dir.path(),
        results_dir.path(),
        b"test_a 0\ntest_b 1\ntest_c 2\n",
        b"test_a 0\ntest_b 1\ntest_c 2\n",
    );

    // `cts --reset` restarts the boards and re-records the verdicts from
    // the images already on them.
    let table = bench.suite.record_results().unwrap();

    let expected = [
        "CTS Test Results for gpio module:",
        "test_a  SUCCESS",
        "test_b  FAILURE",
        "test_c BAD_SYNC",
    ]
    .join("\n");
    assert_eq!(table, expected);
    assert_eq!(
        std::fs::read_to_string(bench.suite.config().results_path()).unwrap(),
        table
    );

    // Nothing is rebuilt or reflashed: no make at all, and every openocd
    // invocation is a plain reset sequence.
    assert!(bench.runner.calls_to("make").is_empty());
    let resets = bench.runner.calls_to("openocd");
    assert_eq!(resets.len(), 6);
    assert!(resets
        .iter()
        .all(|args| !args.iter().any(|a| a.contains("write_image"))));
}

#[test]
fn test_silent_device_console_fails_the_run() {
    let ec_dir = tempfile::tempdir().unwrap();
    let dev_dir = tempfile::tempdir().unwrap();
    let results_dir = tempfile::tempdir().unwrap();
    let mut bench = wired_bench(
        ec_dir.path(),
        dev_dir.path(),
        results_dir.path(),
        b"test_a 0\n",
        b"",
    );

    let result = bench.suite.record_results();

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        Error::Board(BoardError::NoOutput { .. })
    ));
    assert!(err.to_string().contains("nucleo-f072rb"));
    // Nothing gets persisted for a failed capture.
    assert!(!bench.suite.config().results_path().exists());
}

#[test]
fn test_missing_openocd_surfaces_as_tool_error() {
    let ec_dir = tempfile::tempdir().unwrap();
    let dev_dir = tempfile::tempdir().unwrap();
    let results_dir = tempfile::tempdir().unwrap();
    let mut bench = wired_bench(
        ec_dir.path(),
        dev_dir.path(),
        results_dir.path(),
        b"test_a 0\n",
        b"test_a 0\n",
    );
    bench.runner.fail_spawn("openocd");

    bench.suite.build().unwrap();
    let err = bench.suite.flash_boards().unwrap_err();

    assert!(matches!(err, Error::Tool(_)));
    assert!(err.to_string().contains("openocd"));
}
