//! Suite lifecycle orchestration.
//!
//! `Suite` owns the two boards and walks them through the phases of a run:
//! serial resolution, image builds, flashing, the synchronized reset and
//! the final capture that turns two console streams into one result table.
//! All host access goes through the `CommandRunner` and `ConsoleOpener`
//! seams, so the whole lifecycle can run against mocks.

use crate::board::{BoardError, DeviceUnderTest, HostTools, TestHarness};
use crate::catalog::{ReturnCodes, TestCatalog};
use crate::config::Config;
use crate::exec::{CommandRunner, SystemRunner};
use crate::identity;
use crate::port::{ConsoleOpener, TtyOpener};
use crate::report;
use crate::results;
use tracing::info;

/// One configured test suite run over a harness and device pair.
#[derive(Debug)]
pub struct Suite {
    config: Config,
    runner: Box<dyn CommandRunner>,
    opener: Box<dyn ConsoleOpener>,
    harness: TestHarness,
    dut: DeviceUnderTest,
    catalog: TestCatalog,
    codes: ReturnCodes,
}

impl Suite {
    /// Assemble a suite from its configuration and host seams.
    ///
    /// Loads the module's test list and the shared return code names up
    /// front, so a missing module fails before any board is touched.
    pub fn new(
        config: Config,
        runner: Box<dyn CommandRunner>,
        opener: Box<dyn ConsoleOpener>,
    ) -> crate::Result<Self> {
        let catalog = TestCatalog::load(&config.testlist_path())?;
        let codes = ReturnCodes::load(&config.return_codes_path())?;
        info!(
            module = %config.suite.module,
            tests = catalog.len(),
            "loaded test catalog"
        );
        let harness = TestHarness::new(&config)?;
        let dut = DeviceUnderTest::new(&config)?;
        Ok(Self {
            config,
            runner,
            opener,
            harness,
            dut,
            catalog,
            codes,
        })
    }

    /// Assemble a suite over the real host tools.
    pub fn with_system_tools(config: Config) -> crate::Result<Self> {
        Self::new(config, Box::new(SystemRunner::new()), Box::new(TtyOpener))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn harness(&self) -> &TestHarness {
        &self.harness
    }

    pub fn dut(&self) -> &DeviceUnderTest {
        &self.dut
    }

    fn tools(&self) -> HostTools<'_> {
        HostTools {
            runner: self.runner.as_ref(),
            opener: self.opener.as_ref(),
            config: &self.config,
        }
    }

    /// Record the attached harness adapter as this bench's harness.
    ///
    /// The harness must be the only debug adapter plugged in while this
    /// runs; the recorded serial is what later distinguishes it from the
    /// device under test.
    pub fn enroll(&self) -> crate::Result<String> {
        let serial = identity::enroll_harness(
            self.runner.as_ref(),
            &self.config.usb,
            &self.config.harness_serial_path(),
        )?;
        Ok(serial)
    }

    /// Resolve both adapter serials, once per run.
    fn update_serials(&mut self) -> crate::Result<()> {
        let serial = self.harness.update_serial()?.to_string();
        self.dut
            .update_serial(self.runner.as_ref(), &self.config.usb, &serial)?;
        Ok(())
    }

    /// Build the module image for both boards, device first.
    pub fn build(&self) -> crate::Result<()> {
        let tools = self.tools();
        let module = &self.config.suite.module;
        self.dut.board.build(&tools, module)?;
        self.harness.board.build(&tools, module)?;
        Ok(())
    }

    /// Flash the freshly built images, device first.
    pub fn flash_boards(&mut self) -> crate::Result<()> {
        self.update_serials()?;
        let tools = self.tools();
        self.dut.board.flash(&tools)?;
        self.harness.board.flash(&tools)?;
        Ok(())
    }

    /// Restart both boards as close to simultaneously as openocd allows.
    ///
    /// Both are halted at their reset vectors first, then released one
    /// after the other, so neither runs ahead during the handshake window.
    pub fn sync_reset(&mut self) -> crate::Result<()> {
        self.update_serials()?;
        info!("performing synchronized reset");
        let tools = self.tools();
        self.harness.board.reset_halt(&tools)?;
        self.dut.board.reset_halt(&tools)?;
        self.harness.board.resume(&tools)?;
        self.dut.board.resume(&tools)?;
        Ok(())
    }

    /// Run the flashed suite and persist its result table.
    ///
    /// Brings both consoles up, discards stale output, restarts the boards
    /// together and then waits out the suite before reading each stream.
    /// Returns the rendered table after writing it to the results file.
    pub fn record_results(&mut self) -> crate::Result<String> {
        let harness_serial = self.harness.update_serial()?.to_string();
        {
            let tools = HostTools {
                runner: self.runner.as_ref(),
                opener: self.opener.as_ref(),
                config: &self.config,
            };
            self.dut.setup_for_output(&tools, &harness_serial)?;
        }
        {
            let tools = HostTools {
                runner: self.runner.as_ref(),
                opener: self.opener.as_ref(),
                config: &self.config,
            };
            self.harness.setup_for_output(&tools)?;
        }
        self.dut.board.drain()?;
        self.harness.board.drain()?;

        self.sync_reset()?;
        let wait = self.config.suite.max_suite_time();
        info!(secs = wait.as_secs(), "waiting for the suite to finish");
        std::thread::sleep(wait);

        let dut_output = self.dut.board.read_available()?;
        let harness_output = self.harness.board.read_available()?;
        if dut_output.is_empty() {
            return Err(BoardError::NoOutput {
                board: self.dut.board.kind().to_string(),
            }
            .into());
        }
        if harness_output.is_empty() {
            return Err(BoardError::NoOutput {
                board: self.harness.board.kind().to_string(),
            }
            .into());
        }

        let outcome = results::reconcile(&harness_output, &dut_output, &self.catalog);
        let table = report::render(
            &self.config.suite.module,
            &outcome,
            &self.catalog,
            &self.codes,
        );
        report::persist(&self.config.results_path(), &table)?;
        Ok(table)
    }
}
