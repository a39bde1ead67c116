use clap::Parser;
use cts_runner::config::ConfigLoader;
use cts_runner::suite::Suite;
use tracing::error;
use tracing_subscriber::EnvFilter;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "cts",
    version,
    about = "Orchestrates EC compliance test suites across a two-board bench.",
    long_about = "Builds, flashes and runs a compliance test module on a test harness \
board and a device under test wired pin to pin, then reconciles the verdicts both \
boards report over their consoles into a single result table."
)]
struct Args {
    /// Board type of the device under test.
    #[arg(short, long)]
    dut: Option<String>,

    /// Test module to run.
    #[arg(short, long)]
    module: Option<String>,

    /// Enroll the attached ST-Link as the test harness, then exit.
    #[arg(short, long, group = "action")]
    setup: bool,

    /// Build the module images without flashing or running.
    #[arg(short, long, group = "action")]
    build: bool,

    /// Flash the current images and run the suite without rebuilding.
    #[arg(short, long, group = "action")]
    flash: bool,

    /// Reset both boards and record the results without rebuilding or
    /// reflashing.
    #[arg(short, long, group = "action")]
    reset: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        error!(%err, "run failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> cts_runner::Result<()> {
    let mut config = ConfigLoader::load()?.into_config();
    if let Some(dut) = args.dut {
        config.boards.dut = dut;
    }
    if let Some(module) = args.module {
        config.suite.module = module;
    }

    let mut suite = Suite::with_system_tools(config)?;
    if args.setup {
        let serial = suite.enroll()?;
        println!("Your test harness serial has been saved as: {serial}");
    } else if args.reset {
        println!("{}", suite.record_results()?);
    } else if args.build {
        suite.build()?;
    } else if args.flash {
        suite.flash_boards()?;
        println!("{}", suite.record_results()?);
    } else {
        suite.build()?;
        suite.flash_boards()?;
        println!("{}", suite.record_results()?);
    }
    Ok(())
}
