//! Command line front end: runs the register check once and prints the summary.
//!
//! Usage:
//!   cargo run -r -- --count 50 --seed 1 [--dut stuck0] [--junit results.xml]

use std::path::PathBuf;
use std::sync::Arc;

use dffcheck::dut::{Dff, IgnoresReset, RegisterModel, StuckAt};
use dffcheck::stimulus::RandomStimulus;
use dffcheck::trace::LogSink;
use dffcheck::{run_test, Config, TimeUnit};

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum DutKind {
    /// Correct register.
    Dff,
    /// Output always low.
    Stuck0,
    /// Output always high.
    Stuck1,
    /// Reset input not connected.
    NoReset,
}

impl DutKind {
    fn model(self) -> Box<dyn RegisterModel> {
        match self {
            DutKind::Dff => Box::new(Dff),
            DutKind::Stuck0 => Box::new(StuckAt(0)),
            DutKind::Stuck1 => Box::new(StuckAt(1)),
            DutKind::NoReset => Box::new(IgnoresReset),
        }
    }
}

#[derive(clap::Parser, Debug)]
#[command(name = "dffcheck")]
#[command(about = "Randomized self-checking testbench for a D flip-flop with synchronous reset")]
struct Args {
    /// Number of stimulus records to generate.
    #[clap(long, default_value = "20")]
    count: usize,

    /// Seed for the stimulus generator. Drawn from entropy when absent.
    #[clap(long)]
    seed: Option<u64>,

    /// Rising edges to hold reset for before stimulus starts.
    #[clap(long, default_value = "5")]
    reset_cycles: u32,

    /// Monitor sampling delay after each rising edge, in `unit`.
    #[clap(long, default_value = "5")]
    settle: u64,

    /// Clock period in `unit`.
    #[clap(long, default_value = "10")]
    period: u64,

    /// Time unit for every duration given on the command line.
    #[clap(long, default_value = "ns")]
    unit: TimeUnit,

    /// Give up after this much simulated time, in `unit`.
    #[clap(long)]
    max_time: Option<u64>,

    /// Write a JUnit XML report to this path.
    #[clap(long)]
    junit: Option<PathBuf>,

    /// Register model to check.
    #[clap(long, value_enum, default_value = "dff")]
    dut: DutKind,
}

fn main() {
    env_logger::init();

    let args = <Args as clap::Parser>::parse();
    log::debug!("arguments:\n{:#?}", args);

    let config = Config {
        name: format!("dff/{:?}", args.dut).to_lowercase(),
        stimulus_count: args.count,
        reset_cycles: args.reset_cycles,
        settle_delay: args.settle,
        clock_period: args.period,
        time_unit: args.unit,
        precision: args.unit.min(TimeUnit::Ps),
        seed: args.seed,
        max_sim_time: args.max_time,
        junit_path: args.junit,
    };
    let source = match config.seed {
        Some(seed) => RandomStimulus::seeded(seed),
        None => RandomStimulus::from_entropy(),
    };

    let report = match run_test(&config, args.dut.model(), source, Arc::new(LogSink)) {
        Ok(report) => report,
        Err(e) => {
            log::error!("run aborted: {}", e);
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    println!("{}", report);
    if let Some(path) = &config.junit_path {
        if let Err(e) = report.write_junit(path) {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    }

    // Exit with error code on any mismatch
    if !report.passed() {
        std::process::exit(1);
    }
}
