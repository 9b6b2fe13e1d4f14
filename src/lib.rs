//! Self-checking testbench for a clocked one-bit register with synchronous reset.
//!
//! A generator produces stimulus records, a driver applies them to the register
//! inputs once per clock period, a monitor samples the output after each rising edge,
//! and a scoreboard compares what came out with what went in. Everything runs as
//! cooperative tasks on an in-process discrete-event time base.

pub mod clock;
pub mod config;
pub mod driver;
pub mod dut;
pub mod env;
pub mod error;
mod executor;
pub mod generator;
pub mod interface;
pub mod monitor;
pub mod prelude;
pub mod record;
pub mod report;
mod runner;
pub mod scoreboard;
mod shared;
mod signal;
pub mod sim;
pub mod stimulus;
mod time;
pub mod trace;
mod trigger;

pub use crate::config::Config;
pub use crate::error::{HarnessError, HarnessResult};
pub use crate::executor::{JoinHandle, Task, TaskGroup};
pub use crate::report::RunReport;
pub use crate::runner::run_test;
pub use crate::shared::Shared;
pub use crate::signal::{Owner, SimObject};
pub use crate::sim::{RunOutcome, Sim};
pub use crate::time::TimeUnit;
pub use crate::trigger::Trigger;
