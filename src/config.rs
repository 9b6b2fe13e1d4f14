use std::path::PathBuf;

use crate::error::{HarnessError, HarnessResult};
use crate::time::{self, TimeUnit};

/// Settings for one harness run. Times are in `time_unit`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Shown in the summary and used as the JUnit test case name.
    pub name: String,
    pub stimulus_count: usize,
    /// Rising edges reset is held for before stimulus starts.
    pub reset_cycles: u32,
    /// Delay after each rising edge before the monitor samples.
    pub settle_delay: u64,
    pub clock_period: u64,
    pub time_unit: TimeUnit,
    /// Resolution of the time base.
    pub precision: TimeUnit,
    /// `None` seeds the random source from entropy.
    pub seed: Option<u64>,
    /// Defaults to enough time for reset plus every record with some slack.
    pub max_sim_time: Option<u64>,
    pub junit_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "dff".to_string(),
            stimulus_count: 20,
            reset_cycles: 5,
            settle_delay: 5,
            clock_period: 10,
            time_unit: TimeUnit::Ns,
            precision: TimeUnit::Ps,
            seed: None,
            max_sim_time: None,
            junit_path: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> HarnessResult<()> {
        if self.clock_period < 2 {
            return Err(HarnessError::Config(format!(
                "clock period must be at least 2{}, got {}",
                self.time_unit, self.clock_period
            )));
        }
        if self.settle_delay >= self.clock_period {
            return Err(HarnessError::Config(format!(
                "settle delay {} must be shorter than the clock period {}",
                self.settle_delay, self.clock_period
            )));
        }
        if self.reset_cycles == 0 {
            return Err(HarnessError::Config(
                "reset must be held for at least one cycle".to_string(),
            ));
        }
        if self.precision.exponent() > self.time_unit.exponent() {
            return Err(HarnessError::Config(format!(
                "precision {} is coarser than time unit {}",
                self.precision, self.time_unit
            )));
        }
        Ok(())
    }

    pub fn period_steps(&self) -> HarnessResult<u64> {
        self.steps(self.clock_period)
    }

    pub fn settle_steps(&self) -> HarnessResult<u64> {
        self.steps(self.settle_delay)
    }

    pub fn time_limit_steps(&self) -> HarnessResult<u64> {
        match self.max_sim_time {
            Some(t) => self.steps(t),
            None => {
                let cycles = self.reset_cycles as u64 + self.stimulus_count as u64 + 4;
                self.steps(cycles.saturating_mul(self.clock_period))
            }
        }
    }

    fn steps(&self, t: u64) -> HarnessResult<u64> {
        time::to_steps(t, self.time_unit, self.precision)
    }
}
