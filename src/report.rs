use junit_report::{Duration, ReportBuilder, TestCaseBuilder, TestSuiteBuilder};
use num_format::{Locale, ToFormattedString};
use prettytable::{cell, row, Table};
use std::fmt;
use std::path::Path;

use crate::error::{HarnessError, HarnessResult};
use crate::scoreboard::ScoreboardStats;
use crate::sim::RunOutcome;
use crate::time::TimeUnit;

/// What one harness run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    pub name: String,
    pub outcome: RunOutcome,
    pub stimulus_count: usize,
    pub stats: ScoreboardStats,
    /// Final simulation time in `time_unit`.
    pub sim_time: f64,
    pub time_unit: TimeUnit,
    /// Seconds.
    pub wall_time: f64,
}

impl RunReport {
    /// The environment finished on its own and every record matched.
    pub fn passed(&self) -> bool {
        self.outcome == RunOutcome::Finished && self.stats.passed(self.stimulus_count)
    }

    pub fn result_str(&self) -> &'static str {
        if self.passed() {
            "passed"
        } else {
            "failed"
        }
    }

    fn sim_speed(&self) -> f64 {
        if self.wall_time > 0.0 {
            self.sim_time / self.wall_time
        } else {
            0.0
        }
    }

    fn failure_message(&self) -> String {
        match self.outcome {
            RunOutcome::Finished => self.stats.result_str(),
            RunOutcome::TimeLimit => format!("time limit reached, {}", self.stats.result_str()),
            RunOutcome::Idle => format!("simulation ran dry, {}", self.stats.result_str()),
        }
    }

    pub fn summary_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["TEST", "RESULT", "SIM TIME", "REAL TIME", "SIM SPEED"]);
        table.add_row(row![
            self.name,
            self.result_str(),
            format!("{} {}", group_digits(self.sim_time), self.time_unit),
            format!("{:.3} s", self.wall_time),
            format!("{:.3} {}/s", self.sim_speed(), self.time_unit),
        ]);
        table
    }

    /// Scoreboard counters followed by one row per mismatch.
    pub fn comparison_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["", "EXPECTED", "RECEIVED", "MATCHED", "ERRORS"]);
        table.add_row(row![
            "total",
            self.stats.expected.to_formatted_string(&Locale::en),
            self.stats.received.to_formatted_string(&Locale::en),
            self.stats.matched.to_formatted_string(&Locale::en),
            self.stats.errors.to_formatted_string(&Locale::en),
        ]);
        for c in &self.stats.mismatches {
            table.add_row(row![
                format!("#{}", c.index),
                "mismatch",
                format!("d={}", c.expected.d),
                format!("rst={}", c.expected.reset),
                format!("q={}", c.observed.q),
            ]);
        }
        table
    }

    pub fn write_junit(&self, path: &Path) -> HarnessResult<()> {
        let duration = Duration::seconds_f64(self.wall_time);
        let case = if self.passed() {
            TestCaseBuilder::success(&self.name, duration)
        } else {
            TestCaseBuilder::failure(&self.name, duration, "failure", &self.failure_message())
        }
        .build();
        let suite = TestSuiteBuilder::new(env!("CARGO_PKG_NAME"))
            .add_testcases(vec![case])
            .build();
        let report = ReportBuilder::new().add_testsuite(suite).build();
        let file = std::fs::File::create(path)
            .map_err(|e| HarnessError::Report(format!("{}: {}", path.display(), e)))?;
        report
            .write_xml(file)
            .map_err(|e| HarnessError::Report(format!("{:?}", e)))
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.summary_table(), self.comparison_table())
    }
}

fn group_digits(t: f64) -> String {
    let int = t.floor() as u64;
    let mut frac = format!("{:.3}", t % 1.0);
    frac.remove(0);
    format!("{}{}", int.to_formatted_string(&Locale::en), frac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::scoreboard::Comparison;

    fn report(outcome: RunOutcome, errors: u32) -> RunReport {
        let mismatches = (0..errors as usize)
            .map(|index| Comparison {
                index,
                expected: Record::stimulus(1, 0),
                observed: Record::observed(0, 1),
            })
            .collect();
        let stats = ScoreboardStats {
            expected: 2,
            received: 2,
            matched: 2 - errors,
            errors,
            mismatches,
        };
        RunReport {
            name: "dff".to_string(),
            outcome,
            stimulus_count: 2,
            stats,
            sim_time: 1234.5,
            time_unit: TimeUnit::Ns,
            wall_time: 0.5,
        }
    }

    #[test]
    fn pass_needs_finish_and_no_errors() {
        assert!(report(RunOutcome::Finished, 0).passed());
        assert!(!report(RunOutcome::Finished, 1).passed());
        assert!(!report(RunOutcome::TimeLimit, 0).passed());
        assert!(!report(RunOutcome::Idle, 0).passed());
    }

    #[test]
    fn summary_lists_mismatches() {
        let text = report(RunOutcome::Finished, 1).to_string();
        assert!(text.contains("failed"));
        assert!(text.contains("1,234.500 ns"));
        assert!(text.contains("#0"));
        assert!(!text.contains("#1"));
    }

    #[test]
    fn group_digits_keeps_three_decimals() {
        assert_eq!(group_digits(1_000_000.25), "1,000,000.250");
        assert_eq!(group_digits(0.0), "0.000");
    }

    #[test]
    fn junit_file_is_written() {
        let path = std::env::temp_dir().join(format!("dffcheck-junit-{}.xml", std::process::id()));
        report(RunOutcome::TimeLimit, 0).write_junit(&path).unwrap();
        let xml = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(xml.contains("testsuite"));
        assert!(xml.contains("time limit reached"));
    }
}
