use futures::StreamExt;
use std::fmt;

use crate::error::HarnessResult;
use crate::record::{MailboxRx, Record};
use crate::shared::Shared;
use crate::trace::{Stage, TraceKind, Tracer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Match,
    Mismatch,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Match => f.write_str("match"),
            Verdict::Mismatch => f.write_str("mismatch"),
        }
    }
}

/// Compares the expected `d` with the observed `q`. An asserted reset makes a low `q`
/// correct whatever `d` was.
pub fn classify(expected: &Record, observed: &Record) -> Verdict {
    let reset_dominates = observed.q == 0 && expected.reset == 1;
    if expected.d == observed.q || reset_dominates {
        Verdict::Match
    } else {
        Verdict::Mismatch
    }
}

/// A pair that failed to match, kept for the report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Comparison {
    pub index: usize,
    pub expected: Record,
    pub observed: Record,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreboardStats {
    pub expected: u32,
    pub received: u32,
    pub matched: u32,
    pub errors: u32,
    /// Matching pairs are only counted.
    pub mismatches: Vec<Comparison>,
}

impl ScoreboardStats {
    pub fn compared(&self) -> u32 {
        self.matched + self.errors
    }

    /// Every one of `stimulus_count` records was compared and none mismatched.
    pub fn passed(&self, stimulus_count: usize) -> bool {
        self.errors == 0
            && self.compared() as usize == stimulus_count
            && self.matched == self.compared()
    }

    pub fn result_str(&self) -> String {
        format!(
            "expected={}, received={}, matched={}, errors={}",
            self.expected, self.received, self.matched, self.errors
        )
    }
}

/// Pairs the i-th expected record with the i-th observed record.
pub struct Scoreboard {
    expected: MailboxRx,
    observed: MailboxRx,
    stats: Shared<ScoreboardStats>,
    tracer: Tracer,
}

impl Scoreboard {
    pub fn new(expected: MailboxRx, observed: MailboxRx, tracer: Tracer) -> Self {
        Self {
            expected,
            observed,
            stats: Shared::default(),
            tracer,
        }
    }

    pub fn stats(&self) -> Shared<ScoreboardStats> {
        self.stats.clone()
    }

    /// Runs until the expected side is closed and drained. Dropping the observed
    /// receiver on return is what stops the monitor.
    pub async fn run(mut self) -> HarnessResult<()> {
        loop {
            let Some(expected) = self.expected.next().await else {
                break;
            };
            self.stats.with_mut(|s| s.expected += 1);
            let Some(observed) = self.observed.next().await else {
                log::warn!("observed stream ended with expected records outstanding");
                break;
            };
            self.compare(expected, observed);
        }
        Ok(())
    }

    fn compare(&self, expected: Record, observed: Record) {
        let verdict = classify(&expected, &observed);
        let index = self.stats.with_mut(|s| {
            let index = s.compared() as usize;
            s.received += 1;
            match verdict {
                Verdict::Match => s.matched += 1,
                Verdict::Mismatch => {
                    s.errors += 1;
                    s.mismatches.push(Comparison {
                        index,
                        expected,
                        observed,
                    });
                }
            }
            index
        });
        self.tracer.emit(
            Stage::Scoreboard,
            TraceKind::Verdict {
                index,
                expected,
                observed,
                verdict,
            },
        );
    }
}
