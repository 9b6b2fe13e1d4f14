use std::fmt;
use std::sync::Arc;

use crate::record::Record;
use crate::scoreboard::Verdict;
use crate::shared::Shared;
use crate::sim::Sim;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Generator,
    Driver,
    Monitor,
    Scoreboard,
}

impl Stage {
    pub fn tag(self) -> &'static str {
        match self {
            Stage::Generator => "GEN",
            Stage::Driver => "DRV",
            Stage::Monitor => "MON",
            Stage::Scoreboard => "SCO",
        }
    }

    fn target(self) -> &'static str {
        match self {
            Stage::Generator => "dffcheck::gen",
            Stage::Driver => "dffcheck::drv",
            Stage::Monitor => "dffcheck::mon",
            Stage::Scoreboard => "dffcheck::sco",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceKind {
    Record(Record),
    ResetDone,
    Verdict {
        index: usize,
        expected: Record,
        observed: Record,
        verdict: Verdict,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceEvent {
    /// Simulation time in steps.
    pub time: u64,
    pub stage: Stage,
    pub kind: TraceKind,
}

pub trait TraceSink: Send + Sync {
    fn emit(&self, event: &TraceEvent);
}

/// Forwards events to the `log` facade, one target per stage.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn emit(&self, event: &TraceEvent) {
        let target = event.stage.target();
        match &event.kind {
            TraceKind::Record(r) => {
                log::debug!(target: target, "@{} [{}] {}", event.time, event.stage, r)
            }
            TraceKind::ResetDone => {
                log::info!(target: target, "@{} [{}] reset done", event.time, event.stage)
            }
            TraceKind::Verdict {
                index,
                expected,
                observed,
                verdict: Verdict::Match,
            } => log::info!(
                target: target,
                "@{} [{}] #{} data matched (d={} rst={} q={})",
                event.time,
                event.stage,
                index,
                expected.d,
                expected.reset,
                observed.q
            ),
            TraceKind::Verdict {
                index,
                expected,
                observed,
                verdict: Verdict::Mismatch,
            } => log::warn!(
                target: target,
                "@{} [{}] #{} data mismatched (d={} rst={} q={})",
                event.time,
                event.stage,
                index,
                expected.d,
                expected.reset,
                observed.q
            ),
        }
    }
}

/// Keeps every event in memory.
#[derive(Clone, Default)]
pub struct MemorySink(Shared<Vec<TraceEvent>>);

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.0.get().clone()
    }

    /// Records emitted by `stage`, in emission order.
    pub fn records(&self, stage: Stage) -> Vec<Record> {
        self.0
            .get()
            .iter()
            .filter(|e| e.stage == stage)
            .filter_map(|e| match e.kind {
                TraceKind::Record(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    /// `(expected, observed, verdict)` for every comparison, in order.
    pub fn verdicts(&self) -> Vec<(Record, Record, Verdict)> {
        self.0
            .get()
            .iter()
            .filter_map(|e| match e.kind {
                TraceKind::Verdict {
                    expected,
                    observed,
                    verdict,
                    ..
                } => Some((expected, observed, verdict)),
                _ => None,
            })
            .collect()
    }
}

impl TraceSink for MemorySink {
    fn emit(&self, event: &TraceEvent) {
        self.0.with_mut(|events| events.push(event.clone()));
    }
}

/// Sends every event to each inner sink.
#[derive(Clone, Default)]
pub struct Fanout(Vec<Arc<dyn TraceSink>>);

impl Fanout {
    pub fn new(sinks: Vec<Arc<dyn TraceSink>>) -> Self {
        Self(sinks)
    }
}

impl TraceSink for Fanout {
    fn emit(&self, event: &TraceEvent) {
        for sink in &self.0 {
            sink.emit(event);
        }
    }
}

/// Stamps events with the current simulation time before handing them to a sink.
#[derive(Clone)]
pub struct Tracer {
    sim: Sim,
    sink: Arc<dyn TraceSink>,
}

impl Tracer {
    pub fn new(sim: &Sim, sink: Arc<dyn TraceSink>) -> Self {
        Self {
            sim: sim.clone(),
            sink,
        }
    }

    pub fn emit(&self, stage: Stage, kind: TraceKind) {
        let event = TraceEvent {
            time: self.sim.now(),
            stage,
            kind,
        };
        self.sink.emit(&event);
    }
}
