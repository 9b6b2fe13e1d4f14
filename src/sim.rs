//! In-process discrete-event time base.
//!
//! Every time step runs in the same order:
//! 1. fire the timers due at this step and run the woken tasks;
//! 2. commit the signal writes those tasks made (one delta cycle), wake the edge
//!    triggers the commits produced, and repeat until nothing changes;
//! 3. run the read-only phase, in which writes are rejected;
//! 4. advance to the next timer.
//!
//! Writes only become visible at the end of a delta cycle, so every task woken by a
//! clock edge reads the values from before that edge, whatever order the tasks run in.

use intmap::IntMap;
use once_cell::sync::OnceCell;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{HarnessError, HarnessResult};
use crate::executor::{Executor, JoinHandle, TaskGroup};
use crate::shared::Shared;
use crate::signal::{Owner, SimObject};
use crate::time::{self, TimeUnit};
use crate::trigger::{EdgeKind, TrigShared};

const MAX_DELTA_CYCLES: usize = 1_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// `Sim::finish` was called.
    Finished,
    /// The next event lies beyond the requested limit.
    TimeLimit,
    /// Nothing left to wait for.
    Idle,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Active,
    ReadOnly,
}

struct Slot {
    name: String,
    width: u32,
    value: u32,
    owner: Owner,
}

enum Advance {
    Timers(VecDeque<TrigShared>),
    Limit,
    Idle,
}

struct Kernel {
    precision: TimeUnit,
    now: u64,
    phase: Phase,
    finished: bool,
    signals: Vec<Slot>,
    by_name: HashMap<String, usize>,
    // absolute times with at least one timer, in order
    time_set: BTreeSet<u64>,
    // key is absolute callback time
    timers: IntMap<VecDeque<TrigShared>>,
    // key is signal handle
    edges: IntMap<VecDeque<TrigShared>>,
    read_only: VecDeque<TrigShared>,
    pending: Vec<(usize, u32)>,
}

impl Kernel {
    fn write(&mut self, handle: usize, value: u32, by: Owner) -> HarnessResult<()> {
        let slot = &self.signals[handle];
        if self.phase == Phase::ReadOnly {
            return Err(HarnessError::WriteInReadOnly {
                signal: slot.name.clone(),
            });
        }
        if slot.owner != by {
            return Err(HarnessError::ForeignWrite {
                signal: slot.name.clone(),
                owner: slot.owner,
                writer: by,
            });
        }
        if slot.width < 32 && value >> slot.width != 0 {
            return Err(HarnessError::ValueOutOfRange {
                signal: slot.name.clone(),
                value,
                width: slot.width,
            });
        }
        self.pending.push((handle, value));
        Ok(())
    }

    /// Commits one delta cycle worth of writes and returns the edge triggers to wake.
    fn apply_pending(&mut self) -> Vec<TrigShared> {
        let writes = std::mem::take(&mut self.pending);
        let mut before: Vec<(usize, u32)> = Vec::new();
        for (handle, value) in writes {
            if !before.iter().any(|(h, _)| *h == handle) {
                before.push((handle, self.signals[handle].value));
            }
            self.signals[handle].value = value;
        }

        let mut woken = Vec::new();
        for (handle, old) in before {
            let new = self.signals[handle].value;
            if old == new {
                continue;
            }
            let edge = EdgeKind::between(old, new);
            if let Some(waiting) = self.edges.remove(handle as u64) {
                let (wake, keep): (VecDeque<_>, VecDeque<_>) =
                    waiting.into_iter().partition(|t| t.edge_kind.accepts(edge));
                if !keep.is_empty() {
                    self.edges.insert(handle as u64, keep);
                }
                woken.extend(wake);
            }
        }
        woken
    }

    fn advance(&mut self, limit: u64) -> Advance {
        let Some(&next) = self.time_set.first() else {
            return Advance::Idle;
        };
        if next > limit {
            self.now = self.now.max(limit);
            return Advance::Limit;
        }
        self.time_set.remove(&next);
        self.now = next;
        Advance::Timers(self.timers.remove(next).unwrap_or_default())
    }
}

/// Handle to one simulation. Cheap to clone; every task that needs time or signals
/// holds one.
#[derive(Clone)]
pub struct Sim {
    kernel: Shared<Kernel>,
    executor: Executor,
    started: Arc<OnceCell<Instant>>,
}

impl Sim {
    pub fn new(precision: TimeUnit) -> Self {
        let kernel = Kernel {
            precision,
            now: 0,
            phase: Phase::Active,
            finished: false,
            signals: Vec::new(),
            by_name: HashMap::new(),
            time_set: BTreeSet::new(),
            timers: IntMap::new(),
            edges: IntMap::new(),
            read_only: VecDeque::new(),
            pending: Vec::new(),
        };
        Self {
            kernel: Shared::new(kernel),
            executor: Executor::new(),
            started: Arc::new(OnceCell::new()),
        }
    }

    pub fn precision(&self) -> TimeUnit {
        self.kernel.get().precision
    }

    /// Current time in steps of `precision`.
    pub fn now(&self) -> u64 {
        self.kernel.get().now
    }

    /// Current time in `unit`. For display, this does not preserve precision.
    pub fn time_in(&self, unit: TimeUnit) -> f64 {
        let k = self.kernel.get();
        time::from_steps(k.now, unit, k.precision)
    }

    /// Seconds of wall time since the first `run_until` call.
    pub fn wall_time(&self) -> f64 {
        self.started
            .get()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    pub fn spawn(
        &self,
        name: &str,
        future: impl Future<Output = HarnessResult<()>> + Send + 'static,
    ) -> JoinHandle {
        self.executor.spawn(future, name)
    }

    pub fn task_group(&self) -> TaskGroup {
        TaskGroup::new(self.executor.clone())
    }

    pub(crate) fn add_signal(
        &self,
        name: &str,
        width: u32,
        owner: Owner,
    ) -> HarnessResult<SimObject> {
        let handle = self.kernel.with_mut(|k| {
            if k.by_name.contains_key(name) {
                return Err(HarnessError::DuplicateSignal(name.to_string()));
            }
            let handle = k.signals.len();
            k.signals.push(Slot {
                name: name.to_string(),
                width,
                value: 0,
                owner,
            });
            k.by_name.insert(name.to_string(), handle);
            Ok(handle)
        })?;
        Ok(SimObject::new(self.clone(), handle))
    }

    pub fn signal(&self, name: &str) -> HarnessResult<SimObject> {
        let handle = self.kernel.get().by_name.get(name).copied();
        match handle {
            Some(h) => Ok(SimObject::new(self.clone(), h)),
            None => Err(HarnessError::UnknownSignal(name.to_string())),
        }
    }

    /// Ends the run at the end of the current time step.
    pub fn finish(&self) {
        self.kernel.with_mut(|k| k.finished = true);
    }

    pub fn is_finished(&self) -> bool {
        self.kernel.get().finished
    }

    /// Runs the simulation up to and including step `limit`. A failing task aborts
    /// the run with its error.
    pub fn run_until(&self, limit: u64) -> HarnessResult<RunOutcome> {
        let _ = self.started.get_or_init(Instant::now);
        loop {
            self.settle()?;
            self.read_only_region()?;
            if self.is_finished() {
                return Ok(RunOutcome::Finished);
            }
            let next = self.kernel.with_mut(|k| k.advance(limit));
            match next {
                Advance::Idle => return Ok(RunOutcome::Idle),
                Advance::Limit => return Ok(RunOutcome::TimeLimit),
                Advance::Timers(due) => {
                    for trig in due {
                        trig.fire();
                    }
                }
            }
        }
    }

    pub fn run_for(&self, steps: u64) -> HarnessResult<RunOutcome> {
        self.run_until(self.now().saturating_add(steps))
    }

    /// Cancels every task and forgets every pending trigger. Tasks and the time base
    /// reference each other, this breaks the cycle.
    pub fn teardown(&self) {
        self.executor.cancel_all();
        let dropped = self.kernel.with_mut(|k| {
            k.time_set.clear();
            k.pending.clear();
            (
                std::mem::replace(&mut k.timers, IntMap::new()),
                std::mem::replace(&mut k.edges, IntMap::new()),
                std::mem::take(&mut k.read_only),
            )
        });
        // wakers may hold the last reference to a task, drop them outside the lock
        drop(dropped);
    }

    fn settle(&self) -> HarnessResult<()> {
        for _ in 0..MAX_DELTA_CYCLES {
            self.executor.run_once();
            if let Some(fault) = self.executor.take_fault() {
                return Err(fault);
            }
            let woken = self.kernel.with_mut(Kernel::apply_pending);
            if woken.is_empty() {
                return Ok(());
            }
            for trig in woken {
                trig.fire();
            }
        }
        Err(HarnessError::DeltaOverflow { time: self.now() })
    }

    fn read_only_region(&self) -> HarnessResult<()> {
        let waiting = self.kernel.with_mut(|k| {
            k.phase = Phase::ReadOnly;
            std::mem::take(&mut k.read_only)
        });
        for trig in waiting {
            trig.fire();
        }
        self.executor.run_once();
        self.kernel.with_mut(|k| k.phase = Phase::Active);
        match self.executor.take_fault() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    pub(crate) fn read(&self, handle: usize) -> u32 {
        self.kernel.get().signals[handle].value
    }

    pub(crate) fn write(&self, handle: usize, value: u32, by: Owner) -> HarnessResult<()> {
        self.kernel.with_mut(|k| k.write(handle, value, by))
    }

    pub(crate) fn slot_name(&self, handle: usize) -> String {
        self.kernel.get().signals[handle].name.clone()
    }

    pub(crate) fn slot_width(&self, handle: usize) -> u32 {
        self.kernel.get().signals[handle].width
    }

    pub(crate) fn slot_owner(&self, handle: usize) -> Owner {
        self.kernel.get().signals[handle].owner
    }

    pub(crate) fn register_timer(&self, steps: u64, shared: TrigShared) {
        self.kernel.with_mut(|k| {
            // simulator time is absolute, triggers ask for a delta
            let abs_time = k.now + steps;
            if let Some(callbacks) = k.timers.get_mut(abs_time) {
                callbacks.push_back(shared);
            } else {
                let mut callbacks = VecDeque::new();
                callbacks.push_back(shared);
                k.timers.insert(abs_time, callbacks);
                k.time_set.insert(abs_time);
            }
        });
    }

    pub(crate) fn register_edge(&self, handle: usize, shared: TrigShared) {
        self.kernel.with_mut(|k| {
            if let Some(callbacks) = k.edges.get_mut(handle as u64) {
                callbacks.push_back(shared);
            } else {
                let mut callbacks = VecDeque::new();
                callbacks.push_back(shared);
                k.edges.insert(handle as u64, callbacks);
            }
        });
    }

    pub(crate) fn register_read_only(&self, shared: TrigShared) {
        self.kernel.with_mut(|k| k.read_only.push_back(shared));
    }
}

impl fmt::Debug for Sim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let k = self.kernel.get();
        f.debug_struct("Sim")
            .field("now", &k.now)
            .field("precision", &k.precision)
            .field("signals", &k.signals.len())
            .finish()
    }
}
