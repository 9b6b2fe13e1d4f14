use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use crate::signal::SimObject;
use crate::sim::Sim;

#[derive(PartialEq, Clone, Copy, Debug)]
pub(crate) enum EdgeKind {
    Any,
    Rising,
    Falling,
}

impl EdgeKind {
    /// Classifies a value change. Zero to non-zero is rising, non-zero to zero is
    /// falling, anything else is only a change.
    pub(crate) fn between(old: u32, new: u32) -> Self {
        if old == 0 {
            EdgeKind::Rising
        } else if new == 0 {
            EdgeKind::Falling
        } else {
            EdgeKind::Any
        }
    }

    pub(crate) fn accepts(self, edge: EdgeKind) -> bool {
        self == EdgeKind::Any || self == edge
    }
}

/// Registration kept by the time base for one awaited trigger.
#[derive(Debug, Clone)]
pub(crate) struct TrigShared {
    waker: Waker,
    fired: Arc<AtomicBool>,
    // edge triggers only wake on the edge they asked for, the rest are kept registered
    pub(crate) edge_kind: EdgeKind,
}

impl TrigShared {
    pub(crate) fn fire(self) {
        self.fired.store(true, Ordering::Release);
        self.waker.wake();
    }
}

#[derive(Clone, Debug)]
enum TrigKind {
    Edge(usize, EdgeKind),
    Timer(u64),
    ReadOnly,
}

/// A point in simulated time a task can wait for. Awaiting registers the trigger with
/// the time base; it completes once the time base fires it, so stray wake-ups from
/// other sources (a mailbox the task used earlier, say) do not end the wait early.
pub struct Trigger {
    sim: Sim,
    kind: TrigKind,
    fired: Option<Arc<AtomicBool>>,
}

impl Trigger {
    fn new(sim: &Sim, kind: TrigKind) -> Self {
        Trigger {
            sim: sim.clone(),
            kind,
            fired: None,
        }
    }

    /// Zero steps completes immediately.
    pub fn timer_steps(sim: &Sim, steps: u64) -> Self {
        Trigger::new(sim, TrigKind::Timer(steps))
    }

    pub async fn timer_ro(sim: &Sim, steps: u64) {
        Trigger::timer_steps(sim, steps).await;
        Trigger::read_only(sim).await;
    }

    pub fn rising_edge(signal: &SimObject) -> Self {
        Trigger::new(signal.sim(), TrigKind::Edge(signal.handle(), EdgeKind::Rising))
    }

    pub fn falling_edge(signal: &SimObject) -> Self {
        Trigger::new(signal.sim(), TrigKind::Edge(signal.handle(), EdgeKind::Falling))
    }

    /// Fires after every delta cycle of the current time step has settled. Signal writes
    /// are rejected until the step ends.
    pub fn read_only(sim: &Sim) -> Self {
        Trigger::new(sim, TrigKind::ReadOnly)
    }
}

impl Future for Trigger {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(fired) = &self.fired {
            return match fired.load(Ordering::Acquire) {
                true => Poll::Ready(()),
                false => Poll::Pending,
            };
        }
        if matches!(self.kind, TrigKind::Timer(0)) {
            return Poll::Ready(());
        }

        let fired = Arc::new(AtomicBool::new(false));
        let mut shared = TrigShared {
            waker: cx.waker().clone(),
            fired: fired.clone(),
            edge_kind: EdgeKind::Any,
        };
        match self.kind {
            TrigKind::Timer(steps) => self.sim.register_timer(steps, shared),
            TrigKind::ReadOnly => self.sim.register_read_only(shared),
            TrigKind::Edge(handle, edge_kind) => {
                shared.edge_kind = edge_kind;
                self.sim.register_edge(handle, shared);
            }
        }
        self.fired = Some(fired);
        Poll::Pending
    }
}
