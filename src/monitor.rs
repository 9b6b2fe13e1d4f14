use crate::error::HarnessResult;
use crate::interface::Probe;
use crate::record::{MailboxTx, Record};
use crate::trace::{Stage, TraceKind, Tracer};
use crate::trigger::Trigger;

/// Samples `q` (and `d`, for display) once per clock period, `settle` steps after the
/// rising edge, once the time step has settled.
pub struct Monitor {
    probe: Probe,
    mailbox: MailboxTx,
    settle: u64,
    tracer: Tracer,
}

impl Monitor {
    pub fn new(probe: Probe, mailbox: MailboxTx, settle: u64, tracer: Tracer) -> Self {
        Self {
            probe,
            mailbox,
            settle,
            tracer,
        }
    }

    /// Returns once the scoreboard stops listening.
    pub async fn run(self) -> HarnessResult<()> {
        let sim = self.probe.sim().clone();
        loop {
            self.probe.rising_edge().await;
            Trigger::timer_ro(&sim, self.settle).await;
            let record = Record::observed(self.probe.q(), self.probe.d());
            if self.mailbox.unbounded_send(record).is_err() {
                log::debug!("scoreboard gone, monitor stopping");
                return Ok(());
            }
            self.tracer.emit(Stage::Monitor, TraceKind::Record(record));
        }
    }
}
