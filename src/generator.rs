use crate::error::{HarnessError, HarnessResult};
use crate::record::MailboxTx;
use crate::stimulus::StimulusSource;
use crate::trace::{Stage, TraceKind, Tracer};

/// Produces exactly `count` stimulus records and sends each one to the driver and,
/// as an identical copy, to the scoreboard.
pub struct Generator<S> {
    source: S,
    count: usize,
    to_driver: MailboxTx,
    to_scoreboard: MailboxTx,
    tracer: Tracer,
}

impl<S: StimulusSource> Generator<S> {
    pub fn new(
        source: S,
        count: usize,
        to_driver: MailboxTx,
        to_scoreboard: MailboxTx,
        tracer: Tracer,
    ) -> Self {
        Self {
            source,
            count,
            to_driver,
            to_scoreboard,
            tracer,
        }
    }

    /// Both mailboxes close when this returns.
    pub async fn run(mut self) -> HarnessResult<()> {
        for _ in 0..self.count {
            let record = self.source.next_stimulus();
            self.tracer.emit(Stage::Generator, TraceKind::Record(record));
            self.to_driver
                .unbounded_send(record)
                .map_err(|_| HarnessError::MailboxClosed("gen->drv"))?;
            self.to_scoreboard
                .unbounded_send(record)
                .map_err(|_| HarnessError::MailboxClosed("gen->sco"))?;
        }
        log::debug!("generator done after {} records", self.count);
        Ok(())
    }
}
