use futures_channel::mpsc;
use std::fmt;

/// One cycle's worth of register traffic. Expected records carry `d` and `reset`;
/// observed records carry `q` and the `d` seen at the sampling instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Record {
    pub d: u8,
    pub reset: u8,
    pub q: u8,
}

impl Record {
    pub fn stimulus(d: u8, reset: u8) -> Self {
        Self { d, reset, q: 0 }
    }

    pub fn observed(q: u8, d: u8) -> Self {
        Self { d, reset: 0, q }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d={} rst={} q={}", self.d, self.reset, self.q)
    }
}

pub type MailboxTx<T = Record> = mpsc::UnboundedSender<T>;
pub type MailboxRx<T = Record> = mpsc::UnboundedReceiver<T>;

/// Point-to-point FIFO between two stages. Sends never block. The receiver sees the
/// end of the stream once every sender is dropped and the queue is drained.
pub fn mailbox<T>() -> (MailboxTx<T>, MailboxRx<T>) {
    mpsc::unbounded()
}
