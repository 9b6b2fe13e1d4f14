//! Behavioral models of the register under test.

use crate::error::HarnessResult;
use crate::interface::{OutputPort, Probe};

/// Next-state function of a clocked one-bit register, evaluated on every rising edge
/// with the input values from just before the edge.
pub trait RegisterModel: Send {
    fn clock(&mut self, d: u8, reset: u8) -> u8;
}

/// D flip-flop with synchronous, active-high reset.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dff;

impl RegisterModel for Dff {
    fn clock(&mut self, d: u8, reset: u8) -> u8 {
        match reset {
            1 => 0,
            _ => d,
        }
    }
}

/// Output stuck at a constant, whatever the inputs.
#[derive(Clone, Copy, Debug)]
pub struct StuckAt(pub u8);

impl RegisterModel for StuckAt {
    fn clock(&mut self, _d: u8, _reset: u8) -> u8 {
        self.0
    }
}

/// Register whose reset line is not connected.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoresReset;

impl RegisterModel for IgnoresReset {
    fn clock(&mut self, d: u8, _reset: u8) -> u8 {
        d
    }
}

impl<M: RegisterModel + ?Sized> RegisterModel for Box<M> {
    fn clock(&mut self, d: u8, reset: u8) -> u8 {
        (**self).clock(d, reset)
    }
}

/// Drop-in replacement for the HDL register: samples `d`/`reset` on each rising edge
/// and drives `q`.
pub async fn run<M: RegisterModel>(mut model: M, q: OutputPort, probe: Probe) -> HarnessResult<()> {
    loop {
        probe.rising_edge().await;
        let next = model.clock(probe.d(), probe.reset());
        q.write(next)?;
    }
}
