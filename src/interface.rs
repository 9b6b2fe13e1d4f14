//! Signal set shared between the testbench and the register under test.
//!
//! `DffIf::new` hands out one write port per owner. The ports are not `Clone`, so
//! whoever holds `InputPort` is the only component able to drive `d` and `reset`.
//! Everyone else reads through a `Probe`.

use crate::error::HarnessResult;
use crate::signal::{Owner, SimObject};
use crate::sim::Sim;
use crate::trigger::Trigger;

pub struct DffIf {
    pub clk: ClockPort,
    pub inputs: InputPort,
    pub output: OutputPort,
    pub probe: Probe,
}

impl DffIf {
    pub fn new(sim: &Sim, scope: &str) -> HarnessResult<Self> {
        let clk = sim.add_signal(&format!("{scope}.clk"), 1, Owner::Clock)?;
        let d = sim.add_signal(&format!("{scope}.d"), 1, Owner::Driver)?;
        let reset = sim.add_signal(&format!("{scope}.reset"), 1, Owner::Driver)?;
        let q = sim.add_signal(&format!("{scope}.q"), 1, Owner::Dut)?;
        Ok(Self {
            clk: ClockPort { clk: clk.clone() },
            inputs: InputPort {
                d: d.clone(),
                reset: reset.clone(),
            },
            output: OutputPort { q: q.clone() },
            probe: Probe { clk, d, reset, q },
        })
    }
}

/// Write access to `d` and `reset`. Owned by the driver.
pub struct InputPort {
    d: SimObject,
    reset: SimObject,
}

impl InputPort {
    pub fn drive(&self, d: u8, reset: u8) -> HarnessResult<()> {
        self.d.set(d as u32, Owner::Driver)?;
        self.reset.set(reset as u32, Owner::Driver)
    }

    pub fn set_reset(&self, reset: u8) -> HarnessResult<()> {
        self.reset.set(reset as u32, Owner::Driver)
    }
}

/// Write access to `q`. Owned by the register model.
pub struct OutputPort {
    q: SimObject,
}

impl OutputPort {
    pub fn write(&self, q: u8) -> HarnessResult<()> {
        self.q.set(q as u32, Owner::Dut)
    }
}

/// Write access to `clk`. Owned by the clock generator.
pub struct ClockPort {
    clk: SimObject,
}

impl ClockPort {
    pub fn set(&self, level: u8) -> HarnessResult<()> {
        self.clk.set(level as u32, Owner::Clock)
    }

    pub fn sim(&self) -> &Sim {
        self.clk.sim()
    }
}

/// Read-only view of the whole interface.
#[derive(Clone, Debug)]
pub struct Probe {
    clk: SimObject,
    d: SimObject,
    reset: SimObject,
    q: SimObject,
}

impl Probe {
    pub fn sim(&self) -> &Sim {
        self.clk.sim()
    }

    pub fn clk(&self) -> &SimObject {
        &self.clk
    }

    pub fn d(&self) -> u8 {
        self.d.bit()
    }

    pub fn reset(&self) -> u8 {
        self.reset.bit()
    }

    pub fn q(&self) -> u8 {
        self.q.bit()
    }

    pub fn rising_edge(&self) -> Trigger {
        self.clk.rising_edge()
    }
}
