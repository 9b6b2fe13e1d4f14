use std::fmt;

use crate::error::HarnessResult;
use crate::sim::Sim;
use crate::trigger::Trigger;

/// The single component allowed to write a signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    Clock,
    Driver,
    Dut,
    Testbench,
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Owner::Clock => "clock",
            Owner::Driver => "driver",
            Owner::Dut => "dut",
            Owner::Testbench => "testbench",
        };
        f.write_str(s)
    }
}

/// Handle to one signal of the simulation. Reading is open to everyone; writing is
/// crate-internal and goes through the ports in `interface`, which tag the write with
/// their owner.
#[derive(Clone)]
pub struct SimObject {
    sim: Sim,
    handle: usize,
}

impl SimObject {
    pub(crate) fn new(sim: Sim, handle: usize) -> Self {
        Self { sim, handle }
    }

    pub fn handle(&self) -> usize {
        self.handle
    }

    pub fn sim(&self) -> &Sim {
        &self.sim
    }

    pub fn name(&self) -> String {
        self.sim.slot_name(self.handle)
    }

    pub fn width(&self) -> u32 {
        self.sim.slot_width(self.handle)
    }

    pub fn owner(&self) -> Owner {
        self.sim.slot_owner(self.handle)
    }

    /// Value committed at the end of the last delta cycle. Writes made in the current
    /// delta are not visible yet.
    pub fn u32(&self) -> u32 {
        self.sim.read(self.handle)
    }

    pub fn bit(&self) -> u8 {
        (self.u32() & 1) as u8
    }

    pub(crate) fn set(&self, val: u32, by: Owner) -> HarnessResult<()> {
        self.sim.write(self.handle, val, by)
    }

    // convenience functions to get edge triggers for this signal
    pub fn rising_edge(&self) -> Trigger {
        Trigger::rising_edge(self)
    }

    pub async fn rising_edge_ro(&self) {
        self.rising_edge().await;
        Trigger::read_only(&self.sim).await;
    }

    pub fn falling_edge(&self) -> Trigger {
        Trigger::falling_edge(self)
    }
}

impl fmt::Debug for SimObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimObject")
            .field("name", &self.name())
            .field("value", &self.u32())
            .finish()
    }
}
