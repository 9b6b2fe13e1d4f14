use crate::error::HarnessResult;
use crate::interface::ClockPort;
use crate::signal::SimObject;
use crate::trigger::Trigger;

/// Free-running clock. Starts low, so the first rising edge comes after the low time.
pub async fn clock(clk: ClockPort, period: u64) -> HarnessResult<()> {
    let high_t = period / 2;
    let low_t = period - high_t;
    if period % 2 != 0 {
        log::warn!(
            "Clock period {} not dividable by 2. High time will be {}; low time will be {} (steps).",
            period,
            high_t,
            low_t
        );
    }
    let sim = clk.sim().clone();
    loop {
        clk.set(0)?;
        Trigger::timer_steps(&sim, low_t).await;
        clk.set(1)?;
        Trigger::timer_steps(&sim, high_t).await;
    }
}

pub async fn clock_cycles(signal: &SimObject, n_cycles: u32) {
    for _ in 0..n_cycles {
        signal.rising_edge().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::DffIf;
    use crate::shared::Shared;
    use crate::sim::Sim;
    use crate::time::TimeUnit;

    #[test]
    fn edges_follow_period() {
        let sim = Sim::new(TimeUnit::Ns);
        let dff = DffIf::new(&sim, "dut").unwrap();
        let clk = dff.probe.clk().clone();
        let _ = sim.spawn("clock", clock(dff.clk, 10));

        let edges = Shared::new(Vec::new());
        let edges2 = edges.clone();
        let _ = sim.spawn("count", async move {
            for _ in 0..3 {
                clock_cycles(&clk, 1).await;
                edges2.with_mut(|e| e.push(clk.sim().now()));
            }
            Ok(())
        });
        sim.run_until(40).unwrap();
        assert_eq!(*edges.get(), vec![5, 15, 25]);
        sim.teardown();
    }

    #[test]
    fn odd_period_gives_longer_low_phase() {
        let sim = Sim::new(TimeUnit::Ns);
        let dff = DffIf::new(&sim, "dut").unwrap();
        let clk = dff.probe.clk().clone();
        let _ = sim.spawn("clock", clock(dff.clk, 7));

        let falls = Shared::new(Vec::new());
        let falls2 = falls.clone();
        let _ = sim.spawn("count", async move {
            for _ in 0..2 {
                clk.falling_edge().await;
                falls2.with_mut(|e| e.push(clk.sim().now()));
            }
            Ok(())
        });
        sim.run_until(20).unwrap();
        // rises at 4 and 11, falls 3 steps later
        assert_eq!(*falls.get(), vec![7, 14]);
        sim.teardown();
    }
}
