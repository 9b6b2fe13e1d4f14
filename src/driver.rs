use futures::StreamExt;

use crate::clock::clock_cycles;
use crate::error::HarnessResult;
use crate::interface::{InputPort, Probe};
use crate::record::MailboxRx;
use crate::trace::{Stage, TraceKind, Tracer};

/// Sole writer of the register inputs. Applies one record per clock period.
pub struct Driver {
    port: InputPort,
    probe: Probe,
    mailbox: MailboxRx,
    reset_cycles: u32,
    tracer: Tracer,
}

impl Driver {
    pub fn new(
        port: InputPort,
        probe: Probe,
        mailbox: MailboxRx,
        reset_cycles: u32,
        tracer: Tracer,
    ) -> Self {
        Self {
            port,
            probe,
            mailbox,
            reset_cycles,
            tracer,
        }
    }

    /// Holds reset for `reset_cycles` rising edges with `d` low, then releases it.
    pub async fn reset(&mut self) -> HarnessResult<()> {
        self.port.drive(0, 1)?;
        clock_cycles(self.probe.clk(), self.reset_cycles).await;
        self.port.set_reset(0)?;
        self.tracer.emit(Stage::Driver, TraceKind::ResetDone);
        Ok(())
    }

    /// Returns once the mailbox is closed and drained.
    pub async fn run(mut self) -> HarnessResult<()> {
        while let Some(record) = self.mailbox.next().await {
            self.port.drive(record.d, record.reset)?;
            self.tracer.emit(Stage::Driver, TraceKind::Record(record));
            self.probe.rising_edge().await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::clock;
    use crate::dut::{self, Dff};
    use crate::error::HarnessError;
    use crate::interface::DffIf;
    use crate::record::{mailbox, Record};
    use crate::shared::Shared;
    use crate::sim::Sim;
    use crate::time::TimeUnit;
    use crate::trace::MemorySink;
    use crate::trigger::Trigger;
    use std::sync::Arc;

    struct Bench {
        sim: Sim,
        probe: Probe,
        driver: Driver,
        sink: MemorySink,
    }

    fn bench(reset_cycles: u32) -> (Bench, crate::record::MailboxTx) {
        let sim = Sim::new(TimeUnit::Ns);
        let dff = DffIf::new(&sim, "dut").unwrap();
        let _ = sim.spawn("clock", clock(dff.clk, 10));
        let _ = sim.spawn("dut", dut::run(Dff, dff.output, dff.probe.clone()));
        let sink = MemorySink::new();
        let (tx, rx) = mailbox();
        let driver = Driver::new(
            dff.inputs,
            dff.probe.clone(),
            rx,
            reset_cycles,
            Tracer::new(&sim, Arc::new(sink.clone())),
        );
        let bench = Bench {
            sim,
            probe: dff.probe,
            driver,
            sink,
        };
        (bench, tx)
    }

    #[test]
    fn reset_is_held_for_the_configured_edges() {
        let (b, _tx) = bench(5);
        let Bench {
            sim,
            probe,
            mut driver,
            sink,
        } = b;
        let samples = Shared::new(Vec::new());
        let samples2 = samples.clone();
        let watch = probe.clone();
        let _ = sim.spawn("reset", async move {
            driver.reset().await?;
            Ok(())
        });
        let _ = sim.spawn("watch", async move {
            for _ in 0..7 {
                watch.clk().rising_edge_ro().await;
                samples2.with_mut(|s| s.push((watch.sim().now(), watch.reset(), watch.q())));
            }
            Ok(())
        });
        sim.run_until(80).unwrap();
        assert_eq!(
            *samples.get(),
            vec![
                (5, 1, 0),
                (15, 1, 0),
                (25, 1, 0),
                (35, 1, 0),
                (45, 0, 0),
                (55, 0, 0),
                (65, 0, 0),
            ]
        );
        assert_eq!(sink.events().len(), 1);
        assert_eq!(sink.events()[0].time, 45);
        sim.teardown();
    }

    fn state(tag: &'static str, probe: &Probe) -> (&'static str, u8, u8, u8) {
        (tag, probe.d(), probe.reset(), probe.q())
    }

    #[test]
    fn reset_clears_a_set_register_and_repeats_cleanly() {
        let (b, _tx) = bench(5);
        let Bench {
            sim,
            probe,
            mut driver,
            ..
        } = b;
        let states = Shared::new(Vec::new());
        let states2 = states.clone();
        let _ = sim.spawn("reset", async move {
            let sim = probe.sim().clone();

            driver.port.drive(1, 0)?;
            clock_cycles(probe.clk(), 2).await;
            // one step later the edge's writes have committed and writes are allowed again
            Trigger::timer_steps(&sim, 1).await;
            states2.with_mut(|s| s.push(state("set", &probe)));

            driver.port.drive(1, 1)?;
            clock_cycles(probe.clk(), 5).await;
            Trigger::timer_steps(&sim, 1).await;
            states2.with_mut(|s| s.push(state("held", &probe)));

            for tag in ["reset", "reset again"] {
                driver.reset().await?;
                Trigger::timer_steps(&sim, 1).await;
                states2.with_mut(|s| s.push(state(tag, &probe)));
            }
            Ok(())
        });
        sim.run_until(300).unwrap();
        assert_eq!(
            *states.get(),
            vec![
                ("set", 1, 0, 1),
                ("held", 1, 1, 0),
                ("reset", 0, 0, 0),
                ("reset again", 0, 0, 0),
            ]
        );
        sim.teardown();
    }

    #[test]
    fn one_record_per_clock_period() {
        let (b, tx) = bench(1);
        let Bench { sim, driver, sink, .. } = b;
        for d in [1, 0, 1] {
            tx.unbounded_send(Record::stimulus(d, 0)).unwrap();
        }
        drop(tx);
        let handle = sim.spawn("drv", driver.run());
        sim.run_until(100).unwrap();
        let times: Vec<u64> = sink.events().iter().map(|e| e.time).collect();
        assert_eq!(times, vec![0, 5, 15]);
        assert!(handle.is_finished());
        sim.teardown();
    }

    #[test]
    fn out_of_range_record_fails_fast() {
        let (b, tx) = bench(1);
        tx.unbounded_send(Record::stimulus(2, 0)).unwrap();
        let _ = b.sim.spawn("drv", b.driver.run());
        match b.sim.run_until(100) {
            Err(HarnessError::TaskFailed { task, source }) => {
                assert_eq!(task, "drv");
                assert!(matches!(*source, HarnessError::ValueOutOfRange { value: 2, .. }));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        b.sim.teardown();
    }
}
