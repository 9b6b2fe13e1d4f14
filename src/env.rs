use crate::config::Config;
use crate::driver::Driver;
use crate::error::HarnessResult;
use crate::executor::TaskGroup;
use crate::generator::Generator;
use crate::interface::{InputPort, Probe};
use crate::monitor::Monitor;
use crate::record::mailbox;
use crate::scoreboard::{Scoreboard, ScoreboardStats};
use crate::shared::Shared;
use crate::sim::Sim;
use crate::stimulus::StimulusSource;
use crate::trace::Tracer;

/// Owns the four verification stages and the mailboxes that connect them:
///
/// ```text
/// generator --+--> driver ==> register ==> monitor --> scoreboard
///             +-------------------------------------------^
/// ```
pub struct Environment<S> {
    sim: Sim,
    generator: Generator<S>,
    driver: Driver,
    monitor: Monitor,
    scoreboard: Scoreboard,
    stats: Shared<ScoreboardStats>,
}

impl<S: StimulusSource + 'static> Environment<S> {
    pub fn new(
        sim: &Sim,
        config: &Config,
        inputs: InputPort,
        probe: Probe,
        source: S,
        tracer: Tracer,
    ) -> HarnessResult<Self> {
        config.validate()?;
        let (gen_to_drv, drv_mailbox) = mailbox();
        let (gen_to_sco, expected) = mailbox();
        let (mon_to_sco, observed) = mailbox();

        let generator = Generator::new(
            source,
            config.stimulus_count,
            gen_to_drv,
            gen_to_sco,
            tracer.clone(),
        );
        let driver = Driver::new(
            inputs,
            probe.clone(),
            drv_mailbox,
            config.reset_cycles,
            tracer.clone(),
        );
        let monitor = Monitor::new(probe, mon_to_sco, config.settle_steps()?, tracer.clone());
        let scoreboard = Scoreboard::new(expected, observed, tracer);
        let stats = scoreboard.stats();

        Ok(Self {
            sim: sim.clone(),
            generator,
            driver,
            monitor,
            scoreboard,
            stats,
        })
    }

    /// Live view of the scoreboard counters, valid after `run` consumed the environment.
    pub fn stats(&self) -> Shared<ScoreboardStats> {
        self.stats.clone()
    }

    /// Resets the register, then starts every stage. The returned group finishes once
    /// the scoreboard has compared every record.
    pub async fn run(self) -> HarnessResult<TaskGroup> {
        let Self {
            sim,
            generator,
            mut driver,
            monitor,
            scoreboard,
            ..
        } = self;

        driver.reset().await?;

        let mut group = sim.task_group();
        group.spawn("generator", generator.run());
        group.spawn("driver", driver.run());
        group.spawn("monitor", monitor.run());
        group.spawn("scoreboard", scoreboard.run());
        Ok(group)
    }
}
