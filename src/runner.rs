use std::sync::Arc;

use crate::clock::clock;
use crate::config::Config;
use crate::dut::{self, RegisterModel};
use crate::env::Environment;
use crate::error::HarnessResult;
use crate::interface::DffIf;
use crate::report::RunReport;
use crate::sim::Sim;
use crate::stimulus::StimulusSource;
use crate::trace::{TraceSink, Tracer};

async fn supervise<S>(sim: Sim, env: Environment<S>) -> HarnessResult<()>
where
    S: StimulusSource + 'static,
{
    let group = env.run().await?;
    log::debug!("started {}", group.names().join(", "));
    group.join().await?;
    sim.finish();
    Ok(())
}

/// Runs one complete check of `model`: clock, register task and environment on a
/// fresh time base, until every record has been compared or the time limit hits.
///
/// A stage failing (a protocol violation, not a mismatch) aborts the run with its error.
pub fn run_test<M, S>(
    config: &Config,
    model: M,
    source: S,
    sink: Arc<dyn TraceSink>,
) -> HarnessResult<RunReport>
where
    M: RegisterModel + 'static,
    S: StimulusSource + 'static,
{
    config.validate()?;
    let period = config.period_steps()?;
    let limit = config.time_limit_steps()?;

    let sim = Sim::new(config.precision);
    let dff = DffIf::new(&sim, "dut")?;
    let tracer = Tracer::new(&sim, sink);

    let _ = sim.spawn("clock", clock(dff.clk, period));
    let _ = sim.spawn("dut", dut::run(model, dff.output, dff.probe.clone()));
    let env = Environment::new(&sim, config, dff.inputs, dff.probe, source, tracer)?;
    let stats = env.stats();
    let _ = sim.spawn("env", supervise(sim.clone(), env));

    log::info!(
        "running `{}`: {} records, limit {} steps of 1{}",
        config.name,
        config.stimulus_count,
        limit,
        config.precision
    );
    let outcome = sim.run_until(limit);
    let sim_time = sim.time_in(config.time_unit);
    let wall_time = sim.wall_time();
    sim.teardown();
    let outcome = outcome?;

    let stats = stats.get().clone();
    log::info!(
        "`{}` ended ({:?}) at {}{}: {}",
        config.name,
        outcome,
        sim_time,
        config.time_unit,
        stats.result_str()
    );
    Ok(RunReport {
        name: config.name.clone(),
        outcome,
        stimulus_count: config.stimulus_count,
        stats,
        sim_time,
        time_unit: config.time_unit,
        wall_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dut::Dff;
    use crate::error::HarnessError;
    use crate::sim::RunOutcome;
    use crate::stimulus::Scripted;
    use crate::trace::MemorySink;

    #[test]
    fn invalid_config_is_rejected_before_running() {
        let config = Config {
            reset_cycles: 0,
            ..Config::default()
        };
        let result = run_test(&config, Dff, Scripted::data(&[1]), Arc::new(MemorySink::new()));
        assert!(matches!(result, Err(HarnessError::Config(_))));
    }

    #[test]
    fn finishes_one_period_after_the_last_sample() {
        let config = Config {
            stimulus_count: 5,
            ..Config::default()
        };
        let source = Scripted::data(&[1, 0, 1, 1, 0]);
        let report = run_test(&config, Dff, source, Arc::new(MemorySink::new())).unwrap();
        assert_eq!(report.outcome, RunOutcome::Finished);
        // last sample at 100ns, the monitor notices the scoreboard is gone at 110ns
        assert_eq!(report.sim_time, 110.0);
        assert!(report.passed());
    }

    #[test]
    fn short_time_limit_reports_failure() {
        let config = Config {
            stimulus_count: 5,
            max_sim_time: Some(70),
            ..Config::default()
        };
        let source = Scripted::data(&[1]);
        let report = run_test(&config, Dff, source, Arc::new(MemorySink::new())).unwrap();
        assert_eq!(report.outcome, RunOutcome::TimeLimit);
        assert!(!report.passed());
        assert_eq!(report.stats.compared(), 2);
    }
}
