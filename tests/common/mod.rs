use std::sync::Arc;

use dffcheck::prelude::*;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Runs `model` against `source` and keeps every trace event.
pub fn run_traced<M, S>(config: &Config, model: M, source: S) -> (RunReport, MemorySink)
where
    M: RegisterModel + 'static,
    S: StimulusSource + 'static,
{
    init_logging();
    let sink = MemorySink::new();
    let sinks: Vec<Arc<dyn TraceSink>> = vec![Arc::new(sink.clone()), Arc::new(LogSink)];
    let fanout = Fanout::new(sinks);
    let report = run_test(config, model, source, Arc::new(fanout)).expect("run aborted");
    (report, sink)
}

pub fn config(count: usize) -> Config {
    Config {
        stimulus_count: count,
        ..Config::default()
    }
}
