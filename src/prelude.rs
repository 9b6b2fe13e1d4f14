pub use crate::config::Config;
pub use crate::dut::{Dff, IgnoresReset, RegisterModel, StuckAt};
pub use crate::error::{HarnessError, HarnessResult};
pub use crate::executor::{JoinHandle, TaskGroup};
pub use crate::interface::{DffIf, Probe};
pub use crate::record::{mailbox, Record};
pub use crate::report::RunReport;
pub use crate::runner::run_test;
pub use crate::scoreboard::{Verdict, ScoreboardStats};
pub use crate::signal::SimObject;
pub use crate::sim::{RunOutcome, Sim};
pub use crate::stimulus::{RandomStimulus, Scripted, StimulusSource};
pub use crate::time::TimeUnit;
pub use crate::trace::{Fanout, LogSink, MemorySink, Stage, TraceEvent, TraceKind, TraceSink};
pub use crate::trigger::Trigger;
pub use futures::future::FutureExt;
