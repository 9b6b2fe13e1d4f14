use thiserror::Error;

use crate::signal::Owner;
use crate::time::TimeUnit;

pub type HarnessResult<T> = Result<T, HarnessError>;

/// Protocol violations. Any of these means the harness is wired wrong, so a task
/// returning one takes the whole run down. Functional mismatches are not errors and
/// never show up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    #[error("signal `{signal}` is driven by {owner}, rejected write from {writer}")]
    ForeignWrite {
        signal: String,
        owner: Owner,
        writer: Owner,
    },
    #[error("value {value} does not fit {width}-bit signal `{signal}`")]
    ValueOutOfRange {
        signal: String,
        value: u32,
        width: u32,
    },
    #[error("write to `{signal}` during the read-only phase")]
    WriteInReadOnly { signal: String },
    #[error("no signal named `{0}`")]
    UnknownSignal(String),
    #[error("signal `{0}` already exists")]
    DuplicateSignal(String),
    #[error("unknown time unit `{0}`")]
    UnknownTimeUnit(String),
    #[error("can't convert {time}{unit} to simulation steps without rounding (precision: {precision})")]
    InexactTime {
        time: u64,
        unit: TimeUnit,
        precision: TimeUnit,
    },
    #[error("mailbox `{0}` closed while still in use")]
    MailboxClosed(&'static str),
    #[error("task `{0}` was cancelled")]
    Cancelled(String),
    #[error("task `{task}` failed: {source}")]
    TaskFailed {
        task: String,
        source: Box<HarnessError>,
    },
    #[error("delta cycle limit exceeded at step {time}")]
    DeltaOverflow { time: u64 },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to write report: {0}")]
    Report(String),
}
