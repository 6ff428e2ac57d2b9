use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid config: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    #[error("Scheduler is already running")]
    AlreadyRunning,

    #[error("Scheduler is not running")]
    NotRunning,

    #[error("Scheduler engine is gone (thread panicked, or engine recovered by stop)")]
    SchedulerLost,
}

pub type SimResult<T> = Result<T, EngineError>;
