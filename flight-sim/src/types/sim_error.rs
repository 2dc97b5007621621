use thiserror::Error;

/// Represents errors that can occur in the flight simulation engine.
///
/// Most of these are soft: they are produced where a single record or a single
/// sink call goes wrong, logged, and never stop a tick.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Malformed schedule for flight {0}")]
    MalformedSchedule(String),
    #[error("Airport not found: {0}")]
    UnknownAirport(String),
    #[error("Sink write failed: {0}")]
    SinkWrite(#[from] SinkError),
    #[error("Simulation is already running")]
    DoubleStart,
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
    #[error("Timer start error: {0}")]
    TimerStart(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid flight status: {0}")]
    InvalidStatus(String),
    #[error("Lock error: {0}")]
    Lock(String),
}

/// Failures of the snapshot store or the notification sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("could not serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("receiver disconnected")]
    Disconnected,
    #[error("rejected: {0}")]
    Rejected(String),
}
