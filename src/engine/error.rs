use crate::model::{AppointmentId, Instant};

#[derive(Debug)]
pub enum ScheduleError {
    UnknownTimezone(String),
    InvalidPolicy { open: u32, close: u32 },
    InvalidConfig(String),
    InvariantViolation { start: Instant, end: Instant },
    InvalidWallClock { hour: u32, minute: u32 },
    NonexistentLocalTime(String),
    NotFound(AppointmentId),
    LimitExceeded(&'static str),
}

impl ScheduleError {
    /// Configuration errors are fatal and must not be retried.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ScheduleError::UnknownTimezone(_)
                | ScheduleError::InvalidPolicy { .. }
                | ScheduleError::InvalidConfig(_)
        )
    }
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::UnknownTimezone(tz) => write!(f, "unknown timezone: {tz}"),
            ScheduleError::InvalidPolicy { open, close } => {
                write!(f, "invalid office hours: open {open} must be before close {close} (max 24)")
            }
            ScheduleError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            ScheduleError::InvariantViolation { start, end } => {
                write!(f, "interval start {start} must be before end {end}")
            }
            ScheduleError::InvalidWallClock { hour, minute } => {
                write!(f, "invalid wall-clock time {hour:02}:{minute:02}")
            }
            ScheduleError::NonexistentLocalTime(msg) => {
                write!(f, "local time does not exist: {msg}")
            }
            ScheduleError::NotFound(id) => write!(f, "appointment not found: {id}"),
            ScheduleError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for ScheduleError {}
