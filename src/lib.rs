//! Appointment scheduling core: office-hours and overlap validation for
//! appointment intervals, timezone normalisation, and an in-memory calendar
//! store that commits appointments only after they validate.

pub mod calendar;
pub mod config;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;
pub mod time;

pub use calendar::{precheck, AppointmentSource, Calendar, Commit};
pub use config::SchedulerConfig;
pub use engine::{find_starting_within, validate, ScheduleError};
pub use model::{
    Appointment, AppointmentDetails, AppointmentId, ExistingAppointmentSet, Instant,
    OfficeHoursPolicy, Scope, TimeInterval, Verdict,
};
pub use time::{local_interval, resolve_timezone, to_canonical, to_local, LocalWallClock};
