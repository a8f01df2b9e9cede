use std::fmt;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::engine::ScheduleError;
use crate::time::{to_local, LocalWallClock};

/// Canonical instant. Always UTC.
pub type Instant = DateTime<Utc>;

/// Half-open interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TimeInterval {
    start: Instant,
    end: Instant,
}

#[derive(Deserialize)]
struct RawInterval {
    start: Instant,
    end: Instant,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = ScheduleError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        TimeInterval::new(raw.start, raw.end)
    }
}

impl TimeInterval {
    pub fn new(start: Instant, end: Instant) -> Result<Self, ScheduleError> {
        if start >= end {
            return Err(ScheduleError::InvariantViolation { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn end(&self) -> Instant {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Boundary touching (`self.end == other.start`) is not an overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Instant) -> bool {
        self.start <= t && t < self.end
    }
}

/// Appointment identifier. Persisted appointments carry the id assigned by the
/// store; drafts carry [`AppointmentId::NEW`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AppointmentId(pub i64);

impl AppointmentId {
    /// Not yet persisted.
    pub const NEW: AppointmentId = AppointmentId(-1);

    pub fn is_new(&self) -> bool {
        *self == Self::NEW
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opening hours expressed in the business's reference timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OfficeHoursPolicy {
    open_hour: u32,
    close_hour: u32,
}

impl OfficeHoursPolicy {
    pub fn new(open_hour: u32, close_hour: u32) -> Result<Self, ScheduleError> {
        if open_hour >= close_hour || close_hour > 24 {
            return Err(ScheduleError::InvalidPolicy {
                open: open_hour,
                close: close_hour,
            });
        }
        Ok(Self {
            open_hour,
            close_hour,
        })
    }

    pub fn open_hour(&self) -> u32 {
        self.open_hour
    }

    pub fn close_hour(&self) -> u32 {
        self.close_hour
    }

    pub(crate) fn open_minute_of_day(&self) -> u32 {
        self.open_hour * 60
    }

    pub(crate) fn close_minute_of_day(&self) -> u32 {
        self.close_hour * 60
    }
}

impl Default for OfficeHoursPolicy {
    /// 08:00–22:00.
    fn default() -> Self {
        Self {
            open_hour: 8,
            close_hour: 22,
        }
    }
}

/// One `(id, interval)` pair of an [`ExistingAppointmentSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledSlot {
    pub id: AppointmentId,
    pub interval: TimeInterval,
}

/// Every appointment in one collision domain, as loaded for a single call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingAppointmentSet {
    slots: Vec<ScheduledSlot>,
}

impl ExistingAppointmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: AppointmentId, interval: TimeInterval) {
        self.slots.push(ScheduledSlot { id, interval });
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledSlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl FromIterator<(AppointmentId, TimeInterval)> for ExistingAppointmentSet {
    fn from_iter<I: IntoIterator<Item = (AppointmentId, TimeInterval)>>(iter: I) -> Self {
        Self {
            slots: iter
                .into_iter()
                .map(|(id, interval)| ScheduledSlot { id, interval })
                .collect(),
        }
    }
}

/// Outcome of validating a candidate interval. Rejections are ordinary results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    RejectedOutOfHours,
    RejectedOverlap(AppointmentId),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Accepted => "accepted",
            Verdict::RejectedOutOfHours => "out_of_hours",
            Verdict::RejectedOverlap(_) => "overlap",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "accepted"),
            Verdict::RejectedOutOfHours => {
                write!(f, "start or end time is not within office hours")
            }
            Verdict::RejectedOverlap(id) => {
                write!(f, "time overlaps with appointment {id}")
            }
        }
    }
}

// ── Stored records ───────────────────────────────────────────────

/// Collision domain: appointments in the same scope must not overlap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope(String);

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The single shared calendar.
    pub fn shared() -> Self {
        Self("shared".into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Appointment fields supplied by the caller before an id exists.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppointmentDetails {
    pub title: String,
    pub description: String,
    pub location: String,
    pub kind: String,
    pub contact_id: i64,
    pub customer_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub details: AppointmentDetails,
    pub interval: TimeInterval,
}

impl Appointment {
    /// Start and end rendered as wall-clock values in `tz`.
    pub fn localize(&self, tz: Tz) -> LocalAppointmentView {
        LocalAppointmentView {
            id: self.id,
            start: to_local(self.interval.start(), tz),
            end: to_local(self.interval.end(), tz),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalAppointmentView {
    pub id: AppointmentId,
    pub start: LocalWallClock,
    pub end: LocalWallClock,
}
