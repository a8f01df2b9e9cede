//! Conversion between canonical UTC instants and wall-clock time in a named
//! timezone.
//!
//! Forms collect a single calendar date plus a start and end time-of-day, so
//! the end's date has to be inferred: an end that is not after the start is
//! taken to fall on the following day. Multi-day appointments cannot be
//! expressed this way.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Offset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::engine::ScheduleError;
use crate::model::{Instant, TimeInterval};

/// `(hour, minute)` as picked in a form.
pub type HourMinute = (u32, u32);

/// An instant as seen on a wall clock in some timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalWallClock {
    pub date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
}

impl LocalWallClock {
    pub fn minute_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}

impl std::fmt::Display for LocalWallClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.date.year(),
            self.date.month(),
            self.date.day(),
            self.hour,
            self.minute
        )
    }
}

/// Parse an IANA timezone identifier.
pub fn resolve_timezone(id: &str) -> Result<Tz, ScheduleError> {
    id.parse::<Tz>()
        .map_err(|_| ScheduleError::UnknownTimezone(id.to_string()))
}

/// Wall-clock `date hour:minute` in `tz` to a UTC instant.
///
/// A repeated local time (clocks set back) resolves to its first occurrence.
/// A skipped local time (clocks set forward) is read with the offset in force
/// before the jump, so 02:30 inside a 02:00→03:00 gap becomes 03:30.
pub fn to_canonical(date: NaiveDate, hour: u32, minute: u32, tz: Tz) -> Result<Instant, ScheduleError> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or(ScheduleError::InvalidWallClock { hour, minute })?;
    let local = date.and_time(time);

    if let Some(dt) = tz.from_local_datetime(&local).earliest() {
        return Ok(dt.with_timezone(&Utc));
    }

    let before_gap = tz
        .offset_from_local_datetime(&(local - Duration::days(1)))
        .earliest()
        .ok_or_else(|| ScheduleError::NonexistentLocalTime(format!("{local} in {tz}")))?;
    let offset = Duration::seconds(i64::from(before_gap.fix().local_minus_utc()));
    Ok((local - offset).and_utc())
}

/// UTC instant to wall-clock time in `tz`.
pub fn to_local(instant: Instant, tz: Tz) -> LocalWallClock {
    let local = instant.with_timezone(&tz);
    LocalWallClock {
        date: local.date_naive(),
        hour: local.hour(),
        minute: local.minute(),
    }
}

/// True when an end time-of-day not after the start means "next day".
pub fn crosses_midnight(start: HourMinute, end: HourMinute) -> bool {
    let (start_hour, start_minute) = start;
    let (end_hour, end_minute) = end;
    end_hour < start_hour || (end_hour == start_hour && end_minute <= start_minute)
}

pub fn infer_end_date(base: NaiveDate, start: HourMinute, end: HourMinute) -> Result<NaiveDate, ScheduleError> {
    if crosses_midnight(start, end) {
        base.succ_opt()
            .ok_or(ScheduleError::LimitExceeded("date out of range"))
    } else {
        Ok(base)
    }
}

/// Build the canonical interval for a form entry: one base date, a start and
/// an end time-of-day, all in `tz`.
pub fn local_interval(
    base: NaiveDate,
    start: HourMinute,
    end: HourMinute,
    tz: Tz,
) -> Result<TimeInterval, ScheduleError> {
    let start_at = to_canonical(base, start.0, start.1, tz)?;
    let end_date = infer_end_date(base, start, end)?;
    let end_at = to_canonical(end_date, end.0, end.1, tz)?;
    TimeInterval::new(start_at, end_at)
}
