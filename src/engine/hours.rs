use chrono_tz::Tz;

use crate::model::{OfficeHoursPolicy, TimeInterval};
use crate::time::to_local;

/// Whether `candidate` sits inside opening hours, judged on the wall clock of
/// the business timezone rather than the caller's.
///
/// Minute-aware: the start must be at or after `open:00` and the end strictly
/// before `close:00`. Both ends must fall on the same business-local date.
pub fn within_office_hours(candidate: &TimeInterval, policy: &OfficeHoursPolicy, business_tz: Tz) -> bool {
    let start = to_local(candidate.start(), business_tz);
    let end = to_local(candidate.end(), business_tz);

    if start.date != end.date {
        return false;
    }
    let (start_min, end_min) = (start.minute_of_day(), end.minute_of_day());
    start_min >= policy.open_minute_of_day()
        && end_min < policy.close_minute_of_day()
        && start_min < end_min
}
