mod conflict;
mod error;
mod hours;
mod lookahead;

pub use conflict::find_conflict;
pub use error::ScheduleError;
pub use hours::within_office_hours;
pub use lookahead::find_starting_within;

use conflict::validate_interval;

use chrono_tz::Tz;
use tracing::debug;

use crate::model::*;
use crate::observability::{VALIDATIONS_TOTAL, VALIDATION_CANDIDATES};

/// Decide whether `candidate` may be saved under `candidate_id`.
///
/// Checks run in order: interval sanity (an error), office hours, overlap
/// against every entry of `existing` except `candidate_id` itself. Pass
/// [`AppointmentId::NEW`] for an appointment that has not been stored yet.
///
/// `existing` must be loaded fresh for each call. The result is only a
/// pre-check unless the caller holds the store's write boundary while
/// committing (see [`crate::calendar::Calendar::schedule`]).
pub fn validate(
    candidate: &TimeInterval,
    candidate_id: AppointmentId,
    policy: &OfficeHoursPolicy,
    existing: &ExistingAppointmentSet,
    business_tz: Tz,
) -> Result<Verdict, ScheduleError> {
    validate_interval(candidate)?;

    let verdict = if !within_office_hours(candidate, policy, business_tz) {
        Verdict::RejectedOutOfHours
    } else if let Some(other) = find_conflict(candidate, candidate_id, existing) {
        Verdict::RejectedOverlap(other)
    } else {
        Verdict::Accepted
    };

    metrics::counter!(VALIDATIONS_TOTAL, "verdict" => verdict.label()).increment(1);
    metrics::histogram!(VALIDATION_CANDIDATES).record(existing.len() as f64);
    debug!(
        candidate = %candidate_id,
        start = %candidate.start(),
        end = %candidate.end(),
        verdict = verdict.label(),
        "validated interval"
    );
    Ok(verdict)
}
