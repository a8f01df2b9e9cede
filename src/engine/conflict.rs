use crate::model::*;

use super::ScheduleError;

/// Fail fast on intervals no caller should be able to produce.
pub(crate) fn validate_interval(interval: &TimeInterval) -> Result<(), ScheduleError> {
    if interval.start() >= interval.end() {
        return Err(ScheduleError::InvariantViolation {
            start: interval.start(),
            end: interval.end(),
        });
    }
    Ok(())
}

/// First appointment, other than `candidate_id` itself, sharing any time with
/// `candidate`. Containment and exact duplicates count; touching endpoints do
/// not. Among several conflicts the earliest start wins (then the lowest id),
/// so the answer does not depend on the order of `existing`.
pub fn find_conflict(
    candidate: &TimeInterval,
    candidate_id: AppointmentId,
    existing: &ExistingAppointmentSet,
) -> Option<AppointmentId> {
    existing
        .iter()
        .filter(|slot| slot.id != candidate_id)
        .filter(|slot| slot.interval.overlaps(candidate))
        .min_by_key(|slot| (slot.interval.start(), slot.id))
        .map(|slot| slot.id)
}
