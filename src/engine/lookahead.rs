use chrono::Duration;

use crate::model::*;

/// Appointment intersecting `[now, now + horizon)`, earliest start first.
/// `None` for an empty or negative horizon.
pub fn find_starting_within(
    existing: &ExistingAppointmentSet,
    now: Instant,
    horizon: Duration,
) -> Option<AppointmentId> {
    let window = TimeInterval::new(now, now.checked_add_signed(horizon)?).ok()?;
    existing
        .iter()
        .filter(|slot| slot.interval.overlaps(&window))
        .min_by_key(|slot| (slot.interval.start(), slot.id))
        .map(|slot| slot.id)
}
