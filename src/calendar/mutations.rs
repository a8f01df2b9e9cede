use tracing::{info, warn};

use crate::engine::{validate, ScheduleError};
use crate::limits::*;
use crate::model::*;
use crate::observability::COMMITS_TOTAL;

use super::{check_scope_name, Calendar, Commit};

fn check_details(details: &AppointmentDetails) -> Result<(), ScheduleError> {
    let fields = [
        &details.title,
        &details.description,
        &details.location,
        &details.kind,
    ];
    if fields.iter().any(|f| f.len() > MAX_TEXT_FIELD_LEN) {
        return Err(ScheduleError::LimitExceeded("text field too long"));
    }
    Ok(())
}

/// Store-side bounds on what may be persisted. The validator itself gives a
/// verdict for any well-formed interval.
fn check_interval_limits(interval: &TimeInterval) -> Result<(), ScheduleError> {
    if interval.start().timestamp() < MIN_VALID_TIMESTAMP_SECS
        || interval.end().timestamp() > MAX_VALID_TIMESTAMP_SECS
    {
        return Err(ScheduleError::LimitExceeded("timestamp out of range"));
    }
    if interval.duration() > max_appointment_duration() {
        return Err(ScheduleError::LimitExceeded("appointment too long"));
    }
    Ok(())
}

impl Calendar {
    /// Validate a new appointment and store it if accepted. Validation and
    /// insert happen under one write lock on the scope.
    pub async fn schedule(
        &self,
        scope: &Scope,
        details: AppointmentDetails,
        interval: TimeInterval,
    ) -> Result<Commit, ScheduleError> {
        check_details(&details)?;
        check_interval_limits(&interval)?;
        check_scope_name(scope)?;

        // An unknown scope has nothing to collide with. Only create it once
        // the booking is going to be accepted.
        if self.get_scope(scope).is_none() {
            let verdict = validate(
                &interval,
                AppointmentId::NEW,
                &self.config.policy,
                &ExistingAppointmentSet::new(),
                self.config.business_tz,
            )?;
            if !verdict.is_accepted() {
                warn!(%scope, "schedule rejected: {verdict}");
                return Ok(Commit::Rejected(verdict));
            }
        }

        let state = self.get_or_create_scope(scope)?;
        let mut guard = state.write().await;
        if guard.len() >= self.config.max_appointments_per_scope {
            return Err(ScheduleError::LimitExceeded("too many appointments in scope"));
        }

        let existing = guard.overlap_candidates(&interval);
        let verdict = validate(
            &interval,
            AppointmentId::NEW,
            &self.config.policy,
            &existing,
            self.config.business_tz,
        )?;
        if !verdict.is_accepted() {
            warn!(%scope, "schedule rejected: {verdict}");
            return Ok(Commit::Rejected(verdict));
        }

        let id = self.allocate_id();
        guard.insert(Appointment {
            id,
            details,
            interval,
        });
        metrics::counter!(COMMITS_TOTAL, "op" => "schedule").increment(1);
        info!(%scope, %id, start = %interval.start(), end = %interval.end(), "appointment scheduled");
        Ok(Commit::Saved(id))
    }

    /// Move an existing appointment, optionally replacing its details. The
    /// appointment's own current slot is excluded from the overlap check.
    pub async fn reschedule(
        &self,
        scope: &Scope,
        id: AppointmentId,
        interval: TimeInterval,
        details: Option<AppointmentDetails>,
    ) -> Result<Commit, ScheduleError> {
        if let Some(ref d) = details {
            check_details(d)?;
        }
        check_interval_limits(&interval)?;
        let state = self.get_scope(scope).ok_or(ScheduleError::NotFound(id))?;
        let mut guard = state.write().await;
        if guard.get(id).is_none() {
            return Err(ScheduleError::NotFound(id));
        }

        let existing = guard.overlap_candidates(&interval);
        let verdict = validate(
            &interval,
            id,
            &self.config.policy,
            &existing,
            self.config.business_tz,
        )?;
        if !verdict.is_accepted() {
            warn!(%scope, %id, "reschedule rejected: {verdict}");
            return Ok(Commit::Rejected(verdict));
        }

        let previous = guard.remove(id).ok_or(ScheduleError::NotFound(id))?;
        guard.insert(Appointment {
            id,
            details: details.unwrap_or(previous.details),
            interval,
        });
        metrics::counter!(COMMITS_TOTAL, "op" => "reschedule").increment(1);
        info!(%scope, %id, start = %interval.start(), end = %interval.end(), "appointment rescheduled");
        Ok(Commit::Saved(id))
    }

    pub async fn cancel(&self, scope: &Scope, id: AppointmentId) -> Result<Appointment, ScheduleError> {
        let state = self.get_scope(scope).ok_or(ScheduleError::NotFound(id))?;
        let removed = state
            .write()
            .await
            .remove(id)
            .ok_or(ScheduleError::NotFound(id))?;
        metrics::counter!(COMMITS_TOTAL, "op" => "cancel").increment(1);
        info!(%scope, %id, "appointment cancelled");
        Ok(removed)
    }
}
