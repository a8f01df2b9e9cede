use chrono::Duration;
use tracing::info;

use crate::engine::{find_starting_within, ScheduleError};
use crate::limits::*;
use crate::model::*;
use crate::observability::UPCOMING_ALERTS_TOTAL;

use super::Calendar;

impl Calendar {
    pub async fn get(&self, scope: &Scope, id: AppointmentId) -> Option<Appointment> {
        let state = self.get_scope(scope)?;
        let guard = state.read().await;
        guard.get(id).cloned()
    }

    /// Appointments intersecting `[from, from + horizon)`, in start order.
    pub async fn appointments_between(
        &self,
        scope: &Scope,
        from: Instant,
        horizon: Duration,
    ) -> Result<Vec<Appointment>, ScheduleError> {
        if horizon > max_lookahead() {
            return Err(ScheduleError::LimitExceeded("window too wide"));
        }
        let Some(state) = self.get_scope(scope) else {
            return Ok(Vec::new());
        };
        let Some(window) = from
            .checked_add_signed(horizon)
            .and_then(|end| TimeInterval::new(from, end).ok())
        else {
            return Ok(Vec::new());
        };
        let guard = state.read().await;
        Ok(guard.overlapping(&window).cloned().collect())
    }

    /// Appointment under way or starting within the configured lookahead.
    pub async fn upcoming_alert(&self, scope: &Scope, now: Instant) -> Option<AppointmentId> {
        let state = self.get_scope(scope)?;
        let window = now
            .checked_add_signed(self.config.lookahead)
            .and_then(|end| TimeInterval::new(now, end).ok())?;
        let existing = state.read().await.overlap_candidates(&window);
        let found = find_starting_within(&existing, now, self.config.lookahead);
        if let Some(id) = found {
            metrics::counter!(UPCOMING_ALERTS_TOTAL).increment(1);
            info!(%scope, %id, "appointment within {} minutes", self.config.lookahead.num_minutes());
        }
        found
    }

    /// Whether the customer has an appointment that has not yet ended.
    pub async fn customer_has_upcoming(&self, scope: &Scope, customer_id: i64, now: Instant) -> bool {
        let Some(state) = self.get_scope(scope) else {
            return false;
        };
        let guard = state.read().await;
        guard
            .iter()
            .any(|a| a.details.customer_id == customer_id && a.interval.end() > now)
    }

    /// All appointments for a contact, in start order.
    pub async fn contact_schedule(&self, scope: &Scope, contact_id: i64) -> Vec<Appointment> {
        let Some(state) = self.get_scope(scope) else {
            return Vec::new();
        };
        let guard = state.read().await;
        guard
            .iter()
            .filter(|a| a.details.contact_id == contact_id)
            .cloned()
            .collect()
    }
}
