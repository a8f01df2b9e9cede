use crate::model::*;

/// Appointments of one scope, sorted by start.
#[derive(Debug, Clone, Default)]
pub struct ScopeState {
    appointments: Vec<Appointment>,
}

impl ScopeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    /// Insert maintaining sort order by start.
    pub fn insert(&mut self, appointment: Appointment) {
        let pos = self
            .appointments
            .partition_point(|a| a.interval.start() <= appointment.interval.start());
        self.appointments.insert(pos, appointment);
    }

    pub fn remove(&mut self, id: AppointmentId) -> Option<Appointment> {
        let pos = self.appointments.iter().position(|a| a.id == id)?;
        Some(self.appointments.remove(pos))
    }

    pub fn get(&self, id: AppointmentId) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Appointment> {
        self.appointments.iter()
    }

    /// Appointments sharing any time with `query`, in start order.
    pub fn overlapping(&self, query: &TimeInterval) -> impl Iterator<Item = &Appointment> {
        // Everything at index >= right_bound starts at or after query.end, so can't overlap.
        let right_bound = self
            .appointments
            .partition_point(|a| a.interval.start() < query.end());
        self.appointments[..right_bound]
            .iter()
            .filter(move |a| a.interval.end() > query.start())
    }

    /// Every appointment that could collide with `candidate`.
    pub fn overlap_candidates(&self, candidate: &TimeInterval) -> ExistingAppointmentSet {
        self.overlapping(candidate)
            .map(|a| (a.id, a.interval))
            .collect()
    }

    pub fn to_set(&self) -> ExistingAppointmentSet {
        self.appointments.iter().map(|a| (a.id, a.interval)).collect()
    }
}
