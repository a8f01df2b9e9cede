use chrono::Duration;

/// Earliest accepted instant: 2000-01-01T00:00:00Z (seconds since epoch).
pub const MIN_VALID_TIMESTAMP_SECS: i64 = 946_684_800;
/// Latest accepted instant: 2100-01-01T00:00:00Z.
pub const MAX_VALID_TIMESTAMP_SECS: i64 = 4_102_444_800;

/// Longest single appointment.
pub fn max_appointment_duration() -> Duration {
    Duration::days(7)
}

pub const MAX_APPOINTMENTS_PER_SCOPE: usize = 100_000;
pub const MAX_SCOPES: usize = 1_000;
pub const MAX_SCOPE_NAME_LEN: usize = 256;
pub const MAX_TEXT_FIELD_LEN: usize = 4096;

/// Longest lookahead window for upcoming-appointment checks.
pub fn max_lookahead() -> Duration {
    Duration::days(366)
}
