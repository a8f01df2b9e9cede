use std::str::FromStr;

use chrono::Duration;
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::engine::ScheduleError;
use crate::limits::*;
use crate::model::OfficeHoursPolicy;
use crate::time::resolve_timezone;

pub const ENV_BUSINESS_TZ: &str = "AGENDA_BUSINESS_TZ";
pub const ENV_OPEN_HOUR: &str = "AGENDA_OPEN_HOUR";
pub const ENV_CLOSE_HOUR: &str = "AGENDA_CLOSE_HOUR";
pub const ENV_LOOKAHEAD_MINUTES: &str = "AGENDA_LOOKAHEAD_MINUTES";
pub const ENV_MAX_APPOINTMENTS: &str = "AGENDA_MAX_APPOINTMENTS_PER_SCOPE";

const DEFAULT_BUSINESS_TZ: Tz = chrono_tz::America::New_York;
const DEFAULT_LOOKAHEAD_MINUTES: i64 = 15;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Timezone office hours are judged in.
    pub business_tz: Tz,
    pub policy: OfficeHoursPolicy,
    /// Window for the upcoming-appointment alert.
    pub lookahead: Duration,
    pub max_appointments_per_scope: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            business_tz: DEFAULT_BUSINESS_TZ,
            policy: OfficeHoursPolicy::default(),
            lookahead: Duration::minutes(DEFAULT_LOOKAHEAD_MINUTES),
            max_appointments_per_scope: MAX_APPOINTMENTS_PER_SCOPE,
        }
    }
}

impl SchedulerConfig {
    /// Read `AGENDA_*` variables, falling back to defaults for unset ones.
    /// Set-but-invalid values are an error.
    pub fn from_env() -> Result<Self, ScheduleError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ScheduleError> {
        let defaults = Self::default();

        let business_tz = match get(ENV_BUSINESS_TZ) {
            Some(id) => resolve_timezone(id.trim())?,
            None => defaults.business_tz,
        };
        let open = parse_var::<u32>(&get, ENV_OPEN_HOUR)?.unwrap_or(defaults.policy.open_hour());
        let close = parse_var::<u32>(&get, ENV_CLOSE_HOUR)?.unwrap_or(defaults.policy.close_hour());
        let policy = OfficeHoursPolicy::new(open, close)?;

        let lookahead = match parse_var::<i64>(&get, ENV_LOOKAHEAD_MINUTES)? {
            Some(minutes) => Duration::try_minutes(minutes).ok_or_else(|| {
                ScheduleError::InvalidConfig(format!("{ENV_LOOKAHEAD_MINUTES}={minutes}"))
            })?,
            None => defaults.lookahead,
        };
        if lookahead <= Duration::zero() || lookahead > max_lookahead() {
            return Err(ScheduleError::InvalidConfig(format!(
                "{ENV_LOOKAHEAD_MINUTES} out of range: {} minutes",
                lookahead.num_minutes()
            )));
        }

        let requested = parse_var::<usize>(&get, ENV_MAX_APPOINTMENTS)?
            .unwrap_or(defaults.max_appointments_per_scope);
        if requested == 0 {
            return Err(ScheduleError::InvalidConfig(format!(
                "{ENV_MAX_APPOINTMENTS} must be at least 1"
            )));
        }
        if requested > MAX_APPOINTMENTS_PER_SCOPE {
            warn!("{ENV_MAX_APPOINTMENTS}={requested} exceeds hard limit, using {MAX_APPOINTMENTS_PER_SCOPE}");
        }
        let max_appointments_per_scope = requested.min(MAX_APPOINTMENTS_PER_SCOPE);

        info!("scheduler config");
        info!("  business_tz: {business_tz}");
        info!("  office hours: {open:02}:00-{close:02}:00");
        info!("  lookahead: {} min", lookahead.num_minutes());

        Ok(Self {
            business_tz,
            policy,
            lookahead,
            max_appointments_per_scope,
        })
    }
}

fn parse_var<T: FromStr>(get: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ScheduleError> {
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ScheduleError::InvalidConfig(format!("{key}={raw}"))),
    }
}
