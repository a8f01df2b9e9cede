use std::net::SocketAddr;

use crate::engine::ScheduleError;

/// Counter: validations run. Labels: verdict.
pub const VALIDATIONS_TOTAL: &str = "agenda_validations_total";

/// Histogram: size of the appointment set each validation scanned.
pub const VALIDATION_CANDIDATES: &str = "agenda_validation_candidates";

/// Counter: appointments written by the calendar store. Labels: op.
pub const COMMITS_TOTAL: &str = "agenda_commits_total";

/// Gauge: scopes held by the calendar store.
pub const SCOPES_ACTIVE: &str = "agenda_scopes_active";

/// Counter: upcoming-appointment alerts raised.
pub const UPCOMING_ALERTS_TOTAL: &str = "agenda_upcoming_alerts_total";

/// Install the fmt subscriber. Safe to call twice.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init_metrics(port: Option<u16>) -> Result<(), ScheduleError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| ScheduleError::InvalidConfig(format!("metrics exporter: {e}")))?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}
