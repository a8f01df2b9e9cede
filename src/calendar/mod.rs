//! In-memory appointment store.
//!
//! The store is the persistence collaborator the validator trusts to supply
//! complete appointment sets. Its mutations hold the scope's write lock from
//! loading the candidates until the new row is in place, so validation and
//! commit are one step and concurrent writers cannot slip an overlapping
//! appointment in between.

mod mutations;
mod queries;
mod state;
#[cfg(test)]
mod tests;

pub use state::ScopeState;

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::config::SchedulerConfig;
use crate::engine::{validate, ScheduleError};
use crate::limits::*;
use crate::model::*;

pub type SharedScopeState = Arc<RwLock<ScopeState>>;

/// Supplies the appointments a candidate has to be checked against.
///
/// Implementations must return every appointment in `scope` that could
/// overlap; the validator does not second-guess completeness.
#[async_trait]
pub trait AppointmentSource: Send + Sync {
    async fn load_overlap_candidates(&self, scope: &Scope) -> Result<ExistingAppointmentSet, ScheduleError>;
}

/// Result of a validate-and-commit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Saved(AppointmentId),
    Rejected(Verdict),
}

/// Validate against whatever `source` currently holds. This is a pre-check
/// for fast feedback only: nothing stops another writer between this call and
/// a later insert.
pub async fn precheck<S: AppointmentSource + ?Sized>(
    source: &S,
    scope: &Scope,
    candidate: &TimeInterval,
    candidate_id: AppointmentId,
    config: &SchedulerConfig,
) -> Result<Verdict, ScheduleError> {
    let existing = source.load_overlap_candidates(scope).await?;
    validate(candidate, candidate_id, &config.policy, &existing, config.business_tz)
}

pub struct Calendar {
    config: SchedulerConfig,
    scopes: DashMap<Scope, SharedScopeState>,
    next_id: AtomicI64,
}

impl Calendar {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            scopes: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub(super) fn get_scope(&self, scope: &Scope) -> Option<SharedScopeState> {
        self.scopes.get(scope).map(|e| e.value().clone())
    }

    /// Get or lazily create the state for `scope`.
    pub(super) fn get_or_create_scope(&self, scope: &Scope) -> Result<SharedScopeState, ScheduleError> {
        if let Some(state) = self.get_scope(scope) {
            return Ok(state);
        }
        check_scope_name(scope)?;
        if self.scopes.len() >= MAX_SCOPES {
            return Err(ScheduleError::LimitExceeded("too many scopes"));
        }
        let state = self
            .scopes
            .entry(scope.clone())
            .or_insert_with(|| Arc::new(RwLock::new(ScopeState::new())))
            .value()
            .clone();
        metrics::gauge!(crate::observability::SCOPES_ACTIVE).set(self.scopes.len() as f64);
        Ok(state)
    }

    pub(super) fn allocate_id(&self) -> AppointmentId {
        AppointmentId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

pub(super) fn check_scope_name(scope: &Scope) -> Result<(), ScheduleError> {
    if scope.name().is_empty() {
        return Err(ScheduleError::InvalidConfig("empty scope name".into()));
    }
    if scope.name().len() > MAX_SCOPE_NAME_LEN {
        return Err(ScheduleError::LimitExceeded("scope name too long"));
    }
    Ok(())
}

#[async_trait]
impl AppointmentSource for Calendar {
    async fn load_overlap_candidates(&self, scope: &Scope) -> Result<ExistingAppointmentSet, ScheduleError> {
        match self.get_scope(scope) {
            Some(state) => Ok(state.read().await.to_set()),
            None => Ok(ExistingAppointmentSet::new()),
        }
    }
}
