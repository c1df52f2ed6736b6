//! Run session registry.
//!
//! Sessions live in a `DashMap` keyed by run id. Each slot carries its own
//! async mutex; a run holds it for its whole duration, and a second run on
//! the same id is turned away with `SessionBusy` instead of waiting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::session::RunSession;

/// One stored session plus the bookkeeping the eviction policy needs.
pub struct SessionSlot {
    run_id: String,
    entry_url: String,
    created_at: DateTime<Utc>,
    step_count: usize,
    last_access: parking_lot::Mutex<Instant>,
    session: Mutex<RunSession>,
}

impl SessionSlot {
    fn new(session: RunSession) -> Self {
        Self {
            run_id: session.run_id.clone(),
            entry_url: session.entry_url.clone(),
            created_at: session.created_at,
            step_count: session.steps.len(),
            last_access: parking_lot::Mutex::new(Instant::now()),
            session: Mutex::new(session),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn touch(&self) {
        *self.last_access.lock() = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_access.lock().elapsed()
    }

    /// Whether a run currently holds the session.
    pub fn is_busy(&self) -> bool {
        self.session.try_lock().is_err()
    }

    /// Take the session without waiting.
    pub fn try_lock(&self) -> Result<MutexGuard<'_, RunSession>, EngineError> {
        self.session
            .try_lock()
            .map_err(|_| EngineError::SessionBusy(self.run_id.clone()))
    }

    pub async fn lock(&self) -> MutexGuard<'_, RunSession> {
        self.session.lock().await
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            run_id: self.run_id.clone(),
            created_at: self.created_at,
            step_count: self.step_count,
            entry_url: self.entry_url.clone(),
            busy: self.is_busy(),
        }
    }
}

/// Listing entry for `GET /automation/sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub step_count: usize,
    pub entry_url: String,
    pub busy: bool,
}

/// Thread-safe run id → session map with TTL and capacity eviction.
///
/// A zero `max_sessions` or `ttl` disables that limit. Busy sessions are
/// never evicted.
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<SessionSlot>>,
    max_sessions: usize,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions,
            ttl,
        }
    }

    /// Store a session, evicting expired and surplus idle sessions.
    pub fn put(&self, session: RunSession) -> Arc<SessionSlot> {
        self.purge_expired();
        let slot = Arc::new(SessionSlot::new(session));
        let run_id = slot.run_id.clone();
        self.sessions.insert(run_id.clone(), slot.clone());
        self.enforce_capacity(&run_id);
        debug!("Stored session {} ({} total)", run_id, self.sessions.len());
        slot
    }

    /// Look up a session and mark it accessed.
    pub fn get(&self, run_id: &str) -> Option<Arc<SessionSlot>> {
        self.purge_expired();
        let slot = self.sessions.get(run_id).map(|entry| entry.value().clone())?;
        slot.touch();
        Some(slot)
    }

    /// Summary of a session without refreshing its idle time.
    pub fn peek(&self, run_id: &str) -> Option<SessionSummary> {
        self.purge_expired();
        self.sessions.get(run_id).map(|entry| entry.value().summary())
    }

    /// Remove a session. Returns whether it existed.
    pub fn remove(&self, run_id: &str) -> bool {
        let removed = self.sessions.remove(run_id).is_some();
        if removed {
            info!("Dropped session {}", run_id);
        }
        removed
    }

    /// Summaries ordered by creation time.
    pub fn list(&self) -> Vec<SessionSummary> {
        let mut list: Vec<SessionSummary> = self
            .sessions
            .iter()
            .map(|entry| entry.value().summary())
            .collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.run_id.cmp(&b.run_id)));
        list
    }

    pub fn contains(&self, run_id: &str) -> bool {
        self.sessions.contains_key(run_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop idle sessions past the TTL. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        if self.ttl.is_zero() {
            return 0;
        }
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().idle_for() > self.ttl && !entry.value().is_busy())
            .map(|entry| entry.key().clone())
            .collect();
        for run_id in &expired {
            self.sessions.remove(run_id);
            info!("Session {} expired", run_id);
        }
        expired.len()
    }

    fn enforce_capacity(&self, keep: &str) {
        if self.max_sessions == 0 || self.sessions.len() <= self.max_sessions {
            return;
        }
        let mut idle: Vec<(String, Duration)> = self
            .sessions
            .iter()
            .filter(|entry| entry.key() != keep && !entry.value().is_busy())
            .map(|entry| (entry.key().clone(), entry.value().idle_for()))
            .collect();
        // longest idle first
        idle.sort_by(|a, b| b.1.cmp(&a.1));

        let surplus = self.sessions.len() - self.max_sessions;
        for (run_id, _) in idle.into_iter().take(surplus) {
            self.sessions.remove(&run_id);
            info!("Evicted session {} (capacity {})", run_id, self.max_sessions);
        }
        if self.sessions.len() > self.max_sessions {
            warn!(
                "Session registry over capacity: {} > {} (remaining sessions are busy)",
                self.sessions.len(),
                self.max_sessions
            );
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
