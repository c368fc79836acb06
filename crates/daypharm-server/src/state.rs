//! Shared state for the dashboard API: the session registry and the
//! assistant.
//!
//! Lock guards are scoped to synchronous blocks; handlers copy what an AI
//! call needs out of the session, release the lock, await the call, then
//! lock again to store the result.
//!
//! Sessions end on `DELETE` or after sitting idle longer than the TTL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use daypharm_core::session::Session;
use daypharm_llm::PharmacyAssistant;
use tokio::time::Instant;

use crate::config::DEFAULT_SESSION_TTL_SECS;
use crate::error::ApiError;

pub type SessionRef = Arc<Mutex<Session>>;

struct SessionEntry {
    session: SessionRef,
    /// Last request that touched the session.
    last_activity: Mutex<Instant>,
}

impl SessionEntry {
    fn touch(&self) {
        if let Ok(mut last) = self.last_activity.lock() {
            *last = Instant::now();
        }
    }

    fn idle_for(&self, now: Instant) -> Duration {
        self.last_activity
            .lock()
            .map(|last| now.saturating_duration_since(*last))
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct AppState {
    sessions: Arc<RwLock<HashMap<String, Arc<SessionEntry>>>>,
    session_ttl: Duration,
    pub assistant: Arc<PharmacyAssistant>,
}

impl AppState {
    pub fn new(assistant: PharmacyAssistant) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            assistant: Arc::new(assistant),
        }
    }

    /// Override the idle time after which sessions are evicted.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Register a fresh session and return its id.
    pub fn create_session(&self) -> Result<String, ApiError> {
        let session = Session::new();
        let id = session.id().to_string();
        let entry = SessionEntry {
            session: Arc::new(Mutex::new(session)),
            last_activity: Mutex::new(Instant::now()),
        };
        self.sessions.write()?.insert(id.clone(), Arc::new(entry));
        tracing::info!(session = %id, "Session created");
        Ok(id)
    }

    /// Look up a session and mark it active.
    pub fn session(&self, id: &str) -> Result<SessionRef, ApiError> {
        let entry = self
            .sessions
            .read()?
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::SessionNotFound(id.to_string()))?;
        entry.touch();
        Ok(entry.session.clone())
    }

    /// Run `f` with the session locked.
    pub fn with_session<T, F>(&self, id: &str, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Session) -> Result<T, ApiError>,
    {
        let session = self.session(id)?;
        let mut guard = session.lock()?;
        f(&mut guard)
    }

    /// End a session and drop everything it holds.
    pub fn remove_session(&self, id: &str) -> Result<(), ApiError> {
        self.sessions
            .write()?
            .remove(id)
            .ok_or_else(|| ApiError::SessionNotFound(id.to_string()))?;
        tracing::info!(session = %id, "Session ended");
        Ok(())
    }

    /// Drop sessions idle longer than the TTL. Returns how many were removed.
    pub fn evict_idle(&self) -> Result<usize, ApiError> {
        self.evict_idle_at(Instant::now())
    }

    fn evict_idle_at(&self, now: Instant) -> Result<usize, ApiError> {
        let mut sessions = self.sessions.write()?;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = entry.idle_for(now) <= self.session_ttl;
            if !keep {
                tracing::info!(session = %id, "Session expired");
            }
            keep
        });
        Ok(before - sessions.len())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}

/// Periodically evict idle sessions until the runtime shuts down.
pub fn spawn_session_sweeper(state: AppState, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match state.evict_idle() {
                Ok(0) => {}
                Ok(evicted) => tracing::debug!(evicted, "Idle sessions swept"),
                Err(e) => tracing::error!(error = %e, "Session sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use daypharm_core::models::PatientRecord;

    fn test_state() -> AppState {
        AppState::new(PharmacyAssistant::unconfigured())
    }

    #[test]
    fn sessions_are_created_and_isolated() {
        let state = test_state();
        let a = state.create_session().unwrap();
        let b = state.create_session().unwrap();
        assert_ne!(a, b);
        assert_eq!(state.session_count(), 2);

        state
            .with_session(&a, |s| {
                s.store_mut().append(PatientRecord::new());
                Ok(())
            })
            .unwrap();

        let len_b = state.with_session(&b, |s| Ok(s.store().len())).unwrap();
        assert_eq!(len_b, 0);
    }

    #[test]
    fn unknown_session_is_an_error() {
        let state = test_state();
        assert!(matches!(
            state.session("missing"),
            Err(ApiError::SessionNotFound(_))
        ));
    }

    #[test]
    fn removed_session_is_gone() {
        let state = test_state();
        let id = state.create_session().unwrap();

        state.remove_session(&id).unwrap();
        assert_eq!(state.session_count(), 0);
        assert!(state.session(&id).is_err());
        assert!(matches!(
            state.remove_session(&id),
            Err(ApiError::SessionNotFound(_))
        ));
    }

    #[test]
    fn idle_sessions_are_evicted_after_ttl() {
        let state = test_state().with_session_ttl(Duration::from_secs(60));
        let idle = state.create_session().unwrap();
        let active = state.create_session().unwrap();

        let later = Instant::now() + Duration::from_secs(120);
        // Only `active` is touched close to the sweep time
        state
            .sessions
            .read()
            .unwrap()
            .get(&active)
            .unwrap()
            .last_activity
            .lock()
            .map(|mut last| *last = later)
            .unwrap();

        assert_eq!(state.evict_idle_at(later).unwrap(), 1);
        assert!(state.session(&idle).is_err());
        assert!(state.session(&active).is_ok());
    }

    #[test]
    fn recent_sessions_survive_a_sweep() {
        let state = test_state();
        state.create_session().unwrap();
        assert_eq!(state.evict_idle().unwrap(), 0);
        assert_eq!(state.session_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_evicts_in_the_background() {
        let state = test_state().with_session_ttl(Duration::ZERO);
        let id = state.create_session().unwrap();

        let handle = spawn_session_sweeper(state.clone(), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(state.session(&id).is_err());
        handle.abort();
    }
}
