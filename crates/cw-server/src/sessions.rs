//! Per-client session registry.
//!
//! Ids are sequential decimal strings (`"1"`, `"2"`, ...). Id assignment
//! and insertion happen under one lock, so concurrent first requests get
//! distinct ids. Sessions live for the process lifetime.

use std::sync::Mutex;

use cw_core::FlatParameters;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Opaque per-session state container.
pub type SessionState = Map<String, Value>;

/// Id reported when the registry itself fails.
const FALLBACK_SESSION_ID: &str = "1";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session registry lock poisoned: {0}")]
    Poisoned(String),
}

/// Response body of `get_sessions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionsResponse {
    pub session_id: String,
    pub session_list: Vec<String>,
    pub err: String,
}

/// Thread-safe, insertion-ordered session table.
#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<IndexMap<String, SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `session_id`, or register a new session when it is absent.
    ///
    /// Never fails: registry errors degrade to the fallback session and are
    /// reported in `err`.
    pub fn get_sessions(&self, session_id: Option<&str>) -> SessionsResponse {
        match self.try_get_sessions(session_id) {
            Ok(resp) => resp,
            Err(e) => {
                let err = format!("Session retrieval failed! ({e})");
                tracing::warn!("{err}");
                SessionsResponse {
                    session_id: FALLBACK_SESSION_ID.to_string(),
                    session_list: vec![FALLBACK_SESSION_ID.to_string()],
                    err,
                }
            }
        }
    }

    fn try_get_sessions(&self, session_id: Option<&str>) -> Result<SessionsResponse, SessionError> {
        let mut sessions = self.inner.lock().map_err(|e| SessionError::Poisoned(e.to_string()))?;

        let session_id = match session_id.filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let id = (sessions.len() + 1).to_string();
                sessions.insert(id.clone(), SessionState::new());
                tracing::info!(session_id = %id, "created session");
                id
            }
        };

        Ok(SessionsResponse { session_id, session_list: sessions.keys().cloned().collect(), err: String::new() })
    }

    /// Store the parameters of a finished run in a known session.
    ///
    /// Returns `false` if the session does not exist or the registry is unusable.
    pub fn record_run(&self, session_id: &str, pars: &FlatParameters) -> bool {
        let Ok(mut sessions) = self.inner.lock() else {
            return false;
        };
        let Some(state) = sessions.get_mut(session_id) else {
            return false;
        };
        let n_runs = state.get("n_runs").and_then(Value::as_u64).unwrap_or(0) + 1;
        state.insert("n_runs".into(), Value::from(n_runs));
        state.insert("last_pars".into(), serde_json::to_value(pars).unwrap_or(Value::Null));
        true
    }

    #[cfg(test)]
    pub(crate) fn state(&self, session_id: &str) -> Option<SessionState> {
        self.inner.lock().ok()?.get(session_id).cloned()
    }

    /// Number of registered sessions (0 if the registry is unusable).
    pub fn len(&self) -> usize {
        self.inner.lock().map(|s| s.len()).unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.inner.lock();
            panic!("poisoning session registry");
        }));
    }
}
