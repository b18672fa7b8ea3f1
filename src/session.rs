//! Per-visitor session state.
//!
//! One [`Session`] per visitor, held in a process-wide [`SessionStore`]
//! keyed by the opaque id carried in the session cookie. Chat history,
//! appointments and health readings are append-only; nothing is ever
//! reordered or deduplicated. Sessions idle past [`SESSION_TTL_HOURS`] are
//! replaced lazily on next access — there is no background sweeper.
//!
//! The store lock protects memory, not request ordering: two concurrent
//! requests for the same session interleave between lock scopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::assistant::Mode;
use crate::metrics::HealthReading;

/// Hours of inactivity after which a session is discarded.
pub const SESSION_TTL_HOURS: i64 = 24;

/// One user input paired with the generated reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user_text: String,
    pub assistant_text: String,
    pub timestamp: DateTime<Utc>,
    pub mode: Mode,
}

/// A booked appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    /// Caller-supplied date string, stored verbatim.
    pub date: String,
    pub specialty: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn new(date: String, specialty: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            specialty,
            status: "scheduled".to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Everything the service remembers about one visitor.
#[derive(Debug, Clone)]
pub struct Session {
    pub chat_history: Vec<ChatTurn>,
    pub appointments: Vec<Appointment>,
    pub health_metrics: BTreeMap<String, Vec<HealthReading>>,
    created_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            chat_history: Vec::new(),
            appointments: Vec::new(),
            health_metrics: BTreeMap::new(),
            created_at: now,
            last_seen: now,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Borrowed handle a request passes into the orchestrator so it can record
/// the turn without owning the store.
pub struct SessionContext<'a> {
    pub store: &'a SessionStore,
    pub session_id: &'a str,
}

/// Process-wide session storage.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the visitor's session, creating or refreshing it
    /// first. Expired sessions are replaced here, on access.
    fn with_session<R>(&self, session_id: &str, f: impl FnOnce(&mut Session) -> R) -> R {
        // A poisoned lock only means a handler panicked mid-write; the map
        // itself is still usable.
        let mut sessions = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now();

        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(now));

        if (now - session.last_seen).num_hours() >= SESSION_TTL_HOURS {
            debug!("session {session_id} expired, starting fresh");
            *session = Session::new(now);
        }
        session.last_seen = now;

        f(session)
    }

    pub fn append_turn(&self, session_id: &str, turn: ChatTurn) {
        self.with_session(session_id, |s| s.chat_history.push(turn));
    }

    pub fn history(&self, session_id: &str) -> Vec<ChatTurn> {
        self.with_session(session_id, |s| s.chat_history.clone())
    }

    /// The most recent `n` turns, oldest first.
    pub fn recent_history(&self, session_id: &str, n: usize) -> Vec<ChatTurn> {
        self.with_session(session_id, |s| {
            let skip = s.chat_history.len().saturating_sub(n);
            s.chat_history[skip..].to_vec()
        })
    }

    pub fn add_appointment(&self, session_id: &str, appointment: Appointment) {
        self.with_session(session_id, |s| s.appointments.push(appointment));
    }

    pub fn appointments(&self, session_id: &str) -> Vec<Appointment> {
        self.with_session(session_id, |s| s.appointments.clone())
    }

    pub fn add_reading(&self, session_id: &str, metric: &str, value: Value) {
        self.with_session(session_id, |s| {
            s.health_metrics
                .entry(metric.to_string())
                .or_default()
                .push(HealthReading::now(value));
        });
    }

    /// Snapshot of everything the visitor has recorded; empty map if nothing.
    pub fn recorded_metrics(&self, session_id: &str) -> BTreeMap<String, Vec<HealthReading>> {
        self.with_session(session_id, |s| s.health_metrics.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appointment_defaults() {
        let appointment = Appointment::new("2025-05-01T10:00:00".into(), "Internal Medicine".into());
        assert_eq!(appointment.status, "scheduled");
        assert_eq!(appointment.specialty, "Internal Medicine");
        assert!(Uuid::parse_str(&appointment.id).is_ok());
    }

    #[test]
    fn test_turns_append_in_order() {
        let store = SessionStore::new();
        for i in 0..3 {
            store.append_turn(
                "visitor",
                ChatTurn {
                    user_text: format!("question {i}"),
                    assistant_text: format!("answer {i}"),
                    timestamp: Utc::now(),
                    mode: Mode::Health,
                },
            );
        }
        let history = store.history("visitor");
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].user_text, "question 0");
        assert_eq!(history[2].user_text, "question 2");
    }

    #[test]
    fn test_recent_history_takes_tail() {
        let store = SessionStore::new();
        for i in 0..8 {
            store.append_turn(
                "visitor",
                ChatTurn {
                    user_text: format!("q{i}"),
                    assistant_text: format!("a{i}"),
                    timestamp: Utc::now(),
                    mode: Mode::Health,
                },
            );
        }
        let recent = store.recent_history("visitor", 5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].user_text, "q3");
        assert_eq!(recent[4].user_text, "q7");

        // Fewer turns than requested returns them all
        assert_eq!(store.recent_history("visitor", 100).len(), 8);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        store.add_appointment("a", Appointment::new("d".into(), "Surgery".into()));
        assert_eq!(store.appointments("a").len(), 1);
        assert!(store.appointments("b").is_empty());
    }

    #[test]
    fn test_readings_grouped_by_metric() {
        let store = SessionStore::new();
        store.add_reading("v", "temperature", Value::from(36.8));
        store.add_reading("v", "temperature", Value::from(37.0));
        store.add_reading("v", "pulse", Value::from(72));

        let metrics = store.recorded_metrics("v");
        assert_eq!(metrics["temperature"].len(), 2);
        assert_eq!(metrics["pulse"].len(), 1);
        assert_eq!(metrics["temperature"][0].value.as_f64(), Some(36.8));
    }

    #[test]
    fn test_fresh_session_is_empty() {
        let store = SessionStore::new();
        assert!(store.history("nobody").is_empty());
        assert!(store.recorded_metrics("nobody").is_empty());
    }
}
