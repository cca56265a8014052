use std::fmt;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use qospf_core::{QosConstraint, SessionKey};
use serde::{Deserialize, Serialize};

/// Admission state of one flow at one priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Sequential, starting at 1.
    pub id: u32,
    pub key: SessionKey,
    /// Constraint of the latest attempt.
    pub constraint: QosConstraint,
    /// Whether this router originates the flow.
    pub is_originator: bool,
    pub requested_at: DateTime<Utc>,
    pub last_attempt: Option<DateTime<Utc>>,
    /// Time of the latest successful admission.
    pub admitted_at: Option<DateTime<Utc>>,
    /// Admission attempts so far.
    pub retries: u32,
    /// Whether the latest attempt was admitted.
    pub admitted: bool,
    /// Hop list of the latest attempt; empty when not admitted.
    pub hops: Vec<Ipv4Addr>,
}

impl SessionRecord {
    fn new(
        id: u32,
        key: SessionKey,
        constraint: QosConstraint,
        is_originator: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            key,
            constraint,
            is_originator,
            requested_at: now,
            last_attempt: None,
            admitted_at: None,
            retries: 0,
            admitted: false,
            hops: Vec::new(),
        }
    }

    /// Human-readable summary of this session.
    pub fn report(&self) -> SessionReport<'_> {
        SessionReport(self)
    }
}

/// Display adapter summarizing a session.
pub struct SessionReport<'a>(&'a SessionRecord);

impl fmt::Display for SessionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        write!(
            f,
            "session {} [{} priority {}] requested {} (floor {} bps, ceiling {} us): ",
            s.id,
            s.key.flow,
            s.key.priority,
            s.requested_at.format("%Y-%m-%d %H:%M:%S%.3f"),
            s.constraint.bandwidth_floor,
            s.constraint.delay_ceiling,
        )?;
        if s.admitted {
            let hops: Vec<String> = s.hops.iter().map(|h| h.to_string()).collect();
            write!(
                f,
                "admitted after {} attempt(s), route [{}]",
                s.retries,
                hops.join(", ")
            )
        } else {
            write!(f, "retried {} times but not admitted", s.retries)
        }
    }
}

/// Sessions keyed by (5-tuple, priority), backed by DashMap.
pub struct SessionTable {
    sessions: DashMap<SessionKey, SessionRecord>,
    next_id: AtomicU32,
}

impl SessionTable {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// Find or create the session for `key` and count a new attempt.
    /// Returns the updated record.
    pub fn begin_attempt(
        &self,
        key: SessionKey,
        constraint: QosConstraint,
        is_originator: bool,
        now: DateTime<Utc>,
    ) -> SessionRecord {
        let mut entry = self.sessions.entry(key).or_insert_with(|| {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(session = id, flow = %key.flow, "new session");
            SessionRecord::new(id, key, constraint, is_originator, now)
        });
        let record = entry.value_mut();
        record.constraint = constraint;
        record.retries += 1;
        record.last_attempt = Some(now);
        record.clone()
    }

    /// Store an admitted route on the session.
    pub fn record_admitted(&self, key: &SessionKey, hops: Vec<Ipv4Addr>, now: DateTime<Utc>) {
        if let Some(mut record) = self.sessions.get_mut(key) {
            record.admitted = true;
            record.admitted_at = Some(now);
            record.hops = hops;
        }
    }

    /// Mark the session's latest attempt as rejected.
    pub fn record_rejected(&self, key: &SessionKey) {
        if let Some(mut record) = self.sessions.get_mut(key) {
            record.admitted = false;
            record.hops.clear();
        }
    }

    pub fn get(&self, key: &SessionKey) -> Option<SessionRecord> {
        self.sessions.get(key).map(|r| r.value().clone())
    }

    /// Remove a session. Ids of remaining sessions are unchanged.
    pub fn remove(&self, key: &SessionKey) -> Option<SessionRecord> {
        self.sessions.remove(key).map(|(_k, v)| v)
    }

    /// All sessions ordered by id.
    pub fn sessions(&self) -> Vec<SessionRecord> {
        let mut all: Vec<SessionRecord> = self.sessions.iter().map(|r| r.value().clone()).collect();
        all.sort_by_key(|s| s.id);
        all
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new()
    }
}
