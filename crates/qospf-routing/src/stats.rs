use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// Admission and flooding counters.
/// These are shared between the admission controller and the flooding layer.
#[derive(Debug, Default)]
pub struct QospfStats {
    /// Sessions admitted
    active_connections: AtomicUsize,
    /// Admission attempts rejected
    rejected_connections: AtomicUsize,
    /// Periodic re-advertisements
    periodic_updates: AtomicUsize,
    /// Re-advertisements triggered by a bandwidth change
    triggered_updates: AtomicUsize,
}

impl QospfStats {
    #[inline]
    pub(crate) fn increment_active(&self) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_rejected(&self) {
        self.rejected_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one re-advertisement.
    #[inline]
    pub fn record_update(&self, periodic: bool) {
        if periodic {
            self.periodic_updates.fetch_add(1, Ordering::Relaxed);
        } else {
            self.triggered_updates.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected_connections(&self) -> usize {
        self.rejected_connections.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn periodic_updates(&self) -> usize {
        self.periodic_updates.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn triggered_updates(&self) -> usize {
        self.triggered_updates.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            active_connections: self.active_connections(),
            rejected_connections: self.rejected_connections(),
            periodic_updates: self.periodic_updates(),
            triggered_updates: self.triggered_updates(),
        }
    }
}

/// Point-in-time copy of [`QospfStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub active_connections: usize,
    pub rejected_connections: usize,
    pub periodic_updates: usize,
    pub triggered_updates: usize,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "active connections:   {}", self.active_connections)?;
        writeln!(f, "rejected connections: {}", self.rejected_connections)?;
        writeln!(f, "periodic updates:     {}", self.periodic_updates)?;
        write!(f, "triggered updates:    {}", self.triggered_updates)
    }
}
