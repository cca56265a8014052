use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;

use chrono::Utc;
use qospf_core::{
    FlowKey, PrecedenceQueueSelector, QosConstraint, QospfConfig, QueueSelector, SessionKey,
};
use serde::{Deserialize, Serialize};

use crate::descriptor::DescriptorSet;
use crate::engine::ExtendedBfs;
use crate::error::RoutingError;
use crate::extractor::{Extraction, PathExtractor};
use crate::lsdb::AreaLsdb;
use crate::resolver::NeighborResolver;
use crate::route::SourceRoute;
use crate::session::SessionTable;
use crate::stats::QospfStats;
use crate::topology::TopologyBuilder;

/// One request to admit a flow with a QoS constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionRequest {
    pub flow: FlowKey,
    pub constraint: QosConstraint,
    /// Whether this router originates the flow.
    pub is_originator: bool,
}

impl AdmissionRequest {
    pub fn new(flow: FlowKey, constraint: QosConstraint) -> Self {
        Self {
            flow,
            constraint,
            is_originator: true,
        }
    }

    pub fn key(&self) -> SessionKey {
        SessionKey {
            flow: self.flow,
            priority: self.constraint.priority,
        }
    }
}

/// Why a request was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    NoFeasiblePath,
    UnknownSource,
    UnknownDestination,
    /// The chosen path crosses a link whose far end never resolved.
    UnresolvedNeighbor,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RejectReason::NoFeasiblePath => "no feasible path",
            RejectReason::UnknownSource => "source address unknown",
            RejectReason::UnknownDestination => "destination address unknown",
            RejectReason::UnresolvedNeighbor => "path crosses an unresolved neighbor",
        };
        write!(f, "{}", reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmissionOutcome {
    Admitted(SourceRoute),
    Rejected(RejectReason),
}

/// What the caller gets back for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionResult {
    pub session_id: u32,
    pub outcome: AdmissionOutcome,
}

impl AdmissionResult {
    pub fn is_admitted(&self) -> bool {
        matches!(self.outcome, AdmissionOutcome::Admitted(_))
    }

    /// Hop list, first hop first; empty when not admitted.
    pub fn hops(&self) -> &[Ipv4Addr] {
        match &self.outcome {
            AdmissionOutcome::Admitted(route) => route.hops(),
            AdmissionOutcome::Rejected(_) => &[],
        }
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self.outcome {
            AdmissionOutcome::Rejected(reason) => Some(reason),
            AdmissionOutcome::Admitted(_) => None,
        }
    }
}

/// Runs admission requests end to end against an area's advertisements.
///
/// Every request rebuilds the graph from the current database; nothing is
/// cached between requests and the graph is dropped before `admit` returns.
pub struct SessionAdmissionController<S = PrecedenceQueueSelector> {
    config: QospfConfig,
    selector: S,
    sessions: Arc<SessionTable>,
    stats: Arc<QospfStats>,
}

impl SessionAdmissionController<PrecedenceQueueSelector> {
    /// Create a controller with precedence-based queue selection.
    pub fn new(config: QospfConfig) -> Self {
        Self::with_selector(config, PrecedenceQueueSelector)
    }
}

impl<S: QueueSelector> SessionAdmissionController<S> {
    pub fn with_selector(config: QospfConfig, selector: S) -> Self {
        Self {
            config,
            selector,
            sessions: Arc::new(SessionTable::new()),
            stats: Arc::new(QospfStats::default()),
        }
    }

    pub fn config(&self) -> &QospfConfig {
        &self.config
    }

    pub fn sessions(&self) -> Arc<SessionTable> {
        Arc::clone(&self.sessions)
    }

    pub fn stats(&self) -> Arc<QospfStats> {
        Arc::clone(&self.stats)
    }

    /// Decide one admission request.
    ///
    /// Rejections are returned as `Ok`; an `Err` means the database is
    /// inconsistent and no decision could be made.
    pub fn admit(
        &self,
        lsdb: &dyn AreaLsdb,
        request: &AdmissionRequest,
    ) -> Result<AdmissionResult, RoutingError> {
        let now = Utc::now();
        let key = request.key();
        let session =
            self.sessions
                .begin_attempt(key, request.constraint, request.is_originator, now);

        let outcome = match self.compute(lsdb, request) {
            Ok(outcome) => outcome,
            Err(e) => {
                // no route from an inconsistent database stays on the session
                self.sessions.record_rejected(&key);
                return Err(e);
            }
        };

        match &outcome {
            AdmissionOutcome::Admitted(route) => {
                self.sessions.record_admitted(&key, route.hops().to_vec(), now);
                if self.config.collect_statistics {
                    self.stats.increment_active();
                }
                tracing::info!(
                    session = session.id,
                    flow = %request.flow,
                    hops = route.hop_count(),
                    route = %route,
                    "session admitted"
                );
            }
            AdmissionOutcome::Rejected(reason) => {
                self.sessions.record_rejected(&key);
                if self.config.collect_statistics {
                    self.stats.increment_rejected();
                }
                tracing::info!(
                    session = session.id,
                    flow = %request.flow,
                    attempt = session.retries,
                    %reason,
                    "session rejected"
                );
            }
        }

        Ok(AdmissionResult {
            session_id: session.id,
            outcome,
        })
    }

    fn compute(
        &self,
        lsdb: &dyn AreaLsdb,
        request: &AdmissionRequest,
    ) -> Result<AdmissionOutcome, RoutingError> {
        let mut topology = TopologyBuilder::from_lsdb(lsdb);
        NeighborResolver::resolve(&mut topology)?;

        let Some(source) = topology.vertex_for_address(request.flow.source_address) else {
            return Ok(AdmissionOutcome::Rejected(RejectReason::UnknownSource));
        };
        let Some(destination) = topology.vertex_for_address(request.flow.destination_address)
        else {
            return Ok(AdmissionOutcome::Rejected(RejectReason::UnknownDestination));
        };

        if source == destination {
            return Ok(AdmissionOutcome::Admitted(SourceRoute::empty(source)));
        }

        let constraint = request.constraint;
        let mut descriptors = DescriptorSet::build(&topology, &constraint, &self.selector);
        let search = ExtendedBfs::new(&self.selector).run(
            &mut descriptors,
            source,
            destination,
            &constraint,
        )?;
        if !search.is_reached() {
            return Ok(AdmissionOutcome::Rejected(RejectReason::NoFeasiblePath));
        }

        match PathExtractor::extract(&descriptors, source, destination)? {
            Extraction::Complete(route) => Ok(AdmissionOutcome::Admitted(route)),
            Extraction::Unresolved { .. } => {
                Ok(AdmissionOutcome::Rejected(RejectReason::UnresolvedNeighbor))
            }
        }
    }
}
