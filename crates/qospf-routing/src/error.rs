use qospf_core::CoreError;

use crate::topology::VertexId;

/// Errors that abort a path computation.
///
/// A request that simply cannot be admitted is not an error; it is reported
/// as [`AdmissionOutcome::Rejected`](crate::admission::AdmissionOutcome).
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("link-state database inconsistent: {0}")]
    DatabaseConsistency(String),

    #[error("vertex {0} is not part of the topology")]
    UnknownVertex(VertexId),

    #[error("predecessor chain broken at vertex {vertex}")]
    BrokenPredecessorChain { vertex: VertexId },

    #[error(transparent)]
    Core(#[from] CoreError),
}
