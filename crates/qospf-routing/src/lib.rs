//! Q-OSPF Routing — QoS-constrained path computation over an area's router advertisements.
//!
//! This crate provides:
//! - [`LinkStateDatabase`] — an in-memory, DashMap-backed area database, and the [`AreaLsdb`] trait.
//! - [`TopologyBuilder`] and [`NeighborResolver`] — build and resolve the per-request graph.
//! - [`DescriptorSet`] — the per-vertex scratch arena, with parallel-link deduplication.
//! - [`ExtendedBfs`] — round-wise extended breadth-first search for one feasible path.
//! - [`PathExtractor`] — turns the predecessor chain into a [`SourceRoute`].
//! - [`SessionAdmissionController`] — admission requests end to end, with [`SessionTable`] and [`QospfStats`].
//! - [`originate_router_lsa`] — this router's advertisement from its interface queue state.

pub mod admission;
pub mod advertisement;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod lsdb;
pub mod resolver;
pub mod route;
pub mod session;
pub mod stats;
pub mod topology;

#[cfg(test)]
mod testing;

// Re-exports for convenience.
pub use admission::{
    AdmissionOutcome, AdmissionRequest, AdmissionResult, RejectReason, SessionAdmissionController,
};
pub use advertisement::{
    encode_queue_metrics, link_utilization, originate_router_lsa, LocalInterface, QueueStatus,
};
pub use descriptor::{Descriptor, DescriptorSet, LinkDescriptor, PathMetric, Predecessor};
pub use engine::{ExtendedBfs, SearchOutcome};
pub use error::RoutingError;
pub use extractor::{Extraction, PathExtractor};
pub use lsdb::{AreaLsdb, LinkStateDatabase};
pub use resolver::NeighborResolver;
pub use route::SourceRoute;
pub use session::{SessionRecord, SessionReport, SessionTable};
pub use stats::{QospfStats, StatsSnapshot};
pub use topology::{
    EdgeGroup, InterfaceRecord, Network, QueueCost, Topology, TopologyBuilder, TopologyEdge,
    Vertex, VertexId,
};
