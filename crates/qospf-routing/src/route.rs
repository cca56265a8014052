use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::descriptor::PathMetric;
use crate::topology::VertexId;

/// An admitted path: the next-hop addresses from the source toward the
/// destination, first hop first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRoute {
    hops: Vec<Ipv4Addr>,
    /// Vertices traversed, source first and destination last.
    vertices: Vec<VertexId>,
    /// Bottleneck bandwidth and total delay along the path.
    pub metric: PathMetric,
}

impl SourceRoute {
    pub fn new(hops: Vec<Ipv4Addr>, vertices: Vec<VertexId>, metric: PathMetric) -> Self {
        Self {
            hops,
            vertices,
            metric,
        }
    }

    /// The route of a session whose source is its destination.
    pub fn empty(vertex: VertexId) -> Self {
        Self::new(Vec::new(), vec![vertex], PathMetric::SOURCE)
    }

    pub fn hops(&self) -> &[Ipv4Addr] {
        &self.hops
    }

    pub fn into_hops(self) -> Vec<Ipv4Addr> {
        self.hops
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }

    pub fn first_hop(&self) -> Option<Ipv4Addr> {
        self.hops.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }
}

impl fmt::Display for SourceRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hops.is_empty() {
            return write!(f, "(local)");
        }
        let hops: Vec<String> = self.hops.iter().map(|h| h.to_string()).collect();
        write!(f, "{}", hops.join(" -> "))
    }
}
