use std::net::Ipv4Addr;

use qospf_core::{QosConstraint, QueueSelector};
use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::topology::{QueueCost, Topology, VertexId};

/// Accumulated (bottleneck bandwidth, total delay) from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMetric {
    /// Bits per second.
    pub bandwidth: u64,
    /// Microseconds.
    pub delay: u64,
}

impl PathMetric {
    /// Metric of the empty path at the source.
    pub const SOURCE: PathMetric = PathMetric {
        bandwidth: u64::MAX,
        delay: 0,
    };

    /// Extend by one link: bandwidth is the bottleneck, delay adds up.
    pub fn concatenate(self, link: &QueueCost) -> PathMetric {
        PathMetric {
            bandwidth: self.bandwidth.min(link.available_bandwidth),
            delay: self.delay.saturating_add(link.average_delay),
        }
    }

    pub fn satisfies(&self, constraint: &QosConstraint) -> bool {
        self.bandwidth >= constraint.bandwidth_floor && self.delay <= constraint.delay_ceiling
    }
}

/// An outgoing link as seen by the path engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDescriptor {
    pub to_vertex: VertexId,
    pub interface_index: u8,
    /// Address of the far end; `None` if it never resolved.
    pub next_hop: Option<Ipv4Addr>,
    pub queues: Vec<QueueCost>,
}

impl LinkDescriptor {
    /// The queue a session of `priority` uses on this link, chosen among
    /// the queues this link advertises.
    pub fn selected_queue(&self, selector: &dyn QueueSelector, priority: u8) -> Option<&QueueCost> {
        if self.queues.is_empty() {
            return None;
        }
        let queue_count = self.queues.len().min(usize::from(u8::MAX)) as u8;
        let queue_number = selector.queue_for(priority, queue_count);
        self.queues.iter().find(|q| q.queue_number == queue_number)
    }
}

/// Where a vertex's current best path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predecessor {
    pub vertex: VertexId,
    /// Outgoing interface on the predecessor.
    pub interface_index: u8,
    pub next_hop: Option<Ipv4Addr>,
}

/// Per-vertex scratch state for one path computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub vertex: VertexId,
    pub metric: PathMetric,
    /// Outgoing links, at most one per neighbor vertex.
    pub links: Vec<LinkDescriptor>,
    /// Neighbor vertices, in interface order.
    pub neighbors: Vec<VertexId>,
    pub predecessor: Option<Predecessor>,
}

impl Descriptor {
    pub fn link_to(&self, vertex: VertexId) -> Option<&LinkDescriptor> {
        self.links.iter().find(|l| l.to_vertex == vertex)
    }
}

/// Dense arena of descriptors indexed by vertex number.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    descriptors: Vec<Descriptor>,
}

impl DescriptorSet {
    /// Create one descriptor per vertex, with parallel links to the same
    /// neighbor reduced to one.
    pub fn build(
        topology: &Topology,
        constraint: &QosConstraint,
        selector: &dyn QueueSelector,
    ) -> DescriptorSet {
        let descriptors = topology
            .vertices()
            .iter()
            .map(|vertex| {
                let mut links: Vec<LinkDescriptor> = Vec::new();
                if let Some(group) = topology.edge_group(vertex.router_id) {
                    for edge in &group.edges {
                        let Some(to_vertex) = edge.to_vertex else {
                            continue;
                        };
                        let candidate = LinkDescriptor {
                            to_vertex,
                            interface_index: edge.interface_index,
                            next_hop: edge.neighbor_address,
                            queues: edge.queues.clone(),
                        };
                        match links.iter().position(|l| l.to_vertex == to_vertex) {
                            Some(kept) => {
                                if replaces(&links[kept], &candidate, constraint, selector) {
                                    tracing::trace!(
                                        vertex = %vertex.id,
                                        to = %to_vertex,
                                        interface = candidate.interface_index,
                                        "parallel link replaces kept link"
                                    );
                                    links[kept] = candidate;
                                }
                            }
                            None => links.push(candidate),
                        }
                    }
                }

                let mut neighbors: Vec<VertexId> = Vec::new();
                for interface in &vertex.interfaces {
                    for address in &interface.neighbors {
                        match topology.vertex_for_address(*address) {
                            Some(n) if !neighbors.contains(&n) => neighbors.push(n),
                            Some(_) => {}
                            None => tracing::trace!(
                                vertex = %vertex.id,
                                neighbor = %address,
                                "skipping neighbor address with no vertex"
                            ),
                        }
                    }
                }

                Descriptor {
                    vertex: vertex.id,
                    metric: PathMetric::SOURCE,
                    links,
                    neighbors,
                    predecessor: None,
                }
            })
            .collect();

        DescriptorSet { descriptors }
    }

    pub fn get(&self, vertex: VertexId) -> Option<&Descriptor> {
        self.descriptors.get(vertex.index())
    }

    pub(crate) fn get_mut(&mut self, vertex: VertexId) -> Option<&mut Descriptor> {
        self.descriptors.get_mut(vertex.index())
    }

    /// Descriptor for `vertex`, or [`RoutingError::UnknownVertex`].
    pub fn require(&self, vertex: VertexId) -> Result<&Descriptor, RoutingError> {
        self.get(vertex).ok_or(RoutingError::UnknownVertex(vertex))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.iter()
    }
}

/// A parallel link replaces the kept one only if, on the session's queue,
/// it meets the bandwidth floor and has strictly lower delay than the kept
/// link on the same queue number. A kept link without that queue stays.
fn replaces(
    kept: &LinkDescriptor,
    candidate: &LinkDescriptor,
    constraint: &QosConstraint,
    selector: &dyn QueueSelector,
) -> bool {
    let Some(new) = candidate.selected_queue(selector, constraint.priority) else {
        return false;
    };
    if new.available_bandwidth < constraint.bandwidth_floor {
        return false;
    }
    match kept.queues.iter().find(|q| q.queue_number == new.queue_number) {
        Some(old) => new.average_delay < old.average_delay,
        None => false,
    }
}
