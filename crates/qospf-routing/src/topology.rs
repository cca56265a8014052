use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;

use qospf_core::{LinkType, QosKind, RouterId, RouterLsa};
use serde::{Deserialize, Serialize};

use crate::lsdb::AreaLsdb;

/// Dense vertex number, assigned from 1 in first-seen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(u32);

impl VertexId {
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Position in dense per-vertex arrays.
    pub(crate) fn index(self) -> usize {
        (self.0 as usize).wrapping_sub(1)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One router interface and the neighbor addresses reachable through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub interface_index: u8,
    pub address: Ipv4Addr,
    /// Filled in by the neighbor resolver.
    pub neighbors: Vec<Ipv4Addr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub router_id: RouterId,
    pub interfaces: Vec<InterfaceRecord>,
}

/// Decoded metrics of one queue on a link. Bandwidth in bits per second,
/// delay in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCost {
    pub queue_number: u8,
    pub available_bandwidth: u64,
    pub average_delay: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Network {
    pub address: Ipv4Addr,
    pub mask: Ipv4Addr,
}

/// A directed link from the advertising router to a neighbor router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyEdge {
    pub origin: RouterId,
    /// Link ID as advertised: the neighbor's router ID, or for transit
    /// links the designated router's interface address.
    pub destination: Ipv4Addr,
    /// Vertex of the far end, attached by the neighbor resolver.
    pub to_vertex: Option<VertexId>,
    pub interface_index: u8,
    pub own_address: Ipv4Addr,
    /// Address of the far end of this link; `None` until resolved, and
    /// stays `None` when no symmetric edge exists.
    pub neighbor_address: Option<Ipv4Addr>,
    pub network: Option<Network>,
    pub link_type: LinkType,
    pub queues: Vec<QueueCost>,
}

impl TopologyEdge {
    pub fn queue(&self, queue_number: u8) -> Option<&QueueCost> {
        self.queues.iter().find(|q| q.queue_number == queue_number)
    }
}

/// All edges advertised by one router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeGroup {
    pub origin: RouterId,
    pub edges: Vec<TopologyEdge>,
}

/// The per-request graph built from an area's router advertisements.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edge_groups: Vec<EdgeGroup>,
    pub(crate) advertisements: HashMap<RouterId, RouterLsa>,
    router_index: HashMap<RouterId, VertexId>,
    group_index: HashMap<RouterId, usize>,
}

impl Topology {
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertex_for_router(&self, router: RouterId) -> Option<VertexId> {
        self.router_index.get(&router).copied()
    }

    /// Vertex owning the interface with this address.
    pub fn vertex_for_address(&self, address: Ipv4Addr) -> Option<VertexId> {
        self.vertices
            .iter()
            .find(|v| v.interfaces.iter().any(|i| i.address == address))
            .map(|v| v.id)
    }

    /// Vertex named by an edge's link ID: a router ID, or failing that an
    /// interface address.
    pub fn vertex_for_link_id(&self, link_id: Ipv4Addr) -> Option<VertexId> {
        self.vertex_for_router(link_id)
            .or_else(|| self.vertex_for_address(link_id))
    }

    pub fn edge_groups(&self) -> &[EdgeGroup] {
        &self.edge_groups
    }

    pub fn edge_group(&self, origin: RouterId) -> Option<&EdgeGroup> {
        self.group_index.get(&origin).map(|&i| &self.edge_groups[i])
    }

    pub fn edges(&self) -> impl Iterator<Item = &TopologyEdge> {
        self.edge_groups.iter().flat_map(|g| g.edges.iter())
    }

    pub fn edge_count(&self) -> usize {
        self.edge_groups.iter().map(|g| g.edges.len()).sum()
    }

    /// The advertisement a vertex was built from.
    pub fn advertisement(&self, router: RouterId) -> Option<&RouterLsa> {
        self.advertisements.get(&router)
    }
}

/// Builds a [`Topology`] from an area's router advertisements.
pub struct TopologyBuilder;

impl TopologyBuilder {
    /// Build the graph from every router advertisement in `lsdb`.
    pub fn from_lsdb(lsdb: &dyn AreaLsdb) -> Topology {
        Self::build(&lsdb.router_advertisements())
    }

    /// Build the graph. A router seen more than once contributes only its
    /// first advertisement.
    pub fn build(advertisements: &[RouterLsa]) -> Topology {
        let mut topology = Topology::default();

        for lsa in advertisements {
            let router = lsa.advertising_router;
            if topology.router_index.contains_key(&router) {
                tracing::debug!(router = %router, "skipping repeated router advertisement");
                continue;
            }

            let id = VertexId::new(topology.vertices.len() as u32 + 1);
            let mut vertex = Vertex {
                id,
                router_id: router,
                interfaces: Vec::new(),
            };
            let mut edges = Vec::new();

            for (ordinal, link) in lsa
                .links
                .iter()
                .filter(|l| l.link_type.connects_routers())
                .enumerate()
            {
                let interface_index = link.interface_index().unwrap_or(ordinal as u8);
                vertex.interfaces.push(InterfaceRecord {
                    interface_index,
                    address: link.link_data,
                    neighbors: Vec::new(),
                });
                edges.push(TopologyEdge {
                    origin: router,
                    destination: link.link_id,
                    to_vertex: None,
                    interface_index,
                    own_address: link.link_data,
                    neighbor_address: None,
                    network: None,
                    link_type: link.link_type,
                    queues: decode_queues(link),
                });
            }

            tracing::trace!(
                vertex = %id,
                router = %router,
                interfaces = vertex.interfaces.len(),
                "added vertex"
            );

            topology.router_index.insert(router, id);
            topology.vertices.push(vertex);
            topology.group_index.insert(router, topology.edge_groups.len());
            topology.edge_groups.push(EdgeGroup {
                origin: router,
                edges,
            });
            topology.advertisements.insert(router, lsa.clone());
        }

        tracing::debug!(
            vertices = topology.vertex_count(),
            edges = topology.edge_count(),
            "built topology"
        );
        topology
    }
}

/// Group a link's QoS sub-records by queue, decoding bandwidth from bytes
/// per second to bits per second.
fn decode_queues(link: &qospf_core::LinkEntry) -> Vec<QueueCost> {
    let mut queues: Vec<QueueCost> = Vec::new();
    for record in &link.qos {
        let position = match queues.iter().position(|q| q.queue_number == record.queue_number) {
            Some(p) => p,
            None => {
                queues.push(QueueCost {
                    queue_number: record.queue_number,
                    available_bandwidth: 0,
                    average_delay: 0,
                });
                queues.len() - 1
            }
        };
        let cost = &mut queues[position];
        match record.kind {
            QosKind::Bandwidth => cost.available_bandwidth = (record.value() * 8.0) as u64,
            QosKind::Delay => cost.average_delay = record.value() as u64,
        }
    }
    queues
}
