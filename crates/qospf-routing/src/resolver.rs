use std::net::Ipv4Addr;

use qospf_core::LinkType;

use crate::error::RoutingError;
use crate::topology::{Network, Topology, VertexId};

/// Links directed edges into usable routing information.
///
/// Runs four ordered steps over a freshly built [`Topology`]:
/// 1. attach each edge to the vertex its link ID names;
/// 2. resolve each edge's network from the origin's stub entries;
/// 3. resolve each edge's neighbor address from the symmetric edge;
/// 4. copy resolved neighbor addresses into the origin's interface records.
///
/// Steps 1 and 2 fail with [`RoutingError::DatabaseConsistency`]. An edge
/// without a symmetric partner is left unresolved and only matters if a
/// computed path uses it.
pub struct NeighborResolver;

impl NeighborResolver {
    pub fn resolve(topology: &mut Topology) -> Result<(), RoutingError> {
        Self::attach_destinations(topology)?;
        Self::resolve_networks(topology)?;
        let resolved = Self::resolve_reverse_neighbors(topology);
        Self::propagate(topology);

        tracing::debug!(
            edges = topology.edge_count(),
            resolved,
            "resolved neighbors"
        );
        Ok(())
    }

    fn attach_destinations(topology: &mut Topology) -> Result<(), RoutingError> {
        let mut targets: Vec<(usize, usize, VertexId)> = Vec::new();
        for (g, group) in topology.edge_groups.iter().enumerate() {
            for (e, edge) in group.edges.iter().enumerate() {
                let vertex = topology.vertex_for_link_id(edge.destination).ok_or_else(|| {
                    consistency(format!(
                        "router {} links to {} which has no router advertisement",
                        edge.origin, edge.destination
                    ))
                })?;
                targets.push((g, e, vertex));
            }
        }
        for (g, e, vertex) in targets {
            topology.edge_groups[g].edges[e].to_vertex = Some(vertex);
        }
        Ok(())
    }

    fn resolve_networks(topology: &mut Topology) -> Result<(), RoutingError> {
        let Topology {
            edge_groups,
            advertisements,
            ..
        } = topology;

        for group in edge_groups.iter_mut() {
            let advertisement = advertisements.get(&group.origin).ok_or_else(|| {
                consistency(format!("no advertisement for router {}", group.origin))
            })?;

            for edge in group.edges.iter_mut() {
                let own = u32::from(edge.own_address);
                let stub = advertisement
                    .links
                    .iter()
                    .find(|l| {
                        l.link_type == LinkType::Stub
                            && u32::from(l.link_data) & own == u32::from(l.link_id)
                    })
                    .ok_or_else(|| {
                        consistency(format!(
                            "router {} has no stub network covering {}",
                            group.origin, edge.own_address
                        ))
                    })?;

                edge.network = Some(Network {
                    address: Ipv4Addr::from(u32::from(stub.link_data) & own),
                    mask: stub.link_data,
                });
            }
        }
        Ok(())
    }

    /// Returns the number of edges that gained a neighbor address.
    fn resolve_reverse_neighbors(topology: &mut Topology) -> usize {
        let mut assignments: Vec<(usize, usize, Ipv4Addr)> = Vec::new();

        for (g, group) in topology.edge_groups.iter().enumerate() {
            let origin_vertex = topology.vertex_for_router(group.origin);
            for (e, edge) in group.edges.iter().enumerate() {
                if edge.neighbor_address.is_some() {
                    continue;
                }
                let (Some(to), Some(network)) = (edge.to_vertex, edge.network) else {
                    continue;
                };
                let Some(reverse) = topology
                    .vertex(to)
                    .and_then(|v| topology.edge_group(v.router_id))
                else {
                    continue;
                };

                match reverse
                    .edges
                    .iter()
                    .find(|f| f.to_vertex == origin_vertex && f.network == Some(network))
                {
                    Some(f) => assignments.push((g, e, f.own_address)),
                    None => tracing::trace!(
                        origin = %edge.origin,
                        network = %network.address,
                        "no symmetric edge, neighbor stays unresolved"
                    ),
                }
            }
        }

        let resolved = assignments.len();
        for (g, e, address) in assignments {
            let edge = &mut topology.edge_groups[g].edges[e];
            if edge.neighbor_address.is_none() {
                edge.neighbor_address = Some(address);
            }
        }
        resolved
    }

    fn propagate(topology: &mut Topology) {
        let mut updates: Vec<(VertexId, u8, Ipv4Addr)> = Vec::new();
        for group in &topology.edge_groups {
            let Some(origin) = topology.vertex_for_router(group.origin) else {
                continue;
            };
            for edge in &group.edges {
                if let Some(address) = edge.neighbor_address {
                    updates.push((origin, edge.interface_index, address));
                }
            }
        }

        for (vertex, interface_index, address) in updates {
            let Some(vertex) = topology.vertices.get_mut(vertex.index()) else {
                continue;
            };
            if let Some(record) = vertex
                .interfaces
                .iter_mut()
                .find(|i| i.interface_index == interface_index)
            {
                if !record.neighbors.contains(&address) {
                    record.neighbors.push(address);
                }
            }
        }
    }
}

fn consistency(message: String) -> RoutingError {
    tracing::error!(%message, "link-state database consistency violation");
    RoutingError::DatabaseConsistency(message)
}
