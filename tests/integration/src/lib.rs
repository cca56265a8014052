//! Area fixtures and path checks shared by the integration tests.

use std::net::Ipv4Addr;

use qospf_core::{
    FlowKey, LinkType, PrecedenceQueueSelector, QosConstraint, QospfConfig, QueueSelector,
    RouterId, RouterLsa,
};
use qospf_routing::{
    originate_router_lsa, AdmissionRequest, LocalInterface, NeighborResolver, PathMetric,
    TopologyBuilder,
};

pub const MBPS: u64 = 1_000_000;
pub const MS: u64 = 1_000;

pub fn rid(n: u8) -> RouterId {
    Ipv4Addr::new(10, 0, 0, n)
}

/// A /30 point-to-point link end with `queues` idle queues.
pub fn link(
    index: u8,
    own: [u8; 4],
    neighbor: u8,
    bandwidth: u64,
    delay: u64,
    queues: u8,
) -> LocalInterface {
    LocalInterface::new(
        index,
        Ipv4Addr::from(own),
        Ipv4Addr::new(255, 255, 255, 252),
        rid(neighbor),
        bandwidth,
        delay,
        queues,
    )
}

pub fn router(id: u8, interfaces: Vec<LocalInterface>) -> RouterLsa {
    originate_router_lsa(rid(id), &interfaces, &QospfConfig::default())
        .expect("fixture metrics are in range")
}

/// ```text
///   R1 (192.168.12.1) ---- (192.168.12.2) R2 (192.168.23.1) ---- (192.168.23.2) R3
/// ```
pub fn line(bandwidth: u64, delay: u64) -> Vec<RouterLsa> {
    vec![
        router(1, vec![link(0, [192, 168, 12, 1], 2, bandwidth, delay, 1)]),
        router(
            2,
            vec![
                link(0, [192, 168, 12, 2], 1, bandwidth, delay, 1),
                link(1, [192, 168, 23, 1], 3, bandwidth, delay, 1),
            ],
        ),
        router(3, vec![link(0, [192, 168, 23, 2], 2, bandwidth, delay, 1)]),
    ]
}

/// ```text
///        192.168.12.0/30, first_delay
///   R1 ================================ R2
///        192.168.112.0/30, second_delay
/// ```
pub fn parallel(bandwidth: u64, first_delay: u64, second_delay: u64) -> Vec<RouterLsa> {
    vec![
        router(
            1,
            vec![
                link(0, [192, 168, 12, 1], 2, bandwidth, first_delay, 1),
                link(1, [192, 168, 112, 1], 2, bandwidth, second_delay, 1),
            ],
        ),
        router(
            2,
            vec![
                link(0, [192, 168, 12, 2], 1, bandwidth, first_delay, 1),
                link(1, [192, 168, 112, 2], 1, bandwidth, second_delay, 1),
            ],
        ),
    ]
}

/// A four-router ring with a chord, every link carrying `queues` queues:
///
/// ```text
///   R1 --- R2
///   |    / |
///   |   /  |
///   R4 --- R3
/// ```
///
/// R1-R2 and R2-R3 are fast but narrow, R1-R4 and R4-R3 are wide but slow,
/// and the R2-R4 chord is wide and fast.
pub fn ring_with_chord(queues: u8) -> Vec<RouterLsa> {
    let narrow = 2 * MBPS;
    let wide = 100 * MBPS;
    vec![
        router(
            1,
            vec![
                link(0, [10, 1, 12, 1], 2, narrow, MS, queues),
                link(1, [10, 1, 14, 1], 4, wide, 20 * MS, queues),
            ],
        ),
        router(
            2,
            vec![
                link(0, [10, 1, 12, 2], 1, narrow, MS, queues),
                link(1, [10, 1, 23, 1], 3, narrow, MS, queues),
                link(2, [10, 1, 24, 1], 4, wide, 2 * MS, queues),
            ],
        ),
        router(
            3,
            vec![
                link(0, [10, 1, 23, 2], 2, narrow, MS, queues),
                link(1, [10, 1, 34, 1], 4, wide, 20 * MS, queues),
            ],
        ),
        router(
            4,
            vec![
                link(0, [10, 1, 14, 2], 1, wide, 20 * MS, queues),
                link(1, [10, 1, 24, 2], 2, wide, 2 * MS, queues),
                link(2, [10, 1, 34, 2], 3, wide, 20 * MS, queues),
            ],
        ),
    ]
}

pub fn request(
    source: [u8; 4],
    destination: [u8; 4],
    priority: u8,
    floor: u64,
    ceiling: u64,
) -> AdmissionRequest {
    AdmissionRequest::new(
        FlowKey {
            source_address: Ipv4Addr::from(source),
            destination_address: Ipv4Addr::from(destination),
            source_port: 40000,
            destination_port: 5004,
            protocol: 17,
        },
        QosConstraint::new(priority, floor, ceiling),
    )
}

/// Walk `hops` from `source` over the advertised links and return the
/// accumulated metric on the queue each hop would use. `None` if a hop
/// does not follow a point-to-point link of the previous router.
pub fn walk_route(
    advertisements: &[RouterLsa],
    source: Ipv4Addr,
    hops: &[Ipv4Addr],
    priority: u8,
) -> Option<PathMetric> {
    let mut topology = TopologyBuilder::build(advertisements);
    NeighborResolver::resolve(&mut topology).ok()?;
    let selector = PrecedenceQueueSelector;

    let mut current = topology.vertex(topology.vertex_for_address(source)?)?.router_id;
    let mut metric = PathMetric::SOURCE;
    for &hop in hops {
        let next = topology.vertex(topology.vertex_for_address(hop)?)?.router_id;
        let edge = topology.edge_group(current)?.edges.iter().find(|e| {
            e.link_type == LinkType::PointToPoint
                && e.neighbor_address == Some(hop)
                && e.destination == next
        })?;
        let queue_count = edge.queues.len() as u8;
        if queue_count > 0 {
            let queue_number = selector.queue_for(priority, queue_count);
            if let Some(queue) = edge.queue(queue_number) {
                metric = metric.concatenate(queue);
            }
        }
        current = next;
    }
    Some(metric)
}
