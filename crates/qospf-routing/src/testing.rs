//! Hand-built area fixtures shared by the unit tests.

use std::net::Ipv4Addr;

use qospf_core::{QospfConfig, RouterId, RouterLsa};

use crate::advertisement::{originate_router_lsa, LocalInterface};
use crate::resolver::NeighborResolver;
use crate::topology::{Topology, TopologyBuilder};

pub(crate) const MBPS: u64 = 1_000_000;
pub(crate) const MS: u64 = 1_000;

pub(crate) fn rid(n: u8) -> RouterId {
    Ipv4Addr::new(10, 0, 0, n)
}

/// A /30 point-to-point interface carrying `queues` idle queues.
pub(crate) fn iface_with_queues(
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

pub(crate) fn iface(index: u8, own: [u8; 4], neighbor: u8, bandwidth: u64, delay: u64) -> LocalInterface {
    iface_with_queues(index, own, neighbor, bandwidth, delay, 1)
}

pub(crate) fn router(id: u8, interfaces: Vec<LocalInterface>) -> RouterLsa {
    originate_router_lsa(rid(id), &interfaces, &QospfConfig::default()).unwrap()
}

/// Build and resolve the graph.
pub(crate) fn resolved(lsas: &[RouterLsa]) -> Topology {
    let mut topology = TopologyBuilder::build(lsas);
    NeighborResolver::resolve(&mut topology).unwrap();
    topology
}

/// Line topology:
///
/// ```text
///   R1 (192.168.12.1) ---- (192.168.12.2) R2 (192.168.23.1) ---- (192.168.23.2) R3
/// ```
pub(crate) fn line_topology(bandwidth: u64, delay: u64) -> Vec<RouterLsa> {
    vec![
        router(1, vec![iface(0, [192, 168, 12, 1], 2, bandwidth, delay)]),
        router(
            2,
            vec![
                iface(0, [192, 168, 12, 2], 1, bandwidth, delay),
                iface(1, [192, 168, 23, 1], 3, bandwidth, delay),
            ],
        ),
        router(3, vec![iface(0, [192, 168, 23, 2], 2, bandwidth, delay)]),
    ]
}

/// Two parallel R1-R2 links of equal bandwidth:
///
/// ```text
///        192.168.12.0/30, first_delay
///   R1 ================================ R2
///        192.168.112.0/30, second_delay
/// ```
pub(crate) fn parallel_links(bandwidth: u64, first_delay: u64, second_delay: u64) -> Vec<RouterLsa> {
    vec![
        router(
            1,
            vec![
                iface(0, [192, 168, 12, 1], 2, bandwidth, first_delay),
                iface(1, [192, 168, 112, 1], 2, bandwidth, second_delay),
            ],
        ),
        router(
            2,
            vec![
                iface(0, [192, 168, 12, 2], 1, bandwidth, first_delay),
                iface(1, [192, 168, 112, 2], 1, bandwidth, second_delay),
            ],
        ),
    ]
}

/// Diamond where both R2 and R3 reach R4 in the same round:
///
/// ```text
///           R2
///          /  \
///   R1 ---+    +--- R4
///          \  /
///           R3
/// ```
///
/// R1-R2 and R2-R4 links use `upper_delay`, R1-R3 and R3-R4 use `lower_delay`.
pub(crate) fn diamond(bandwidth: u64, upper_delay: u64, lower_delay: u64) -> Vec<RouterLsa> {
    vec![
        router(
            1,
            vec![
                iface(0, [192, 168, 12, 1], 2, bandwidth, upper_delay),
                iface(1, [192, 168, 13, 1], 3, bandwidth, lower_delay),
            ],
        ),
        router(
            2,
            vec![
                iface(0, [192, 168, 12, 2], 1, bandwidth, upper_delay),
                iface(1, [192, 168, 24, 1], 4, bandwidth, upper_delay),
            ],
        ),
        router(
            3,
            vec![
                iface(0, [192, 168, 13, 2], 1, bandwidth, lower_delay),
                iface(1, [192, 168, 34, 1], 4, bandwidth, lower_delay),
            ],
        ),
        router(
            4,
            vec![
                iface(0, [192, 168, 24, 2], 2, bandwidth, upper_delay),
                iface(1, [192, 168, 34, 2], 3, bandwidth, lower_delay),
            ],
        ),
    ]
}

/// Triangle where R2 never advertises its end of the R1-R2 link:
///
/// ```text
///   R1 (192.168.12.1) - - - - - - - - - - - - - - -  R2
///   R1 (192.168.13.1) ---- (192.168.13.2) R3 (192.168.23.1) ---- (192.168.23.2) R2
/// ```
pub(crate) fn half_advertised(bandwidth: u64, delay: u64) -> Vec<RouterLsa> {
    vec![
        router(
            1,
            vec![
                iface(0, [192, 168, 12, 1], 2, bandwidth, delay),
                iface(1, [192, 168, 13, 1], 3, bandwidth, delay),
            ],
        ),
        router(2, vec![iface(0, [192, 168, 23, 2], 3, bandwidth, delay)]),
        router(
            3,
            vec![
                iface(0, [192, 168, 13, 2], 1, bandwidth, delay),
                iface(1, [192, 168, 23, 1], 2, bandwidth, delay),
            ],
        ),
    ]
}
