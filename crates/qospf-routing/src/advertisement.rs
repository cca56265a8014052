use std::net::Ipv4Addr;
use std::time::Duration;

use qospf_core::{
    CoreError, LinkEntry, LinkType, QosKind, QosMetricRecord, QospfConfig, RouterId, RouterLsa,
};
use serde::{Deserialize, Serialize};

/// Observed state of one priority queue on a local interface.
///
/// Bandwidths are in bits per second, delays in microseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub queue_number: u8,
    pub link_bandwidth: u64,
    pub utilized_bandwidth: u64,
    pub available_bandwidth: u64,
    pub propagation_delay: u64,
    pub queueing_delay: u64,
}

impl QueueStatus {
    /// A queue with nothing in flight: the whole link is available.
    pub fn idle(queue_number: u8, link_bandwidth: u64, propagation_delay: u64) -> Self {
        Self {
            queue_number,
            link_bandwidth,
            utilized_bandwidth: 0,
            available_bandwidth: link_bandwidth,
            propagation_delay,
            queueing_delay: 0,
        }
    }

    /// Record a utilization sample (bits per second).
    pub fn record_utilization(&mut self, utilized_bandwidth: u64) {
        self.utilized_bandwidth = utilized_bandwidth;
        self.available_bandwidth = self.link_bandwidth.saturating_sub(utilized_bandwidth);
    }

    /// Delay to advertise for this queue.
    pub fn advertised_delay(&self, include_queueing: bool) -> u64 {
        if include_queueing {
            self.propagation_delay.saturating_add(self.queueing_delay)
        } else {
            self.propagation_delay
        }
    }
}

/// A local point-to-point interface and the queues it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalInterface {
    pub index: u8,
    pub address: Ipv4Addr,
    pub mask: Ipv4Addr,
    /// Router ID of the router at the other end.
    pub neighbor: RouterId,
    pub cost: u16,
    pub queues: Vec<QueueStatus>,
}

impl LocalInterface {
    /// An interface whose `queue_count` queues all start idle.
    pub fn new(
        index: u8,
        address: Ipv4Addr,
        mask: Ipv4Addr,
        neighbor: RouterId,
        link_bandwidth: u64,
        propagation_delay: u64,
        queue_count: u8,
    ) -> Self {
        Self {
            index,
            address,
            mask,
            neighbor,
            cost: 1,
            queues: (0..queue_count)
                .map(|q| QueueStatus::idle(q, link_bandwidth, propagation_delay))
                .collect(),
        }
    }

    /// Network number of the attached subnet.
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.address) & u32::from(self.mask))
    }
}

/// Encode the interface's queues as QoS sub-records: for each queue a
/// bandwidth record (bytes per second) followed by a delay record.
pub fn encode_queue_metrics(
    interface: &LocalInterface,
    include_queueing: bool,
) -> Result<Vec<QosMetricRecord>, CoreError> {
    let mut records = Vec::with_capacity(interface.queues.len() * 2);
    for queue in &interface.queues {
        records.push(QosMetricRecord::encode(
            queue.queue_number,
            QosKind::Bandwidth,
            interface.index,
            (queue.available_bandwidth / 8) as f64,
        )?);
        records.push(QosMetricRecord::encode(
            queue.queue_number,
            QosKind::Delay,
            interface.index,
            queue.advertised_delay(include_queueing) as f64,
        )?);
    }
    Ok(records)
}

/// Build this router's advertisement: per interface, a point-to-point entry
/// carrying the queue metrics, then a stub entry for the interface subnet.
pub fn originate_router_lsa(
    router_id: RouterId,
    interfaces: &[LocalInterface],
    config: &QospfConfig,
) -> Result<RouterLsa, CoreError> {
    let mut links = Vec::with_capacity(interfaces.len() * 2);
    for interface in interfaces {
        links.push(LinkEntry {
            link_id: interface.neighbor,
            link_data: interface.address,
            link_type: LinkType::PointToPoint,
            metric: interface.cost,
            qos: encode_queue_metrics(interface, config.queueing_delay_considered)?,
        });
        links.push(LinkEntry {
            link_id: interface.network(),
            link_data: interface.mask,
            link_type: LinkType::Stub,
            metric: interface.cost,
            qos: Vec::new(),
        });
    }

    tracing::debug!(
        router = %router_id,
        links = links.len(),
        "originated router advertisement"
    );
    Ok(RouterLsa::new(router_id, links))
}

/// Average link utilization in bits per second over `period`.
/// Periods shorter than one second yield 0.
pub fn link_utilization(bytes: u64, period: Duration) -> u64 {
    if period.as_secs() == 0 {
        return 0;
    }
    ((bytes as f64 * 8.0) / period.as_secs_f64()) as u64
}
