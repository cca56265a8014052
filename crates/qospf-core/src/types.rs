use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

use crate::config::MAX_QUEUES;
use crate::error::CoreError;
use crate::metric::{self, EncodedMetric};

/// A router is named by its 32-bit router ID, written as a dotted quad.
pub type RouterId = Ipv4Addr;

/// Router-link types carried in a router advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkType {
    /// Point-to-point link to another router.
    PointToPoint,
    /// Link to a transit (multi-access) network.
    Transit,
    /// Link to a stub network.
    Stub,
    /// Virtual link.
    Virtual,
}

impl LinkType {
    /// Wire code of this link type.
    pub fn to_u8(self) -> u8 {
        match self {
            LinkType::PointToPoint => 1,
            LinkType::Transit => 2,
            LinkType::Stub => 3,
            LinkType::Virtual => 4,
        }
    }

    /// Parse a wire code.
    pub fn from_u8(code: u8) -> Result<Self, CoreError> {
        match code {
            1 => Ok(LinkType::PointToPoint),
            2 => Ok(LinkType::Transit),
            3 => Ok(LinkType::Stub),
            4 => Ok(LinkType::Virtual),
            other => Err(CoreError::InvalidLinkType(other)),
        }
    }

    /// Whether this link leads to another router and so yields a topology edge.
    pub fn connects_routers(self) -> bool {
        matches!(self, LinkType::PointToPoint | LinkType::Transit)
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkType::PointToPoint => "point-to-point",
            LinkType::Transit => "transit",
            LinkType::Stub => "stub",
            LinkType::Virtual => "virtual",
        };
        write!(f, "{}", name)
    }
}

/// Which QoS quantity a sub-record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QosKind {
    /// Available bandwidth, advertised in bytes per second.
    Bandwidth,
    /// Average delay, advertised in microseconds.
    Delay,
}

impl QosKind {
    pub fn to_u8(self) -> u8 {
        match self {
            QosKind::Bandwidth => 0,
            QosKind::Delay => 1,
        }
    }

    pub fn from_u8(code: u8) -> Result<Self, CoreError> {
        match code {
            0 => Ok(QosKind::Bandwidth),
            1 => Ok(QosKind::Delay),
            other => Err(CoreError::InvalidQosKind(other)),
        }
    }
}

/// One per-queue QoS sub-record attached to a router link.
///
/// On the wire it occupies four bytes: queue number (high 3 bits) and kind
/// (low 5 bits), the advertising interface's index, then the 16-bit encoded
/// metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QosMetricRecord {
    pub queue_number: u8,
    pub kind: QosKind,
    pub interface_index: u8,
    pub metric: EncodedMetric,
}

impl QosMetricRecord {
    /// Build a record by encoding `value` (bytes/s for bandwidth, microseconds for delay).
    pub fn encode(
        queue_number: u8,
        kind: QosKind,
        interface_index: u8,
        value: f64,
    ) -> Result<Self, CoreError> {
        if queue_number >= MAX_QUEUES {
            return Err(CoreError::InvalidQueueNumber(queue_number));
        }
        Ok(Self {
            queue_number,
            kind,
            interface_index,
            metric: metric::encode(value)?,
        })
    }

    /// The decoded linear value, in the advertised unit.
    pub fn value(&self) -> f64 {
        self.metric.value()
    }
}

/// One router link from a router advertisement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    /// Neighbor router ID (point-to-point), designated router address
    /// (transit) or network number (stub).
    pub link_id: Ipv4Addr,
    /// Own interface address, or the network mask for stub links.
    pub link_data: Ipv4Addr,
    pub link_type: LinkType,
    /// Plain OSPF cost of the link.
    pub metric: u16,
    /// Per-queue QoS sub-records.
    pub qos: Vec<QosMetricRecord>,
}

impl LinkEntry {
    /// Number of QoS sub-records, as written in the link's TOS count byte.
    pub fn tos_count(&self) -> usize {
        self.qos.len()
    }

    /// Interface index this link was advertised from, taken from its first
    /// QoS sub-record.
    pub fn interface_index(&self) -> Option<u8> {
        self.qos.first().map(|r| r.interface_index)
    }

    /// All sub-records for the given queue.
    pub fn records_for_queue(&self, queue_number: u8) -> impl Iterator<Item = &QosMetricRecord> {
        self.qos.iter().filter(move |r| r.queue_number == queue_number)
    }

    /// First record of the given kind for the given queue.
    pub fn record(&self, queue_number: u8, kind: QosKind) -> Option<&QosMetricRecord> {
        self.records_for_queue(queue_number).find(|r| r.kind == kind)
    }
}

/// The content of a router advertisement that path computation consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterLsa {
    pub advertising_router: RouterId,
    pub link_state_id: Ipv4Addr,
    pub sequence_number: u32,
    pub flags: u8,
    pub links: Vec<LinkEntry>,
}

impl RouterLsa {
    /// A router advertisement whose link-state ID is the router's own ID.
    pub fn new(advertising_router: RouterId, links: Vec<LinkEntry>) -> Self {
        Self {
            advertising_router,
            link_state_id: advertising_router,
            sequence_number: crate::lsa::INITIAL_SEQUENCE_NUMBER,
            flags: 0,
            links,
        }
    }
}

/// Five-tuple identifying a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowKey {
    pub source_address: Ipv4Addr,
    pub destination_address: Ipv4Addr,
    pub source_port: u16,
    pub destination_port: u16,
    pub protocol: u8,
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{} proto {}",
            self.source_address,
            self.source_port,
            self.destination_address,
            self.destination_port,
            self.protocol
        )
    }
}

/// Key of the session table: a flow plus its priority byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub flow: FlowKey,
    pub priority: u8,
}

/// The QoS a session asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosConstraint {
    /// Priority byte; selects the queue used on every link.
    pub priority: u8,
    /// Minimum bottleneck bandwidth in bits per second.
    pub bandwidth_floor: u64,
    /// Maximum end-to-end delay in microseconds.
    pub delay_ceiling: u64,
}

impl QosConstraint {
    pub fn new(priority: u8, bandwidth_floor: u64, delay_ceiling: u64) -> Self {
        Self {
            priority,
            bandwidth_floor,
            delay_ceiling,
        }
    }
}
