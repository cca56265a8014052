//! Q-OSPF Core — shared types for QoS-extended link-state routing.
//!
//! This crate provides:
//! - [`metric`] — the exponent/mantissa codec used for advertised QoS metrics.
//! - [`lsa`] — the link-state advertisement sum type and its wire format.
//! - [`types`] — router links, per-queue QoS sub-records, flow keys and constraints.
//! - [`queue`] — mapping of a user priority onto an interface queue.
//! - [`config`] — validated protocol configuration.

pub mod config;
pub mod error;
pub mod lsa;
pub mod metric;
pub mod queue;
pub mod types;

pub use config::{LoggingConfig, PathAlgorithm, QospfConfig};
pub use error::CoreError;
pub use lsa::{Lsa, LsaBody, LsaHeader, LsaType};
pub use metric::EncodedMetric;
pub use queue::{FixedQueueSelector, PrecedenceQueueSelector, QueueSelector};
pub use types::{
    FlowKey, LinkEntry, LinkType, QosConstraint, QosKind, QosMetricRecord, RouterId, RouterLsa,
    SessionKey,
};
