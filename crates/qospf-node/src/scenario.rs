//! Scenario runner: builds one area's database and decides each request.

use std::fmt;
use std::net::Ipv4Addr;

use anyhow::Context;
use bytes::Bytes;
use serde::Serialize;

use qospf_core::{FlowKey, QosConstraint, QospfConfig};
use qospf_routing::{
    originate_router_lsa, AdmissionRequest, LinkStateDatabase, LocalInterface,
    SessionAdmissionController, StatsSnapshot,
};

use crate::config::{InterfaceConfig, RequestConfig, ScenarioConfig};

/// Outcome of one request as printed by the runner.
#[derive(Debug, Clone, Serialize)]
pub struct RequestReport {
    pub session_id: u32,
    pub flow: FlowKey,
    pub priority: u8,
    pub admitted: bool,
    pub hops: Vec<Ipv4Addr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Everything a scenario run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub advertisements: usize,
    pub requests: Vec<RequestReport>,
    /// One summary line per session.
    pub sessions: Vec<String>,
    pub statistics: StatsSnapshot,
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "advertisements: {}", self.advertisements)?;
        for r in &self.requests {
            if r.admitted {
                let hops: Vec<String> = r.hops.iter().map(|h| h.to_string()).collect();
                writeln!(
                    f,
                    "[{}] {} priority {}: admitted via [{}]",
                    r.session_id,
                    r.flow,
                    r.priority,
                    hops.join(", ")
                )?;
            } else {
                writeln!(
                    f,
                    "[{}] {} priority {}: rejected ({})",
                    r.session_id,
                    r.flow,
                    r.priority,
                    r.reason.as_deref().unwrap_or("unknown")
                )?;
            }
        }
        for line in &self.sessions {
            writeln!(f, "{}", line)?;
        }
        write!(f, "{}", self.statistics)
    }
}

pub struct ScenarioRunner {
    config: ScenarioConfig,
    lsdb: LinkStateDatabase,
}

impl ScenarioRunner {
    /// Build the area database from the scenario's wire dump and routers.
    pub fn new(config: ScenarioConfig) -> anyhow::Result<Self> {
        let lsdb = LinkStateDatabase::new();

        if let Some(dump) = &config.lsdb_hex {
            let raw = hex::decode(dump.trim()).context("lsdb_hex is not valid hex")?;
            let installed = lsdb
                .install_from_wire(Bytes::from(raw))
                .context("failed to decode advertisement dump")?;
            tracing::info!(installed, "loaded advertisement dump");
        }

        for router in &config.routers {
            let interfaces: Vec<LocalInterface> = router
                .interfaces
                .iter()
                .map(|i| local_interface(i, &config.qospf))
                .collect();
            let lsa = originate_router_lsa(router.id, &interfaces, &config.qospf)
                .with_context(|| format!("failed to originate advertisement for {}", router.id))?;
            lsdb.install_router(&lsa);
        }

        tracing::info!(advertisements = lsdb.len(), "area database ready");
        Ok(Self { config, lsdb })
    }

    pub fn lsdb(&self) -> &LinkStateDatabase {
        &self.lsdb
    }

    /// Decide every request in order.
    pub fn run(&self) -> anyhow::Result<ScenarioReport> {
        let controller = SessionAdmissionController::new(self.config.qospf.clone());

        let mut requests = Vec::with_capacity(self.config.requests.len());
        for req in &self.config.requests {
            let request = admission_request(req);
            let result = controller
                .admit(&self.lsdb, &request)
                .with_context(|| format!("admission failed for {}", request.flow))?;
            requests.push(RequestReport {
                session_id: result.session_id,
                flow: request.flow,
                priority: req.priority,
                admitted: result.is_admitted(),
                hops: result.hops().to_vec(),
                reason: result.reject_reason().map(|r| r.to_string()),
            });
        }

        let sessions = controller
            .sessions()
            .sessions()
            .iter()
            .map(|s| s.report().to_string())
            .collect();

        Ok(ScenarioReport {
            advertisements: self.lsdb.len(),
            requests,
            sessions,
            statistics: controller.stats().snapshot(),
        })
    }
}

fn local_interface(cfg: &InterfaceConfig, qospf: &QospfConfig) -> LocalInterface {
    let mut iface = LocalInterface::new(
        cfg.index,
        cfg.address,
        cfg.mask,
        cfg.neighbor,
        cfg.bandwidth_bps,
        cfg.delay_us,
        qospf.queues_per_interface,
    );
    iface.cost = cfg.cost;
    for queue in &mut iface.queues {
        queue.record_utilization(cfg.utilized_bps);
        queue.queueing_delay = cfg.queueing_delay_us;
    }
    iface
}

fn admission_request(cfg: &RequestConfig) -> AdmissionRequest {
    AdmissionRequest::new(
        FlowKey {
            source_address: cfg.source,
            destination_address: cfg.destination,
            source_port: cfg.source_port,
            destination_port: cfg.destination_port,
            protocol: cfg.protocol,
        },
        QosConstraint::new(cfg.priority, cfg.bandwidth_bps, cfg.delay_us),
    )
}
