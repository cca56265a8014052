//! Scenario file loading: protocol configuration, the routers of one area,
//! and the admission requests to decide.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;

use qospf_core::QospfConfig;

/// A complete scenario.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScenarioConfig {
    /// Hex-encoded advertisement stream installed before the routers below.
    #[serde(default)]
    pub lsdb_hex: Option<String>,

    /// Protocol settings.
    #[serde(default)]
    pub qospf: QospfConfig,

    /// Routers whose advertisements are originated from interface state.
    #[serde(default)]
    pub routers: Vec<RouterConfig>,

    /// Admission requests, decided in order.
    #[serde(default)]
    pub requests: Vec<RequestConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    pub id: Ipv4Addr,
    #[serde(default)]
    pub interfaces: Vec<InterfaceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub index: u8,
    pub address: Ipv4Addr,
    #[serde(default = "default_mask")]
    pub mask: Ipv4Addr,
    /// Router ID at the other end of the link.
    pub neighbor: Ipv4Addr,
    /// Link bandwidth in bits per second.
    pub bandwidth_bps: u64,
    /// Propagation delay in microseconds.
    pub delay_us: u64,
    /// Bandwidth already in use on every queue, bits per second.
    #[serde(default)]
    pub utilized_bps: u64,
    /// Queueing delay in microseconds, advertised only when enabled.
    #[serde(default)]
    pub queueing_delay_us: u64,
    #[serde(default = "default_cost")]
    pub cost: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    #[serde(default)]
    pub source_port: u16,
    #[serde(default)]
    pub destination_port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: u8,
    #[serde(default)]
    pub priority: u8,
    /// Bandwidth floor in bits per second.
    pub bandwidth_bps: u64,
    /// Delay ceiling in microseconds.
    pub delay_us: u64,
}

// Default value functions
fn default_mask() -> Ipv4Addr {
    Ipv4Addr::new(255, 255, 255, 252)
}
fn default_cost() -> u16 {
    1
}
fn default_protocol() -> u8 {
    17
}

impl ScenarioConfig {
    /// Load a scenario from a TOML file and validate its protocol settings.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: ScenarioConfig = toml::from_str(&contents)?;
        config.qospf.validate()?;
        Ok(config)
    }

    /// Save the scenario to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Three routers in a line with one request across them.
    pub fn example() -> Self {
        let link = |index: u8, address: [u8; 4], neighbor: u8| InterfaceConfig {
            index,
            address: Ipv4Addr::from(address),
            mask: default_mask(),
            neighbor: Ipv4Addr::new(10, 0, 0, neighbor),
            bandwidth_bps: 10_000_000,
            delay_us: 5_000,
            utilized_bps: 0,
            queueing_delay_us: 0,
            cost: default_cost(),
        };

        Self {
            lsdb_hex: None,
            qospf: QospfConfig {
                queues_per_interface: 1,
                ..QospfConfig::default()
            },
            routers: vec![
                RouterConfig {
                    id: Ipv4Addr::new(10, 0, 0, 1),
                    interfaces: vec![link(0, [192, 168, 12, 1], 2)],
                },
                RouterConfig {
                    id: Ipv4Addr::new(10, 0, 0, 2),
                    interfaces: vec![
                        link(0, [192, 168, 12, 2], 1),
                        link(1, [192, 168, 23, 1], 3),
                    ],
                },
                RouterConfig {
                    id: Ipv4Addr::new(10, 0, 0, 3),
                    interfaces: vec![link(0, [192, 168, 23, 2], 2)],
                },
            ],
            requests: vec![RequestConfig {
                source: Ipv4Addr::new(192, 168, 12, 1),
                destination: Ipv4Addr::new(192, 168, 23, 2),
                source_port: 5000,
                destination_port: 5001,
                protocol: default_protocol(),
                priority: 0,
                bandwidth_bps: 5_000_000,
                delay_us: 20_000,
            }],
        }
    }
}
