use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use dashmap::DashMap;
use qospf_core::lsa::{self, Lsa, LsaType};
use qospf_core::{RouterId, RouterLsa};

use crate::error::RoutingError;

/// Read access to the router advertisements of one area.
///
/// Advertisements are returned in installation order; vertex numbering
/// follows this order.
pub trait AreaLsdb {
    fn router_advertisements(&self) -> Vec<RouterLsa>;
}

impl AreaLsdb for [RouterLsa] {
    fn router_advertisements(&self) -> Vec<RouterLsa> {
        self.to_vec()
    }
}

impl AreaLsdb for Vec<RouterLsa> {
    fn router_advertisements(&self) -> Vec<RouterLsa> {
        self.clone()
    }
}

/// Identity of an advertisement instance: (type code, link-state ID, advertising router).
type LsaKey = (u8, Ipv4Addr, RouterId);

#[derive(Debug, Clone)]
struct StoredLsa {
    order: u64,
    lsa: Lsa,
}

/// An in-memory single-area link-state database backed by DashMap.
///
/// Newer instances (by sequence number) replace older ones but keep the
/// slot of the first installation, so iteration order is stable.
pub struct LinkStateDatabase {
    entries: DashMap<LsaKey, StoredLsa>,
    next_order: AtomicU64,
}

impl LinkStateDatabase {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_order: AtomicU64::new(0),
        }
    }

    /// Install an advertisement. Returns `true` if it was new or newer than
    /// the stored instance.
    pub fn install(&self, lsa: Lsa) -> bool {
        let key = (
            lsa.header.lsa_type.to_u8(),
            lsa.header.link_state_id,
            lsa.header.advertising_router,
        );

        if let Some(mut stored) = self.entries.get_mut(&key) {
            if !is_newer(lsa.header.sequence_number, stored.lsa.header.sequence_number) {
                tracing::debug!(
                    router = %lsa.header.advertising_router,
                    seq = lsa.header.sequence_number,
                    "ignoring stale or duplicate advertisement"
                );
                return false;
            }
            stored.lsa = lsa;
            return true;
        }

        let order = self.next_order.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(router = %key.2, lsa_type = key.0, order, "installing advertisement");
        self.entries.insert(key, StoredLsa { order, lsa });
        true
    }

    pub fn install_router(&self, router: &RouterLsa) -> bool {
        self.install(router.to_lsa())
    }

    /// Decode a back-to-back stream of advertisements and install each.
    /// Returns how many were installed.
    pub fn install_from_wire(&self, bytes: Bytes) -> Result<usize, RoutingError> {
        let lsas = lsa::decode_stream(bytes)?;
        let installed = lsas
            .into_iter()
            .map(|l| self.install(l))
            .filter(|&installed| installed)
            .count();
        Ok(installed)
    }

    /// Remove the advertisement with the given identity.
    pub fn remove(&self, lsa_type: LsaType, link_state_id: Ipv4Addr, router: RouterId) -> Option<Lsa> {
        self.entries
            .remove(&(lsa_type.to_u8(), link_state_id, router))
            .map(|(_k, v)| v.lsa)
    }

    /// All advertisements in installation order.
    pub fn advertisements(&self) -> Vec<Lsa> {
        let mut stored: Vec<StoredLsa> = self.entries.iter().map(|r| r.value().clone()).collect();
        stored.sort_by_key(|s| s.order);
        stored.into_iter().map(|s| s.lsa).collect()
    }

    /// Encode the whole database as a back-to-back stream.
    pub fn to_wire(&self) -> Bytes {
        let lsas = self.advertisements();
        lsa::encode_stream(lsas.iter())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LinkStateDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl AreaLsdb for LinkStateDatabase {
    fn router_advertisements(&self) -> Vec<RouterLsa> {
        self.advertisements().iter().filter_map(Lsa::router).collect()
    }
}

/// Sequence numbers are signed, starting from the most negative usable value.
fn is_newer(candidate: u32, stored: u32) -> bool {
    (candidate as i32) > (stored as i32)
}
