//! Cluster id keyed registry and the (endpoint, cluster) index.

use relay_data_model::ids::cluster_id;
use relay_data_model::Cluster;

use crate::arena::{Table, MAX_CLUSTER_INFOS};
use crate::error::ConfigError;

/// Cluster implementations the vendor stack ships with.
///
/// Stack adapters translate each variant into the stack's own register call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorCluster {
    Basic,
    Identify,
    Groups,
    OnOffSwitchConfig,
    LevelControl,
    OnOff,
    MultistateInput,
}

/// How a cluster id is wired into the vendor stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClusterBinding {
    /// `None`: the stack stores the attributes but runs no cluster logic.
    pub registration: Option<VendorCluster>,
    /// Whether the stack hands cluster-specific commands to the dispatcher.
    pub forwards_commands: bool,
}

/// Resolves the vendor wiring for a cluster id.
///
/// Unknown ids are accepted and map to "no handler"; pure reporting clusters
/// need nothing more.
pub fn cluster_binding(id: u16) -> ClusterBinding {
    let registration = match id {
        cluster_id::BASIC => Some(VendorCluster::Basic),
        cluster_id::IDENTIFY => Some(VendorCluster::Identify),
        cluster_id::GROUPS => Some(VendorCluster::Groups),
        cluster_id::ON_OFF_SWITCH_CONFIG => Some(VendorCluster::OnOffSwitchConfig),
        cluster_id::LEVEL_CONTROL => Some(VendorCluster::LevelControl),
        cluster_id::ON_OFF => Some(VendorCluster::OnOff),
        cluster_id::MULTISTATE_INPUT => Some(VendorCluster::MultistateInput),
        _ => None,
    };
    ClusterBinding {
        registration,
        forwards_commands: id == cluster_id::ON_OFF,
    }
}

#[derive(Debug, Clone, Copy)]
struct ClusterEntry<'a> {
    endpoint: u8,
    cluster_id: u16,
    cluster: &'a Cluster<'a>,
}

/// Maps (endpoint, cluster id) to the device model cluster.
#[derive(Debug, Default)]
pub struct ClusterIndex<'a> {
    entries: heapless::Vec<ClusterEntry<'a>, MAX_CLUSTER_INFOS>,
}

impl<'a> ClusterIndex<'a> {
    pub fn new() -> Self {
        Self {
            entries: heapless::Vec::new(),
        }
    }

    pub fn find(&self, endpoint: u8, cluster_id: u16) -> Option<&'a Cluster<'a>> {
        self.entries
            .iter()
            .find(|e| e.endpoint == endpoint && e.cluster_id == cluster_id)
            .map(|e| e.cluster)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(
        &mut self,
        endpoint: u8,
        cluster: &'a Cluster<'a>,
    ) -> Result<(), ConfigError> {
        if self.find(endpoint, cluster.id).is_some() {
            return Err(ConfigError::DuplicateCluster {
                endpoint,
                cluster_id: cluster.id,
            });
        }
        self.entries
            .push(ClusterEntry {
                endpoint,
                cluster_id: cluster.id,
                cluster,
            })
            .map_err(|_| ConfigError::CapacityExceeded {
                table: Table::ClusterInfos,
                limit: MAX_CLUSTER_INFOS,
            })
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
