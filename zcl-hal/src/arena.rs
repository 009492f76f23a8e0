//! Fixed-capacity backing storage for the tables handed to the vendor stack.
//!
//! Tables reference each other through [`TableSpan`]s and [`AttributeHandle`]s
//! rather than pointers. Every insert is checked against the compile-time
//! maxima and reports [`ConfigError::CapacityExceeded`] instead of overrunning.

use core::fmt;
use core::ops::Range;

use bitflags::bitflags;
use relay_data_model::{AttributePath, AttributeValue, DataType};

use crate::error::{AttributeError, ConfigError};
use crate::lookup::ClusterBinding;

pub const MAX_ENDPOINTS: usize = 8;
pub const MAX_IN_CLUSTERS: usize = 32;
pub const MAX_OUT_CLUSTERS: usize = 16;
pub const MAX_CLUSTER_INFOS: usize = MAX_IN_CLUSTERS + MAX_OUT_CLUSTERS;
pub const MAX_ATTRS: usize = 96;

const _: () = assert!(MAX_ATTRS <= u16::MAX as usize);

/// Names a table in capacity errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Endpoints,
    InClusters,
    OutClusters,
    ClusterInfos,
    Attributes,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::Endpoints => "endpoint descriptor",
            Table::InClusters => "input cluster",
            Table::OutClusters => "output cluster",
            Table::ClusterInfos => "cluster info",
            Table::Attributes => "attribute",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Access rights as laid out by the vendor attribute table.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u8 {
        const READ = 0x01;
        const WRITE = 0x02;
        const REPORTABLE = 0x04;
    }
}

/// Contiguous run of entries in one of the arena tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableSpan {
    pub start: usize,
    pub len: usize,
}

impl TableSpan {
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

/// Index of an attribute's live value in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeHandle(u16);

impl AttributeHandle {
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub endpoint: u8,
    pub profile_id: u16,
    pub device_id: u16,
    pub device_version: u8,
    pub in_clusters: TableSpan,
    pub out_clusters: TableSpan,
    /// Cluster info entries built for this endpoint. OTA clusters have none.
    pub cluster_infos: TableSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterInfo {
    pub endpoint: u8,
    pub cluster_id: u16,
    pub manufacturer_code: u16,
    pub attributes: TableSpan,
    pub binding: ClusterBinding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub id: u16,
    pub data_type: DataType,
    pub access: AccessFlags,
    pub value: AttributeValue,
}

impl AttributeInfo {
    pub fn access_for(writable: bool) -> AccessFlags {
        let mut access = AccessFlags::READ | AccessFlags::REPORTABLE;
        if writable {
            access |= AccessFlags::WRITE;
        }
        access
    }
}

/// Attribute entries and their live values.
#[derive(Debug, Default)]
pub struct AttributeTable {
    entries: heapless::Vec<AttributeInfo, MAX_ATTRS>,
}

impl AttributeTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeInfo> {
        self.entries.iter()
    }

    pub fn get(&self, handle: AttributeHandle) -> Option<&AttributeInfo> {
        self.entries.get(handle.index())
    }

    pub fn value(&self, handle: AttributeHandle) -> Option<&AttributeValue> {
        self.get(handle).map(|info| &info.value)
    }

    /// Replaces a live value in place. Access rights are not checked; local
    /// logic may update attributes the network can only read.
    pub fn write(&mut self, handle: AttributeHandle, bytes: &[u8]) -> Result<(), AttributeError> {
        let Some(entry) = self.entries.get_mut(handle.index()) else {
            return Err(AttributeError::InvalidHandle(handle.index()));
        };
        entry.value = AttributeValue::typed(entry.data_type, bytes)?;
        Ok(())
    }

    fn entries(&self, span: TableSpan) -> &[AttributeInfo] {
        &self.entries[span.range()]
    }

    fn push(&mut self, info: AttributeInfo) -> Result<AttributeHandle, ConfigError> {
        let handle = AttributeHandle(self.entries.len() as u16);
        self.entries
            .push(info)
            .map_err(|_| capacity(Table::Attributes, MAX_ATTRS))?;
        Ok(handle)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Every table the vendor stack is given, in one fixed-size block.
#[derive(Debug, Default)]
pub struct TableArena {
    descriptors: heapless::Vec<EndpointDescriptor, MAX_ENDPOINTS>,
    in_clusters: heapless::Vec<u16, MAX_IN_CLUSTERS>,
    out_clusters: heapless::Vec<u16, MAX_OUT_CLUSTERS>,
    cluster_infos: heapless::Vec<ClusterInfo, MAX_CLUSTER_INFOS>,
    attributes: AttributeTable,
}

fn capacity(table: Table, limit: usize) -> ConfigError {
    ConfigError::CapacityExceeded { table, limit }
}

impl TableArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptors(&self) -> &[EndpointDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, endpoint: u8) -> Option<&EndpointDescriptor> {
        self.descriptors.iter().find(|d| d.endpoint == endpoint)
    }

    pub fn in_clusters(&self, descriptor: &EndpointDescriptor) -> &[u16] {
        &self.in_clusters[descriptor.in_clusters.range()]
    }

    pub fn out_clusters(&self, descriptor: &EndpointDescriptor) -> &[u16] {
        &self.out_clusters[descriptor.out_clusters.range()]
    }

    pub fn cluster_infos(&self, descriptor: &EndpointDescriptor) -> &[ClusterInfo] {
        &self.cluster_infos[descriptor.cluster_infos.range()]
    }

    pub fn all_cluster_infos(&self) -> &[ClusterInfo] {
        &self.cluster_infos
    }

    pub fn cluster_info(&self, endpoint: u8, cluster_id: u16) -> Option<&ClusterInfo> {
        let descriptor = self.descriptor(endpoint)?;
        self.cluster_infos(descriptor)
            .iter()
            .find(|c| c.cluster_id == cluster_id)
    }

    pub fn cluster_attributes(&self, info: &ClusterInfo) -> &[AttributeInfo] {
        self.attributes.entries(info.attributes)
    }

    /// Resolves an attribute to the handle of its live value.
    pub fn find_attribute(&self, path: AttributePath) -> Option<AttributeHandle> {
        let info = self.cluster_info(path.endpoint, path.cluster_id)?;
        self.cluster_attributes(info)
            .iter()
            .position(|a| a.id == path.attribute_id)
            .map(|offset| AttributeHandle((info.attributes.start + offset) as u16))
    }

    pub fn attributes(&self) -> &AttributeTable {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeTable {
        &mut self.attributes
    }

    pub(crate) fn in_cluster_len(&self) -> usize {
        self.in_clusters.len()
    }

    pub(crate) fn out_cluster_len(&self) -> usize {
        self.out_clusters.len()
    }

    pub(crate) fn cluster_info_len(&self) -> usize {
        self.cluster_infos.len()
    }

    pub(crate) fn attribute_len(&self) -> usize {
        self.attributes.len()
    }

    pub(crate) fn push_descriptor(
        &mut self,
        descriptor: EndpointDescriptor,
    ) -> Result<(), ConfigError> {
        self.descriptors
            .push(descriptor)
            .map_err(|_| capacity(Table::Endpoints, MAX_ENDPOINTS))
    }

    pub(crate) fn push_in_cluster(&mut self, cluster_id: u16) -> Result<(), ConfigError> {
        self.in_clusters
            .push(cluster_id)
            .map_err(|_| capacity(Table::InClusters, MAX_IN_CLUSTERS))
    }

    pub(crate) fn push_out_cluster(&mut self, cluster_id: u16) -> Result<(), ConfigError> {
        self.out_clusters
            .push(cluster_id)
            .map_err(|_| capacity(Table::OutClusters, MAX_OUT_CLUSTERS))
    }

    pub(crate) fn push_cluster_info(&mut self, info: ClusterInfo) -> Result<(), ConfigError> {
        self.cluster_infos
            .push(info)
            .map_err(|_| capacity(Table::ClusterInfos, MAX_CLUSTER_INFOS))
    }

    pub(crate) fn push_attribute(
        &mut self,
        info: AttributeInfo,
    ) -> Result<AttributeHandle, ConfigError> {
        self.attributes.push(info)
    }

    pub(crate) fn clear(&mut self) {
        self.descriptors.clear();
        self.in_clusters.clear();
        self.out_clusters.clear();
        self.cluster_infos.clear();
        self.attributes.clear();
    }
}
