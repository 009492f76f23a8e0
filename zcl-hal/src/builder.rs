//! Projects the device model into the arena.
//!
//! Building touches only the arena and the cluster index; the vendor stack is
//! called by the context once the whole model has been accepted.

use relay_data_model::ids::cluster_id;
use relay_data_model::{AttributePath, AttributeValue, Cluster, ClusterRole, Endpoint};
use tracing::{debug, trace};

use crate::arena::{AttributeInfo, ClusterInfo, EndpointDescriptor, TableArena, TableSpan};
use crate::config::HalConfig;
use crate::error::ConfigError;
use crate::lookup::{cluster_binding, ClusterIndex};

const ENDPOINT_RANGE: core::ops::RangeInclusive<u8> = 1..=240;

pub(crate) fn build<'a>(
    endpoints: &'a [Endpoint<'a>],
    config: &HalConfig,
    arena: &mut TableArena,
    index: &mut ClusterIndex<'a>,
) -> Result<(), ConfigError> {
    for endpoint in endpoints {
        build_endpoint(endpoint, config, arena, index)?;
    }
    Ok(())
}

fn build_endpoint<'a>(
    endpoint: &'a Endpoint<'a>,
    config: &HalConfig,
    arena: &mut TableArena,
    index: &mut ClusterIndex<'a>,
) -> Result<(), ConfigError> {
    if !ENDPOINT_RANGE.contains(&endpoint.id) {
        return Err(ConfigError::InvalidEndpoint(endpoint.id));
    }
    if arena.descriptor(endpoint.id).is_some() {
        return Err(ConfigError::DuplicateEndpoint(endpoint.id));
    }

    let in_start = arena.in_cluster_len();
    let out_start = arena.out_cluster_len();
    let info_start = arena.cluster_info_len();

    for cluster in endpoint.clusters {
        index.insert(endpoint.id, cluster)?;
        match cluster.role {
            ClusterRole::Server => arena.push_in_cluster(cluster.id)?,
            ClusterRole::Client => arena.push_out_cluster(cluster.id)?,
        }
        // Advertised, but owned by the OTA collaborator.
        if cluster.id == cluster_id::OTA {
            trace!(endpoint = endpoint.id, "leaving OTA cluster to its own handler");
            continue;
        }
        let info = build_cluster(endpoint.id, cluster, config, arena)?;
        arena.push_cluster_info(info)?;
    }

    let descriptor = EndpointDescriptor {
        endpoint: endpoint.id,
        profile_id: endpoint.profile_id,
        device_id: endpoint.device_id,
        device_version: endpoint.device_version,
        in_clusters: span_from(in_start, arena.in_cluster_len()),
        out_clusters: span_from(out_start, arena.out_cluster_len()),
        cluster_infos: span_from(info_start, arena.cluster_info_len()),
    };
    debug!(
        endpoint = endpoint.id,
        in_clusters = descriptor.in_clusters.len,
        out_clusters = descriptor.out_clusters.len,
        "endpoint projected"
    );
    arena.push_descriptor(descriptor)
}

fn build_cluster(
    endpoint: u8,
    cluster: &Cluster<'_>,
    config: &HalConfig,
    arena: &mut TableArena,
) -> Result<ClusterInfo, ConfigError> {
    let attr_start = arena.attribute_len();
    for (i, attr) in cluster.attributes.iter().enumerate() {
        let path = AttributePath::new(endpoint, cluster.id, attr.id);
        if cluster.attributes[..i].iter().any(|a| a.id == attr.id) {
            return Err(ConfigError::DuplicateAttribute(path));
        }
        let value = AttributeValue::typed(attr.data_type, attr.default)
            .map_err(|source| ConfigError::InvalidDefault { path, source })?;
        arena.push_attribute(AttributeInfo {
            id: attr.id,
            data_type: attr.data_type,
            access: AttributeInfo::access_for(attr.is_writable()),
            value,
        })?;
    }
    Ok(ClusterInfo {
        endpoint,
        cluster_id: cluster.id,
        manufacturer_code: config.manufacturer_code,
        attributes: span_from(attr_start, arena.attribute_len()),
        binding: cluster_binding(cluster.id),
    })
}

fn span_from(start: usize, end: usize) -> TableSpan {
    TableSpan {
        start,
        len: end - start,
    }
}
