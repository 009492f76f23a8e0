//! Sample relay board: a root endpoint, one endpoint per relay and a wall
//! switch endpoint.

use std::cell::Cell;

use relay_data_model::ids::{
    basic, cluster_id, device_id, multistate_input, on_off, on_off_switch_config, profile_id,
};
use relay_data_model::{
    Attribute, Cluster, CommandHandler, DataType, Endpoint, IncomingCommand, Mutability, ZclStatus,
};
use tracing::info;

pub const ROOT_ENDPOINT: u8 = 1;
pub const FIRST_RELAY_ENDPOINT: u8 = 2;

const BASIC_ATTRS: &[Attribute<'static>] = &[
    Attribute::new(basic::ATTR_ZCL_VERSION, DataType::Uint8, Mutability::ReadOnly, &[3]),
    Attribute::new(basic::ATTR_APPLICATION_VERSION, DataType::Uint8, Mutability::ReadOnly, &[1]),
    Attribute::new(
        basic::ATTR_MANUFACTURER_NAME,
        DataType::CharString,
        Mutability::ReadOnly,
        b"\x09OpenRelay",
    ),
    Attribute::new(
        basic::ATTR_MODEL_IDENTIFIER,
        DataType::CharString,
        Mutability::ReadOnly,
        b"\x08ZR-STUB1",
    ),
    // Mains, single phase
    Attribute::new(basic::ATTR_POWER_SOURCE, DataType::Enum8, Mutability::ReadOnly, &[0x01]),
];

const IDENTIFY_ATTRS: &[Attribute<'static>] =
    &[Attribute::new(0x0000, DataType::Uint16, Mutability::Writable, &[0, 0])];

const RELAY_ON_OFF_ATTRS: &[Attribute<'static>] =
    &[Attribute::new(on_off::ATTR_ON_OFF, DataType::Bool, Mutability::Writable, &[0])];

const SWITCH_CONFIG_ATTRS: &[Attribute<'static>] = &[
    // Toggle switch
    Attribute::new(
        on_off_switch_config::ATTR_SWITCH_TYPE,
        DataType::Enum8,
        Mutability::ReadOnly,
        &[0x00],
    ),
    Attribute::new(
        on_off_switch_config::ATTR_SWITCH_ACTIONS,
        DataType::Enum8,
        Mutability::Writable,
        &[0x02],
    ),
];

const MULTISTATE_ATTRS: &[Attribute<'static>] = &[
    // Released, single press, double press
    Attribute::new(
        multistate_input::ATTR_NUMBER_OF_STATES,
        DataType::Uint16,
        Mutability::ReadOnly,
        &[3, 0],
    ),
    Attribute::new(
        multistate_input::ATTR_PRESENT_VALUE,
        DataType::Uint16,
        Mutability::ReadOnly,
        &[0, 0],
    ),
];

const RELAY_COMMANDS: &[u8] = &[on_off::CMD_OFF, on_off::CMD_ON, on_off::CMD_TOGGLE];

/// Output state of one relay channel.
///
/// Command handling only records the new state; the runner pushes it into
/// the attribute table afterwards.
#[derive(Debug, Default)]
pub struct RelayState {
    pub endpoint: u8,
    on: Cell<bool>,
    dirty: Cell<bool>,
}

impl RelayState {
    pub fn new(endpoint: u8) -> Self {
        Self {
            endpoint,
            ..Default::default()
        }
    }

    pub fn is_on(&self) -> bool {
        self.on.get()
    }

    /// Follows a value written over the network. Already reflected in the
    /// attribute table, so not marked dirty.
    pub fn follow(&self, on: bool) {
        if self.on.replace(on) != on {
            info!(endpoint = self.endpoint, on, "relay switched by attribute write");
        }
    }

    /// Returns the state to publish if a command changed it.
    pub fn take_change(&self) -> Option<bool> {
        self.dirty.replace(false).then(|| self.on.get())
    }
}

impl CommandHandler for RelayState {
    fn handle(&self, cmd: &IncomingCommand<'_>) -> ZclStatus {
        let next = match cmd.command_id {
            on_off::CMD_OFF => false,
            on_off::CMD_ON => true,
            on_off::CMD_TOGGLE => !self.on.get(),
            _ => return ZclStatus::UnsupClusterCommand,
        };
        self.on.set(next);
        self.dirty.set(true);
        info!(endpoint = self.endpoint, on = next, "relay switched by command");
        ZclStatus::Success
    }
}

pub fn relays(count: u8) -> Vec<RelayState> {
    (0..count)
        .map(|i| RelayState::new(FIRST_RELAY_ENDPOINT + i))
        .collect()
}

pub fn root_clusters() -> [Cluster<'static>; 2] {
    [
        Cluster::server(cluster_id::BASIC, BASIC_ATTRS),
        Cluster::server(cluster_id::IDENTIFY, IDENTIFY_ATTRS),
    ]
}

pub fn relay_clusters(relays: &[RelayState]) -> Vec<[Cluster<'_>; 2]> {
    relays
        .iter()
        .map(|relay| {
            [
                Cluster::server(cluster_id::ON_OFF, RELAY_ON_OFF_ATTRS)
                    .with_handler(relay)
                    .with_accepted_commands(RELAY_COMMANDS),
                Cluster::server(cluster_id::ON_OFF_SWITCH_CONFIG, SWITCH_CONFIG_ATTRS),
            ]
        })
        .collect()
}

pub fn switch_clusters() -> [Cluster<'static>; 2] {
    [
        Cluster::client(cluster_id::ON_OFF, &[]),
        Cluster::server(cluster_id::MULTISTATE_INPUT, MULTISTATE_ATTRS),
    ]
}

/// Endpoint id the switch lands on for a given relay count.
pub fn switch_endpoint(relay_count: u8) -> u8 {
    FIRST_RELAY_ENDPOINT + relay_count
}

pub fn endpoints<'a>(
    root: &'a [Cluster<'a>],
    relays: &'a [[Cluster<'a>; 2]],
    switch: &'a [Cluster<'a>],
) -> Vec<Endpoint<'a>> {
    let mut endpoints = vec![Endpoint {
        id: ROOT_ENDPOINT,
        profile_id: profile_id::HOME_AUTOMATION,
        device_id: device_id::ON_OFF_OUTPUT,
        device_version: 1,
        clusters: root,
    }];
    endpoints.extend(relays.iter().enumerate().map(|(i, clusters)| Endpoint {
        id: FIRST_RELAY_ENDPOINT + i as u8,
        profile_id: profile_id::HOME_AUTOMATION,
        device_id: device_id::ON_OFF_OUTPUT,
        device_version: 1,
        clusters: clusters.as_slice(),
    }));
    endpoints.push(Endpoint {
        id: FIRST_RELAY_ENDPOINT + relays.len() as u8,
        profile_id: profile_id::HOME_AUTOMATION,
        device_id: device_id::ON_OFF_SWITCH,
        device_version: 1,
        clusters: switch,
    });
    endpoints
}
