use core::fmt;

use crate::data_type::DataType;
use crate::status::ZclStatus;

/// Which side of a cluster an endpoint implements.
///
/// Server clusters are advertised as input clusters, client clusters as output clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ClusterRole {
    #[default]
    Server,
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Mutability {
    #[default]
    ReadOnly,
    Writable,
}

/// Fully qualified address of one attribute on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributePath {
    pub endpoint: u8,
    pub cluster_id: u16,
    pub attribute_id: u16,
}

impl AttributePath {
    pub const fn new(endpoint: u8, cluster_id: u16, attribute_id: u16) -> Self {
        Self {
            endpoint,
            cluster_id,
            attribute_id,
        }
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/0x{:04x}/0x{:04x}",
            self.endpoint, self.cluster_id, self.attribute_id
        )
    }
}

/// A cluster-specific command received from the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomingCommand<'a> {
    pub endpoint: u8,
    pub cluster_id: u16,
    pub command_id: u8,
    pub payload: &'a [u8],
}

/// Application behaviour behind a cluster.
///
/// Handlers run on the stack's receive path and must not block. Mutable
/// application state goes behind a `Cell`/`RefCell`; everything executes on
/// one thread of control.
pub trait CommandHandler {
    fn handle(&self, cmd: &IncomingCommand<'_>) -> ZclStatus;
}

impl<F> CommandHandler for F
where
    F: Fn(&IncomingCommand<'_>) -> ZclStatus,
{
    fn handle(&self, cmd: &IncomingCommand<'_>) -> ZclStatus {
        self(cmd)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub id: u16,
    pub data_type: DataType,
    pub mutability: Mutability,
    /// ZCL-encoded value the attribute starts with.
    pub default: &'a [u8],
}

impl<'a> Attribute<'a> {
    pub const fn new(
        id: u16,
        data_type: DataType,
        mutability: Mutability,
        default: &'a [u8],
    ) -> Self {
        Self {
            id,
            data_type,
            mutability,
            default,
        }
    }

    pub fn is_writable(&self) -> bool {
        self.mutability == Mutability::Writable
    }

    pub fn default_matches_type(&self) -> bool {
        self.data_type.accepts(self.default)
    }
}

#[derive(Clone, Copy)]
pub struct Cluster<'a> {
    pub id: u16,
    pub role: ClusterRole,
    pub attributes: &'a [Attribute<'a>],
    pub handler: Option<&'a dyn CommandHandler>,
    /// Command ids this cluster declares. Empty means "not declared".
    pub accepted_commands: &'a [u8],
}

impl<'a> Cluster<'a> {
    pub const fn server(id: u16, attributes: &'a [Attribute<'a>]) -> Self {
        Self {
            id,
            role: ClusterRole::Server,
            attributes,
            handler: None,
            accepted_commands: &[],
        }
    }

    pub const fn client(id: u16, attributes: &'a [Attribute<'a>]) -> Self {
        Self {
            id,
            role: ClusterRole::Client,
            attributes,
            handler: None,
            accepted_commands: &[],
        }
    }

    pub const fn with_handler(mut self, handler: &'a dyn CommandHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub const fn with_accepted_commands(mut self, commands: &'a [u8]) -> Self {
        self.accepted_commands = commands;
        self
    }

    pub fn attribute(&self, id: u16) -> Option<&Attribute<'a>> {
        self.attributes.iter().find(|a| a.id == id)
    }
}

impl fmt::Debug for Cluster<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cluster")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("attributes", &self.attributes)
            .field("handler", &self.handler.is_some())
            .field("accepted_commands", &self.accepted_commands)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Endpoint<'a> {
    pub id: u8,
    pub profile_id: u16,
    pub device_id: u16,
    pub device_version: u8,
    pub clusters: &'a [Cluster<'a>],
}

impl<'a> Endpoint<'a> {
    pub fn cluster(&self, id: u16) -> Option<&Cluster<'a>> {
        self.clusters.iter().find(|c| c.id == id)
    }

    pub fn attribute_count(&self) -> usize {
        self.clusters.iter().map(|c| c.attributes.len()).sum()
    }
}
