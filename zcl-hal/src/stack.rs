//! The vendor stack boundary.

use relay_data_model::DataType;

use crate::arena::{ClusterInfo, EndpointDescriptor};
use crate::error::StackError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    ClientToServer,
    ServerToClient,
}

/// Destination addressing for outbound frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// No destination address: the stack fans out over its binding table.
    #[default]
    Bindings,
}

/// One endpoint's slice of the arena, as handed to the stack.
#[derive(Debug, Clone, Copy)]
pub struct EndpointRegistration<'t> {
    pub descriptor: &'t EndpointDescriptor,
    pub in_clusters: &'t [u16],
    pub out_clusters: &'t [u16],
    pub clusters: &'t [ClusterInfo],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendRequest<'p> {
    pub endpoint: u8,
    pub address_mode: AddressMode,
    pub profile_id: u16,
    pub cluster_id: u16,
    pub command_id: u8,
    pub cluster_specific: bool,
    pub direction: Direction,
    pub disable_default_response: bool,
    pub manufacturer_code: u16,
    pub payload: &'p [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRequest<'p> {
    pub endpoint: u8,
    pub address_mode: AddressMode,
    pub profile_id: u16,
    pub cluster_id: u16,
    pub attribute_id: u16,
    pub data_type: DataType,
    pub value: &'p [u8],
}

/// Primitives a vendor ZCL stack has to provide.
///
/// Calls are synchronous and run to completion; delivery, retries and
/// timeouts belong to the stack.
pub trait ZclStack {
    /// Brings up the ZCL layer and its reporting table.
    fn start(&mut self) -> Result<(), StackError>;

    fn register_endpoint(
        &mut self,
        registration: EndpointRegistration<'_>,
    ) -> Result<(), StackError>;

    /// Queues a command for transmission.
    fn send_command(&mut self, request: &SendRequest<'_>) -> Result<(), StackError>;

    /// Queues an attribute report for transmission.
    fn send_report(&mut self, request: &ReportRequest<'_>) -> Result<(), StackError>;

    fn is_joined(&self) -> bool;

    /// Lets the stack's scheduled reporting look at attribute values again.
    fn schedule_reporting(&mut self);
}
