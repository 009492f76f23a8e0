//! Host-side stand-in for a vendor ZCL stack.
//!
//! Records everything the layer asks of it and drives inbound traffic the
//! way a vendor receive path would. Used by tests and the stub platform.

use relay_data_model::{AttributePath, DataType, IncomingCommand, ZclStatus};
use tracing::{debug, trace};

use crate::arena::{AccessFlags, ClusterInfo, EndpointDescriptor};
use crate::context::ZclContext;
use crate::dispatch::{GlobalCommand, IncomingMessage, WriteRecord};
use crate::error::StackError;
use crate::stack::{
    AddressMode, Direction, EndpointRegistration, ReportRequest, SendRequest, ZclStack,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredEndpoint {
    pub descriptor: EndpointDescriptor,
    pub in_clusters: Vec<u16>,
    pub out_clusters: Vec<u16>,
    pub clusters: Vec<ClusterInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCommand {
    pub endpoint: u8,
    pub address_mode: AddressMode,
    pub profile_id: u16,
    pub cluster_id: u16,
    pub command_id: u8,
    pub cluster_specific: bool,
    pub direction: Direction,
    pub disable_default_response: bool,
    pub manufacturer_code: u16,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReport {
    pub endpoint: u8,
    pub address_mode: AddressMode,
    pub profile_id: u16,
    pub cluster_id: u16,
    pub attribute_id: u16,
    pub data_type: DataType,
    pub value: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct SimStack {
    started: bool,
    joined: bool,
    registrations: Vec<RegisteredEndpoint>,
    sent: Vec<SentCommand>,
    reports: Vec<SentReport>,
    reporting_triggers: usize,
    fail_next_send: Option<StackError>,
}

impl SimStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn set_joined(&mut self, joined: bool) {
        self.joined = joined;
    }

    /// Makes the next send or report fail with `err`.
    pub fn fail_next_send(&mut self, err: StackError) {
        self.fail_next_send = Some(err);
    }

    pub fn registrations(&self) -> &[RegisteredEndpoint] {
        &self.registrations
    }

    pub fn registration(&self, endpoint: u8) -> Option<&RegisteredEndpoint> {
        self.registrations
            .iter()
            .find(|r| r.descriptor.endpoint == endpoint)
    }

    pub fn sent_commands(&self) -> &[SentCommand] {
        &self.sent
    }

    pub fn reports(&self) -> &[SentReport] {
        &self.reports
    }

    pub fn reporting_triggers(&self) -> usize {
        self.reporting_triggers
    }

    fn registered_cluster(&self, endpoint: u8, cluster_id: u16) -> Option<&ClusterInfo> {
        self.registration(endpoint)?
            .clusters
            .iter()
            .find(|c| c.cluster_id == cluster_id)
    }

    fn check_send(&mut self) -> Result<(), StackError> {
        if !self.started {
            return Err(StackError::NotStarted);
        }
        match self.fail_next_send.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Receives a write attributes command.
    ///
    /// Each record is applied to the live value behind its attribute handle,
    /// then the layer's attribute-write notifier runs over the whole payload.
    /// Returns the per-record statuses a write response would carry.
    pub fn deliver_write(
        &mut self,
        ctx: &mut ZclContext<'_>,
        endpoint: u8,
        cluster_id: u16,
        records: &[WriteRecord<'_>],
        respond: bool,
    ) -> Vec<(u16, ZclStatus)> {
        let statuses = records
            .iter()
            .map(|record| {
                let path = AttributePath::new(endpoint, cluster_id, record.attribute_id);
                let status = apply_write(ctx, path, record);
                trace!(%path, ?status, "write applied");
                (record.attribute_id, status)
            })
            .collect();

        let command = if respond {
            GlobalCommand::Write(records)
        } else {
            GlobalCommand::WriteNoResponse(records)
        };
        ctx.on_incoming_message(&IncomingMessage {
            endpoint,
            cluster_id,
            command,
        });
        statuses
    }

    /// Receives a cluster-specific command.
    ///
    /// Only clusters whose binding forwards commands reach the dispatcher;
    /// the stack answers for the rest itself.
    pub fn deliver_command(
        &mut self,
        ctx: &ZclContext<'_>,
        cmd: &IncomingCommand<'_>,
    ) -> ZclStatus {
        match self.registered_cluster(cmd.endpoint, cmd.cluster_id) {
            Some(info) if info.binding.forwards_commands => ctx.dispatch_command(cmd),
            Some(_) => ZclStatus::Success,
            None => ZclStatus::UnsupClusterCommand,
        }
    }
}

fn apply_write(
    ctx: &mut ZclContext<'_>,
    path: AttributePath,
    record: &WriteRecord<'_>,
) -> ZclStatus {
    let Some(handle) = ctx.find_attribute(path) else {
        return ZclStatus::UnsupportedAttribute;
    };
    let Some(info) = ctx.attributes().get(handle) else {
        return ZclStatus::UnsupportedAttribute;
    };
    if !info.access.contains(AccessFlags::WRITE) {
        return ZclStatus::ReadOnly;
    }
    if DataType::from_id(record.data_type) != Some(info.data_type) {
        return ZclStatus::InvalidDataType;
    }
    match ctx.attributes_mut().write(handle, record.value) {
        Ok(()) => ZclStatus::Success,
        Err(_) => ZclStatus::InvalidValue,
    }
}

impl ZclStack for SimStack {
    fn start(&mut self) -> Result<(), StackError> {
        self.started = true;
        Ok(())
    }

    fn register_endpoint(
        &mut self,
        registration: EndpointRegistration<'_>,
    ) -> Result<(), StackError> {
        if !self.started {
            return Err(StackError::NotStarted);
        }
        debug!(
            endpoint = registration.descriptor.endpoint,
            clusters = registration.clusters.len(),
            "sim: endpoint registered"
        );
        self.registrations.push(RegisteredEndpoint {
            descriptor: *registration.descriptor,
            in_clusters: registration.in_clusters.to_vec(),
            out_clusters: registration.out_clusters.to_vec(),
            clusters: registration.clusters.to_vec(),
        });
        Ok(())
    }

    fn send_command(&mut self, request: &SendRequest<'_>) -> Result<(), StackError> {
        self.check_send()?;
        self.sent.push(SentCommand {
            endpoint: request.endpoint,
            address_mode: request.address_mode,
            profile_id: request.profile_id,
            cluster_id: request.cluster_id,
            command_id: request.command_id,
            cluster_specific: request.cluster_specific,
            direction: request.direction,
            disable_default_response: request.disable_default_response,
            manufacturer_code: request.manufacturer_code,
            payload: request.payload.to_vec(),
        });
        Ok(())
    }

    fn send_report(&mut self, request: &ReportRequest<'_>) -> Result<(), StackError> {
        self.check_send()?;
        self.reports.push(SentReport {
            endpoint: request.endpoint,
            address_mode: request.address_mode,
            profile_id: request.profile_id,
            cluster_id: request.cluster_id,
            attribute_id: request.attribute_id,
            data_type: request.data_type,
            value: request.value.to_vec(),
        });
        Ok(())
    }

    fn is_joined(&self) -> bool {
        self.joined
    }

    fn schedule_reporting(&mut self) {
        self.reporting_triggers += 1;
    }
}
