//! Outbound operations: commands to bound peers, attribute reports and local
//! attribute updates.

use relay_data_model::AttributePath;
use tracing::{debug, warn};

use crate::context::ZclContext;
use crate::error::{AttributeError, GatewayError};
use crate::stack::{AddressMode, Direction, ReportRequest, SendRequest, ZclStack};

/// Largest command payload the gateway will queue.
pub const MAX_PAYLOAD_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutgoingCommand<'p> {
    /// Source endpoint.
    pub endpoint: u8,
    pub cluster_id: u16,
    pub command_id: u8,
    pub cluster_specific: bool,
    pub direction: Direction,
    pub disable_default_response: bool,
    pub manufacturer_code: u16,
    pub payload: &'p [u8],
}

impl<'a> ZclContext<'a> {
    /// Sends a command to every peer bound to the source endpoint.
    ///
    /// `Ok` means the stack queued the frame, not that anyone received it.
    /// While the device is off the network the command is dropped.
    pub fn send_command<S: ZclStack>(
        &self,
        stack: &mut S,
        cmd: &OutgoingCommand<'_>,
    ) -> Result<(), GatewayError> {
        if !self.is_initialized() {
            return Err(GatewayError::NotInitialized);
        }
        if cmd.payload.len() > MAX_PAYLOAD_LEN {
            return Err(GatewayError::PayloadTooLarge {
                len: cmd.payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }
        if !stack.is_joined() {
            debug!(
                endpoint = cmd.endpoint,
                cluster = cmd.cluster_id,
                command = cmd.command_id,
                "not joined, dropping command"
            );
            return Ok(());
        }

        let request = SendRequest {
            endpoint: cmd.endpoint,
            address_mode: AddressMode::Bindings,
            profile_id: self.config.profile_id,
            cluster_id: cmd.cluster_id,
            command_id: cmd.command_id,
            cluster_specific: cmd.cluster_specific,
            direction: cmd.direction,
            disable_default_response: cmd.disable_default_response,
            manufacturer_code: cmd.manufacturer_code,
            payload: cmd.payload,
        };
        stack.send_command(&request).map_err(|err| {
            warn!(%err, endpoint = cmd.endpoint, cluster = cmd.cluster_id, "command not queued");
            GatewayError::from(err)
        })
    }

    /// Reports the live value of one attribute to bound peers.
    ///
    /// Off the network this is a successful no-op; reports are not queued.
    pub fn send_report<S: ZclStack>(
        &self,
        stack: &mut S,
        path: AttributePath,
    ) -> Result<(), GatewayError> {
        if !stack.is_joined() {
            debug!(%path, "not joined, dropping report");
            return Ok(());
        }
        let info = self
            .arena
            .find_attribute(path)
            .and_then(|handle| self.arena.attributes().get(handle))
            .ok_or(AttributeError::Unknown(path))?;

        let request = ReportRequest {
            endpoint: path.endpoint,
            address_mode: AddressMode::Bindings,
            profile_id: self.config.profile_id,
            cluster_id: path.cluster_id,
            attribute_id: info.id,
            data_type: info.data_type,
            value: info.value.as_bytes(),
        };
        debug!(%path, "sending attribute report");
        stack.send_report(&request).map_err(|err| {
            warn!(%err, %path, "report not queued");
            GatewayError::from(err)
        })
    }

    /// Tells the stack an attribute changed locally so its scheduled
    /// reporting picks the new value up.
    pub fn notify_attribute_changed<S: ZclStack>(&self, stack: &mut S, path: AttributePath) {
        debug!(%path, "attribute changed locally");
        stack.schedule_reporting();
    }

    /// Updates an attribute's live value and notifies the stack.
    pub fn set_attribute<S: ZclStack>(
        &mut self,
        stack: &mut S,
        path: AttributePath,
        value: &[u8],
    ) -> Result<(), GatewayError> {
        let handle = self
            .arena
            .find_attribute(path)
            .ok_or(AttributeError::Unknown(path))?;
        self.arena.attributes_mut().write(handle, value)?;
        self.notify_attribute_changed(stack, path);
        Ok(())
    }
}
