//! Entry points for the vendor stack's receive path.

use relay_data_model::{AttributePath, IncomingCommand, ZclStatus};
use tracing::debug;

use crate::config::UnhandledCommandPolicy;
use crate::context::ZclContext;

/// One attribute entry of a write attributes command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRecord<'m> {
    pub attribute_id: u16,
    /// Raw type id as received; may name a type the model does not know.
    pub data_type: u8,
    pub value: &'m [u8],
}

/// Profile-wide command carried by an inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalCommand<'m> {
    Write(&'m [WriteRecord<'m>]),
    WriteNoResponse(&'m [WriteRecord<'m>]),
    Other(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomingMessage<'m> {
    /// Destination endpoint.
    pub endpoint: u8,
    pub cluster_id: u16,
    pub command: GlobalCommand<'m>,
}

impl<'a> ZclContext<'a> {
    /// Attribute-write notifier.
    ///
    /// Calls the attribute change callback once per write record, in payload
    /// order. Anything that is not a write is ignored, as is every write while
    /// no callback is registered.
    pub fn on_incoming_message(&self, msg: &IncomingMessage<'_>) {
        let records = match msg.command {
            GlobalCommand::Write(records) | GlobalCommand::WriteNoResponse(records) => records,
            GlobalCommand::Other(_) => return,
        };
        let Some(listener) = self.listener else {
            return;
        };
        for record in records {
            let path = AttributePath::new(msg.endpoint, msg.cluster_id, record.attribute_id);
            debug!(%path, "attribute written");
            listener.attribute_changed(path);
        }
    }

    /// Command dispatcher.
    ///
    /// Routes a cluster-specific command to the handler of the matching
    /// device model cluster and returns its status. Without a handler the
    /// answer depends on [`UnhandledCommandPolicy`].
    pub fn dispatch_command(&self, cmd: &IncomingCommand<'_>) -> ZclStatus {
        let cluster = self.index.find(cmd.endpoint, cmd.cluster_id);
        let strict = self.config.unhandled_commands == UnhandledCommandPolicy::Strict;

        let status = match cluster.and_then(|c| c.handler.map(|h| (c, h))) {
            Some((cluster, _))
                if strict
                    && !cluster.accepted_commands.is_empty()
                    && !cluster.accepted_commands.contains(&cmd.command_id) =>
            {
                ZclStatus::UnsupClusterCommand
            }
            Some((_, handler)) => handler.handle(cmd),
            None if strict => ZclStatus::UnsupClusterCommand,
            None => ZclStatus::Success,
        };
        debug!(
            endpoint = cmd.endpoint,
            cluster = cmd.cluster_id,
            command = cmd.command_id,
            handled = cluster.is_some_and(|c| c.handler.is_some()),
            status = ?status,
            "command dispatched"
        );
        status
    }
}
