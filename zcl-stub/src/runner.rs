//! Replays script events against a registered device.

use std::cell::RefCell;

use relay_data_model::ids::{cluster_id, multistate_input, on_off};
use relay_data_model::{AttributePath, DataType, Endpoint, IncomingCommand};
use relay_zcl_hal::sim::SimStack;
use relay_zcl_hal::{
    AttributeChangeListener, ConfigError, Direction, GatewayError, HalConfig, OutgoingCommand,
    WriteRecord, ZclContext,
};
use tracing::{info, warn};

use crate::device::RelayState;
use crate::script::Event;

/// Present value of the multistate input after a single press.
const SINGLE_PRESS: u16 = 1;

pub struct Runner<'a> {
    ctx: ZclContext<'a>,
    stack: SimStack,
    relays: &'a [RelayState],
    written: &'a RefCell<Vec<AttributePath>>,
}

impl<'a> Runner<'a> {
    /// Registers `endpoints` with a fresh simulated stack.
    ///
    /// Attribute writes are queued into `written` by `listener` and applied
    /// after each event.
    pub fn new(
        config: HalConfig,
        endpoints: &'a [Endpoint<'a>],
        relays: &'a [RelayState],
        written: &'a RefCell<Vec<AttributePath>>,
        listener: &'a dyn AttributeChangeListener,
    ) -> Result<Self, ConfigError> {
        let mut stack = SimStack::new();
        let mut ctx = ZclContext::new(config);
        ctx.initialize(endpoints, &mut stack)?;
        ctx.register_attribute_change_callback(listener)?;
        Ok(Self {
            ctx,
            stack,
            relays,
            written,
        })
    }

    pub fn context(&self) -> &ZclContext<'a> {
        &self.ctx
    }

    pub fn stack(&self) -> &SimStack {
        &self.stack
    }

    pub fn apply(&mut self, event: &Event) -> Result<(), GatewayError> {
        match event {
            Event::Join => {
                info!("joined network");
                self.stack.set_joined(true);
            }
            Event::Leave => {
                info!("left network");
                self.stack.set_joined(false);
            }
            Event::Write { path, value } => {
                let data_type = self
                    .ctx
                    .find_attribute(*path)
                    .and_then(|handle| self.ctx.attributes().get(handle))
                    .map_or(DataType::NoData, |info| info.data_type);
                let records = [WriteRecord {
                    attribute_id: path.attribute_id,
                    data_type: data_type.id(),
                    value,
                }];
                let statuses = self.stack.deliver_write(
                    &mut self.ctx,
                    path.endpoint,
                    path.cluster_id,
                    &records,
                    true,
                );
                for (attribute_id, status) in statuses {
                    info!(%path, attribute_id, ?status, "write response");
                }
            }
            Event::Command {
                endpoint,
                cluster_id,
                command_id,
                payload,
            } => {
                let cmd = IncomingCommand {
                    endpoint: *endpoint,
                    cluster_id: *cluster_id,
                    command_id: *command_id,
                    payload,
                };
                let status = self.stack.deliver_command(&self.ctx, &cmd);
                info!(endpoint, cluster_id, command_id, ?status, "default response");
            }
            Event::Report(path) => self.ctx.send_report(&mut self.stack, *path)?,
            Event::Set { path, value } => self.ctx.set_attribute(&mut self.stack, *path, value)?,
            Event::Send {
                endpoint,
                cluster_id,
                command_id,
                payload,
            } => {
                let cmd = OutgoingCommand {
                    endpoint: *endpoint,
                    cluster_id: *cluster_id,
                    command_id: *command_id,
                    cluster_specific: true,
                    direction: Direction::ClientToServer,
                    disable_default_response: false,
                    manufacturer_code: 0,
                    payload,
                };
                self.ctx.send_command(&mut self.stack, &cmd)?;
            }
            Event::Press(endpoint) => self.press(*endpoint)?,
        }
        self.settle()
    }

    /// Single press on a switch endpoint: publish the press on the
    /// multistate input and toggle whatever is bound to the switch.
    fn press(&mut self, endpoint: u8) -> Result<(), GatewayError> {
        let present = AttributePath::new(
            endpoint,
            cluster_id::MULTISTATE_INPUT,
            multistate_input::ATTR_PRESENT_VALUE,
        );
        self.ctx
            .set_attribute(&mut self.stack, present, &SINGLE_PRESS.to_le_bytes())?;
        self.ctx.send_report(&mut self.stack, present)?;
        let toggle = OutgoingCommand {
            endpoint,
            cluster_id: cluster_id::ON_OFF,
            command_id: on_off::CMD_TOGGLE,
            cluster_specific: true,
            direction: Direction::ClientToServer,
            ..Default::default()
        };
        self.ctx.send_command(&mut self.stack, &toggle)
    }

    /// Applies queued attribute writes to the relays and publishes relay
    /// changes made by commands.
    fn settle(&mut self) -> Result<(), GatewayError> {
        let written: Vec<AttributePath> = self.written.borrow_mut().drain(..).collect();
        for path in written {
            match self.relay(path) {
                Some(relay) => {
                    if let Some(on) = self.ctx.attribute(path).and_then(|v| v.as_bool()) {
                        relay.follow(on);
                    }
                    self.ctx.notify_attribute_changed(&mut self.stack, path);
                }
                None => info!(%path, "attribute written"),
            }
        }

        for relay in self.relays {
            let Some(on) = relay.take_change() else {
                continue;
            };
            let path = AttributePath::new(relay.endpoint, cluster_id::ON_OFF, on_off::ATTR_ON_OFF);
            self.ctx
                .set_attribute(&mut self.stack, path, &[u8::from(on)])?;
            if let Err(err) = self.ctx.send_report(&mut self.stack, path) {
                warn!(%err, %path, "relay state not reported");
            }
        }
        Ok(())
    }

    fn relay(&self, path: AttributePath) -> Option<&'a RelayState> {
        if path.cluster_id != cluster_id::ON_OFF || path.attribute_id != on_off::ATTR_ON_OFF {
            return None;
        }
        self.relays.iter().find(|r| r.endpoint == path.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device;
    use relay_data_model::ZclStatus;

    fn with_runner(relay_count: u8, body: impl FnOnce(&mut Runner<'_>, &[RelayState])) {
        let relays = device::relays(relay_count);
        let root = device::root_clusters();
        let relay_clusters = device::relay_clusters(&relays);
        let switch = device::switch_clusters();
        let endpoints = device::endpoints(&root, &relay_clusters, &switch);
        let written = RefCell::new(Vec::new());
        let listener = |path: AttributePath| written.borrow_mut().push(path);
        let mut runner = Runner::new(HalConfig::default(), &endpoints, &relays, &written, &listener)
            .expect("sample device registers");
        body(&mut runner, &relays);
    }

    #[test]
    fn toggle_command_switches_and_reports() {
        with_runner(2, |runner, relays| {
            runner.apply(&Event::Join).expect("join");
            runner
                .apply(&Event::Command {
                    endpoint: 3,
                    cluster_id: cluster_id::ON_OFF,
                    command_id: on_off::CMD_TOGGLE,
                    payload: vec![],
                })
                .expect("command");

            assert!(!relays[0].is_on());
            assert!(relays[1].is_on());
            let path = AttributePath::new(3, cluster_id::ON_OFF, on_off::ATTR_ON_OFF);
            assert_eq!(runner.context().attribute(path).and_then(|v| v.as_bool()), Some(true));
            let reports = runner.stack().reports();
            assert_eq!(reports.len(), 1);
            assert_eq!(reports[0].endpoint, 3);
            assert_eq!(reports[0].value, vec![1]);
        });
    }

    #[test]
    fn attribute_write_drives_relay() {
        with_runner(1, |runner, relays| {
            runner
                .apply(&Event::Write {
                    path: AttributePath::new(2, cluster_id::ON_OFF, on_off::ATTR_ON_OFF),
                    value: vec![1],
                })
                .expect("write");
            assert!(relays[0].is_on());
            assert_eq!(runner.stack().reporting_triggers(), 1);
            // Off the network: nothing sent.
            assert!(runner.stack().reports().is_empty());
        });
    }

    #[test]
    fn press_toggles_bindings() {
        with_runner(1, |runner, _| {
            let switch = device::switch_endpoint(1);
            runner.apply(&Event::Join).expect("join");
            runner.apply(&Event::Press(switch)).expect("press");

            let sent = runner.stack().sent_commands();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].endpoint, switch);
            assert_eq!(sent[0].command_id, on_off::CMD_TOGGLE);
            let reports = runner.stack().reports();
            assert_eq!(reports.len(), 1);
            assert_eq!(reports[0].cluster_id, cluster_id::MULTISTATE_INPUT);
            assert_eq!(reports[0].value, vec![1, 0]);
        });
    }

    #[test]
    fn unknown_report_is_an_error() {
        with_runner(1, |runner, _| {
            runner.apply(&Event::Join).expect("join");
            let path = AttributePath::new(2, cluster_id::ON_OFF, 0x4242);
            assert!(runner.apply(&Event::Report(path)).is_err());
        });
    }

    #[test]
    fn stack_answers_for_identify() {
        with_runner(1, |runner, _| {
            let cmd = IncomingCommand {
                endpoint: 1,
                cluster_id: cluster_id::IDENTIFY,
                command_id: 0,
                payload: &[],
            };
            assert_eq!(runner.stack.deliver_command(&runner.ctx, &cmd), ZclStatus::Success);
        });
    }
}
