use relay_data_model::{AttributePath, AttributeValue, Endpoint};
use tracing::{info, warn};

use crate::arena::{AttributeHandle, AttributeTable, TableArena};
use crate::builder;
use crate::config::HalConfig;
use crate::error::ConfigError;
use crate::lookup::ClusterIndex;
use crate::stack::{EndpointRegistration, ZclStack};

/// Receives every attribute touched by an inbound write command.
pub trait AttributeChangeListener {
    fn attribute_changed(&self, path: AttributePath);
}

impl<F> AttributeChangeListener for F
where
    F: Fn(AttributePath),
{
    fn attribute_changed(&self, path: AttributePath) {
        self(path)
    }
}

/// Registration state of one device session.
///
/// Owned by the caller and passed to every inbound and outbound operation.
pub struct ZclContext<'a> {
    pub(crate) config: HalConfig,
    pub(crate) arena: TableArena,
    pub(crate) index: ClusterIndex<'a>,
    pub(crate) listener: Option<&'a dyn AttributeChangeListener>,
    initialized: bool,
}

impl<'a> ZclContext<'a> {
    pub fn new(config: HalConfig) -> Self {
        Self {
            config,
            arena: TableArena::new(),
            index: ClusterIndex::new(),
            listener: None,
            initialized: false,
        }
    }

    pub fn config(&self) -> &HalConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn arena(&self) -> &TableArena {
        &self.arena
    }

    pub fn index(&self) -> &ClusterIndex<'a> {
        &self.index
    }

    /// Builds the vendor tables for `endpoints` and registers them.
    ///
    /// The whole model is validated and projected before the stack is
    /// touched, so a rejected model leaves no registration behind. Any
    /// failure leaves the context empty and uninitialized. Must succeed
    /// before the device joins a network.
    pub fn initialize<S: ZclStack>(
        &mut self,
        endpoints: &'a [Endpoint<'a>],
        stack: &mut S,
    ) -> Result<(), ConfigError> {
        if self.initialized {
            return Err(ConfigError::AlreadyInitialized);
        }
        if let Err(err) = self.build_and_register(endpoints, stack) {
            warn!(%err, "device model not registered");
            self.arena.clear();
            self.index.clear();
            return Err(err);
        }
        self.initialized = true;
        Ok(())
    }

    fn build_and_register<S: ZclStack>(
        &mut self,
        endpoints: &'a [Endpoint<'a>],
        stack: &mut S,
    ) -> Result<(), ConfigError> {
        builder::build(endpoints, &self.config, &mut self.arena, &mut self.index)?;
        stack.start().map_err(ConfigError::StackStart)?;
        for descriptor in self.arena.descriptors() {
            let registration = EndpointRegistration {
                descriptor,
                in_clusters: self.arena.in_clusters(descriptor),
                out_clusters: self.arena.out_clusters(descriptor),
                clusters: self.arena.cluster_infos(descriptor),
            };
            stack
                .register_endpoint(registration)
                .map_err(|source| ConfigError::Registration {
                    endpoint: descriptor.endpoint,
                    source,
                })?;
            info!(
                endpoint = descriptor.endpoint,
                profile = descriptor.profile_id,
                device = descriptor.device_id,
                in_clusters = descriptor.in_clusters.len,
                out_clusters = descriptor.out_clusters.len,
                clusters = descriptor.cluster_infos.len,
                "endpoint registered"
            );
        }
        Ok(())
    }

    /// Sets the process-wide attribute change callback. Only one per session.
    pub fn register_attribute_change_callback(
        &mut self,
        listener: &'a dyn AttributeChangeListener,
    ) -> Result<(), ConfigError> {
        if self.listener.is_some() {
            return Err(ConfigError::CallbackAlreadyRegistered);
        }
        self.listener = Some(listener);
        Ok(())
    }

    pub fn find_attribute(&self, path: AttributePath) -> Option<AttributeHandle> {
        self.arena.find_attribute(path)
    }

    pub fn attributes(&self) -> &AttributeTable {
        self.arena.attributes()
    }

    /// Live attribute storage, as reached by the stack's write path.
    pub fn attributes_mut(&mut self) -> &mut AttributeTable {
        self.arena.attributes_mut()
    }

    /// Live value of an attribute.
    pub fn attribute(&self, path: AttributePath) -> Option<&AttributeValue> {
        let handle = self.arena.find_attribute(path)?;
        self.arena.attributes().value(handle)
    }
}
