//! Adaptation layer between a vendor-neutral device model and a vendor ZCL
//! stack.
//!
//! ```text
//! +--------------------------------------------+
//! |  Application (relays, switches, buttons)   |
//! +--------------------------------------------+
//!      | initialize / send / report    ^ callbacks
//!      v                               |
//! +--------------------------------------------+
//! |  ZclContext                                |
//! |   builder -> TableArena + ClusterIndex     |
//! |   dispatch (inbound)   gateway (outbound)  |
//! +--------------------------------------------+
//!      | ZclStack                      ^ receive path
//!      v                               |
//! +--------------------------------------------+
//! |  Vendor ZCL stack (Telink, Silabs, sim)    |
//! +--------------------------------------------+
//! ```
//!
//! The context is built once from a slice of [`relay_data_model::Endpoint`]s.
//! After that every table is read-only except attribute values, which live in
//! the arena and are addressed by [`AttributeHandle`].

pub mod arena;
mod builder;
pub mod config;
pub mod context;
mod dispatch;
pub mod error;
mod gateway;
pub mod lookup;
pub mod sim;
pub mod stack;

pub use arena::{
    AccessFlags, AttributeHandle, AttributeInfo, AttributeTable, ClusterInfo, EndpointDescriptor,
    Table, TableArena, TableSpan, MAX_ATTRS, MAX_CLUSTER_INFOS, MAX_ENDPOINTS, MAX_IN_CLUSTERS,
    MAX_OUT_CLUSTERS,
};
pub use config::{HalConfig, UnhandledCommandPolicy};
pub use context::{AttributeChangeListener, ZclContext};
pub use dispatch::{GlobalCommand, IncomingMessage, WriteRecord};
pub use error::{AttributeError, ConfigError, GatewayError, StackError};
pub use gateway::{OutgoingCommand, MAX_PAYLOAD_LEN};
pub use lookup::{cluster_binding, ClusterBinding, ClusterIndex, VendorCluster};
pub use stack::{AddressMode, Direction, EndpointRegistration, ReportRequest, SendRequest, ZclStack};
