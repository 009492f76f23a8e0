//! Vendor-neutral description of a ZCL device: endpoints, the clusters they
//! expose and the attributes those clusters carry.
//!
//! Everything here borrows caller-owned slices so a complete device can be
//! declared in `static` memory without an allocator.

pub mod data_type;
pub mod endpoint_composition;
pub mod ids;
pub mod status;

pub use data_type::{AttributeValue, DataType, ValueError, MAX_ATTR_VALUE_LEN};
pub use endpoint_composition::{
    Attribute, AttributePath, Cluster, ClusterRole, CommandHandler, Endpoint, IncomingCommand,
    Mutability,
};
pub use status::ZclStatus;
