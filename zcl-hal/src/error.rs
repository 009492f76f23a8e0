use miette::Diagnostic;
use relay_data_model::{AttributePath, ValueError};
use thiserror::Error;

use crate::arena::Table;

/// Failures reported by the vendor stack.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    #[error("vendor stack queue is full")]
    QueueFull,

    #[error("vendor stack has not been started")]
    NotStarted,

    #[error("vendor stack rejected the request with status 0x{0:02x}")]
    Rejected(u8),
}

/// A device model the layer refuses to register.
///
/// All of these abort initialization before the device may join a network.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("{table} table is full (capacity {limit})")]
    #[diagnostic(
        code(zcl_hal::capacity),
        help("reduce the device model or raise the compile-time table maxima")
    )]
    CapacityExceeded {
        table: Table,
        limit: usize,
    },

    #[error("endpoint {0} is outside the application range 1..=240")]
    #[diagnostic(code(zcl_hal::endpoint_id))]
    InvalidEndpoint(u8),

    #[error("endpoint {0} is declared more than once")]
    #[diagnostic(code(zcl_hal::duplicate_endpoint))]
    DuplicateEndpoint(u8),

    #[error("cluster 0x{cluster_id:04x} is declared more than once on endpoint {endpoint}")]
    #[diagnostic(code(zcl_hal::duplicate_cluster))]
    DuplicateCluster {
        endpoint: u8,
        cluster_id: u16,
    },

    #[error("attribute {0} is declared more than once")]
    #[diagnostic(code(zcl_hal::duplicate_attribute))]
    DuplicateAttribute(AttributePath),

    #[error("default value of attribute {path} is invalid: {source}")]
    #[diagnostic(
        code(zcl_hal::attribute_default),
        help("fixed-width types need exactly their width, strings a matching length prefix")
    )]
    InvalidDefault {
        path: AttributePath,
        #[source]
        source: ValueError,
    },

    #[error("device model is already registered")]
    #[diagnostic(code(zcl_hal::already_initialized))]
    AlreadyInitialized,

    #[error("an attribute change callback is already registered")]
    #[diagnostic(code(zcl_hal::callback_registered))]
    CallbackAlreadyRegistered,

    #[error("vendor stack failed to start: {0}")]
    #[diagnostic(code(zcl_hal::stack_start))]
    StackStart(#[source] StackError),

    #[error("vendor stack refused endpoint {endpoint}: {source}")]
    #[diagnostic(code(zcl_hal::registration))]
    Registration {
        endpoint: u8,
        #[source]
        source: StackError,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeError {
    #[error("attribute {0} is not registered")]
    Unknown(AttributePath),

    #[error("attribute handle {0} is out of range")]
    InvalidHandle(usize),

    #[error(transparent)]
    Value(#[from] ValueError),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayError {
    #[error("device model has not been registered")]
    NotInitialized,

    #[error("payload of {len} bytes exceeds the {max} byte limit")]
    PayloadTooLarge {
        len: usize,
        max: usize,
    },

    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error(transparent)]
    Stack(#[from] StackError),
}
