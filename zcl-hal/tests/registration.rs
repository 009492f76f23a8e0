use std::cell::{Cell, RefCell};

use relay_data_model::ids::{cluster_id, on_off, profile_id};
use relay_data_model::{
    Attribute, AttributePath, Cluster, ClusterRole, DataType, Endpoint, IncomingCommand, Mutability,
    ZclStatus,
};
use relay_zcl_hal::sim::SimStack;
use relay_zcl_hal::{
    AccessFlags, ConfigError, EndpointRegistration, HalConfig, ReportRequest, SendRequest,
    StackError, Table, WriteRecord, ZclContext, ZclStack, MAX_ATTRS, MAX_ENDPOINTS,
    MAX_IN_CLUSTERS,
};
use rstest::rstest;

const ONE_BOOL: &[Attribute<'static>] =
    &[Attribute::new(on_off::ATTR_ON_OFF, DataType::Bool, Mutability::Writable, &[0])];

const MIXED: &[Attribute<'static>] = &[
    Attribute::new(0x0000, DataType::Uint8, Mutability::ReadOnly, &[3]),
    Attribute::new(0x0001, DataType::Uint16, Mutability::Writable, &[0, 1]),
    Attribute::new(0x0005, DataType::CharString, Mutability::ReadOnly, b"\x05relay"),
];

fn endpoint<'a>(id: u8, clusters: &'a [Cluster<'a>]) -> Endpoint<'a> {
    Endpoint {
        id,
        profile_id: profile_id::HOME_AUTOMATION,
        device_id: 0x0002,
        device_version: 1,
        clusters,
    }
}

#[test]
fn two_endpoint_example() {
    let ep1 = [Cluster::server(cluster_id::ON_OFF, ONE_BOOL)];
    let ep2 = [Cluster::client(cluster_id::BASIC, &[])];
    let endpoints = [endpoint(1, &ep1), endpoint(2, &ep2)];
    let seen = RefCell::new(Vec::new());
    let listener = |path: AttributePath| seen.borrow_mut().push(path);

    let mut stack = SimStack::new();
    let mut ctx = ZclContext::new(HalConfig::default());
    ctx.initialize(&endpoints, &mut stack).expect("valid model");
    ctx.register_attribute_change_callback(&listener).expect("first");

    let first = stack.registration(1).expect("registered");
    assert_eq!(first.in_clusters, vec![cluster_id::ON_OFF]);
    assert!(first.out_clusters.is_empty());
    let second = stack.registration(2).expect("registered");
    assert!(second.in_clusters.is_empty());
    assert_eq!(second.out_clusters, vec![cluster_id::BASIC]);

    let records = [WriteRecord {
        attribute_id: on_off::ATTR_ON_OFF,
        data_type: DataType::Bool.id(),
        value: &[1],
    }];
    stack.deliver_write(&mut ctx, 1, cluster_id::ON_OFF, &records, false);
    assert_eq!(*seen.borrow(), vec![AttributePath::new(1, 6, 0)]);
}

const SINGLE: &[(u8, &[u16])] = &[(1, &[cluster_id::ON_OFF])];
const MIXED_ROLES: &[(u8, &[u16])] = &[
    (1, &[cluster_id::BASIC, cluster_id::ON_OFF, 0xfc00]),
    (2, &[cluster_id::ON_OFF]),
];
const WITH_OTA: &[(u8, &[u16])] = &[
    (1, &[cluster_id::BASIC, cluster_id::OTA]),
    (7, &[cluster_id::MULTISTATE_INPUT]),
];

#[rstest]
#[case::single(SINGLE)]
#[case::mixed_roles(MIXED_ROLES)]
#[case::with_ota(WITH_OTA)]
fn tables_mirror_the_model(#[case] shape: &[(u8, &[u16])]) {
    // Alternate roles and attribute sets so every combination shows up.
    let clusters: Vec<Vec<Cluster<'static>>> = shape
        .iter()
        .map(|(_, ids)| {
            ids.iter()
                .enumerate()
                .map(|(i, &id)| {
                    let attrs = if i % 2 == 0 { MIXED } else { ONE_BOOL };
                    if i % 3 == 1 {
                        Cluster::client(id, attrs)
                    } else {
                        Cluster::server(id, attrs)
                    }
                })
                .collect()
        })
        .collect();
    let endpoints: Vec<Endpoint<'_>> = shape
        .iter()
        .zip(&clusters)
        .map(|((id, _), clusters)| endpoint(*id, clusters))
        .collect();

    let mut stack = SimStack::new();
    let mut ctx = ZclContext::new(HalConfig::default());
    ctx.initialize(&endpoints, &mut stack).expect("valid model");

    let mut expected_attrs = 0;
    for ep in &endpoints {
        let registered = stack.registration(ep.id).expect("registered");
        let servers: Vec<u16> = ep
            .clusters
            .iter()
            .filter(|c| c.role == ClusterRole::Server)
            .map(|c| c.id)
            .collect();
        let clients: Vec<u16> = ep
            .clusters
            .iter()
            .filter(|c| c.role == ClusterRole::Client)
            .map(|c| c.id)
            .collect();
        assert_eq!(registered.in_clusters, servers);
        assert_eq!(registered.out_clusters, clients);

        for cluster in ep.clusters.iter().filter(|c| c.id != cluster_id::OTA) {
            expected_attrs += cluster.attributes.len();
            for attr in cluster.attributes {
                let path = AttributePath::new(ep.id, cluster.id, attr.id);
                let handle = ctx.find_attribute(path).expect("built");
                let info = ctx.attributes().get(handle).expect("in table");
                let mut access = AccessFlags::READ | AccessFlags::REPORTABLE;
                if attr.is_writable() {
                    access |= AccessFlags::WRITE;
                }
                assert_eq!(info.access, access);
                assert_eq!(info.value.as_bytes(), attr.default);
            }
        }
    }
    assert_eq!(ctx.attributes().len(), expected_attrs);
}

#[test]
fn over_capacity_model_touches_nothing() {
    let attrs: Vec<Attribute<'static>> = (0..=MAX_ATTRS as u16)
        .map(|id| Attribute::new(id, DataType::Uint8, Mutability::ReadOnly, &[0]))
        .collect();
    let clusters = [Cluster::server(0xfc00, &attrs)];
    let endpoints = [endpoint(1, &clusters)];

    let mut stack = SimStack::new();
    let mut ctx = ZclContext::new(HalConfig::default());
    assert_eq!(
        ctx.initialize(&endpoints, &mut stack),
        Err(ConfigError::CapacityExceeded {
            table: Table::Attributes,
            limit: MAX_ATTRS
        })
    );
    assert!(!stack.is_started());
    assert!(stack.registrations().is_empty());
    assert!(!ctx.is_initialized());
    assert!(ctx.arena().descriptors().is_empty());
    assert!(ctx.attributes().is_empty());
}

#[test]
fn too_many_endpoints() {
    let endpoints: Vec<Endpoint<'static>> = (1..=(MAX_ENDPOINTS as u8 + 1))
        .map(|id| endpoint(id, &[]))
        .collect();
    let mut stack = SimStack::new();
    let mut ctx = ZclContext::new(HalConfig::default());
    assert!(matches!(
        ctx.initialize(&endpoints, &mut stack),
        Err(ConfigError::CapacityExceeded {
            table: Table::Endpoints,
            ..
        })
    ));
    assert!(stack.registrations().is_empty());
}

#[test]
fn duplicate_cluster_touches_nothing() {
    let clusters = [
        Cluster::server(cluster_id::ON_OFF, ONE_BOOL),
        Cluster::client(cluster_id::ON_OFF, &[]),
    ];
    let endpoints = [endpoint(1, &clusters)];
    let mut stack = SimStack::new();
    let mut ctx = ZclContext::new(HalConfig::default());
    assert_eq!(
        ctx.initialize(&endpoints, &mut stack),
        Err(ConfigError::DuplicateCluster {
            endpoint: 1,
            cluster_id: cluster_id::ON_OFF
        })
    );
    assert!(!stack.is_started());
    assert!(ctx.index().is_empty());
}

/// A stack whose radio never comes up.
struct DeadStack;

impl ZclStack for DeadStack {
    fn start(&mut self) -> Result<(), StackError> {
        Err(StackError::Rejected(0xc2))
    }

    fn register_endpoint(&mut self, _: EndpointRegistration<'_>) -> Result<(), StackError> {
        Err(StackError::NotStarted)
    }

    fn send_command(&mut self, _: &SendRequest<'_>) -> Result<(), StackError> {
        Err(StackError::NotStarted)
    }

    fn send_report(&mut self, _: &ReportRequest<'_>) -> Result<(), StackError> {
        Err(StackError::NotStarted)
    }

    fn is_joined(&self) -> bool {
        false
    }

    fn schedule_reporting(&mut self) {}
}

#[test]
fn stack_start_failure_leaves_no_tables() {
    let clusters = [Cluster::server(cluster_id::ON_OFF, ONE_BOOL)];
    let endpoints = [endpoint(1, &clusters)];
    let mut ctx = ZclContext::new(HalConfig::default());
    assert_eq!(
        ctx.initialize(&endpoints, &mut DeadStack),
        Err(ConfigError::StackStart(StackError::Rejected(0xc2)))
    );
    assert!(!ctx.is_initialized());
    assert!(ctx.arena().descriptors().is_empty());
    assert!(ctx.index().is_empty());

    // Nothing is left behind, so a retry on a working stack succeeds.
    let mut stack = SimStack::new();
    ctx.initialize(&endpoints, &mut stack).expect("retry");
    assert_eq!(stack.registrations().len(), 1);
}

/// Simulated stack that refuses to register one endpoint.
struct RefusingStack {
    inner: SimStack,
    refused: u8,
}

impl ZclStack for RefusingStack {
    fn start(&mut self) -> Result<(), StackError> {
        self.inner.start()
    }

    fn register_endpoint(
        &mut self,
        registration: EndpointRegistration<'_>,
    ) -> Result<(), StackError> {
        if registration.descriptor.endpoint == self.refused {
            return Err(StackError::Rejected(0x89));
        }
        self.inner.register_endpoint(registration)
    }

    fn send_command(&mut self, request: &SendRequest<'_>) -> Result<(), StackError> {
        self.inner.send_command(request)
    }

    fn send_report(&mut self, request: &ReportRequest<'_>) -> Result<(), StackError> {
        self.inner.send_report(request)
    }

    fn is_joined(&self) -> bool {
        self.inner.is_joined()
    }

    fn schedule_reporting(&mut self) {
        self.inner.schedule_reporting()
    }
}

#[test]
fn refused_endpoint_leaves_no_tables() {
    let calls = Cell::new(0);
    let handler = |_: &IncomingCommand<'_>| {
        calls.set(calls.get() + 1);
        ZclStatus::Success
    };
    let first = [Cluster::server(cluster_id::ON_OFF, ONE_BOOL).with_handler(&handler)];
    let second = [Cluster::server(cluster_id::ON_OFF, ONE_BOOL)];
    let endpoints = [endpoint(1, &first), endpoint(2, &second)];

    let mut refusing = RefusingStack {
        inner: SimStack::new(),
        refused: 2,
    };
    let mut ctx = ZclContext::new(HalConfig::default());
    assert_eq!(
        ctx.initialize(&endpoints, &mut refusing),
        Err(ConfigError::Registration {
            endpoint: 2,
            source: StackError::Rejected(0x89)
        })
    );
    assert!(!ctx.is_initialized());
    assert!(ctx.arena().descriptors().is_empty());
    assert!(ctx.attributes().is_empty());
    assert!(ctx.index().is_empty());

    // Nothing routes to a handler of the unregistered model.
    let toggle = IncomingCommand {
        endpoint: 1,
        cluster_id: cluster_id::ON_OFF,
        command_id: on_off::CMD_TOGGLE,
        payload: &[],
    };
    assert_eq!(ctx.dispatch_command(&toggle), ZclStatus::Success);
    assert_eq!(calls.get(), 0);

    let mut stack = SimStack::new();
    ctx.initialize(&endpoints, &mut stack).expect("retry");
    assert_eq!(stack.registrations().len(), 2);
    assert_eq!(ctx.dispatch_command(&toggle), ZclStatus::Success);
    assert_eq!(calls.get(), 1);
}

#[test]
fn too_many_input_clusters_touch_nothing() {
    let clusters: Vec<Cluster<'static>> = (0..=MAX_IN_CLUSTERS as u16)
        .map(|i| Cluster::server(0xfc00 + i, &[]))
        .collect();
    let endpoints = [endpoint(1, &clusters)];
    let mut stack = SimStack::new();
    let mut ctx = ZclContext::new(HalConfig::default());
    assert_eq!(
        ctx.initialize(&endpoints, &mut stack),
        Err(ConfigError::CapacityExceeded {
            table: Table::InClusters,
            limit: MAX_IN_CLUSTERS
        })
    );
    assert!(!stack.is_started());
    assert!(stack.registrations().is_empty());
    assert!(ctx.arena().descriptors().is_empty());
    assert!(ctx.index().is_empty());
}

#[test]
fn initialization_happens_once() {
    let clusters = [Cluster::server(cluster_id::BASIC, &[])];
    let endpoints = [endpoint(1, &clusters)];
    let mut stack = SimStack::new();
    let mut ctx = ZclContext::new(HalConfig::default());
    ctx.initialize(&endpoints, &mut stack).expect("first");
    assert_eq!(
        ctx.initialize(&endpoints, &mut stack),
        Err(ConfigError::AlreadyInitialized)
    );
    assert_eq!(stack.registrations().len(), 1);
}

#[test]
fn callback_registers_once() {
    let first = |_: AttributePath| {};
    let second = |_: AttributePath| {};
    let mut ctx = ZclContext::new(HalConfig::default());
    ctx.register_attribute_change_callback(&first).expect("first");
    assert_eq!(
        ctx.register_attribute_change_callback(&second),
        Err(ConfigError::CallbackAlreadyRegistered)
    );
}

#[test]
fn unhandled_command_is_permissive() {
    let clusters = [Cluster::server(cluster_id::ON_OFF, ONE_BOOL)];
    let endpoints = [endpoint(1, &clusters)];
    let mut stack = SimStack::new();
    let mut ctx = ZclContext::new(HalConfig::default());
    ctx.initialize(&endpoints, &mut stack).expect("valid");

    let cmd = IncomingCommand {
        endpoint: 1,
        cluster_id: cluster_id::ON_OFF,
        command_id: on_off::CMD_TOGGLE,
        payload: &[],
    };
    assert_eq!(stack.deliver_command(&ctx, &cmd), ZclStatus::Success);
    let unknown = IncomingCommand { endpoint: 9, ..cmd };
    assert_eq!(ctx.dispatch_command(&unknown), ZclStatus::Success);

    assert!(stack.sent_commands().is_empty());
    assert!(stack.reports().is_empty());
    assert_eq!(stack.reporting_triggers(), 0);
    assert_eq!(
        ctx.attribute(AttributePath::new(1, cluster_id::ON_OFF, 0)).and_then(|v| v.as_bool()),
        Some(false)
    );
}

#[test]
fn handler_sees_forwarded_commands() {
    let toggles = RefCell::new(Vec::new());
    let handler = |cmd: &IncomingCommand<'_>| {
        toggles.borrow_mut().push((cmd.endpoint, cmd.command_id));
        ZclStatus::Success
    };
    let clusters = [
        Cluster::server(cluster_id::ON_OFF, ONE_BOOL).with_handler(&handler),
        Cluster::server(cluster_id::IDENTIFY, &[]).with_handler(&handler),
    ];
    let endpoints = [endpoint(3, &clusters)];
    let mut stack = SimStack::new();
    let mut ctx = ZclContext::new(HalConfig::default());
    ctx.initialize(&endpoints, &mut stack).expect("valid");

    let toggle = IncomingCommand {
        endpoint: 3,
        cluster_id: cluster_id::ON_OFF,
        command_id: on_off::CMD_TOGGLE,
        payload: &[],
    };
    let identify = IncomingCommand {
        cluster_id: cluster_id::IDENTIFY,
        command_id: 0,
        ..toggle
    };
    assert_eq!(stack.deliver_command(&ctx, &toggle), ZclStatus::Success);
    // Identify is run by the stack itself and never forwarded.
    assert_eq!(stack.deliver_command(&ctx, &identify), ZclStatus::Success);
    assert_eq!(*toggles.borrow(), vec![(3, on_off::CMD_TOGGLE)]);
}

#[test]
fn reports_need_the_network() {
    let clusters = [Cluster::server(cluster_id::ON_OFF, ONE_BOOL)];
    let endpoints = [endpoint(1, &clusters)];
    let path = AttributePath::new(1, cluster_id::ON_OFF, on_off::ATTR_ON_OFF);
    let mut stack = SimStack::new();
    let mut ctx = ZclContext::new(HalConfig::default());
    ctx.initialize(&endpoints, &mut stack).expect("valid");

    ctx.send_report(&mut stack, path).expect("dropped quietly");
    assert!(stack.reports().is_empty());

    stack.set_joined(true);
    ctx.send_report(&mut stack, path).expect("queued");
    assert_eq!(stack.reports().len(), 1);
    assert_eq!(stack.reports()[0].value, vec![0]);
}
