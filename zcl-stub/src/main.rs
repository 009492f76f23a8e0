//! Host-side stub of a relay board.
//!
//! Builds the sample device model, registers it with the simulated ZCL stack
//! and replays an event script against it.
//!
//! ```bash
//! relay-zcl-stub --script scripts/demo.zcl --relays 3 --dump
//! relay-zcl-stub --strict --log-level debug < scripts/demo.zcl
//! ```

mod device;
mod runner;
mod script;

use std::cell::RefCell;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Parser;
use miette::{IntoDiagnostic, WrapErr};
use relay_data_model::AttributePath;
use relay_zcl_hal::{HalConfig, ZclContext};
use tracing::{info, Level};

use crate::runner::Runner;

/// Relay board ZCL stub
#[derive(Parser, Debug)]
#[command(name = "relay-zcl-stub")]
#[command(about = "Replays ZCL events against a simulated relay board")]
#[command(version)]
struct Args {
    /// Event script, `-` for stdin
    #[arg(short, long, default_value = "-")]
    script: PathBuf,

    /// Number of relay channels
    #[arg(short, long, default_value = "2", value_parser = clap::value_parser!(u8).range(1..=6))]
    relays: u8,

    /// Start already joined to a network
    #[arg(long)]
    joined: bool,

    /// Answer commands nobody handles with UNSUP_CLUSTER_COMMAND
    #[arg(long)]
    strict: bool,

    /// Print the registered tables after initialization
    #[arg(long)]
    dump: bool,

    /// Log as JSON lines
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(args: &Args) {
    let level = args.log_level.parse().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);
    if args.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_script(path: &Path) -> miette::Result<String> {
    let mut text = String::new();
    if path.as_os_str() == "-" {
        std::io::stdin()
            .read_to_string(&mut text)
            .into_diagnostic()
            .wrap_err("reading script from stdin")?;
    } else {
        text = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("reading {}", path.display()))?;
    }
    Ok(text)
}

fn dump(ctx: &ZclContext<'_>) {
    let arena = ctx.arena();
    for descriptor in arena.descriptors() {
        println!(
            "endpoint {} profile {:#06x} device {:#06x} v{}",
            descriptor.endpoint,
            descriptor.profile_id,
            descriptor.device_id,
            descriptor.device_version
        );
        println!("  in  {:04x?}", arena.in_clusters(descriptor));
        println!("  out {:04x?}", arena.out_clusters(descriptor));
        for info in arena.cluster_infos(descriptor) {
            println!(
                "  cluster {:#06x} {:?} forwards={}",
                info.cluster_id, info.binding.registration, info.binding.forwards_commands
            );
            for attr in arena.cluster_attributes(info) {
                println!(
                    "    attr {:#06x} {:?} {:?} {:02x?}",
                    attr.id,
                    attr.data_type,
                    attr.access,
                    attr.value.as_bytes()
                );
            }
        }
    }
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let events = script::parse(&read_script(&args.script)?)?;

    let config = if args.strict {
        HalConfig::strict()
    } else {
        HalConfig::default()
    };
    let relays = device::relays(args.relays);
    let root = device::root_clusters();
    let relay_clusters = device::relay_clusters(&relays);
    let switch = device::switch_clusters();
    let endpoints = device::endpoints(&root, &relay_clusters, &switch);
    let written = RefCell::new(Vec::new());
    let listener = |path: AttributePath| written.borrow_mut().push(path);

    let mut runner = Runner::new(config, &endpoints, &relays, &written, &listener)?;
    if args.dump {
        dump(runner.context());
    }
    if args.joined {
        runner.apply(&script::Event::Join).into_diagnostic()?;
    }

    for event in &events {
        runner
            .apply(event)
            .into_diagnostic()
            .wrap_err_with(|| format!("replaying {event:?}"))?;
    }

    let stack = runner.stack();
    info!(
        events = events.len(),
        commands = stack.sent_commands().len(),
        reports = stack.reports().len(),
        reporting_triggers = stack.reporting_triggers(),
        "script done"
    );
    Ok(())
}
